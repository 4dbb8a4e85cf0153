//! Wire model of the SevOne API.
//!
//! Only the fields the exporter reads are modelled, everything else in the
//! responses is ignored. Display attributes that SevOne may leave out or send
//! as `null` are `Option`s.

use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

#[derive(Clone, Serialize)]
pub struct Credential {
    pub name: String,
    pub password: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

/// Opaque API token returned by the sign-in endpoint. Valid for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignInResponse {
    #[serde(default)]
    pub(crate) token: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alternate_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Device {
    pub const COLLECTION: &'static str = "/devices";

    pub fn detail_path(device_id: u64) -> String {
        format!("/devices/{device_id}")
    }

    pub fn objects_path(&self) -> String {
        format!("/devices/{}/objects", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    pub id: u64,
    #[serde(default)]
    pub device_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alternate_name: Option<String>,
}

impl Object {
    pub fn detail_path(device_id: u64, object_id: u64) -> String {
        format!("/devices/{device_id}/objects/{object_id}")
    }

    pub fn indicators_path(&self) -> String {
        format!("/devices/{}/objects/{}/indicators", self.device_id, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: u64,
    #[serde(default)]
    pub object_id: u64,
    #[serde(default)]
    pub device_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data_units: Option<String>,
}

impl Indicator {
    pub fn detail_path(device_id: u64, object_id: u64, indicator_id: u64) -> String {
        format!("/devices/{device_id}/objects/{object_id}/indicators/{indicator_id}")
    }

    pub fn data_path(&self) -> String {
        format!(
            "/devices/{}/objects/{}/indicators/{}/data",
            self.device_id, self.object_id, self.id
        )
    }
}

/// A single point of an indicator's time series. `value` is `null` when the
/// indicator has no data for the point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub value: Option<serde_json::Number>,
}
