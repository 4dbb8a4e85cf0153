use crate::ClientError;
use serde::de::DeserializeOwned;
use std::{
    fmt,
    future::Future,
    pin::Pin,
};

/// An authenticated GET against the API, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (idx, (key, value)) in self.query.iter().enumerate() {
            let sep = if idx == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Transport seam for authenticated reads.
///
/// [`crate::Session`] implements it over HTTP; everything above the session
/// (paging, hierarchy expansion, sampling) only talks to this trait.
pub trait SevOneApi: Send + Sync {
    fn get(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ClientError>> + Send + '_>>;
}

/// Issue `request` and decode the JSON body into `T`.
pub async fn fetch<T, A>(api: &A, request: ApiRequest) -> Result<T, ClientError>
where
    T: DeserializeOwned,
    A: SevOneApi + ?Sized,
{
    let target = request.to_string();
    let body = api.get(request).await?;
    serde_json::from_value(body).map_err(|source| ClientError::Decode { url: target, source })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_path_with_query() {
        let request = ApiRequest::new("/devices").param("page", 2).param("size", 20);
        assert_eq!(request.to_string(), "/devices?page=2&size=20");
        assert_eq!(request.query_value("size"), Some("20"));
        assert_eq!(ApiRequest::new("/devices/1").to_string(), "/devices/1");
    }
}
