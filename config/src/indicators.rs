//! The indicator list used in fixed mode.
//!
//! ```yaml
//! - indicators:
//!     - deviceId: 12
//!       objectId: 345
//!       indicatorId: 6789
//! ```
//!
//! Only the first document entry is read.

use color_eyre::Result;
use eyre::{
    bail,
    eyre,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

/// Exact coordinates of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRef {
    pub device_id: u64,
    pub object_id: u64,
    pub indicator_id: u64,
}

#[derive(Debug, Deserialize)]
struct IndicatorGroup {
    #[serde(default)]
    indicators: Vec<IndicatorRef>,
}

pub fn parse_indicators(content: &str) -> Result<Vec<IndicatorRef>> {
    let groups: Vec<IndicatorGroup> = serde_yml::from_str(content).context("Failed to parse indicator list")?;
    let group = groups
        .into_iter()
        .next()
        .ok_or_else(|| eyre!("indicator list is empty"))?;
    if group.indicators.is_empty() {
        bail!("indicator list declares no indicators");
    }
    Ok(group.indicators)
}

pub fn load_indicators(path: &Path) -> Result<Vec<IndicatorRef>> {
    let content =
        std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read indicator list {:?}", path))?;
    let indicators = parse_indicators(&content).wrap_err_with(|| format!("Invalid indicator list {:?}", path))?;
    info!(count = indicators.len(), path = ?path, "loaded indicator list");
    Ok(indicators)
}
