//! Wavefront line rendering.
//!
//! ```text
//! "sevone.<device>.<object>.<indicator>" <value> <epochMillis> source="SevOne" deviceId="1" ...
//! ```
//!
//! Tag values are written verbatim; a value containing `"` yields a line the
//! collector may reject.

use crate::{
    hierarchy::ExpandedIndicator,
    sample::{
        Sample,
        SampleWindow,
    },
};
use std::fmt;

pub const METRIC_PREFIX: &str = "sevone";
pub const SOURCE: &str = "SevOne";

/// One indicator joined with its sample, ready to be printed.
#[derive(Debug, Clone, Copy)]
pub struct MetricRecord<'a> {
    pub indicator: &'a ExpandedIndicator,
    pub sample: &'a Sample,
    pub timestamp_ms: i64,
}

impl<'a> MetricRecord<'a> {
    pub fn new(indicator: &'a ExpandedIndicator, sample: &'a Sample, window: SampleWindow) -> Self {
        Self {
            indicator,
            sample,
            timestamp_ms: window.end_ms,
        }
    }

    pub fn metric_name(&self) -> String {
        metric_name(
            &self.indicator.device.name,
            &self.indicator.object.name,
            &self.indicator.indicator.name,
        )
    }

    /// Tags in output order. `deviceId` is always present, the rest only when
    /// non-empty. An object or indicator ID of 0 counts as empty.
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        let ExpandedIndicator {
            device,
            object,
            indicator,
        } = self.indicator;

        let mut tags = vec![("deviceId", indicator.device_id.to_string())];
        let optional: [(&'static str, Option<String>); 10] = [
            ("deviceAlternateName", device.alternate_name.clone()),
            ("deviceDescription", device.description.clone()),
            ("objectId", non_zero(indicator.object_id)),
            ("objectName", Some(object.name.clone())),
            ("objectDescription", object.description.clone()),
            ("objectAlternateName", object.alternate_name.clone()),
            ("indicatorId", non_zero(indicator.id)),
            ("indicatorName", Some(indicator.name.clone())),
            ("indicatorDescription", indicator.description.clone()),
            ("dataUnits", indicator.data_units.clone()),
        ];
        tags.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v))),
        );
        tags
    }
}

impl fmt::Display for MetricRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" {} {} source=\"{SOURCE}\"",
            self.metric_name(),
            self.sample.value,
            self.timestamp_ms
        )?;
        for (key, value) in self.tags() {
            write!(f, " {key}=\"{value}\"")?;
        }
        Ok(())
    }
}

fn non_zero(id: u64) -> Option<String> {
    (id != 0).then(|| id.to_string())
}

/// `sevone.<device>.<object>.<indicator>` with dots inside a component turned
/// into `_`, then every space of the whole name turned into `_`.
pub fn metric_name(device: &str, object: &str, indicator: &str) -> String {
    let components = [device, object, indicator].map(|part| part.replace('.', "_"));
    format!("{METRIC_PREFIX}.{}", components.join(".")).replace(' ', "_")
}

/// Render the line for `indicator`, or `None` when there is no sample to report.
pub fn format_line(indicator: &ExpandedIndicator, sample: Option<&Sample>, window: SampleWindow) -> Option<String> {
    sample.map(|sample| MetricRecord::new(indicator, sample, window).to_string())
}
