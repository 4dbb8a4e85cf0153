use chrono::{
    DateTime,
    Utc,
};
use sevone_client::{
    fetch,
    ApiRequest,
    ClientError,
    DataPoint,
    Indicator,
    SevOneApi,
};
use std::time::Duration;

/// The `[start, end]` range queried for every indicator of a run, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl SampleWindow {
    /// Window of `length` ending at `end`, truncated to whole seconds.
    pub fn ending_at(end: DateTime<Utc>, length: Duration) -> Self {
        let end_ms = end.timestamp().saturating_mul(1000);
        let length_ms = i64::try_from(length.as_secs()).unwrap_or(i64::MAX).saturating_mul(1000);
        Self {
            start_ms: end_ms.saturating_sub(length_ms),
            end_ms,
        }
    }

    pub fn ending_now(length: Duration) -> Self {
        Self::ending_at(Utc::now(), length)
    }
}

/// The most recent value of an indicator within a window.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: serde_json::Number,
}

/// Fetch the first data point of `indicator` in `window`.
///
/// `Ok(None)` means there is nothing to emit: no points, or a `null` value.
pub async fn fetch_latest<A>(api: &A, indicator: &Indicator, window: SampleWindow) -> Result<Option<Sample>, ClientError>
where
    A: SevOneApi + ?Sized,
{
    let request = ApiRequest::new(indicator.data_path())
        .param("startTime", window.start_ms)
        .param("endTime", window.end_ms);
    let points: Vec<DataPoint> = fetch(api, request).await?;
    Ok(points
        .into_iter()
        .next()
        .and_then(|point| point.value)
        .map(|value| Sample { value }))
}
