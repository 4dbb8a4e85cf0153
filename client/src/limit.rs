use crate::{
    api::{
        ApiRequest,
        SevOneApi,
    },
    ClientError,
};
use std::{
    future::Future,
    pin::Pin,
};
use tokio::sync::Semaphore;

/// Caps the number of requests in flight across every caller sharing it.
///
/// Nested fan-outs (pages inside per-parent listings inside per-device
/// expansion) each bound their own task count; this bounds the sockets.
pub struct Throttled<'a, A: ?Sized> {
    api: &'a A,
    permits: Semaphore,
}

impl<'a, A> Throttled<'a, A>
where
    A: SevOneApi + ?Sized,
{
    pub fn new(api: &'a A, max_in_flight: usize) -> Self {
        Self {
            api,
            permits: Semaphore::new(max_in_flight.max(1)),
        }
    }
}

impl<A> SevOneApi for Throttled<'_, A>
where
    A: SevOneApi + ?Sized,
{
    fn get(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ClientError>> + Send + '_>> {
        Box::pin(async move {
            let _permit = self.permits.acquire().await.map_err(ClientError::Limiter)?;
            self.api.get(request).await
        })
    }
}
