//! # SevOne API client
//!
//! Typed access to the parts of the SevOne REST API (v2) needed to read the
//! latest indicator samples:
//!
//! - **`model`**: devices, objects, indicators, data points and the page envelope
//! - **`api`**: the [`SevOneApi`] seam every authenticated GET goes through
//! - **`session`**: the reqwest-backed [`Session`] that signs in and owns the connection policy
//! - **`paging`**: the [`Pager`] that walks a paginated collection
//! - **`limit`**: [`Throttled`], one request ceiling shared by every fan-out

#[macro_use]
extern crate tracing;

pub mod api;
pub mod error;
pub mod limit;
pub mod model;
pub mod paging;
pub mod session;

pub use api::{
    fetch,
    ApiRequest,
    SevOneApi,
};
pub use error::ClientError;
pub use limit::Throttled;
pub use model::{
    Credential,
    DataPoint,
    Device,
    Indicator,
    Object,
    Page,
    Token,
};
pub use paging::{
    Listing,
    PageFailure,
    PagePolicy,
    Pager,
};
pub use session::{
    Session,
    SessionOptions,
};
