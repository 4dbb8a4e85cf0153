#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Invalid endpoint {path}: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Request limiter closed: {0}")]
    Limiter(#[source] tokio::sync::AcquireError),
    #[error("Page {page} of {url} could not be fetched: {source}")]
    Page {
        url: String,
        page: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
