use crate::{
    api::{
        ApiRequest,
        SevOneApi,
    },
    model::{
        Credential,
        SignInResponse,
        Token,
    },
    ClientError,
};
use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        CONNECTION,
        CONTENT_TYPE,
    },
    Client,
    StatusCode,
};
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use url::Url;

pub const AUTH_HEADER: &str = "X-AUTH-TOKEN";

/// Connection policy shared by every call of a run.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_url: Url,
    pub verify_tls: bool,
    /// Drop pooled connections after every call instead of reusing them.
    pub force_close: bool,
    /// Upper bound for any single call. The run as a whole is bounded by the caller.
    pub timeout: Duration,
}

/// One HTTP client plus the token obtained by [`Session::login`].
#[derive(Debug)]
pub struct Session {
    http: Client,
    base_url: String,
    token: Option<Token>,
}

impl Session {
    pub fn new(options: &SessionOptions) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls);

        if options.force_close {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
            builder = builder.pool_max_idle_per_host(0);
        }

        let http = builder.default_headers(headers).build().map_err(ClientError::Client)?;

        Ok(Self {
            http,
            base_url: options.base_url.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Exchange the credential for a token and keep it for all later calls.
    #[instrument(level = "debug", skip_all, fields(user = %credential.name))]
    pub async fn login(&mut self, credential: &Credential) -> Result<&Token, ClientError> {
        let url = self.endpoint("/authentication/signin")?;
        let response = self
            .http
            .post(url.clone())
            .json(credential)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        let token = token_from(status, &body)?;

        debug!("signed in");
        Ok(self.token.insert(token))
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|source| ClientError::Endpoint {
            path: path.to_string(),
            source,
        })
    }

    fn build_get(&self, request: &ApiRequest) -> Result<reqwest::Request, ClientError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ClientError::Auth("not signed in".to_string()))?;
        let url = self.endpoint(&request.path)?;
        self.http
            .get(url.clone())
            .query(&request.query)
            .header(AUTH_HEADER, token.as_str())
            .build()
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })
    }

    async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value, ClientError> {
        let http_request = self.build_get(&request)?;
        let url = http_request.url().to_string();
        trace!(%url, "GET");

        let response = self
            .http
            .execute(http_request)
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }
}

/// Pull the token out of a sign-in response. Any non-success status, or a body
/// without a non-empty `token`, is an authentication failure.
fn token_from(status: StatusCode, body: &[u8]) -> Result<Token, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Auth(format!("sign-in returned status {status}")));
    }
    serde_json::from_slice::<SignInResponse>(body)
        .ok()
        .and_then(|response| response.token)
        .filter(|token| !token.is_empty())
        .map(Token::new)
        .ok_or_else(|| ClientError::Auth("sign-in response did not contain a token".to_string()))
}

impl SevOneApi for Session {
    fn get(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ClientError>> + Send + '_>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(base: &str) -> Session {
        Session::new(&SessionOptions {
            base_url: Url::parse(base).unwrap(),
            verify_tls: true,
            force_close: true,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn joins_paths_onto_base_url() {
        let with_slash = session("https://sevone.example.com/api/v2/");
        let without_slash = session("https://sevone.example.com/api/v2");
        for session in [with_slash, without_slash] {
            assert_eq!(
                session.endpoint("/devices/4/objects").unwrap().as_str(),
                "https://sevone.example.com/api/v2/devices/4/objects"
            );
        }
    }

    #[test]
    fn authenticated_request_carries_token_and_query() {
        let mut session = session("https://sevone.example.com/api/v2");
        session.token = Some(Token::new("tok-123"));

        let request = session
            .build_get(&ApiRequest::new("/devices").param("page", 1).param("size", 20))
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://sevone.example.com/api/v2/devices?page=1&size=20"
        );
        assert_eq!(request.headers().get(AUTH_HEADER).unwrap(), "tok-123");
    }

    #[test]
    fn requests_before_login_are_rejected() {
        let session = session("https://sevone.example.com/api/v2");
        let err = session.build_get(&ApiRequest::new("/devices")).unwrap_err();
        assert!(err.is_auth());
        assert!(session.token().is_none());
    }

    #[test]
    fn sign_in_yields_the_returned_token() {
        let token = token_from(StatusCode::OK, br#"{"token": "abc", "user": "admin"}"#).unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn sign_in_rejections_are_auth_errors() {
        let cases: [(StatusCode, &[u8]); 6] = [
            (StatusCode::UNAUTHORIZED, br#"{"token": "abc"}"#),
            (StatusCode::INTERNAL_SERVER_ERROR, b""),
            (StatusCode::OK, br#"{"user": "admin"}"#),
            (StatusCode::OK, br#"{"token": ""}"#),
            (StatusCode::OK, br#"{"token": null}"#),
            (StatusCode::OK, b"<html>login</html>"),
        ];
        for (status, body) in cases {
            let err = token_from(status, body).unwrap_err();
            assert!(err.is_auth(), "{status}: {err:?}");
        }
    }
}
