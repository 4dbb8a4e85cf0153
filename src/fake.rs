//! In-memory [`SevOneApi`] for tests.

use serde_json::{
    json,
    Value,
};
use sevone_client::{
    ApiRequest,
    ClientError,
    SevOneApi,
};
use std::{
    collections::{
        HashMap,
        HashSet,
    },
    future::Future,
    pin::Pin,
    sync::Mutex,
};

#[derive(Default)]
pub(crate) struct FakeApi {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    /// Serve `body` for `path`, whatever the query.
    pub(crate) fn respond(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    /// Serve `content` as page `page` of `total_pages`.
    pub(crate) fn page(mut self, path: &str, page: u32, total_pages: u32, content: Value) -> Self {
        self.responses.insert(
            Self::page_key(path, page),
            json!({ "content": content, "totalPages": total_pages }),
        );
        self
    }

    /// Serve `content` as the only page of `path`.
    pub(crate) fn listing(self, path: &str, content: Value) -> Self {
        self.page(path, 0, 1, content)
    }

    /// Answer every request for `path` with a 500.
    pub(crate) fn fail(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    pub(crate) fn fail_page(mut self, path: &str, page: u32) -> Self {
        self.failing.insert(Self::page_key(path, page));
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn page_key(path: &str, page: u32) -> String {
        format!("{path}#page={page}")
    }

    fn key(request: &ApiRequest) -> String {
        match request.query_value("page") {
            Some(page) => format!("{}#page={page}", request.path),
            None => request.path.clone(),
        }
    }
}

impl SevOneApi for FakeApi {
    fn get(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<Value, ClientError>> + Send + '_>> {
        self.requests.lock().unwrap().push(request.clone());
        let key = Self::key(&request);
        let result = if self.failing.contains(&request.path) || self.failing.contains(&key) {
            Err(ClientError::Status {
                url: request.to_string(),
                status: 500,
            })
        } else {
            self.responses.get(&key).cloned().ok_or_else(|| ClientError::Status {
                url: request.to_string(),
                status: 404,
            })
        };
        Box::pin(async move { result })
    }
}
