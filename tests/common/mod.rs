//! Shared helpers for the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use bol_api::{
    Result,
    auth::{PlazaSigner, StaticToken},
    client::{PlazaApi, RetailerApi},
    transport::{ApiRequest, Transport, TransportResponse},
};

/// Transport that records every request and answers from a queue.
///
/// Once the queue is drained the last response is repeated.
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    last: Mutex<Option<TransportResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the stub so a client can own a handle while the test inspects it.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Queues a response.
    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(TransportResponse::new(status, body));
        self
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("should have sent a request")
    }
}

impl Transport for StubTransport {
    async fn send<'a>(&'a self, request: ApiRequest) -> Result<TransportResponse> {
        self.requests.lock().expect("requests lock").push(request);

        let next = self.responses.lock().expect("responses lock").pop_front();
        let mut last = self.last.lock().expect("last lock");
        if let Some(response) = next {
            *last = Some(response);
        }
        Ok(last.clone().unwrap_or_else(|| TransportResponse::new(404, "no stubbed response")))
    }
}

pub fn plaza_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/plaza/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

pub fn retailer_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/retailer/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

pub fn plaza_api(transport: &Arc<StubTransport>) -> PlazaApi<Arc<StubTransport>> {
    PlazaApi::new(Arc::clone(transport), PlazaSigner::new("api_key", "api_secret"))
        .with_test_environment(true)
}

pub fn retailer_api(transport: &Arc<StubTransport>) -> RetailerApi<Arc<StubTransport>, StaticToken> {
    RetailerApi::new(Arc::clone(transport), StaticToken::new("test_access_token"))
}

/// Process status body as the Retailer API returns it for write calls.
pub fn retailer_process_status(event_type: &str) -> String {
    format!(
        r#"{{
  "id": 1234567,
  "entityId": "987654321",
  "eventType": "{event_type}",
  "description": "Example process status description for processing 987654321.",
  "status": "PENDING",
  "createTimestamp": "2018-11-14T09:34:41+01:00",
  "links": [
    {{"rel": "self", "href": "https://api.bol.com/retailer/process-status/1234567", "method": "GET"}}
  ]
}}"#
    )
}
