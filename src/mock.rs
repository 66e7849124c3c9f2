//! In-memory [`Connection`] for testing code built on the resource client.
//!
//! `MockConnection` answers GETs from per-address scripts, answers mutating
//! calls from a FIFO queue of [`Outcome`]s, and records every call so tests
//! can assert on the exact addresses, bodies and headers that were sent.
//!
//! ```
//! use std::sync::Arc;
//! use oneview::mock::MockConnection;
//! use oneview::resource::ResourceClient;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mock = Arc::new(MockConnection::new());
//! mock.on_get("/rest/fc-networks/1", json!({"name": "SAN A"}));
//!
//! let client = ResourceClient::new(mock.clone(), "/rest/fc-networks");
//! let network = client.get("1").await.unwrap();
//! assert_eq!(network["name"], "SAN A");
//! assert_eq!(mock.calls()[0].uri, "/rest/fc-networks/1");
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::connection::{Connection, CustomHeaders, Outcome};
use crate::error::{OneViewError, Result};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// HTTP verb.
    pub method: &'static str,
    /// Address as passed by the caller.
    pub uri: String,
    /// Request body, if any.
    pub body: Option<Value>,
    /// Custom headers passed with the call.
    pub headers: CustomHeaders,
}

#[derive(Debug, Clone)]
enum Scripted {
    Body(Value),
    Status(StatusCode),
}

#[derive(Default)]
struct MockState {
    gets: HashMap<String, VecDeque<Scripted>>,
    outcomes: VecDeque<Outcome>,
    calls: Vec<Call>,
}

/// Scripted, recording [`Connection`].
#[derive(Default)]
pub struct MockConnection {
    state: Mutex<MockState>,
}

impl MockConnection {
    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panic in another test thread must not hide this test's result.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a GET response for `uri`.
    ///
    /// Responses are served in order; the last one keeps being served once
    /// the queue is down to it.
    pub fn on_get(&self, uri: &str, body: Value) -> &Self {
        self.state()
            .gets
            .entry(uri.to_string())
            .or_default()
            .push_back(Scripted::Body(body));
        self
    }

    /// Queues a GET failure with the given HTTP status for `uri`.
    pub fn fail_get(&self, uri: &str, status: StatusCode) -> &Self {
        self.state()
            .gets
            .entry(uri.to_string())
            .or_default()
            .push_back(Scripted::Status(status));
        self
    }

    /// Queues the outcome of the next mutating call (POST, PUT, DELETE or PATCH).
    ///
    /// Mutating calls with nothing queued answer `Outcome::Body(Value::Null)`.
    pub fn respond_with(&self, outcome: Outcome) -> &Self {
        self.state().outcomes.push_back(outcome);
        self
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Returns the addresses of the GETs received so far.
    pub fn get_uris(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.method == "GET")
            .map(|c| c.uri.clone())
            .collect()
    }

    fn record(&self, method: &'static str, uri: &str, body: Option<&Value>, headers: &CustomHeaders) {
        self.state().calls.push(Call {
            method,
            uri: uri.to_string(),
            body: body.cloned(),
            headers: headers.clone(),
        });
    }

    fn next_outcome(&self) -> Outcome {
        self.state()
            .outcomes
            .pop_front()
            .unwrap_or(Outcome::Body(Value::Null))
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn get(&self, uri: &str) -> Result<Value> {
        self.record("GET", uri, None, &CustomHeaders::new());

        let scripted = {
            let mut state = self.state();
            match state.gets.get_mut(uri) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(status)) => Err(OneViewError::HttpStatus {
                status,
                body: String::new(),
            }),
            None => Err(OneViewError::not_found(uri)),
        }
    }

    async fn post(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome> {
        self.record("POST", uri, body, headers);
        Ok(self.next_outcome())
    }

    async fn put(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome> {
        self.record("PUT", uri, body, headers);
        Ok(self.next_outcome())
    }

    async fn delete(&self, uri: &str, headers: &CustomHeaders) -> Result<Outcome> {
        self.record("DELETE", uri, None, headers);
        Ok(self.next_outcome())
    }

    async fn patch(&self, uri: &str, operations: &Value, headers: &CustomHeaders) -> Result<Outcome> {
        self.record("PATCH", uri, Some(operations), headers);
        Ok(self.next_outcome())
    }
}
