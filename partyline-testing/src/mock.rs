// Test doubles for mounted applications

use parking_lot::Mutex;
use partyline_core::{
    Application, DEFAULT_PARTYLINE_KEY, Error, Handler, Invitee, Operator, Request, Response,
};
use serde_json::Value;
use std::sync::Arc;

/// What an application saw of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub script_name: String,
}

impl From<&Request> for RecordedRequest {
    fn from(request: &Request) -> Self {
        Self {
            path: request.path.clone(),
            script_name: request.script_name.clone(),
        }
    }
}

/// Application answering a fixed response and recording every request.
///
/// Clones share the same log, so a clone can be mounted while this handle
/// stays in the test for inspection.
#[derive(Clone)]
pub struct RecordingApp {
    response: Response,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingApp {
    pub fn new() -> Self {
        Self::with_response(Response::ok())
    }

    /// Answer with a text body
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_response(Response::text(body))
    }

    pub fn with_response(response: Response) -> Self {
        Self {
            response,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn was_called_with(&self, path: &str) -> bool {
        self.requests.lock().iter().any(|r| r.path == path)
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

impl Default for RecordingApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for RecordingApp {
    fn call(&self, request: Request) -> Result<Response, Error> {
        self.requests.lock().push(RecordedRequest::from(&request));
        Ok(self.response.clone())
    }
}

/// Application that joins the partyline on its invitation path.
///
/// On the handshake it registers every scripted service through its
/// operator, in the order they were added. Other requests fall through to
/// an inner [`RecordingApp`]. Clones share the script and the connection.
#[derive(Clone)]
pub struct JoiningApp {
    invite_path: String,
    partyline_key: String,
    services: Arc<Mutex<Vec<(String, Handler)>>>,
    invitee: Arc<Invitee>,
    recorder: RecordingApp,
}

impl JoiningApp {
    pub fn new() -> Self {
        Self::with_invite_path("/__invite__")
    }

    pub fn with_invite_path(path: impl Into<String>) -> Self {
        Self {
            invite_path: path.into(),
            partyline_key: DEFAULT_PARTYLINE_KEY.to_string(),
            services: Arc::new(Mutex::new(Vec::new())),
            invitee: Arc::new(Invitee::new()),
            recorder: RecordingApp::new(),
        }
    }

    /// Register a service answering a constant value
    pub fn service(self, name: impl Into<String>, answer: Value) -> Self {
        self.handler(name, Handler::constant(answer))
    }

    /// Register a service with an arbitrary handler
    pub fn handler(self, name: impl Into<String>, handler: impl Into<Handler>) -> Self {
        self.services.lock().push((name.into(), handler.into()));
        self
    }

    pub fn partyline_key(mut self, key: impl Into<String>) -> Self {
        self.partyline_key = key.into();
        self
    }

    /// Operator received on the handshake, if any
    pub fn operator(&self) -> Option<Arc<Operator>> {
        self.invitee.operator().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.invitee.is_connected()
    }

    /// Requests other than the handshake
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests()
    }
}

impl Default for JoiningApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for JoiningApp {
    fn call(&self, request: Request) -> Result<Response, Error> {
        if request.path != self.invite_path {
            return self.recorder.call(request);
        }

        let operator = self.invitee.accept(&request, &self.partyline_key)?;
        let services = self.services.lock().clone();
        for (name, handler) in services {
            operator.connect(&name, handler);
        }
        Ok(Response::text("joined"))
    }
}
