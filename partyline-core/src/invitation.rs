//! Invitation handshake: how mounted applications join the partyline.
//!
//! The party synthesizes one request per invite path and dispatches it
//! through the same router as live traffic. The request's environ carries a
//! freshly minted [`Operator`] under the partyline key. An application that
//! wants to participate routes its invite path to a handler that calls
//! [`Invitee::accept`] and connects its services through the operator it
//! gets back.
//!
//! ```rust
//! use partyline_core::{Error, Handler, Invitee, Party, Request, Response, DEFAULT_PARTYLINE_KEY};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let invitee = Arc::new(Invitee::new());
//! let joiner = invitee.clone();
//! let app = move |request: Request| -> Result<Response, Error> {
//!     let operator = joiner.accept(&request, DEFAULT_PARTYLINE_KEY)?;
//!     operator.connect("ping", Handler::constant(json!("pong")));
//!     Ok(Response::text("ok"))
//! };
//!
//! let party = Party::builder()
//!     .mount("/one", app)
//!     .invite("/one/__invite__")
//!     .build()
//!     .unwrap();
//!
//! assert!(invitee.is_connected());
//! assert_eq!(party.partyline().handler_count("ping"), 1);
//! ```

use crate::{Environ, Error, Operator, Request, Response};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Environ key the operator is handed over under unless configured otherwise
pub const DEFAULT_PARTYLINE_KEY: &str = "partyline";

/// Environ key carrying the party's configured base URL, when one is set
pub const BASE_URL_KEY: &str = "partyline.base_url";

/// Handshake state held by a participating application.
///
/// Joining succeeds once; every later invitation is rejected with
/// [`Error::DuplicateHandshake`], which surfaces as a 404 so the invite path
/// stays invisible to ordinary callers.
#[derive(Debug, Default)]
pub struct Invitee {
    operator: OnceLock<Arc<Operator>>,
}

impl Invitee {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an invitation, taking the operator out of the request environ
    pub fn accept(&self, request: &Request, key: &str) -> Result<Arc<Operator>, Error> {
        if self.is_connected() {
            warn!(path = %request.full_path(), "Rejected repeat partyline invitation");
            return Err(Error::DuplicateHandshake(request.full_path()));
        }

        let operator = request
            .environ
            .get_arc::<Operator>(key)
            .ok_or_else(|| Error::NotInvited(key.to_string()))?;

        self.operator
            .set(operator.clone())
            .map_err(|_| Error::DuplicateHandshake(request.full_path()))?;

        info!(
            path = %request.full_path(),
            operator = ?operator.id(),
            "Joined the partyline"
        );
        Ok(operator)
    }

    /// The operator received on joining
    pub fn operator(&self) -> Option<&Arc<Operator>> {
        self.operator.get()
    }

    pub fn is_connected(&self) -> bool {
        self.operator.get().is_some()
    }
}

/// Reply to a single invitation
#[derive(Debug)]
pub struct Rsvp {
    pub path: String,
    pub outcome: Result<Response, Error>,
}

impl Rsvp {
    /// The invited application answered with a 2xx response
    pub fn is_accepted(&self) -> bool {
        matches!(&self.outcome, Ok(response) if response.is_success())
    }
}

/// Build the synthetic request that carries `operator` to the application
/// mounted at `path`
pub fn invitation_request(
    path: &str,
    key: &str,
    operator: Arc<Operator>,
    base_url: Option<&str>,
) -> Request {
    let mut environ = Environ::new();
    environ.insert_arc(key, operator);
    if let Some(base_url) = base_url {
        environ.insert(BASE_URL_KEY, base_url.to_string());
    }
    Request::new(path).with_environ(environ)
}
