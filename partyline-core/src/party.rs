//! The party: a router and a partyline owned together.
//!
//! A [`Party`] wraps the mounted applications, sends every configured
//! invitation through its router once at construction, and afterwards passes
//! live requests straight through.
//!
//! # Examples
//!
//! ```rust
//! use partyline_core::{Party, Request, Response, Error};
//!
//! let party = Party::builder()
//!     .root(|_: Request| -> Result<Response, Error> { Ok(Response::text("root")) })
//!     .mount("/one", |r: Request| -> Result<Response, Error> { Ok(Response::text(r.path)) })
//!     .ignore_missing_services(true)
//!     .build()
//!     .unwrap();
//!
//! let response = party.dispatch(Request::new("/one/page")).unwrap();
//! assert_eq!(response.body_text(), "/page");
//! ```

use crate::invitation::{invitation_request, Rsvp, DEFAULT_PARTYLINE_KEY};
use crate::{Application, Error, Operator, Partyline, PartylineConfig, Request, Response, Router, RouterBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Party configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Paths invited at construction, in order
    pub invites: Vec<String>,

    /// Degrade unknown service names to empty answers
    pub ignore_missing_services: bool,

    /// Environ key the operator is handed over under
    pub partyline_key: String,

    /// Base URL recorded in invitation requests
    pub base_url: Option<String>,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            invites: Vec::new(),
            ignore_missing_services: false,
            partyline_key: DEFAULT_PARTYLINE_KEY.to_string(),
            base_url: None,
        }
    }
}

impl PartyConfig {
    pub fn partyline_config(&self) -> PartylineConfig {
        PartylineConfig {
            ignore_missing_services: self.ignore_missing_services,
        }
    }
}

/// Router plus partyline, with the invitation handshake already done
pub struct Party {
    router: Router,
    partyline: Partyline,
    config: PartyConfig,
    rsvps: Vec<Rsvp>,
}

impl Party {
    /// Create a party and send the configured invitations
    pub fn new(router: Router, config: PartyConfig) -> Self {
        let partyline = Partyline::with_config(config.partyline_config());
        let mut party = Self {
            router,
            partyline,
            config,
            rsvps: Vec::new(),
        };
        let invites = party.config.invites.clone();
        party.rsvps = party.send_invitations(invites.as_slice());
        party
    }

    pub fn builder() -> PartyBuilder {
        PartyBuilder::new()
    }

    /// Invite each path in order, minting one operator per invitation.
    ///
    /// Rejections are reported in the returned RSVPs; they never stop the
    /// remaining invitations.
    pub fn send_invitations<S: AsRef<str>>(&self, invites: &[S]) -> Vec<Rsvp> {
        invites
            .iter()
            .map(|path| self.invite(path.as_ref()))
            .collect()
    }

    fn invite(&self, path: &str) -> Rsvp {
        let operator = Arc::new(Operator::new(self.partyline.clone()));
        let request = invitation_request(
            path,
            &self.config.partyline_key,
            operator.clone(),
            self.config.base_url.as_deref(),
        );

        let outcome = self.router.dispatch(request);
        let rsvp = Rsvp {
            path: path.to_string(),
            outcome,
        };

        if rsvp.is_accepted() {
            info!(
                path,
                operator = ?operator.id(),
                handlers = operator.handlers().len(),
                "Invitation accepted"
            );
        } else {
            match &rsvp.outcome {
                Ok(response) => warn!(path, status = response.status, "Invitation declined"),
                Err(error) => warn!(path, %error, "Invitation rejected"),
            }
        }
        rsvp
    }

    /// Pass a live request through the router
    pub fn dispatch(&self, request: Request) -> Result<Response, Error> {
        self.router.dispatch(request)
    }

    pub fn partyline(&self) -> &Partyline {
        &self.partyline
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// Replies to the invitations sent at construction
    pub fn rsvps(&self) -> &[Rsvp] {
        &self.rsvps
    }

    /// Operator for a caller that is not a mounted application
    pub fn operator(&self) -> Operator {
        Operator::new(self.partyline.clone())
    }
}

impl Application for Party {
    fn call(&self, request: Request) -> Result<Response, Error> {
        self.dispatch(request)
    }
}

impl std::fmt::Debug for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Party")
            .field("router", &self.router)
            .field("partyline", &self.partyline)
            .field("config", &self.config)
            .finish()
    }
}

/// Party builder
#[derive(Default)]
pub struct PartyBuilder {
    router: RouterBuilder,
    config: PartyConfig,
}

impl PartyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root<A: Application + 'static>(mut self, app: A) -> Self {
        self.router = self.router.root(app);
        self
    }

    pub fn root_arc(mut self, app: Arc<dyn Application>) -> Self {
        self.router = self.router.root_arc(app);
        self
    }

    pub fn mount<A: Application + 'static>(mut self, prefix: impl Into<String>, app: A) -> Self {
        self.router = self.router.mount(prefix, app);
        self
    }

    pub fn mount_arc(mut self, prefix: impl Into<String>, app: Arc<dyn Application>) -> Self {
        self.router = self.router.mount_arc(prefix, app);
        self
    }

    /// Replace the whole configuration, keeping the mounts
    pub fn config(mut self, config: PartyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn invite(mut self, path: impl Into<String>) -> Self {
        self.config.invites.push(path.into());
        self
    }

    pub fn invites<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.invites.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn ignore_missing_services(mut self, enabled: bool) -> Self {
        self.config.ignore_missing_services = enabled;
        self
    }

    pub fn partyline_key(mut self, key: impl Into<String>) -> Self {
        self.config.partyline_key = key.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Build the router and throw the party
    pub fn build(self) -> Result<Party, Error> {
        let router = self.router.build()?;
        Ok(Party::new(router, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Handler, Invitee, BASE_URL_KEY};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    /// Application that records every request and joins on `/__invite__`
    struct Guest {
        name: &'static str,
        invitee: Invitee,
        seen: Mutex<Vec<Request>>,
    }

    impl Guest {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                invitee: Invitee::new(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Application for Guest {
        fn call(&self, request: Request) -> Result<Response, Error> {
            self.seen.lock().push(request.clone());
            if request.path == "/__invite__" {
                let operator = self.invitee.accept(&request, DEFAULT_PARTYLINE_KEY)?;
                operator.connect("ping", Handler::constant(json!(format!("pong from {}", self.name))));
                return Ok(Response::text("ok"));
            }
            Ok(Response::text(self.name))
        }
    }

    #[test]
    fn test_construction_sends_invitations() {
        let root = Guest::new("root");
        let one = Guest::new("one");
        let party = Party::builder()
            .root_arc(root.clone())
            .mount_arc("/one", one.clone())
            .invites(["/__invite__", "/one/__invite__"])
            .build()
            .unwrap();

        assert_eq!(party.rsvps().len(), 2);
        assert!(party.rsvps().iter().all(Rsvp::is_accepted));
        assert_eq!(root.seen.lock().len(), 1);
        assert_eq!(one.seen.lock().len(), 1);
        assert_eq!(one.seen.lock()[0].script_name, "/one");
        assert_eq!(party.partyline().handler_count("ping"), 2);
    }

    #[test]
    fn test_each_invitation_gets_its_own_operator() {
        let root = Guest::new("root");
        let one = Guest::new("one");
        Party::builder()
            .root_arc(root.clone())
            .mount_arc("/one", one.clone())
            .invites(["/__invite__", "/one/__invite__"])
            .build()
            .unwrap();

        let root_op = root.invitee.operator().unwrap();
        let one_op = one.invitee.operator().unwrap();
        assert_ne!(root_op.id(), one_op.id());

        assert_eq!(
            root_op.ask_around("ping", &Value::Null).unwrap(),
            vec![json!("pong from one")]
        );
    }

    #[test]
    fn test_second_handshake_is_rejected() {
        let one = Guest::new("one");
        let party = Party::builder()
            .mount_arc("/one", one.clone())
            .invite("/one/__invite__")
            .build()
            .unwrap();

        let rsvps = party.send_invitations(&["/one/__invite__"]);
        assert_eq!(rsvps.len(), 1);
        assert!(matches!(rsvps[0].outcome, Err(Error::DuplicateHandshake(_))));
        assert_eq!(party.partyline().handler_count("ping"), 1);
    }

    #[test]
    fn test_invitation_to_unmounted_path_reaches_root() {
        let party = Party::builder().invite("/nobody/__invite__").build().unwrap();
        assert_eq!(party.rsvps().len(), 1);
        assert!(matches!(party.rsvps()[0].outcome, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_live_requests_pass_through() {
        let one = Guest::new("one");
        let party = Party::builder().mount_arc("/one", one.clone()).build().unwrap();

        let response = party.call(Request::new("/one/page")).unwrap();
        assert_eq!(response.body_text(), "one");
        let seen = one.seen.lock();
        assert_eq!(seen[0].path, "/page");
        assert!(seen[0].environ.is_empty());
    }

    #[test]
    fn test_config_is_applied() {
        let seen_key = Arc::new(Mutex::new(None));
        let seen_url = Arc::new(Mutex::new(None));
        let (key_slot, url_slot) = (seen_key.clone(), seen_url.clone());
        let app = move |request: Request| -> Result<Response, Error> {
            *key_slot.lock() = Some(request.environ.contains("custom"));
            *url_slot.lock() = request.environ.get::<String>(BASE_URL_KEY).cloned();
            Ok(Response::ok())
        };

        let party = Party::builder()
            .root(app)
            .partyline_key("custom")
            .base_url("http://localhost:5000")
            .ignore_missing_services(true)
            .invite("/__invite__")
            .build()
            .unwrap();

        assert_eq!(*seen_key.lock(), Some(true));
        assert_eq!(seen_url.lock().as_deref(), Some("http://localhost:5000"));
        assert!(party.partyline().config().ignore_missing_services);
        assert!(party.operator().ask_around("nothing", &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_mount_fails_build() {
        let result = Party::builder()
            .mount_arc("/one", Guest::new("a"))
            .mount_arc("/one/", Guest::new("b"))
            .build();
        assert!(matches!(result, Err(Error::RoutingMisconfiguration(_))));
    }

    #[test]
    fn test_party_config_serde_defaults() {
        let config: PartyConfig = serde_json::from_value(json!({
            "invites": ["/__invite__"]
        }))
        .unwrap();
        assert_eq!(config.invites, vec!["/__invite__"]);
        assert_eq!(config.partyline_key, DEFAULT_PARTYLINE_KEY);
        assert!(!config.ignore_missing_services);
        assert_eq!(config.base_url, None);
    }
}
