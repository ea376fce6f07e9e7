//! Partyline bus implementation

use crate::handler::{Handler, HandlerId};
use crate::operator::{Operator, OperatorId};
use crate::{Error, HandlerError};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// One entry in a service's handler list
#[derive(Debug, Clone)]
pub struct Registration {
    pub handler: Handler,
    /// Operator the handler was connected through, if any
    pub owner: Option<OperatorId>,
}

/// Registry of named services shared by every mounted application.
///
/// Each service name maps to its handlers in registration order. Queries run
/// the handlers synchronously on the caller's stack, against a snapshot of
/// the list taken before the first handler runs, so a handler may itself
/// query or register on the same bus.
#[derive(Clone)]
pub struct Partyline {
    /// Handlers registered under each service name
    handlers: Arc<DashMap<String, Vec<Registration>>>,

    config: Arc<PartylineConfig>,
}

/// Partyline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartylineConfig {
    /// Treat an unknown service name as having no handlers instead of
    /// failing with [`Error::NoSuchServiceName`]
    pub ignore_missing_services: bool,
}

impl Partyline {
    /// Create a strict partyline
    pub fn new() -> Self {
        Self::with_config(PartylineConfig::default())
    }

    pub fn with_config(config: PartylineConfig) -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn builder() -> PartylineBuilder {
        PartylineBuilder::new()
    }

    pub fn config(&self) -> &PartylineConfig {
        &self.config
    }

    /// Append `handler` to the list for `service_name`.
    ///
    /// Registering the same handler twice keeps both entries; each fires.
    pub fn connect(&self, service_name: &str, handler: impl Into<Handler>) -> HandlerId {
        self.register(service_name, handler.into(), None)
    }

    pub(crate) fn register(
        &self,
        service_name: &str,
        handler: Handler,
        owner: Option<OperatorId>,
    ) -> HandlerId {
        let id = handler.id();
        self.handlers
            .entry(service_name.to_string())
            .or_default()
            .push(Registration { handler, owner });

        debug!(service = service_name, handler = ?id, owner = ?owner, "Connected partyline handler");
        id
    }

    /// Ask every handler for `service_name` and collect the useful answers.
    ///
    /// Handlers owned by `operator` are skipped, declining handlers are left
    /// out of the result, and the first failing handler aborts the query.
    pub fn ask_around(
        &self,
        service_name: &str,
        payload: &Value,
        operator: Option<&Operator>,
    ) -> Result<Vec<Value>, Error> {
        let registrations = self.snapshot(service_name)?;
        let mut answers = Vec::with_capacity(registrations.len());
        let mut skipped = 0usize;

        for registration in &registrations {
            let id = registration.handler.id();
            if operator.is_some_and(|operator| operator.owns(id)) {
                skipped += 1;
                continue;
            }

            match registration.handler.call(payload) {
                Ok(answer) => answers.push(answer),
                Err(HandlerError::Declined) => {
                    trace!(service = service_name, handler = ?id, "Handler declined");
                }
                Err(HandlerError::Failed(message)) => {
                    return Err(Error::HandlerFailed {
                        service: service_name.to_string(),
                        message,
                    });
                }
            }
        }

        debug!(
            service = service_name,
            handlers = registrations.len(),
            skipped,
            answers = answers.len(),
            "Asked around the partyline"
        );
        Ok(answers)
    }

    /// Broadcast to every handler for `service_name`, without self-exclusion.
    ///
    /// Handlers run lazily as the returned iterator is advanced. A declining
    /// handler yields `Ok(None)` rather than being dropped.
    pub fn send_all<'a>(
        &self,
        service_name: &str,
        payload: &'a Value,
    ) -> Result<Broadcast<'a>, Error> {
        let registrations = self.snapshot(service_name)?;
        debug!(
            service = service_name,
            handlers = registrations.len(),
            "Broadcasting on the partyline"
        );
        Ok(Broadcast {
            service: service_name.to_string(),
            payload,
            registrations: registrations.into_iter(),
        })
    }

    /// Number of handlers registered for `service_name`
    pub fn handler_count(&self, service_name: &str) -> usize {
        self.handlers
            .get(service_name)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    pub fn has_service(&self, service_name: &str) -> bool {
        self.handlers.contains_key(service_name)
    }

    /// All known service names, sorted
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Copy of the handler list for `service_name`, in registration order
    pub fn registrations(&self, service_name: &str) -> Vec<Registration> {
        self.handlers
            .get(service_name)
            .map(|handlers| handlers.clone())
            .unwrap_or_default()
    }

    fn snapshot(&self, service_name: &str) -> Result<Vec<Registration>, Error> {
        // Clone out so no shard lock is held while handlers run.
        match self.handlers.get(service_name) {
            Some(handlers) => Ok(handlers.clone()),
            None if self.config.ignore_missing_services => {
                warn!(service = service_name, "No handlers for service; ignoring");
                Ok(Vec::new())
            }
            None => Err(Error::NoSuchServiceName(service_name.to_string())),
        }
    }
}

impl Default for Partyline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Partyline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partyline")
            .field("services", &self.service_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Lazy fan-out returned by [`Partyline::send_all`]
pub struct Broadcast<'a> {
    service: String,
    payload: &'a Value,
    registrations: std::vec::IntoIter<Registration>,
}

impl Broadcast<'_> {
    /// Run every remaining handler, stopping at the first failure
    pub fn answers(self) -> Result<Vec<Option<Value>>, Error> {
        self.collect()
    }
}

impl Iterator for Broadcast<'_> {
    type Item = Result<Option<Value>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let registration = self.registrations.next()?;
        let answer = match registration.handler.call(self.payload) {
            Ok(answer) => Ok(Some(answer)),
            Err(HandlerError::Declined) => Ok(None),
            Err(HandlerError::Failed(message)) => Err(Error::HandlerFailed {
                service: self.service.clone(),
                message,
            }),
        };
        Some(answer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.registrations.size_hint()
    }
}

impl ExactSizeIterator for Broadcast<'_> {}

/// Partyline builder
pub struct PartylineBuilder {
    config: PartylineConfig,
}

impl PartylineBuilder {
    pub fn new() -> Self {
        Self {
            config: PartylineConfig::default(),
        }
    }

    /// Degrade unknown service names to an empty answer set
    pub fn ignore_missing_services(mut self, enabled: bool) -> Self {
        self.config.ignore_missing_services = enabled;
        self
    }

    pub fn build(self) -> Partyline {
        Partyline::with_config(self.config)
    }
}

impl Default for PartylineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
