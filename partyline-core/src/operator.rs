//! Per-application capability for talking to the partyline

use crate::bus::{Broadcast, Partyline};
use crate::handler::{Handler, HandlerId};
use crate::Error;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OPERATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of an [`Operator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(u64);

/// A mounted application's line into the partyline.
///
/// One operator is minted per invitation. It remembers every handler
/// connected through it so that its own queries skip those handlers.
#[derive(Debug)]
pub struct Operator {
    id: OperatorId,
    partyline: Partyline,
    handlers: Mutex<HashSet<HandlerId>>,
}

impl Operator {
    pub fn new(partyline: Partyline) -> Self {
        Self {
            id: OperatorId(NEXT_OPERATOR_ID.fetch_add(1, Ordering::Relaxed)),
            partyline,
            handlers: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn partyline(&self) -> &Partyline {
        &self.partyline
    }

    /// Register `handler` for `service_name` on behalf of this operator
    pub fn connect(&self, service_name: &str, handler: impl Into<Handler>) -> HandlerId {
        let handler = handler.into();
        self.handlers.lock().insert(handler.id());
        self.partyline.register(service_name, handler, Some(self.id))
    }

    /// Ask everyone else: like [`Partyline::ask_around`] with this operator
    /// excluded
    pub fn ask_around(&self, service_name: &str, payload: &Value) -> Result<Vec<Value>, Error> {
        self.partyline.ask_around(service_name, payload, Some(self))
    }

    /// Broadcast to every handler, this operator's own included
    pub fn send_all<'a>(&self, service_name: &str, payload: &'a Value) -> Result<Broadcast<'a>, Error> {
        self.partyline.send_all(service_name, payload)
    }

    /// Whether `handler` was connected through this operator
    pub fn owns(&self, handler: HandlerId) -> bool {
        self.handlers.lock().contains(&handler)
    }

    /// Snapshot of the handlers connected through this operator
    pub fn handlers(&self) -> HashSet<HandlerId> {
        self.handlers.lock().clone()
    }
}
