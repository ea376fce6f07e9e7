//! Partyline handlers and their identities

use crate::HandlerError;
use serde_json::Value;
use std::sync::Arc;

/// Function signature behind every [`Handler`]
pub type HandlerFn = dyn Fn(&Value) -> Result<Value, HandlerError> + Send + Sync;

/// Identity of a handler, stable across clones of the same [`Handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(usize);

/// A callable registered against a service name.
///
/// Cloning shares the underlying function, so clones keep the same
/// [`HandlerId`]. Two handlers built from separate `Handler::new` calls are
/// always distinct, even when wrapping identical closures.
#[derive(Clone)]
pub struct Handler {
    func: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Handler that always answers with a clone of `value`
    pub fn constant(value: Value) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn id(&self) -> HandlerId {
        HandlerId(Arc::as_ptr(&self.func) as *const () as usize)
    }

    pub fn call(&self, payload: &Value) -> Result<Value, HandlerError> {
        (self.func)(payload)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handler").field(&self.id()).finish()
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
{
    fn from(func: F) -> Self {
        Handler::new(func)
    }
}
