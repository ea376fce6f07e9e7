// The request-handling contract shared by every mounted application

use crate::{Error, Request, Response};

/// An opaque request handler mounted under a router.
///
/// Calls are synchronous: a partyline query issued while serving a request
/// runs to completion on the same call stack before `call` returns.
pub trait Application: Send + Sync {
    fn call(&self, request: Request) -> Result<Response, Error>;
}

impl<F> Application for F
where
    F: Fn(Request) -> Result<Response, Error> + Send + Sync,
{
    fn call(&self, request: Request) -> Result<Response, Error> {
        self(request)
    }
}

/// Application that answers every request with 404.
///
/// Stands in as the root of a router that was built without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundApp;

impl Application for NotFoundApp {
    fn call(&self, request: Request) -> Result<Response, Error> {
        Err(Error::NotFound(request.full_path()))
    }
}
