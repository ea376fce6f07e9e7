// Prefix routing across mounted applications

use crate::{Application, Error, NotFoundApp, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// An application mounted under a path prefix
#[derive(Clone)]
pub struct Mount {
    pub prefix: String,
    pub app: Arc<dyn Application>,
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount").field("prefix", &self.prefix).finish()
    }
}

/// Result of matching a path against the mounts
#[derive(Clone)]
pub struct RouteMatch {
    pub app: Arc<dyn Application>,
    /// Prefix consumed by this router; empty when the root application matched
    pub consumed: String,
    /// Path left for the selected application
    pub remaining: String,
}

/// Dispatches requests to mounted applications by longest matching prefix.
///
/// Paths that match no mount go to the root application untouched; routing
/// never fails on its own.
#[derive(Clone)]
pub struct Router {
    root: Arc<dyn Application>,
    mounts: Vec<Mount>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Select the application for `path` and split the path into the
    /// consumed prefix and the remainder.
    pub fn route(&self, path: &str) -> RouteMatch {
        let best = self
            .mounts
            .iter()
            .filter(|mount| prefix_matches(&mount.prefix, path))
            .max_by_key(|mount| mount.prefix.len());

        match best {
            Some(mount) => {
                debug!(prefix = %mount.prefix, path, "Routing to mounted application");
                RouteMatch {
                    app: mount.app.clone(),
                    consumed: mount.prefix.clone(),
                    remaining: path[mount.prefix.len()..].to_string(),
                }
            }
            None => {
                debug!(path, "Routing to root application");
                RouteMatch {
                    app: self.root.clone(),
                    consumed: String::new(),
                    remaining: path.to_string(),
                }
            }
        }
    }

    /// Route the request and call the selected application with its path
    /// rewritten relative to the mount point.
    pub fn dispatch(&self, mut request: Request) -> Result<Response, Error> {
        let RouteMatch {
            app,
            consumed,
            remaining,
        } = self.route(&request.path);

        request.script_name.push_str(&consumed);
        request.path = remaining;
        app.call(request)
    }

    /// Root application followed by mounted applications in mount order
    pub fn applications(&self) -> Vec<Arc<dyn Application>> {
        std::iter::once(self.root.clone())
            .chain(self.mounts.iter().map(|mount| mount.app.clone()))
            .collect()
    }

    pub fn mount_prefixes(&self) -> Vec<&str> {
        self.mounts.iter().map(|mount| mount.prefix.as_str()).collect()
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }
}

impl Application for Router {
    fn call(&self, request: Request) -> Result<Response, Error> {
        self.dispatch(request)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("mounts", &self.mount_prefixes())
            .finish()
    }
}

/// Builder collecting the root and mounts for a [`Router`]
#[derive(Default)]
pub struct RouterBuilder {
    root: Option<Arc<dyn Application>>,
    mounts: Vec<(String, Arc<dyn Application>)>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application that handles paths no mount claims
    pub fn root<A: Application + 'static>(self, app: A) -> Self {
        self.root_arc(Arc::new(app))
    }

    pub fn root_arc(mut self, app: Arc<dyn Application>) -> Self {
        self.root = Some(app);
        self
    }

    /// Mount an application under `prefix`.
    ///
    /// A leading `/` is added and a trailing `/` trimmed, so `"one/"` and
    /// `"/one"` name the same mount.
    pub fn mount<A: Application + 'static>(self, prefix: impl Into<String>, app: A) -> Self {
        self.mount_arc(prefix, Arc::new(app))
    }

    pub fn mount_arc(mut self, prefix: impl Into<String>, app: Arc<dyn Application>) -> Self {
        self.mounts.push((prefix.into(), app));
        self
    }

    /// Build the router, rejecting empty and duplicate prefixes
    pub fn build(self) -> Result<Router, Error> {
        let mut mounts: Vec<Mount> = Vec::with_capacity(self.mounts.len());

        for (raw, app) in self.mounts {
            let prefix = normalize_prefix(&raw);
            if prefix.is_empty() {
                return Err(Error::RoutingMisconfiguration(format!(
                    "mount prefix '{}' is empty; use the root application instead",
                    raw
                )));
            }
            if mounts.iter().any(|mount| mount.prefix == prefix) {
                return Err(Error::RoutingMisconfiguration(format!(
                    "two applications mounted at '{}'",
                    prefix
                )));
            }
            mounts.push(Mount { prefix, app });
        }

        Ok(Router {
            root: self.root.unwrap_or_else(|| Arc::new(NotFoundApp)),
            mounts,
        })
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// `path` equals `prefix` or continues it at a segment boundary
fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
