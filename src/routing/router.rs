//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile the request-side and response-side dispatch tables
//! - Resolve a (verb, path) pair to a tagged resource
//! - Extract `handler_id` and `resource_path` from the matched path
//!
//! # Design Decisions
//! - One table per verb; a verb without a table never matches
//! - Captured segments are percent-decoded; `resource_path` is kept as sent

use axum::http::Method;
use matchit::{InsertError, Params, Router};
use thiserror::Error;

use crate::routing::resource::{ReadKind, Resource, WriteKind, READ_ROUTES, WRITE_ROUTES};

const HANDLER_ROUTE_PREFIX: &str = "/handlers/{handler_id}";

/// Error raised while compiling the dispatch tables.
#[derive(Debug, Error)]
#[error("failed to register route {route}: {source}")]
pub struct RouterError {
    route: String,
    #[source]
    source: InsertError,
}

/// A data API path resolved against the dispatch tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Handler the call targets.
    pub handler_id: String,
    /// Path suffix after `/handlers/{handler_id}/{side}/`.
    pub resource_path: String,
    /// Resource the call reads or writes.
    pub resource: Resource,
}

/// Immutable verb-scoped dispatch tables.
pub struct ResourceRouter {
    read: Router<ReadKind>,
    write: Router<WriteKind>,
}

impl ResourceRouter {
    /// Compile both dispatch tables.
    pub fn new() -> Result<Self, RouterError> {
        Ok(Self {
            read: compile("request", READ_ROUTES)?,
            write: compile("response", WRITE_ROUTES)?,
        })
    }

    /// Resolve a data API call.
    ///
    /// Returns `None` for any (verb, path) pair that is not registered.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let (handler_id, resource) = if method == Method::GET {
            let matched = self.read.at(path).ok()?;
            let (handler_id, name) = captures(&matched.params)?;
            (handler_id, Resource::Request(matched.value.bind(name)))
        } else if method == Method::PUT {
            let matched = self.write.at(path).ok()?;
            let (handler_id, name) = captures(&matched.params)?;
            (handler_id, Resource::Response(matched.value.bind(name)))
        } else {
            return None;
        };

        Some(RouteMatch {
            handler_id,
            resource_path: resource_path(path)?.to_owned(),
            resource,
        })
    }
}

fn compile<K: Copy>(side: &str, table: &[(&str, K)]) -> Result<Router<K>, RouterError> {
    let mut router = Router::new();
    for (pattern, kind) in table {
        let route = format!("{HANDLER_ROUTE_PREFIX}/{side}/{pattern}");
        router
            .insert(route.clone(), *kind)
            .map_err(|source| RouterError { route, source })?;
    }
    Ok(router)
}

/// Decoded `handler_id` and `name` captures. Unnamed routes yield an empty name.
fn captures(params: &Params<'_, '_>) -> Option<(String, String)> {
    let handler_id = urlencoding::decode(params.get("handler_id")?).ok()?.into_owned();
    let name = match params.get("name") {
        Some(raw) => urlencoding::decode(raw).ok()?.into_owned(),
        None => String::new(),
    };
    Some((handler_id, name))
}

fn resource_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/handlers/")?;
    let (_, rest) = rest.split_once('/')?;
    let (_, resource_path) = rest.split_once('/')?;
    Some(resource_path)
}
