//! Data API for externally handled HTTP requests.
//!
//! A delegated request is snapshotted, bound to a response sink and
//! registered under a handler id. The external process that handles it
//! reads request resources and writes response resources over a local
//! HTTP API addressed by that id.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resource;
pub mod routing;

pub use config::DataApiConfig;
pub use http::DataServer;
pub use lifecycle::Shutdown;
pub use registry::{Handler, HandlerRegistry};
