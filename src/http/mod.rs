//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Delegating component (external)
//!     → request.rs (snapshot the live request)
//!     → response.rs (sink the external process writes into)
//!     → registry add, external process started
//!
//! External process
//!     → server.rs (data API: route, look up, read/write resource)
//!
//! Delegating component
//!     → PendingResponse resolves once the head is committed
//!     → body streams to the original client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{FilePart, InboundRequest, IntakeError};
pub use response::{PendingResponse, ResponseSink};
pub use server::{AppState, DataServer};
