//! Handler registry subsystem.
//!
//! # Data Flow
//! ```text
//! Delegating component
//!     → handler.rs (bind request snapshot + response sink under an id)
//!     → handlers.rs add()
//!
//! Data API call for {handler_id}
//!     → handlers.rs get() (shared lock, Arc clone, lock released)
//!     → resource accessors run on the Handler without the lock
//!
//! Completion
//!     → handlers.rs remove()
//! ```
//!
//! # Design Decisions
//! - One reader/writer lock scoped to the map; never held across I/O
//! - Handlers are shared as `Arc<Handler>` so a removal never invalidates
//!   an in-flight call
//! - The registry is constructed explicitly and injected, never global

pub mod handler;
pub mod handlers;

pub use handler::Handler;
pub use handlers::HandlerRegistry;
