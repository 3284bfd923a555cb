//! Resource routing subsystem.
//!
//! # Data Flow
//! ```text
//! Data API request (verb, path)
//!     → router.rs (verb picks the dispatch table, path picks the entry)
//!     → resource.rs (entry kind + captured name → tagged resource)
//!     → Return: RouteMatch { handler_id, resource_path, resource } or no match
//! ```
//!
//! # Design Decisions
//! - Tables compiled once at startup, immutable at runtime
//! - Only GET reaches request resources and only PUT reaches response
//!   resources; any other pairing is an explicit no-match
//! - Whole paths are matched, never prefixes, so `files/{name}/filename`
//!   and `files/{name}/content` stay distinct routes

pub mod resource;
pub mod router;

pub use resource::{RequestResource, Resource, ResponseResource};
pub use router::{ResourceRouter, RouteMatch, RouterError};
