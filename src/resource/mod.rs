//! Resource accessors.
//!
//! # Data Flow
//! ```text
//! GET  .../request/{resource_path}
//!     → read.rs (extract one piece of the stored request)
//!     → value or byte stream written back to the caller
//!
//! PUT  .../response/{resource_path}
//!     → write.rs (apply the payload to the stored response sink)
//!     → empty 200 to the caller
//! ```
//!
//! # Design Decisions
//! - Accessors are plain functions over a request snapshot or response sink
//! - A missing named sub-resource is always `ResourceNotFound`, never another kind
//! - Duplicated headers, cookies, params and fields resolve to the first value

pub mod error;
pub mod read;
pub mod write;

pub use error::{ResourceError, ResourceResult};
