//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → DataApiConfig (validated, immutable)
//!     → handed to main, the server and intake
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an absent file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Defaults bind to loopback since the data API carries no authentication

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DataApiConfig, IntakeConfig, ListenerConfig, LogFormat, ObservabilityConfig};
