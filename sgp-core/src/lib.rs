//! SGP Core - Shared data structures, errors and configuration
//!
//! Defines the domain types used by the session accessor and the layout
//! composer, together with the ambient error, configuration and logging layers.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-exported for the logging macros
pub use tracing;
