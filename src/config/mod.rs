//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FuseConfig (validated, immutable)
//!     → BreakerConfig handed to Breaker::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a breaker is built from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BreakerConfig, FuseConfig, ObservabilityConfig, OutageConfig, SimulationConfig};
pub use validation::ValidationError;
