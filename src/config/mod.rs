//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse, PORT override)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::GateConfig;
pub use schema::{
    BundleConfig, ExplorerConfig, ListenerConfig, ObservabilityConfig, PaymentConfig,
    StorageConfig, TimeoutConfig,
};
