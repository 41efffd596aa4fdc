//! Topology Configuration
//!
//! Generator sizing and environment presets.
//!
//! ## Sources (later wins)
//! 1. Built-in defaults (or an [`Environment`] preset)
//! 2. YAML file
//! 3. Environment variables (`SWITCH_COUNT`, `PORTS_PER_SWITCH`, ...)
//!
//! ```rust,ignore
//! use topology_engine::config::{Environment, GeneratorConfig};
//!
//! let config = GeneratorConfig::for_environment(Environment::Testing)
//!     .server_count(4)
//!     .with_env_overrides()?;
//! config.validate()?;
//! ```

pub mod error;
pub mod generator_config;

pub use error::{ConfigError, ConfigResult};
pub use generator_config::{
    Environment, GeneratorConfig, TopologyConfig, MAX_GENERATED_ENTITIES, MAX_VLAN_COUNT,
};

/// Trait for validatable configuration objects
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}
