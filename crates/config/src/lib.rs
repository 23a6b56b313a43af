//! Configuration loading for the courier dispatch core.
//!
//! Config files: `courier.toml`, `courier.yaml`, `courier.yml` or `courier.json`,
//! searched in the working directory.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in the raw text.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{ConfigFormat, discover_and_load, load_config, parse_config},
    schema::{AbsentChannelPolicy, CourierConfig, RoutingConfig, WiringConfig},
};
