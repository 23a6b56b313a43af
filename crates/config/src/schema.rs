//! Config schema types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourierConfig {
    pub routing: RoutingConfig,
    pub wiring: WiringConfig,
}

/// Defaults applied when building header selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Fan a matched message out to the body's interfaces and base types too.
    pub include_inherited: bool,
}

/// Channel wiring behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WiringConfig {
    /// What a binder does when its channel property holds no value.
    pub absent_channels: AbsentChannelPolicy,
    /// Let a connection graph accept a second channel under an existing identity,
    /// replacing the first.
    pub allow_duplicate_identities: bool,
}

/// Reaction to a channel property with no value at wiring time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentChannelPolicy {
    /// Fail the wiring step.
    #[default]
    Error,
    /// Log a warning and leave the property unwired.
    Skip,
}
