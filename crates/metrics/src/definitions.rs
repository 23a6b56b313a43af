//! Metric name and label definitions.
//!
//! Centralizing these keeps the routing and channel crates consistent with
//! each other and documents what a recorder will see.

/// Header routing metrics
pub mod routing {
    /// Header selectors built, labelled by whether the message shape matched
    pub const SELECTORS_TOTAL: &str = "courier_routing_selectors_total";
    /// Typed dispatchers compiled while registering body types
    pub const DISPATCHERS_COMPILED_TOTAL: &str = "courier_routing_dispatchers_compiled_total";
    /// Adapter invocations rejected because the message had the wrong type
    pub const CONTRACT_VIOLATIONS_TOTAL: &str = "courier_routing_contract_violations_total";
}

/// Channel wiring metrics
pub mod channels {
    /// Channels registered with a connection builder
    pub const BOUND_TOTAL: &str = "courier_channels_bound_total";
    /// Channel properties left unwired because they held no value
    pub const SKIPPED_TOTAL: &str = "courier_channels_skipped_total";
}

/// Common label keys
pub mod labels {
    pub const MATCHED: &str = "matched";
    pub const METHOD: &str = "method";
    pub const OWNER: &str = "owner";
}
