//! Metric names for the courier dispatch core.
//!
//! Recording goes through the `metrics` crate facade, so nothing is exported
//! until the embedding process installs a recorder.
//!
//! ```rust,ignore
//! use courier_metrics::{counter, routing};
//!
//! counter!(routing::SELECTORS_TOTAL, "matched" => "true").increment(1);
//! ```

mod definitions;

pub use definitions::*;

// Re-export metrics macros for convenience
pub use metrics::counter;
