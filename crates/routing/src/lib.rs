//! Route untyped messages to generic handler methods through dispatchers
//! compiled once at setup.
//!
//! Setup:
//! 1. Describe the envelope generic with a [`HeaderShape`] and the handler's
//!    generic method with a [`HeaderMethod`].
//! 2. Register every body type with a [`HeaderRegistry`], declaring its
//!    interfaces and base types when inherited fan-out is wanted.
//! 3. Build one [`MatchHeaderSelector`] per message shape. Selectors are
//!    immutable and can be shared across delivery threads.
//!
//! Delivery is a type-token comparison ([`MatchHeaderSelector::can_match`])
//! followed by direct calls through the returned [`Adapter`].

pub mod dispatcher;
pub mod error;
pub mod method;
pub mod registry;
pub mod selector;
pub mod shape;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod test_support;

pub use {
    courier_common::TypeKey,
    dispatcher::{Adapter, Dispatcher},
    error::{Error, Result},
    method::HeaderMethod,
    registry::{HeaderRegistry, Supertypes},
    selector::MatchHeaderSelector,
    shape::{HeaderShape, ViewOf},
};
