//! Channel wiring.
//!
//! An owner type lists its public properties through [`ChannelSource`].
//! Discovery keeps the channel-shaped ones and builds one
//! [`PropertyChannelBinder`] per property; a [`PropertyChannelsConfigurator`]
//! binds an instance and registers each channel with a [`ConnectionBuilder`]
//! under an identity named after its property.

pub mod binder;
pub mod channel;
pub mod configurator;
pub mod connection;
pub mod discovery;
pub mod error;

pub use {
    binder::{ChannelPropertyBinder, PropertyChannelBinder},
    channel::{Channel, ChannelRef},
    configurator::{ConnectionBuilderConfigurator, PropertyChannelsConfigurator, wire_all},
    connection::{BoundChannel, ChannelId, ConnectionBuilder, ConnectionGraph, ConnectionSummary},
    discovery::{BinderRef, ChannelSource, Property, PropertyList, PropertyShape, discover},
    error::{Error, Result},
};
