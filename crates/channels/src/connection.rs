//! Connection builders: where discovered channels end up.

use std::{any::Any, fmt, sync::Arc};

use {
    courier_common::TypeKey,
    courier_config::WiringConfig,
    serde::Serialize,
    tracing::debug,
};

use crate::{
    channel::ChannelRef,
    error::{Error, Result},
};

/// Identity a channel is registered under, derived from the property that
/// exposed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    owner: TypeKey,
    property: &'static str,
}

impl ChannelId {
    #[must_use]
    pub fn new(owner: TypeKey, property: &'static str) -> Self {
        Self { owner, property }
    }

    #[must_use]
    pub fn of<T: ?Sized + 'static>(property: &'static str) -> Self {
        Self::new(TypeKey::of::<T>(), property)
    }

    /// The property name, e.g. `"Orders"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.property
    }

    #[must_use]
    pub fn owner(&self) -> TypeKey {
        self.owner
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.property)
    }
}

/// A channel value with its message type erased.
#[derive(Clone)]
pub struct BoundChannel {
    message: TypeKey,
    /// Always a `ChannelRef<M>` where `M` is `message`.
    channel: Arc<dyn Any + Send + Sync>,
}

impl BoundChannel {
    pub fn new<M: 'static>(channel: ChannelRef<M>) -> Self {
        Self {
            message: TypeKey::of::<M>(),
            channel: Arc::new(channel),
        }
    }

    #[must_use]
    pub fn message_type(&self) -> TypeKey {
        self.message
    }

    /// The typed channel, if it carries `M` messages.
    #[must_use]
    pub fn downcast<M: 'static>(&self) -> Option<ChannelRef<M>> {
        self.channel.downcast_ref::<ChannelRef<M>>().map(Arc::clone)
    }
}

impl fmt::Debug for BoundChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundChannel")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Accepts `(identity, channel)` registrations during endpoint wiring.
pub trait ConnectionBuilder {
    fn connect(&mut self, id: ChannelId, channel: BoundChannel) -> Result<()>;
}

/// Serializable description of one registered connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub identity: &'static str,
    pub owner: String,
    pub message: String,
}

/// In-memory [`ConnectionBuilder`] that keeps connections in registration order.
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    connections: Vec<(ChannelId, BoundChannel)>,
    allow_duplicate_identities: bool,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WiringConfig) -> Self {
        Self {
            connections: Vec::new(),
            allow_duplicate_identities: config.allow_duplicate_identities,
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.connections.iter().map(|(id, _)| *id)
    }

    pub fn contains(&self, id: &ChannelId) -> bool {
        self.position(id).is_some()
    }

    /// The channel connected under `id`, typed as carrying `M` messages.
    pub fn channel<M: 'static>(&self, id: &ChannelId) -> Result<Option<ChannelRef<M>>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let bound = &self.connections[index].1;
        bound
            .downcast::<M>()
            .map(Some)
            .ok_or_else(|| Error::ChannelTypeMismatch {
                id: *id,
                expected: TypeKey::of::<M>(),
                actual: bound.message_type(),
            })
    }

    pub fn summary(&self) -> Vec<ConnectionSummary> {
        self.connections
            .iter()
            .map(|(id, bound)| ConnectionSummary {
                identity: id.name(),
                owner: id.owner().short_name(),
                message: bound.message_type().short_name(),
            })
            .collect()
    }

    fn position(&self, id: &ChannelId) -> Option<usize> {
        self.connections.iter().position(|(existing, _)| existing == id)
    }
}

impl ConnectionBuilder for ConnectionGraph {
    fn connect(&mut self, id: ChannelId, channel: BoundChannel) -> Result<()> {
        match self.position(&id) {
            Some(index) if self.allow_duplicate_identities => {
                debug!(channel = %id, "replacing connected channel");
                self.connections[index].1 = channel;
            },
            Some(_) => return Err(Error::DuplicateIdentity { id }),
            None => {
                debug!(channel = %id, message = %channel.message_type(), "connected channel");
                self.connections.push((id, channel));
            },
        }
        Ok(())
    }
}
