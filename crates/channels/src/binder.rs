use std::{fmt, marker::PhantomData};

use {courier_common::TypeKey, tracing::debug};

#[cfg(feature = "metrics")]
use courier_metrics::{channels as ch_metrics, counter, labels};

use crate::{
    channel::ChannelRef,
    connection::{BoundChannel, ChannelId, ConnectionBuilder},
    error::{Error, Result},
};

/// Wires one channel property of `T` into a connection builder.
pub trait PropertyChannelBinder<T>: Send + Sync {
    /// Name of the property this binder reads.
    fn property(&self) -> &'static str;

    /// Message type carried by the property's channel.
    fn message_type(&self) -> TypeKey;

    /// Read the property off `instance` and register its channel.
    ///
    /// An unset property is reported as [`Error::AbsentChannel`].
    fn configure(&self, builder: &mut dyn ConnectionBuilder, instance: &T) -> Result<()>;
}

/// Binder for a property of `T` holding a `ChannelRef<M>`.
pub struct ChannelPropertyBinder<T, M> {
    property: &'static str,
    read: fn(&T) -> Option<ChannelRef<M>>,
    _message: PhantomData<fn() -> M>,
}

impl<T, M> ChannelPropertyBinder<T, M>
where
    T: 'static,
    M: 'static,
{
    #[must_use]
    pub fn new(property: &'static str, read: fn(&T) -> Option<ChannelRef<M>>) -> Self {
        Self {
            property,
            read,
            _message: PhantomData,
        }
    }
}

impl<T, M> PropertyChannelBinder<T> for ChannelPropertyBinder<T, M>
where
    T: 'static,
    M: 'static,
{
    fn property(&self) -> &'static str {
        self.property
    }

    fn message_type(&self) -> TypeKey {
        TypeKey::of::<M>()
    }

    fn configure(&self, builder: &mut dyn ConnectionBuilder, instance: &T) -> Result<()> {
        let channel = (self.read)(instance).ok_or_else(|| Error::absent_channel::<T>(self.property))?;
        let id = ChannelId::of::<T>(self.property);
        builder.connect(id, BoundChannel::new(channel))?;

        debug!(
            owner = %id.owner(),
            property = self.property,
            message = %TypeKey::of::<M>(),
            "bound channel property"
        );
        #[cfg(feature = "metrics")]
        counter!(ch_metrics::BOUND_TOTAL, labels::OWNER => id.owner().short_name()).increment(1);

        Ok(())
    }
}

impl<T, M: 'static> fmt::Debug for ChannelPropertyBinder<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelPropertyBinder")
            .field("property", &self.property)
            .field("message", &TypeKey::of::<M>())
            .finish()
    }
}
