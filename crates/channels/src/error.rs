use courier_common::TypeKey;

use crate::connection::ChannelId;

/// Crate-wide result type for channel wiring.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors raised while discovering and wiring channel properties.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Validation or wiring was attempted before an instance was bound.
    #[error("No instance was provided for {owner}")]
    NoInstance { owner: TypeKey },

    /// A channel property held no value when its binder read it.
    #[error("channel property {owner}.{property} has no value")]
    AbsentChannel {
        owner: TypeKey,
        property: &'static str,
    },

    /// A connected channel was looked up with a different message type.
    #[error("channel {id} carries {actual} messages, not {expected}")]
    ChannelTypeMismatch {
        id: ChannelId,
        expected: TypeKey,
        actual: TypeKey,
    },

    /// A second channel was connected under an identity already in use.
    #[error("channel {id} is already connected")]
    DuplicateIdentity { id: ChannelId },
}

impl Error {
    #[must_use]
    pub fn no_instance<T: ?Sized + 'static>() -> Self {
        Self::NoInstance {
            owner: TypeKey::of::<T>(),
        }
    }

    #[must_use]
    pub fn absent_channel<T: ?Sized + 'static>(property: &'static str) -> Self {
        Self::AbsentChannel {
            owner: TypeKey::of::<T>(),
            property,
        }
    }
}
