use std::sync::Arc;

/// Something that accepts messages of type `T`.
///
/// Queues, mailboxes and fibers live outside this crate; wiring only needs
/// to hold on to the endpoint and hand it to a connection builder.
pub trait Channel<T>: Send + Sync {
    fn send(&self, message: T);
}

/// Shared handle to a channel, as exposed by channel properties.
pub type ChannelRef<T> = Arc<dyn Channel<T>>;

impl<T, F> Channel<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn send(&self, message: T) {
        self(message)
    }
}
