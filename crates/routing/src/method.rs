use crate::shape::{HeaderShape, ViewOf};

/// A generic method on a handler capability that dispatchers call into.
///
/// The implementing type is a marker naming one method (`NAME`) of one
/// handler type (`Callback`). Dispatchers monomorphize [`HeaderMethod::invoke`]
/// once per body type and once per declared supertype, so the call made for
/// each message is static.
///
/// `Context` is threaded through unchanged; use `()` for context-free
/// handlers, which unlocks [`Adapter::route`](crate::Adapter::route).
///
/// Inherited dispatch calls `invoke` for every declared supertype of the
/// body, unconditionally. Whether a supertype instantiation is meaningful to
/// the handler (and whether it should ignore it) is decided here, not by the
/// dispatcher.
pub trait HeaderMethod: 'static {
    /// Envelope generic this method accepts.
    type Shape: HeaderShape;
    /// Handler capability that owns the method.
    type Callback: ?Sized + Send + Sync;
    /// Value passed alongside each message.
    type Context: ?Sized + Send + Sync;

    /// Method name used in logs and errors, e.g. `"Handle"`.
    const NAME: &'static str;

    fn invoke<S: ?Sized + 'static>(
        callback: &Self::Callback,
        context: &Self::Context,
        header: ViewOf<'_, Self::Shape, S>,
    );
}
