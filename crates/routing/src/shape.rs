//! Envelope shapes: one-parameter generic wrappers that drive routing.

/// An open, one-parameter envelope generic such as `Event<_>`.
///
/// The implementing type is a marker; `Of<B>` names the closed instantiation
/// for a body type `B` and `View<'a, S>` is how a handler sees an envelope
/// whose body is read as `S`. `S` is the body type itself for the primary
/// dispatch and one of its declared supertypes (often a `dyn Trait`) for
/// inherited dispatch.
///
/// ```ignore
/// pub struct Event<T> { pub id: u64, pub body: T }
/// pub struct EventView<'a, T: ?Sized> { pub id: u64, pub body: &'a T }
///
/// pub struct EventShape;
///
/// impl HeaderShape for EventShape {
///     type Of<B: Send + Sync + 'static> = Event<B>;
///     type View<'a, S: ?Sized + 'static> = EventView<'a, S>;
///
///     fn view<'a, B, S>(header: &'a Event<B>, cast: fn(&B) -> &S) -> EventView<'a, S>
///     where
///         B: Send + Sync + 'static,
///         S: ?Sized + 'static,
///     {
///         EventView { id: header.id, body: cast(&header.body) }
///     }
/// }
/// ```
pub trait HeaderShape: 'static {
    /// Closed instantiation carrying a body of type `B`.
    type Of<B: Send + Sync + 'static>: Send + Sync + 'static;

    /// Borrowed view of an instantiation with its body seen as `S`.
    type View<'a, S: ?Sized + 'static>;

    /// Re-type a header's body through `cast` without copying it.
    fn view<'a, B, S>(header: &'a Self::Of<B>, cast: fn(&B) -> &S) -> Self::View<'a, S>
    where
        B: Send + Sync + 'static,
        S: ?Sized + 'static;
}

/// The view type a handler method receives for shape `H` and body type `S`.
pub type ViewOf<'a, H, S> = <H as HeaderShape>::View<'a, S>;
