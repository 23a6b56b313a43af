//! Compiled dispatch paths.
//!
//! A [`Dispatcher`] is one monomorphized cast-and-call: it projects an
//! untyped message onto the envelope instantiation it was compiled for and
//! invokes the handler method for a single target type. An [`Adapter`] is
//! what a selector hands out: either the body's own dispatcher, or the body's
//! dispatcher followed by one per inherited type.

use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

use courier_common::TypeKey;

#[cfg(feature = "metrics")]
use courier_metrics::{counter, labels, routing as routing_metrics};

use crate::{
    error::{Error, Result},
    method::HeaderMethod,
    shape::{HeaderShape, ViewOf},
};

/// Shape instantiation for a method's envelope and body `B`.
pub(crate) type HeaderOf<M, B> = <<M as HeaderMethod>::Shape as HeaderShape>::Of<B>;

/// Recovers the typed envelope from an untyped message, if it has the
/// expected runtime type.
pub(crate) type Projection<M, B> =
    Arc<dyn Fn(&dyn Any) -> Option<&HeaderOf<M, B>> + Send + Sync>;

type DispatchFn<M> = dyn Fn(&<M as HeaderMethod>::Context, &dyn Any, &<M as HeaderMethod>::Callback) -> Result<()>
    + Send
    + Sync;

/// Projection for the canonical instantiation `Of<B>` itself.
pub(crate) fn canonical<M, B>() -> Projection<M, B>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
{
    Arc::new(downcast::<M, B>)
}

/// Projection for a nominal message type that embeds an `Of<B>`.
pub(crate) fn nominal<M, Msg, B>(project: fn(&Msg) -> &HeaderOf<M, B>) -> Projection<M, B>
where
    M: HeaderMethod,
    Msg: Send + Sync + 'static,
    B: Send + Sync + 'static,
{
    projection::<M, B, _>(move |message| message.downcast_ref::<Msg>().map(project))
}

fn downcast<M, B>(message: &dyn Any) -> Option<&HeaderOf<M, B>>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
{
    message.downcast_ref()
}

fn projection<M, B, F>(f: F) -> Projection<M, B>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
    F: Fn(&dyn Any) -> Option<&HeaderOf<M, B>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A compiled call of `M::invoke::<S>` for one message shape.
pub struct Dispatcher<M: HeaderMethod> {
    target: TypeKey,
    call: Arc<DispatchFn<M>>,
    _method: PhantomData<fn() -> M>,
}

impl<M: HeaderMethod> Dispatcher<M> {
    /// Compile the path `message -> Of<B> -> View<S> -> M::invoke::<S>`.
    pub(crate) fn compile<B, S>(
        message: TypeKey,
        projection: Projection<M, B>,
        cast: fn(&B) -> &S,
    ) -> Self
    where
        B: Send + Sync + 'static,
        S: ?Sized + 'static,
    {
        let target = TypeKey::of::<S>();
        let call = move |context: &M::Context, input: &dyn Any, callback: &M::Callback| {
            let Some(header) = projection(input) else {
                #[cfg(feature = "metrics")]
                counter!(routing_metrics::CONTRACT_VIOLATIONS_TOTAL, labels::METHOD => M::NAME)
                    .increment(1);
                return Err(Error::ContractViolation {
                    method: M::NAME,
                    expected: message,
                    target,
                });
            };
            let view: ViewOf<'_, M::Shape, S> = <M::Shape as HeaderShape>::view(header, cast);
            M::invoke::<S>(callback, context, view);
            Ok(())
        };

        #[cfg(feature = "metrics")]
        counter!(routing_metrics::DISPATCHERS_COMPILED_TOTAL, labels::METHOD => M::NAME)
            .increment(1);

        Self {
            target,
            call: Arc::new(call),
            _method: PhantomData,
        }
    }

    /// The type the handler method is instantiated with.
    #[must_use]
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn dispatch(
        &self,
        context: &M::Context,
        message: &dyn Any,
        callback: &M::Callback,
    ) -> Result<()> {
        (self.call)(context, message, callback)
    }
}

impl<M: HeaderMethod> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            call: Arc::clone(&self.call),
            _method: PhantomData,
        }
    }
}

impl<M: HeaderMethod> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("method", &M::NAME)
            .field("target", &self.target)
            .finish()
    }
}

enum Route<M: HeaderMethod> {
    Single(Dispatcher<M>),
    FanOut(Arc<[Dispatcher<M>]>),
}

/// The routing function a matched selector hands out.
///
/// Cloning is cheap; every clone shares the same compiled dispatchers.
pub struct Adapter<M: HeaderMethod> {
    route: Route<M>,
}

impl<M: HeaderMethod> Adapter<M> {
    pub(crate) fn single(dispatcher: Dispatcher<M>) -> Self {
        Self {
            route: Route::Single(dispatcher),
        }
    }

    pub(crate) fn fan_out(dispatchers: Arc<[Dispatcher<M>]>) -> Self {
        Self {
            route: Route::FanOut(dispatchers),
        }
    }

    /// Dispatchers in invocation order.
    #[must_use]
    pub fn dispatchers(&self) -> &[Dispatcher<M>] {
        match &self.route {
            Route::Single(dispatcher) => std::slice::from_ref(dispatcher),
            Route::FanOut(dispatchers) => dispatchers,
        }
    }

    /// Route a message with a context value.
    ///
    /// Fan-out adapters invoke every dispatcher in order. The first contract
    /// violation stops the remaining calls.
    pub fn route_with(
        &self,
        context: &M::Context,
        message: &dyn Any,
        callback: &M::Callback,
    ) -> Result<()> {
        match &self.route {
            Route::Single(dispatcher) => dispatcher.dispatch(context, message, callback),
            Route::FanOut(dispatchers) => {
                for dispatcher in dispatchers.iter() {
                    dispatcher.dispatch(context, message, callback)?;
                }
                Ok(())
            },
        }
    }
}

impl<M: HeaderMethod<Context = ()>> Adapter<M> {
    /// Route a message to a context-free handler.
    pub fn route(&self, message: &dyn Any, callback: &M::Callback) -> Result<()> {
        self.route_with(&(), message, callback)
    }
}

impl<M: HeaderMethod> Clone for Adapter<M> {
    fn clone(&self) -> Self {
        let route = match &self.route {
            Route::Single(dispatcher) => Route::Single(dispatcher.clone()),
            Route::FanOut(dispatchers) => Route::FanOut(Arc::clone(dispatchers)),
        };
        Self { route }
    }
}

impl<M: HeaderMethod> fmt::Debug for Adapter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.dispatchers().iter().map(Dispatcher::target))
            .finish()
    }
}
