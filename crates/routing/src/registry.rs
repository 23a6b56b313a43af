//! Ahead-of-time registration of body types for one handler method.
//!
//! The registry is the type-shape analysis for a [`HeaderMethod`]: it knows
//! which message types are closed instantiations of the method's envelope,
//! which body type each one carries, and the ordered inherited-type list of
//! every body. Registering a body also compiles its dispatchers, so building
//! selectors later only looks things up.

use std::{any::Any, collections::HashMap, sync::Arc};

use {courier_common::TypeKey, tracing::debug};

use crate::{
    dispatcher::{self, Dispatcher, HeaderOf, Projection},
    error::{Error, Result},
    method::HeaderMethod,
};

/// Builds a dispatcher for one target type once the message projection is known.
type Compile<M, B> = Box<dyn Fn(TypeKey, &Projection<M, B>) -> Dispatcher<M> + Send + Sync>;

struct Target<M: HeaderMethod, B: Send + Sync + 'static> {
    key: TypeKey,
    compile: Compile<M, B>,
}

impl<M, B> Target<M, B>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
{
    fn new<S: ?Sized + 'static>(cast: fn(&B) -> &S) -> Self {
        Self {
            key: TypeKey::of::<S>(),
            compile: Box::new(move |message: TypeKey, projection: &Projection<M, B>| {
                Dispatcher::compile::<B, S>(message, Arc::clone(projection), cast)
            }),
        }
    }
}

fn identity<B>(body: &B) -> &B {
    body
}

/// Interfaces and base types a body type can be viewed as.
///
/// Interfaces are dispatched in the order they are declared. Base types must
/// be declared from the most derived to the least derived; the root type is
/// never listed.
pub struct Supertypes<M: HeaderMethod, B: Send + Sync + 'static> {
    interfaces: Vec<Target<M, B>>,
    bases: Vec<Target<M, B>>,
}

impl<M, B> Supertypes<M, B>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            bases: Vec::new(),
        }
    }

    /// Declare an interface (usually a `dyn Trait`) implemented by `B`.
    #[must_use]
    pub fn interface<S: ?Sized + 'static>(mut self, cast: fn(&B) -> &S) -> Self {
        self.interfaces.push(Target::new(cast));
        self
    }

    /// Declare the next base type of `B`, typically an embedded struct.
    #[must_use]
    pub fn base<S: ?Sized + 'static>(mut self, cast: fn(&B) -> &S) -> Self {
        self.bases.push(Target::new(cast));
        self
    }

    /// Body first, then interfaces, then bases, with repeats dropped.
    fn into_targets(self) -> Vec<Target<M, B>> {
        let mut targets = Vec::with_capacity(1 + self.interfaces.len() + self.bases.len());
        targets.push(Target::new::<B>(identity::<B>));
        for target in self.interfaces.into_iter().chain(self.bases) {
            if targets.iter().any(|t| t.key == target.key) {
                debug!(
                    method = M::NAME,
                    body = %TypeKey::of::<B>(),
                    supertype = %target.key,
                    "supertype declared twice, keeping first position"
                );
                continue;
            }
            targets.push(target);
        }
        targets
    }
}

impl<M, B> Default for Supertypes<M, B>
where
    M: HeaderMethod,
    B: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

struct BodyEntry {
    /// `[B, interfaces.., bases..]`.
    inherited: Arc<[TypeKey]>,
    /// `Vec<Target<M, B>>`, recovered by downcasting with the typed `B`.
    targets: Box<dyn Any + Send + Sync>,
}

/// One message type declared as an instantiation of the envelope.
pub(crate) struct MessageRoute<M: HeaderMethod> {
    pub(crate) body: TypeKey,
    /// Aligned with the body's inherited list; the first entry is the body's own.
    pub(crate) dispatchers: Arc<[Dispatcher<M>]>,
}

/// Registered body types and compiled dispatchers for method `M`.
pub struct HeaderRegistry<M: HeaderMethod> {
    bodies: HashMap<TypeKey, BodyEntry>,
    messages: HashMap<TypeKey, Vec<MessageRoute<M>>>,
}

impl<M: HeaderMethod> HeaderRegistry<M> {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            messages: HashMap::new(),
        }
    }

    /// Register body type `B` with no declared supertypes.
    pub fn register<B: Send + Sync + 'static>(&mut self) -> Result<&mut Self> {
        self.register_with::<B>(Supertypes::new())
    }

    /// Register body type `B` and the supertypes inherited dispatch fans out to.
    ///
    /// Also declares `Of<B>` as a message type carrying `B`. Registering the
    /// same body again with the same inherited list does nothing; with a
    /// different list it fails with [`Error::ConflictingSupertypes`].
    pub fn register_with<B: Send + Sync + 'static>(
        &mut self,
        supertypes: Supertypes<M, B>,
    ) -> Result<&mut Self> {
        let body = TypeKey::of::<B>();
        let targets = supertypes.into_targets();
        let inherited: Arc<[TypeKey]> = targets.iter().map(|t| t.key).collect();

        if let Some(entry) = self.bodies.get(&body) {
            if entry.inherited != inherited {
                return Err(Error::ConflictingSupertypes {
                    method: M::NAME,
                    body,
                    registered: entry.inherited.to_vec(),
                    requested: inherited.to_vec(),
                });
            }
            debug!(method = M::NAME, body = %body, "body type already registered");
            return Ok(self);
        }

        debug!(
            method = M::NAME,
            body = %body,
            inherited = inherited.len() - 1,
            "registered body type"
        );
        self.bodies.insert(body, BodyEntry {
            inherited,
            targets: Box::new(targets),
        });

        Ok(self.declare::<HeaderOf<M, B>, B>(dispatcher::canonical::<M, B>()))
    }

    /// Declare a nominal message type `Msg` as an instantiation of the
    /// envelope over `B`, e.g. a newtype wrapping `Of<B>`.
    ///
    /// `B` is registered without supertypes if it was not registered before,
    /// so supertypes for `B` must be registered first. Declaring one message
    /// type over two different bodies is allowed here and reported when a
    /// selector is built for it.
    pub fn declare_message<Msg, B>(
        &mut self,
        project: fn(&Msg) -> &HeaderOf<M, B>,
    ) -> Result<&mut Self>
    where
        Msg: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        if !self.bodies.contains_key(&TypeKey::of::<B>()) {
            self.register::<B>()?;
        }
        Ok(self.declare::<Msg, B>(dispatcher::nominal::<M, Msg, B>(project)))
    }

    fn declare<Msg, B>(&mut self, projection: Projection<M, B>) -> &mut Self
    where
        Msg: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let message = TypeKey::of::<Msg>();
        let body = TypeKey::of::<B>();
        let routes = self.messages.entry(message).or_default();
        if routes.iter().any(|r| r.body == body) {
            return self;
        }

        let Some(targets) = self
            .bodies
            .get(&body)
            .and_then(|entry| entry.targets.downcast_ref::<Vec<Target<M, B>>>())
        else {
            return self;
        };

        let dispatchers: Arc<[Dispatcher<M>]> = targets
            .iter()
            .map(|target| (target.compile)(message, &projection))
            .collect();
        debug!(
            method = M::NAME,
            message = %message,
            body = %body,
            dispatchers = dispatchers.len(),
            "declared message shape"
        );
        routes.push(MessageRoute { body, dispatchers });
        self
    }

    /// True if `message` was declared as an instantiation of the envelope.
    #[must_use]
    pub fn is_instantiation(&self, message: TypeKey) -> bool {
        self.messages.get(&message).is_some_and(|r| !r.is_empty())
    }

    /// Body types `message` was declared with, in declaration order.
    #[must_use]
    pub fn type_arguments(&self, message: TypeKey) -> Vec<TypeKey> {
        self.routes(message).iter().map(|r| r.body).collect()
    }

    /// `[body, interfaces.., bases..]` for a registered body type.
    #[must_use]
    pub fn inherited_types(&self, body: TypeKey) -> Option<Arc<[TypeKey]>> {
        self.bodies.get(&body).map(|entry| Arc::clone(&entry.inherited))
    }

    pub(crate) fn routes(&self, message: TypeKey) -> &[MessageRoute<M>] {
        self.messages
            .get(&message)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl<M: HeaderMethod> Default for HeaderRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{shape::HeaderShape, test_support::*};

    #[test]
    fn inherited_types_are_self_then_interfaces_then_bases() {
        let registry = registry();

        let inherited = registry.inherited_types(TypeKey::of::<UserLoggedIn>()).unwrap();

        assert_eq!(&*inherited, &[
            TypeKey::of::<UserLoggedIn>(),
            TypeKey::of::<dyn Auditable>(),
            TypeKey::of::<dyn Tagged>(),
            TypeKey::of::<Session>(),
            TypeKey::of::<Origin>(),
        ]);
        assert_eq!(
            &*registry.inherited_types(TypeKey::of::<OrderPlaced>()).unwrap(),
            &[TypeKey::of::<OrderPlaced>()]
        );
        assert!(registry.inherited_types(TypeKey::of::<u32>()).is_none());
    }

    #[test]
    fn repeated_supertypes_fire_once() {
        let mut registry = HeaderRegistry::<Handle>::new();
        registry
            .register_with::<UserLoggedIn>(
                Supertypes::<Handle, UserLoggedIn>::new()
                    .interface::<dyn Auditable>(as_auditable)
                    .base::<UserLoggedIn>(identity::<UserLoggedIn>)
                    .interface::<dyn Auditable>(as_auditable),
            )
            .unwrap();

        let inherited = registry.inherited_types(TypeKey::of::<UserLoggedIn>()).unwrap();
        let routes = registry.routes(TypeKey::of::<Event<UserLoggedIn>>());

        assert_eq!(&*inherited, &[
            TypeKey::of::<UserLoggedIn>(),
            TypeKey::of::<dyn Auditable>(),
        ]);
        assert_eq!(routes.len(), 1);
        assert_eq!(targets(&routes[0].dispatchers), inherited.to_vec());
    }

    #[test]
    fn registering_declares_the_canonical_instantiation() {
        let registry = registry();

        assert!(registry.is_instantiation(TypeKey::of::<Event<UserLoggedIn>>()));
        assert!(registry.is_instantiation(TypeKey::of::<Event<OrderPlaced>>()));
        assert!(!registry.is_instantiation(TypeKey::of::<UserLoggedIn>()));
        assert!(!registry.is_instantiation(TypeKey::of::<Event<u32>>()));
        assert_eq!(registry.type_arguments(TypeKey::of::<Event<OrderPlaced>>()), vec![
            TypeKey::of::<OrderPlaced>()
        ]);
        assert!(registry.type_arguments(TypeKey::of::<String>()).is_empty());
    }

    fn with_bases(registry: &mut HeaderRegistry<Handle>, origin_too: bool) -> Result<()> {
        let supertypes = Supertypes::<Handle, UserLoggedIn>::new().base::<Session>(session);
        let supertypes = if origin_too {
            supertypes.base::<Origin>(origin)
        } else {
            supertypes
        };
        registry.register_with::<UserLoggedIn>(supertypes).map(|_| ())
    }

    #[test]
    fn identical_registration_is_idempotent() {
        let mut registry = HeaderRegistry::<Handle>::new();
        with_bases(&mut registry, true).unwrap();
        with_bases(&mut registry, true).unwrap();

        let inherited = registry.inherited_types(TypeKey::of::<UserLoggedIn>()).unwrap();
        let routes = registry.routes(TypeKey::of::<Event<UserLoggedIn>>());

        assert_eq!(inherited.len(), 3);
        assert_eq!(routes.len(), 1);
        assert_eq!(targets(&routes[0].dispatchers), inherited.to_vec());
    }

    #[test]
    fn registration_with_other_supertypes_fails() {
        let mut registry = HeaderRegistry::<Handle>::new();
        with_bases(&mut registry, false).unwrap();

        let err = with_bases(&mut registry, true).unwrap_err();

        assert!(err.is_configuration());
        match err {
            Error::ConflictingSupertypes {
                body,
                registered,
                requested,
                ..
            } => {
                assert_eq!(body, TypeKey::of::<UserLoggedIn>());
                assert_eq!(registered, vec![
                    TypeKey::of::<UserLoggedIn>(),
                    TypeKey::of::<Session>(),
                ]);
                assert_eq!(requested.len(), 3);
            },
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            registry
                .inherited_types(TypeKey::of::<UserLoggedIn>())
                .unwrap()
                .len(),
            2
        );
        assert!(registry.register::<UserLoggedIn>().is_err());
    }

    #[test]
    fn supertypes_after_auto_registration_fail() {
        let mut registry = HeaderRegistry::<Handle>::new();
        registry
            .declare_message::<Mixed, UserLoggedIn>(mixed_login)
            .unwrap();

        let err = with_bases(&mut registry, false).unwrap_err();

        assert!(matches!(err, Error::ConflictingSupertypes { .. }));
        registry.register::<UserLoggedIn>().unwrap();
        assert_eq!(registry.routes(TypeKey::of::<Mixed>()).len(), 1);
    }

    #[test]
    fn declare_message_registers_missing_body() {
        let mut registry = HeaderRegistry::<Handle>::new();
        registry
            .declare_message::<Wrapped, OrderPlaced>(unwrap_order)
            .unwrap()
            .declare_message::<Wrapped, OrderPlaced>(unwrap_order)
            .unwrap();

        assert!(registry.is_instantiation(TypeKey::of::<Wrapped>()));
        assert!(registry.is_instantiation(TypeKey::of::<Event<OrderPlaced>>()));
        assert_eq!(registry.type_arguments(TypeKey::of::<Wrapped>()), vec![
            TypeKey::of::<OrderPlaced>()
        ]);
    }

    #[test]
    fn nominal_dispatch_reads_through_the_projection() {
        let mut registry = HeaderRegistry::<Handle>::new();
        registry
            .declare_message::<Wrapped, OrderPlaced>(unwrap_order)
            .unwrap();
        let route = &registry.routes(TypeKey::of::<Wrapped>())[0];
        let recorder = Recorder::default();

        route.dispatchers[0]
            .dispatch(&(), &Wrapped(order(4)), &recorder)
            .unwrap();
        let err = route.dispatchers[0]
            .dispatch(&(), &order(4), &recorder)
            .unwrap_err();

        assert_eq!(recorder.calls(), vec![(TypeKey::of::<OrderPlaced>(), 4)]);
        assert!(matches!(err, Error::ContractViolation { .. }));
    }

    #[test]
    fn views_see_the_body_through_the_upcast() {
        let message = logged_in(1);

        let audit = EventShape::view(&message, as_auditable);
        let base = EventShape::view(&message, origin);
        let order = order(2);
        let own = EventShape::view(&order, identity::<OrderPlaced>);

        assert_eq!(audit.body.actor(), "ada");
        assert_eq!(as_tagged(&message.body).tag(), "login");
        assert_eq!(base.body.region, "eu");
        assert_eq!((own.id, own.body.sku), (2, "sku-1"));
    }
}
