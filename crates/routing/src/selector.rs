//! Per-message-shape routing decisions.

use std::{fmt, sync::Arc};

use {
    courier_common::TypeKey,
    courier_config::RoutingConfig,
    tracing::debug,
};

#[cfg(feature = "metrics")]
use courier_metrics::{counter, labels, routing as routing_metrics};

use crate::{
    dispatcher::Adapter,
    error::{Error, Result},
    method::HeaderMethod,
    registry::HeaderRegistry,
};

struct Matched<M: HeaderMethod> {
    body: TypeKey,
    inherited: Arc<[TypeKey]>,
    adapter: Adapter<M>,
}

/// Decides once whether messages of one static type can be routed to `M`,
/// and holds the adapter that does it.
///
/// A selector whose message type is not an instantiation of the method's
/// envelope is inert: it never matches and costs nothing to keep around.
/// Selectors are immutable after construction and are `Send + Sync` whenever
/// the method's types are.
pub struct MatchHeaderSelector<M: HeaderMethod> {
    message: TypeKey,
    include_inherited: bool,
    matched: Option<Matched<M>>,
}

impl<M: HeaderMethod> MatchHeaderSelector<M> {
    /// Build the selector for `message`.
    ///
    /// Fails only when `message` was declared with more than one body type.
    pub fn new(
        registry: &HeaderRegistry<M>,
        message: TypeKey,
        include_inherited: bool,
    ) -> Result<Self> {
        let matched = match registry.routes(message) {
            [] => None,
            [route] => route.dispatchers.first().map(|primary| {
                let (adapter, inherited) = if include_inherited {
                    (
                        Adapter::fan_out(Arc::clone(&route.dispatchers)),
                        registry
                            .inherited_types(route.body)
                            .unwrap_or_else(|| Arc::from([route.body])),
                    )
                } else {
                    (Adapter::single(primary.clone()), Arc::from([route.body]))
                };
                Matched {
                    body: route.body,
                    inherited,
                    adapter,
                }
            }),
            routes => {
                return Err(Error::AmbiguousBody {
                    method: M::NAME,
                    message,
                    candidates: routes.iter().map(|r| r.body).collect(),
                });
            },
        };

        debug!(
            method = M::NAME,
            message = %message,
            body = ?matched.as_ref().map(|m| m.body),
            include_inherited,
            dispatchers = matched.as_ref().map_or(0, |m| m.adapter.dispatchers().len()),
            "built header selector"
        );

        #[cfg(feature = "metrics")]
        counter!(
            routing_metrics::SELECTORS_TOTAL,
            labels::MATCHED => if matched.is_some() { "true" } else { "false" }
        )
        .increment(1);

        Ok(Self {
            message,
            include_inherited,
            matched,
        })
    }

    /// Build the selector for the static message type `T`.
    pub fn for_message<T: ?Sized + 'static>(
        registry: &HeaderRegistry<M>,
        include_inherited: bool,
    ) -> Result<Self> {
        Self::new(registry, TypeKey::of::<T>(), include_inherited)
    }

    /// Build the selector with the inherited flag taken from configuration.
    pub fn from_config(
        registry: &HeaderRegistry<M>,
        message: TypeKey,
        config: &RoutingConfig,
    ) -> Result<Self> {
        Self::new(registry, message, config.include_inherited)
    }

    /// The adapter for messages whose static type is `I`, if this selector
    /// routes them.
    #[must_use]
    pub fn can_match<I: ?Sized + 'static>(&self) -> Option<&Adapter<M>> {
        self.can_match_type(TypeKey::of::<I>())
    }

    /// Token form of [`can_match`](Self::can_match).
    #[must_use]
    pub fn can_match_type(&self, input: TypeKey) -> Option<&Adapter<M>> {
        match &self.matched {
            Some(matched) if input == self.message => Some(&matched.adapter),
            _ => None,
        }
    }

    #[must_use]
    pub fn matches(&self) -> bool {
        self.matched.is_some()
    }

    #[must_use]
    pub fn message_type(&self) -> TypeKey {
        self.message
    }

    #[must_use]
    pub fn body_type(&self) -> Option<TypeKey> {
        self.matched.as_ref().map(|m| m.body)
    }

    #[must_use]
    pub fn include_inherited(&self) -> bool {
        self.include_inherited
    }

    #[must_use]
    pub fn method_name(&self) -> &'static str {
        M::NAME
    }

    /// The types the adapter dispatches to, in order: `[body, interfaces..,
    /// bases..]` with inherited dispatch, `[body]` without it. Empty when the
    /// selector is inert.
    #[must_use]
    pub fn inherited_types(&self) -> &[TypeKey] {
        self.matched
            .as_ref()
            .map(|m| &*m.inherited)
            .unwrap_or_default()
    }
}

impl<M: HeaderMethod> fmt::Debug for MatchHeaderSelector<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchHeaderSelector")
            .field("method", &M::NAME)
            .field("message", &self.message)
            .field("include_inherited", &self.include_inherited)
            .field("adapter", &self.matched.as_ref().map(|m| &m.adapter))
            .finish()
    }
}
