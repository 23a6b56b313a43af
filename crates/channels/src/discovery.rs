//! Channel property discovery.
//!
//! Owner types describe their public properties once; discovery keeps the
//! ones shaped like a channel of exactly one message type and turns each into
//! a [`PropertyChannelBinder`].

use std::{fmt, sync::Arc};

use {courier_common::TypeKey, tracing::debug};

use crate::{
    binder::{ChannelPropertyBinder, PropertyChannelBinder},
    channel::ChannelRef,
};

/// Shared binder handle for an owner type `T`.
pub type BinderRef<T> = Arc<dyn PropertyChannelBinder<T>>;

/// A type whose public properties can be scanned for channels.
///
/// ```ignore
/// impl ChannelSource for Shop {
///     fn describe(properties: &mut PropertyList<Self>) {
///         properties
///             .channel::<OrderPlaced>("Orders", |shop| shop.orders.clone())
///             .value::<String>("Name");
///     }
/// }
/// ```
pub trait ChannelSource: Send + Sync + Sized + 'static {
    fn describe(properties: &mut PropertyList<Self>);
}

/// What a described property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    /// A channel carrying messages of the given type.
    Channel { message: TypeKey },
    /// Any other value.
    Value { value: TypeKey },
}

/// One described property of `T`.
pub struct Property<T> {
    name: &'static str,
    shape: PropertyShape,
    binder: Option<BinderRef<T>>,
}

impl<T> Property<T> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn shape(&self) -> PropertyShape {
        self.shape
    }

    #[must_use]
    pub fn is_channel(&self) -> bool {
        matches!(self.shape, PropertyShape::Channel { .. })
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

/// The public properties of `T`, in declaration order.
pub struct PropertyList<T> {
    properties: Vec<Property<T>>,
}

impl<T: 'static> PropertyList<T> {
    fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Describe a property holding a `ChannelRef<M>`.
    pub fn channel<M: 'static>(
        &mut self,
        name: &'static str,
        read: fn(&T) -> Option<ChannelRef<M>>,
    ) -> &mut Self {
        self.properties.push(Property {
            name,
            shape: PropertyShape::Channel {
                message: TypeKey::of::<M>(),
            },
            binder: Some(Arc::new(ChannelPropertyBinder::new(name, read))),
        });
        self
    }

    /// Describe a property that is not a channel.
    pub fn value<V: ?Sized + 'static>(&mut self, name: &'static str) -> &mut Self {
        self.properties.push(Property {
            name,
            shape: PropertyShape::Value {
                value: TypeKey::of::<V>(),
            },
            binder: None,
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property<T>> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Every property `T` describes.
pub fn properties<T: ChannelSource>() -> PropertyList<T> {
    let mut list = PropertyList::new();
    T::describe(&mut list);
    list
}

/// One binder per channel property of `T`, in declaration order.
pub fn discover<T: ChannelSource>() -> Vec<BinderRef<T>> {
    let list = properties::<T>();
    let described = list.len();
    let binders: Vec<BinderRef<T>> = list
        .properties
        .into_iter()
        .filter_map(|property| property.binder)
        .collect();

    debug!(
        owner = %TypeKey::of::<T>(),
        properties = described,
        count = binders.len(),
        "discovered channel properties"
    );
    binders
}
