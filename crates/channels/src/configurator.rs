//! Wiring the channel properties of one instance.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use {
    courier_common::TypeKey,
    courier_config::{AbsentChannelPolicy, WiringConfig},
    tracing::{info, warn},
};

#[cfg(feature = "metrics")]
use courier_metrics::{channels as ch_metrics, counter, labels};

use crate::{
    connection::ConnectionBuilder,
    discovery::{self, BinderRef, ChannelSource},
    error::{Error, Result},
};

/// A step of endpoint wiring: validated first, then run against a builder.
pub trait ConnectionBuilderConfigurator {
    /// Check that the configurator can run, doing any one-time analysis.
    fn validate_configuration(&self) -> Result<()>;

    /// Register this configurator's connections with `builder`.
    fn configure(&self, builder: &mut dyn ConnectionBuilder) -> Result<()>;
}

/// Validate every configurator, then configure them in order.
///
/// Nothing is registered with `builder` unless all of them validate.
pub fn wire_all(
    builder: &mut dyn ConnectionBuilder,
    configurators: &[&dyn ConnectionBuilderConfigurator],
) -> Result<()> {
    for configurator in configurators {
        configurator.validate_configuration()?;
    }
    for configurator in configurators {
        configurator.configure(builder)?;
    }
    Ok(())
}

/// Registers every channel property of a bound `T` instance.
///
/// Discovery runs once, on first validation, and is reused by every later
/// call.
pub struct PropertyChannelsConfigurator<T: ChannelSource> {
    instance: Option<Arc<T>>,
    binders: OnceLock<Vec<BinderRef<T>>>,
    absent_channels: AbsentChannelPolicy,
}

impl<T: ChannelSource> PropertyChannelsConfigurator<T> {
    pub fn new() -> Self {
        Self {
            instance: None,
            binders: OnceLock::new(),
            absent_channels: AbsentChannelPolicy::default(),
        }
    }

    pub fn from_config(config: &WiringConfig) -> Self {
        Self {
            absent_channels: config.absent_channels,
            ..Self::new()
        }
    }

    /// Bind the instance whose properties are wired.
    #[must_use]
    pub fn using_instance(self, instance: T) -> Self {
        self.using_shared(Arc::new(instance))
    }

    /// Bind an instance that is also held elsewhere.
    #[must_use]
    pub fn using_shared(mut self, instance: Arc<T>) -> Self {
        self.instance = Some(instance);
        self
    }

    #[must_use]
    pub fn instance(&self) -> Option<&Arc<T>> {
        self.instance.as_ref()
    }

    /// Discovered binders, once validation has run.
    #[must_use]
    pub fn binders(&self) -> Option<&[BinderRef<T>]> {
        self.binders.get().map(Vec::as_slice)
    }

    fn bound_instance(&self) -> Result<&Arc<T>> {
        self.instance.as_ref().ok_or_else(Error::no_instance::<T>)
    }

    fn discovered(&self) -> &[BinderRef<T>] {
        self.binders.get_or_init(discovery::discover::<T>)
    }
}

impl<T: ChannelSource> ConnectionBuilderConfigurator for PropertyChannelsConfigurator<T> {
    fn validate_configuration(&self) -> Result<()> {
        self.bound_instance()?;
        self.discovered();
        Ok(())
    }

    fn configure(&self, builder: &mut dyn ConnectionBuilder) -> Result<()> {
        let instance = self.bound_instance()?;
        let mut bound = 0usize;
        let mut skipped = 0usize;

        for binder in self.discovered() {
            match binder.configure(builder, instance) {
                Ok(()) => bound += 1,
                Err(Error::AbsentChannel { owner, property })
                    if self.absent_channels == AbsentChannelPolicy::Skip =>
                {
                    warn!(owner = %owner, property, "channel property has no value, skipping");
                    #[cfg(feature = "metrics")]
                    counter!(ch_metrics::SKIPPED_TOTAL, labels::OWNER => owner.short_name())
                        .increment(1);
                    skipped += 1;
                },
                Err(e) => return Err(e),
            }
        }

        info!(
            owner = %TypeKey::of::<T>(),
            count = bound,
            skipped,
            "wired channel properties"
        );
        Ok(())
    }
}

impl<T: ChannelSource> Default for PropertyChannelsConfigurator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ChannelSource> fmt::Debug for PropertyChannelsConfigurator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChannelsConfigurator")
            .field("owner", &TypeKey::of::<T>())
            .field("bound", &self.instance.is_some())
            .field("binders", &self.binders.get().map(Vec::len))
            .field("absent_channels", &self.absent_channels)
            .finish()
    }
}
