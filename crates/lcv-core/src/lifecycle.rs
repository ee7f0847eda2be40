//! # Component Lifecycle Contracts
//!
//! Capabilities a hosting container supplies to a component: a logger,
//! its dependent services, its configuration, and start/stop hooks.
//!
//! A component opts into a capability by implementing the trait and
//! returning itself from the matching accessor on [`Component`]. The
//! forwarding helpers [`start_up`] and [`shut_down`] then drive it in
//! lifecycle order:
//!
//! ```text
//! enable_logging ─▶ service ─▶ configure ─▶ initialize ─▶ start
//!                                                           │
//!                                     dispose ◀─ stop ◀─────┘
//! ```
//!
//! Each capability also has a reserved interface name (see
//! [`Capability::interface_name`]). The verifier refuses to accept any of
//! these, or any interface extending one, as a consumable service type.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{LifecycleError, ServiceError};

/// A lifecycle capability a component may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Receives a logger from the host.
    LogEnabled,
    /// Receives a service manager to look up dependencies.
    Serviceable,
    /// Receives its configuration.
    Configurable,
    /// Runs one-time initialization.
    Initializable,
    /// Can be started and stopped.
    Startable,
    /// Releases resources at end of life.
    Disposable,
}

impl Capability {
    /// Every capability, in the order a host applies them.
    pub const ALL: [Capability; 6] = [
        Self::LogEnabled,
        Self::Serviceable,
        Self::Configurable,
        Self::Initializable,
        Self::Startable,
        Self::Disposable,
    ];

    /// Reserved fully-qualified interface name of the capability.
    pub fn interface_name(self) -> &'static str {
        match self {
            Self::LogEnabled => "framework.logger.LogEnabled",
            Self::Serviceable => "framework.service.Serviceable",
            Self::Configurable => "framework.configuration.Configurable",
            Self::Initializable => "framework.activity.Initializable",
            Self::Startable => "framework.activity.Startable",
            Self::Disposable => "framework.activity.Disposable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LogEnabled => "LogEnabled",
            Self::Serviceable => "Serviceable",
            Self::Configurable => "Configurable",
            Self::Initializable => "Initializable",
            Self::Startable => "Startable",
            Self::Disposable => "Disposable",
        };
        f.write_str(s)
    }
}

/// Receives a logger from the host.
pub trait LogEnabled {
    /// Hand the component the span its events should be recorded under.
    fn enable_logging(&mut self, logger: tracing::Span);
}

/// Receives the service manager used to look up dependencies.
pub trait Serviceable {
    /// Look up and retain the dependencies the component needs.
    fn service(&mut self, manager: &dyn ServiceManager) -> Result<(), LifecycleError>;
}

/// Receives configuration.
pub trait Configurable {
    /// Read the settings the component needs.
    fn configure(&mut self, configuration: &Configuration) -> Result<(), LifecycleError>;
}

/// Runs one-time initialization after all inputs are supplied.
pub trait Initializable {
    /// Initialize the component.
    fn initialize(&mut self) -> Result<(), LifecycleError>;
}

/// Can be started and stopped.
pub trait Startable {
    /// Start active work.
    fn start(&mut self) -> Result<(), LifecycleError>;
    /// Stop active work.
    fn stop(&mut self) -> Result<(), LifecycleError>;
}

/// Releases resources at end of life.
pub trait Disposable {
    /// Release everything the component holds. Must not fail.
    fn dispose(&mut self);
}

/// A component managed by a host.
///
/// Every accessor defaults to `None`; a component overrides the ones for
/// the capabilities it implements.
pub trait Component {
    /// Access as [`LogEnabled`].
    fn as_log_enabled(&mut self) -> Option<&mut dyn LogEnabled> {
        None
    }
    /// Access as [`Serviceable`].
    fn as_serviceable(&mut self) -> Option<&mut dyn Serviceable> {
        None
    }
    /// Access as [`Configurable`].
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
    /// Access as [`Initializable`].
    fn as_initializable(&mut self) -> Option<&mut dyn Initializable> {
        None
    }
    /// Access as [`Startable`].
    fn as_startable(&mut self) -> Option<&mut dyn Startable> {
        None
    }
    /// Access as [`Disposable`].
    fn as_disposable(&mut self) -> Option<&mut dyn Disposable> {
        None
    }
}

/// Looks up dependency values by canonical key.
pub trait ServiceManager {
    /// Look up the service registered under `key`.
    fn lookup(&self, key: &str) -> Result<Arc<dyn Any + Send + Sync>, ServiceError>;

    /// Whether a service is registered under `key`.
    fn has_service(&self, key: &str) -> bool;
}

/// Look up a service and downcast it to its concrete type.
pub fn lookup_as<T: Any + Send + Sync>(
    manager: &dyn ServiceManager,
    key: &str,
) -> Result<Arc<T>, ServiceError> {
    manager
        .lookup(key)?
        .downcast::<T>()
        .map_err(|_| ServiceError::WrongType {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

/// A service manager backed by an explicit key → service map.
#[derive(Default, Clone)]
pub struct StaticServiceManager {
    services: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl StaticServiceManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `key`, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, service: Arc<T>) {
        self.services.insert(key.into(), service);
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for StaticServiceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.services.keys().collect();
        keys.sort();
        f.debug_struct("StaticServiceManager")
            .field("keys", &keys)
            .finish()
    }
}

impl ServiceManager for StaticServiceManager {
    fn lookup(&self, key: &str) -> Result<Arc<dyn Any + Send + Sync>, ServiceError> {
        self.services
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(key.to_string()))
    }

    fn has_service(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }
}

/// Flat string configuration handed to a [`Configurable`] component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<String, String>,
}

impl Configuration {
    /// Build from key/value pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a value, falling back to `default`.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Look up a value that must be present.
    pub fn required(&self, key: &str) -> Result<&str, LifecycleError> {
        self.get(key)
            .ok_or_else(|| LifecycleError::MissingConfiguration(key.to_string()))
    }
}

/// What a host supplies while starting a component.
#[derive(Clone, Copy)]
pub struct LifecycleContext<'a> {
    /// Name the component is known by, used for its logger.
    pub name: &'a str,
    /// Dependencies available to the component.
    pub services: &'a dyn ServiceManager,
    /// Configuration for the component.
    pub configuration: &'a Configuration,
}

/// Drive a component through every start-up capability it exposes.
///
/// Stops at the first failing stage and returns its error; later stages
/// are not invoked.
pub fn start_up(component: &mut dyn Component, ctx: LifecycleContext<'_>) -> Result<(), LifecycleError> {
    if let Some(c) = component.as_log_enabled() {
        tracing::debug!(component = ctx.name, "enable_logging");
        c.enable_logging(tracing::info_span!("component", name = ctx.name));
    }
    if let Some(c) = component.as_serviceable() {
        tracing::debug!(component = ctx.name, "service");
        c.service(ctx.services)?;
    }
    if let Some(c) = component.as_configurable() {
        tracing::debug!(component = ctx.name, "configure");
        c.configure(ctx.configuration)?;
    }
    if let Some(c) = component.as_initializable() {
        tracing::debug!(component = ctx.name, "initialize");
        c.initialize()?;
    }
    if let Some(c) = component.as_startable() {
        tracing::debug!(component = ctx.name, "start");
        c.start()?;
    }
    Ok(())
}

/// Stop and dispose a component.
///
/// Disposal runs even when stopping fails; the stop error is returned
/// afterwards.
pub fn shut_down(component: &mut dyn Component) -> Result<(), LifecycleError> {
    let stopped = match component.as_startable() {
        Some(c) => c.stop(),
        None => Ok(()),
    };
    if let Err(e) = &stopped {
        tracing::warn!(error = %e, "stop failed; disposing anyway");
    }
    if let Some(c) = component.as_disposable() {
        c.dispose();
    }
    stopped
}
