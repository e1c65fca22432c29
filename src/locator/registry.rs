//! Service registry keyed by `TypeId`.
//!
//! Registrations are stored type-erased and recovered with a checked downcast
//! on retrieval. The key is the exact type: `Arc<dyn Logger>` and
//! `Arc<ConsoleLogger>` are distinct services unless both are registered.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::LocatorError;

type Provider<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// How a registration produces values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// A new value is constructed on every retrieval.
    Factory,
    /// A single pre-built instance is cloned on every retrieval.
    Singleton,
}

/// Diagnostic view of a single registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub type_name: &'static str,
    pub lifetime: Lifetime,
}

struct Registration {
    type_name: &'static str,
    lifetime: Lifetime,
    /// Holds a `Provider<T>` for the keyed `T`.
    provider: Box<dyn Any + Send + Sync>,
}

/// Thread-safe service locator for dependency injection.
///
/// Uses a read-write lock: lookups run concurrently, registrations and
/// `clear` are exclusive. Providers are invoked after the lock is released,
/// so a factory may resolve its own dependencies from the same locator.
#[derive(Default)]
pub struct ServiceLocator {
    services: RwLock<HashMap<TypeId, Registration>>,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `T`.
    ///
    /// Replaces any previous registration for the same type.
    pub fn register<T, F>(&self, factory: F)
    where
        T: 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let provider: Provider<T> = Arc::new(factory);
        self.insert::<T>(Lifetime::Factory, provider);
    }

    /// Register a singleton instance of `T`.
    ///
    /// Every retrieval returns a clone of `instance`; register an `Arc` to
    /// share one allocation between consumers.
    pub fn register_instance<T>(&self, instance: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        let provider: Provider<T> = Arc::new(move || instance.clone());
        self.insert::<T>(Lifetime::Singleton, provider);
    }

    fn insert<T: 'static>(&self, lifetime: Lifetime, provider: Provider<T>) {
        let registration = Registration {
            type_name: type_name::<T>(),
            lifetime,
            provider: Box::new(provider),
        };

        let replaced = self
            .services
            .write()
            .insert(TypeId::of::<T>(), registration)
            .is_some();

        tracing::debug!(
            service = type_name::<T>(),
            lifetime = ?lifetime,
            replaced,
            "Service registered"
        );
    }

    /// Resolve `T` by invoking its registered provider.
    ///
    /// # Errors
    /// Returns `LocatorError::ServiceNotFound` if `T` is not registered.
    pub fn retrieve<T: 'static>(&self) -> Result<T, LocatorError> {
        let provider = {
            let services = self.services.read();
            services
                .get(&TypeId::of::<T>())
                .and_then(|r| r.provider.downcast_ref::<Provider<T>>())
                .cloned()
        };

        match provider {
            Some(provider) => Ok(provider()),
            None => {
                tracing::trace!(service = type_name::<T>(), "Service lookup missed");
                Err(LocatorError::ServiceNotFound {
                    service_type: type_name::<T>(),
                })
            }
        }
    }

    /// Resolve `T`, returning `None` instead of an error when unregistered.
    pub fn safe_retrieve<T: 'static>(&self) -> Option<T> {
        self.retrieve::<T>().ok()
    }

    /// Check whether `T` is registered without invoking its provider.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.services.read().contains_key(&TypeId::of::<T>())
    }

    /// Remove the registration for `T`. Returns true if one existed.
    pub fn unregister<T: 'static>(&self) -> bool {
        let removed = self.services.write().remove(&TypeId::of::<T>()).is_some();
        if removed {
            tracing::debug!(service = type_name::<T>(), "Service unregistered");
        }
        removed
    }

    /// Remove all registrations.
    pub fn clear(&self) {
        let mut services = self.services.write();
        let count = services.len();
        services.clear();
        tracing::debug!(removed = count, "Service locator cleared");
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// List current registrations, sorted by type name.
    pub fn registrations(&self) -> Vec<ServiceInfo> {
        let mut infos: Vec<ServiceInfo> = self
            .services
            .read()
            .values()
            .map(|r| ServiceInfo {
                type_name: r.type_name,
                lifetime: r.lifetime,
            })
            .collect();
        infos.sort_by(|a, b| a.type_name.cmp(b.type_name));
        infos
    }
}

impl std::fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("services", &self.registrations())
            .finish()
    }
}
