use thiserror::Error;

/// Errors that can occur when resolving services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// No registration exists for the requested type identity.
    #[error("Service of type '{service_type}' is not registered in ServiceLocator")]
    ServiceNotFound { service_type: &'static str },
}
