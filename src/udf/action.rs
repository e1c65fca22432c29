//! Marker traits for the inputs of the pipeline.

/// An intent understood by an interactor.
///
/// Actions cross from the UI context to the interactor task, so they must be
/// `Send`.
pub trait DomainAction: Send + 'static {}

/// A raw user interaction, consumed only by an `EventActionMap`.
pub trait ViewEvent: 'static {}
