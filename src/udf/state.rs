//! Marker traits for state snapshots.

/// Snapshot of an interactor's current knowledge.
///
/// States should be:
/// - Immutable once emitted (Clone to derive a new state)
/// - Comparable (PartialEq for change detection downstream)
/// - Shareable across threads (published from the interactor task)
pub trait DomainState: Clone + PartialEq + Send + Sync + 'static {}

/// Render-ready snapshot derived purely from a `DomainState`.
///
/// Compared with the previous value so observers can skip redundant redraws.
pub trait ViewState: Clone + PartialEq + 'static {}
