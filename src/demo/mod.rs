//! Movie search feature used by the `entropy-core` binary.

pub mod catalog;
pub mod search;
