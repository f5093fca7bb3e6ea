//! Work item domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by query and storage layers.
//! - Own the closed vocabularies that form the contract with callers.
//!
//! # Invariants
//! - Every work item is identified by a stable `WorkItemId`.
//! - Every work item belongs to exactly one owner.

pub mod work_item;
