//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the query core consumes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate client fields before persistence.
//! - Every read and write is scoped to one owner.

pub mod work_item_repo;
