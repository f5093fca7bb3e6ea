//! Query intent resolution.
//!
//! # Responsibility
//! - Resolve relative time tags into calendar windows (`date_range`).
//! - Extract tags and a keyword from free text (`intent`).
//! - Assemble owner-scoped predicate sets (`filter`).
//! - Pick an update target from fuzzy hints (`disambiguate`).
//!
//! # Invariants
//! - Everything here is pure except `find_update_target`, which performs a
//!   single store lookup.

pub mod date_range;
pub mod disambiguate;
pub mod filter;
pub mod intent;
