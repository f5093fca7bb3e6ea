//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parsing, filtering and repository calls into use-case APIs.
//! - Keep transport layers decoupled from storage details.

pub mod work_item_service;
