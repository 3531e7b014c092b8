//! Pack option domain model.
//!
//! # Responsibility
//! - Define the canonical data structures used by repository code.
//! - Own conversion between data objects and flat attribute maps.
//!
//! # Invariants
//! - Every persisted pack option is identified by a storage-assigned
//!   `PackOptionId`.

pub mod attributes;
pub mod pack_option;
