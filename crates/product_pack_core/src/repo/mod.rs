//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the pack option data access contract.
//! - Isolate SQLite query details behind the resource model and collections.
//!
//! # Invariants
//! - Resource writes enforce `PackOption::validate()` before persistence.
//! - Repository APIs surface domain errors (`NoSuchEntity`, `CouldNotSave`,
//!   `CouldNotDelete`) in addition to pass-through storage errors.

pub mod collection;
pub mod pack_option_repo;
pub mod processor;
pub mod resource;
