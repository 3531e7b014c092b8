//! Search criteria and result types for list queries.
//!
//! # Responsibility
//! - Describe filter/sort/pagination requests without storage details.
//! - Carry list results together with the unpaginated total count.

pub mod criteria;
pub mod results;
