//! List query result envelope.

use crate::model::pack_option::PackOption;
use crate::search::criteria::SearchCriteria;
use serde::{Deserialize, Serialize};

/// One page of items plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults<T> {
    pub items: Vec<T>,
    /// Number of records matching the filters, ignoring pagination.
    pub total_count: u64,
    pub search_criteria: SearchCriteria,
}

impl<T> SearchResults<T> {
    pub fn new(search_criteria: SearchCriteria) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            search_criteria,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Search results returned by the pack option repository.
pub type PackOptionSearchResults = SearchResults<PackOption>;
