//! Collection processors applied before a list query runs.
//!
//! # Responsibility
//! - Translate [`SearchCriteria`] into collection filters, orders and paging.
//! - Apply extension attribute join requirements.
//!
//! # Invariants
//! - Processors only configure the collection; they never load rows.

use crate::repo::collection::PackOptionCollection;
use crate::repo::resource::ResourceResult;
use crate::search::criteria::SearchCriteria;

/// Applies one aspect of search criteria to a collection.
pub trait CollectionProcessor {
    fn process(
        &self,
        criteria: &SearchCriteria,
        collection: &mut PackOptionCollection<'_>,
    ) -> ResourceResult<()>;
}

/// Applies join requirements independent of the criteria.
pub trait JoinProcessor {
    fn process(&self, collection: &mut PackOptionCollection<'_>);
}

/// Adds every filter group as an AND-ed clause.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterProcessor;

impl CollectionProcessor for FilterProcessor {
    fn process(
        &self,
        criteria: &SearchCriteria,
        collection: &mut PackOptionCollection<'_>,
    ) -> ResourceResult<()> {
        for group in &criteria.filter_groups {
            collection.add_filter_group(&group.filters)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortingProcessor;

impl CollectionProcessor for SortingProcessor {
    fn process(
        &self,
        criteria: &SearchCriteria,
        collection: &mut PackOptionCollection<'_>,
    ) -> ResourceResult<()> {
        for order in &criteria.sort_orders {
            collection.add_order(&order.field, order.direction)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationProcessor;

impl CollectionProcessor for PaginationProcessor {
    fn process(
        &self,
        criteria: &SearchCriteria,
        collection: &mut PackOptionCollection<'_>,
    ) -> ResourceResult<()> {
        collection.set_page_size(criteria.page_size);
        collection.set_current_page(criteria.current_page.unwrap_or(1));
        Ok(())
    }
}

/// Runs a chain of processors in order.
///
/// The default chain is filtering, then sorting, then pagination.
pub struct SearchCriteriaCollectionProcessor {
    processors: Vec<Box<dyn CollectionProcessor>>,
}

impl SearchCriteriaCollectionProcessor {
    pub fn new(processors: Vec<Box<dyn CollectionProcessor>>) -> Self {
        Self { processors }
    }
}

impl Default for SearchCriteriaCollectionProcessor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(FilterProcessor),
            Box::new(SortingProcessor),
            Box::new(PaginationProcessor),
        ])
    }
}

impl CollectionProcessor for SearchCriteriaCollectionProcessor {
    fn process(
        &self,
        criteria: &SearchCriteria,
        collection: &mut PackOptionCollection<'_>,
    ) -> ResourceResult<()> {
        for processor in &self.processors {
            processor.process(criteria, collection)?;
        }
        Ok(())
    }
}

/// Makes collections hydrate extension attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionAttributesJoinProcessor;

impl JoinProcessor for ExtensionAttributesJoinProcessor {
    fn process(&self, collection: &mut PackOptionCollection<'_>) {
        collection.join_extension_attributes();
    }
}
