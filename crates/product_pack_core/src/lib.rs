//! Pack option persistence for the product pack module.
//! Holds the repository contract, its SQLite resource model and the search
//! criteria used for listings.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attributes::{to_attribute_map, AttributeMap, ConversionError};
pub use model::pack_option::{
    DiscountType, ExtensionAttributes, PackOption, PackOptionId, PackOptionValidationError,
};
pub use repo::pack_option_repo::{
    PackOptionRepository, RepoError, RepoResult, SqlitePackOptionRepository,
};
pub use repo::processor::{
    CollectionProcessor, ExtensionAttributesJoinProcessor, FilterProcessor, JoinProcessor,
    PaginationProcessor, SearchCriteriaCollectionProcessor, SortingProcessor,
};
pub use repo::resource::{PackOptionResource, ResourceError, ResourceResult};
pub use search::criteria::{
    Condition, Filter, FilterGroup, FilterValue, SearchCriteria, SearchCriteriaBuilder,
    SortDirection, SortOrder,
};
pub use search::results::{PackOptionSearchResults, SearchResults};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
