//! Pack option repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Convert data objects into storage records and delegate CRUD to the
//!   resource model.
//! - Translate save/delete storage failures into domain errors.
//! - Serve filtered, sorted, paginated listings through collection processors.
//!
//! # Invariants
//! - `get` reports absence as `NoSuchEntity`, detected by a missing id after
//!   load rather than by a storage error.
//! - `delete` reloads the record by the input's id instead of trusting the
//!   input's other fields.
//! - `get_list` never wraps storage errors.

use crate::model::attributes::to_attribute_map;
use crate::model::pack_option::{PackOption, PackOptionId};
use crate::repo::processor::{
    CollectionProcessor, ExtensionAttributesJoinProcessor, JoinProcessor,
    SearchCriteriaCollectionProcessor,
};
use crate::repo::resource::{PackOptionResource, ResourceError, ResourceResult};
use crate::search::criteria::SearchCriteria;
use crate::search::results::{PackOptionSearchResults, SearchResults};
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Domain error returned by [`PackOptionRepository`] operations.
#[derive(Debug)]
pub enum RepoError {
    /// No record exists for the requested identifier.
    NoSuchEntity(PackOptionId),
    /// Persisting failed; carries the underlying message.
    CouldNotSave(String),
    /// Deleting failed; carries the underlying message.
    CouldNotDelete(String),
    /// Storage failure passed through untranslated.
    Resource(ResourceError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchEntity(id) => write!(f, "PackOption with id \"{id}\" does not exist."),
            Self::CouldNotSave(message) => write!(f, "could not save the pack option: {message}"),
            Self::CouldNotDelete(message) => {
                write!(f, "could not delete the pack option: {message}")
            }
            Self::Resource(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RepoError {
    fn from(value: ResourceError) -> Self {
        Self::Resource(value)
    }
}

/// Repository interface for pack option CRUD and listing.
pub trait PackOptionRepository {
    /// Persists a data object and returns the stored record with its id.
    fn save(&self, pack_option: &PackOption) -> RepoResult<PackOption>;
    /// Loads one record by id.
    fn get(&self, id: PackOptionId) -> RepoResult<PackOption>;
    /// Lists records matching `criteria`.
    fn get_list(&self, criteria: &SearchCriteria) -> RepoResult<PackOptionSearchResults>;
    /// Deletes the stored record identified by `pack_option`'s id.
    fn delete(&self, pack_option: &PackOption) -> RepoResult<bool>;
    /// Loads then deletes a record by id.
    fn delete_by_id(&self, id: PackOptionId) -> RepoResult<bool>;
}

/// SQLite-backed pack option repository.
///
/// Collaborators are supplied at construction; defaults apply the standard
/// filter/sort/pagination chain and hydrate extension attributes.
pub struct SqlitePackOptionRepository<
    'conn,
    P = SearchCriteriaCollectionProcessor,
    J = ExtensionAttributesJoinProcessor,
> {
    resource: PackOptionResource<'conn>,
    collection_processor: P,
    join_processor: J,
}

impl<'conn> SqlitePackOptionRepository<'conn> {
    /// Constructs a repository with default processors from a migrated
    /// connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_processors(
            conn,
            SearchCriteriaCollectionProcessor::default(),
            ExtensionAttributesJoinProcessor,
        )
    }
}

impl<'conn, P, J> SqlitePackOptionRepository<'conn, P, J>
where
    P: CollectionProcessor,
    J: JoinProcessor,
{
    /// Constructs a repository with caller-provided processors.
    pub fn with_processors(
        conn: &'conn Connection,
        collection_processor: P,
        join_processor: J,
    ) -> RepoResult<Self> {
        Ok(Self {
            resource: PackOptionResource::try_new(conn)?,
            collection_processor,
            join_processor,
        })
    }

    fn reload_and_delete(&self, pack_option: &PackOption) -> ResourceResult<()> {
        let mut model = PackOption::default();
        if let Some(id) = pack_option.id() {
            self.resource.load(&mut model, id)?;
        }
        self.resource.delete(&model)
    }
}

impl<P, J> PackOptionRepository for SqlitePackOptionRepository<'_, P, J>
where
    P: CollectionProcessor,
    J: JoinProcessor,
{
    fn save(&self, pack_option: &PackOption) -> RepoResult<PackOption> {
        let mut model = to_attribute_map(pack_option)
            .and_then(PackOption::from_attribute_map)
            .map_err(|err| could_not_save(&err))?;

        self.resource
            .save(&mut model)
            .map_err(|err| could_not_save(&err))?;

        debug!(
            "event=pack_option_save module=repo status=ok packoption_id={}",
            model.id().unwrap_or_default()
        );
        Ok(model)
    }

    fn get(&self, id: PackOptionId) -> RepoResult<PackOption> {
        let mut model = PackOption::default();
        self.resource.load(&mut model, id)?;

        if model.id().is_none() {
            debug!("event=pack_option_get module=repo status=not_found packoption_id={id}");
            return Err(RepoError::NoSuchEntity(id));
        }

        Ok(model)
    }

    fn get_list(&self, criteria: &SearchCriteria) -> RepoResult<PackOptionSearchResults> {
        let mut collection = self.resource.collection();
        self.join_processor.process(&mut collection);
        self.collection_processor.process(criteria, &mut collection)?;

        let mut results = SearchResults::new(criteria.clone());
        results.items = collection.load()?;
        results.total_count = collection.size()?;

        debug!(
            "event=pack_option_list module=repo status=ok items={} total_count={}",
            results.items.len(),
            results.total_count
        );
        Ok(results)
    }

    fn delete(&self, pack_option: &PackOption) -> RepoResult<bool> {
        self.reload_and_delete(pack_option).map_err(|err| {
            warn!(
                "event=pack_option_delete module=repo status=error packoption_id={} error={err}",
                pack_option.id().unwrap_or_default()
            );
            RepoError::CouldNotDelete(err.to_string())
        })?;

        debug!(
            "event=pack_option_delete module=repo status=ok packoption_id={}",
            pack_option.id().unwrap_or_default()
        );
        Ok(true)
    }

    fn delete_by_id(&self, id: PackOptionId) -> RepoResult<bool> {
        let pack_option = self.get(id)?;
        self.delete(&pack_option)
    }
}

fn could_not_save(err: &dyn Display) -> RepoError {
    warn!("event=pack_option_save module=repo status=error error={err}");
    RepoError::CouldNotSave(err.to_string())
}
