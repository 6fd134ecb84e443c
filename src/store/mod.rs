//! Graph storage ports.
//!
//! The kernel consumes these traits and never talks to a database directly.
//! All calls are synchronous and blocking; retries and transactions belong
//! to the implementation.

pub mod memory;

use crate::policy::BundleConfiguration;
use crate::types::{
    Bundle, ContributorId, IdKind, PublishedContent, Statement, StatementId, Thing, ThingId,
};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Thing not found.
    #[error("Thing not found: {0}")]
    ThingNotFound(ThingId),
    /// Statement not found.
    #[error("Statement not found: {0}")]
    StatementNotFound(StatementId),
    /// Entity with this ID already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Thing is still referenced by at least one statement.
    #[error("Thing is still referenced by statements: {0}")]
    ThingInUse(ThingId),
    /// Thing is flagged as not modifiable.
    #[error("Thing is not modifiable: {0}")]
    NotModifiable(ThingId),
    /// Remote ID counter could not be incremented.
    #[error("ID counter unavailable: {0}")]
    CounterUnavailable(String),
    /// Any other backend failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Store of graph nodes.
pub trait ThingStore: Send + Sync {
    /// Fetch a Thing by ID.
    fn find_by_id(&self, id: &ThingId) -> Result<Option<Thing>, StoreError>;

    /// Create a Thing. Fails with `AlreadyExists` if the ID is taken.
    fn create(&self, thing: Thing) -> Result<ThingId, StoreError>;

    /// Replace label and classes of an existing, modifiable Thing.
    fn update(&self, thing: Thing) -> Result<(), StoreError>;

    /// Delete a Thing. Referenced or non-modifiable Things are rejected.
    fn delete(&self, id: &ThingId) -> Result<(), StoreError>;

    /// Count statements that use `id` as their object.
    fn count_incoming_statements(&self, id: &ThingId) -> Result<u64, StoreError>;

    /// Check whether a Thing exists.
    fn exists(&self, id: &ThingId) -> Result<bool, StoreError> {
        Ok(self.find_by_id(id)?.is_some())
    }

    /// Check whether all Things exist.
    fn exists_all(&self, ids: &[ThingId]) -> Result<bool, StoreError> {
        for id in ids {
            if !self.exists(id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Check whether any statement uses `id` as its object.
    fn is_used_as_object(&self, id: &ThingId) -> Result<bool, StoreError> {
        Ok(self.count_incoming_statements(id)? > 0)
    }
}

/// Store of statements.
pub trait StatementStore: Send + Sync {
    /// Create a statement between existing Things.
    fn create_statement(
        &self,
        id: StatementId,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ThingId,
        created_by: ContributorId,
    ) -> Result<StatementId, StoreError>;

    /// Delete statements by ID. Unknown IDs are ignored.
    fn delete_all_by_id(&self, ids: &[StatementId]) -> Result<(), StoreError>;

    /// Fetch a statement by ID.
    fn find_statement(&self, id: &StatementId) -> Result<Option<Statement>, StoreError>;

    /// Fetch outgoing statements of a subject, in creation order.
    fn find_all_by_subject(&self, subject: &ThingId) -> Result<Vec<Statement>, StoreError>;

    /// Fetch statements with `predicate` whose object is labeled `label`, in
    /// creation order.
    fn find_all_by_predicate_and_label(
        &self,
        predicate: &ThingId,
        label: &str,
    ) -> Result<Vec<Statement>, StoreError>;

    /// Fetch the statements reachable from `root` under `config`.
    ///
    /// Stores with a native traversal may override this; the default walks
    /// `find_all_by_subject`.
    fn fetch_bundle(&self, root: &ThingId, config: &BundleConfiguration) -> Result<Bundle, StoreError> {
        crate::extractor::traverse(self, root, config)
    }
}

/// Remote per-kind counter backing block ID allocation.
pub trait IdBlockCounter: Send + Sync {
    /// Current counter value for a kind.
    fn current_value(&self, kind: IdKind) -> Result<u64, StoreError>;

    /// Atomically add `n` to the counter and return the new value.
    fn increment_by(&self, kind: IdKind, n: u64) -> Result<u64, StoreError>;
}

/// Store of archived published bundles.
pub trait PublishedContentStore: Send + Sync {
    /// Persist a published bundle. A second save under the same ID fails.
    fn save_published(&self, content: PublishedContent) -> Result<(), StoreError>;

    /// Fetch a published bundle by version ID.
    fn find_published(&self, id: &ThingId) -> Result<Option<PublishedContent>, StoreError>;
}

/// Combined graph store used by content operations.
pub trait GraphStore: ThingStore + StatementStore + PublishedContentStore {}

impl<T: ThingStore + StatementStore + PublishedContentStore> GraphStore for T {}

pub use memory::InMemoryGraph;
