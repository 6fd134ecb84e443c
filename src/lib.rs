//! # scholarly-graph-kernel
//!
//! Content mutation and versioning for scholarly content stored as a graph
//! of Things and Statements.
//!
//! The kernel answers one question:
//!
//! > Given a desired state of a content aggregate, which statements must be
//! > **created, kept or deleted**, and what is frozen when it is published?
//!
//! ## Core Contract
//!
//! 1. Every operation is an ordered pipeline of steps over an immutable command
//! 2. Ordered sub-structures are reconciled by diff, never rebuilt wholesale
//! 3. Deletion cascades only into parts nothing else references
//! 4. Published versions are frozen copies with an archived, digested bundle
//!
//! ## Architecture
//!
//! ```text
//! Command → ActionPipeline → GraphWriter → GraphStore (in-memory or external)
//!                 ↓               ↓
//!        ListReconciler   IdentityAllocator (block IDs)
//!        CascadeDeleter
//!        VersionArchiver → SubgraphExtractor → PublishedContent
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same root + same bundle configuration + same graph state → identical bundle
//! - Sub-structure order is statement creation order
//! - Reconciling an unchanged desired state performs no mutation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod archive;
pub mod canonical;
pub mod config;
pub mod content;
pub mod deleter;
pub mod doi;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod ids;
pub mod pipeline;
pub mod policy;
pub mod reconcile;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-exports
pub use types::{
    Bundle, ContributorId, IdKind, PublishedContent, Statement, StatementId, Thing, ThingId,
    ThingKind,
};
pub use error::{ContentError, ContentResult};
pub use config::{ConfigError, DoiSettings, KernelConfig};
pub use telemetry::{init_tracing, LogFormat};
pub use canonical::{canonical_hash, canonical_hash_hex, digest_hex, to_canonical_bytes};
pub use ids::{IdentityAllocator, DEFAULT_BLOCK_SIZE};
pub use store::{
    GraphStore, IdBlockCounter, InMemoryGraph, PublishedContentStore, StatementStore, StoreError,
    ThingStore,
};
pub use policy::{BundleConfiguration, BUNDLE_CONFIG_VERSION};
pub use extractor::SubgraphExtractor;
pub use graph::GraphWriter;
pub use pipeline::{Action, ActionPipeline, NamedStep};
pub use reconcile::{DesiredEntry, EntryLayout, ExistingEntry, ListReconciler, ReconcileReport};
pub use deleter::{CascadeDeleter, DeletionReport, OwnershipShape};
pub use doi::{Doi, DoiMetadata, DoiRegistrar, PrefixDoiRegistrar, RegistrarError};
pub use archive::{CacheStats, DoiOutcome, PublishedCache, VersionArchiver, VersionInfo, VersionLink};
pub use actions::{Author, AuthorListUpdater, AuthorResolver, ResolvedAuthor};

// Content type re-exports
pub use content::literature_list::{
    CreateLiteratureListCommand, DeleteLiteratureListCommand, ListEntryDefinition,
    LiteratureList, LiteratureListSection, LiteratureListService, PublishLiteratureListCommand,
    PublishOutcome, SectionDefinition, UpdateLiteratureListCommand,
};

/// Schema version for all kernel types.
/// Increment on breaking changes to any schema type.
pub const KERNEL_SCHEMA_VERSION: &str = "1.0.0";
