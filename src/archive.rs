//! Version archiving for published content.
//!
//! A published version is an unmodifiable copy of a draft aggregate plus a
//! frozen statement bundle ([`PublishedContent`]). Versions hang off their
//! draft with `hasPublishedVersion` and form a chain over
//! `hasPreviousVersion`:
//!
//! ```text
//! draft --hasPublishedVersion--> V1
//! draft --hasPublishedVersion--> V2 --hasPreviousVersion--> V1
//! ```
//!
//! Archived bundles never change once saved, so reads go through an LRU
//! cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::KernelConfig;
use crate::doi::{Doi, DoiMetadata, DoiRegistrar};
use crate::error::{ContentError, ContentResult};
use crate::extractor::SubgraphExtractor;
use crate::graph::GraphWriter;
use crate::store::{PublishedContentStore, StoreError};
use crate::types::vocab::{self, predicates};
use crate::types::{ContributorId, PublishedContent, Statement, ThingId, XSD_STRING};

/// Shared LRU cache of archived bundles.
#[derive(Clone)]
pub struct PublishedCache {
    cache: Arc<RwLock<LruCache<ThingId, Arc<PublishedContent>>>>,
}

impl PublishedCache {
    /// Create a cache holding up to `capacity` bundles.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Look up a bundle without touching recency.
    pub fn peek(&self, id: &ThingId) -> Option<Arc<PublishedContent>> {
        self.cache.read().peek(id).cloned()
    }

    /// Insert a bundle.
    pub fn put(&self, content: Arc<PublishedContent>) {
        self.cache.write().put(content.id.clone(), content);
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            len: cache.len(),
            cap: cache.cap().get(),
        }
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

impl std::fmt::Debug for PublishedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishedCache").field("stats", &self.stats()).finish()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

/// Edges added when a version is linked to its draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionLink {
    /// The newly linked version.
    pub version: ThingId,
    /// Previous head, if any.
    pub previous: Option<ThingId>,
    /// Stale draft-level `hasPreviousVersion` edges that were removed.
    pub stale_edges_removed: usize,
}

/// Result of a DOI request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DoiOutcome {
    /// No DOI was requested.
    NotRequested,
    /// Registered and attached to the version.
    Registered(Doi),
    /// Registration failed; the publish went through without a DOI.
    Failed(String),
}

/// A published version as listed in the history of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// Version ID.
    pub id: ThingId,
    /// Version label (title at publish time).
    pub label: String,
    /// When the version was linked.
    pub created_at: DateTime<Utc>,
    /// Changelog, if one was given.
    pub changelog: Option<String>,
    /// DOI, if one was registered.
    pub doi: Option<String>,
}

/// Archives and links published versions.
pub struct VersionArchiver<'a> {
    writer: GraphWriter<'a>,
    config: &'a KernelConfig,
    registrar: Option<&'a dyn DoiRegistrar>,
    cache: &'a PublishedCache,
}

impl<'a> VersionArchiver<'a> {
    /// Create an archiver.
    pub fn new(
        writer: GraphWriter<'a>,
        config: &'a KernelConfig,
        registrar: Option<&'a dyn DoiRegistrar>,
        cache: &'a PublishedCache,
    ) -> Self {
        Self {
            writer,
            config,
            registrar,
            cache,
        }
    }

    /// Freeze the bundle under `published_root` and persist it.
    ///
    /// A second archive under the same version ID fails with `AlreadyExists`.
    pub fn archive(&self, draft: &ThingId, published_root: &ThingId) -> ContentResult<Arc<PublishedContent>> {
        let store = self.writer.store();
        let bundle_config = &self.config.published_bundle;
        let bundle = SubgraphExtractor::new(store).extract(published_root, bundle_config)?;
        let content = PublishedContent::new(
            published_root.clone(),
            draft.clone(),
            bundle,
            bundle_config.params_hash(),
        );

        store.save_published(content.clone()).map_err(|e| match e {
            StoreError::AlreadyExists(key) => ContentError::AlreadyExists {
                kind: "Published version",
                key: format!("id \"{key}\""),
            },
            other => other.into(),
        })?;
        info!(
            draft = %draft,
            version = %published_root,
            statements = content.statements.len(),
            digest = %content.digest,
            "Archived published version"
        );

        let content = Arc::new(content);
        self.cache.put(content.clone());
        Ok(content)
    }

    /// Link `version` as the newest published version of `draft`.
    pub fn link_version(
        &self,
        draft: &ThingId,
        version: &ThingId,
        changelog: Option<&str>,
        actor: ContributorId,
    ) -> ContentResult<VersionLink> {
        let previous = self.head(draft)?.filter(|head| head != version);
        let frozen = self.writer.frozen();

        frozen.add_statement(draft, &vocab::id(predicates::HAS_PUBLISHED_VERSION), version, actor)?;
        if let Some(changelog) = changelog {
            let literal = frozen.create_literal(changelog, XSD_STRING, actor)?;
            frozen.add_statement(version, &vocab::id(predicates::DESCRIPTION), &literal, actor)?;
        }
        if let Some(previous) = &previous {
            frozen.add_statement(version, &vocab::id(predicates::HAS_PREVIOUS_VERSION), previous, actor)?;
        }

        let stale: Vec<_> = self
            .writer
            .outgoing_with(draft, &vocab::id(predicates::HAS_PREVIOUS_VERSION))?
            .into_iter()
            .map(|s| s.id)
            .collect();
        self.writer.delete_statements(&stale)?;

        Ok(VersionLink {
            version: version.clone(),
            previous,
            stale_edges_removed: stale.len(),
        })
    }

    /// Register a DOI for `version` and attach it with `hasDOI`.
    ///
    /// Registrar failures are logged and reported as [`DoiOutcome::Failed`]
    /// unless configured to be fatal.
    pub fn request_doi(
        &self,
        version: &ThingId,
        metadata: &DoiMetadata,
        actor: ContributorId,
    ) -> ContentResult<DoiOutcome> {
        let registrar = match self.registrar {
            Some(registrar) if self.config.doi.enabled => registrar,
            _ => {
                return self.doi_failure(version, "DOI registration is not configured".to_string());
            }
        };

        match registrar.register(metadata) {
            Ok(doi) => {
                let frozen = self.writer.frozen();
                let literal = frozen.create_literal(doi.as_str(), XSD_STRING, actor)?;
                frozen.add_statement(version, &vocab::id(predicates::HAS_DOI), &literal, actor)?;
                info!(version = %version, doi = %doi, "Registered DOI");
                Ok(DoiOutcome::Registered(doi))
            }
            Err(e) => {
                if self.config.doi.failure_is_fatal {
                    return Err(e.into());
                }
                self.doi_failure(version, e.to_string())
            }
        }
    }

    fn doi_failure(&self, version: &ThingId, message: String) -> ContentResult<DoiOutcome> {
        if self.config.doi.failure_is_fatal {
            return Err(ContentError::ExternalServiceFailure {
                service: "doi",
                message,
            });
        }
        warn!(version = %version, error = %message, "DOI registration failed, publishing without DOI");
        Ok(DoiOutcome::Failed(message))
    }

    /// Published versions of `draft`, newest first.
    pub fn versions(&self, draft: &ThingId) -> ContentResult<Vec<VersionInfo>> {
        let mut links = self.version_links(draft)?;
        links.reverse();
        links
            .into_iter()
            .map(|link| {
                let outgoing = self.writer.outgoing(link.object_id())?;
                let literal_of = |predicate: &str| {
                    outgoing
                        .iter()
                        .find(|s| s.predicate_id().as_str() == predicate)
                        .map(|s| s.object.label.clone())
                };
                Ok(VersionInfo {
                    id: link.object.id.clone(),
                    label: link.object.label.clone(),
                    created_at: link.created_at,
                    changelog: literal_of(predicates::DESCRIPTION),
                    doi: literal_of(predicates::HAS_DOI),
                })
            })
            .collect()
    }

    /// Newest published version of `draft`.
    pub fn head(&self, draft: &ThingId) -> ContentResult<Option<ThingId>> {
        Ok(self.version_links(draft)?.pop().map(|s| s.object.id))
    }

    /// Read an archived bundle, verifying its digest.
    pub fn find_published(&self, version: &ThingId) -> ContentResult<Arc<PublishedContent>> {
        if let Some(content) = self.cache.peek(version) {
            return Ok(content);
        }
        let content = self
            .writer
            .store()
            .find_published(version)?
            .ok_or_else(|| ContentError::not_found("Published version", version))?;
        if !content.verify() {
            return Err(StoreError::Backend(format!(
                "published content {version} does not match its digest"
            ))
            .into());
        }
        let content = Arc::new(content);
        self.cache.put(content.clone());
        Ok(content)
    }

    /// `hasPublishedVersion` edges in creation order.
    fn version_links(&self, draft: &ThingId) -> ContentResult<Vec<Statement>> {
        self.writer
            .outgoing_with(draft, &vocab::id(predicates::HAS_PUBLISHED_VERSION))
    }
}
