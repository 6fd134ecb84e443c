//! Statement bundles and archived published content.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::statement::{sort_by_creation, Statement, StatementId};
use super::thing::ThingId;
use crate::canonical::{canonical_hash_hex, digest_hex};

/// Statements reachable from a root.
///
/// Statement order is the traversal's discovery order, which is stable for a
/// fixed store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Root the traversal started from.
    pub root_id: ThingId,
    /// Reachable statements.
    pub statements: Vec<Statement>,
}

impl Bundle {
    /// Create an empty bundle.
    pub fn empty(root_id: ThingId) -> Self {
        Self {
            root_id,
            statements: Vec::new(),
        }
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the bundle holds no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Check whether a statement is part of the bundle.
    pub fn contains(&self, id: &StatementId) -> bool {
        self.statements.iter().any(|s| &s.id == id)
    }

    /// Check whether the bundle has an edge `subject → object`.
    pub fn has_edge(&self, subject: &ThingId, object: &ThingId) -> bool {
        self.statements
            .iter()
            .any(|s| s.subject_id() == subject && s.object_id() == object)
    }

    /// Group statements by subject, each group in creation order.
    pub fn by_subject(&self) -> BTreeMap<ThingId, Vec<Statement>> {
        group_by_subject(self.statements.iter().cloned())
    }

    /// Deterministic fingerprint of the bundle's edges.
    ///
    /// Independent of discovery order: edges are sorted by statement ID.
    pub fn fingerprint(&self) -> String {
        let mut edges: Vec<(&str, &str, &str, &str)> = self
            .statements
            .iter()
            .map(|s| {
                (
                    s.id.as_str(),
                    s.subject.id.as_str(),
                    s.predicate.id.as_str(),
                    s.object.id.as_str(),
                )
            })
            .collect();
        edges.sort();
        canonical_hash_hex(&(self.root_id.as_str(), edges))
    }
}

/// Group statements by subject, each group sorted by creation order.
pub fn group_by_subject(
    statements: impl IntoIterator<Item = Statement>,
) -> BTreeMap<ThingId, Vec<Statement>> {
    let mut grouped: BTreeMap<ThingId, Vec<Statement>> = BTreeMap::new();
    for statement in statements {
        grouped
            .entry(statement.subject.id.clone())
            .or_default()
            .push(statement);
    }
    for group in grouped.values_mut() {
        sort_by_creation(group);
    }
    grouped
}

/// Archived, immutable bundle of a published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedContent {
    /// Version ID (the published root).
    pub id: ThingId,
    /// Draft the version was published from.
    pub root_id: ThingId,
    /// Frozen statements.
    pub statements: Vec<Statement>,
    /// SHA-256 of the canonical statement list.
    pub digest: String,
    /// Parameter hash of the traversal that produced the bundle.
    pub params_hash: String,
    /// Archival time.
    pub created_at: DateTime<Utc>,
}

impl PublishedContent {
    /// Freeze a bundle under a version ID.
    pub fn new(id: ThingId, root_id: ThingId, bundle: Bundle, params_hash: String) -> Self {
        let digest = digest_hex(&bundle.statements);
        Self {
            id,
            root_id,
            statements: bundle.statements,
            digest,
            params_hash,
            created_at: Utc::now(),
        }
    }

    /// Check that the statements still match the recorded digest.
    pub fn verify(&self) -> bool {
        digest_hex(&self.statements) == self.digest
    }

    /// View the frozen statements as a bundle rooted at the version.
    pub fn to_bundle(&self) -> Bundle {
        Bundle {
            root_id: self.id.clone(),
            statements: self.statements.clone(),
        }
    }
}
