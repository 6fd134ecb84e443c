//! Statement types for the content graph.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::thing::{numeric_suffix, ContributorId, IdKind, Thing, ThingId};

/// Unique identifier of a statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementId(String);

impl StatementId {
    /// Create a StatementId from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an allocated statement ID from its sequence number.
    pub fn allocated(value: u64) -> Self {
        Self(format!("{}{}", IdKind::Statement.prefix(), value))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of an allocated ID (`S42` → `42`).
    pub fn numeric_suffix(&self) -> Option<u64> {
        numeric_suffix(&self.0)
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Directed, labeled, provenance-bearing edge between two Things.
///
/// Subject, predicate and object are materialized Things as they were when
/// the statement was read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Unique identifier.
    pub id: StatementId,
    /// Source node.
    pub subject: Thing,
    /// Edge label.
    pub predicate: Thing,
    /// Target node.
    pub object: Thing,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: ContributorId,
}

impl Statement {
    /// ID of the subject.
    pub fn subject_id(&self) -> &ThingId {
        &self.subject.id
    }

    /// ID of the predicate.
    pub fn predicate_id(&self) -> &ThingId {
        &self.predicate.id
    }

    /// ID of the object.
    pub fn object_id(&self) -> &ThingId {
        &self.object.id
    }

    /// Check whether this statement matches a subject/predicate pair.
    pub fn is(&self, subject: &ThingId, predicate: &ThingId) -> bool {
        &self.subject.id == subject && &self.predicate.id == predicate
    }

    /// Creation order: timestamp, then allocation sequence, then ID.
    ///
    /// Order of ordered sub-structures is implied by this ordering.
    pub fn creation_order(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.numeric_suffix().cmp(&other.id.numeric_suffix()))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sort statements by creation order.
pub fn sort_by_creation(statements: &mut [Statement]) {
    statements.sort_by(|a, b| a.creation_order(b));
}
