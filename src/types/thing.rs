//! Thing types for the content graph.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a Thing in the graph.
///
/// Allocated IDs carry a one-letter prefix that denotes their kind
/// (see [`IdKind`]). Vocabulary Things use fixed readable IDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingId(String);

impl ThingId {
    /// Create a ThingId from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an allocated ID from its kind and sequence number.
    pub fn allocated(kind: IdKind, value: u64) -> Self {
        Self(format!("{}{}", kind.prefix(), value))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of an allocated ID (`R42` → `42`).
    pub fn numeric_suffix(&self) -> Option<u64> {
        numeric_suffix(&self.0)
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub(crate) fn numeric_suffix(id: &str) -> Option<u64> {
    let mut chars = id.chars();
    chars.next()?;
    chars.as_str().parse().ok()
}

/// Kind of an allocated identifier. The prefix letter denotes the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdKind {
    /// Resource node.
    Resource,
    /// Literal node.
    Literal,
    /// Predicate node.
    Predicate,
    /// Class node.
    Class,
    /// Statement (edge).
    Statement,
}

impl IdKind {
    /// All kinds, in a fixed order.
    pub const ALL: [IdKind; 5] = [
        IdKind::Resource,
        IdKind::Literal,
        IdKind::Predicate,
        IdKind::Class,
        IdKind::Statement,
    ];

    /// Prefix letter used for IDs of this kind.
    pub fn prefix(&self) -> char {
        match self {
            Self::Resource => 'R',
            Self::Literal => 'L',
            Self::Predicate => 'P',
            Self::Class => 'C',
            Self::Statement => 'S',
        }
    }

    /// Parse a kind from its prefix letter.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Resource),
            'L' => Some(Self::Literal),
            'P' => Some(Self::Predicate),
            'C' => Some(Self::Class),
            'S' => Some(Self::Statement),
            _ => None,
        }
    }

    /// Dense index, used for per-kind tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Resource => 0,
            Self::Literal => 1,
            Self::Predicate => 2,
            Self::Class => 3,
            Self::Statement => 4,
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Literal => write!(f, "literal"),
            Self::Predicate => write!(f, "predicate"),
            Self::Class => write!(f, "class"),
            Self::Statement => write!(f, "statement"),
        }
    }
}

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThingKind {
    /// Resource, may carry classes.
    Resource,
    /// Literal value with a datatype.
    Literal,
    /// Predicate used to label statements.
    Predicate,
    /// Class used to tag resources.
    Class,
}

impl ThingKind {
    /// Identifier kind used when allocating IDs for this node kind.
    pub fn id_kind(&self) -> IdKind {
        match self {
            Self::Resource => IdKind::Resource,
            Self::Literal => IdKind::Literal,
            Self::Predicate => IdKind::Predicate,
            Self::Class => IdKind::Class,
        }
    }
}

impl fmt::Display for ThingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id_kind().fmt(f)
    }
}

/// Identifier of the contributor that created a Thing or Statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContributorId(Uuid);

impl ContributorId {
    /// Contributor used for vocabulary and system-created Things.
    pub const SYSTEM: ContributorId = ContributorId(Uuid::nil());

    /// Create a ContributorId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random contributor ID.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// XSD string datatype.
pub const XSD_STRING: &str = "xsd:string";
/// XSD integer datatype.
pub const XSD_INTEGER: &str = "xsd:integer";

/// A node of the content graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    /// Unique identifier.
    pub id: ThingId,
    /// Node kind.
    pub kind: ThingKind,
    /// Human-readable label (the value for literals).
    pub label: String,
    /// Classes of a resource. Empty for other kinds.
    pub classes: BTreeSet<ThingId>,
    /// Datatype of a literal.
    pub datatype: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: ContributorId,
    /// Whether the Thing may be updated or deleted.
    pub modifiable: bool,
}

impl Thing {
    /// Create a resource.
    pub fn resource(
        id: ThingId,
        label: impl Into<String>,
        classes: impl IntoIterator<Item = ThingId>,
        created_by: ContributorId,
    ) -> Self {
        Self {
            id,
            kind: ThingKind::Resource,
            label: label.into(),
            classes: classes.into_iter().collect(),
            datatype: None,
            created_at: Utc::now(),
            created_by,
            modifiable: true,
        }
    }

    /// Create a literal.
    pub fn literal(
        id: ThingId,
        value: impl Into<String>,
        datatype: impl Into<String>,
        created_by: ContributorId,
    ) -> Self {
        Self {
            id,
            kind: ThingKind::Literal,
            label: value.into(),
            classes: BTreeSet::new(),
            datatype: Some(datatype.into()),
            created_at: Utc::now(),
            created_by,
            modifiable: true,
        }
    }

    /// Create a predicate.
    pub fn predicate(id: ThingId, label: impl Into<String>) -> Self {
        Self::node(id, ThingKind::Predicate, label)
    }

    /// Create a class.
    pub fn class(id: ThingId, label: impl Into<String>) -> Self {
        Self::node(id, ThingKind::Class, label)
    }

    fn node(id: ThingId, kind: ThingKind, label: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            classes: BTreeSet::new(),
            datatype: None,
            created_at: Utc::now(),
            created_by: ContributorId::SYSTEM,
            modifiable: false,
        }
    }

    /// Set the modifiable flag.
    pub fn with_modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    /// Set the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Check whether this Thing is a resource carrying `class`.
    pub fn is_instance_of(&self, class: &ThingId) -> bool {
        self.kind == ThingKind::Resource && self.classes.contains(class)
    }

    /// Check whether this Thing is a resource carrying any of `classes`.
    pub fn has_any_class<'a>(&self, classes: impl IntoIterator<Item = &'a ThingId>) -> bool {
        classes.into_iter().any(|c| self.is_instance_of(c))
    }
}
