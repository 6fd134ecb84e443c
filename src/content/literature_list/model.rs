//! Read model of a literature list, rebuilt from its statements.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::sections::entry_layout;
use crate::actions::author::read_authors;
use crate::actions::Author;
use crate::archive::VersionInfo;
use crate::reconcile::ExistingEntry;
use crate::types::vocab::{classes, predicates};
use crate::types::{ContributorId, Statement, Thing, ThingId};
use crate::validation::MIN_HEADING_SIZE;

/// A referenced Thing with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    /// Thing ID.
    pub id: ThingId,
    /// Label at read time.
    pub label: String,
}

impl From<&Thing> for ObjectRef {
    fn from(thing: &Thing) -> Self {
        Self {
            id: thing.id.clone(),
            label: thing.label.clone(),
        }
    }
}

/// Entry of a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// Linked resource.
    pub value: ObjectRef,
    /// Optional note.
    pub description: Option<String>,
}

/// A section as read from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiteratureListSection {
    /// Heading plus free text.
    Text {
        /// Section node.
        id: ThingId,
        /// Heading.
        heading: String,
        /// Heading level.
        heading_size: u8,
        /// Body.
        text: String,
    },
    /// Ordered references.
    List {
        /// Section node.
        id: ThingId,
        /// Entries in order.
        entries: Vec<ListEntry>,
    },
}

impl LiteratureListSection {
    /// Section node.
    pub fn id(&self) -> &ThingId {
        match self {
            Self::Text { id, .. } | Self::List { id, .. } => id,
        }
    }
}

/// A literature list draft or published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteratureList {
    /// Root resource.
    pub id: ThingId,
    /// Title.
    pub title: String,
    /// Linked research fields.
    pub research_fields: Vec<ObjectRef>,
    /// Authors in order.
    pub authors: Vec<Author>,
    /// Sections in order.
    pub sections: Vec<LiteratureListSection>,
    /// Published versions of the draft, newest first.
    pub versions: Vec<VersionInfo>,
    /// Whether this is a published version.
    pub published: bool,
    /// Creation time of the root.
    pub created_at: DateTime<Utc>,
    /// Creator of the root.
    pub created_by: ContributorId,
}

impl LiteratureList {
    /// Rebuild a literature list from its root and statements grouped by
    /// subject in creation order.
    pub fn from_statements(
        root: &Thing,
        by_subject: &BTreeMap<ThingId, Vec<Statement>>,
        versions: Vec<VersionInfo>,
    ) -> Self {
        let outgoing = by_subject.get(&root.id).map(Vec::as_slice).unwrap_or_default();

        Self {
            id: root.id.clone(),
            title: root.label.clone(),
            research_fields: objects_of(outgoing, predicates::HAS_RESEARCH_FIELD)
                .map(ObjectRef::from)
                .collect(),
            authors: read_authors(&root.id, by_subject),
            sections: objects_of(outgoing, predicates::HAS_SECTION)
                .filter_map(|node| read_section(node, by_subject))
                .collect(),
            versions,
            published: root.is_instance_of(&ThingId::new(classes::LITERATURE_LIST_PUBLISHED)),
            created_at: root.created_at,
            created_by: root.created_by,
        }
    }
}

fn objects_of<'s>(outgoing: &'s [Statement], predicate: &'s str) -> impl Iterator<Item = &'s Thing> + 's {
    outgoing
        .iter()
        .filter(move |s| s.predicate_id().as_str() == predicate)
        .map(|s| &s.object)
}

fn read_section(node: &Thing, by_subject: &BTreeMap<ThingId, Vec<Statement>>) -> Option<LiteratureListSection> {
    if node.is_instance_of(&ThingId::new(classes::TEXT_SECTION)) {
        let literal_of = |predicate: &str| {
            by_subject.get(&node.id).and_then(|s| {
                s.iter()
                    .find(|s| s.predicate_id().as_str() == predicate)
                    .map(|s| s.object.label.clone())
            })
        };
        return Some(LiteratureListSection::Text {
            id: node.id.clone(),
            heading: node.label.clone(),
            heading_size: literal_of(predicates::HAS_HEADING_LEVEL)
                .and_then(|level| level.parse().ok())
                .unwrap_or(MIN_HEADING_SIZE),
            text: literal_of(predicates::HAS_CONTENT).unwrap_or_default(),
        });
    }
    if node.is_instance_of(&ThingId::new(classes::LIST_SECTION)) {
        let entries = ExistingEntry::collect(&node.id, &entry_layout(), by_subject)
            .into_iter()
            .filter_map(|entry| {
                let description = entry.attribute().map(str::to_string);
                entry.link_edge.map(|link| ListEntry {
                    value: ObjectRef::from(&link.object),
                    description,
                })
            })
            .collect();
        return Some(LiteratureListSection::List {
            id: node.id.clone(),
            entries,
        });
    }
    None
}
