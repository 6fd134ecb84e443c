//! Commands accepted by the literature list service.

use serde::{Deserialize, Serialize};

use crate::actions::Author;
use crate::types::{ContributorId, ThingId};

/// A section as given in a create or update command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionDefinition {
    /// Heading plus free text.
    Text {
        /// Heading, stored as the section label.
        heading: String,
        /// Heading level, 1 to 6.
        heading_size: u8,
        /// Section body.
        text: String,
    },
    /// Ordered references to existing resources.
    List {
        /// Entries in order.
        entries: Vec<ListEntryDefinition>,
    },
}

impl SectionDefinition {
    /// Text section.
    pub fn text(heading: impl Into<String>, heading_size: u8, text: impl Into<String>) -> Self {
        Self::Text {
            heading: heading.into(),
            heading_size,
            text: text.into(),
        }
    }

    /// List section.
    pub fn list(entries: impl IntoIterator<Item = ListEntryDefinition>) -> Self {
        Self::List {
            entries: entries.into_iter().collect(),
        }
    }
}

/// One entry of a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntryDefinition {
    /// Linked resource.
    pub id: ThingId,
    /// Optional note on the entry.
    pub description: Option<String>,
}

impl ListEntryDefinition {
    /// Entry without description.
    pub fn new(id: ThingId) -> Self {
        Self { id, description: None }
    }

    /// Entry with description.
    pub fn described(id: ThingId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: Some(description.into()),
        }
    }
}

/// Create a literature list draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLiteratureListCommand {
    /// Acting contributor.
    pub contributor_id: ContributorId,
    /// Title.
    pub title: String,
    /// Existing research fields.
    pub research_fields: Vec<ThingId>,
    /// Authors in order.
    pub authors: Vec<Author>,
    /// Sections in order.
    pub sections: Vec<SectionDefinition>,
}

/// Update a literature list draft. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLiteratureListCommand {
    /// Draft to update.
    pub literature_list_id: ThingId,
    /// Acting contributor.
    pub contributor_id: ContributorId,
    /// New title.
    pub title: Option<String>,
    /// New research fields.
    pub research_fields: Option<Vec<ThingId>>,
    /// New authors.
    pub authors: Option<Vec<Author>>,
    /// New sections.
    pub sections: Option<Vec<SectionDefinition>>,
}

impl UpdateLiteratureListCommand {
    /// Command that changes nothing yet.
    pub fn new(literature_list_id: ThingId, contributor_id: ContributorId) -> Self {
        Self {
            literature_list_id,
            contributor_id,
            title: None,
            research_fields: None,
            authors: None,
            sections: None,
        }
    }
}

/// Publish the current state of a draft as a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishLiteratureListCommand {
    /// Draft to publish.
    pub id: ThingId,
    /// Acting contributor.
    pub contributor_id: ContributorId,
    /// What changed since the previous version.
    pub changelog: Option<String>,
    /// Whether to register a DOI for the version.
    pub assign_doi: bool,
}

/// Delete a literature list draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLiteratureListCommand {
    /// Draft to delete.
    pub id: ThingId,
    /// Acting contributor.
    pub contributor_id: ContributorId,
}
