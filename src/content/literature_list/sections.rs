//! Section validation, creation and positional update.

use tracing::debug;

use super::commands::{ListEntryDefinition, SectionDefinition};
use crate::actions::SingleStatementPropertyUpdater;
use crate::actions::StatementCollectionPropertyUpdater;
use crate::deleter::{CascadeDeleter, OwnershipShape};
use crate::error::{ContentError, ContentResult};
use crate::graph::GraphWriter;
use crate::reconcile::{DesiredEntry, EntryLayout, ListReconciler};
use crate::types::vocab::{self, classes, predicates};
use crate::types::{ContributorId, Thing, ThingId, ThingKind, XSD_INTEGER, XSD_STRING};
use crate::validation::{validate_heading_size, validate_label, validate_text};

/// Layout of list section entries.
pub fn entry_layout() -> EntryLayout {
    EntryLayout {
        container_predicate: vocab::id(predicates::HAS_ENTRY),
        link_predicate: vocab::id(predicates::HAS_LINK),
        attribute_predicate: Some(vocab::id(predicates::DESCRIPTION)),
        entry_label: "Entry".to_string(),
        entry_classes: vec![vocab::id(classes::ENTRY)],
    }
}

/// Parts owned by a section node.
pub fn section_shape() -> OwnershipShape {
    OwnershipShape::new([
        predicates::HAS_HEADING_LEVEL,
        predicates::HAS_CONTENT,
        predicates::HAS_ENTRY,
        predicates::DESCRIPTION,
    ])
}

/// Validate section fields and check that every linked resource exists.
pub fn validate_sections(writer: &GraphWriter<'_>, sections: &[SectionDefinition]) -> ContentResult<()> {
    for (index, section) in sections.iter().enumerate() {
        let field = format!("sections[{index}]");
        match section {
            SectionDefinition::Text {
                heading,
                heading_size,
                text,
            } => {
                validate_label(&format!("{field}.heading"), heading)?;
                validate_heading_size(&format!("{field}.heading_size"), *heading_size)?;
                validate_text(&format!("{field}.text"), text)?;
            }
            SectionDefinition::List { entries } => {
                for (position, entry) in entries.iter().enumerate() {
                    let entry_field = format!("{field}.entries[{position}]");
                    let target = writer.require("Resource", &entry.id)?;
                    if target.kind != ThingKind::Resource {
                        return Err(ContentError::validation(
                            format!("{entry_field}.id"),
                            format!("\"{}\" is not a resource", entry.id),
                        ));
                    }
                    if let Some(description) = &entry.description {
                        validate_text(&format!("{entry_field}.description"), description)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Kind of a section node, from its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Text,
    List,
}

impl SectionKind {
    fn of_definition(section: &SectionDefinition) -> Self {
        match section {
            SectionDefinition::Text { .. } => Self::Text,
            SectionDefinition::List { .. } => Self::List,
        }
    }

    fn of_node(node: &Thing) -> Option<Self> {
        if node.is_instance_of(&vocab::id(classes::TEXT_SECTION)) {
            Some(Self::Text)
        } else if node.is_instance_of(&vocab::id(classes::LIST_SECTION)) {
            Some(Self::List)
        } else {
            None
        }
    }
}

/// Creates and updates the sections of a literature list.
pub struct SectionWriter<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> SectionWriter<'a> {
    /// Create a section writer.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Create all sections and link them to `root` in order.
    pub fn create_all(
        &self,
        root: &ThingId,
        sections: &[SectionDefinition],
        actor: ContributorId,
    ) -> ContentResult<Vec<ThingId>> {
        let has_section = vocab::id(predicates::HAS_SECTION);
        sections
            .iter()
            .map(|section| {
                let node = self.create(section, actor)?;
                self.writer.add_statement(root, &has_section, &node, actor)?;
                Ok(node)
            })
            .collect()
    }

    /// Make the sections of `root` match `desired`, position by position.
    ///
    /// A section of the same kind is updated in place; a kind change
    /// replaces the node. Surplus sections are deleted and new ones are
    /// appended. Returns whether anything changed.
    pub fn update_all(
        &self,
        root: &ThingId,
        desired: &[SectionDefinition],
        actor: ContributorId,
    ) -> ContentResult<bool> {
        let has_section = vocab::id(predicates::HAS_SECTION);
        let existing: Vec<Thing> = self
            .writer
            .outgoing_with(root, &has_section)?
            .into_iter()
            .map(|s| s.object)
            .collect();

        let mut changed = false;
        let mut nodes = Vec::with_capacity(desired.len());
        let mut replaced = Vec::new();
        for (position, section) in desired.iter().enumerate() {
            match existing.get(position) {
                Some(node) if SectionKind::of_node(node) == Some(SectionKind::of_definition(section)) => {
                    changed |= self.update(node, section, actor)?;
                    nodes.push(node.id.clone());
                }
                current => {
                    if let Some(node) = current {
                        replaced.push(node.id.clone());
                    }
                    nodes.push(self.create(section, actor)?);
                }
            }
        }
        replaced.extend(existing.iter().skip(desired.len()).map(|node| node.id.clone()));

        changed |= StatementCollectionPropertyUpdater::new(self.writer).update(root, &has_section, &nodes, actor)?;
        let deleter = CascadeDeleter::new(self.writer);
        for node in &replaced {
            deleter.delete(node, &section_shape(), actor)?;
        }
        debug!(%root, sections = nodes.len(), replaced = replaced.len(), "Updated sections");
        Ok(changed || !replaced.is_empty())
    }

    /// Create an unlinked section node with its parts.
    fn create(&self, section: &SectionDefinition, actor: ContributorId) -> ContentResult<ThingId> {
        match section {
            SectionDefinition::Text {
                heading,
                heading_size,
                text,
            } => {
                let node = self
                    .writer
                    .create_resource(heading, [vocab::id(classes::TEXT_SECTION)], actor)?;
                let level = self
                    .writer
                    .create_literal(&heading_size.to_string(), XSD_INTEGER, actor)?;
                self.writer
                    .add_statement(&node, &vocab::id(predicates::HAS_HEADING_LEVEL), &level, actor)?;
                let content = self.writer.create_literal(text, XSD_STRING, actor)?;
                self.writer
                    .add_statement(&node, &vocab::id(predicates::HAS_CONTENT), &content, actor)?;
                Ok(node)
            }
            SectionDefinition::List { entries } => {
                let node = self
                    .writer
                    .create_resource("", [vocab::id(classes::LIST_SECTION)], actor)?;
                ListReconciler::new(self.writer).reconcile(
                    &node,
                    &entry_layout(),
                    Vec::new(),
                    &desired_entries(entries),
                    actor,
                )?;
                Ok(node)
            }
        }
    }

    /// Update a section node of the matching kind in place.
    fn update(&self, node: &Thing, section: &SectionDefinition, actor: ContributorId) -> ContentResult<bool> {
        match section {
            SectionDefinition::Text {
                heading,
                heading_size,
                text,
            } => {
                let properties = SingleStatementPropertyUpdater::new(self.writer);
                let mut changed = node.label != *heading;
                self.writer.update_label(&node.id, heading)?;
                changed |= properties.update_required(
                    &node.id,
                    &vocab::id(predicates::HAS_HEADING_LEVEL),
                    &heading_size.to_string(),
                    XSD_INTEGER,
                    actor,
                )?;
                changed |= properties.update_required(
                    &node.id,
                    &vocab::id(predicates::HAS_CONTENT),
                    text,
                    XSD_STRING,
                    actor,
                )?;
                Ok(changed)
            }
            SectionDefinition::List { entries } => {
                let report = ListReconciler::new(self.writer).reconcile_stored(
                    &node.id,
                    &entry_layout(),
                    &desired_entries(entries),
                    actor,
                )?;
                Ok(!report.is_noop())
            }
        }
    }
}

fn desired_entries(entries: &[ListEntryDefinition]) -> Vec<DesiredEntry> {
    entries
        .iter()
        .map(|entry| DesiredEntry {
            link: entry.id.clone(),
            attribute: entry.description.clone(),
        })
        .collect()
}
