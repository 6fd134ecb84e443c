//! Author lists.
//!
//! ```text
//! subject --hasAuthors--> List --hasListElement--> AuthorEntry --hasAuthor--> author
//! ```
//!
//! The author Thing is an existing `Author` resource, a new `Author`
//! resource carrying an ORCID, or a plain name literal. Entries are kept in
//! order by [`ListReconciler`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::actions::property::delete_orphan_literals;
use crate::error::{ContentError, ContentResult};
use crate::graph::GraphWriter;
use crate::reconcile::{DesiredEntry, EntryLayout, ExistingEntry, ListReconciler, ReconcileReport};
use crate::types::vocab::{self, classes, predicates};
use crate::types::{ContributorId, Statement, ThingId, ThingKind, XSD_STRING};
use crate::validation::{validate_label, validate_orcid};

/// Label of author list containers.
pub const AUTHOR_LIST_LABEL: &str = "authors list";

/// An author as given in a command or read back from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Existing author resource, if any.
    pub id: Option<ThingId>,
    /// Display name.
    pub name: String,
    /// ORCID iD.
    pub orcid: Option<String>,
}

impl Author {
    /// Author known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            orcid: None,
        }
    }

    /// Set the existing resource.
    pub fn with_id(mut self, id: ThingId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the ORCID iD.
    pub fn with_orcid(mut self, orcid: impl Into<String>) -> Self {
        self.orcid = Some(orcid.into());
        self
    }
}

/// Author after lookup of IDs and ORCIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAuthor {
    /// Refers to an existing `Author` resource.
    Existing {
        /// Author resource.
        id: ThingId,
        /// Name as given.
        name: String,
    },
    /// Not in the graph yet.
    New {
        /// Name as given.
        name: String,
        /// ORCID iD; a resource is created when present.
        orcid: Option<String>,
    },
}

impl ResolvedAuthor {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Existing { name, .. } | Self::New { name, .. } => name,
        }
    }
}

/// Layout of author list entries.
pub fn author_layout() -> EntryLayout {
    EntryLayout {
        container_predicate: vocab::id(predicates::HAS_LIST_ELEMENT),
        link_predicate: vocab::id(predicates::HAS_AUTHOR),
        attribute_predicate: None,
        entry_label: "author entry".to_string(),
        entry_classes: vec![vocab::id(classes::AUTHOR_ENTRY)],
    }
}

/// Validates authors and looks up existing author resources.
pub struct AuthorResolver<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> AuthorResolver<'a> {
    /// Create a resolver reading through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Validate and resolve a list of authors.
    ///
    /// An ID must name an `Author` resource. An ORCID already attached to an
    /// author resolves to it; if the ID and ORCID point at different authors
    /// the author is ambiguous. The same author may appear only once.
    pub fn resolve(&self, authors: &[Author]) -> ContentResult<Vec<ResolvedAuthor>> {
        let mut seen_ids = BTreeSet::new();
        let mut seen_orcids = BTreeSet::new();
        let mut resolved = Vec::with_capacity(authors.len());

        for (index, author) in authors.iter().enumerate() {
            let field = format!("authors[{index}]");
            validate_label(&format!("{field}.name"), &author.name)?;

            let by_id = match &author.id {
                Some(id) => {
                    let thing = self.writer.require("Author", id)?;
                    if !thing.is_instance_of(&vocab::id(classes::AUTHOR)) {
                        return Err(ContentError::validation(
                            format!("{field}.id"),
                            format!("\"{id}\" is not an author"),
                        ));
                    }
                    Some(id.clone())
                }
                None => None,
            };

            let by_orcid = match &author.orcid {
                Some(orcid) => {
                    validate_orcid(&format!("{field}.orcid"), orcid)?;
                    if !seen_orcids.insert(orcid.clone()) {
                        return Err(ContentError::validation(field, format!("duplicate ORCID \"{orcid}\"")));
                    }
                    self.find_by_orcid(&field, orcid)?
                }
                None => None,
            };

            let id = match (by_id, by_orcid) {
                (Some(a), Some(b)) if a != b => {
                    return Err(ContentError::validation(
                        field,
                        format!("ambiguous author: \"{a}\" and ORCID owner \"{b}\" differ"),
                    ));
                }
                (a, b) => a.or(b),
            };

            resolved.push(match id {
                Some(id) => {
                    if !seen_ids.insert(id.clone()) {
                        return Err(ContentError::validation(field, format!("duplicate author \"{id}\"")));
                    }
                    ResolvedAuthor::Existing {
                        id,
                        name: author.name.clone(),
                    }
                }
                None => ResolvedAuthor::New {
                    name: author.name.clone(),
                    orcid: author.orcid.clone(),
                },
            });
        }
        Ok(resolved)
    }

    fn find_by_orcid(&self, field: &str, orcid: &str) -> ContentResult<Option<ThingId>> {
        let author_class = vocab::id(classes::AUTHOR);
        let owners: BTreeSet<ThingId> = self
            .writer
            .store()
            .find_all_by_predicate_and_label(&vocab::id(predicates::HAS_ORCID), orcid)?
            .into_iter()
            .filter(|s| s.subject.is_instance_of(&author_class))
            .map(|s| s.subject.id)
            .collect();
        if owners.len() > 1 {
            return Err(ContentError::validation(
                field,
                format!("ORCID \"{orcid}\" belongs to several authors"),
            ));
        }
        Ok(owners.into_iter().next())
    }
}

/// Creates and updates the author list of a subject.
pub struct AuthorListUpdater<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> AuthorListUpdater<'a> {
    /// Create an updater writing through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Create the author list of `subject`. Returns the list container.
    pub fn create(
        &self,
        subject: &ThingId,
        authors: &[ResolvedAuthor],
        actor: ContributorId,
    ) -> ContentResult<ThingId> {
        let list = self.create_list(subject, actor)?;
        let desired = self.materialize(authors, &[], actor)?;
        ListReconciler::new(self.writer).reconcile(&list, &author_layout(), Vec::new(), &desired, actor)?;
        Ok(list)
    }

    /// Make the author list of `subject` match `authors`.
    ///
    /// Name-only authors reuse the literal of a current entry with the same
    /// name, so an unchanged list does not mutate the graph. Name literals
    /// that end up unreferenced are deleted.
    pub fn update(
        &self,
        subject: &ThingId,
        authors: &[ResolvedAuthor],
        actor: ContributorId,
    ) -> ContentResult<ReconcileReport> {
        let list = match self
            .writer
            .outgoing_with(subject, &vocab::id(predicates::HAS_AUTHORS))?
            .into_iter()
            .next()
        {
            Some(statement) => statement.object.id,
            None => self.create_list(subject, actor)?,
        };

        let layout = author_layout();
        let existing = ExistingEntry::load(&self.writer, &list, &layout)?;
        let previous: Vec<Statement> = existing.iter().filter_map(|e| e.link_edge.clone()).collect();
        let desired = self.materialize(authors, &existing, actor)?;

        let report = ListReconciler::new(self.writer).reconcile(&list, &layout, existing, &desired, actor)?;
        delete_orphan_literals(&self.writer, &previous)?;
        Ok(report)
    }

    fn create_list(&self, subject: &ThingId, actor: ContributorId) -> ContentResult<ThingId> {
        let list = self
            .writer
            .create_resource(AUTHOR_LIST_LABEL, [vocab::id(classes::LIST)], actor)?;
        self.writer
            .add_statement(subject, &vocab::id(predicates::HAS_AUTHORS), &list, actor)?;
        Ok(list)
    }

    /// Turn resolved authors into link targets, creating what is missing.
    fn materialize(
        &self,
        authors: &[ResolvedAuthor],
        existing: &[ExistingEntry],
        actor: ContributorId,
    ) -> ContentResult<Vec<DesiredEntry>> {
        let mut reusable: BTreeMap<&str, Vec<&ThingId>> = BTreeMap::new();
        for statement in existing.iter().filter_map(|e| e.link_edge.as_ref()) {
            if statement.object.kind == ThingKind::Literal {
                reusable
                    .entry(statement.object.label.as_str())
                    .or_default()
                    .push(statement.object_id());
            }
        }
        for literals in reusable.values_mut() {
            literals.reverse();
        }

        authors
            .iter()
            .map(|author| {
                let target = match author {
                    ResolvedAuthor::Existing { id, .. } => id.clone(),
                    ResolvedAuthor::New { name, orcid: None } => {
                        match reusable.get_mut(name.as_str()).and_then(Vec::pop) {
                            Some(literal) => literal.clone(),
                            None => self.writer.create_literal(name, XSD_STRING, actor)?,
                        }
                    }
                    ResolvedAuthor::New { name, orcid: Some(orcid) } => {
                        let resource = self
                            .writer
                            .create_resource(name, [vocab::id(classes::AUTHOR)], actor)?;
                        let literal = self.writer.create_literal(orcid, XSD_STRING, actor)?;
                        self.writer
                            .add_statement(&resource, &vocab::id(predicates::HAS_ORCID), &literal, actor)?;
                        resource
                    }
                };
                Ok(DesiredEntry::link(target))
            })
            .collect()
    }
}

/// Read the author list of `subject` from statements grouped by subject.
pub fn read_authors(subject: &ThingId, by_subject: &BTreeMap<ThingId, Vec<Statement>>) -> Vec<Author> {
    let Some(list) = by_subject
        .get(subject)
        .and_then(|s| s.iter().find(|s| s.predicate_id().as_str() == predicates::HAS_AUTHORS))
    else {
        return Vec::new();
    };

    ExistingEntry::collect(list.object_id(), &author_layout(), by_subject)
        .into_iter()
        .filter_map(|entry| entry.link_edge)
        .map(|link| {
            let target = link.object;
            if target.kind == ThingKind::Literal {
                return Author::named(target.label);
            }
            let orcid = by_subject.get(&target.id).and_then(|s| {
                s.iter()
                    .find(|s| s.predicate_id().as_str() == predicates::HAS_ORCID)
                    .map(|s| s.object.label.clone())
            });
            Author {
                id: Some(target.id),
                name: target.label,
                orcid,
            }
        })
        .collect()
}
