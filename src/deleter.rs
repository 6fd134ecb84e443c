//! Reference-counted cascade deletion of aggregates.
//!
//! An aggregate owns the parts reachable from its root over the predicates
//! named in an [`OwnershipShape`]. Deleting the aggregate removes every
//! owned part that nothing outside the aggregate refers to.
//!
//! ## Concurrency
//!
//! The incoming-reference check and the deletion are separate store calls.
//! A concurrent writer linking to a part between the two calls makes the
//! store refuse that part's deletion with `InUse`; statements deleted
//! before that point stay deleted.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ContentError, ContentResult};
use crate::graph::GraphWriter;
use crate::policy::BundleConfiguration;
use crate::store::{StatementStore, ThingStore};
use crate::types::{ContributorId, StatementId, ThingId, ThingKind};

/// Predicates leading from an aggregate root to the parts it owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipShape {
    /// Edges over these predicates lead to owned parts.
    pub owned_predicates: BTreeSet<ThingId>,
    /// Parts carrying one of these classes are never deleted.
    pub kept_classes: BTreeSet<ThingId>,
}

impl OwnershipShape {
    /// Create a shape from owned predicates.
    pub fn new<'s>(owned_predicates: impl IntoIterator<Item = &'s str>) -> Self {
        Self {
            owned_predicates: owned_predicates.into_iter().map(ThingId::new).collect(),
            kept_classes: BTreeSet::new(),
        }
    }

    /// Protect parts with these classes from deletion.
    pub fn keeping<'s>(mut self, classes: impl IntoIterator<Item = &'s str>) -> Self {
        self.kept_classes.extend(classes.into_iter().map(ThingId::new));
        self
    }

    /// Whether edges over `predicate` lead to owned parts.
    pub fn owns(&self, predicate: &ThingId) -> bool {
        self.owned_predicates.contains(predicate)
    }
}

/// What a cascade deletion removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Deleted Things, root last.
    pub things_deleted: Vec<ThingId>,
    /// Number of deleted statements.
    pub statements_deleted: usize,
    /// Candidate parts left in place because they are shared or protected.
    pub retained: Vec<ThingId>,
}

/// Deletes aggregates with their unshared parts.
pub struct CascadeDeleter<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> CascadeDeleter<'a> {
    /// Create a deleter writing through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Delete `root` and the parts it owns exclusively.
    ///
    /// ## Errors
    ///
    /// - `NotFound` if the root does not exist
    /// - `InUse` if any statement uses the root as its object
    /// - `NotModifiable` if the root is frozen
    pub fn delete(
        &self,
        root: &ThingId,
        shape: &OwnershipShape,
        actor: ContributorId,
    ) -> ContentResult<DeletionReport> {
        let store = self.writer.store();
        let root_thing = self.writer.require("Resource", root)?;
        if store.is_used_as_object(root)? {
            return Err(ContentError::InUse {
                kind: "resource",
                id: root.clone(),
            });
        }
        if !root_thing.modifiable {
            return Err(ContentError::NotModifiable {
                kind: "Resource",
                id: root.clone(),
                reason: "flagged as not modifiable",
            });
        }

        let parts = self.owned_parts(root, shape)?;
        let mut report = DeletionReport {
            retained: parts.retained,
            ..DeletionReport::default()
        };

        let mut statement_ids: Vec<StatementId> = Vec::new();
        for subject in std::iter::once(root).chain(parts.owned.iter()) {
            statement_ids.extend(store.find_all_by_subject(subject)?.into_iter().map(|s| s.id));
        }
        self.writer.delete_statements(&statement_ids)?;
        report.statements_deleted = statement_ids.len();

        for part in parts.owned.iter().rev() {
            self.writer.delete_thing(part)?;
            report.things_deleted.push(part.clone());
        }
        self.writer.delete_thing(root)?;
        report.things_deleted.push(root.clone());

        info!(
            root = %root,
            actor = %actor,
            things = report.things_deleted.len(),
            statements = report.statements_deleted,
            retained = report.retained.len(),
            "Deleted aggregate"
        );
        Ok(report)
    }

    /// Walk owned predicates breadth-first from the root.
    fn owned_parts(&self, root: &ThingId, shape: &OwnershipShape) -> ContentResult<OwnedParts> {
        let store = self.writer.store();
        let bundle = store.fetch_bundle(root, &BundleConfiguration::aggregate())?;
        let by_subject = bundle.by_subject();

        let mut parts = OwnedParts::default();
        let mut seen: BTreeSet<ThingId> = BTreeSet::from([root.clone()]);
        let mut queue: VecDeque<ThingId> = VecDeque::from([root.clone()]);

        while let Some(subject) = queue.pop_front() {
            let Some(statements) = by_subject.get(&subject) else {
                continue;
            };
            for statement in statements.iter().filter(|s| shape.owns(s.predicate_id())) {
                let part = &statement.object;
                if !seen.insert(part.id.clone()) {
                    continue;
                }
                let shareable = matches!(part.kind, ThingKind::Predicate | ThingKind::Class)
                    || !part.modifiable
                    || part.has_any_class(&shape.kept_classes);
                if shareable || store.count_incoming_statements(&part.id)? > 1 {
                    debug!(part = %part.id, "Retaining shared part");
                    parts.retained.push(part.id.clone());
                    continue;
                }
                parts.owned.push(part.id.clone());
                queue.push_back(part.id.clone());
            }
        }
        Ok(parts)
    }
}

#[derive(Default)]
struct OwnedParts {
    /// In discovery order.
    owned: Vec<ThingId>,
    retained: Vec<ThingId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdentityAllocator;
    use crate::store::InMemoryGraph;
    use crate::types::vocab::{self, classes, predicates};
    use crate::types::XSD_STRING;
    use std::sync::Arc;

    const ACTOR: ContributorId = ContributorId::SYSTEM;

    fn fixture() -> (Arc<InMemoryGraph>, IdentityAllocator) {
        let store = Arc::new(InMemoryGraph::with_vocabulary());
        let ids = IdentityAllocator::with_block_size(store.clone(), 64);
        (store, ids)
    }

    fn shape() -> OwnershipShape {
        OwnershipShape::new([predicates::HAS_AUTHORS, predicates::HAS_LIST_ELEMENT, predicates::DESCRIPTION])
            .keeping([classes::AUTHOR])
    }

    #[test]
    fn test_exclusive_parts_are_deleted() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("R", [], ACTOR).unwrap();
        let list = writer.create_resource("authors", [vocab::id(classes::LIST)], ACTOR).unwrap();
        let name = writer.create_literal("Ada", XSD_STRING, ACTOR).unwrap();
        writer.add_statement(&root, &vocab::id(predicates::HAS_AUTHORS), &list, ACTOR).unwrap();
        writer.add_statement(&list, &vocab::id(predicates::HAS_LIST_ELEMENT), &name, ACTOR).unwrap();

        let report = CascadeDeleter::new(writer).delete(&root, &shape(), ACTOR).unwrap();

        assert_eq!(report.things_deleted, vec![name.clone(), list.clone(), root.clone()]);
        assert_eq!(report.statements_deleted, 2);
        assert_eq!(store.num_statements(), 0);
        assert!(!store.exists(&list).unwrap());
    }

    #[test]
    fn test_shared_part_survives() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("R", [], ACTOR).unwrap();
        let other = writer.create_resource("R2", [], ACTOR).unwrap();
        let list = writer.create_resource("authors", [vocab::id(classes::LIST)], ACTOR).unwrap();
        let name = writer.create_literal("Ada", XSD_STRING, ACTOR).unwrap();
        let has_authors = vocab::id(predicates::HAS_AUTHORS);
        writer.add_statement(&root, &has_authors, &list, ACTOR).unwrap();
        writer.add_statement(&other, &has_authors, &list, ACTOR).unwrap();
        writer.add_statement(&list, &vocab::id(predicates::HAS_LIST_ELEMENT), &name, ACTOR).unwrap();

        let report = CascadeDeleter::new(writer).delete(&root, &shape(), ACTOR).unwrap();

        assert_eq!(report.things_deleted, vec![root.clone()]);
        assert_eq!(report.retained, vec![list.clone()]);
        assert!(store.exists(&list).unwrap());
        assert!(store.exists(&name).unwrap());
        assert_eq!(store.find_all_by_subject(&list).unwrap().len(), 1);
    }

    #[test]
    fn test_kept_classes_and_unowned_objects_survive() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("R", [], ACTOR).unwrap();
        let list = writer.create_resource("authors", [], ACTOR).unwrap();
        let author = writer.create_resource("Ada", [vocab::id(classes::AUTHOR)], ACTOR).unwrap();
        let field = writer.create_resource("Physics", [vocab::id(classes::RESEARCH_FIELD)], ACTOR).unwrap();
        writer.add_statement(&root, &vocab::id(predicates::HAS_AUTHORS), &list, ACTOR).unwrap();
        writer.add_statement(&list, &vocab::id(predicates::HAS_LIST_ELEMENT), &author, ACTOR).unwrap();
        writer.add_statement(&root, &vocab::id(predicates::HAS_RESEARCH_FIELD), &field, ACTOR).unwrap();

        CascadeDeleter::new(writer).delete(&root, &shape(), ACTOR).unwrap();

        assert!(!store.exists(&list).unwrap());
        assert!(store.exists(&author).unwrap());
        assert!(store.exists(&field).unwrap());
        assert_eq!(store.num_statements(), 0);
    }

    #[test]
    fn test_referenced_root_is_refused() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("R", [], ACTOR).unwrap();
        let other = writer.create_resource("R2", [], ACTOR).unwrap();
        writer.add_statement(&other, &vocab::id(predicates::HAS_LINK), &root, ACTOR).unwrap();

        let err = CascadeDeleter::new(writer).delete(&root, &shape(), ACTOR).unwrap_err();
        assert!(matches!(err, ContentError::InUse { .. }));
        assert!(store.exists(&root).unwrap());
    }

    #[test]
    fn test_unknown_root_is_not_found() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let err = CascadeDeleter::new(writer)
            .delete(&ThingId::new("R404"), &shape(), ACTOR)
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }
}
