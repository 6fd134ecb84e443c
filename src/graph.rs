//! Checked graph writes.
//!
//! [`GraphWriter`] pairs a store with an ID allocator. It allocates IDs,
//! checks statement endpoints before calling the store, and maps store
//! failures into [`ContentError`].

use tracing::trace;

use crate::error::{ContentError, ContentResult};
use crate::ids::IdentityAllocator;
use crate::store::{GraphStore, StoreError};
use crate::types::{ContributorId, IdKind, Statement, StatementId, Thing, ThingId};

/// Writes Things and Statements through a store.
#[derive(Clone, Copy)]
pub struct GraphWriter<'a> {
    store: &'a dyn GraphStore,
    ids: &'a IdentityAllocator,
    modifiable: bool,
}

impl<'a> GraphWriter<'a> {
    /// Create a writer whose Things are modifiable.
    pub fn new(store: &'a dyn GraphStore, ids: &'a IdentityAllocator) -> Self {
        Self {
            store,
            ids,
            modifiable: true,
        }
    }

    /// A writer creating Things flagged as not modifiable.
    pub fn frozen(self) -> Self {
        Self {
            modifiable: false,
            ..self
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &'a dyn GraphStore {
        self.store
    }

    /// Underlying allocator.
    pub fn ids(&self) -> &'a IdentityAllocator {
        self.ids
    }

    /// Create a resource with a fresh ID.
    pub fn create_resource(
        &self,
        label: &str,
        classes: impl IntoIterator<Item = ThingId>,
        actor: ContributorId,
    ) -> ContentResult<ThingId> {
        let id = self.ids.next_unused_thing_id(IdKind::Resource, self.store)?;
        let thing = Thing::resource(id, label, classes, actor).with_modifiable(self.modifiable);
        Ok(self.store.create(thing)?)
    }

    /// Create a literal with a fresh ID.
    pub fn create_literal(&self, value: &str, datatype: &str, actor: ContributorId) -> ContentResult<ThingId> {
        let id = self.ids.next_unused_thing_id(IdKind::Literal, self.store)?;
        let thing = Thing::literal(id, value, datatype, actor).with_modifiable(self.modifiable);
        Ok(self.store.create(thing)?)
    }

    /// Create a statement after checking that all endpoints exist.
    pub fn add_statement(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ThingId,
        actor: ContributorId,
    ) -> ContentResult<StatementId> {
        for endpoint in [subject, predicate, object] {
            if !self.store.exists(endpoint)? {
                return Err(ContentError::not_found("Thing", endpoint));
            }
        }
        let id = self.ids.next_statement_id()?;
        trace!(statement = %id, %subject, %predicate, %object, "Creating statement");
        Ok(self.store.create_statement(id, subject, predicate, object, actor)?)
    }

    /// Delete statements by ID.
    pub fn delete_statements(&self, ids: &[StatementId]) -> ContentResult<()> {
        Ok(self.store.delete_all_by_id(ids)?)
    }

    /// Delete a Thing, mapping store refusals to content errors.
    pub fn delete_thing(&self, id: &ThingId) -> ContentResult<()> {
        self.store.delete(id).map_err(|e| match e {
            StoreError::ThingInUse(id) => ContentError::InUse { kind: "Thing", id },
            StoreError::NotModifiable(id) => ContentError::NotModifiable {
                kind: "Thing",
                id,
                reason: "flagged as not modifiable",
            },
            other => other.into(),
        })
    }

    /// Replace the label of a Thing.
    pub fn update_label(&self, id: &ThingId, label: &str) -> ContentResult<()> {
        let mut thing = self.require("Thing", id)?;
        if thing.label == label {
            return Ok(());
        }
        thing.label = label.to_string();
        Ok(self.store.update(thing)?)
    }

    /// Fetch a Thing.
    pub fn find(&self, id: &ThingId) -> ContentResult<Option<Thing>> {
        Ok(self.store.find_by_id(id)?)
    }

    /// Fetch a Thing or fail with `NotFound`.
    pub fn require(&self, kind: &'static str, id: &ThingId) -> ContentResult<Thing> {
        self.find(id)?.ok_or_else(|| ContentError::not_found(kind, id))
    }

    /// Outgoing statements of a subject, in creation order.
    pub fn outgoing(&self, subject: &ThingId) -> ContentResult<Vec<Statement>> {
        Ok(self.store.find_all_by_subject(subject)?)
    }

    /// Outgoing statements of a subject with one predicate, in creation order.
    pub fn outgoing_with(&self, subject: &ThingId, predicate: &ThingId) -> ContentResult<Vec<Statement>> {
        let mut statements = self.outgoing(subject)?;
        statements.retain(|s| s.predicate_id() == predicate);
        Ok(statements)
    }
}

impl std::fmt::Debug for GraphWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphWriter")
            .field("ids", self.ids)
            .field("modifiable", &self.modifiable)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryGraph, StatementStore, ThingStore};
    use crate::types::vocab::{self, predicates};
    use crate::types::XSD_STRING;
    use std::sync::Arc;

    fn fixture() -> (Arc<InMemoryGraph>, IdentityAllocator) {
        let store = Arc::new(InMemoryGraph::with_vocabulary());
        let ids = IdentityAllocator::with_block_size(store.clone(), 10);
        (store, ids)
    }

    #[test]
    fn test_add_statement_checks_endpoints() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("root", [], ContributorId::SYSTEM).unwrap();

        let err = writer
            .add_statement(&root, &vocab::id(predicates::HAS_LINK), &ThingId::new("R999"), ContributorId::SYSTEM)
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
        assert_eq!(store.num_statements(), 0);
    }

    #[test]
    fn test_create_and_link() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let root = writer.create_resource("root", [], ContributorId::SYSTEM).unwrap();
        let text = writer.create_literal("hello", XSD_STRING, ContributorId::SYSTEM).unwrap();
        writer
            .add_statement(&root, &vocab::id(predicates::DESCRIPTION), &text, ContributorId::SYSTEM)
            .unwrap();

        let outgoing = store.find_all_by_subject(&root).unwrap();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].object.label, "hello");
    }

    #[test]
    fn test_frozen_writer_creates_unmodifiable_things() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids).frozen();
        let root = writer.create_resource("published", [], ContributorId::SYSTEM).unwrap();

        assert!(!store.find_by_id(&root).unwrap().unwrap().modifiable);
        let err = writer.delete_thing(&root).unwrap_err();
        assert!(matches!(err, ContentError::NotModifiable { .. }));
    }

    #[test]
    fn test_delete_referenced_thing_is_in_use() {
        let (store, ids) = fixture();
        let writer = GraphWriter::new(store.as_ref(), &ids);
        let a = writer.create_resource("a", [], ContributorId::SYSTEM).unwrap();
        let b = writer.create_resource("b", [], ContributorId::SYSTEM).unwrap();
        writer.add_statement(&a, &vocab::id(predicates::HAS_LINK), &b, ContributorId::SYSTEM).unwrap();

        assert!(matches!(writer.delete_thing(&b), Err(ContentError::InUse { .. })));
    }
}
