//! Diff-based reconciliation of ordered entry lists.
//!
//! An ordered list in the graph is a container Thing with one edge per
//! entry node; each entry node links to its target and may carry an
//! optional attribute literal:
//!
//! ```text
//! container --container_predicate--> entry --link_predicate--> target
//!                                          \--attribute_predicate--> literal
//! ```
//!
//! Order is the creation order of the container edges. Reconciling a
//! desired list against the existing one keeps entry nodes wherever
//! possible and only touches what differs.
//!
//! ## Algorithm
//!
//! 1. Excess existing entries are removed first, chosen from the tail and
//!    preferring entries whose target is not wanted anymore
//! 2. Remaining existing and desired entries walk in lockstep: a differing
//!    target replaces only the link edge, the attribute follows the
//!    tri-state rule
//! 3. Leftover desired entries are appended as new entry nodes

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::actions::property::delete_orphan_literals;
use crate::error::ContentResult;
use crate::graph::GraphWriter;
use crate::types::{ContributorId, Statement, StatementId, ThingId, XSD_STRING};

/// Shape of an ordered entry list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLayout {
    /// Container → entry node.
    pub container_predicate: ThingId,
    /// Entry node → target.
    pub link_predicate: ThingId,
    /// Entry node → optional attribute literal.
    pub attribute_predicate: Option<ThingId>,
    /// Label of new entry nodes.
    pub entry_label: String,
    /// Classes of new entry nodes.
    pub entry_classes: Vec<ThingId>,
}

/// One existing entry, rebuilt from its edges.
#[derive(Debug, Clone)]
pub struct ExistingEntry {
    /// Entry node.
    pub node: ThingId,
    /// Container → node edge.
    pub container_edge: StatementId,
    /// Node → target edge.
    pub link_edge: Option<Statement>,
    /// Node → attribute literal edge.
    pub attribute_edge: Option<Statement>,
    /// Any other outgoing edges of the node.
    pub other_edges: Vec<StatementId>,
}

impl ExistingEntry {
    /// Rebuild the entries of `container` from statements grouped by subject.
    ///
    /// Groups must be in creation order (see [`crate::types::group_by_subject`]).
    pub fn collect(
        container: &ThingId,
        layout: &EntryLayout,
        by_subject: &BTreeMap<ThingId, Vec<Statement>>,
    ) -> Vec<ExistingEntry> {
        let empty = Vec::new();
        by_subject
            .get(container)
            .unwrap_or(&empty)
            .iter()
            .filter(|s| s.predicate_id() == &layout.container_predicate)
            .map(|edge| {
                let node = edge.object_id().clone();
                let outgoing = by_subject.get(&node).unwrap_or(&empty);
                Self::from_edges(node, edge.id.clone(), layout, outgoing)
            })
            .collect()
    }

    /// Rebuild the entries of `container` by reading the store.
    pub fn load(
        writer: &GraphWriter<'_>,
        container: &ThingId,
        layout: &EntryLayout,
    ) -> ContentResult<Vec<ExistingEntry>> {
        writer
            .outgoing_with(container, &layout.container_predicate)?
            .into_iter()
            .map(|edge| -> ContentResult<ExistingEntry> {
                let node = edge.object_id().clone();
                let outgoing = writer.outgoing(&node)?;
                Ok(Self::from_edges(node, edge.id, layout, &outgoing))
            })
            .collect()
    }

    fn from_edges(
        node: ThingId,
        container_edge: StatementId,
        layout: &EntryLayout,
        outgoing: &[Statement],
    ) -> Self {
        let mut entry = Self {
            node,
            container_edge,
            link_edge: None,
            attribute_edge: None,
            other_edges: Vec::new(),
        };
        for statement in outgoing {
            let predicate = statement.predicate_id();
            if predicate == &layout.link_predicate && entry.link_edge.is_none() {
                entry.link_edge = Some(statement.clone());
            } else if Some(predicate) == layout.attribute_predicate.as_ref()
                && entry.attribute_edge.is_none()
            {
                entry.attribute_edge = Some(statement.clone());
            } else {
                entry.other_edges.push(statement.id.clone());
            }
        }
        entry
    }

    /// Current link target.
    pub fn target(&self) -> Option<&ThingId> {
        self.link_edge.as_ref().map(Statement::object_id)
    }

    /// Current attribute value.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute_edge.as_ref().map(|s| s.object.label.as_str())
    }

    fn statement_ids(&self) -> Vec<StatementId> {
        let mut ids = vec![self.container_edge.clone()];
        ids.extend(self.link_edge.iter().map(|s| s.id.clone()));
        ids.extend(self.attribute_edge.iter().map(|s| s.id.clone()));
        ids.extend(self.other_edges.iter().cloned());
        ids
    }
}

/// One desired entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    /// Target to link.
    pub link: ThingId,
    /// Optional attribute value.
    pub attribute: Option<String>,
}

impl DesiredEntry {
    /// Desired entry without attribute.
    pub fn link(link: ThingId) -> Self {
        Self { link, attribute: None }
    }

    /// Desired entry with attribute.
    pub fn with_attribute(link: ThingId, attribute: impl Into<String>) -> Self {
        Self {
            link,
            attribute: Some(attribute.into()),
        }
    }
}

/// Counts of what a reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Entry nodes and literals created.
    pub nodes_created: usize,
    /// Entry nodes and literals deleted.
    pub nodes_deleted: usize,
    /// Statements created.
    pub statements_created: usize,
    /// Statements deleted.
    pub statements_deleted: usize,
    /// Link edges replaced on kept entries.
    pub links_updated: usize,
    /// Attributes created, changed or removed on kept entries.
    pub attributes_updated: usize,
}

impl ReconcileReport {
    /// Whether nothing changed.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    /// Add the counts of another report.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.nodes_created += other.nodes_created;
        self.nodes_deleted += other.nodes_deleted;
        self.statements_created += other.statements_created;
        self.statements_deleted += other.statements_deleted;
        self.links_updated += other.links_updated;
        self.attributes_updated += other.attributes_updated;
    }
}

/// Reconciles ordered entry lists.
pub struct ListReconciler<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> ListReconciler<'a> {
    /// Create a reconciler writing through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Reconcile the entries of `container` read from the store.
    pub fn reconcile_stored(
        &self,
        container: &ThingId,
        layout: &EntryLayout,
        desired: &[DesiredEntry],
        actor: ContributorId,
    ) -> ContentResult<ReconcileReport> {
        let existing = ExistingEntry::load(&self.writer, container, layout)?;
        self.reconcile(container, layout, existing, desired, actor)
    }

    /// Make the entries of `container` match `desired`.
    pub fn reconcile(
        &self,
        container: &ThingId,
        layout: &EntryLayout,
        existing: Vec<ExistingEntry>,
        desired: &[DesiredEntry],
        actor: ContributorId,
    ) -> ContentResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let excess = excess_positions(&existing, desired);
        let mut kept = Vec::with_capacity(existing.len() - excess.len());
        for (position, entry) in existing.into_iter().enumerate() {
            if excess.contains(&position) {
                self.remove_entry(&entry, &mut report)?;
            } else {
                kept.push(entry);
            }
        }

        for (entry, wanted) in kept.iter().zip(desired) {
            self.update_entry(entry, wanted, layout, actor, &mut report)?;
        }

        for wanted in &desired[kept.len()..] {
            self.append_entry(container, wanted, layout, actor, &mut report)?;
        }

        debug!(%container, ?report, "Reconciled entry list");
        Ok(report)
    }

    fn remove_entry(&self, entry: &ExistingEntry, report: &mut ReconcileReport) -> ContentResult<()> {
        let ids = entry.statement_ids();
        self.writer.delete_statements(&ids)?;
        report.statements_deleted += ids.len();

        if let Some(attribute) = &entry.attribute_edge {
            report.nodes_deleted += delete_orphan_literals(&self.writer, std::slice::from_ref(attribute))?;
        }
        self.writer.delete_thing(&entry.node)?;
        report.nodes_deleted += 1;
        Ok(())
    }

    fn update_entry(
        &self,
        entry: &ExistingEntry,
        wanted: &DesiredEntry,
        layout: &EntryLayout,
        actor: ContributorId,
        report: &mut ReconcileReport,
    ) -> ContentResult<()> {
        if entry.target() != Some(&wanted.link) {
            if let Some(link) = &entry.link_edge {
                self.writer.delete_statements(std::slice::from_ref(&link.id))?;
                report.statements_deleted += 1;
            }
            self.writer
                .add_statement(&entry.node, &layout.link_predicate, &wanted.link, actor)?;
            report.statements_created += 1;
            report.links_updated += 1;
        }

        let Some(predicate) = &layout.attribute_predicate else {
            return Ok(());
        };
        match (&entry.attribute_edge, &wanted.attribute) {
            (Some(current), Some(value)) if current.object.label != *value => {
                if current.object.modifiable {
                    self.writer.update_label(current.object_id(), value)?;
                } else {
                    self.writer.delete_statements(std::slice::from_ref(&current.id))?;
                    let literal = self.writer.create_literal(value, XSD_STRING, actor)?;
                    self.writer.add_statement(&entry.node, predicate, &literal, actor)?;
                    report.statements_deleted += 1;
                    report.statements_created += 1;
                    report.nodes_created += 1;
                }
                report.attributes_updated += 1;
            }
            (None, Some(value)) => {
                let literal = self.writer.create_literal(value, XSD_STRING, actor)?;
                self.writer.add_statement(&entry.node, predicate, &literal, actor)?;
                report.nodes_created += 1;
                report.statements_created += 1;
                report.attributes_updated += 1;
            }
            (Some(current), None) => {
                self.writer.delete_statements(std::slice::from_ref(&current.id))?;
                report.nodes_deleted += delete_orphan_literals(&self.writer, std::slice::from_ref(current))?;
                report.statements_deleted += 1;
                report.attributes_updated += 1;
            }
            _ => {}
        }
        Ok(())
    }

    fn append_entry(
        &self,
        container: &ThingId,
        wanted: &DesiredEntry,
        layout: &EntryLayout,
        actor: ContributorId,
        report: &mut ReconcileReport,
    ) -> ContentResult<()> {
        let node = self
            .writer
            .create_resource(&layout.entry_label, layout.entry_classes.iter().cloned(), actor)?;
        self.writer
            .add_statement(container, &layout.container_predicate, &node, actor)?;
        self.writer.add_statement(&node, &layout.link_predicate, &wanted.link, actor)?;
        report.nodes_created += 1;
        report.statements_created += 2;

        if let (Some(predicate), Some(value)) = (&layout.attribute_predicate, &wanted.attribute) {
            let literal = self.writer.create_literal(value, XSD_STRING, actor)?;
            self.writer.add_statement(&node, predicate, &literal, actor)?;
            report.nodes_created += 1;
            report.statements_created += 1;
        }
        Ok(())
    }
}

/// Positions of existing entries to remove so that at most
/// `desired.len()` remain.
///
/// Walks from the tail, first taking entries whose target is not desired,
/// then any trailing entries.
fn excess_positions(existing: &[ExistingEntry], desired: &[DesiredEntry]) -> BTreeSet<usize> {
    let excess = existing.len().saturating_sub(desired.len());
    let wanted: BTreeSet<&ThingId> = desired.iter().map(|d| &d.link).collect();

    let mut positions: BTreeSet<usize> = (0..existing.len())
        .rev()
        .filter(|&i| existing[i].target().map_or(true, |t| !wanted.contains(t)))
        .take(excess)
        .collect();
    for i in (0..existing.len()).rev() {
        if positions.len() >= excess {
            break;
        }
        positions.insert(i);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdentityAllocator;
    use crate::store::{InMemoryGraph, ThingStore};
    use crate::types::vocab::{self, classes, predicates};
    use proptest::prelude::*;
    use std::sync::Arc;

    const ACTOR: ContributorId = ContributorId::SYSTEM;

    struct Fixture {
        store: Arc<InMemoryGraph>,
        ids: IdentityAllocator,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryGraph::with_vocabulary());
            let ids = IdentityAllocator::with_block_size(store.clone(), 64);
            Self { store, ids }
        }

        fn writer(&self) -> GraphWriter<'_> {
            GraphWriter::new(self.store.as_ref(), &self.ids)
        }

        fn targets(&self, labels: &[&str]) -> Vec<ThingId> {
            labels
                .iter()
                .map(|l| self.writer().create_resource(l, [], ACTOR).unwrap())
                .collect()
        }

        fn entries(&self, container: &ThingId) -> Vec<ExistingEntry> {
            ExistingEntry::load(&self.writer(), container, &layout()).unwrap()
        }
    }

    fn layout() -> EntryLayout {
        EntryLayout {
            container_predicate: vocab::id(predicates::HAS_ENTRY),
            link_predicate: vocab::id(predicates::HAS_LINK),
            attribute_predicate: Some(vocab::id(predicates::DESCRIPTION)),
            entry_label: "Entry".to_string(),
            entry_classes: vec![vocab::id(classes::ENTRY)],
        }
    }

    fn desired(targets: &[&ThingId]) -> Vec<DesiredEntry> {
        targets.iter().map(|t| DesiredEntry::link((*t).clone())).collect()
    }

    #[test]
    fn test_pure_creation() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "B"]);

        let report = ListReconciler::new(f.writer())
            .reconcile_stored(&container, &layout(), &desired(&[&t[0], &t[1]]), ACTOR)
            .unwrap();

        assert_eq!(report.nodes_created, 2);
        assert_eq!(report.statements_created, 4);
        let entries = f.entries(&container);
        assert_eq!(entries.iter().map(|e| e.target().cloned()).collect::<Vec<_>>(), vec![Some(t[0].clone()), Some(t[1].clone())]);
    }

    #[test]
    fn test_excess_removed_and_link_replaced() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "B", "C", "X"]);
        let reconciler = ListReconciler::new(f.writer());
        reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[0], &t[1], &t[2]]), ACTOR)
            .unwrap();
        let before = f.entries(&container);

        let report = reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[0], &t[3]]), ACTOR)
            .unwrap();

        let after = f.entries(&container);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].node, before[0].node);
        assert_eq!(after[0].link_edge.as_ref().unwrap().id, before[0].link_edge.as_ref().unwrap().id);
        assert_eq!(after[1].node, before[1].node);
        assert_eq!(after[1].target(), Some(&t[3]));
        assert_eq!(report.links_updated, 1);
        assert_eq!(report.nodes_deleted, 1);
        assert_eq!(report.nodes_created, 0);
        assert!(!f.store.exists(&before[2].node).unwrap());
    }

    #[test]
    fn test_unwanted_head_is_dropped_first() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "B"]);
        let reconciler = ListReconciler::new(f.writer());
        reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[0], &t[1]]), ACTOR)
            .unwrap();
        let before = f.entries(&container);

        let report = reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[1]]), ACTOR)
            .unwrap();

        let after = f.entries(&container);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].node, before[1].node);
        assert_eq!(report.links_updated, 0);
    }

    #[test]
    fn test_all_links_changed_keeps_nodes() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "B", "X", "Y"]);
        let reconciler = ListReconciler::new(f.writer());
        reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[0], &t[1]]), ACTOR)
            .unwrap();

        let report = reconciler
            .reconcile_stored(&container, &layout(), &desired(&[&t[2], &t[3]]), ACTOR)
            .unwrap();

        assert_eq!(report.links_updated, 2);
        assert_eq!(report.nodes_created, 0);
        assert_eq!(report.nodes_deleted, 0);
    }

    #[test]
    fn test_empty_desired_removes_everything() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A"]);
        let reconciler = ListReconciler::new(f.writer());
        reconciler
            .reconcile_stored(
                &container,
                &layout(),
                &[DesiredEntry::with_attribute(t[0].clone(), "note")],
                ACTOR,
            )
            .unwrap();
        let things = f.store.num_things();

        let report = reconciler.reconcile_stored(&container, &layout(), &[], ACTOR).unwrap();

        assert!(f.entries(&container).is_empty());
        assert_eq!(report.nodes_deleted, 2);
        assert_eq!(f.store.num_things(), things - 2);
    }

    #[test]
    fn test_shared_attribute_literal_is_not_counted_as_deleted() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "other"]);
        let reconciler = ListReconciler::new(f.writer());
        reconciler
            .reconcile_stored(
                &container,
                &layout(),
                &[DesiredEntry::with_attribute(t[0].clone(), "note")],
                ACTOR,
            )
            .unwrap();
        let literal = f.entries(&container)[0]
            .attribute_edge
            .as_ref()
            .unwrap()
            .object_id()
            .clone();
        f.writer()
            .add_statement(&t[1], &vocab::id(predicates::DESCRIPTION), &literal, ACTOR)
            .unwrap();

        let report = reconciler.reconcile_stored(&container, &layout(), &[], ACTOR).unwrap();

        assert_eq!(report.nodes_deleted, 1);
        assert!(f.store.exists(&literal).unwrap());
    }

    #[test]
    fn test_attribute_tri_state() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A"]);
        let reconciler = ListReconciler::new(f.writer());
        let run = |attribute: Option<&str>| {
            let wanted = DesiredEntry { link: t[0].clone(), attribute: attribute.map(String::from) };
            reconciler.reconcile_stored(&container, &layout(), &[wanted], ACTOR).unwrap()
        };

        run(None);
        assert_eq!(run(Some("first")).attributes_updated, 1);
        assert_eq!(f.entries(&container)[0].attribute(), Some("first"));
        assert_eq!(run(Some("second")).attributes_updated, 1);
        assert_eq!(f.entries(&container)[0].attribute(), Some("second"));
        assert!(run(Some("second")).is_noop());
        assert_eq!(run(None).attributes_updated, 1);
        assert_eq!(f.entries(&container)[0].attribute(), None);
    }

    #[test]
    fn test_collect_matches_load() {
        let f = Fixture::new();
        let container = f.writer().create_resource("section", [], ACTOR).unwrap();
        let t = f.targets(&["A", "B"]);
        ListReconciler::new(f.writer())
            .reconcile_stored(&container, &layout(), &desired(&[&t[1], &t[0]]), ACTOR)
            .unwrap();

        let bundle = crate::extractor::traverse(
            f.store.as_ref(),
            &container,
            &crate::policy::BundleConfiguration::default(),
        )
        .unwrap();
        let collected = ExistingEntry::collect(&container, &layout(), &bundle.by_subject());
        let loaded = f.entries(&container);

        let targets = |entries: &[ExistingEntry]| entries.iter().map(|e| e.target().cloned()).collect::<Vec<_>>();
        assert_eq!(targets(&collected), targets(&loaded));
    }

    proptest! {
        #[test]
        fn prop_second_reconcile_is_noop(
            first in proptest::collection::vec((0usize..5, proptest::option::of("[a-c]{1,3}")), 0..8),
            second in proptest::collection::vec((0usize..5, proptest::option::of("[a-c]{1,3}")), 0..8),
        ) {
            let f = Fixture::new();
            let container = f.writer().create_resource("section", [], ACTOR).unwrap();
            let pool = f.targets(&["A", "B", "C", "D", "E"]);
            let to_desired = |spec: &[(usize, Option<String>)]| spec
                .iter()
                .map(|(i, a)| DesiredEntry { link: pool[*i].clone(), attribute: a.clone() })
                .collect::<Vec<_>>();
            let reconciler = ListReconciler::new(f.writer());

            reconciler.reconcile_stored(&container, &layout(), &to_desired(&first), ACTOR).unwrap();
            let wanted = to_desired(&second);
            reconciler.reconcile_stored(&container, &layout(), &wanted, ACTOR).unwrap();

            let entries = f.entries(&container);
            let targets: Vec<ThingId> = entries.iter().filter_map(|e| e.target().cloned()).collect();
            let expected: Vec<ThingId> = wanted.iter().map(|d| d.link.clone()).collect();
            prop_assert_eq!(targets, expected);

            let mutations = f.store.mutation_count();
            let again = reconciler.reconcile_stored(&container, &layout(), &wanted, ACTOR).unwrap();
            prop_assert!(again.is_noop());
            prop_assert_eq!(f.store.mutation_count(), mutations);
        }
    }
}
