//! Golden tests for the content kernel.
//!
//! These tests pin the observable behavior of allocation, reconciliation,
//! cascade deletion, bundle extraction and publishing end to end.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use scholarly_graph_kernel::content::literature_list::literature_list_shape;
use scholarly_graph_kernel::types::vocab::{self, classes, predicates};
use scholarly_graph_kernel::{
    Author, BundleConfiguration, CascadeDeleter, ContentError, ContributorId,
    CreateLiteratureListCommand, DeleteLiteratureListCommand, DesiredEntry, DoiOutcome,
    EntryLayout, ExistingEntry, GraphWriter, IdKind, IdentityAllocator, InMemoryGraph,
    KernelConfig, ListEntryDefinition, ListReconciler, LiteratureListSection,
    LiteratureListService, PrefixDoiRegistrar, PublishLiteratureListCommand, SectionDefinition,
    StatementId, StatementStore, SubgraphExtractor, Thing, ThingId, ThingStore,
    UpdateLiteratureListCommand,
};

const ACTOR: ContributorId = ContributorId::SYSTEM;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn seeded_store() -> Arc<InMemoryGraph> {
    let store = InMemoryGraph::with_vocabulary();
    store.insert_thing(Thing::resource(
        ThingId::new("RF1"),
        "Physics",
        [vocab::id(classes::RESEARCH_FIELD)],
        ACTOR,
    ));
    store.insert_thing(Thing::resource(
        ThingId::new("AUTH1"),
        "Ada Lovelace",
        [vocab::id(classes::AUTHOR)],
        ACTOR,
    ));
    for (id, label) in [("P1", "First paper"), ("P2", "Second paper"), ("P3", "Third paper")] {
        store.insert_thing(Thing::resource(ThingId::new(id), label, [], ACTOR));
    }
    Arc::new(store)
}

fn create_command(title: &str) -> CreateLiteratureListCommand {
    CreateLiteratureListCommand {
        contributor_id: ACTOR,
        title: title.to_string(),
        research_fields: vec![ThingId::new("RF1")],
        authors: vec![
            Author::named("Ada Lovelace").with_id(ThingId::new("AUTH1")),
            Author::named("Grace Hopper"),
        ],
        sections: vec![
            SectionDefinition::text("Introduction", 2, "Papers on analytical engines."),
            SectionDefinition::list([
                ListEntryDefinition::described(ThingId::new("P1"), "Start here"),
                ListEntryDefinition::new(ThingId::new("P2")),
            ]),
        ],
    }
}

fn publish(id: &ThingId, changelog: &str) -> PublishLiteratureListCommand {
    PublishLiteratureListCommand {
        id: id.clone(),
        contributor_id: ACTOR,
        changelog: Some(changelog.to_string()),
        assign_doi: false,
    }
}

fn entry_layout() -> EntryLayout {
    EntryLayout {
        container_predicate: vocab::id(predicates::HAS_ENTRY),
        link_predicate: vocab::id(predicates::HAS_LINK),
        attribute_predicate: Some(vocab::id(predicates::DESCRIPTION)),
        entry_label: "Entry".to_string(),
        entry_classes: vec![vocab::id(classes::ENTRY)],
    }
}

fn links(targets: &[&str]) -> Vec<DesiredEntry> {
    targets.iter().map(|t| DesiredEntry::link(ThingId::new(*t))).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Identifier Allocation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_block_refill_after_1000_ids() {
    let store = Arc::new(InMemoryGraph::new());
    let ids = IdentityAllocator::new(store.clone());

    for expected in 0..1000 {
        assert_eq!(ids.next_identity(IdKind::Resource).unwrap(), expected);
    }
    assert_eq!(store.increment_calls(), 1);

    assert_eq!(ids.next_identity(IdKind::Resource).unwrap(), 1000);
    assert_eq!(store.increment_calls(), 2);
}

#[test]
fn test_concurrent_allocation_is_unique() {
    let store = Arc::new(InMemoryGraph::new());
    let ids = Arc::new(IdentityAllocator::with_block_size(store, 16));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ids = ids.clone();
            thread::spawn(move || {
                (0..500)
                    .map(|_| ids.next_statement_id().unwrap())
                    .collect::<Vec<StatementId>>()
            })
        })
        .collect();

    let mut all = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(all.insert(id), "duplicate statement ID");
        }
    }
    assert_eq!(all.len(), 8 * 500);
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reconcile_drops_tail_and_relinks_in_place() {
    let store = seeded_store();
    let ids = IdentityAllocator::with_block_size(store.clone(), 64);
    let writer = GraphWriter::new(store.as_ref(), &ids);
    let container = writer.create_resource("section", [], ACTOR).unwrap();
    let reconciler = ListReconciler::new(writer);
    let layout = entry_layout();

    reconciler
        .reconcile_stored(&container, &layout, &links(&["P1", "P2", "P3"]), ACTOR)
        .unwrap();
    let before = ExistingEntry::load(&writer, &container, &layout).unwrap();

    let report = reconciler
        .reconcile_stored(&container, &layout, &links(&["P1", "RF1"]), ACTOR)
        .unwrap();
    let after = ExistingEntry::load(&writer, &container, &layout).unwrap();

    assert_eq!(report.nodes_deleted, 1);
    assert_eq!(report.links_updated, 1);
    assert_eq!(report.nodes_created, 0);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].node, before[0].node);
    assert_eq!(after[0].target(), Some(&ThingId::new("P1")));
    assert_eq!(after[1].node, before[1].node);
    assert_eq!(after[1].target(), Some(&ThingId::new("RF1")));
    assert!(!store.exists(&before[2].node).unwrap());
}

#[test]
fn test_single_target_change_has_no_node_churn() {
    let store = seeded_store();
    let ids = IdentityAllocator::with_block_size(store.clone(), 64);
    let writer = GraphWriter::new(store.as_ref(), &ids);
    let container = writer.create_resource("section", [], ACTOR).unwrap();
    let reconciler = ListReconciler::new(writer);
    let layout = entry_layout();
    reconciler
        .reconcile_stored(&container, &layout, &links(&["P1", "P2", "P3"]), ACTOR)
        .unwrap();

    let report = reconciler
        .reconcile_stored(&container, &layout, &links(&["P1", "AUTH1", "P3"]), ACTOR)
        .unwrap();

    assert_eq!(report.links_updated, 1);
    assert_eq!(report.nodes_created, 0);
    assert_eq!(report.nodes_deleted, 0);

    let second = reconciler
        .reconcile_stored(&container, &layout, &links(&["P1", "AUTH1", "P3"]), ACTOR)
        .unwrap();
    assert!(second.is_noop());
}

// ─────────────────────────────────────────────────────────────────────────────
// Cascade Deletion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_exclusive_author_list_is_deleted_shared_one_survives() {
    let store = seeded_store();
    let ids = IdentityAllocator::with_block_size(store.clone(), 64);
    let writer = GraphWriter::new(store.as_ref(), &ids);
    let has_authors = vocab::id(predicates::HAS_AUTHORS);

    let owner = writer.create_resource("R", [], ACTOR).unwrap();
    let list = writer.create_resource("authors list", [vocab::id(classes::LIST)], ACTOR).unwrap();
    writer.add_statement(&owner, &has_authors, &list, ACTOR).unwrap();
    CascadeDeleter::new(writer).delete(&owner, &literature_list_shape(), ACTOR).unwrap();
    assert!(!store.exists(&list).unwrap());

    let owner = writer.create_resource("R", [], ACTOR).unwrap();
    let other = writer.create_resource("R2", [], ACTOR).unwrap();
    let list = writer.create_resource("authors list", [vocab::id(classes::LIST)], ACTOR).unwrap();
    writer.add_statement(&owner, &has_authors, &list, ACTOR).unwrap();
    writer.add_statement(&other, &has_authors, &list, ACTOR).unwrap();
    let report = CascadeDeleter::new(writer).delete(&owner, &literature_list_shape(), ACTOR).unwrap();

    assert!(store.exists(&list).unwrap());
    assert_eq!(report.retained, vec![list]);
}

#[test]
fn test_deleting_one_list_leaves_the_other_intact() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store.clone(), KernelConfig::default()).unwrap();
    let first = service.create(&create_command("First")).unwrap();
    let second = service.create(&create_command("Second")).unwrap();
    let expected = service.find_by_id(&second).unwrap();

    service
        .delete(&DeleteLiteratureListCommand {
            id: first.clone(),
            contributor_id: ACTOR,
        })
        .unwrap();

    assert!(matches!(service.find_by_id(&first), Err(ContentError::NotFound { .. })));
    assert_eq!(service.find_by_id(&second).unwrap(), expected);
    for shared in ["RF1", "AUTH1", "P1", "P2"] {
        assert!(store.exists(&ThingId::new(shared)).unwrap());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bundle Extraction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_blacklisted_hub_is_referenced_not_expanded() {
    let store = seeded_store();
    let ids = IdentityAllocator::with_block_size(store.clone(), 64);
    let writer = GraphWriter::new(store.as_ref(), &ids);
    let link = vocab::id(predicates::HAS_LINK);
    let a = writer.create_resource("A", [], ACTOR).unwrap();
    let b = writer.create_resource("B", [], ACTOR).unwrap();
    let c = writer.create_resource("C", [], ACTOR).unwrap();
    let field = ThingId::new("RF1");
    writer.add_statement(&a, &link, &b, ACTOR).unwrap();
    writer.add_statement(&b, &link, &field, ACTOR).unwrap();
    writer.add_statement(&field, &link, &c, ACTOR).unwrap();

    let config = BundleConfiguration::new(None, vec![vocab::id(classes::RESEARCH_FIELD)]);
    let bundle = SubgraphExtractor::new(store.as_ref()).extract(&a, &config).unwrap();

    assert!(bundle.has_edge(&a, &b));
    assert!(bundle.has_edge(&b, &field));
    assert!(!bundle.has_edge(&field, &c));
    assert_eq!(bundle.len(), 2);

    let again = store.fetch_bundle(&a, &config).unwrap();
    assert_eq!(bundle.fingerprint(), again.fingerprint());
}

// ─────────────────────────────────────────────────────────────────────────────
// Literature Lists
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unchanged_update_performs_no_mutation() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store.clone(), KernelConfig::default()).unwrap();
    let command = create_command("Reading list");
    let id = service.create(&command).unwrap();

    let update = UpdateLiteratureListCommand {
        literature_list_id: id.clone(),
        contributor_id: ACTOR,
        title: Some(command.title.clone()),
        research_fields: Some(command.research_fields.clone()),
        authors: Some(command.authors.clone()),
        sections: Some(command.sections.clone()),
    };
    let before = store.mutation_count();
    service.update(&update).unwrap();
    service.update(&update).unwrap();

    assert_eq!(store.mutation_count(), before);
}

#[test]
fn test_update_reorders_and_rewrites_sections() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store, KernelConfig::default()).unwrap();
    let id = service.create(&create_command("Reading list")).unwrap();
    let original = service.find_by_id(&id).unwrap();

    let mut update = UpdateLiteratureListCommand::new(id.clone(), ACTOR);
    update.authors = Some(vec![Author::named("Grace Hopper")]);
    update.sections = Some(vec![
        SectionDefinition::text("Introduction", 3, "Rewritten."),
        SectionDefinition::list([
            ListEntryDefinition::new(ThingId::new("P3")),
            ListEntryDefinition::described(ThingId::new("P1"), "Classic"),
        ]),
    ]);
    service.update(&update).unwrap();

    let list = service.find_by_id(&id).unwrap();
    assert_eq!(list.authors, vec![Author::named("Grace Hopper")]);
    assert_eq!(list.sections[0].id(), original.sections[0].id());
    match &list.sections[0] {
        LiteratureListSection::Text { heading_size, text, .. } => {
            assert_eq!(*heading_size, 3);
            assert_eq!(text, "Rewritten.");
        }
        other => panic!("expected text section, got {other:?}"),
    }
    match &list.sections[1] {
        LiteratureListSection::List { entries, .. } => {
            let targets: Vec<_> = entries.iter().map(|e| e.value.id.as_str()).collect();
            assert_eq!(targets, vec!["P3", "P1"]);
            assert_eq!(entries[1].description.as_deref(), Some("Classic"));
        }
        other => panic!("expected list section, got {other:?}"),
    }
}

#[test]
fn test_archived_bundle_survives_draft_edits() {
    let store = seeded_store();
    // A linked paper with a citation of its own.
    store
        .create_statement(
            StatementId::new("S-cites"),
            &ThingId::new("P1"),
            &vocab::id(predicates::HAS_LINK),
            &ThingId::new("P3"),
            ACTOR,
        )
        .unwrap();
    let service = LiteratureListService::in_memory(store, KernelConfig::default()).unwrap();
    let id = service.create(&create_command("Reading list")).unwrap();
    let outcome = service.publish(&publish(&id, "Initial version")).unwrap();
    let archived = service.find_published_content(&outcome.version_id).unwrap();
    assert!(archived
        .statements
        .iter()
        .any(|s| s.id.as_str() == "S-cites"));
    assert!(archived
        .to_bundle()
        .has_edge(&ThingId::new("P1"), &ThingId::new("P3")));
    let snapshot = service.find_by_id(&outcome.version_id).unwrap();

    let mut update = UpdateLiteratureListCommand::new(id.clone(), ACTOR);
    update.title = Some("Renamed".to_string());
    update.sections = Some(vec![SectionDefinition::text("Only", 1, "Everything else is gone.")]);
    update.authors = Some(Vec::new());
    service.update(&update).unwrap();

    let reread = service.find_published_content(&outcome.version_id).unwrap();
    assert_eq!(reread.digest, archived.digest);
    assert_eq!(reread.statements, archived.statements);
    assert!(reread.verify());

    let version = service.find_by_id(&outcome.version_id).unwrap();
    assert_eq!(version.title, "Reading list");
    assert_eq!(version.sections, snapshot.sections);
    assert_eq!(version.authors, snapshot.authors);
    assert_eq!(service.find_by_id(&id).unwrap().title, "Renamed");
}

#[test]
fn test_second_publish_chains_versions() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store.clone(), KernelConfig::default()).unwrap();
    let id = service.create(&create_command("Reading list")).unwrap();
    let v1 = service.publish(&publish(&id, "First")).unwrap().version_id;

    // Stale edge left on the draft by an earlier tool.
    store
        .create_statement(
            StatementId::new("S-stale"),
            &id,
            &vocab::id(predicates::HAS_PREVIOUS_VERSION),
            &v1,
            ACTOR,
        )
        .unwrap();

    let second = service.publish(&publish(&id, "Second")).unwrap();
    assert_eq!(second.previous_version, Some(v1.clone()));

    let previous: Vec<_> = store
        .find_all_by_subject(&second.version_id)
        .unwrap()
        .into_iter()
        .filter(|s| s.predicate_id().as_str() == predicates::HAS_PREVIOUS_VERSION)
        .map(|s| s.object.id)
        .collect();
    assert_eq!(previous, vec![v1.clone()]);

    let draft_edges = store
        .find_all_by_subject(&id)
        .unwrap()
        .into_iter()
        .filter(|s| s.predicate_id().as_str() == predicates::HAS_PREVIOUS_VERSION)
        .count();
    assert_eq!(draft_edges, 0);

    let versions = service.versions(&id).unwrap();
    let order: Vec<_> = versions.iter().map(|v| v.id.clone()).collect();
    assert_eq!(order, vec![second.version_id.clone(), v1]);
    assert_eq!(versions[0].changelog.as_deref(), Some("Second"));
}

#[test]
fn test_publish_with_doi() {
    let store = seeded_store();
    let mut config = KernelConfig::default();
    config.doi.enabled = true;
    let service = LiteratureListService::in_memory(store, config)
        .unwrap()
        .with_registrar(Arc::new(PrefixDoiRegistrar::new("10.5555")));
    let id = service.create(&create_command("Reading list")).unwrap();

    let outcome = service
        .publish(&PublishLiteratureListCommand {
            id: id.clone(),
            contributor_id: ACTOR,
            changelog: Some("First".to_string()),
            assign_doi: true,
        })
        .unwrap();

    let expected = format!("10.5555/{}", outcome.version_id);
    match &outcome.doi {
        DoiOutcome::Registered(doi) => assert_eq!(doi.as_str(), expected),
        other => panic!("expected registered DOI, got {other:?}"),
    }
    assert_eq!(service.versions(&id).unwrap()[0].doi.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_publish_without_registrar_still_publishes() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store, KernelConfig::default()).unwrap();
    let id = service.create(&create_command("Reading list")).unwrap();

    let outcome = service
        .publish(&PublishLiteratureListCommand {
            id: id.clone(),
            contributor_id: ACTOR,
            changelog: Some("First".to_string()),
            assign_doi: true,
        })
        .unwrap();

    assert!(matches!(outcome.doi, DoiOutcome::Failed(_)));
    assert_eq!(service.versions(&id).unwrap().len(), 1);
}

#[test]
fn test_published_root_cannot_be_published_or_deleted() {
    let store = seeded_store();
    let service = LiteratureListService::in_memory(store, KernelConfig::default()).unwrap();
    let id = service.create(&create_command("Reading list")).unwrap();
    let version = service.publish(&publish(&id, "First")).unwrap().version_id;

    assert!(matches!(
        service.publish(&publish(&version, "Again")),
        Err(ContentError::NotModifiable { .. })
    ));
    assert!(matches!(
        service.delete(&DeleteLiteratureListCommand {
            id: version,
            contributor_id: ACTOR,
        }),
        Err(ContentError::NotModifiable { .. })
    ));
}
