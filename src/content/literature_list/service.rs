//! Literature list operations, each one an [`ActionPipeline`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::commands::{
    CreateLiteratureListCommand, DeleteLiteratureListCommand, ListEntryDefinition,
    PublishLiteratureListCommand, SectionDefinition, UpdateLiteratureListCommand,
};
use super::model::{LiteratureList, LiteratureListSection};
use super::sections::{validate_sections, SectionWriter};
use crate::actions::{
    Author, AuthorListUpdater, AuthorResolver, ResolvedAuthor, StatementCollectionPropertyUpdater,
};
use crate::archive::{CacheStats, DoiOutcome, PublishedCache, VersionArchiver, VersionInfo, VersionLink};
use crate::config::{ConfigError, KernelConfig};
use crate::deleter::{CascadeDeleter, DeletionReport, OwnershipShape};
use crate::doi::{Doi, DoiMetadata, DoiRegistrar};
use crate::error::{ContentError, ContentResult};
use crate::graph::GraphWriter;
use crate::ids::IdentityAllocator;
use crate::pipeline::ActionPipeline;
use crate::policy::BundleConfiguration;
use crate::store::{GraphStore, IdBlockCounter, InMemoryGraph, StatementStore, StoreError};
use crate::types::vocab::{self, classes, predicates};
use crate::types::{group_by_subject, PublishedContent, ThingId};
use crate::validation::{validate_label, validate_text};

const KIND: &str = "Literature list";

/// Parts owned by a literature list draft.
pub fn literature_list_shape() -> OwnershipShape {
    OwnershipShape::new([
        predicates::HAS_AUTHORS,
        predicates::HAS_LIST_ELEMENT,
        predicates::HAS_AUTHOR,
        predicates::HAS_SECTION,
        predicates::HAS_HEADING_LEVEL,
        predicates::HAS_CONTENT,
        predicates::HAS_ENTRY,
        predicates::DESCRIPTION,
    ])
    .keeping([classes::AUTHOR, classes::RESEARCH_FIELD])
}

/// Result of publishing a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    /// Root of the published copy.
    pub version_id: ThingId,
    /// Version the new one follows, if any.
    pub previous_version: Option<ThingId>,
    /// Digest of the archived bundle.
    pub digest: String,
    /// DOI registration result.
    pub doi: DoiOutcome,
}

#[derive(Debug, Default)]
struct CreateState {
    authors: Vec<ResolvedAuthor>,
    literature_list_id: Option<ThingId>,
}

#[derive(Debug, Default)]
struct UpdateState {
    literature_list: Option<LiteratureList>,
    authors: Option<Vec<ResolvedAuthor>>,
}

#[derive(Debug, Default)]
struct PublishState {
    draft: Option<LiteratureList>,
    version_id: Option<ThingId>,
    content: Option<Arc<PublishedContent>>,
    link: Option<VersionLink>,
    doi: Option<DoiOutcome>,
}

/// Value a previous step should have put into the pipeline state.
fn required<'s, T>(value: &'s Option<T>, what: &str) -> ContentResult<&'s T> {
    value
        .as_ref()
        .ok_or_else(|| StoreError::Backend(format!("{what} missing from pipeline state")).into())
}

/// Literature list service.
///
/// Owns the ID allocator and the published snapshot cache; the store and
/// DOI registrar are shared.
pub struct LiteratureListService {
    store: Arc<dyn GraphStore>,
    ids: IdentityAllocator,
    config: KernelConfig,
    registrar: Option<Arc<dyn DoiRegistrar>>,
    cache: PublishedCache,
}

impl LiteratureListService {
    /// Create a service over a store and a remote ID counter.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails [`KernelConfig::validate`].
    pub fn new(
        store: Arc<dyn GraphStore>,
        counter: Arc<dyn IdBlockCounter>,
        config: KernelConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ids = IdentityAllocator::with_block_size(counter, config.id_block_size);
        let cache = PublishedCache::new(config.cache_capacity());
        Ok(Self {
            store,
            ids,
            config,
            registrar: None,
            cache,
        })
    }

    /// Create a service over an in-memory graph that also acts as counter.
    pub fn in_memory(store: Arc<InMemoryGraph>, config: KernelConfig) -> Result<Self, ConfigError> {
        Self::new(store.clone(), store, config)
    }

    /// Register DOIs through `registrar`.
    pub fn with_registrar(mut self, registrar: Arc<dyn DoiRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Statistics of the published snapshot cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn writer(&self) -> GraphWriter<'_> {
        GraphWriter::new(self.store.as_ref(), &self.ids)
    }

    fn archiver(&self) -> VersionArchiver<'_> {
        VersionArchiver::new(self.writer(), &self.config, self.registrar.as_deref(), &self.cache)
    }

    /// Create a draft. Returns its root ID.
    pub fn create(&self, command: &CreateLiteratureListCommand) -> ContentResult<ThingId> {
        let state = create_pipeline(self.writer(), classes::LITERATURE_LIST, true)
            .execute(command, CreateState::default())?;
        let id = required(&state.literature_list_id, "literature list")?.clone();
        info!(id = %id, actor = %command.contributor_id, "Created literature list");
        Ok(id)
    }

    /// Update a draft.
    pub fn update(&self, command: &UpdateLiteratureListCommand) -> ContentResult<()> {
        let writer = self.writer();
        let pipeline: ActionPipeline<'_, UpdateLiteratureListCommand, UpdateState> =
            ActionPipeline::new("update_literature_list")
                .step("load literature list", |c: &UpdateLiteratureListCommand, mut s: UpdateState| {
                    s.literature_list = Some(self.find_by_id(&c.literature_list_id)?);
                    Ok(s)
                })
                .step("refuse published", |_, s: UpdateState| {
                    refuse_published(required(&s.literature_list, "literature list")?)?;
                    Ok(s)
                })
                .step("validate title", |c, s| {
                    if let Some(title) = &c.title {
                        validate_label("title", title)?;
                    }
                    Ok(s)
                })
                .step("validate research fields", move |c, s| {
                    if let Some(fields) = &c.research_fields {
                        let current = required(&s.literature_list, "literature list")?;
                        let unchanged = current.research_fields.iter().map(|f| &f.id).eq(fields.iter());
                        if !unchanged {
                            validate_research_fields(&writer, fields)?;
                        }
                    }
                    Ok(s)
                })
                .step("resolve authors", move |c, mut s: UpdateState| {
                    if let Some(authors) = &c.authors {
                        s.authors = Some(AuthorResolver::new(writer).resolve(authors)?);
                    }
                    Ok(s)
                })
                .step("validate sections", move |c, s| {
                    if let Some(sections) = &c.sections {
                        validate_sections(&writer, sections)?;
                    }
                    Ok(s)
                })
                .step("update title", move |c, s| {
                    if let Some(title) = &c.title {
                        writer.update_label(&c.literature_list_id, title)?;
                    }
                    Ok(s)
                })
                .step("update research fields", move |c, s| {
                    if let Some(fields) = &c.research_fields {
                        StatementCollectionPropertyUpdater::new(writer).update(
                            &c.literature_list_id,
                            &vocab::id(predicates::HAS_RESEARCH_FIELD),
                            fields,
                            c.contributor_id,
                        )?;
                    }
                    Ok(s)
                })
                .step("update authors", move |c, s: UpdateState| {
                    if let Some(authors) = &s.authors {
                        AuthorListUpdater::new(writer).update(&c.literature_list_id, authors, c.contributor_id)?;
                    }
                    Ok(s)
                })
                .step("update sections", move |c, s| {
                    if let Some(sections) = &c.sections {
                        SectionWriter::new(writer).update_all(&c.literature_list_id, sections, c.contributor_id)?;
                    }
                    Ok(s)
                });

        pipeline.execute(command, UpdateState::default())?;
        info!(id = %command.literature_list_id, actor = %command.contributor_id, "Updated literature list");
        Ok(())
    }

    /// Publish the current state of a draft as a new immutable version.
    pub fn publish(&self, command: &PublishLiteratureListCommand) -> ContentResult<PublishOutcome> {
        let archiver = self.archiver();
        let pipeline: ActionPipeline<'_, PublishLiteratureListCommand, PublishState> =
            ActionPipeline::new("publish_literature_list")
                .step("load draft", |c: &PublishLiteratureListCommand, mut s: PublishState| {
                    s.draft = Some(self.find_by_id(&c.id)?);
                    Ok(s)
                })
                .step("refuse published", |_, s: PublishState| {
                    refuse_published(required(&s.draft, "draft")?)?;
                    Ok(s)
                })
                .step("validate changelog", |c, s| {
                    match &c.changelog {
                        Some(changelog) => validate_text("changelog", changelog)?,
                        None if c.assign_doi => {
                            return Err(ContentError::validation(
                                "changelog",
                                "is required when assigning a DOI",
                            ));
                        }
                        None => {}
                    }
                    Ok(s)
                })
                .step("create published copy", |c, mut s: PublishState| {
                    let copy = copy_command(required(&s.draft, "draft")?, c);
                    let created = create_pipeline(self.writer().frozen(), classes::LITERATURE_LIST_PUBLISHED, false)
                        .execute(&copy, CreateState::default())?;
                    s.version_id = created.literature_list_id;
                    Ok(s)
                })
                .step("archive", |c, mut s: PublishState| {
                    let version = required(&s.version_id, "version")?;
                    s.content = Some(archiver.archive(&c.id, version)?);
                    Ok(s)
                })
                .step("link version", |c, mut s: PublishState| {
                    let version = required(&s.version_id, "version")?;
                    s.link = Some(archiver.link_version(&c.id, version, c.changelog.as_deref(), c.contributor_id)?);
                    Ok(s)
                })
                .step("register DOI", |c, mut s: PublishState| {
                    s.doi = Some(if c.assign_doi {
                        let draft = required(&s.draft, "draft")?;
                        let version = required(&s.version_id, "version")?;
                        let metadata = self.doi_metadata(draft, version, c.changelog.as_deref().unwrap_or_default());
                        archiver.request_doi(version, &metadata, c.contributor_id)?
                    } else {
                        DoiOutcome::NotRequested
                    });
                    Ok(s)
                });

        let state = pipeline.execute(command, PublishState::default())?;
        let outcome = PublishOutcome {
            version_id: required(&state.version_id, "version")?.clone(),
            previous_version: required(&state.link, "version link")?.previous.clone(),
            digest: required(&state.content, "published content")?.digest.clone(),
            doi: state.doi.unwrap_or(DoiOutcome::NotRequested),
        };
        info!(
            draft = %command.id,
            version = %outcome.version_id,
            previous = ?outcome.previous_version,
            "Published literature list"
        );
        Ok(outcome)
    }

    /// Delete a draft that has never been published.
    pub fn delete(&self, command: &DeleteLiteratureListCommand) -> ContentResult<DeletionReport> {
        let list = self.find_by_id(&command.id)?;
        refuse_published(&list)?;
        if !list.versions.is_empty() {
            return Err(ContentError::NotModifiable {
                kind: KIND,
                id: list.id,
                reason: "it has published versions",
            });
        }
        CascadeDeleter::new(self.writer()).delete(&command.id, &literature_list_shape(), command.contributor_id)
    }

    /// Read a draft or a published version.
    ///
    /// Published versions are read from their archived bundle.
    pub fn find_by_id(&self, id: &ThingId) -> ContentResult<LiteratureList> {
        let root = self.writer().require(KIND, id)?;
        let archiver = self.archiver();

        if root.is_instance_of(&vocab::id(classes::LITERATURE_LIST_PUBLISHED)) {
            let content = archiver.find_published(id)?;
            let by_subject = group_by_subject(content.statements.iter().cloned());
            let versions = archiver.versions(&content.root_id)?;
            return Ok(LiteratureList::from_statements(&root, &by_subject, versions));
        }
        if root.is_instance_of(&vocab::id(classes::LITERATURE_LIST)) {
            let bundle = self.store.fetch_bundle(id, &BundleConfiguration::aggregate())?;
            let versions = archiver.versions(id)?;
            return Ok(LiteratureList::from_statements(&root, &bundle.by_subject(), versions));
        }
        Err(ContentError::not_found(KIND, id))
    }

    /// Published versions of a draft, newest first.
    pub fn versions(&self, id: &ThingId) -> ContentResult<Vec<VersionInfo>> {
        self.archiver().versions(id)
    }

    /// Archived bundle of a published version.
    pub fn find_published_content(&self, version: &ThingId) -> ContentResult<Arc<PublishedContent>> {
        self.archiver().find_published(version)
    }

    fn doi_metadata(&self, draft: &LiteratureList, version: &ThingId, changelog: &str) -> DoiMetadata {
        DoiMetadata {
            suffix: version.to_string(),
            title: draft.title.clone(),
            description: changelog.to_string(),
            url: format!("{}{}", self.config.doi.publish_base_uri, version),
            creators: draft.authors.iter().map(|a| a.name.clone()).collect(),
            resource_type: "Collection".to_string(),
            related_identifiers: draft
                .versions
                .iter()
                .filter_map(|v| v.doi.as_deref())
                .filter_map(|doi| Doi::parse(doi).ok())
                .collect(),
        }
    }
}

impl std::fmt::Debug for LiteratureListService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteratureListService")
            .field("ids", &self.ids)
            .field("config", &self.config)
            .field("registrar", &self.registrar.is_some())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Pipeline creating a literature list root with all its parts.
///
/// With `validate` unset the command is trusted: this is how published
/// copies are made from an already validated draft.
fn create_pipeline<'a>(
    writer: GraphWriter<'a>,
    root_class: &'static str,
    validate: bool,
) -> ActionPipeline<'a, CreateLiteratureListCommand, CreateState> {
    let pipeline: ActionPipeline<'a, CreateLiteratureListCommand, CreateState> = if validate {
        ActionPipeline::new("create_literature_list")
            .step("validate title", |c: &CreateLiteratureListCommand, s: CreateState| {
                validate_label("title", &c.title)?;
                Ok(s)
            })
            .step("validate research fields", move |c, s| {
                validate_research_fields(&writer, &c.research_fields)?;
                Ok(s)
            })
            .step("resolve authors", move |c, mut s: CreateState| {
                s.authors = AuthorResolver::new(writer).resolve(&c.authors)?;
                Ok(s)
            })
            .step("validate sections", move |c, s| {
                validate_sections(&writer, &c.sections)?;
                Ok(s)
            })
    } else {
        ActionPipeline::new("create_published_copy").step(
            "copy authors",
            |c: &CreateLiteratureListCommand, mut s: CreateState| {
                s.authors = c.authors.iter().map(copy_author).collect();
                Ok(s)
            },
        )
    };

    pipeline
        .step("create root", move |c, mut s: CreateState| {
            let root = writer.create_resource(&c.title, [vocab::id(root_class)], c.contributor_id)?;
            s.literature_list_id = Some(root);
            Ok(s)
        })
        .step("link research fields", move |c, s: CreateState| {
            let root = required(&s.literature_list_id, "literature list")?;
            let predicate = vocab::id(predicates::HAS_RESEARCH_FIELD);
            for field in &c.research_fields {
                writer.add_statement(root, &predicate, field, c.contributor_id)?;
            }
            Ok(s)
        })
        .step("create authors", move |c, s: CreateState| {
            let root = required(&s.literature_list_id, "literature list")?;
            AuthorListUpdater::new(writer).create(root, &s.authors, c.contributor_id)?;
            Ok(s)
        })
        .step("create sections", move |c, s: CreateState| {
            let root = required(&s.literature_list_id, "literature list")?;
            SectionWriter::new(writer).create_all(root, &c.sections, c.contributor_id)?;
            Ok(s)
        })
}

/// Research fields must exist, carry the research field class and be
/// listed once.
fn validate_research_fields(writer: &GraphWriter<'_>, fields: &[ThingId]) -> ContentResult<()> {
    let class = vocab::id(classes::RESEARCH_FIELD);
    let mut seen = BTreeSet::new();
    for field in fields {
        let thing = writer.require("Research field", field)?;
        if !thing.is_instance_of(&class) {
            return Err(ContentError::not_found("Research field", field));
        }
        if !seen.insert(field) {
            return Err(ContentError::validation(
                "research_fields",
                format!("\"{field}\" is listed more than once"),
            ));
        }
    }
    Ok(())
}

fn refuse_published(list: &LiteratureList) -> ContentResult<()> {
    if list.published {
        return Err(ContentError::NotModifiable {
            kind: KIND,
            id: list.id.clone(),
            reason: "published versions are read-only",
        });
    }
    Ok(())
}

/// Authors of a stored draft: resources are reused, names are copied.
fn copy_author(author: &Author) -> ResolvedAuthor {
    match &author.id {
        Some(id) => ResolvedAuthor::Existing {
            id: id.clone(),
            name: author.name.clone(),
        },
        None => ResolvedAuthor::New {
            name: author.name.clone(),
            orcid: author.orcid.clone(),
        },
    }
}

/// Create command reproducing the current state of a draft.
fn copy_command(draft: &LiteratureList, command: &PublishLiteratureListCommand) -> CreateLiteratureListCommand {
    CreateLiteratureListCommand {
        contributor_id: command.contributor_id,
        title: draft.title.clone(),
        research_fields: draft.research_fields.iter().map(|f| f.id.clone()).collect(),
        authors: draft.authors.clone(),
        sections: draft
            .sections
            .iter()
            .map(|section| match section {
                LiteratureListSection::Text {
                    heading,
                    heading_size,
                    text,
                    ..
                } => SectionDefinition::text(heading.clone(), *heading_size, text.clone()),
                LiteratureListSection::List { entries, .. } => {
                    SectionDefinition::list(entries.iter().map(|entry| ListEntryDefinition {
                        id: entry.value.id.clone(),
                        description: entry.description.clone(),
                    }))
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Author;
    use crate::store::ThingStore;
    use crate::types::{ContributorId, Thing};

    const ACTOR: ContributorId = ContributorId::SYSTEM;

    struct Fixture {
        store: Arc<InMemoryGraph>,
        service: LiteratureListService,
        field: ThingId,
        paper: ThingId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryGraph::with_vocabulary());
        store.insert_thing(Thing::resource(
            ThingId::new("RF1"),
            "Physics",
            [vocab::id(classes::RESEARCH_FIELD)],
            ACTOR,
        ));
        store.insert_thing(Thing::resource(ThingId::new("P1"), "A paper", [], ACTOR));
        let service = LiteratureListService::in_memory(store.clone(), KernelConfig::default()).unwrap();
        Fixture {
            store,
            service,
            field: ThingId::new("RF1"),
            paper: ThingId::new("P1"),
        }
    }

    fn create_command(f: &Fixture) -> CreateLiteratureListCommand {
        CreateLiteratureListCommand {
            contributor_id: ACTOR,
            title: "Reading list".to_string(),
            research_fields: vec![f.field.clone()],
            authors: vec![Author::named("Grace")],
            sections: vec![
                SectionDefinition::text("Intro", 2, "Why these papers"),
                SectionDefinition::list([ListEntryDefinition::described(f.paper.clone(), "start here")]),
            ],
        }
    }

    #[test]
    fn test_create_and_read_back() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        let list = f.service.find_by_id(&id).unwrap();

        assert_eq!(list.title, "Reading list");
        assert_eq!(list.research_fields[0].id, f.field);
        assert_eq!(list.authors, vec![Author::named("Grace")]);
        assert_eq!(list.sections.len(), 2);
        assert!(!list.published);
        assert!(list.versions.is_empty());
    }

    #[test]
    fn test_create_validation_failures_write_nothing() {
        let f = fixture();
        let before = f.store.mutation_count();

        let mut blank = create_command(&f);
        blank.title = " ".to_string();
        assert!(f.service.create(&blank).unwrap_err().is_validation());

        let mut unknown_field = create_command(&f);
        unknown_field.research_fields = vec![f.paper.clone()];
        assert!(matches!(f.service.create(&unknown_field), Err(ContentError::NotFound { .. })));

        assert_eq!(f.store.mutation_count(), before);
    }

    #[test]
    fn test_create_pipeline_step_order() {
        let f = fixture();
        let writer = f.service.writer();
        let full = create_pipeline(writer, classes::LITERATURE_LIST, true);
        let copy = create_pipeline(writer, classes::LITERATURE_LIST_PUBLISHED, false);

        assert_eq!(
            full.step_names(),
            vec![
                "validate title",
                "validate research fields",
                "resolve authors",
                "validate sections",
                "create root",
                "link research fields",
                "create authors",
                "create sections",
            ]
        );
        assert_eq!(copy.step_names()[0], "copy authors");
        assert_eq!(copy.len(), 5);
    }

    #[test]
    fn test_update_title_only() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        let mut command = UpdateLiteratureListCommand::new(id.clone(), ACTOR);
        command.title = Some("Better title".to_string());
        f.service.update(&command).unwrap();

        let list = f.service.find_by_id(&id).unwrap();
        assert_eq!(list.title, "Better title");
        assert_eq!(list.sections.len(), 2);
    }

    #[test]
    fn test_publish_freezes_copy() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        let outcome = f
            .service
            .publish(&PublishLiteratureListCommand {
                id: id.clone(),
                contributor_id: ACTOR,
                changelog: Some("first".to_string()),
                assign_doi: false,
            })
            .unwrap();

        assert_eq!(outcome.previous_version, None);
        assert_eq!(outcome.doi, DoiOutcome::NotRequested);
        assert!(!f.store.find_by_id(&outcome.version_id).unwrap().unwrap().modifiable);

        let version = f.service.find_by_id(&outcome.version_id).unwrap();
        assert!(version.published);
        assert_eq!(version.title, "Reading list");
        assert_eq!(version.sections.len(), 2);
        assert_eq!(version.versions[0].changelog.as_deref(), Some("first"));

        let mut command = UpdateLiteratureListCommand::new(outcome.version_id.clone(), ACTOR);
        command.title = Some("x".to_string());
        assert!(matches!(f.service.update(&command), Err(ContentError::NotModifiable { .. })));
    }

    #[test]
    fn test_doi_requires_changelog() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        let err = f
            .service
            .publish(&PublishLiteratureListCommand {
                id,
                contributor_id: ACTOR,
                changelog: None,
                assign_doi: true,
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_delete_refuses_published_drafts() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        f.service
            .publish(&PublishLiteratureListCommand {
                id: id.clone(),
                contributor_id: ACTOR,
                changelog: None,
                assign_doi: false,
            })
            .unwrap();

        let err = f
            .service
            .delete(&DeleteLiteratureListCommand { id: id.clone(), contributor_id: ACTOR })
            .unwrap_err();
        assert!(matches!(err, ContentError::NotModifiable { .. }));
        assert!(f.store.exists(&id).unwrap());
    }

    #[test]
    fn test_delete_removes_owned_parts_only() {
        let f = fixture();
        let id = f.service.create(&create_command(&f)).unwrap();
        let report = f
            .service
            .delete(&DeleteLiteratureListCommand { id: id.clone(), contributor_id: ACTOR })
            .unwrap();

        assert_eq!(report.things_deleted.last(), Some(&id));
        assert!(!f.store.exists(&id).unwrap());
        assert!(f.store.exists(&f.field).unwrap());
        assert!(f.store.exists(&f.paper).unwrap());
        assert_eq!(f.store.num_statements(), 0);
    }

    #[test]
    fn test_unknown_or_foreign_root_is_not_found() {
        let f = fixture();
        assert!(matches!(f.service.find_by_id(&ThingId::new("R404")), Err(ContentError::NotFound { .. })));
        assert!(matches!(f.service.find_by_id(&f.paper), Err(ContentError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let store = Arc::new(InMemoryGraph::with_vocabulary());
        let config = KernelConfig {
            id_block_size: 0,
            ..KernelConfig::default()
        };
        assert!(matches!(
            LiteratureListService::in_memory(store.clone(), config),
            Err(ConfigError::Invalid { name: "id_block_size", .. })
        ));

        let config = KernelConfig {
            published_cache_capacity: 0,
            ..KernelConfig::default()
        };
        assert!(LiteratureListService::in_memory(store, config).is_err());
    }
}
