//! Built-in predicates and classes.
//!
//! Vocabulary Things carry fixed readable IDs instead of allocated ones and
//! must be present in a store before content is written
//! (see [`vocabulary`]).

use super::thing::{Thing, ThingId};

/// Built-in predicate IDs.
pub mod predicates {
    /// Aggregate → author list.
    pub const HAS_AUTHORS: &str = "hasAuthors";
    /// List → list element.
    pub const HAS_LIST_ELEMENT: &str = "hasListElement";
    /// Author entry → author Thing.
    pub const HAS_AUTHOR: &str = "hasAuthor";
    /// Author → ORCID literal.
    pub const HAS_ORCID: &str = "hasORCID";
    /// Aggregate → research field.
    pub const HAS_RESEARCH_FIELD: &str = "hasResearchField";
    /// Aggregate → section.
    pub const HAS_SECTION: &str = "hasSection";
    /// List section → entry node.
    pub const HAS_ENTRY: &str = "hasEntry";
    /// Entry node → linked resource.
    pub const HAS_LINK: &str = "hasLink";
    /// Description or changelog literal.
    pub const DESCRIPTION: &str = "description";
    /// Text section → heading level literal.
    pub const HAS_HEADING_LEVEL: &str = "hasHeadingLevel";
    /// Text section → content literal.
    pub const HAS_CONTENT: &str = "hasContent";
    /// Draft → published version.
    pub const HAS_PUBLISHED_VERSION: &str = "hasPublishedVersion";
    /// Version → predecessor version.
    pub const HAS_PREVIOUS_VERSION: &str = "hasPreviousVersion";
    /// Published version → DOI literal.
    pub const HAS_DOI: &str = "hasDOI";

    /// All built-in predicates with their labels.
    pub const ALL: &[(&str, &str)] = &[
        (HAS_AUTHORS, "has authors"),
        (HAS_LIST_ELEMENT, "has list element"),
        (HAS_AUTHOR, "has author"),
        (HAS_ORCID, "has ORCID"),
        (HAS_RESEARCH_FIELD, "has research field"),
        (HAS_SECTION, "has section"),
        (HAS_ENTRY, "has entry"),
        (HAS_LINK, "has link"),
        (DESCRIPTION, "description"),
        (HAS_HEADING_LEVEL, "has heading level"),
        (HAS_CONTENT, "has content"),
        (HAS_PUBLISHED_VERSION, "has published version"),
        (HAS_PREVIOUS_VERSION, "has previous version"),
        (HAS_DOI, "has DOI"),
    ];
}

/// Built-in class IDs.
pub mod classes {
    /// Pseudo-class matching any resource in bundle whitelists.
    pub const RESOURCE: &str = "Resource";
    /// Pseudo-class matching literals in bundle whitelists.
    pub const LITERAL: &str = "Literal";
    /// Pseudo-class matching predicates in bundle whitelists.
    pub const PREDICATE: &str = "Predicate";
    /// Pseudo-class matching classes in bundle whitelists.
    pub const CLASS: &str = "Class";
    /// Ordered list container.
    pub const LIST: &str = "List";
    /// Author resource.
    pub const AUTHOR: &str = "Author";
    /// Entry node of an author list.
    pub const AUTHOR_ENTRY: &str = "AuthorEntry";
    /// Shared research field hub.
    pub const RESEARCH_FIELD: &str = "ResearchField";
    /// Literature list draft.
    pub const LITERATURE_LIST: &str = "LiteratureList";
    /// Published literature list copy.
    pub const LITERATURE_LIST_PUBLISHED: &str = "LiteratureListPublished";
    /// Section listing linked resources.
    pub const LIST_SECTION: &str = "ListSection";
    /// Section holding a heading and text.
    pub const TEXT_SECTION: &str = "TextSection";
    /// Entry node of a list section.
    pub const ENTRY: &str = "Entry";

    /// All built-in classes with their labels.
    pub const ALL: &[(&str, &str)] = &[
        (RESOURCE, "Resource"),
        (LITERAL, "Literal"),
        (PREDICATE, "Predicate"),
        (CLASS, "Class"),
        (LIST, "List"),
        (AUTHOR, "Author"),
        (AUTHOR_ENTRY, "Author entry"),
        (RESEARCH_FIELD, "Research field"),
        (LITERATURE_LIST, "Literature list"),
        (LITERATURE_LIST_PUBLISHED, "Published literature list"),
        (LIST_SECTION, "List section"),
        (TEXT_SECTION, "Text section"),
        (ENTRY, "Entry"),
    ];
}

/// ThingId of a built-in predicate or class.
pub fn id(value: &str) -> ThingId {
    ThingId::new(value)
}

/// All vocabulary Things (predicates and classes) to seed a store with.
pub fn vocabulary() -> Vec<Thing> {
    let predicates = predicates::ALL
        .iter()
        .map(|(id, label)| Thing::predicate(ThingId::new(*id), *label));
    let classes = classes::ALL
        .iter()
        .map(|(id, label)| Thing::class(ThingId::new(*id), *label));
    predicates.chain(classes).collect()
}
