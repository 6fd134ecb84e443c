//! Literature lists: titled, authored collections of text and list
//! sections.
//!
//! ## Graph Shape
//!
//! ```text
//! LiteratureList --hasResearchField--> ResearchField (shared)
//!                --hasAuthors--> List --hasListElement--> AuthorEntry --hasAuthor--> author
//!                --hasSection--> TextSection --hasHeadingLevel--> "2"
//!                                            --hasContent--> "text"
//!                --hasSection--> ListSection --hasEntry--> Entry --hasLink--> resource
//!                                                               --description--> "note"
//!                --hasPublishedVersion--> LiteratureListPublished
//! ```
//!
//! A published version is a frozen copy of the draft's graph plus an
//! archived bundle of its statements.

pub mod commands;
pub mod model;
pub mod sections;
pub mod service;

pub use commands::{
    CreateLiteratureListCommand, DeleteLiteratureListCommand, ListEntryDefinition,
    PublishLiteratureListCommand, SectionDefinition, UpdateLiteratureListCommand,
};
pub use model::{ListEntry, LiteratureList, LiteratureListSection, ObjectRef};
pub use service::{literature_list_shape, LiteratureListService, PublishOutcome};
