//! Core types for the content graph.

pub mod bundle;
pub mod statement;
pub mod thing;
pub mod vocab;

pub use bundle::{group_by_subject, Bundle, PublishedContent};
pub use statement::{sort_by_creation, Statement, StatementId};
pub use thing::{ContributorId, IdKind, Thing, ThingId, ThingKind, XSD_INTEGER, XSD_STRING};
