//! Reusable steps shared by content types.

pub mod author;
pub mod property;

pub use author::{Author, AuthorListUpdater, AuthorResolver, ResolvedAuthor};
pub use property::{SingleStatementPropertyUpdater, StatementCollectionPropertyUpdater};
