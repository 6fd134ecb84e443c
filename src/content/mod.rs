//! Content types built on the kernel.

pub mod literature_list;

pub use literature_list::{LiteratureList, LiteratureListService, PublishOutcome};
