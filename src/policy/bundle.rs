//! Bundle configuration: bounds and filters for subgraph extraction.
//!
//! Levels count hops from the root: the root's own statements are level 1,
//! statements of their objects level 2, and so on.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::types::vocab::classes;
use crate::types::{Thing, ThingId, ThingKind};

/// Version tag mixed into the parameter hash.
pub const BUNDLE_CONFIG_VERSION: &str = "bundle_v1";

/// Traversal bounds and class filters for [`crate::extractor::SubgraphExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfiguration {
    /// Statements at or below this level are traversed but not emitted.
    pub min_level: Option<u32>,
    /// Statements beyond this level are neither emitted nor expanded.
    pub max_level: Option<u32>,
    /// Objects carrying one of these classes are emitted but not expanded.
    pub blacklist: Vec<ThingId>,
    /// If non-empty, only statements whose object matches are kept.
    pub whitelist: Vec<ThingId>,
    /// Whether the root's own statements are emitted.
    pub include_first: bool,
}

impl BundleConfiguration {
    /// Create a configuration with a level bound and a class blacklist.
    pub fn new(max_level: Option<u32>, blacklist: Vec<ThingId>) -> Self {
        Self {
            max_level,
            blacklist,
            ..Self::default()
        }
    }

    /// Configuration used when archiving published content: ten levels deep,
    /// shared research field hubs are referenced but not copied.
    pub fn published() -> Self {
        Self::new(Some(10), vec![ThingId::new(classes::RESEARCH_FIELD)])
    }

    /// Configuration for reading an aggregate back: five levels reach every
    /// part of a content type. Research fields and published copies are
    /// referenced but not expanded.
    pub fn aggregate() -> Self {
        Self::new(
            Some(5),
            vec![
                ThingId::new(classes::RESEARCH_FIELD),
                ThingId::new(classes::LITERATURE_LIST_PUBLISHED),
            ],
        )
    }

    /// Set the maximum level.
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = Some(max_level);
        self
    }

    /// Set the minimum level.
    pub fn with_min_level(mut self, min_level: u32) -> Self {
        self.min_level = Some(min_level);
        self
    }

    /// Set the whitelist.
    pub fn with_whitelist(mut self, whitelist: Vec<ThingId>) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Suppress or include the root's own statements.
    pub fn with_include_first(mut self, include_first: bool) -> Self {
        self.include_first = include_first;
        self
    }

    /// Whether statements at `level` may be traversed at all.
    pub fn within_bounds(&self, level: u32) -> bool {
        self.max_level.map_or(true, |max| level <= max)
    }

    /// Whether a traversed statement at `level` is emitted.
    pub fn emits_level(&self, level: u32) -> bool {
        if level == 1 && !self.include_first {
            return false;
        }
        self.min_level.map_or(true, |min| level > min)
    }

    /// Whether an object stops expansion.
    pub fn is_blacklisted(&self, object: &Thing) -> bool {
        object.has_any_class(&self.blacklist)
    }

    /// Whether an object passes the whitelist. An empty whitelist passes all.
    ///
    /// Resources match on their classes or the `Resource` pseudo-class; other
    /// kinds match their pseudo-class.
    pub fn is_whitelisted(&self, object: &Thing) -> bool {
        if self.whitelist.is_empty() {
            return true;
        }
        let pseudo = match object.kind {
            ThingKind::Resource => classes::RESOURCE,
            ThingKind::Literal => classes::LITERAL,
            ThingKind::Predicate => classes::PREDICATE,
            ThingKind::Class => classes::CLASS,
        };
        self.whitelist
            .iter()
            .any(|c| c.as_str() == pseudo || object.is_instance_of(c))
    }

    /// Compute a hash of the configuration parameters.
    ///
    /// Blacklist and whitelist are hashed sorted, so their order does not
    /// matter.
    pub fn params_hash(&self) -> String {
        let mut blacklist: Vec<&str> = self.blacklist.iter().map(ThingId::as_str).collect();
        let mut whitelist: Vec<&str> = self.whitelist.iter().map(ThingId::as_str).collect();
        blacklist.sort_unstable();
        whitelist.sort_unstable();
        canonical_hash_hex(&HashedParams {
            version: BUNDLE_CONFIG_VERSION,
            min_level: self.min_level,
            max_level: self.max_level,
            blacklist,
            whitelist,
            include_first: self.include_first,
        })
    }
}

impl Default for BundleConfiguration {
    fn default() -> Self {
        Self {
            min_level: None,
            max_level: None,
            blacklist: Vec::new(),
            whitelist: Vec::new(),
            include_first: true,
        }
    }
}

#[derive(Serialize)]
struct HashedParams<'a> {
    version: &'a str,
    min_level: Option<u32>,
    max_level: Option<u32>,
    blacklist: Vec<&'a str>,
    whitelist: Vec<&'a str>,
    include_first: bool,
}
