//! Bounded subgraph extractor.
//!
//! Walks outgoing statements breadth-first from a root and collects the
//! reachable statements into a [`Bundle`].
//!
//! ## Algorithm
//!
//! 1. Queue the root's statements (creation order) at level 1
//! 2. Dequeue a statement; skip it if already visited
//! 3. Statements beyond `max_level` or failing the whitelist are dropped
//! 4. Emit the statement unless its level is suppressed
//! 5. Unless the object is blacklisted, queue the object's statements at
//!    `level + 1`
//!
//! Visited tracking is per statement, not per node: converging paths reach
//! a shared object twice but each edge is emitted once, and cycles end.
//! Levels leave the queue in non-decreasing order, so every statement is
//! first visited at its shortest distance from the root.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::policy::BundleConfiguration;
use crate::store::{StatementStore, StoreError};
use crate::types::{Bundle, Statement, StatementId, ThingId};

/// Extracts bundles from a statement store.
pub struct SubgraphExtractor<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: StatementStore + ?Sized> SubgraphExtractor<'a, S> {
    /// Create an extractor over a store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Extract the bundle reachable from `root` under `config`.
    ///
    /// An unknown root yields an empty bundle.
    pub fn extract(&self, root: &ThingId, config: &BundleConfiguration) -> Result<Bundle, StoreError> {
        let bundle = traverse(self.store, root, config)?;
        debug!(
            root = %root,
            statements = bundle.len(),
            params_hash = %config.params_hash(),
            "Extracted bundle"
        );
        Ok(bundle)
    }
}

/// Breadth-first traversal backing [`SubgraphExtractor::extract`] and the
/// default [`StatementStore::fetch_bundle`].
pub fn traverse<S: StatementStore + ?Sized>(
    store: &S,
    root: &ThingId,
    config: &BundleConfiguration,
) -> Result<Bundle, StoreError> {
    let mut bundle = Bundle::empty(root.clone());
    let mut visited: HashSet<StatementId> = HashSet::new();
    let mut queue: VecDeque<(Statement, u32)> = VecDeque::new();

    if !config.within_bounds(1) {
        return Ok(bundle);
    }
    enqueue(&mut queue, store.find_all_by_subject(root)?, 1);

    while let Some((statement, level)) = queue.pop_front() {
        if !visited.insert(statement.id.clone()) {
            continue;
        }
        if !config.is_whitelisted(&statement.object) {
            continue;
        }

        let expand = !config.is_blacklisted(&statement.object) && config.within_bounds(level + 1);
        let object = statement.object.id.clone();
        if config.emits_level(level) {
            bundle.statements.push(statement);
        }
        if expand {
            enqueue(&mut queue, store.find_all_by_subject(&object)?, level + 1);
        }
    }

    Ok(bundle)
}

/// Statements arrive in creation order and keep it within a level.
fn enqueue(queue: &mut VecDeque<(Statement, u32)>, statements: Vec<Statement>, level: u32) {
    queue.extend(statements.into_iter().map(|s| (s, level)));
}
