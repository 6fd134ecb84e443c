//! In-memory graph store for testing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{IdBlockCounter, PublishedContentStore, StatementStore, StoreError, ThingStore};
use crate::types::{
    vocab, ContributorId, IdKind, PublishedContent, Statement, StatementId, Thing, ThingId,
};

/// Statement as persisted: endpoints by ID only.
#[derive(Debug, Clone)]
struct StoredStatement {
    id: StatementId,
    subject: ThingId,
    predicate: ThingId,
    object: ThingId,
    created_at: DateTime<Utc>,
    created_by: ContributorId,
}

#[derive(Debug, Default)]
struct GraphState {
    things: BTreeMap<ThingId, Thing>,
    statements: BTreeMap<StatementId, StoredStatement>,
    /// Subject -> statements.
    outgoing: BTreeMap<ThingId, BTreeSet<StatementId>>,
    /// Object -> statements.
    incoming: BTreeMap<ThingId, BTreeSet<StatementId>>,
    counters: [u64; 5],
    published: BTreeMap<ThingId, PublishedContent>,
    last_created_at: Option<DateTime<Utc>>,
}

impl GraphState {
    /// Strictly increasing creation timestamps, so creation order is total.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }

    fn materialize(&self, stored: &StoredStatement) -> Result<Statement, StoreError> {
        let thing = |id: &ThingId| {
            self.things
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::ThingNotFound(id.clone()))
        };
        Ok(Statement {
            id: stored.id.clone(),
            subject: thing(&stored.subject)?,
            predicate: thing(&stored.predicate)?,
            object: thing(&stored.object)?,
            created_at: stored.created_at,
            created_by: stored.created_by,
        })
    }

    fn is_referenced(&self, id: &ThingId) -> bool {
        let used = |index: &BTreeMap<ThingId, BTreeSet<StatementId>>| {
            index.get(id).is_some_and(|set| !set.is_empty())
        };
        used(&self.outgoing)
            || used(&self.incoming)
            || self.statements.values().any(|s| &s.predicate == id)
    }
}

/// In-memory graph store for testing.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order. Implements
/// every store port, including the ID block counter, behind a single
/// `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
    mutations: AtomicU64,
    increment_calls: AtomicU64,
    fail_increments: AtomicBool,
}

impl InMemoryGraph {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the built-in predicates and classes.
    pub fn with_vocabulary() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write();
            for thing in vocab::vocabulary() {
                state.things.insert(thing.id.clone(), thing);
            }
        }
        store
    }

    /// Insert a Thing directly, bypassing the ID check. Fixture helper.
    pub fn insert_thing(&self, thing: Thing) {
        self.state.write().things.insert(thing.id.clone(), thing);
    }

    /// Get number of Things.
    pub fn num_things(&self) -> usize {
        self.state.read().things.len()
    }

    /// Get number of statements.
    pub fn num_statements(&self) -> usize {
        self.state.read().statements.len()
    }

    /// Number of successful write calls so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Number of `increment_by` calls so far, failed ones included.
    pub fn increment_calls(&self) -> u64 {
        self.increment_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `increment_by` calls fail until reset.
    pub fn set_counter_unavailable(&self, unavailable: bool) {
        self.fail_increments.store(unavailable, Ordering::SeqCst);
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

impl ThingStore for InMemoryGraph {
    fn find_by_id(&self, id: &ThingId) -> Result<Option<Thing>, StoreError> {
        Ok(self.state.read().things.get(id).cloned())
    }

    fn exists(&self, id: &ThingId) -> Result<bool, StoreError> {
        Ok(self.state.read().things.contains_key(id))
    }

    fn create(&self, thing: Thing) -> Result<ThingId, StoreError> {
        let mut state = self.state.write();
        if state.things.contains_key(&thing.id) {
            return Err(StoreError::AlreadyExists(thing.id.to_string()));
        }
        let id = thing.id.clone();
        state.things.insert(id.clone(), thing);
        drop(state);
        self.mutated();
        Ok(id)
    }

    fn update(&self, thing: Thing) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let existing = state
            .things
            .get_mut(&thing.id)
            .ok_or_else(|| StoreError::ThingNotFound(thing.id.clone()))?;
        if !existing.modifiable {
            return Err(StoreError::NotModifiable(thing.id));
        }
        existing.label = thing.label;
        existing.classes = thing.classes;
        existing.modifiable = thing.modifiable;
        drop(state);
        self.mutated();
        Ok(())
    }

    fn delete(&self, id: &ThingId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let thing = state
            .things
            .get(id)
            .ok_or_else(|| StoreError::ThingNotFound(id.clone()))?;
        if !thing.modifiable {
            return Err(StoreError::NotModifiable(id.clone()));
        }
        if state.is_referenced(id) {
            return Err(StoreError::ThingInUse(id.clone()));
        }
        state.things.remove(id);
        state.outgoing.remove(id);
        state.incoming.remove(id);
        drop(state);
        self.mutated();
        Ok(())
    }

    fn count_incoming_statements(&self, id: &ThingId) -> Result<u64, StoreError> {
        Ok(self
            .state
            .read()
            .incoming
            .get(id)
            .map(|set| set.len() as u64)
            .unwrap_or(0))
    }
}

impl StatementStore for InMemoryGraph {
    fn create_statement(
        &self,
        id: StatementId,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ThingId,
        created_by: ContributorId,
    ) -> Result<StatementId, StoreError> {
        let mut state = self.state.write();
        if state.statements.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        for endpoint in [subject, predicate, object] {
            if !state.things.contains_key(endpoint) {
                return Err(StoreError::ThingNotFound(endpoint.clone()));
            }
        }

        let created_at = state.next_timestamp();
        state.outgoing.entry(subject.clone()).or_default().insert(id.clone());
        state.incoming.entry(object.clone()).or_default().insert(id.clone());
        state.statements.insert(
            id.clone(),
            StoredStatement {
                id: id.clone(),
                subject: subject.clone(),
                predicate: predicate.clone(),
                object: object.clone(),
                created_at,
                created_by,
            },
        );
        drop(state);
        self.mutated();
        Ok(id)
    }

    fn delete_all_by_id(&self, ids: &[StatementId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write();
        for id in ids {
            if let Some(stored) = state.statements.remove(id) {
                if let Some(set) = state.outgoing.get_mut(&stored.subject) {
                    set.remove(id);
                }
                if let Some(set) = state.incoming.get_mut(&stored.object) {
                    set.remove(id);
                }
            }
        }
        drop(state);
        self.mutated();
        Ok(())
    }

    fn find_statement(&self, id: &StatementId) -> Result<Option<Statement>, StoreError> {
        let state = self.state.read();
        state
            .statements
            .get(id)
            .map(|stored| state.materialize(stored))
            .transpose()
    }

    fn find_all_by_subject(&self, subject: &ThingId) -> Result<Vec<Statement>, StoreError> {
        let state = self.state.read();
        let mut result = state
            .outgoing
            .get(subject)
            .into_iter()
            .flatten()
            .filter_map(|id| state.statements.get(id))
            .map(|stored| state.materialize(stored))
            .collect::<Result<Vec<_>, _>>()?;
        crate::types::sort_by_creation(&mut result);
        Ok(result)
    }

    fn find_all_by_predicate_and_label(
        &self,
        predicate: &ThingId,
        label: &str,
    ) -> Result<Vec<Statement>, StoreError> {
        let state = self.state.read();
        let mut result = state
            .statements
            .values()
            .filter(|stored| &stored.predicate == predicate)
            .filter(|stored| state.things.get(&stored.object).is_some_and(|t| t.label == label))
            .map(|stored| state.materialize(stored))
            .collect::<Result<Vec<_>, _>>()?;
        crate::types::sort_by_creation(&mut result);
        Ok(result)
    }
}

impl IdBlockCounter for InMemoryGraph {
    fn current_value(&self, kind: IdKind) -> Result<u64, StoreError> {
        Ok(self.state.read().counters[kind.index()])
    }

    fn increment_by(&self, kind: IdKind, n: u64) -> Result<u64, StoreError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(StoreError::CounterUnavailable(format!("{kind} counter offline")));
        }
        let mut state = self.state.write();
        let counter = &mut state.counters[kind.index()];
        *counter += n;
        Ok(*counter)
    }
}

impl PublishedContentStore for InMemoryGraph {
    fn save_published(&self, content: PublishedContent) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.published.contains_key(&content.id) {
            return Err(StoreError::AlreadyExists(content.id.to_string()));
        }
        state.published.insert(content.id.clone(), content);
        drop(state);
        self.mutated();
        Ok(())
    }

    fn find_published(&self, id: &ThingId) -> Result<Option<PublishedContent>, StoreError> {
        Ok(self.state.read().published.get(id).cloned())
    }
}
