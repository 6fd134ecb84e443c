//! Property updaters for one subject and one predicate.

use tracing::debug;

use crate::error::ContentResult;
use crate::graph::GraphWriter;
use crate::store::ThingStore;
use crate::types::{ContributorId, Statement, StatementId, ThingId, ThingKind};

/// Keeps at most one statement per subject/predicate pair in sync with a
/// desired value.
pub struct SingleStatementPropertyUpdater<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> SingleStatementPropertyUpdater<'a> {
    /// Create an updater writing through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Make `subject --predicate--> literal(label)` hold exactly once.
    ///
    /// An existing literal is relabeled in place; surplus statements are
    /// deleted. Returns whether anything changed.
    pub fn update_required(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        label: &str,
        datatype: &str,
        actor: ContributorId,
    ) -> ContentResult<bool> {
        let mut statements = self.writer.outgoing_with(subject, predicate)?;
        if statements.is_empty() {
            let literal = self.writer.create_literal(label, datatype, actor)?;
            self.writer.add_statement(subject, predicate, &literal, actor)?;
            return Ok(true);
        }

        let surplus: Vec<Statement> = statements.drain(1..).collect();
        let mut changed = !surplus.is_empty();
        self.remove(&surplus)?;

        let current = &statements[0];
        if current.object.label != label {
            if current.object.kind == ThingKind::Literal && current.object.modifiable {
                self.writer.update_label(current.object_id(), label)?;
            } else {
                self.remove(std::slice::from_ref(current))?;
                let literal = self.writer.create_literal(label, datatype, actor)?;
                self.writer.add_statement(subject, predicate, &literal, actor)?;
            }
            changed = true;
        }
        Ok(changed)
    }

    /// Tri-state variant: `None` removes all matching statements.
    pub fn update_optional(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        label: Option<&str>,
        datatype: &str,
        actor: ContributorId,
    ) -> ContentResult<bool> {
        match label {
            Some(label) => self.update_required(subject, predicate, label, datatype, actor),
            None => {
                let statements = self.writer.outgoing_with(subject, predicate)?;
                if statements.is_empty() {
                    return Ok(false);
                }
                self.remove(&statements)?;
                Ok(true)
            }
        }
    }

    /// Delete statements, then their literal objects once unreferenced.
    fn remove(&self, statements: &[Statement]) -> ContentResult<()> {
        if statements.is_empty() {
            return Ok(());
        }
        let ids: Vec<StatementId> = statements.iter().map(|s| s.id.clone()).collect();
        self.writer.delete_statements(&ids)?;
        delete_orphan_literals(&self.writer, statements)?;
        Ok(())
    }
}

/// Keeps the ordered object list of one subject/predicate pair in sync.
///
/// The longest prefix of the desired list that appears in order among the
/// existing statements is kept; every other existing statement is deleted
/// and the rest of the desired list is appended. Since kept statements are
/// older than appended ones, creation order equals the desired order.
pub struct StatementCollectionPropertyUpdater<'a> {
    writer: GraphWriter<'a>,
}

impl<'a> StatementCollectionPropertyUpdater<'a> {
    /// Create an updater writing through `writer`.
    pub fn new(writer: GraphWriter<'a>) -> Self {
        Self { writer }
    }

    /// Sync to a list of existing objects. Returns whether anything changed.
    pub fn update(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        objects: &[ThingId],
        actor: ContributorId,
    ) -> ContentResult<bool> {
        let existing = self.writer.outgoing_with(subject, predicate)?;
        let (kept, stale) = split_matching_prefix(&existing, objects, |s, o| s.object_id() == o);
        if stale.is_empty() && kept == objects.len() {
            return Ok(false);
        }

        self.writer.delete_statements(&stale)?;
        for object in &objects[kept..] {
            self.writer.add_statement(subject, predicate, object, actor)?;
        }
        debug!(%subject, %predicate, kept, removed = stale.len(), added = objects.len() - kept, "Updated object list");
        Ok(true)
    }

    /// Sync to a list of literal values. Returns whether anything changed.
    pub fn update_literals(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        labels: &[String],
        datatype: &str,
        actor: ContributorId,
    ) -> ContentResult<bool> {
        let existing = self.writer.outgoing_with(subject, predicate)?;
        let (kept, stale) = split_matching_prefix(&existing, labels, |s, l| &s.object.label == l);
        if stale.is_empty() && kept == labels.len() {
            return Ok(false);
        }

        let removed: Vec<Statement> = existing
            .into_iter()
            .filter(|s| stale.contains(&s.id))
            .collect();
        self.writer.delete_statements(&stale)?;
        delete_orphan_literals(&self.writer, &removed)?;
        for label in &labels[kept..] {
            let literal = self.writer.create_literal(label, datatype, actor)?;
            self.writer.add_statement(subject, predicate, &literal, actor)?;
        }
        Ok(true)
    }
}

/// Greedily match `desired` in order against `existing`.
///
/// Returns the length of the matched desired prefix and the IDs of the
/// existing statements that are not part of the match.
fn split_matching_prefix<T>(
    existing: &[Statement],
    desired: &[T],
    matches: impl Fn(&Statement, &T) -> bool,
) -> (usize, Vec<StatementId>) {
    let mut kept = 0;
    let mut stale = Vec::new();
    for statement in existing {
        if kept < desired.len() && matches(statement, &desired[kept]) {
            kept += 1;
        } else {
            stale.push(statement.id.clone());
        }
    }
    (kept, stale)
}

/// Delete literal objects of removed statements that nothing references
/// anymore. Returns the number of literals deleted.
pub(crate) fn delete_orphan_literals(writer: &GraphWriter<'_>, removed: &[Statement]) -> ContentResult<usize> {
    let mut deleted = 0;
    for statement in removed {
        let object = &statement.object;
        if object.kind != ThingKind::Literal || !object.modifiable {
            continue;
        }
        if writer.store().count_incoming_statements(&object.id)? == 0 {
            writer.delete_thing(&object.id)?;
            deleted += 1;
        }
    }
    Ok(deleted)
}
