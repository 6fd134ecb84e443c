//! Step pipelines for content operations.
//!
//! An operation is an ordered list of [`Action`]s folded over an immutable
//! command and a state value. Each step receives the state produced by the
//! previous one and returns a new state.
//!
//! ## Failure Semantics
//!
//! The first failing step aborts the pipeline and its error is returned
//! unchanged. Store mutations made by earlier steps are not undone;
//! atomicity across steps is the store's responsibility.

use tracing::{debug, info_span, warn};

use crate::error::ContentError;

/// One step of a pipeline.
pub trait Action<C, S> {
    /// Step name, used in logs.
    fn name(&self) -> &str;

    /// Apply the step to the current state.
    fn apply(&self, command: &C, state: S) -> Result<S, ContentError>;
}

/// A closure with a name.
pub struct NamedStep<F> {
    name: String,
    f: F,
}

impl<F> NamedStep<F> {
    /// Wrap a closure as a named step.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<C, S, F> Action<C, S> for NamedStep<F>
where
    F: Fn(&C, S) -> Result<S, ContentError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, command: &C, state: S) -> Result<S, ContentError> {
        (self.f)(command, state)
    }
}

/// Named, ordered list of actions.
pub struct ActionPipeline<'a, C, S> {
    name: &'static str,
    steps: Vec<Box<dyn Action<C, S> + 'a>>,
}

impl<'a, C, S> ActionPipeline<'a, C, S> {
    /// Create an empty pipeline.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append an action.
    pub fn then(mut self, action: impl Action<C, S> + 'a) -> Self {
        self.steps.push(Box::new(action));
        self
    }

    /// Append a named closure.
    pub fn step<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&C, S) -> Result<S, ContentError> + 'a,
        C: 'a,
        S: 'a,
    {
        self.then(NamedStep::new(name, f))
    }

    /// Pipeline name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run all steps in order.
    pub fn execute(&self, command: &C, initial: S) -> Result<S, ContentError> {
        let span = info_span!("pipeline", name = self.name, steps = self.steps.len());
        let _enter = span.enter();

        self.steps.iter().try_fold(initial, |state, step| {
            debug!(step = step.name(), "Applying step");
            step.apply(command, state).map_err(|e| {
                warn!(step = step.name(), error = %e, "Step failed");
                e
            })
        })
    }
}
