//! Per-workflow state container: `Idle -> Pending -> {Success, Error}`.

use serde::Deserialize;

/// What to do with a completion whose trigger has since been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Only the most recent trigger may settle the workflow.
    Discard,
    /// Whichever completion arrives last wins.
    Apply,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<T> {
    Idle,
    Pending,
    Success(T),
    Error(String),
}

#[derive(Debug)]
pub struct WorkflowSlot<T> {
    state: WorkflowState<T>,
    generation: u64,
    in_flight: usize,
}

impl<T> Default for WorkflowSlot<T> {
    fn default() -> Self {
        Self {
            state: WorkflowState::Idle,
            generation: 0,
            in_flight: 0,
        }
    }
}

impl<T: Clone> WorkflowSlot<T> {
    pub fn state(&self) -> &WorkflowState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, WorkflowState::Pending)
    }

    /// Calls started but not yet completed, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Moves to `Pending` from any state and returns the new generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight += 1;
        self.state = WorkflowState::Pending;
        self.generation
    }

    /// Settles the slot with a completed call.
    ///
    /// Returns `false` when the completion is stale and the policy drops it;
    /// the slot is left untouched in that case.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<T, String>,
        policy: StaleResponsePolicy,
    ) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if generation != self.generation && policy == StaleResponsePolicy::Discard {
            return false;
        }
        self.state = match outcome {
            Ok(value) => WorkflowState::Success(value),
            Err(message) => WorkflowState::Error(message),
        };
        true
    }
}
