//! Per-operation busy tracking
//!
//! Each long-running studio operation moves `Idle -> InFlight` when it starts
//! and leaves `InFlight` on every exit path through the [`InFlight`] guard.

use std::collections::HashMap;
use std::sync::Mutex;

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::debug;

use super::error::StudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    Script,
    Audio,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl OperationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OperationState::InFlight)
    }
}

pub struct OperationTracker {
    states: Mutex<HashMap<OperationKind, OperationState>>,
}

impl Default for OperationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationTracker {
    pub fn new() -> Self {
        let states = OperationKind::iter()
            .map(|kind| (kind, OperationState::Idle))
            .collect();
        Self {
            states: Mutex::new(states),
        }
    }

    pub fn state(&self, kind: OperationKind) -> OperationState {
        self.states
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_busy(&self, kind: OperationKind) -> bool {
        self.state(kind).is_in_flight()
    }

    /// Move `kind` to `InFlight`, or fail with `Busy` if it already is
    pub fn begin(&self, kind: OperationKind) -> Result<InFlight<'_>, StudioError> {
        let mut states = self.states.lock().unwrap();
        let state = states.entry(kind).or_default();
        if state.is_in_flight() {
            return Err(StudioError::Busy(kind));
        }
        *state = OperationState::InFlight;
        debug!(%kind, "Operation started");
        Ok(InFlight {
            tracker: self,
            kind,
            settled: false,
        })
    }

    fn settle(&self, kind: OperationKind, outcome: OperationState) {
        debug!(%kind, ?outcome, "Operation settled");
        self.states.lock().unwrap().insert(kind, outcome);
    }
}

/// Marks an operation in flight until settled or dropped. Dropping an
/// unsettled guard records the operation as cancelled.
#[must_use]
pub struct InFlight<'a> {
    tracker: &'a OperationTracker,
    kind: OperationKind,
    settled: bool,
}

impl InFlight<'_> {
    pub fn succeed(mut self) {
        self.settled = true;
        self.tracker.settle(self.kind, OperationState::Succeeded);
    }

    pub fn fail(mut self, reason: impl Into<String>) {
        self.settled = true;
        self.tracker
            .settle(self.kind, OperationState::Failed(reason.into()));
    }

    /// Settle from a result, passing it through
    pub fn finish<T>(self, result: Result<T, StudioError>) -> Result<T, StudioError> {
        match &result {
            Ok(_) => self.succeed(),
            Err(e) => self.fail(e.to_string()),
        }
        result
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker
                .settle(self.kind, OperationState::Failed("cancelled".to_string()));
        }
    }
}
