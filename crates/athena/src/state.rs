//! Execution states and the per-batch poll set.

use std::fmt;

use serde::Serialize;

use crate::error::AthenaError;

/// Execution state reported by Athena for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Any state this crate does not recognize; treated as a failure.
    Other(String),
}

impl ExecutionState {
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Other(raw) => raw,
        }
    }

    /// No further change will be observed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }

    /// Terminal and not a success.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Other(_))
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExecutionState> for String {
    fn from(state: ExecutionState) -> Self {
        state.as_str().to_string()
    }
}

/// `true` while any entry is unobserved (`None`), queued or running.
pub fn keep_polling<'a, I>(states: I) -> bool
where
    I: IntoIterator<Item = &'a Option<ExecutionState>>,
{
    states.into_iter().any(|state| match state {
        None => true,
        Some(state) => !state.is_terminal(),
    })
}

// ── PollSet ──────────────────────────────────────────────────────

/// Result slot of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Pending,
    /// Final value; `None` marks a failed execution when errors are not raised.
    Resolved(Option<T>),
}

/// One submitted query tracked across poll cycles.
#[derive(Debug, Clone)]
pub struct PollEntry<T> {
    pub query: String,
    pub execution_id: String,
    pub state: Option<ExecutionState>,
    pub slot: Slot<T>,
}

/// Fixed-size, submission-ordered state of one `run_*` call.
#[derive(Debug, Clone)]
pub struct PollSet<T> {
    entries: Vec<PollEntry<T>>,
}

impl<T> Default for PollSet<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> PollSet<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Track a freshly submitted query; returns its index.
    pub fn push(&mut self, query: impl Into<String>, execution_id: impl Into<String>) -> usize {
        self.entries.push(PollEntry {
            query: query.into(),
            execution_id: execution_id.into(),
            state: None,
            slot: Slot::Pending,
        });
        self.entries.len() - 1
    }

    pub fn entry(&self, index: usize) -> &PollEntry<T> {
        &self.entries[index]
    }

    pub fn keep_polling(&self) -> bool {
        keep_polling(self.entries.iter().map(|e| &e.state))
    }

    /// Indices whose slot is still pending, in submission order.
    pub fn pending(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e.slot, Slot::Pending))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn observe(&mut self, index: usize, state: ExecutionState) {
        self.entries[index].state = Some(state);
    }

    /// Store the final value of a slot. A slot resolves once; later calls are ignored.
    pub fn resolve(&mut self, index: usize, value: Option<T>) -> bool {
        let entry = &mut self.entries[index];
        if matches!(entry.slot, Slot::Pending) {
            entry.slot = Slot::Resolved(value);
            true
        } else {
            false
        }
    }

    /// Consume the set once every slot is resolved.
    pub fn finish(self) -> Result<Vec<PollEntry<T>>, AthenaError> {
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| matches!(e.slot, Slot::Pending))
        {
            return Err(AthenaError::Unresolved { index });
        }
        Ok(self.entries)
    }
}
