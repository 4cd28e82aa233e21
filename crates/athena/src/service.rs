//! Provider seams: the query service, the object store, and the factory
//! that opens a fresh pair of them per call.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::config::AthenaSettings;
use crate::error::AthenaError;
use crate::state::ExecutionState;

/// One query as handed to Athena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySubmission {
    pub query: String,
    pub database: Option<String>,
    pub output_location: Option<String>,
    pub workgroup: Option<String>,
}

/// Snapshot returned by a status check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionStatus {
    pub execution_id: String,
    /// Raw provider state, e.g. `"RUNNING"`.
    pub state: Option<String>,
    pub state_change_reason: Option<String>,
    pub output_location: Option<String>,
    pub bytes_scanned: u64,
    pub execution_time_ms: u64,
}

impl ExecutionStatus {
    /// Parsed state. A response without a state counts as still queued.
    pub fn state(&self) -> ExecutionState {
        self.state
            .as_deref()
            .map(ExecutionState::from_provider)
            .unwrap_or(ExecutionState::Queued)
    }

    /// JSON rendering used in logs and error payloads.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submit a query and return its execution id.
    async fn start_query(&self, submission: &QuerySubmission) -> Result<String, AthenaError>;

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionStatus, AthenaError>;
}

#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError>;
}

/// Clients scoped to a single `run_*` call.
pub struct Session {
    pub queries: Box<dyn QueryService>,
    pub objects: Box<dyn ObjectFetcher>,
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, settings: &AthenaSettings) -> Result<Session, AthenaError>;
}
