//! In-memory provider for exercising [`AthenaClient`](crate::AthenaClient)
//! without AWS.
//!
//! Each submission takes the next queued [`Script`] and is assigned the id
//! `exec-{n}`. Status checks walk the script's states; the last one repeats
//! once the script is exhausted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::AthenaSettings;
use crate::error::AthenaError;
use crate::service::{
    ExecutionStatus, ObjectFetcher, QueryService, QuerySubmission, Session, SessionFactory,
};

/// Scripted lifecycle of one submission.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub states: Vec<String>,
    pub output_location: Option<String>,
}

impl Script {
    /// `pending` non-terminal polls (QUEUED, then RUNNING), then SUCCEEDED.
    pub fn succeeds_after(pending: usize, output_location: &str) -> Self {
        let mut states: Vec<String> = (0..pending)
            .map(|i| if i == 0 { "QUEUED" } else { "RUNNING" }.to_string())
            .collect();
        states.push("SUCCEEDED".to_string());
        Self {
            states,
            output_location: Some(output_location.to_string()),
        }
    }

    /// Terminates in `state` on the first poll.
    pub fn ends_in(state: &str) -> Self {
        Self {
            states: vec![state.to_string()],
            output_location: None,
        }
    }
}

#[derive(Default)]
struct Inner {
    scripts: Vec<Script>,
    running: HashMap<String, (Script, usize)>,
    submissions: Vec<QuerySubmission>,
    status_calls: HashMap<String, usize>,
    objects: HashMap<(String, String), Bytes>,
    fetch_calls: HashMap<(String, String), usize>,
    sessions: usize,
    next_id: usize,
}

/// Shared handle; clones see the same state.
#[derive(Clone, Default)]
pub struct FakeProvider {
    inner: Arc<Mutex<Inner>>,
}

impl FakeProvider {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue the script for the next submission.
    pub fn script(&self, script: Script) {
        self.lock().scripts.push(script);
    }

    pub fn put_object(&self, bucket: &str, key: &str, body: &str) {
        self.lock().objects.insert(
            (bucket.to_string(), key.to_string()),
            Bytes::copy_from_slice(body.as_bytes()),
        );
    }

    pub fn submissions(&self) -> Vec<QuerySubmission> {
        self.lock().submissions.clone()
    }

    pub fn submitted_queries(&self) -> Vec<String> {
        self.lock()
            .submissions
            .iter()
            .map(|s| s.query.clone())
            .collect()
    }

    pub fn status_calls(&self, execution_id: &str) -> usize {
        self.lock().status_calls.get(execution_id).copied().unwrap_or(0)
    }

    pub fn fetch_calls(&self, bucket: &str, key: &str) -> usize {
        self.lock()
            .fetch_calls
            .get(&(bucket.to_string(), key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions
    }
}

#[async_trait]
impl SessionFactory for FakeProvider {
    async fn open(&self, _settings: &AthenaSettings) -> Result<Session, AthenaError> {
        self.lock().sessions += 1;
        Ok(Session {
            queries: Box::new(self.clone()),
            objects: Box::new(self.clone()),
        })
    }
}

#[async_trait]
impl QueryService for FakeProvider {
    async fn start_query(&self, submission: &QuerySubmission) -> Result<String, AthenaError> {
        let mut inner = self.lock();
        if inner.scripts.is_empty() {
            return Err(AthenaError::Submission {
                query: submission.query.clone(),
                reason: "no script queued".into(),
            });
        }
        let script = inner.scripts.remove(0);
        let execution_id = format!("exec-{}", inner.next_id);
        inner.next_id += 1;
        inner.submissions.push(submission.clone());
        inner.running.insert(execution_id.clone(), (script, 0));
        Ok(execution_id)
    }

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionStatus, AthenaError> {
        let mut inner = self.lock();
        *inner.status_calls.entry(execution_id.to_string()).or_default() += 1;
        let (script, cursor) = inner
            .running
            .get_mut(execution_id)
            .ok_or_else(|| AthenaError::AwsSdk(format!("unknown execution {execution_id}")))?;

        let state = script
            .states
            .get(*cursor)
            .or_else(|| script.states.last())
            .cloned();
        *cursor += 1;

        Ok(ExecutionStatus {
            execution_id: execution_id.to_string(),
            state,
            output_location: script.output_location.clone(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ObjectFetcher for FakeProvider {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError> {
        let mut inner = self.lock();
        let id = (bucket.to_string(), key.to_string());
        *inner.fetch_calls.entry(id.clone()).or_default() += 1;
        inner
            .objects
            .get(&id)
            .cloned()
            .ok_or_else(|| AthenaError::AwsSdk(format!("NoSuchKey: s3://{bucket}/{key}")))
    }
}
