//! Athena query runner.
//!
//! Provides [`AthenaClient`] for running batches of SQL statements: every
//! query is submitted up front, then a single sequential loop polls the
//! pending executions until each one reaches a terminal state, and results
//! are materialized from S3 exactly once per succeeded execution.

use std::sync::Arc;

use awswrap_core::s3path;
use serde::Serialize;
use tracing::{debug, info, info_span, Instrument, Span};

use crate::aws::AwsSessionFactory;
use crate::config::AthenaSettings;
use crate::decode::{decode_csv, decode_text, ReadOptions, TypeHints};
use crate::error::AthenaError;
use crate::result::QueryOutput;
use crate::service::{ExecutionStatus, QuerySubmission, Session, SessionFactory};
use crate::state::{ExecutionState, PollSet, Slot};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for data queries.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Overrides the configured default database.
    pub database: Option<String>,
    /// Return the output location instead of fetching the data.
    pub return_paths: bool,
    /// Passed through to the CSV reader.
    pub read: ReadOptions,
}

/// How a succeeded execution is turned into a result.
#[derive(Debug, Clone, Copy)]
pub enum Materialize<'a> {
    Data {
        return_paths: bool,
        /// Per-query hints by submission index; missing entries mean "infer".
        dtypes: &'a [Option<TypeHints>],
        read: &'a ReadOptions,
    },
    Statement,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Final record of one submission.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub query: String,
    pub execution_id: String,
    pub state: Option<ExecutionState>,
    /// `None` when the execution failed and errors are not raised.
    pub result: Option<QueryOutput>,
}

/// Outcome of a batch, in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub records: Vec<ExecutionRecord>,
}

impl BatchReport {
    pub fn into_results(self) -> Vec<Option<QueryOutput>> {
        self.records.into_iter().map(|r| r.result).collect()
    }

    /// Records that ended in a failure state.
    pub fn failed(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records
            .iter()
            .filter(|r| r.state.as_ref().is_some_and(ExecutionState::is_failure))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Runs SQL against Athena and materializes the results.
///
/// Every call opens its own session through the [`SessionFactory`]; nothing
/// is pooled or shared between calls.
pub struct AthenaClient {
    settings: AthenaSettings,
    factory: Arc<dyn SessionFactory>,
    span: Span,
}

impl AthenaClient {
    /// Client backed by the AWS SDK.
    pub fn new(settings: AthenaSettings) -> Self {
        Self::with_factory(settings, Arc::new(AwsSessionFactory))
    }

    pub fn with_factory(mut settings: AthenaSettings, factory: Arc<dyn SessionFactory>) -> Self {
        settings.rebuild();
        let span = info_span!("athena", region = %settings.region);
        Self {
            settings,
            factory,
            span,
        }
    }

    /// Replace the span all log events of this client are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn settings(&self) -> &AthenaSettings {
        &self.settings
    }

    /// Mutable settings; call [`AthenaSettings::rebuild`] after changing transport fields.
    pub fn settings_mut(&mut self) -> &mut AthenaSettings {
        &mut self.settings
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Run one data query.
    pub async fn run_query(
        &self,
        query: &str,
        options: &QueryOptions,
        dtype: Option<TypeHints>,
    ) -> Result<Option<QueryOutput>, AthenaError> {
        let dtypes = [dtype];
        let mut results = self.run_queries(&[query], options, &dtypes).await?;
        Ok(results.pop().flatten())
    }

    /// Run several data queries; results come back in input order.
    pub async fn run_queries(
        &self,
        queries: &[&str],
        options: &QueryOptions,
        dtypes: &[Option<TypeHints>],
    ) -> Result<Vec<Option<QueryOutput>>, AthenaError> {
        let mode = Materialize::Data {
            return_paths: options.return_paths,
            dtypes,
            read: &options.read,
        };
        let report = self
            .execute_batch(queries, options.database.as_deref(), mode)
            .await?;
        Ok(report.into_results())
    }

    /// Run one statement and return its message (`""` when there is none).
    pub async fn run_nonquery(
        &self,
        query: &str,
        database: Option<&str>,
    ) -> Result<Option<String>, AthenaError> {
        let mut results = self.run_nonqueries(&[query], database).await?;
        Ok(results.pop().flatten())
    }

    /// Run several statements; messages come back in input order.
    pub async fn run_nonqueries(
        &self,
        queries: &[&str],
        database: Option<&str>,
    ) -> Result<Vec<Option<String>>, AthenaError> {
        let report = self
            .execute_batch(queries, database, Materialize::Statement)
            .await?;
        Ok(report
            .into_results()
            .into_iter()
            .map(|r| r.and_then(QueryOutput::into_message))
            .collect())
    }

    /// Submit, poll and materialize a batch, returning every record.
    pub async fn execute_batch(
        &self,
        queries: &[&str],
        database: Option<&str>,
        mode: Materialize<'_>,
    ) -> Result<BatchReport, AthenaError> {
        self.execute(queries, database, mode)
            .instrument(self.span.clone())
            .await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn execute(
        &self,
        queries: &[&str],
        database: Option<&str>,
        mode: Materialize<'_>,
    ) -> Result<BatchReport, AthenaError> {
        let database = database
            .map(str::to_string)
            .or_else(|| self.settings.database.clone());
        let output_location = self.settings.output_location();

        let session = self.factory.open(&self.settings).await?;

        // 1. Submit everything up front, preserving input order.
        let mut poll_set: PollSet<QueryOutput> = PollSet::with_capacity(queries.len());
        for query in queries {
            let submission = QuerySubmission {
                query: query.to_string(),
                database: database.clone(),
                output_location: output_location.clone(),
                workgroup: self.settings.workgroup.clone(),
            };
            let execution_id = session.queries.start_query(&submission).await?;
            info!(
                execution_id = %execution_id,
                database = ?submission.database,
                workgroup = ?submission.workgroup,
                "query submitted"
            );
            poll_set.push(*query, execution_id);
        }

        // 2. Poll pending executions until none is queued, running or unobserved.
        while poll_set.keep_polling() {
            for index in poll_set.pending() {
                let execution_id = poll_set.entry(index).execution_id.clone();
                let status = session.queries.get_execution(&execution_id).await?;
                let state = status.state();
                debug!(execution_id = %execution_id, state = %state, "polled query status");
                poll_set.observe(index, state.clone());

                match state {
                    ExecutionState::Succeeded => {
                        info!(status = %status.to_json(), "query succeeded");
                        let output = self
                            .materialize(&session, poll_set.entry(index).query.as_str(), &status, index, mode)
                            .await?;
                        poll_set.resolve(index, Some(output));
                    }
                    ExecutionState::Queued | ExecutionState::Running => {}
                    _ => {
                        let err = AthenaError::QueryFailed {
                            state: state.to_string(),
                            execution_id,
                            query: poll_set.entry(index).query.clone(),
                            status: status.to_json(),
                        };
                        if self.settings.error_as_exception {
                            return Err(err);
                        }
                        debug!("{err}");
                        poll_set.resolve(index, None);
                    }
                }
            }

            if poll_set.keep_polling() {
                tokio::time::sleep(self.settings.polling_interval).await;
            }
        }

        // 3. Every slot is resolved here; collect in submission order.
        let records = poll_set
            .finish()?
            .into_iter()
            .map(|entry| ExecutionRecord {
                query: entry.query,
                execution_id: entry.execution_id,
                state: entry.state,
                result: match entry.slot {
                    Slot::Resolved(value) => value,
                    Slot::Pending => None,
                },
            })
            .collect();

        Ok(BatchReport { records })
    }

    /// Fetch and decode the result of one succeeded execution.
    async fn materialize(
        &self,
        session: &Session,
        query: &str,
        status: &ExecutionStatus,
        index: usize,
        mode: Materialize<'_>,
    ) -> Result<QueryOutput, AthenaError> {
        let location = status
            .output_location
            .as_deref()
            .ok_or_else(|| AthenaError::MissingOutputLocation {
                execution_id: status.execution_id.clone(),
            })?;

        match mode {
            Materialize::Data {
                return_paths: true, ..
            } => Ok(QueryOutput::Path(location.to_string())),
            Materialize::Data { dtypes, read, .. } => {
                let data = fetch(session, location).await?;
                let hints = dtypes.get(index).and_then(Option::as_ref);
                let table = decode_csv(&data, hints, read)?;
                debug!(
                    rows = table.row_count(),
                    columns = table.column_count(),
                    "decoded query result"
                );
                Ok(QueryOutput::Table(table))
            }
            Materialize::Statement => {
                let message = decode_text(&fetch(session, location).await?)?;
                if !message.is_empty()
                    && self.settings.error_as_exception
                    && self.settings.non_query_message_as_exception
                {
                    return Err(AthenaError::StatementMessage {
                        execution_id: status.execution_id.clone(),
                        query: query.to_string(),
                        message,
                    });
                }
                Ok(QueryOutput::Message(message))
            }
        }
    }
}

async fn fetch(session: &Session, location: &str) -> Result<bytes::Bytes, AthenaError> {
    let (bucket, key) = s3path::bucket_and_key(location);
    debug!(bucket = %bucket, key = %key, "fetching result object");
    session.objects.fetch_object(&bucket, &key).await
}

// ---------------------------------------------------------------------------
// Tests: in-memory provider, no AWS calls
// ---------------------------------------------------------------------------
