use thiserror::Error;

/// Errors raised by the query runner.
///
/// `QueryFailed` and `StatementMessage` are the two "query call" failures:
/// both carry the query text, the execution id and the status payload so a
/// caller can diagnose the statement without re-polling Athena.
#[derive(Error, Debug)]
pub enum AthenaError {
    /// Athena rejected the submission itself.
    #[error("failed to submit query: {reason}\n{query}")]
    Submission { query: String, reason: String },

    /// The execution ended in FAILED, CANCELLED or an unrecognized state.
    #[error("Athena query {state}, {execution_id}: {query}\n{status}")]
    QueryFailed {
        state: String,
        execution_id: String,
        query: String,
        status: String,
    },

    /// A non-query statement succeeded but left a message in its output.
    #[error("Athena query SUCCEEDED, {execution_id}: {query}\nResult has a message: {message}")]
    StatementMessage {
        execution_id: String,
        query: String,
        message: String,
    },

    /// A succeeded execution reported no output location.
    #[error("query {execution_id} succeeded without an output location")]
    MissingOutputLocation { execution_id: String },

    /// The poll loop ended with a slot that never resolved.
    #[error("query at index {index} was never resolved")]
    Unresolved { index: usize },

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// The fetched result could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}
