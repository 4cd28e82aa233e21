//! AWS SDK implementations of the provider seams.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use bytes::Bytes;
use tracing::debug;

use crate::config::{AthenaSettings, TransportConfig};
use crate::error::AthenaError;
use crate::service::{
    ExecutionStatus, ObjectFetcher, QueryService, QuerySubmission, Session, SessionFactory,
};

/// Opens a fresh Athena + S3 client pair from the settings on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsSessionFactory;

#[async_trait]
impl SessionFactory for AwsSessionFactory {
    async fn open(&self, settings: &AthenaSettings) -> Result<Session, AthenaError> {
        let sdk_config = load_sdk_config(settings).await;
        debug!(
            region = %settings.region,
            profile = ?settings.profile,
            "opened AWS session"
        );
        Ok(Session {
            queries: Box::new(AwsQueryService::new(aws_sdk_athena::Client::new(
                &sdk_config,
            ))),
            objects: Box::new(AwsObjectFetcher::new(aws_sdk_s3::Client::new(&sdk_config))),
        })
    }
}

async fn load_sdk_config(settings: &AthenaSettings) -> aws_config::SdkConfig {
    let region = aws_sdk_athena::config::Region::new(settings.region.clone());
    let transport = settings.transport();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .timeout_config(
            TimeoutConfig::builder()
                .connect_timeout(transport.connect_timeout)
                .read_timeout(transport.read_timeout)
                .build(),
        )
        .retry_config(retry_config(transport));
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// `max_attempts` counts retries, the SDK counts total attempts.
fn retry_config(transport: &TransportConfig) -> RetryConfig {
    if transport.max_attempts == 0 {
        RetryConfig::disabled()
    } else {
        RetryConfig::standard().with_max_attempts(transport.max_attempts.saturating_add(1))
    }
}

// ── Athena ───────────────────────────────────────────────────────

pub struct AwsQueryService {
    client: aws_sdk_athena::Client,
}

impl AwsQueryService {
    pub fn new(client: aws_sdk_athena::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryService for AwsQueryService {
    async fn start_query(&self, submission: &QuerySubmission) -> Result<String, AthenaError> {
        let mut ctx = aws_sdk_athena::types::QueryExecutionContext::builder();
        if let Some(database) = &submission.database {
            ctx = ctx.database(database);
        }

        let mut request = self
            .client
            .start_query_execution()
            .query_string(&submission.query)
            .query_execution_context(ctx.build())
            .set_work_group(submission.workgroup.clone());
        if let Some(location) = &submission.output_location {
            request = request.result_configuration(
                aws_sdk_athena::types::ResultConfiguration::builder()
                    .output_location(location)
                    .build(),
            );
        }

        let resp = request.send().await.map_err(|e| AthenaError::Submission {
            query: submission.query.clone(),
            reason: e.to_string(),
        })?;

        resp.query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| AthenaError::Submission {
                query: submission.query.clone(),
                reason: "no query execution id returned".into(),
            })
    }

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionStatus, AthenaError> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let qe = resp
            .query_execution()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?;

        Ok(extract_status(execution_id, qe))
    }
}

fn extract_status(
    execution_id: &str,
    qe: &aws_sdk_athena::types::QueryExecution,
) -> ExecutionStatus {
    let stats = qe.statistics();
    let status = qe.status();

    ExecutionStatus {
        execution_id: execution_id.to_string(),
        state: status
            .and_then(|s| s.state())
            .map(|s| s.as_str().to_string()),
        state_change_reason: status
            .and_then(|s| s.state_change_reason())
            .map(str::to_string),
        output_location: qe
            .result_configuration()
            .and_then(|rc| rc.output_location())
            .map(str::to_string),
        bytes_scanned: stats
            .and_then(|s| s.data_scanned_in_bytes())
            .unwrap_or(0)
            .max(0) as u64,
        execution_time_ms: stats
            .and_then(|s| s.engine_execution_time_in_millis())
            .unwrap_or(0)
            .max(0) as u64,
    }
}

// ── S3 ───────────────────────────────────────────────────────────

pub struct AwsObjectFetcher {
    client: aws_sdk_s3::Client,
}

impl AwsObjectFetcher {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectFetcher for AwsObjectFetcher {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(format!("get s3://{bucket}/{key}: {e}")))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| AthenaError::AwsSdk(format!("read s3://{bucket}/{key}: {e}")))?;
        Ok(body.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn zero_attempts_disables_retries() {
        let transport = TransportConfig::default();
        assert_eq!(retry_config(&transport).max_attempts(), 1);
    }

    #[test]
    fn attempts_count_retries_after_first_call() {
        let transport = TransportConfig {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(1),
            max_attempts: 4,
        };
        assert_eq!(retry_config(&transport).max_attempts(), 5);
    }

    #[test]
    fn status_extracted_from_sdk_execution() {
        use aws_sdk_athena::types::{
            QueryExecution, QueryExecutionState, QueryExecutionStatistics, QueryExecutionStatus,
            ResultConfiguration,
        };

        let qe = QueryExecution::builder()
            .status(
                QueryExecutionStatus::builder()
                    .state(QueryExecutionState::Failed)
                    .state_change_reason("SYNTAX_ERROR")
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location("s3://bucket/out/q-1.csv")
                    .build(),
            )
            .statistics(
                QueryExecutionStatistics::builder()
                    .data_scanned_in_bytes(2048)
                    .engine_execution_time_in_millis(150)
                    .build(),
            )
            .build();

        let status = extract_status("q-1", &qe);
        assert_eq!(status.state.as_deref(), Some("FAILED"));
        assert_eq!(status.state_change_reason.as_deref(), Some("SYNTAX_ERROR"));
        assert_eq!(status.output_location.as_deref(), Some("s3://bucket/out/q-1.csv"));
        assert_eq!(status.bytes_scanned, 2048);
        assert_eq!(status.execution_time_ms, 150);
    }
}
