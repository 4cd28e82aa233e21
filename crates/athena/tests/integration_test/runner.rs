//! End-to-end runs of the query runner against the in-memory provider.

use std::sync::Arc;
use std::time::Duration;

use awswrap_athena::testing::{FakeProvider, Script};
use awswrap_athena::*;

fn client(provider: &FakeProvider) -> AthenaClient {
    let settings = AthenaSettings::default()
        .with_database("dummy_database")
        .with_workplace("s3://bucket/athena/")
        .with_polling_interval(Duration::ZERO);
    AthenaClient::with_factory(settings, Arc::new(provider.clone()))
}

#[tokio::test]
async fn mixed_batch_report_keeps_submission_order() {
    let provider = FakeProvider::default();
    provider.script(Script::succeeds_after(2, "s3://bucket/athena/a.csv"));
    provider.script(Script::ends_in("CANCELLED"));
    provider.script(Script::succeeds_after(0, "s3://bucket/athena/c.csv"));
    provider.put_object("bucket", "athena/a.csv", "x,y\n1,a\n2,b\n");
    provider.put_object("bucket", "athena/c.csv", "total\n3.5\n");

    let mut c = client(&provider);
    c.settings_mut().error_as_exception = false;

    let dtypes: Vec<Option<TypeHints>> = Vec::new();
    let read = ReadOptions::default();
    let report = c
        .execute_batch(
            &["SELECT a", "SELECT b", "SELECT c"],
            None,
            Materialize::Data {
                return_paths: false,
                dtypes: &dtypes,
                read: &read,
            },
        )
        .await
        .unwrap();

    let ids: Vec<&str> = report.records.iter().map(|r| r.execution_id.as_str()).collect();
    assert_eq!(ids, vec!["exec-0", "exec-1", "exec-2"]);
    assert_eq!(report.records[1].state, Some(ExecutionState::Cancelled));
    assert_eq!(report.failed().count(), 1);

    let results = report.into_results();
    let a = results[0].as_ref().and_then(QueryOutput::as_table).unwrap();
    assert_eq!(a.get_value(1, "y").and_then(Cell::as_str), Some("b"));
    let c = results[2].as_ref().and_then(QueryOutput::as_table).unwrap();
    assert_eq!(c.get_value(0, "total").and_then(Cell::as_f64), Some(3.5));
}

#[tokio::test]
async fn report_serializes_for_cli_output() {
    let provider = FakeProvider::default();
    provider.script(Script::succeeds_after(0, "s3://bucket/athena/s.txt"));
    provider.put_object("bucket", "athena/s.txt", "");

    let report = client(&provider)
        .execute_batch(&["MSCK REPAIR TABLE t"], None, Materialize::Statement)
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records"][0]["state"], "SUCCEEDED");
    assert_eq!(json["records"][0]["result"]["kind"], "message");
    assert_eq!(json["records"][0]["result"]["value"], "");
}

#[tokio::test]
async fn submission_error_propagates() {
    // No script queued: the fake rejects the submission.
    let provider = FakeProvider::default();
    let err = client(&provider).run_nonquery("DROP TABLE t", None).await.unwrap_err();
    assert!(matches!(err, AthenaError::Submission { .. }));
}

#[tokio::test]
async fn missing_result_object_surfaces_as_sdk_error() {
    let provider = FakeProvider::default();
    provider.script(Script::succeeds_after(0, "s3://bucket/athena/gone.csv"));

    let err = client(&provider)
        .run_query("SELECT 1", &QueryOptions::default(), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("NoSuchKey"));
}
