pub mod aws;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod result;
pub mod service;
pub mod state;

/// In-memory provider for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aws::AwsSessionFactory;
pub use client::{AthenaClient, BatchReport, ExecutionRecord, Materialize, QueryOptions};
pub use config::{AthenaSettings, TransportConfig};
pub use decode::{decode_csv, decode_text, ReadOptions, TypeHints};
pub use error::AthenaError;
pub use result::{Cell, ColumnType, QueryOutput, Table, TableColumn};
pub use service::{ExecutionStatus, QuerySubmission, Session, SessionFactory};
pub use state::ExecutionState;
