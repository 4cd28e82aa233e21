//! Integration tests for awswrap-athena.
//!
//! Everything here runs against the in-memory provider; no AWS credentials needed.

mod runner;
mod settings;
