//! Integration tests for awswrap-storage.
//!
//! A stub `aws` script on a temporary PATH stands in for the real CLI, so
//! the shell runner, command lines and listing parser run end to end.

mod stub_cli;
