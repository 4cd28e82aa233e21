pub mod client;
pub mod command;
pub mod error;
pub mod listing;

pub use client::{CopyOptions, S3CliClient};
pub use command::{CommandOutput, CommandRunner, ShellRunner};
pub use error::StorageError;
pub use listing::{parse_listing, parse_listing_line, Listing, ListingEntry};
