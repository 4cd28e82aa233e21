pub mod config;
pub mod s3path;

pub use config::{load_dotenv, EnvProfile};
pub use s3path::PathPart;
