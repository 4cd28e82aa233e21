use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The command exited with a non-zero status.
    #[error("command failed (exit code {exit_code:?}): {command}\n{output}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// The shell could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
