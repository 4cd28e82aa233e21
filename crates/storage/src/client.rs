//! Thin wrapper over the `aws s3` command line.
//!
//! [`S3CliClient`] builds `cp`/`ls` command lines, runs them through a
//! [`CommandRunner`] and records the exit code and command line of the
//! most recent call.

use std::sync::Arc;

use awswrap_core::s3path;
use tracing::{debug, info_span, warn, Instrument, Span};

use crate::command::{CommandOutput, CommandRunner, ShellRunner};
use crate::error::StorageError;
use crate::listing::{parse_listing, Listing};

const IGNORED_FILTERS_WARNING: &str =
    "WARNING: Keywords `exclude` or `include` should be used in `recursive` mode. These options are ignored.";

/// Options for [`S3CliClient::download`] and [`S3CliClient::upload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub recursive: bool,
    /// `--exclude` pattern; recursive mode only.
    pub exclude: Option<String>,
    /// `--include` pattern; recursive mode only.
    pub include: Option<String>,
    /// Takes precedence over the client's profile.
    pub profile_override: Option<String>,
}

impl CopyOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Default::default()
        }
    }

    fn has_filters(&self) -> bool {
        self.exclude.is_some() || self.include.is_some()
    }
}

pub struct S3CliClient {
    /// Default `--profile` for every command.
    pub profile: Option<String>,
    pub error_as_exception: bool,
    /// Run `awslocal` instead of `aws`.
    pub use_local: bool,
    exit_code: Option<i32>,
    command_line: Option<String>,
    runner: Arc<dyn CommandRunner>,
    span: Span,
}

impl Default for S3CliClient {
    fn default() -> Self {
        Self::with_runner(Arc::new(ShellRunner))
    }
}

impl S3CliClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            profile: None,
            error_as_exception: false,
            use_local: false,
            exit_code: None,
            command_line: None,
            runner,
            span: info_span!("s3cli"),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_error_as_exception(mut self, enabled: bool) -> Self {
        self.error_as_exception = enabled;
        self
    }

    pub fn with_local(mut self, enabled: bool) -> Self {
        self.use_local = enabled;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Exit code of the last command; 1 when it could not be run.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Last command line handed to the runner.
    pub fn command_line(&self) -> Option<&str> {
        self.command_line.as_deref()
    }

    // ── Operations ──────────────────────────────────────────────

    /// Copy from S3 to a local path.
    ///
    /// Non-recursive copies fetch `s3target/<basename of target>`.
    pub async fn download(
        &mut self,
        s3target: &str,
        target: &str,
        options: &CopyOptions,
    ) -> Result<String, StorageError> {
        let command = self.download_command(s3target, target, options);
        let span = self.span.clone();
        self.copy(command, options).instrument(span).await
    }

    /// Copy a local path to S3.
    ///
    /// Non-recursive copies write to `s3target/<basename of target>`.
    pub async fn upload(
        &mut self,
        target: &str,
        s3target: &str,
        options: &CopyOptions,
    ) -> Result<String, StorageError> {
        let command = self.upload_command(target, s3target, options);
        let span = self.span.clone();
        self.copy(command, options).instrument(span).await
    }

    /// List a prefix. The listing is empty unless the command exited 0.
    pub async fn ls(
        &mut self,
        s3target: &str,
        recursive: bool,
        profile_override: Option<&str>,
    ) -> Result<Listing, StorageError> {
        let command = self.ls_command(s3target, recursive, profile_override);
        let span = self.span.clone();
        let output = self.run(command).instrument(span).await?;

        match output {
            Some(output) if self.exit_code == Some(0) => Ok(parse_listing(&output.stdout)),
            _ => Ok(Listing::default()),
        }
    }

    // ── Command lines ───────────────────────────────────────────

    pub fn download_command(&self, s3target: &str, target: &str, options: &CopyOptions) -> String {
        if options.recursive {
            self.copy_command(s3target, target, options)
        } else {
            let source = s3path::join(s3target, [s3path::basename(target).as_str()]);
            self.copy_command(&source, target, options)
        }
    }

    pub fn upload_command(&self, target: &str, s3target: &str, options: &CopyOptions) -> String {
        if options.recursive {
            self.copy_command(target, s3target, options)
        } else {
            let destination = s3path::join(s3target, [s3path::basename(target).as_str()]);
            self.copy_command(target, &destination, options)
        }
    }

    pub fn ls_command(&self, s3target: &str, recursive: bool, profile_override: Option<&str>) -> String {
        let mut command = format!(r#"{} s3 ls "{s3target}" --human-readable"#, self.tool());
        if recursive {
            command.push_str(" --recursive");
        }
        self.push_profile(&mut command, profile_override);
        command
    }

    fn copy_command(&self, source: &str, destination: &str, options: &CopyOptions) -> String {
        let mut command = format!(r#"{} s3 cp "{source}" "{destination}""#, self.tool());
        if options.recursive {
            command.push_str(" --recursive");
        }
        self.push_profile(&mut command, options.profile_override.as_deref());
        if options.recursive {
            if let Some(exclude) = &options.exclude {
                command.push_str(&format!(r#" --exclude="{exclude}""#));
            }
            if let Some(include) = &options.include {
                command.push_str(&format!(r#" --include="{include}""#));
            }
        }
        command
    }

    fn push_profile(&self, command: &mut String, profile_override: Option<&str>) {
        if let Some(profile) = profile_override.or(self.profile.as_deref()) {
            command.push_str(&format!(" --profile={profile}"));
        }
    }

    fn tool(&self) -> &'static str {
        if self.use_local {
            "awslocal"
        } else {
            "aws"
        }
    }

    // ── Execution ───────────────────────────────────────────────

    async fn copy(&mut self, command: String, options: &CopyOptions) -> Result<String, StorageError> {
        let mut result = String::new();
        if !options.recursive && options.has_filters() {
            warn!("{IGNORED_FILTERS_WARNING}");
            result.push_str(IGNORED_FILTERS_WARNING);
            result.push('\n');
        }

        if let Some(output) = self.run(command).await? {
            result.push_str(&output.text());
        }
        Ok(result)
    }

    /// Run `command`, recording it and its exit code. `None` when the
    /// process could not be started and errors are suppressed.
    async fn run(&mut self, command: String) -> Result<Option<CommandOutput>, StorageError> {
        self.command_line = Some(command.clone());
        debug!(command = %command, "running aws cli");

        match self.runner.invoke(&command).await {
            Ok(output) if output.success() => {
                self.exit_code = Some(0);
                Ok(Some(output))
            }
            Ok(output) => {
                self.exit_code = Some(output.exit_code.unwrap_or(1));
                if self.error_as_exception {
                    return Err(StorageError::CommandFailed {
                        command,
                        exit_code: output.exit_code,
                        output: output.text(),
                    });
                }
                debug!(exit_code = ?output.exit_code, command = %command, "aws cli failed");
                Ok(Some(output))
            }
            Err(err) => {
                self.exit_code = Some(1);
                if self.error_as_exception {
                    return Err(err);
                }
                debug!(error = %err, "aws cli could not be run");
                Ok(None)
            }
        }
    }
}
