use clap::{Args, Parser, Subcommand};

use awswrap_athena::ColumnType;

/// Run Athena queries and move data with the `aws s3` CLI.
#[derive(Parser, Debug)]
#[command(name = "awswrap", version, about = "Run Athena queries and move data with the aws s3 CLI")]
pub struct CliArgs {
    /// Env profile prefix, e.g. `prod` reads PROD_ATHENA_* before ATHENA_*
    #[arg(long, env = "AWSWRAP_PROFILE", global = true)]
    pub env_profile: Option<String>,

    /// AWS credential profile (overrides AWS_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run data queries and print the result tables
    Query(QueryArgs),
    /// Run statements (DDL, MSCK REPAIR, ...) and print their messages
    Exec(ExecArgs),
    /// Copy a local path to S3
    Upload(CopyArgs),
    /// Copy from S3 to a local path
    Download(CopyArgs),
    /// List an S3 prefix
    Ls(LsArgs),
}

/// Options shared by `query` and `exec`.
#[derive(Args, Debug, Clone)]
pub struct AthenaArgs {
    /// Database (defaults to ATHENA_DATABASE)
    #[arg(long, short = 'd')]
    pub database: Option<String>,

    /// Region (defaults to ATHENA_REGION, then AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// S3 prefix for query results (defaults to ATHENA_OUTPUT_LOCATION)
    #[arg(long)]
    pub output_location: Option<String>,

    #[arg(long)]
    pub workgroup: Option<String>,

    /// Seconds between status checks
    #[arg(long)]
    pub polling: Option<f64>,

    /// Report failed queries instead of aborting the batch
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub athena: AthenaArgs,

    /// Print the result location instead of fetching it
    #[arg(long)]
    pub return_paths: bool,

    /// Column type hint, applied to every query: COLUMN=TYPE
    #[arg(long = "dtype", value_parser = parse_dtype)]
    pub dtypes: Vec<(String, ColumnType)>,

    /// Extra value read as NULL
    #[arg(long = "na")]
    pub na_values: Vec<String>,

    /// SQL statements, run as one batch
    #[arg(required = true)]
    pub queries: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub athena: AthenaArgs,

    /// Return statement messages instead of treating them as errors
    #[arg(long)]
    pub allow_messages: bool,

    #[arg(required = true)]
    pub queries: Vec<String>,
}

/// Options shared by the `aws s3` commands.
#[derive(Args, Debug, Clone)]
pub struct CliToolArgs {
    /// Use `awslocal` instead of `aws`
    #[arg(long)]
    pub local: bool,

    /// Fail on a non-zero exit code instead of reporting it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Source path (local for upload, s3:// for download)
    pub source: String,

    /// Destination path
    pub destination: String,

    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Exclude pattern (recursive only)
    #[arg(long)]
    pub exclude: Option<String>,

    /// Include pattern (recursive only)
    #[arg(long)]
    pub include: Option<String>,

    #[command(flatten)]
    pub tool: CliToolArgs,
}

#[derive(Args, Debug)]
pub struct LsArgs {
    pub target: String,

    #[arg(long, short = 'r')]
    pub recursive: bool,

    #[command(flatten)]
    pub tool: CliToolArgs,
}

fn parse_dtype(raw: &str) -> Result<(String, ColumnType), String> {
    let (column, ty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TYPE, got '{raw}'"))?;
    if column.is_empty() {
        return Err(format!("missing column name in '{raw}'"));
    }
    Ok((column.to_string(), ty.parse()?))
}
