//! Subcommand handlers.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use awswrap_athena::{
    AthenaClient, AthenaSettings, BatchReport, Materialize, ReadOptions, TypeHints,
};
use awswrap_core::EnvProfile;
use awswrap_storage::{CopyOptions, Listing, S3CliClient};

use crate::cli::{AthenaArgs, CliArgs, CliToolArgs, CopyArgs, ExecArgs, LsArgs, QueryArgs};

/// Settings from the environment, overridden by command-line options.
pub fn athena_settings(global: &CliArgs, args: &AthenaArgs) -> AthenaSettings {
    let env = global
        .env_profile
        .as_deref()
        .map(EnvProfile::named)
        .unwrap_or_else(EnvProfile::from_env);
    let mut settings = AthenaSettings::from_env_profiled(&env);

    if let Some(profile) = &global.profile {
        settings.profile = Some(profile.clone());
    }
    if let Some(region) = &args.region {
        settings.region = region.clone();
    }
    if let Some(location) = &args.output_location {
        settings.workplace = Some(location.clone());
    }
    if let Some(workgroup) = &args.workgroup {
        settings.workgroup = Some(workgroup.clone());
    }
    if let Some(seconds) = args.polling {
        settings.polling_interval =
            Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(settings.polling_interval);
    }
    if args.lenient {
        settings.error_as_exception = false;
    }
    settings
}

pub async fn query(global: &CliArgs, args: &QueryArgs) -> Result<()> {
    let client = AthenaClient::new(athena_settings(global, &args.athena));

    let hints: Option<TypeHints> =
        (!args.dtypes.is_empty()).then(|| args.dtypes.iter().cloned().collect());
    let dtypes = vec![hints; args.queries.len()];
    let read = ReadOptions {
        na_values: args.na_values.clone(),
        ..Default::default()
    };
    let queries: Vec<&str> = args.queries.iter().map(String::as_str).collect();

    let report = client
        .execute_batch(
            &queries,
            args.athena.database.as_deref(),
            Materialize::Data {
                return_paths: args.return_paths,
                dtypes: &dtypes,
                read: &read,
            },
        )
        .await
        .context("query failed")?;

    print_report(&report, global.json)
}

pub async fn exec(global: &CliArgs, args: &ExecArgs) -> Result<()> {
    let mut settings = athena_settings(global, &args.athena);
    if args.allow_messages {
        settings.non_query_message_as_exception = false;
    }
    let client = AthenaClient::new(settings);

    let queries: Vec<&str> = args.queries.iter().map(String::as_str).collect();
    let report = client
        .execute_batch(&queries, args.athena.database.as_deref(), Materialize::Statement)
        .await
        .context("statement failed")?;

    print_report(&report, global.json)
}

pub async fn upload(global: &CliArgs, args: &CopyArgs) -> Result<()> {
    let mut client = s3_client(global, &args.tool);
    let text = client
        .upload(&args.source, &args.destination, &copy_options(args))
        .await
        .context("upload failed")?;
    finish_copy(&client, &text)
}

pub async fn download(global: &CliArgs, args: &CopyArgs) -> Result<()> {
    let mut client = s3_client(global, &args.tool);
    let text = client
        .download(&args.source, &args.destination, &copy_options(args))
        .await
        .context("download failed")?;
    finish_copy(&client, &text)
}

pub async fn ls(global: &CliArgs, args: &LsArgs) -> Result<()> {
    let mut client = s3_client(global, &args.tool);
    let listing = client
        .ls(&args.target, args.recursive, None)
        .await
        .context("listing failed")?;
    check_exit(&client)?;

    if global.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print_listing(&listing);
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────

fn s3_client(global: &CliArgs, tool: &CliToolArgs) -> S3CliClient {
    let mut client = S3CliClient::new()
        .with_local(tool.local)
        .with_error_as_exception(tool.strict);
    client.profile = global.profile.clone();
    client
}

fn copy_options(args: &CopyArgs) -> CopyOptions {
    CopyOptions {
        recursive: args.recursive,
        exclude: args.exclude.clone(),
        include: args.include.clone(),
        profile_override: None,
    }
}

fn finish_copy(client: &S3CliClient, text: &str) -> Result<()> {
    print!("{text}");
    check_exit(client)
}

fn check_exit(client: &S3CliClient) -> Result<()> {
    match client.exit_code() {
        Some(0) | None => Ok(()),
        Some(code) => bail!(
            "`{}` exited with code {code}",
            client.command_line().unwrap_or_default()
        ),
    }
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for record in &report.records {
        let state = record
            .state
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        println!("-- {} [{state}]", record.execution_id);
        match &record.result {
            Some(output) => println!("{output}"),
            None => println!("(no result)"),
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        info!(failed, "some queries did not succeed");
    }
    Ok(())
}

fn print_listing(listing: &Listing) {
    for prefix in &listing.prefixes {
        println!("PRE {prefix}");
    }
    for file in &listing.files {
        println!("{file}");
    }
}
