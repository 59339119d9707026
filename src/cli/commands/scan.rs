use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use super::super::args::{ScanArgs, ScanCommand};
use super::super::exit_status::ExitStatus;
use super::super::report::{Destination, print_error, print_log, print_summary};
use crate::config::{Config, ConfigLoadResult, load_config, search_dir_for};
use crate::core::ScanOptions;
use crate::output::{JsonlSink, scan_into};
use crate::workspace::WorkspaceOptions;

pub fn scan(cmd: ScanCommand, verbose: bool) -> Result<ExitStatus> {
    let args = cmd.args;

    if !args.input.exists() {
        print_error(&format!("input not found: {}", args.input.display()));
        return Ok(ExitStatus::InputNotFound);
    }

    let ConfigLoadResult { config, from_file } = load_config(&search_dir_for(&args.input))?;
    if from_file {
        print_log("Using configuration file", verbose);
    }

    let options = scan_options(&args, &config);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output));
    let data_members_output = args
        .data_members_output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data_members_output));

    let (mut sink, destination) = if args.stdout {
        (JsonlSink::stdout(), Destination::Stdout)
    } else {
        (
            JsonlSink::create(&output, Some(&data_members_output))?,
            Destination::Files {
                output: &output,
                data_members_output: &data_members_output,
            },
        )
    };

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    let mut on_log = |line: &str| print_log(line, verbose);
    match scan_into(
        &args.input,
        &options,
        &mut sink,
        Some(&mut on_log),
        &cancellation,
    ) {
        Ok(summary) => {
            print_summary(&summary, &destination);
            Ok(ExitStatus::Success)
        }
        Err(err) => {
            print_error(&err.to_string());
            Ok(ExitStatus::Failure)
        }
    }
}

/// CLI flags take priority over the config file.
fn scan_options(args: &ScanArgs, config: &Config) -> ScanOptions {
    ScanOptions {
        unit_failure: args.on_unit_failure.unwrap_or(config.on_unit_failure),
        workspace: WorkspaceOptions {
            include_generated: args.include_generated || config.include_generated,
            ignores: config.ignores.clone(),
        },
    }
}
