//! Terminal output for the CLI.
//!
//! Results go to the output stream or files; everything printed here is for
//! the user and goes to stderr, except `init` confirmations.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use crate::core::ScanSummary;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Where the results of a scan were written.
pub enum Destination<'a> {
    Stdout,
    Files {
        output: &'a Path,
        data_members_output: &'a Path,
    },
}

pub fn print_summary(summary: &ScanSummary, destination: &Destination<'_>) {
    print_summary_to(summary, destination, &mut io::stderr().lock());
}

pub fn print_summary_to<W: Write>(
    summary: &ScanSummary,
    destination: &Destination<'_>,
    writer: &mut W,
) {
    let headline = format!(
        "Found {} ({} service, {} data) in {} {}, {} {}",
        plural(summary.total_matches(), "contract", "contracts"),
        summary.service_contracts,
        summary.data_contracts,
        summary.projects,
        if summary.projects == 1 {
            "project"
        } else {
            "projects"
        },
        summary.documents,
        if summary.documents == 1 {
            "document"
        } else {
            "documents"
        },
    );
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), headline.green());

    if summary.failed_units > 0 {
        let _ = writeln!(
            writer,
            "{} {} could not be loaded and {} skipped",
            "warning:".bold().yellow(),
            plural(summary.failed_units, "document", "documents"),
            if summary.failed_units == 1 {
                "was"
            } else {
                "were"
            }
        );
    }

    if let Destination::Files {
        output,
        data_members_output,
    } = destination
    {
        let _ = writeln!(
            writer,
            "  {} {}",
            "contracts:".dimmed(),
            output.display().to_string().cyan()
        );
        let _ = writeln!(
            writer,
            "  {} {}",
            "data members:".dimmed(),
            data_members_output.display().to_string().cyan()
        );
    }
}

/// Print a scan log line. Warnings are always shown, the rest only when verbose.
pub fn print_log(line: &str, verbose: bool) {
    print_log_to(line, verbose, &mut io::stderr().lock());
}

pub fn print_log_to<W: Write>(line: &str, verbose: bool, writer: &mut W) {
    if let Some(message) = line.strip_prefix("warning: ") {
        let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), message);
    } else if verbose {
        let _ = writeln!(writer, "{} {}", "info:".bold().blue(), line);
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {} {}", FAILURE_MARK.red(), "error:".bold().red(), message);
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}
