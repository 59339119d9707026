//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Scan a solution or project for service and data contracts
//! - `init`: Initialize contractscan configuration file
//! - `serve`: Start MCP server for AI integration

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::UnitFailurePolicy;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Scan(cmd)) => cmd.args.verbose,
            Some(Command::Init) | Some(Command::Serve) | None => false,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Path to a .sln or .csproj file
    pub input: PathBuf,

    /// Primary output file (overrides config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Data-members output file (overrides config file)
    #[arg(long)]
    pub data_members_output: Option<PathBuf>,

    /// Write results to stdout instead of files
    #[arg(long, conflicts_with_all = ["output", "data_members_output"])]
    pub stdout: bool,

    /// What to do when a source document cannot be loaded (overrides config file)
    #[arg(long, value_enum)]
    pub on_unit_failure: Option<UnitFailurePolicy>,

    /// Scan generated documents as ordinary source
    #[arg(long)]
    pub include_generated: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub args: ScanArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find [ServiceContract] and [DataContract] types in a .sln or .csproj
    Scan(ScanCommand),
    /// Initialize a new .contractscanrc.json configuration file
    Init,
    /// Start MCP server for AI coding agents
    Serve,
}
