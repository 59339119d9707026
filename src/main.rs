use std::process::ExitCode;

use clap::Parser;
use contractscan::cli::{Arguments, Command, ExitStatus};

fn main() -> ExitCode {
    let args = match Arguments::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // --help and --version are reported as errors by clap
            return if err.use_stderr() {
                ExitStatus::Usage.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    if matches!(args.command, Some(Command::Serve)) {
        if let Err(err) = contractscan::mcp::run_server() {
            eprintln!("Error: {}", err);
            return ExitStatus::Failure.into();
        }
        return ExitStatus::Success.into();
    }

    match contractscan::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Failure.into()
        }
    }
}
