use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{init::init, scan::scan},
    exit_status::ExitStatus,
};

/// Dispatch to the command handler.
///
/// `Err` is returned for failures outside the scan itself, such as an
/// unreadable config file or an output file that cannot be created.
pub fn run(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    match args.command {
        Some(Command::Scan(cmd)) => scan(cmd, verbose),
        Some(Command::Init) => init(),
        Some(Command::Serve) => {
            // Serve command is handled in main.rs before calling run()
            anyhow::bail!("Serve command should be handled before run()")
        }
        None => Ok(ExitStatus::Usage),
    }
}
