use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed successfully
/// - `Usage` (1): Missing or incorrect arguments
/// - `InputNotFound` (2): The input path does not exist
/// - `Failure` (3): The scan (or any other step) failed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Usage,
    InputNotFound,
    Failure,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Usage => ExitCode::from(1),
            ExitStatus::InputNotFound => ExitCode::from(2),
            ExitStatus::Failure => ExitCode::from(3),
        }
    }
}
