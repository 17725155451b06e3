// deployer/src/process.rs

use eyre::Report;
use std::{io::Write, process::ExitCode};
use tracing::debug;

/// How a deployment run ended. `main` turns it into the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Settles a run: `Ok` is success; an error is written with its source
/// chain to `err_out` and yields failure. The log only repeats it at debug
/// level. Nothing is retried or rolled back.
pub fn finish<T, E, W>(result: Result<T, E>, err_out: &mut W) -> RunStatus
where
    E: Into<Report>,
    W: Write,
{
    match result {
        Ok(_) => RunStatus::Success,
        Err(e) => {
            let report: Report = e.into();
            debug!(error = ?report, "Deployment failed");
            let _ = writeln!(err_out, "Error: {report}");
            for cause in report.chain().skip(1) {
                let _ = writeln!(err_out, "  caused by: {cause}");
            }
            RunStatus::Failure
        }
    }
}
