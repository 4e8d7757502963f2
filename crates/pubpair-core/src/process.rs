use crate::errors::{PubPairError, Result};
use std::path::Path;
use std::process::Command;

/// Creates a `Command` that can resolve `.cmd` and `.bat` scripts on Windows.
///
/// On Windows, `flutter` and `dart` are installed as `.bat` batch scripts.
/// Rust's `std::process::Command` only auto-resolves `.exe` extensions, not
/// `.cmd`/`.bat` (see rust-lang/rust#37519). This function wraps the invocation
/// through `cmd.exe /C` on Windows to ensure proper resolution via PATHEXT.
pub fn command(program: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", program]);
        cmd
    } else {
        Command::new(program)
    }
}

/// Output of an external tool run with captured streams.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout and stderr joined by a newline, the way tool output is scanned.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Run `cmd` in `dir` and capture its output.
pub fn run_captured(mut cmd: Command, dir: &Path) -> Result<CapturedOutput> {
    cmd.current_dir(dir);
    tracing::debug!(command = %format_command_display(&cmd), dir = %dir.display(), "running");
    let output = cmd.output().map_err(|err| spawn_error(&cmd, err))?;
    Ok(CapturedOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run `cmd` in `dir` with inherited stdio, so interactive tools can prompt.
/// Returns whether the process exited successfully.
pub fn run_inherited(mut cmd: Command, dir: &Path) -> Result<bool> {
    cmd.current_dir(dir);
    tracing::debug!(command = %format_command_display(&cmd), dir = %dir.display(), "running");
    let status = cmd.status().map_err(|err| spawn_error(&cmd, err))?;
    Ok(status.success())
}

fn spawn_error(cmd: &Command, err: std::io::Error) -> PubPairError {
    if err.kind() == std::io::ErrorKind::NotFound {
        let program = cmd.get_program().to_string_lossy().into_owned();
        PubPairError::Publish(format!(
            "{} not found in PATH; ensure it is installed to publish packages",
            program
        ))
    } else {
        PubPairError::Io(err)
    }
}

pub fn format_command_display(cmd: &Command) -> String {
    let mut text = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        text.push(' ');
        text.push_str(&arg.to_string_lossy());
    }
    text
}
