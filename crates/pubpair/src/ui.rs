use dialoguer::{
    Confirm,
    console::{Style, style},
    theme::ColorfulTheme,
};
use pubpair_core::errors::{PubPairError, Result};
use pubpair_core::publish::Prompter;
use std::io::{self, BufRead, IsTerminal};

pub const SUCCESS_PREFIX: &str = "✔";
pub const WARNING_PREFIX: &str = "⚠";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr `tracing` subscriber; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn log_success_value(label: &str, value: &str) {
    let theme = success_output_theme();
    let line = format!(
        "{} {}{} {}",
        theme.success_prefix.clone(),
        theme.prompt_style.apply_to(label),
        theme.success_suffix.clone(),
        theme.values_style.apply_to(value),
    );
    println!("{line}");
}

pub fn log_warning(message: &str) {
    let mut theme = prompt_theme();
    theme.error_prefix = style(WARNING_PREFIX.to_string()).for_stderr().yellow();
    theme.error_style = Style::new().for_stderr().yellow();

    let line = format!(
        "{} {}",
        theme.error_prefix.clone(),
        theme.error_style.apply_to(message)
    );
    eprintln!("{line}");
}

/// Print `Error: <message>` to stderr.
pub fn log_error(message: &str) {
    let label = style("Error:".to_string()).for_stderr().red().bold();
    eprintln!("{} {}", label, message);
}

pub fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("📦".to_string()).cyan(),
        prompt_style: Style::new().for_stderr(),
        success_prefix: style(SUCCESS_PREFIX.to_string()).for_stderr(),
        success_suffix: style(":".to_string()).for_stderr(),
        values_style: Style::new().for_stderr(),
        ..ColorfulTheme::default()
    }
}

fn success_output_theme() -> ColorfulTheme {
    let mut theme = prompt_theme();
    theme.success_prefix = theme.success_prefix.clone().for_stdout();
    theme.success_suffix = theme.success_suffix.clone().for_stdout();
    theme.prompt_style = theme.prompt_style.clone().for_stdout();
    theme.values_style = theme.values_style.clone().for_stdout();
    theme
}

pub fn prompt_io_error(error: dialoguer::Error) -> io::Error {
    match error {
        dialoguer::Error::IO(err) => err,
    }
}

/// Terminal yes/no prompt; the default answer is "no".
///
/// When stdin is not a terminal (`echo y | publish`), the answer is read as a
/// plain line instead: `y` or `yes` confirms, anything else declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> Result<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            eprint!("{message} (y/N) ");
            return read_confirmation(stdin.lock()).map_err(PubPairError::Io);
        }
        Confirm::with_theme(&prompt_theme())
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|e| PubPairError::Io(prompt_io_error(e)))
    }
}

/// Read one answer line. End of input counts as "no".
fn read_confirmation(mut reader: impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_io_error_keeps_kind() {
        let err = prompt_io_error(dialoguer::Error::IO(io::Error::new(
            io::ErrorKind::NotConnected,
            "not a terminal",
        )));
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn piped_answers_confirm_only_on_yes() {
        for (input, expected) in [
            ("y\n", true),
            ("YES\r\n", true),
            ("  yes  \n", true),
            ("n\n", false),
            ("\n", false),
            ("yeah\n", false),
            ("", false),
        ] {
            assert_eq!(
                read_confirmation(input.as_bytes()).unwrap(),
                expected,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn piped_answer_reads_a_single_line() {
        let mut input: &[u8] = b"y\nn\n";
        assert!(read_confirmation(&mut input).unwrap());
        assert!(!read_confirmation(&mut input).unwrap());
    }

    #[test]
    fn init_logging_can_run_twice() {
        init_logging();
        init_logging();
    }
}
