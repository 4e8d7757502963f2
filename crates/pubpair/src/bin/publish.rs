use clap::Parser;
use pubpair::cli::PublishCli;
use pubpair::{publish, ui};
use std::process::ExitCode;

fn main() -> ExitCode {
    ui::init_logging();
    let cli = PublishCli::parse();

    if let Err(e) = publish::run(&cli) {
        ui::log_error(&format!("Failed to publish packages: {e}"));
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
