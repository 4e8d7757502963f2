use clap::Parser;
use pubpair::cli::SyncVersionCli;
use pubpair::{sync, ui};
use std::process::ExitCode;

fn main() -> ExitCode {
    ui::init_logging();
    let cli = SyncVersionCli::parse();

    match sync::run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            ui::log_error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
