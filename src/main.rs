//! `deno-install` entry point
//!
//! Parses arguments, sets up logging and runs the install. Every failure,
//! including argument errors, ends with a prefixed diagnostic on stderr and
//! exit status 1.

use clap::Parser;
use clap::error::ErrorKind;
use deno_installer::cli;
use deno_installer::core::error::user_friendly_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let config = cli.build_config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = cli.execute_with_config(config).await {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
