//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KINDRED_LOG";

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn main() {
    init_logging();
    if let Err(err) = kindred_cli::run() {
        eprintln!("kindred: {err}");
        std::process::exit(1);
    }
}

/// Install a stderr subscriber filtered by `KINDRED_LOG`, defaulting to
/// `warn`. `log` records from the library crates are bridged in.
#[expect(
    clippy::print_stderr,
    reason = "logging is unavailable until the subscriber is installed"
)]
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("kindred: failed to initialise logging: {err}");
    }
}
