mod api;
mod cli;
mod client;
mod config;
mod error;
mod exception_list;
mod isolation;
mod policy_config;
mod rison;
mod search;
mod server;
mod store;
mod types;
mod validation;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::{Config, CONFIG};
use directories::ProjectDirs;
use flexi_logger::{detailed_format, Logger, LoggerHandle};
use log::{debug, error};

fn main() {
    let config = match ProjectDirs::from("", "", "endpoint-hosts") {
        Some(project_dirs) => Config::load_config(&project_dirs),
        None => {
            eprintln!("Could not determine a data directory. Using default configuration.");
            Config::default_config()
        }
    };
    let log_spec = config.logging.log_spec();
    // Only fails if already set, which cannot happen before this point
    let _ = CONFIG.set(config);

    // RUST_LOG takes precedence over the configured levels
    let _logger = match setup_logging(&log_spec) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to initialize logging: {}", err);
            None
        }
    };
    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn setup_logging(log_spec: &str) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_env_or_str(log_spec)?
        .format(detailed_format)
        .start()
}
