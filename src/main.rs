mod backup;
mod cli;
mod config;
mod database;
mod error;
mod migrator;
mod plans;
mod reports;
mod runner;
mod vocabulary;

use cli::Cli;
use config::Config;
use flexi_logger::{Logger, LoggerHandle};
use log::{debug, error};

fn main() {
    let config = Config::load();

    // RUST_LOG, if set, overrides [logging] level:
    // OFF → ERROR → WARN → INFO → DEBUG → TRACE
    let _logger = init_logging(&config.logging.level);
    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Config::init(config) {
        error!("{:?}", err);
    }

    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) -> Option<LoggerHandle> {
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    }
}
