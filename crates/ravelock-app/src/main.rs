//! Command-line entry point.

use clap::Parser;
use log::LevelFilter;
use ravelock_app::{AppConfig, AppResult, Cli};

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    match cli.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.init();
    log::info!("Starting Ravelock");

    match execute(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(error) => {
            eprintln!("error: {}", error);
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli) -> AppResult<String> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let storage = config.storage()?;
    ravelock_app::run(cli.command, &storage, &config)
}
