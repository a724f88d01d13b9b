//! Info command implementation

use super::validate::print_detailed_summary;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config_unchecked, InfoArgs, OutputFormat};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let config = load_config_unchecked(&args.config).map_err(|e| format!("Config error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!("Configuration: {}", args.config.display()));
            print_detailed_summary(&config);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config).map_err(|e| format!("Serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = config.to_yaml().map_err(|e| e.to_string())?;
            print!("{yaml}");
        }
    }
    Ok(())
}
