//! logging setup shared by the solver and the studies: terminal logger plus optional log file
use crate::numerical::RadialDiffusion::error::DiffusionError;
use chrono::Local;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// "debug", "info", "warn", "error", "off"/"none" -> LevelFilter
pub fn parse_loglevel(level: &str) -> Result<LevelFilter, DiffusionError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(DiffusionError::UnknownLogLevel(level.to_string())),
    }
}

/// log_YYYY-MM-DD_HH-MM-SS.txt inside `dir`
pub fn log_file_name(dir: &Path) -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("log_{}.txt", date_and_time))
}

/// Initialise the global logger. `log_dir = Some(dir)` adds a file logger writing into a
/// timestamped file in `dir`. Returns `Ok(false)` when a logger was already installed
/// (the first one stays active), `Ok(true)` otherwise.
pub fn init_logger(loglevel: &str, log_dir: Option<&Path>) -> Result<bool, DiffusionError> {
    let level = parse_loglevel(loglevel)?;
    if level == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;
        let file = File::create(log_file_name(dir))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loglevel() {
        assert_eq!(parse_loglevel("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_loglevel("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_loglevel(" warn ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_loglevel("none").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_loglevel("verbose"),
            Err(DiffusionError::UnknownLogLevel(_))
        ));
    }

    #[test]
    fn test_log_file_name() {
        let name = log_file_name(Path::new("results"));
        let file = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("log_"));
        assert!(file.ends_with(".txt"));
        assert!(name.starts_with("results"));
    }

    #[test]
    fn test_init_logger_off_and_unknown() {
        assert!(!init_logger("off", None).unwrap());
        assert!(init_logger("loud", None).is_err());
    }
}
