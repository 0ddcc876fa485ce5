//! Logger setup for reposter_app: terminal, file, or both.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const DEFAULT_LOG_FILE: &str = "./reposter.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    File,
    Terminal,
    #[default]
    Both,
}

impl LogDestination {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "file" => Some(Self::File),
            "terminal" => Some(Self::Terminal),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    fn to_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Installs the global logger. The log file is truncated on every start; if
/// it cannot be created the terminal logger is used alone, and with no
/// logger left nothing is installed.
pub fn initialize(destination: LogDestination, log_file: &Path) {
    let level = LevelFilter::Info;
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.to_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if destination.to_file() {
        if let Some(file_logger) = file_logger(level, config, log_file) {
            loggers.push(file_logger);
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn file_logger(level: LevelFilter, config: Config, path: &Path) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: could not create log file {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_parse_and_route() {
        assert_eq!(LogDestination::parse("file"), Some(LogDestination::File));
        assert_eq!(LogDestination::parse("both"), Some(LogDestination::Both));
        assert_eq!(LogDestination::parse("syslog"), None);

        assert!(LogDestination::Both.to_terminal() && LogDestination::Both.to_file());
        assert!(!LogDestination::File.to_terminal());
        assert!(!LogDestination::Terminal.to_file());
    }
}
