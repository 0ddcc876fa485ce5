use std::path::PathBuf;

use thiserror::Error;

use super::logging::{LogDestination, DEFAULT_LOG_FILE};

const DEFAULT_SETTINGS_PATH: &str = "./reposter_settings.ron";

/// Command-line options. Everything else comes from the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub settings_path: PathBuf,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    /// Drive a static HTML file instead of a browser tab.
    pub snapshot: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            log_destination: LogDestination::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            snapshot: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown log destination {0:?} (expected file, terminal or both)")]
    LogDestination(String),
    #[error("unknown argument {0:?}")]
    Unknown(String),
}

impl Options {
    /// Parses arguments without the program name.
    pub fn parse<I>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" => options.settings_path = PathBuf::from(value(&mut args, &arg)?),
                "--log" => {
                    let raw = value(&mut args, &arg)?;
                    options.log_destination =
                        LogDestination::parse(&raw).ok_or(OptionsError::LogDestination(raw))?;
                }
                "--log-file" => options.log_file = PathBuf::from(value(&mut args, &arg)?),
                "--snapshot" => options.snapshot = Some(PathBuf::from(value(&mut args, &arg)?)),
                _ => return Err(OptionsError::Unknown(arg)),
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, OptionsError> {
    args.next()
        .ok_or_else(|| OptionsError::MissingValue(flag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, OptionsError> {
        Options::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let options = parse(&[]).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.log_file, PathBuf::from("./reposter.log"));
    }

    #[test]
    fn flags_take_the_following_value() {
        let options = parse(&[
            "--log", "file", "--log-file", "/tmp/r.log", "--settings", "/tmp/s.ron", "--snapshot",
            "page.html",
        ])
        .unwrap();
        assert_eq!(options.log_destination, LogDestination::File);
        assert_eq!(options.log_file, PathBuf::from("/tmp/r.log"));
        assert_eq!(options.settings_path, PathBuf::from("/tmp/s.ron"));
        assert_eq!(options.snapshot, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(
            parse(&["--log"]),
            Err(OptionsError::MissingValue("--log".to_string()))
        );
        assert_eq!(
            parse(&["--log", "syslog"]),
            Err(OptionsError::LogDestination("syslog".to_string()))
        );
        assert_eq!(
            parse(&["--verbose"]),
            Err(OptionsError::Unknown("--verbose".to_string()))
        );
    }
}
