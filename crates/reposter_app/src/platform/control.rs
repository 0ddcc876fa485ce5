//! JSON control messages, one per line on stdin.

use engine_logging::engine_info;
use reposter_engine::Control;
use serde::Deserialize;
use thiserror::Error;

use super::persistence::StoredSettings;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    Start,
    Stop,
    #[serde(rename_all = "camelCase")]
    UpdateSettings {
        match_terms: Option<Vec<String>>,
        delay_seconds: Option<u64>,
        favorite_enabled: Option<bool>,
    },
    Log {
        #[serde(default)]
        data: serde_json::Value,
    },
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("malformed control message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn parse_line(line: &str) -> Result<ControlMessage, ControlError> {
    Ok(serde_json::from_str(line.trim())?)
}

impl ControlMessage {
    /// Folds the message into the stored settings and returns the request
    /// for the scheduler. `None` means the settings are untouched too.
    pub fn apply(self, settings: &mut StoredSettings) -> Option<Control> {
        match self {
            ControlMessage::Start => {
                settings.is_running = true;
                Some(Control::Start)
            }
            ControlMessage::Stop => {
                settings.is_running = false;
                Some(Control::Stop)
            }
            ControlMessage::UpdateSettings {
                match_terms,
                delay_seconds,
                favorite_enabled,
            } => {
                if let Some(terms) = match_terms {
                    settings.match_terms = terms.join("\n");
                }
                if let Some(delay) = delay_seconds {
                    settings.delay_seconds = delay;
                }
                if let Some(favorite) = favorite_enabled {
                    settings.favorite_enabled = favorite;
                }
                Some(Control::UpdateConfiguration(settings.configuration()))
            }
            ControlMessage::Log { data } => {
                match data {
                    serde_json::Value::String(text) => engine_info!("[client] {}", text),
                    other => engine_info!("[client] {}", other),
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn actions_are_tagged_in_camel_case() {
        assert_eq!(parse_line(r#"{"action":"start"}"#).unwrap(), ControlMessage::Start);
        assert_eq!(parse_line(r#" {"action":"stop"} "#).unwrap(), ControlMessage::Stop);
        assert_eq!(
            parse_line(r##"{"action":"updateSettings","matchTerms":["#rust"],"favoriteEnabled":false}"##)
                .unwrap(),
            ControlMessage::UpdateSettings {
                match_terms: Some(vec!["#rust".to_string()]),
                delay_seconds: None,
                favorite_enabled: Some(false),
            }
        );
        assert_eq!(
            parse_line(r#"{"action":"log","data":"hello"}"#).unwrap(),
            ControlMessage::Log {
                data: serde_json::Value::String("hello".to_string())
            }
        );
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_line("start").is_err());
        assert!(parse_line(r#"{"action":"launch"}"#).is_err());
        assert!(parse_line(r#"{"matchTerms":[]}"#).is_err());
    }

    #[test]
    fn start_and_stop_track_the_running_flag() {
        let mut settings = StoredSettings::default();
        assert_eq!(ControlMessage::Start.apply(&mut settings), Some(Control::Start));
        assert!(settings.is_running);
        assert_eq!(ControlMessage::Stop.apply(&mut settings), Some(Control::Stop));
        assert!(!settings.is_running);
    }

    #[test]
    fn partial_update_keeps_other_settings() {
        let mut settings = StoredSettings {
            match_terms: "old".to_string(),
            delay_seconds: 9,
            ..StoredSettings::default()
        };
        let control = ControlMessage::UpdateSettings {
            match_terms: Some(vec![" #rust ".to_string(), "".to_string(), "tokio".to_string()]),
            delay_seconds: None,
            favorite_enabled: None,
        }
        .apply(&mut settings);

        assert_eq!(settings.match_terms, " #rust \n\ntokio");
        assert_eq!(settings.delay_seconds, 9);
        let config = match control {
            Some(Control::UpdateConfiguration(config)) => config,
            other => panic!("expected a configuration update, got {other:?}"),
        };
        assert_eq!(config.match_terms(), ["#rust", "tokio"]);
        assert_eq!(config.per_item_delay(), Duration::from_secs(9));
    }

    #[test]
    fn log_messages_leave_settings_alone() {
        let mut settings = StoredSettings::default();
        let message = parse_line(r#"{"action":"log","data":{"step":3}}"#).unwrap();
        assert_eq!(message.apply(&mut settings), None);
        assert_eq!(settings, StoredSettings::default());
    }
}
