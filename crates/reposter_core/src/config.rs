use std::time::Duration;

/// Delay used when none (or zero) is configured.
pub const DEFAULT_DELAY_SECONDS: u64 = 5;

/// Longer delays are clamped to this.
pub const MAX_DELAY_SECONDS: u64 = 3600;

/// Marker character stripped from the front of a match term before matching.
const TERM_MARKER: char = '#';

/// Settings that drive one automation run.
///
/// Read once at the start of each poll tick; replacing it between ticks is
/// the only way it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    match_terms: Vec<String>,
    per_item_delay: Duration,
    favorite_enabled: bool,
}

impl Configuration {
    /// Builds a configuration from raw terms; terms are trimmed and empty
    /// ones dropped. A zero delay falls back to [`DEFAULT_DELAY_SECONDS`],
    /// and delays above [`MAX_DELAY_SECONDS`] are clamped.
    pub fn new<I, S>(match_terms: I, delay_seconds: u64, favorite_enabled: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let match_terms = match_terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_string())
            .filter(|term| !term.is_empty())
            .collect();
        let delay_seconds = match delay_seconds {
            0 => DEFAULT_DELAY_SECONDS,
            seconds => seconds.min(MAX_DELAY_SECONDS),
        };
        Self {
            match_terms,
            per_item_delay: Duration::from_secs(delay_seconds),
            favorite_enabled,
        }
    }

    /// Parses the newline-delimited form used by the settings store.
    pub fn from_lines(raw: &str, delay_seconds: u64, favorite_enabled: bool) -> Self {
        Self::new(raw.lines(), delay_seconds, favorite_enabled)
    }

    pub fn match_terms(&self) -> &[String] {
        &self.match_terms
    }

    pub fn has_match_terms(&self) -> bool {
        !self.match_terms.is_empty()
    }

    pub fn per_item_delay(&self) -> Duration {
        self.per_item_delay
    }

    pub fn favorite_enabled(&self) -> bool {
        self.favorite_enabled
    }

    /// Case-insensitive substring test against every term, marker stripped.
    /// A term that is only the marker matches nothing.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.match_terms.iter().any(|term| {
            let needle = term.strip_prefix(TERM_MARKER).unwrap_or(term).to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
    }

    /// Annotation text: the match terms joined by a single space.
    pub fn annotation(&self) -> String {
        self.match_terms.join(" ")
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), DEFAULT_DELAY_SECONDS, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_trimmed_and_empty_lines_dropped() {
        let config = Configuration::from_lines("  #rust \n\n   \nbar\n", 3, false);
        assert_eq!(config.match_terms(), ["#rust", "bar"]);
        assert_eq!(config.per_item_delay(), Duration::from_secs(3));
        assert!(!config.favorite_enabled());
    }

    #[test]
    fn zero_delay_uses_default() {
        let config = Configuration::new(["a"], 0, true);
        assert_eq!(
            config.per_item_delay(),
            Duration::from_secs(DEFAULT_DELAY_SECONDS)
        );
    }

    #[test]
    fn oversized_delay_is_clamped() {
        let config = Configuration::new(["a"], u64::MAX, true);
        assert_eq!(
            config.per_item_delay(),
            Duration::from_secs(MAX_DELAY_SECONDS)
        );
    }

    #[test]
    fn bare_marker_term_matches_nothing() {
        let config = Configuration::new(["#"], 1, true);
        assert!(!config.matches("anything at all"));
    }

    #[test]
    fn annotation_joins_terms_verbatim() {
        let config = Configuration::new(["#foo", "bar"], 1, true);
        assert_eq!(config.annotation(), "#foo bar");
    }
}
