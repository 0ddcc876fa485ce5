use std::time::Duration;

use crate::locator::Locator;

/// Selectors and phrases that make up the view contract.
#[derive(Debug, Clone)]
pub struct ViewSelectors {
    pub item: String,
    pub favorite: String,
    /// Present inside an item that is already favorited.
    pub favorited_marker: String,
    pub reshare: String,
    pub reshare_confirm: String,
    pub reply: String,
    pub permalink: String,
    /// Regex whose first capture group is the item identifier.
    pub permalink_pattern: String,
    /// Element whose presence marks a supported list view.
    pub supported_view_marker: String,
    /// Location fragment that also marks a supported list view.
    pub supported_path_fragment: String,
    pub compose_input: Locator,
    pub compose_submit: Locator,
    pub compose_close: Locator,
    pub error_banner: Locator,
    pub retry_control: Locator,
    /// Items whose trimmed text is not longer than this are still loading.
    pub min_text_len: usize,
}

impl Default for ViewSelectors {
    fn default() -> Self {
        Self {
            item: r#"[data-testid="tweet"]"#.to_string(),
            favorite: r#"[data-testid="like"]"#.to_string(),
            favorited_marker: r#"[data-testid="unlike"]"#.to_string(),
            reshare: r#"[data-testid="retweet"]"#.to_string(),
            reshare_confirm: r#"[data-testid="retweetConfirm"]"#.to_string(),
            reply: r#"[data-testid="reply"]"#.to_string(),
            permalink: r#"a[href*="/status/"]"#.to_string(),
            permalink_pattern: r"/status/(\d+)".to_string(),
            supported_view_marker: r#"[data-testid="primaryColumn"]"#.to_string(),
            supported_path_fragment: "/search".to_string(),
            compose_input: Locator::first_of([
                r#"[data-testid="tweetTextarea_0"]"#,
                r#"div[contenteditable="true"][data-testid*="textInput"]"#,
                r#"div[contenteditable="true"][role="textbox"]"#,
            ]),
            compose_submit: Locator::first_of([
                r#"[data-testid="tweetButtonInline"]:not([disabled])"#,
                r#"[data-testid="tweetButton"]:not([disabled])"#,
                r#"button[type="submit"]:not([disabled])"#,
            ]),
            compose_close: Locator::first_of([
                r#"[data-testid="app-bar-close"]"#,
                r#"[aria-label="Close"]"#,
                r#"button[aria-label*="Close"]"#,
                ".r-1cvl2hr button",
            ]),
            error_banner: Locator::with_text("span", "Something went wrong. Try reloading."),
            retry_control: Locator::with_text("button", "Retry"),
            min_text_len: 10,
        }
    }
}

/// Fixed settle delays and retry bounds used while driving the view.
#[derive(Debug, Clone)]
pub struct EngineTimings {
    pub scroll_settle: Duration,
    pub favorite_settle: Duration,
    pub compose_open: Duration,
    pub focus_settle: Duration,
    pub input_validation: Duration,
    pub submit_poll_interval: Duration,
    pub submit_poll_attempts: u32,
    pub after_submit: Duration,
    pub reshare_open: Duration,
    pub after_confirm: Duration,
    /// Pause between the partial and the full pagination scroll.
    pub pagination_step: Duration,
    /// Wait after a reload (or at startup) before re-checking start preconditions.
    pub restart_settle: Duration,
}

impl Default for EngineTimings {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_secs(1),
            favorite_settle: Duration::from_millis(500),
            compose_open: Duration::from_secs(3),
            focus_settle: Duration::from_millis(500),
            input_validation: Duration::from_secs(2),
            submit_poll_interval: Duration::from_millis(500),
            submit_poll_attempts: 5,
            after_submit: Duration::from_secs(2),
            reshare_open: Duration::from_secs(1),
            after_confirm: Duration::from_secs(1),
            pagination_step: Duration::from_secs(1),
            restart_settle: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub selectors: ViewSelectors,
    pub timings: EngineTimings,
}
