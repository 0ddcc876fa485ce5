use engine_logging::{engine_info, engine_warn};

use crate::{LiveView, Locator, ViewSelectors};

/// Detects the transient error banner and clicks its retry control.
/// Checked afresh on every tick; nothing is remembered between checks.
#[derive(Debug, Clone)]
pub struct RecoverySupervisor {
    banner: Locator,
    retry: Locator,
}

impl RecoverySupervisor {
    pub fn new(selectors: &ViewSelectors) -> Self {
        Self {
            banner: selectors.error_banner.clone(),
            retry: selectors.retry_control.clone(),
        }
    }

    /// Returns `true` only when the banner was present and retry was clicked.
    pub async fn check_and_handle<V>(&self, view: &V) -> bool
    where
        V: LiveView + ?Sized,
    {
        if self.banner.locate(view, None).await.is_none() {
            return false;
        }
        engine_warn!("Error banner detected, looking for a retry control");

        let Some(retry) = self.retry.locate(view, None).await else {
            engine_warn!("Error banner has no retry control");
            return false;
        };
        match view.click(&retry).await {
            Ok(()) => {
                engine_info!("Clicked retry on error banner");
                true
            }
            Err(err) => {
                engine_warn!("Retry click failed: {}", err);
                false
            }
        }
    }
}
