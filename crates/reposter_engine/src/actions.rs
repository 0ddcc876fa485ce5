use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::time::sleep;

use crate::{
    ActionReport, EngineSettings, EngineTimings, LiveView, SkipReason, StepOutcome, ViewError,
    ViewSelectors,
};

/// What to do with one item.
#[derive(Debug, Clone, Copy)]
pub struct ActionPlan<'a> {
    pub annotation: &'a str,
    pub favorite: bool,
}

/// Runs the per-item sequence: scroll into view, favorite, annotate, re-share.
///
/// Every step is best effort. A missing control skips that step, an error
/// fails it, and the next step runs regardless.
pub struct ActionExecutor<'a, V: ?Sized> {
    view: &'a V,
    selectors: &'a ViewSelectors,
    timings: &'a EngineTimings,
}

impl<'a, V> ActionExecutor<'a, V>
where
    V: LiveView + ?Sized,
{
    pub fn new(view: &'a V, settings: &'a EngineSettings) -> Self {
        Self {
            view,
            selectors: &settings.selectors,
            timings: &settings.timings,
        }
    }

    pub async fn process(&self, item: &V::Node, plan: &ActionPlan<'_>) -> ActionReport {
        if let Err(err) = self.view.scroll_into_view(item).await {
            engine_warn!("Scroll into view failed: {}", err);
        }
        sleep(self.timings.scroll_settle).await;

        let favorite = if plan.favorite {
            StepOutcome::from_result(self.favorite(item).await)
        } else {
            StepOutcome::Skipped(SkipReason::Disabled)
        };
        log_step("favorite", &favorite);

        let annotate = match self.annotate(item, plan.annotation).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.close_compose().await;
                StepOutcome::Failed(err.to_string())
            }
        };
        log_step("annotate", &annotate);

        let reshare = StepOutcome::from_result(self.reshare(item).await);
        log_step("re-share", &reshare);

        ActionReport {
            favorite,
            annotate,
            reshare,
        }
    }

    async fn favorite(&self, item: &V::Node) -> Result<StepOutcome, ViewError> {
        if self
            .view
            .query(Some(item), &self.selectors.favorited_marker)
            .await?
            .is_some()
        {
            return Ok(StepOutcome::Skipped(SkipReason::AlreadyDone));
        }
        let Some(control) = self.view.query(Some(item), &self.selectors.favorite).await? else {
            return Ok(StepOutcome::Skipped(SkipReason::MissingControl("favorite")));
        };
        self.view.click(&control).await?;
        sleep(self.timings.favorite_settle).await;
        Ok(StepOutcome::Completed)
    }

    async fn annotate(&self, item: &V::Node, text: &str) -> Result<StepOutcome, ViewError> {
        let Some(reply) = self.view.query(Some(item), &self.selectors.reply).await? else {
            return Ok(StepOutcome::Skipped(SkipReason::MissingControl("reply")));
        };
        self.view.click(&reply).await?;
        sleep(self.timings.compose_open).await;

        let Some(input) = self.selectors.compose_input.locate(self.view, None).await else {
            self.close_compose().await;
            return Ok(StepOutcome::Skipped(SkipReason::MissingControl("compose input")));
        };
        self.view.focus(&input).await?;
        sleep(self.timings.focus_settle).await;

        self.enter_text(&input, text).await?;
        sleep(self.timings.input_validation).await;

        match self.wait_for_submit().await {
            Some(submit) => {
                self.view.click(&submit).await?;
                engine_info!("Annotation posted: {}", text);
                sleep(self.timings.after_submit).await;
                Ok(StepOutcome::Completed)
            }
            None => {
                self.close_compose().await;
                Ok(StepOutcome::Skipped(SkipReason::SubmitUnavailable))
            }
        }
    }

    /// Primary insertion first; if the text is not visible straight after,
    /// overwrite the content. The check can race the host's own update.
    async fn enter_text(&self, input: &V::Node, text: &str) -> Result<(), ViewError> {
        self.view.replace_text(input, "").await?;
        self.view.insert_text(input, text).await?;
        if !self.view.text(input).await?.contains(text) {
            engine_debug!("Text insertion did not take effect, overwriting");
            self.view.replace_text(input, text).await?;
        }
        self.view.notify_input(input).await
    }

    async fn wait_for_submit(&self) -> Option<V::Node> {
        for _ in 0..self.timings.submit_poll_attempts {
            if let Some(submit) = self.selectors.compose_submit.locate(self.view, None).await {
                return Some(submit);
            }
            sleep(self.timings.submit_poll_interval).await;
        }
        None
    }

    async fn close_compose(&self) {
        let Some(close) = self.selectors.compose_close.locate(self.view, None).await else {
            engine_debug!("No close control for the compose surface");
            return;
        };
        if let Err(err) = self.view.click(&close).await {
            engine_warn!("Closing the compose surface failed: {}", err);
        }
    }

    async fn reshare(&self, item: &V::Node) -> Result<StepOutcome, ViewError> {
        let Some(control) = self.view.query(Some(item), &self.selectors.reshare).await? else {
            return Ok(StepOutcome::Skipped(SkipReason::MissingControl("re-share")));
        };
        self.view.click(&control).await?;
        sleep(self.timings.reshare_open).await;

        // Some view states complete the re-share without a confirmation step.
        match self.view.query(None, &self.selectors.reshare_confirm).await? {
            Some(confirm) => {
                self.view.click(&confirm).await?;
                sleep(self.timings.after_confirm).await;
                Ok(StepOutcome::Completed)
            }
            None => Ok(StepOutcome::Unconfirmed),
        }
    }
}

fn log_step(step: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Completed => engine_debug!("{} completed", step),
        StepOutcome::Unconfirmed => engine_debug!("{} triggered without confirmation", step),
        StepOutcome::Skipped(reason) => engine_info!("{} skipped: {}", step, reason),
        StepOutcome::Failed(message) => engine_warn!("{} failed: {}", step, message),
    }
}
