use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn, set_poll_tick};
use reposter_core::{
    update, AutomationState, Configuration, Effect, Msg, ReloadReason, StartRejection,
    TickObservation,
};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::actions::{ActionExecutor, ActionPlan};
use crate::extract::{is_supported_view, ItemExtractor, RenderedItem};
use crate::pagination::scroll_for_more;
use crate::recovery::RecoverySupervisor;
use crate::{EngineSettings, LiveView, StartOutcome, TickOutcome, ViewError};

/// Requests from the control interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
    UpdateConfiguration(Configuration),
}

/// One automation run over one view.
///
/// Work happens in ticks driven by [`Automation::run`]: each tick runs to
/// completion, then schedules the next one. Control requests are handled
/// between ticks only.
pub struct Automation<V: LiveView> {
    view: V,
    settings: EngineSettings,
    extractor: ItemExtractor,
    supervisor: RecoverySupervisor,
    state: AutomationState,
    next_tick: Option<Instant>,
    pending_start: Option<Instant>,
    ticks: u64,
}

impl<V: LiveView> Automation<V> {
    pub fn new(view: V, config: Configuration, settings: EngineSettings) -> Result<Self, ViewError> {
        let extractor = ItemExtractor::new(&settings.selectors)?;
        let supervisor = RecoverySupervisor::new(&settings.selectors);
        Ok(Self {
            view,
            settings,
            extractor,
            supervisor,
            state: AutomationState::new(config),
            next_tick: None,
            pending_start: None,
            ticks: 0,
        })
    }

    pub fn state(&self) -> &AutomationState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn pending_start(&self) -> Option<Instant> {
        self.pending_start
    }

    /// Re-checks start preconditions after `after`; used at startup and after a reload.
    pub fn schedule_start(&mut self, after: Duration) {
        self.pending_start = Some(Instant::now() + after);
    }

    pub async fn handle(&mut self, control: Control) {
        match control {
            Control::Start => {
                let outcome = self.start().await;
                engine_debug!("Start request: {:?}", outcome);
            }
            Control::Stop => self.stop(),
            Control::UpdateConfiguration(config) => {
                engine_info!(
                    "Configuration updated: {} match terms, {:?} delay",
                    config.match_terms().len(),
                    config.per_item_delay()
                );
                self.dispatch(Msg::ConfigurationReplaced(config));
            }
        }
    }

    pub async fn start(&mut self) -> StartOutcome {
        self.pending_start = None;
        if self.state.is_running() {
            return StartOutcome::AlreadyRunning;
        }

        let view_supported = is_supported_view(&self.view, &self.settings.selectors).await;
        let document_height = self.document_height().await;
        let effects = self.dispatch(Msg::StartRequested {
            view_supported,
            document_height,
            now: Instant::now().into_std(),
        });

        let mut outcome = StartOutcome::Started;
        for effect in effects {
            match effect {
                Effect::StartRejected { reason } => {
                    engine_warn!("Start rejected: {}", describe_rejection(reason));
                    outcome = StartOutcome::Rejected(reason);
                }
                Effect::ScheduleTick { after } => {
                    engine_info!("Automation started");
                    self.schedule_tick(after);
                }
                other => engine_debug!("Ignoring effect on start: {:?}", other),
            }
        }
        outcome
    }

    /// Flips the run state only; an already scheduled tick observes it and halts.
    pub fn stop(&mut self) {
        self.pending_start = None;
        self.dispatch(Msg::StopRequested);
        engine_info!("Automation stopped");
    }

    /// Performs at most one unit of work and schedules the next tick unless
    /// the run is stopped.
    pub async fn on_poll_tick(&mut self) -> TickOutcome {
        self.next_tick = None;
        if !self.state.is_running() {
            engine_debug!("Run is stopped, not rescheduling");
            return TickOutcome::Halted;
        }
        self.ticks += 1;
        set_poll_tick(self.ticks);

        if self.supervisor.check_and_handle(&self.view).await {
            let effects = self.dispatch(Msg::PollTick {
                observation: TickObservation::ErrorRecovered,
                now: Instant::now().into_std(),
            });
            for effect in effects {
                if let Effect::ScheduleTick { after } = effect {
                    self.schedule_tick(after);
                }
            }
            return TickOutcome::ErrorRecovered;
        }

        let items = match self.extractor.extract(&self.view).await {
            Ok(items) => items,
            Err(err) => {
                engine_warn!("Item extraction failed: {}", err);
                Vec::new()
            }
        };
        let document_height = self.document_height().await;
        let effects = self.dispatch(Msg::PollTick {
            observation: TickObservation::Snapshot {
                items: items.iter().map(RenderedItem::snapshot).collect(),
                document_height,
            },
            now: Instant::now().into_std(),
        });

        let mut outcome = TickOutcome::Waiting;
        for effect in effects {
            match effect {
                Effect::ScheduleTick { after } => self.schedule_tick(after),
                Effect::ProcessItem {
                    index,
                    id,
                    annotation,
                    favorite,
                } => {
                    let Some(item) = items.get(index) else {
                        engine_error!("Item index {} outside a snapshot of {}", index, items.len());
                        continue;
                    };
                    engine_info!(
                        "Processing item {}",
                        id.as_ref().map_or("<unidentified>", |id| id.as_str())
                    );
                    let plan = ActionPlan {
                        annotation: &annotation,
                        favorite,
                    };
                    let report = ActionExecutor::new(&self.view, &self.settings)
                        .process(&item.node, &plan)
                        .await;
                    self.dispatch(Msg::ItemAttempted { id: id.clone() });
                    outcome = TickOutcome::Processed { id, report };
                }
                Effect::ItemSkipped { index, id } => {
                    engine_debug!("Item {} matches no term", index);
                    outcome = TickOutcome::Skipped { id };
                }
                Effect::Paginate => {
                    if let Err(err) = scroll_for_more(&self.view, &self.settings.timings).await {
                        engine_warn!("Pagination scroll failed: {}", err);
                    }
                    outcome = TickOutcome::Paginated;
                }
                Effect::Reload { reason } => {
                    self.reload(reason).await;
                    outcome = TickOutcome::Reloaded { reason };
                }
                Effect::StartRejected { .. } => {}
            }
        }
        outcome
    }

    /// Drives ticks and control requests until shutdown or until the control
    /// channel closes.
    pub async fn run(
        mut self,
        mut control_rx: mpsc::UnboundedReceiver<Control>,
        shutdown: CancellationToken,
    ) {
        loop {
            let wake = self.next_wake();
            tokio::select! {
                _ = shutdown.cancelled() => {
                    engine_info!("Shutdown requested");
                    break;
                }
                control = control_rx.recv() => match control {
                    Some(control) => self.handle(control).await,
                    None => {
                        engine_info!("Control channel closed");
                        break;
                    }
                },
                _ = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                    self.on_wake().await;
                }
            }
        }
    }

    async fn on_wake(&mut self) {
        let now = Instant::now();
        if self.pending_start.is_some_and(|at| at <= now) {
            self.start().await;
        } else if self.next_tick.is_some_and(|at| at <= now) {
            let outcome = self.on_poll_tick().await;
            engine_debug!("Tick outcome: {:?}", outcome);
        }
    }

    fn next_wake(&self) -> Option<Instant> {
        [self.pending_start, self.next_tick].into_iter().flatten().min()
    }

    fn schedule_tick(&mut self, after: Duration) {
        self.next_tick = Some(Instant::now() + after);
    }

    /// Full reload: the run's state is discarded and a fresh start is attempted
    /// once the view has settled.
    async fn reload(&mut self, reason: ReloadReason) {
        engine_warn!("Reloading the view: {}", describe_reload(reason));
        if let Err(err) = self.view.reload().await {
            engine_error!("Reload failed: {}", err);
        }
        self.state = AutomationState::new(self.state.config().clone());
        self.next_tick = None;
        self.schedule_start(self.settings.timings.restart_settle);
    }

    async fn document_height(&self) -> i64 {
        self.view.document_height().await.unwrap_or_else(|err| {
            engine_warn!("Reading the document height failed: {}", err);
            0
        })
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let status = state.view();
            engine_info!(
                "Status: {:?}, {} processed, cursor {}, height unchanged {}x",
                status.run_state,
                status.processed,
                status.cursor,
                status.unchanged_heights
            );
        }
        self.state = state;
        effects
    }
}

fn describe_rejection(reason: StartRejection) -> &'static str {
    match reason {
        StartRejection::UnsupportedView => "the current view is not a supported list view",
        StartRejection::NoMatchTerms => "no match terms are configured",
    }
}

fn describe_reload(reason: ReloadReason) -> &'static str {
    match reason {
        ReloadReason::NoProgress => "no items appeared within the progress timeout",
        ReloadReason::Stalled => "lazy loading stopped growing the document",
    }
}
