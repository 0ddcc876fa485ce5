//! Reposter engine: drives a live view on behalf of the core state machine.
mod actions;
mod cdp;
mod engine;
mod extract;
mod locator;
mod pagination;
mod persist;
mod recovery;
mod settings;
mod snapshot;
mod types;
mod view;

pub use actions::{ActionExecutor, ActionPlan};
pub use cdp::CdpView;
pub use engine::{Automation, Control};
pub use extract::{is_supported_view, ItemExtractor, RenderedItem};
pub use locator::{Locator, Strategy};
pub use pagination::scroll_for_more;
pub use persist::{ensure_dir, AtomicFile, PersistError};
pub use recovery::RecoverySupervisor;
pub use settings::{EngineSettings, EngineTimings, ViewSelectors};
pub use snapshot::{Interaction, SnapshotView};
pub use types::{ActionReport, SkipReason, StartOutcome, StepOutcome, TickOutcome, ViewError};
pub use view::LiveView;
