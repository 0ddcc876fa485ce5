use tokio::time::sleep;

use crate::{EngineTimings, LiveView, ViewError};

/// Scrolls to 80% of the document, pauses, then to the bottom, to trigger
/// lazy loading.
pub async fn scroll_for_more<V>(view: &V, timings: &EngineTimings) -> Result<(), ViewError>
where
    V: LiveView + ?Sized,
{
    let height = view.document_height().await?;
    view.scroll_to(height * 8 / 10).await?;
    sleep(timings.pagination_step).await;
    view.scroll_to(height).await
}
