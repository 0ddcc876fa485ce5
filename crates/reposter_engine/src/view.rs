use async_trait::async_trait;

use crate::ViewError;

/// The host view the engine observes and drives.
///
/// Nodes are transient handles: any of them may disappear between two calls,
/// in which case implementations return [`ViewError::Detached`] or an empty
/// result. `scope = None` queries the whole document.
#[async_trait]
pub trait LiveView: Send + Sync {
    type Node: Send + Sync;

    async fn location(&self) -> Result<String, ViewError>;

    async fn query_all(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
    ) -> Result<Vec<Self::Node>, ViewError>;

    async fn query(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
    ) -> Result<Option<Self::Node>, ViewError> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }

    /// First node matching `selector` whose text contains `text`, answered
    /// in a single pass over the view.
    async fn find_with_text(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
        text: &str,
    ) -> Result<Option<Self::Node>, ViewError>;

    /// Full text content of the node, descendants included.
    async fn text(&self, node: &Self::Node) -> Result<String, ViewError>;

    async fn attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>, ViewError>;

    async fn click(&self, node: &Self::Node) -> Result<(), ViewError>;

    async fn scroll_into_view(&self, node: &Self::Node) -> Result<(), ViewError>;

    async fn focus(&self, node: &Self::Node) -> Result<(), ViewError>;

    /// Inserts text the way a user edit would, at the current caret.
    async fn insert_text(&self, node: &Self::Node, text: &str) -> Result<(), ViewError>;

    /// Overwrites the node's content directly.
    async fn replace_text(&self, node: &Self::Node, text: &str) -> Result<(), ViewError>;

    /// Dispatches synthetic input-change events so the host revalidates the field.
    async fn notify_input(&self, node: &Self::Node) -> Result<(), ViewError>;

    async fn document_height(&self) -> Result<i64, ViewError>;

    async fn scroll_to(&self, top: i64) -> Result<(), ViewError>;

    async fn reload(&self) -> Result<(), ViewError>;
}
