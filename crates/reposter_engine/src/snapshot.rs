//! A [`LiveView`] over a static HTML document.
//!
//! Queries run against the parsed markup; interactions are recorded instead
//! of executed. Tests swap the markup between ticks to simulate lazy loading,
//! and can install the markup a reload should produce.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::{LiveView, ViewError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Carries the node's label: its `data-testid`, else `aria-label`, else tag name.
    Click(String),
    ScrollIntoView(String),
    Focus(String),
    InsertText(String),
    ReplaceText(String),
    NotifyInput(String),
    ScrollTo(i64),
    Reload,
}

#[derive(Debug)]
struct Inner {
    location: String,
    html: String,
    /// Parsed lazily; dropped whenever `html` changes.
    parsed: Option<Html>,
    document_height: i64,
    reload_html: Option<String>,
    insert_text_works: bool,
    failing: HashSet<String>,
    edited: HashMap<NodeId, String>,
    interactions: Vec<Interaction>,
    reads: usize,
}

impl Inner {
    fn document(&mut self) -> &Html {
        self.parsed
            .get_or_insert_with(|| Html::parse_document(&self.html))
    }

    fn replace_html(&mut self, html: String) {
        self.html = html;
        self.parsed = None;
        self.edited.clear();
    }

    fn content(&mut self, node: NodeId) -> Result<String, ViewError> {
        if let Some(edited) = self.edited.get(&node) {
            return Ok(edited.clone());
        }
        Ok(element(self.document(), node)?.text().collect())
    }

    /// Label of an attached node, or `Detached` if it fails on purpose.
    fn target(&mut self, node: NodeId) -> Result<String, ViewError> {
        let label = label(element(self.document(), node)?);
        if self.failing.contains(&label) {
            return Err(ViewError::Detached);
        }
        Ok(label)
    }
}

#[derive(Debug)]
pub struct SnapshotView {
    inner: Mutex<Inner>,
}

impl SnapshotView {
    pub fn new(location: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                location: location.into(),
                html: html.into(),
                parsed: None,
                document_height: 0,
                reload_html: None,
                insert_text_works: true,
                failing: HashSet::new(),
                edited: HashMap::new(),
                interactions: Vec::new(),
                reads: 0,
            }),
        }
    }

    pub fn with_document_height(self, height: i64) -> Self {
        self.set_document_height(height);
        self
    }

    /// Makes `insert_text` a silent no-op, as when the host ignores the edit.
    pub fn with_ignored_text_insertion(self) -> Self {
        self.lock().insert_text_works = false;
        self
    }

    /// Every interaction with a node carrying `label` fails as if the node
    /// had been detached mid-action.
    pub fn with_failing_node(self, label: impl Into<String>) -> Self {
        self.lock().failing.insert(label.into());
        self
    }

    pub fn set_html(&self, html: impl Into<String>) {
        self.lock().replace_html(html.into());
    }

    pub fn set_document_height(&self, height: i64) {
        self.lock().document_height = height;
    }

    /// Markup that replaces the document on the next reload.
    pub fn set_reload_html(&self, html: impl Into<String>) {
        self.lock().reload_html = Some(html.into());
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.lock().interactions.clone()
    }

    /// Labels of clicked nodes, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.lock()
            .interactions
            .iter()
            .filter_map(|interaction| match interaction {
                Interaction::Click(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_interactions(&self) {
        self.lock().interactions.clear();
    }

    /// Number of read calls answered so far (queries, text, attributes,
    /// location, height).
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> MutexGuard<'_, Inner> {
        let mut inner = self.lock();
        inner.reads += 1;
        inner
    }

    fn record(&self, node: NodeId, interaction: fn(String) -> Interaction) -> Result<(), ViewError> {
        let mut inner = self.lock();
        let label = inner.target(node)?;
        inner.interactions.push(interaction(label));
        Ok(())
    }
}

#[async_trait]
impl LiveView for SnapshotView {
    type Node = NodeId;

    async fn location(&self) -> Result<String, ViewError> {
        Ok(self.read().location.clone())
    }

    async fn query_all(
        &self,
        scope: Option<&NodeId>,
        selector: &str,
    ) -> Result<Vec<NodeId>, ViewError> {
        let selector = parse_selector(selector)?;
        let mut inner = self.read();
        let doc = inner.document();
        let ids = match scope {
            Some(node) => element(doc, *node)?
                .select(&selector)
                .map(|found| found.id())
                .collect(),
            None => doc.select(&selector).map(|found| found.id()).collect(),
        };
        Ok(ids)
    }

    async fn find_with_text(
        &self,
        scope: Option<&NodeId>,
        selector: &str,
        text: &str,
    ) -> Result<Option<NodeId>, ViewError> {
        let selector = parse_selector(selector)?;
        let mut inner = self.read();
        let candidates: Vec<NodeId> = {
            let doc = inner.document();
            match scope {
                Some(node) => element(doc, *node)?
                    .select(&selector)
                    .map(|found| found.id())
                    .collect(),
                None => doc.select(&selector).map(|found| found.id()).collect(),
            }
        };
        for node in candidates {
            if inner.content(node)?.contains(text) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    async fn text(&self, node: &NodeId) -> Result<String, ViewError> {
        self.read().content(*node)
    }

    async fn attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>, ViewError> {
        let mut inner = self.read();
        let value = element(inner.document(), *node)?
            .value()
            .attr(name)
            .map(str::to_owned);
        Ok(value)
    }

    async fn click(&self, node: &NodeId) -> Result<(), ViewError> {
        self.record(*node, Interaction::Click)
    }

    async fn scroll_into_view(&self, node: &NodeId) -> Result<(), ViewError> {
        self.record(*node, Interaction::ScrollIntoView)
    }

    async fn focus(&self, node: &NodeId) -> Result<(), ViewError> {
        self.record(*node, Interaction::Focus)
    }

    async fn insert_text(&self, node: &NodeId, text: &str) -> Result<(), ViewError> {
        let mut inner = self.lock();
        inner.target(*node)?;
        inner.interactions.push(Interaction::InsertText(text.to_string()));
        if inner.insert_text_works {
            inner.edited.entry(*node).or_default().push_str(text);
        }
        Ok(())
    }

    async fn replace_text(&self, node: &NodeId, text: &str) -> Result<(), ViewError> {
        let mut inner = self.lock();
        inner.target(*node)?;
        inner.interactions.push(Interaction::ReplaceText(text.to_string()));
        inner.edited.insert(*node, text.to_string());
        Ok(())
    }

    async fn notify_input(&self, node: &NodeId) -> Result<(), ViewError> {
        self.record(*node, Interaction::NotifyInput)
    }

    async fn document_height(&self) -> Result<i64, ViewError> {
        Ok(self.read().document_height)
    }

    async fn scroll_to(&self, top: i64) -> Result<(), ViewError> {
        self.lock().interactions.push(Interaction::ScrollTo(top));
        Ok(())
    }

    async fn reload(&self) -> Result<(), ViewError> {
        let mut inner = self.lock();
        inner.interactions.push(Interaction::Reload);
        match inner.reload_html.take() {
            Some(html) => inner.replace_html(html),
            None => inner.edited.clear(),
        }
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ViewError> {
    Selector::parse(selector).map_err(|err| ViewError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{err:?}"),
    })
}

fn element(doc: &Html, node: NodeId) -> Result<ElementRef<'_>, ViewError> {
    doc.tree
        .get(node)
        .and_then(ElementRef::wrap)
        .ok_or(ViewError::Detached)
}

fn label(element: ElementRef<'_>) -> String {
    let value = element.value();
    value
        .attr("data-testid")
        .or_else(|| value.attr("aria-label"))
        .unwrap_or_else(|| value.name())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html><body>
        <article data-testid="tweet"><span>first</span><a href="/a/status/1">link</a></article>
        <article data-testid="tweet"><span>second</span></article>
    </body></html>"#;

    #[tokio::test]
    async fn scoped_queries_only_see_descendants() {
        let view = SnapshotView::new("https://x.com/search", DOC);
        let items = view.query_all(None, "article").await.unwrap();
        assert_eq!(items.len(), 2);

        let link = view.query(Some(&items[0]), "a").await.unwrap();
        assert!(link.is_some());
        assert!(view.query(Some(&items[1]), "a").await.unwrap().is_none());
        assert_eq!(view.text(&items[1]).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn edits_shadow_the_markup_until_the_document_changes() {
        let view = SnapshotView::new("https://x.com/search", DOC);
        let span = view.query(None, "span").await.unwrap().unwrap();

        view.replace_text(&span, "").await.unwrap();
        view.insert_text(&span, "hello").await.unwrap();
        assert_eq!(view.text(&span).await.unwrap(), "hello");

        view.set_html(DOC);
        assert_eq!(view.text(&span).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn reload_swaps_in_the_new_document() {
        let view = SnapshotView::new("https://x.com/search", DOC);
        assert_eq!(view.query_all(None, "article").await.unwrap().len(), 2);

        view.set_reload_html("<html><body><article>only</article></body></html>");
        view.reload().await.unwrap();
        let items = view.query_all(None, "article").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(view.text(&items[0]).await.unwrap(), "only");
    }

    #[tokio::test]
    async fn text_search_answers_in_one_read() {
        let view = SnapshotView::new("https://x.com/search", DOC);
        let found = view.find_with_text(None, "span", "seco").await.unwrap();
        let second = view.query_all(None, "span").await.unwrap()[1];
        assert_eq!(found, Some(second));
        assert_eq!(view.reads(), 2);
        assert!(view.find_with_text(None, "span", "third").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_nodes_refuse_interactions() {
        let view = SnapshotView::new("https://x.com/search", DOC).with_failing_node("tweet");
        let item = view.query(None, "article").await.unwrap().unwrap();
        assert_eq!(view.click(&item).await, Err(ViewError::Detached));
        assert!(view.interactions().is_empty());
    }

    #[tokio::test]
    async fn invalid_selectors_are_reported() {
        let view = SnapshotView::new("https://x.com/search", DOC);
        assert!(matches!(
            view.query_all(None, "[[").await,
            Err(ViewError::InvalidSelector { .. })
        ));
    }
}
