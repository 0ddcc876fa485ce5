use engine_logging::engine_debug;
use regex::Regex;
use reposter_core::{ItemId, ItemSnapshot};
use url::Url;

use crate::{LiveView, ViewError, ViewSelectors};

/// One rendered item from a single extraction pass.
#[derive(Debug)]
pub struct RenderedItem<N> {
    pub node: N,
    pub id: Option<ItemId>,
    pub text: String,
}

impl<N> RenderedItem<N> {
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot::new(self.id.clone(), self.text.clone())
    }
}

/// Lists fully rendered items in document order:
/// - the trimmed text must be longer than `min_text_len`
/// - both the favorite and the re-share controls must be present
/// - the identifier comes from the permanent link, when there is one.
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    item: String,
    favorite: String,
    reshare: String,
    permalink: String,
    pattern: Regex,
    min_text_len: usize,
}

impl ItemExtractor {
    pub fn new(selectors: &ViewSelectors) -> Result<Self, ViewError> {
        let pattern =
            Regex::new(&selectors.permalink_pattern).map_err(|err| ViewError::InvalidSelector {
                selector: selectors.permalink_pattern.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            item: selectors.item.clone(),
            favorite: selectors.favorite.clone(),
            reshare: selectors.reshare.clone(),
            permalink: selectors.permalink.clone(),
            pattern,
            min_text_len: selectors.min_text_len,
        })
    }

    pub async fn extract<V>(&self, view: &V) -> Result<Vec<RenderedItem<V::Node>>, ViewError>
    where
        V: LiveView + ?Sized,
    {
        let nodes = view.query_all(None, &self.item).await?;
        let mut items = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.inspect(view, node).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(err) => engine_debug!("Dropping item that changed mid-scan: {}", err),
            }
        }
        Ok(items)
    }

    async fn inspect<V>(&self, view: &V, node: V::Node) -> Result<Option<RenderedItem<V::Node>>, ViewError>
    where
        V: LiveView + ?Sized,
    {
        let text = view.text(&node).await?;
        if text.trim().chars().count() <= self.min_text_len {
            return Ok(None);
        }
        if view.query(Some(&node), &self.favorite).await?.is_none()
            || view.query(Some(&node), &self.reshare).await?.is_none()
        {
            return Ok(None);
        }

        let id = match view.query(Some(&node), &self.permalink).await? {
            Some(link) => view
                .attribute(&link, "href")
                .await?
                .and_then(|href| self.identifier_from_href(&href)),
            None => None,
        };

        Ok(Some(RenderedItem { node, id, text }))
    }

    pub fn identifier_from_href(&self, href: &str) -> Option<ItemId> {
        self.pattern
            .captures(href)
            .and_then(|captures| captures.get(1))
            .map(|m| ItemId::new(m.as_str()))
    }
}

/// The view is a supported list view when its location contains the path
/// fragment, or when the marker element is rendered.
pub async fn is_supported_view<V>(view: &V, selectors: &ViewSelectors) -> bool
where
    V: LiveView + ?Sized,
{
    let location = view.location().await.unwrap_or_default();
    let path_matches = match Url::parse(&location) {
        Ok(url) => url.path().contains(&selectors.supported_path_fragment),
        Err(_) => location.contains(&selectors.supported_path_fragment),
    };
    if path_matches {
        return true;
    }
    matches!(
        view.query(None, &selectors.supported_view_marker).await,
        Ok(Some(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_comes_from_the_status_segment() {
        let extractor = ItemExtractor::new(&ViewSelectors::default()).unwrap();
        assert_eq!(
            extractor.identifier_from_href("https://x.com/someone/status/1789/photo/1"),
            Some(ItemId::new("1789"))
        );
        assert_eq!(
            extractor.identifier_from_href("/someone/status/42"),
            Some(ItemId::new("42"))
        );
        assert_eq!(extractor.identifier_from_href("/someone/likes"), None);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let selectors = ViewSelectors {
            permalink_pattern: "(".to_string(),
            ..ViewSelectors::default()
        };
        assert!(matches!(
            ItemExtractor::new(&selectors),
            Err(ViewError::InvalidSelector { .. })
        ));
    }
}
