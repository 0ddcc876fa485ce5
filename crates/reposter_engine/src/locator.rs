//! Ordered element lookup: strategies are tried lazily and the first hit wins.

use engine_logging::engine_debug;

use crate::LiveView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Css(String),
    /// First element matching `selector` whose text contains `text`.
    CssWithText { selector: String, text: String },
}

impl Strategy {
    async fn resolve<V>(&self, view: &V, scope: Option<&V::Node>) -> Result<Option<V::Node>, crate::ViewError>
    where
        V: LiveView + ?Sized,
    {
        match self {
            Strategy::Css(selector) => view.query(scope, selector).await,
            Strategy::CssWithText { selector, text } => {
                view.find_with_text(scope, selector, text).await
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Locator {
    strategies: Vec<Strategy>,
}

impl Locator {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// CSS selectors in priority order.
    pub fn first_of<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            selectors
                .into_iter()
                .map(|selector| Strategy::Css(selector.into()))
                .collect(),
        )
    }

    pub fn with_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(vec![Strategy::CssWithText {
            selector: selector.into(),
            text: text.into(),
        }])
    }

    /// Returns the first node any strategy finds. A strategy that errors is
    /// logged and treated as a miss.
    pub async fn locate<V>(&self, view: &V, scope: Option<&V::Node>) -> Option<V::Node>
    where
        V: LiveView + ?Sized,
    {
        for strategy in &self.strategies {
            match strategy.resolve(view, scope).await {
                Ok(Some(node)) => return Some(node),
                Ok(None) => {}
                Err(err) => engine_debug!("Locator strategy {:?} failed: {}", strategy, err),
            }
        }
        None
    }
}
