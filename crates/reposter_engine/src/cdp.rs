//! Live view backed by a running Chromium-family browser over the DevTools protocol.
//!
//! The engine attaches to an already open tab; it never navigates on its own.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use engine_logging::{engine_info, engine_warn};
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::{LiveView, ViewError};

const TARGET_ATTACH_SETTLE: Duration = Duration::from_millis(500);

const DOCUMENT_HEIGHT_JS: &str =
    "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight)";

pub struct CdpView {
    _browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl CdpView {
    /// Connects to `endpoint` (an `http://host:port` DevTools address or a
    /// `ws://` browser URL) and attaches to the first tab whose URL contains
    /// `url_contains`.
    pub async fn connect(endpoint: &str, url_contains: &str) -> Result<Self, ViewError> {
        let ws_url = resolve_websocket_url(endpoint).await?;
        let (mut browser, mut handler) = Browser::connect(ws_url.as_str())
            .await
            .map_err(ViewError::driver)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    engine_warn!("CDP handler error: {}", err);
                }
            }
        });

        if let Err(err) = browser.fetch_targets().await {
            handler.abort();
            return Err(ViewError::driver(err));
        }
        tokio::time::sleep(TARGET_ATTACH_SETTLE).await;

        let pages = match browser.pages().await {
            Ok(pages) => pages,
            Err(err) => {
                handler.abort();
                return Err(ViewError::driver(err));
            }
        };
        for page in pages {
            let url = page.url().await.ok().flatten().unwrap_or_default();
            if url.contains(url_contains) {
                engine_info!("Attached to {}", url);
                return Ok(Self {
                    _browser: browser,
                    page,
                    handler,
                });
            }
        }

        handler.abort();
        Err(ViewError::PageNotFound(url_contains.to_string()))
    }

    async fn run_on(&self, node: &Element, function: String) -> Result<(), ViewError> {
        node.call_js_fn(function, false)
            .await
            .map(|_| ())
            .map_err(ViewError::driver)
    }
}

impl Drop for CdpView {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl LiveView for CdpView {
    type Node = Element;

    async fn location(&self) -> Result<String, ViewError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(ViewError::driver)?
            .unwrap_or_default())
    }

    async fn query_all(
        &self,
        scope: Option<&Element>,
        selector: &str,
    ) -> Result<Vec<Element>, ViewError> {
        let found = match scope {
            Some(node) => node.find_elements(selector).await,
            None => self.page.find_elements(selector).await,
        };
        found.map_err(ViewError::driver)
    }

    async fn find_with_text(
        &self,
        scope: Option<&Element>,
        selector: &str,
        text: &str,
    ) -> Result<Option<Element>, ViewError> {
        let selector_js = js_string(selector)?;
        let text_js = js_string(text)?;
        let index = match scope {
            Some(node) => node
                .call_js_fn(
                    format!("function() {{ {} }}", text_index_body("this", &selector_js, &text_js)),
                    false,
                )
                .await
                .map_err(ViewError::driver)?
                .result
                .value
                .unwrap_or_default(),
            None => self
                .page
                .evaluate(format!(
                    "(() => {{ {} }})()",
                    text_index_body("document", &selector_js, &text_js)
                ))
                .await
                .map_err(ViewError::driver)?
                .into_value::<serde_json::Value>()
                .map_err(ViewError::driver)?,
        };

        // Only a hit costs a second round trip to fetch the handle.
        let Some(index) = index.as_u64() else {
            return Ok(None);
        };
        let nodes = self.query_all(scope, selector).await?;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|index| nodes.into_iter().nth(index)))
    }

    async fn text(&self, node: &Element) -> Result<String, ViewError> {
        Ok(node
            .inner_text()
            .await
            .map_err(ViewError::driver)?
            .unwrap_or_default())
    }

    async fn attribute(&self, node: &Element, name: &str) -> Result<Option<String>, ViewError> {
        node.attribute(name).await.map_err(ViewError::driver)
    }

    async fn click(&self, node: &Element) -> Result<(), ViewError> {
        node.click().await.map(|_| ()).map_err(ViewError::driver)
    }

    async fn scroll_into_view(&self, node: &Element) -> Result<(), ViewError> {
        node.scroll_into_view()
            .await
            .map(|_| ())
            .map_err(ViewError::driver)
    }

    async fn focus(&self, node: &Element) -> Result<(), ViewError> {
        node.focus().await.map(|_| ()).map_err(ViewError::driver)
    }

    async fn insert_text(&self, node: &Element, text: &str) -> Result<(), ViewError> {
        let text = js_string(text)?;
        self.run_on(
            node,
            format!(
                "function() {{ this.focus(); document.execCommand('insertText', false, {text}); }}"
            ),
        )
        .await
    }

    async fn replace_text(&self, node: &Element, text: &str) -> Result<(), ViewError> {
        let text = js_string(text)?;
        self.run_on(node, format!("function() {{ this.textContent = {text}; }}"))
            .await
    }

    async fn notify_input(&self, node: &Element) -> Result<(), ViewError> {
        self.run_on(
            node,
            r#"function() {
                for (const type of ['focus', 'input', 'change', 'keydown', 'keyup', 'paste']) {
                    const event = new Event(type, { bubbles: true, cancelable: true });
                    if (type === 'keydown' || type === 'keyup') {
                        Object.defineProperty(event, 'key', { value: ' ' });
                        Object.defineProperty(event, 'keyCode', { value: 32 });
                    }
                    this.dispatchEvent(event);
                }
            }"#
            .to_string(),
        )
        .await
    }

    async fn document_height(&self) -> Result<i64, ViewError> {
        let value = self
            .page
            .evaluate(DOCUMENT_HEIGHT_JS)
            .await
            .map_err(ViewError::driver)?
            .into_value::<serde_json::Value>()
            .map_err(ViewError::driver)?;
        value
            .as_f64()
            .map(|height| height as i64)
            .ok_or_else(|| ViewError::Driver(format!("unexpected document height {value}")))
    }

    async fn scroll_to(&self, top: i64) -> Result<(), ViewError> {
        self.page
            .evaluate(format!(
                "window.scrollTo({{ top: {top}, behavior: 'smooth' }})"
            ))
            .await
            .map(|_| ())
            .map_err(ViewError::driver)
    }

    async fn reload(&self) -> Result<(), ViewError> {
        self.page.reload().await.map(|_| ()).map_err(ViewError::driver)
    }
}

/// `ws://` URLs pass through; otherwise the browser's `/json/version`
/// endpoint is asked for its debugger URL.
async fn resolve_websocket_url(endpoint: &str) -> Result<String, ViewError> {
    if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
        return Ok(endpoint.to_string());
    }
    let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
    let body = reqwest::get(&version_url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|err| ViewError::Endpoint(err.to_string()))?
        .text()
        .await
        .map_err(|err| ViewError::Endpoint(err.to_string()))?;
    debugger_url(&body)
}

fn debugger_url(version_body: &str) -> Result<String, ViewError> {
    let json: serde_json::Value =
        serde_json::from_str(version_body).map_err(|err| ViewError::Endpoint(err.to_string()))?;
    json["webSocketDebuggerUrl"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ViewError::Endpoint("no webSocketDebuggerUrl in response".to_string()))
}

/// Script body returning the index of the first `selector` match under
/// `root` whose text contains `text`, or -1.
fn text_index_body(root: &str, selector_js: &str, text_js: &str) -> String {
    format!(
        "const nodes = {root}.querySelectorAll({selector_js}); \
         for (let i = 0; i < nodes.length; i++) {{ \
             if ((nodes[i].innerText || nodes[i].textContent || '').includes({text_js})) return i; \
         }} \
         return -1;"
    )
}

fn js_string(text: &str) -> Result<String, ViewError> {
    serde_json::to_string(text).map_err(ViewError::driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debugger_url_is_read_from_version_body() {
        let body = r#"{"Browser":"Chrome/132","webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/browser/abc"}"#;
        assert_eq!(
            debugger_url(body).unwrap(),
            "ws://127.0.0.1:9222/devtools/browser/abc"
        );
        assert!(matches!(
            debugger_url(r#"{"Browser":"Chrome/132"}"#),
            Err(ViewError::Endpoint(_))
        ));
    }

    #[test]
    fn text_search_script_embeds_escaped_literals() {
        let body = text_index_body("document", &js_string("span").unwrap(), &js_string("it's").unwrap());
        assert!(body.starts_with(r#"const nodes = document.querySelectorAll("span");"#));
        assert!(body.contains(r#".includes("it's")"#));
        assert!(body.ends_with("return -1;"));
    }

    #[test]
    fn text_is_escaped_for_script_literals() {
        assert_eq!(js_string("it's \"quoted\"").unwrap(), r#""it's \"quoted\"""#);
    }
}
