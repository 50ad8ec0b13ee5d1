//! Real Chromium driver over the Chrome DevTools Protocol.
//!
//! Nodes are addressed by `(selector, index)` and looked up again on every
//! call; a node that disappeared in between surfaces as `ElementNotFound`.

use crate::driver::{cookie_host, cookie_matches, Driver, NodeRef};
use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::network::{DeleteCookiesParams, GetCookiesParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Launch options for [`CdpDriver`]
#[derive(Debug, Clone)]
pub struct CdpOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// Explicit Chromium executable
    pub chromium_path: Option<String>,
}

impl Default for CdpOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
        }
    }
}

impl CdpOptions {
    /// Show the browser window
    #[must_use]
    pub const fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Disable the sandbox (containers, CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Use a specific Chromium executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

fn cdp_error(err: impl Display) -> PagewrightError {
    PagewrightError::driver(err.to_string())
}

fn js_string(value: &str) -> PagewrightResult<String> {
    serde_json::to_string(value).map_err(cdp_error)
}

/// Driver controlling one Chromium tab
#[derive(Debug)]
pub struct CdpDriver {
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium and open a blank tab
    pub async fn launch(options: CdpOptions) -> PagewrightResult<Self> {
        let mut builder = CdpConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(cdp_error)?;

        let (browser, mut handler) = CdpBrowser::launch(config).await.map_err(cdp_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
        tracing::info!(headless = options.headless, "chromium launched");
        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            page,
            handler,
        })
    }

    /// Close the browser
    pub async fn close(self) -> PagewrightResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(cdp_error)?;
        self.handler.abort();
        Ok(())
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> PagewrightResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(cdp_error)?
            .into_value()
            .map_err(cdp_error)
    }

    /// Evaluate `body` with `el` bound to the node; `null` when it is gone
    async fn with_node<T: DeserializeOwned>(
        &self,
        node: &NodeRef,
        body: &str,
    ) -> PagewrightResult<T> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({})[{}]; if (!el) return null; {body} }})()",
            js_string(&node.selector)?,
            node.index
        );
        self.evaluate::<Option<T>>(script)
            .await?
            .ok_or_else(|| PagewrightError::ElementNotFound {
                selector: node.selector.clone(),
            })
    }

    async fn element(&self, node: &NodeRef) -> PagewrightResult<Element> {
        let mut elements = self
            .page
            .find_elements(node.selector.as_str())
            .await
            .map_err(cdp_error)?;
        if node.index < elements.len() {
            Ok(elements.swap_remove(node.index))
        } else {
            Err(PagewrightError::ElementNotFound {
                selector: node.selector.clone(),
            })
        }
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn find(&self, selector: &str) -> PagewrightResult<Vec<NodeRef>> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)?
        );
        let count: usize = self.evaluate(script).await?;
        Ok((0..count)
            .map(|index| NodeRef::new(selector, index, format!("{selector}@{index}")))
            .collect())
    }

    async fn click(&self, node: &NodeRef) -> PagewrightResult<()> {
        let element = self.element(node).await?;
        element.scroll_into_view().await.map_err(cdp_error)?;
        element.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn type_text(&self, node: &NodeRef, text: &str) -> PagewrightResult<()> {
        let element = self.element(node).await?;
        element.focus().await.map_err(cdp_error)?;
        // insertText keeps newlines as text instead of pressing Enter
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn is_visible(&self, node: &NodeRef) -> PagewrightResult<bool> {
        self.with_node(
            node,
            "const style = getComputedStyle(el); \
             return style.visibility !== 'hidden' && style.display !== 'none' \
             && el.getClientRects().length > 0;",
        )
        .await
    }

    async fn text_content(&self, node: &NodeRef) -> PagewrightResult<String> {
        self.with_node(
            node,
            "return ('value' in el && el.tagName !== 'BUTTON') ? el.value : (el.textContent || '');",
        )
        .await
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(cdp_error)?
            .unwrap_or_default())
    }

    async fn clear_cookies(&self, domain: &str) -> PagewrightResult<()> {
        let host = cookie_host(domain);
        let params = GetCookiesParams {
            urls: Some(vec![format!("https://{host}/"), format!("http://{host}/")]),
        };
        let cookies = self.page.execute(params).await.map_err(cdp_error)?.result.cookies;

        let mut deleted = 0usize;
        for cookie in cookies.iter().filter(|c| cookie_matches(&c.domain, &host)) {
            let params = DeleteCookiesParams::builder()
                .name(cookie.name.clone())
                .domain(cookie.domain.clone())
                .build()
                .map_err(cdp_error)?;
            self.page.execute(params).await.map_err(cdp_error)?;
            deleted += 1;
        }
        tracing::debug!(host, deleted, "cookies cleared");
        Ok(())
    }

    async fn navigate(&self, url: &str) -> PagewrightResult<()> {
        self.page.goto(url).await.map_err(cdp_error)?;
        Ok(())
    }
}
