//! Driver - Abstract Browser Automation Contract
//!
//! Page objects never talk to a browser directly. Every DOM query, click,
//! keystroke and cookie operation goes through the [`Driver`] trait, which
//! allows swapping implementations:
//!
//! - `CdpDriver` - real Chromium over CDP (`chromium` feature)
//! - [`MockDriver`] - scriptable in-memory DOM for unit and scenario tests
//!
//! Drivers take `&self` everywhere: the handles of one page share a single
//! `Arc<dyn Driver>`, so implementations use interior mutability.

use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Opaque reference to a node, valid until the page re-renders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    /// Selector the node was found with
    pub selector: String,
    /// Position among the matches of `selector`
    pub index: usize,
    /// Driver-specific node identifier
    pub id: String,
}

impl NodeRef {
    /// Create a node reference
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize, id: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            index,
            id: id.into(),
        }
    }
}

/// Raw browser primitives consumed by element handles and waits.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Find all nodes matching a selector, in document order
    async fn find(&self, selector: &str) -> PagewrightResult<Vec<NodeRef>>;

    /// Dispatch a click on a node
    async fn click(&self, node: &NodeRef) -> PagewrightResult<()>;

    /// Send text to a node verbatim
    async fn type_text(&self, node: &NodeRef, text: &str) -> PagewrightResult<()>;

    /// Whether a node is rendered and visible
    async fn is_visible(&self, node: &NodeRef) -> PagewrightResult<bool>;

    /// Text content of a node
    async fn text_content(&self, node: &NodeRef) -> PagewrightResult<String>;

    /// Current location of the page
    async fn current_url(&self) -> PagewrightResult<String>;

    /// Delete every cookie set for a domain (bare host or URL)
    async fn clear_cookies(&self, domain: &str) -> PagewrightResult<()>;

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> PagewrightResult<()>;
}

/// Host part of a cookie domain given either as host or as URL.
pub(crate) fn cookie_host(domain: &str) -> String {
    url::Url::parse(domain)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| domain.trim_start_matches('.').to_string())
        .to_ascii_lowercase()
}

/// Whether a cookie stored for `cookie_domain` belongs to `host`
pub(crate) fn cookie_matches(cookie_domain: &str, host: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    host == cookie_domain || host.ends_with(&format!(".{cookie_domain}"))
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// A node of the mock DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    /// Selector the node answers to (exact string match)
    pub selector: String,
    /// Whether the node is visible
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Text typed into the node
    pub value: String,
    id: u64,
}

impl MockNode {
    /// Create a visible node answering to `selector`
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            visible: true,
            text: String::new(),
            value: String::new(),
            id: 0,
        }
    }

    /// Mark the node hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Cookie stored by the mock browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCookie {
    /// Cookie domain
    pub domain: String,
    /// Cookie name
    pub name: String,
}

/// The page state a [`MockDriver`] serves.
///
/// Selectors are matched by string equality; the mock is not a CSS engine.
#[derive(Debug, Default)]
pub struct MockDom {
    url: String,
    nodes: Vec<MockNode>,
    cookies: Vec<MockCookie>,
    next_id: u64,
}

impl MockDom {
    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the current URL
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Append a node
    pub fn insert(&mut self, mut node: MockNode) {
        self.next_id += 1;
        node.id = self.next_id;
        self.nodes.push(node);
    }

    /// Remove every node answering to `selector`
    pub fn remove(&mut self, selector: &str) {
        self.nodes.retain(|n| n.selector != selector);
    }

    /// Remove every node (a full page load)
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Show or hide every node answering to `selector`
    pub fn set_visible(&mut self, selector: &str, visible: bool) {
        for node in self.nodes.iter_mut().filter(|n| n.selector == selector) {
            node.visible = visible;
        }
    }

    /// Replace the text of every node answering to `selector`
    pub fn set_text(&mut self, selector: &str, text: &str) {
        for node in self.nodes.iter_mut().filter(|n| n.selector == selector) {
            node.text = text.to_string();
        }
    }

    /// Nodes answering to `selector`
    #[must_use]
    pub fn nodes(&self, selector: &str) -> Vec<&MockNode> {
        self.nodes.iter().filter(|n| n.selector == selector).collect()
    }

    /// Store a cookie
    pub fn add_cookie(&mut self, domain: impl Into<String>, name: impl Into<String>) {
        self.cookies.push(MockCookie {
            domain: domain.into(),
            name: name.into(),
        });
    }

    /// Cookies belonging to a host
    #[must_use]
    pub fn cookies_for(&self, domain: &str) -> Vec<&MockCookie> {
        let host = cookie_host(domain);
        self.cookies
            .iter()
            .filter(|c| cookie_matches(&c.domain, &host))
            .collect()
    }

    fn node(&self, node: &NodeRef) -> PagewrightResult<&MockNode> {
        self.nodes
            .iter()
            .find(|n| n.id.to_string() == node.id)
            .ok_or_else(|| PagewrightError::ElementNotFound {
                selector: node.selector.clone(),
            })
    }

    fn node_mut(&mut self, node: &NodeRef) -> PagewrightResult<&mut MockNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.id.to_string() == node.id)
            .ok_or_else(|| PagewrightError::ElementNotFound {
                selector: node.selector.clone(),
            })
    }
}

type Mutation = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

struct Scheduled {
    due: Instant,
    mutation: Mutation,
}

#[derive(Default)]
struct MockState {
    dom: MockDom,
    scheduled: Vec<Scheduled>,
    on_click: HashMap<String, Vec<(Duration, Mutation)>>,
    on_navigate: HashMap<String, Vec<(Duration, Mutation)>>,
    history: Vec<String>,
    fault: Option<String>,
}

impl MockState {
    fn schedule(&mut self, after: Duration, mutation: Mutation) {
        self.scheduled.push(Scheduled {
            due: Instant::now() + after,
            mutation,
        });
    }

    /// Apply due mutations in due order, then fail if a fault is armed.
    fn tick(&mut self) -> PagewrightResult<()> {
        let now = Instant::now();
        self.scheduled.sort_by_key(|s| s.due);
        let split = self.scheduled.partition_point(|s| s.due <= now);
        let due: Vec<Scheduled> = self.scheduled.drain(..split).collect();
        for scheduled in due {
            (scheduled.mutation)(&mut self.dom);
        }
        match &self.fault {
            Some(message) => Err(PagewrightError::driver(message.clone())),
            None => Ok(()),
        }
    }
}

/// Mock driver for unit testing.
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// scripting while page objects own another. Mutations can be delayed
/// (measured on the tokio clock, so paused-time tests stay deterministic)
/// and attached to clicks or navigations to simulate page transitions.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver").finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create an empty mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> PagewrightResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| PagewrightError::driver("mock driver state poisoned"))
    }

    fn live(&self) -> PagewrightResult<MutexGuard<'_, MockState>> {
        let mut state = self.state()?;
        state.tick()?;
        Ok(state)
    }

    /// Mutate the DOM immediately
    pub fn update(&self, mutation: impl FnOnce(&mut MockDom)) {
        if let Ok(mut state) = self.state() {
            mutation(&mut state.dom);
        }
    }

    /// Mutate the DOM once `after` has elapsed
    pub fn schedule(&self, after: Duration, mutation: impl Fn(&mut MockDom) + Send + Sync + 'static) {
        if let Ok(mut state) = self.state() {
            state.schedule(after, Arc::new(mutation));
        }
    }

    /// Mutate the DOM `after` each click on a node answering to `selector`
    pub fn on_click(
        &self,
        selector: impl Into<String>,
        after: Duration,
        mutation: impl Fn(&mut MockDom) + Send + Sync + 'static,
    ) {
        if let Ok(mut state) = self.state() {
            state
                .on_click
                .entry(selector.into())
                .or_default()
                .push((after, Arc::new(mutation) as Mutation));
        }
    }

    /// Mutate the DOM `after` each navigation to exactly `url`
    pub fn on_navigate(
        &self,
        url: impl Into<String>,
        after: Duration,
        mutation: impl Fn(&mut MockDom) + Send + Sync + 'static,
    ) {
        if let Ok(mut state) = self.state() {
            state
                .on_navigate
                .entry(url.into())
                .or_default()
                .push((after, Arc::new(mutation) as Mutation));
        }
    }

    /// Make every following call fail with a driver fault (`None` heals)
    pub fn set_fault(&self, message: Option<&str>) {
        if let Ok(mut state) = self.state() {
            state.fault = message.map(str::to_string);
        }
    }

    /// Read the DOM
    pub fn inspect<T>(&self, read: impl FnOnce(&MockDom) -> T) -> Option<T> {
        self.state().ok().map(|state| read(&state.dom))
    }

    /// Recorded calls, e.g. `click:#submit`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().map(|s| s.history.clone()).unwrap_or_default()
    }

    /// Check if a call was recorded
    #[must_use]
    pub fn was_called(&self, call: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(call))
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn find(&self, selector: &str) -> PagewrightResult<Vec<NodeRef>> {
        let state = self.live()?;
        Ok(state
            .dom
            .nodes(selector)
            .into_iter()
            .enumerate()
            .map(|(index, node)| NodeRef::new(selector, index, node.id.to_string()))
            .collect())
    }

    async fn click(&self, node: &NodeRef) -> PagewrightResult<()> {
        let mut state = self.live()?;
        let selector = state.dom.node(node)?.selector.clone();
        state.history.push(format!("click:{selector}"));
        let reactions = state.on_click.get(&selector).cloned().unwrap_or_default();
        for (after, mutation) in reactions {
            state.schedule(after, mutation);
        }
        state.tick()
    }

    async fn type_text(&self, node: &NodeRef, text: &str) -> PagewrightResult<()> {
        let mut state = self.live()?;
        let target = state.dom.node_mut(node)?;
        target.value.push_str(text);
        let selector = target.selector.clone();
        state.history.push(format!("type:{selector}:{text}"));
        Ok(())
    }

    async fn is_visible(&self, node: &NodeRef) -> PagewrightResult<bool> {
        let state = self.live()?;
        Ok(state.dom.node(node)?.visible)
    }

    async fn text_content(&self, node: &NodeRef) -> PagewrightResult<String> {
        let state = self.live()?;
        Ok(state.dom.node(node)?.text.clone())
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        let state = self.live()?;
        Ok(state.dom.url.clone())
    }

    async fn clear_cookies(&self, domain: &str) -> PagewrightResult<()> {
        let mut state = self.live()?;
        let host = cookie_host(domain);
        state.dom.cookies.retain(|c| !cookie_matches(&c.domain, &host));
        state.history.push(format!("clear_cookies:{host}"));
        Ok(())
    }

    async fn navigate(&self, url: &str) -> PagewrightResult<()> {
        let mut state = self.live()?;
        state.history.push(format!("navigate:{url}"));
        state.dom.set_url(url);
        let reactions = state.on_navigate.get(url).cloned().unwrap_or_default();
        for (after, mutation) in reactions {
            state.schedule(after, mutation);
        }
        state.tick()
    }
}
