//! Browser session handed to page objects.
//!
//! Bundles the shared driver, the settings of the run (tenant, domain,
//! timeouts) and the wait entry points that use those settings as defaults.

use crate::config::Settings;
use crate::driver::Driver;
use crate::element::{ElementHandle, Selector};
use crate::result::PagewrightResult;
use crate::wait::{self, RaceResult, WaitCondition, WaitOptions, WaitResult};
use std::sync::Arc;

/// A test's browser session. Cheap to clone; clones share the driver.
#[derive(Debug, Clone)]
pub struct Browser {
    driver: Arc<dyn Driver>,
    settings: Arc<Settings>,
}

impl Browser {
    /// Create a session over a driver
    pub fn new<D: Driver + 'static>(driver: D, settings: Settings) -> Self {
        Self::from_arc(Arc::new(driver), settings)
    }

    /// Create a session over an already shared driver
    #[must_use]
    pub fn from_arc(driver: Arc<dyn Driver>, settings: Settings) -> Self {
        Self {
            driver,
            settings: Arc::new(settings),
        }
    }

    /// Shared driver
    #[must_use]
    pub fn driver(&self) -> Arc<dyn Driver> {
        Arc::clone(&self.driver)
    }

    /// Settings of this run
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Tenant page URLs are built for
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.settings.tenant
    }

    /// Default wait options
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.settings.wait_options()
    }

    /// Handle expecting exactly one node
    pub fn find_by(&self, selector: impl Into<Selector>) -> ElementHandle {
        ElementHandle::single(self.driver(), selector)
    }

    /// Handle over a group of nodes
    pub fn find_multiple_by(&self, selector: impl Into<Selector>) -> ElementHandle {
        ElementHandle::multiple(self.driver(), selector)
    }

    /// Wait with the default timeout
    pub async fn wait(&self, condition: WaitCondition) -> PagewrightResult<WaitResult> {
        wait::wait(&condition, &self.wait_options()).await
    }

    /// Wait with an explicit timeout
    pub async fn wait_with_timeout(
        &self,
        condition: WaitCondition,
        timeout_ms: u64,
    ) -> PagewrightResult<WaitResult> {
        let options = self.wait_options().with_timeout(timeout_ms);
        wait::wait(&condition, &options).await
    }

    /// Race conditions with the default timeout
    pub async fn wait_any(&self, conditions: &[WaitCondition]) -> PagewrightResult<RaceResult> {
        wait::wait_any(conditions, &self.wait_options()).await
    }

    /// Race conditions with an explicit timeout
    pub async fn wait_any_with_timeout(
        &self,
        conditions: &[WaitCondition],
        timeout_ms: u64,
    ) -> PagewrightResult<RaceResult> {
        let options = self.wait_options().with_timeout(timeout_ms);
        wait::wait_any(conditions, &options).await
    }

    /// Navigate to a URL; does not wait for the page to load
    pub async fn navigate(&self, url: &str) -> PagewrightResult<()> {
        tracing::debug!(url, "navigate");
        self.driver.navigate(url).await
    }

    /// Current location
    pub async fn current_url(&self) -> PagewrightResult<String> {
        self.driver.current_url().await
    }

    /// Delete every cookie of a domain (bare host or URL)
    pub async fn clear_cookies(&self, domain: &str) -> PagewrightResult<()> {
        tracing::debug!(domain, "clear cookies");
        self.driver.clear_cookies(domain).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockNode};
    use crate::wait::element_is_visible;
    use std::time::Duration;
    use tokio::time::Instant;

    fn session() -> (MockDriver, Browser) {
        let mock = MockDriver::new();
        let browser = Browser::new(
            mock.clone(),
            Settings::default().with_default_timeout(500).with_poll_interval(50),
        );
        (mock, browser)
    }

    #[test]
    fn test_accessors() {
        let (_, browser) = session();
        assert_eq!(browser.tenant(), "login");
        assert_eq!(browser.wait_options().timeout_ms, 500);
        assert_eq!(browser.settings().port, 3000);
        assert_eq!(browser.find_by("#a").describe(), "`#a`");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_uses_settings_timeout() {
        let (_, browser) = session();
        let missing = browser.find_by("#missing");
        let start = Instant::now();
        let err = browser
            .wait(element_is_visible(move || missing.clone()))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_timeout_overrides() {
        let (_, browser) = session();
        let missing = browser.find_by("#missing");
        let start = Instant::now();
        let err = browser
            .wait_with_timeout(element_is_visible(move || missing.clone()), 100)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("`#missing`"));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_any_picks_present_element() {
        let (mock, browser) = session();
        mock.update(|dom| dom.insert(MockNode::new("#b")));
        let (a, b) = (browser.find_by("#a"), browser.find_by("#b"));
        let race = browser
            .wait_any(&[
                element_is_visible(move || a.clone()),
                element_is_visible(move || b.clone()),
            ])
            .await
            .unwrap();
        assert_eq!(race.index, 1);
    }

    #[tokio::test]
    async fn test_driver_passthrough() {
        let (mock, browser) = session();
        mock.update(|dom| {
            dom.add_cookie(".google.com", "SID");
            dom.add_cookie("facebook.com", "c_user");
        });

        browser.navigate("http://login.dev.fider.io:3000/").await.unwrap();
        assert_eq!(
            browser.current_url().await.unwrap(),
            "http://login.dev.fider.io:3000/"
        );

        browser.clear_cookies("https://accounts.google.com").await.unwrap();
        assert_eq!(mock.inspect(|dom| dom.cookies_for("google.com").len()), Some(0));
        assert_eq!(mock.inspect(|dom| dom.cookies_for("facebook.com").len()), Some(1));
        assert!(mock.was_called("clear_cookies:accounts.google.com"));
    }
}
