//! Idea detail page and its support counter.

use crate::browser::Browser;
use crate::component::{Button, Component, WebComponent};
use crate::page::{Page, PageBinder, PageUrl};
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{condition, element_is_visible, WaitCondition};

/// Detail page of a single idea: `/ideas/:number/:slug`
#[derive(Debug, Clone)]
pub struct ShowIdeaPage {
    browser: Browser,
    url: PageUrl,
    /// Idea title
    pub title: WebComponent,
    /// Idea description
    pub description: WebComponent,
    /// Support (vote) button
    pub support_button: Button,
    /// Number of supporters
    pub support_counter: WebComponent,
}

impl Page for ShowIdeaPage {
    fn open(browser: Browser) -> Self {
        let bind = PageBinder::new(&browser);
        Self {
            url: PageUrl::for_tenant(browser.settings(), browser.tenant(), "/ideas/:number/*"),
            title: bind.component("#idea-title"),
            description: bind.component(".idea-description"),
            support_button: bind.component(".support-counter button"),
            support_counter: bind.component(".support-counter .number"),
            browser,
        }
    }

    fn browser(&self) -> &Browser {
        &self.browser
    }

    fn url(&self) -> &PageUrl {
        &self.url
    }

    fn load_condition(&self) -> WaitCondition {
        let title = self.title.handle().clone();
        element_is_visible(move || title.clone())
    }
}

impl ShowIdeaPage {
    /// Number of the idea currently shown
    pub async fn number(&self) -> PagewrightResult<u64> {
        let current = self.browser.current_url().await?;
        self.url
            .params(&current)
            .get("number")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| PagewrightError::invalid_argument(format!("{current} is not an idea page")))
    }

    /// Current supporter count
    pub async fn support_count(&self) -> PagewrightResult<u64> {
        let text = self.support_counter.text().await?;
        text.trim().parse().map_err(|_| {
            PagewrightError::invalid_argument(format!("support counter shows {text:?}"))
        })
    }

    /// Toggle support and wait for the counter to change
    pub async fn toggle_support(&self) -> PagewrightResult<u64> {
        let before = self.support_count().await?;
        self.support_button.click().await?;

        let counter = self.support_counter.handle().clone();
        let changed = condition(format!("support counter to leave {before}"), move || {
            let counter = counter.clone();
            async move {
                let text = counter.text().await?;
                Ok::<_, PagewrightError>(text.trim().parse::<u64>().is_ok_and(|n| n != before))
            }
        });
        self.browser.wait(changed).await?;
        self.support_count().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::driver::{MockDriver, MockNode};
    use std::time::Duration;

    const IDEA: &str = "http://login.dev.fider.io:3000/ideas/42/dark-mode";

    fn idea_page() -> (MockDriver, ShowIdeaPage) {
        let mock = MockDriver::new();
        mock.update(|dom| {
            dom.set_url(IDEA);
            dom.insert(MockNode::new("#idea-title").with_text("Dark mode"));
            dom.insert(MockNode::new(".support-counter button"));
            dom.insert(MockNode::new(".support-counter .number").with_text(" 3 "));
        });
        let browser = Browser::new(mock.clone(), Settings::default().with_default_timeout(1_000));
        (mock, ShowIdeaPage::open(browser))
    }

    #[tokio::test]
    async fn test_number_and_count() {
        let (_, page) = idea_page();
        assert_eq!(page.number().await.unwrap(), 42);
        assert_eq!(page.support_count().await.unwrap(), 3);
        assert!(page.load_condition().check().await.unwrap());
        assert!(page.url().matches(IDEA));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_support_waits_for_counter() {
        let (mock, page) = idea_page();
        mock.on_click(".support-counter button", Duration::from_millis(150), |dom| {
            dom.set_text(".support-counter .number", "4");
        });
        assert_eq!(page.toggle_support().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_number_off_page() {
        let (mock, page) = idea_page();
        mock.update(|dom| dom.set_url("http://login.dev.fider.io:3000/"));
        assert!(matches!(
            page.number().await,
            Err(PagewrightError::InvalidArgument { .. })
        ));
    }
}
