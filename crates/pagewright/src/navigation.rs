//! Navigation helpers: "has page P loaded?" as a wait condition, and
//! branch-on-outcome navigation across several candidate pages.

use crate::browser::Browser;
use crate::page::{Page, PageUrl};
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{RaceResult, WaitCondition};
use std::any::TypeId;

/// Condition holding while the current location matches `url`
#[must_use]
pub fn url_matches(browser: &Browser, url: PageUrl) -> WaitCondition {
    let browser = browser.clone();
    let description = format!("location to match {url}");
    WaitCondition::new(description, move || {
        let browser = browser.clone();
        let url = url.clone();
        async move {
            let current = browser.current_url().await?;
            Ok::<_, PagewrightError>(url.matches(&current))
        }
    })
}

fn loaded<P: Page>(page: &P) -> WaitCondition {
    url_matches(page.browser(), page.url().clone())
        .and(page.load_condition())
        .with_description(format!("{} to load", page.page_name()))
}

/// Condition holding once the browser shows `P`: the location matches
/// P's URL and P's load condition holds. A matching URL alone is not enough.
#[must_use]
pub fn page_has_loaded<P: Page>(browser: &Browser) -> WaitCondition {
    loaded(&P::open(browser.clone()))
}

/// Navigate to `P` and return it once loaded.
///
/// Fails with `InvalidArgument` if P's URL holds placeholders.
pub async fn goto<P: Page>(browser: &Browser) -> PagewrightResult<P> {
    let page = P::open(browser.clone());
    if !page.url().is_concrete() {
        return Err(PagewrightError::invalid_argument(format!(
            "cannot navigate to pattern {}",
            page.url()
        )));
    }
    browser.navigate(&page.url().href()).await?;
    browser.wait(loaded(&page)).await?;
    Ok(page)
}

/// One possible outcome of a navigation
#[derive(Debug, Clone)]
pub struct PageCandidate {
    page_name: String,
    type_id: TypeId,
    condition: WaitCondition,
}

impl PageCandidate {
    /// Candidate "page `P` has loaded"
    #[must_use]
    pub fn of<P: Page>(browser: &Browser) -> Self {
        let page = P::open(browser.clone());
        let condition = loaded(&page);
        Self::for_page(&page, condition)
    }

    /// Candidate `P` recognised by `condition` instead of its load condition.
    ///
    /// Needed when the browser already shows `P` as the race starts and
    /// only a change on the page proves it loaded again.
    #[must_use]
    pub fn when<P: Page>(browser: &Browser, condition: WaitCondition) -> Self {
        Self::for_page(&P::open(browser.clone()), condition)
    }

    fn for_page<P: Page>(page: &P, condition: WaitCondition) -> Self {
        Self {
            page_name: page.page_name().to_string(),
            type_id: TypeId::of::<P>(),
            condition,
        }
    }

    /// Name of the candidate page
    #[must_use]
    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    /// Load condition of the candidate page
    #[must_use]
    pub fn condition(&self) -> &WaitCondition {
        &self.condition
    }
}

/// The candidate page that loaded first
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Name of the page that loaded
    pub page_name: String,
    /// Race details
    pub race: RaceResult,
    type_id: TypeId,
}

impl PageOutcome {
    /// Whether page `P` won
    #[must_use]
    pub fn is<P: Page>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }
}

/// Wait until one of `candidates` has loaded; earlier candidates win ties
pub async fn wait_for_any_page(
    browser: &Browser,
    candidates: &[PageCandidate],
) -> PagewrightResult<PageOutcome> {
    wait_for_any_page_with_timeout(browser, candidates, browser.wait_options().timeout_ms).await
}

/// [`wait_for_any_page`] with an explicit timeout
pub async fn wait_for_any_page_with_timeout(
    browser: &Browser,
    candidates: &[PageCandidate],
    timeout_ms: u64,
) -> PagewrightResult<PageOutcome> {
    let conditions: Vec<WaitCondition> = candidates.iter().map(|c| c.condition.clone()).collect();
    let race = browser.wait_any_with_timeout(&conditions, timeout_ms).await?;
    let winner = candidates
        .get(race.index)
        .ok_or_else(|| PagewrightError::invalid_argument("race winner out of range"))?;
    tracing::info!(page = %winner.page_name, elapsed_ms = race.elapsed.as_millis() as u64, "page loaded");
    Ok(PageOutcome {
        page_name: winner.page_name.clone(),
        type_id: winner.type_id,
        race,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::component::{Component, WebComponent};
    use crate::config::Settings;
    use crate::driver::{MockDriver, MockNode};
    use crate::page::PageBinder;
    use crate::wait::{element_is_hidden, element_is_visible};
    use std::time::Duration;
    use tokio::time::Instant;

    struct Dashboard {
        browser: Browser,
        url: PageUrl,
        header: WebComponent,
    }

    impl Page for Dashboard {
        fn open(browser: Browser) -> Self {
            let bind = PageBinder::new(&browser);
            Self {
                url: PageUrl::for_tenant(browser.settings(), browser.tenant(), "/dashboard"),
                header: bind.component("#dashboard"),
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
            let header = self.header.handle().clone();
            element_is_visible(move || header.clone())
        }
    }

    struct Report {
        browser: Browser,
        url: PageUrl,
        table: WebComponent,
    }

    impl Page for Report {
        fn open(browser: Browser) -> Self {
            let bind = PageBinder::new(&browser);
            Self {
                url: PageUrl::for_tenant(browser.settings(), browser.tenant(), "/reports/:id"),
                table: bind.component("table.report"),
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
            let table = self.table.handle().clone();
            element_is_visible(move || table.clone())
        }

        fn page_name(&self) -> &str {
            "report"
        }
    }

    const DASHBOARD: &str = "http://login.dev.fider.io:3000/dashboard";

    fn session() -> (MockDriver, Browser) {
        let mock = MockDriver::new();
        let settings = Settings::default()
            .with_default_timeout(1_000)
            .with_poll_interval(100);
        (mock.clone(), Browser::new(mock, settings))
    }

    mod page_has_loaded_tests {
        use super::*;

        #[tokio::test]
        async fn test_url_alone_is_not_enough() {
            let (mock, browser) = session();
            mock.update(|dom| dom.set_url(DASHBOARD));
            let cond = page_has_loaded::<Dashboard>(&browser);
            assert!(!cond.check().await.unwrap());

            mock.update(|dom| dom.insert(MockNode::new("#dashboard")));
            assert!(cond.check().await.unwrap());
        }

        #[tokio::test]
        async fn test_marker_alone_is_not_enough() {
            let (mock, browser) = session();
            mock.update(|dom| {
                dom.set_url("http://login.dev.fider.io:3000/");
                dom.insert(MockNode::new("#dashboard"));
            });
            assert!(!page_has_loaded::<Dashboard>(&browser).check().await.unwrap());
        }

        #[test]
        fn test_description_names_page() {
            let (_, browser) = session();
            assert_eq!(
                page_has_loaded::<Dashboard>(&browser).description(),
                "Dashboard to load"
            );
            assert_eq!(
                page_has_loaded::<Report>(&browser).description(),
                "report to load"
            );
        }
    }

    mod goto_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_goto_waits_for_load() {
            let (mock, browser) = session();
            mock.on_navigate(DASHBOARD, Duration::from_millis(250), |dom| {
                dom.insert(MockNode::new("#dashboard"));
            });

            let start = Instant::now();
            let page = goto::<Dashboard>(&browser).await.unwrap();
            assert!(start.elapsed() >= Duration::from_millis(250));
            assert_eq!(page.url().href(), DASHBOARD);
            assert!(mock.was_called(&format!("navigate:{DASHBOARD}")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_goto_pattern_is_rejected() {
            let (mock, browser) = session();
            let err = goto::<Report>(&browser).await.err().unwrap();
            assert!(matches!(err, PagewrightError::InvalidArgument { .. }));
            assert!(!mock.was_called("navigate"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_goto_times_out() {
            let (_, browser) = session();
            let err = goto::<Dashboard>(&browser).await.err().unwrap();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("Dashboard to load"));
        }
    }

    mod any_page_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_second_candidate_wins() {
            let (mock, browser) = session();
            mock.schedule(Duration::from_millis(120), |dom| {
                dom.set_url("http://login.dev.fider.io:3000/reports/9");
                dom.insert(MockNode::new("table.report"));
            });

            let outcome = wait_for_any_page(
                &browser,
                &[
                    PageCandidate::of::<Dashboard>(&browser),
                    PageCandidate::of::<Report>(&browser),
                ],
            )
            .await
            .unwrap();

            assert!(outcome.is::<Report>());
            assert!(!outcome.is::<Dashboard>());
            assert_eq!(outcome.page_name, "report");
            assert_eq!(outcome.race.index, 1);
            assert_eq!(outcome.race.elapsed, Duration::from_millis(200));
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_candidate_loads() {
            let (_, browser) = session();
            let candidates = [
                PageCandidate::of::<Dashboard>(&browser),
                PageCandidate::of::<Report>(&browser),
            ];
            assert_eq!(candidates[1].page_name(), "report");

            let err = wait_for_any_page_with_timeout(&browser, &candidates, 300)
                .await
                .unwrap_err();
            match err {
                PagewrightError::WaitTimeout { condition, .. } => {
                    assert_eq!(condition, "Dashboard to load or report to load");
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_custom_condition_defers_current_page() {
            let (mock, browser) = session();
            mock.update(|dom| {
                dom.set_url(DASHBOARD);
                dom.insert(MockNode::new("#dashboard"));
                dom.insert(MockNode::new(".banner"));
            });
            mock.schedule(Duration::from_millis(250), |dom| {
                dom.clear();
                dom.set_url("http://login.dev.fider.io:3000/reports/3");
                dom.insert(MockNode::new("table.report"));
            });

            let banner = browser.find_by(".banner");
            let reloaded = page_has_loaded::<Dashboard>(&browser)
                .and(element_is_hidden(move || banner.clone()))
                .with_description("Dashboard to reload");
            let candidates = [
                PageCandidate::of::<Report>(&browser),
                PageCandidate::when::<Dashboard>(&browser, reloaded),
            ];
            assert_eq!(candidates[1].page_name(), "Dashboard");
            assert_eq!(candidates[1].condition().description(), "Dashboard to reload");

            let outcome = wait_for_any_page(&browser, &candidates).await.unwrap();
            assert!(outcome.is::<Report>());
            assert_eq!(outcome.race.elapsed, Duration::from_millis(300));
        }

        #[tokio::test(start_paused = true)]
        async fn test_empty_candidates() {
            let (_, browser) = session();
            let err = wait_for_any_page(&browser, &[]).await.unwrap_err();
            assert!(matches!(err, PagewrightError::InvalidArgument { .. }));
        }
    }
}
