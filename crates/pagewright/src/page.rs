//! Page Object Model
//!
//! A page object is a typed façade over one logical page: it owns the
//! browser session, the concrete URL it lives at and its element handles,
//! and exposes workflows that only return once the page reached the state
//! they promise.
//!
//! Fields are bound explicitly through [`PageBinder`] when the page is
//! opened. Binding never touches the DOM; every handle resolves lazily.

use crate::browser::Browser;
use crate::component::Component;
use crate::config::Settings;
use crate::driver::Driver;
use crate::element::{ElementHandle, Selector};
use crate::result::PagewrightResult;
use crate::wait::WaitCondition;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A page of the application under test.
///
/// # Example
///
/// ```ignore
/// struct LoginPage {
///     browser: Browser,
///     url: PageUrl,
///     email: TextInput,
/// }
///
/// impl Page for LoginPage {
///     fn open(browser: Browser) -> Self {
///         let bind = PageBinder::new(&browser);
///         Self {
///             url: PageUrl::for_tenant(browser.settings(), browser.tenant(), "/login"),
///             email: bind.component("#email"),
///             browser,
///         }
///     }
///
///     fn browser(&self) -> &Browser { &self.browser }
///     fn url(&self) -> &PageUrl { &self.url }
///
///     fn load_condition(&self) -> WaitCondition {
///         let email = self.email.handle().clone();
///         element_is_visible(move || email.clone())
///     }
/// }
/// ```
pub trait Page: Send + Sync + Sized + 'static {
    /// Bind the page to a session; computes the URL and the handles
    fn open(browser: Browser) -> Self;

    /// Session the page was opened with
    fn browser(&self) -> &Browser;

    /// Where the page lives, fixed for the lifetime of the object
    fn url(&self) -> &PageUrl;

    /// Condition that holds once the page is ready for interaction
    fn load_condition(&self) -> WaitCondition;

    /// Page name for logging/debugging
    fn page_name(&self) -> &str {
        short_type_name::<Self>()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

// =============================================================================
// BINDING
// =============================================================================

/// Creates the element handles of a page object
#[derive(Debug, Clone)]
pub struct PageBinder {
    driver: Arc<dyn Driver>,
}

impl PageBinder {
    /// Binder over the session's driver
    #[must_use]
    pub fn new(browser: &Browser) -> Self {
        Self {
            driver: browser.driver(),
        }
    }

    /// Raw handle expecting exactly one node
    pub fn find_by(&self, selector: impl Into<Selector>) -> ElementHandle {
        ElementHandle::single(Arc::clone(&self.driver), selector)
    }

    /// Raw handle over a group of nodes
    pub fn find_multiple_by(&self, selector: impl Into<Selector>) -> ElementHandle {
        ElementHandle::multiple(Arc::clone(&self.driver), selector)
    }

    /// Typed component over exactly one node
    pub fn component<T: Component>(&self, selector: impl Into<Selector>) -> T {
        T::from_handle(self.find_by(selector))
    }

    /// Typed component over a group of nodes (lists)
    pub fn components<T: Component>(&self, selector: impl Into<Selector>) -> T {
        T::from_handle(self.find_multiple_by(selector))
    }
}

// =============================================================================
// PAGE URL
// =============================================================================

/// Location of a page: origin plus a path pattern.
///
/// Tenant pages render as `scheme://{tenant}.{base_domain}:{port}/{path}`.
/// The path may hold `:param`, `*` and a trailing `**` segment, in which
/// case the URL is only usable for matching, not for navigation.
#[derive(Debug, Clone)]
pub struct PageUrl {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    matcher: UrlMatcher,
}

impl PageUrl {
    /// Create a URL from its parts
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: Option<u16>,
        path: impl Into<String>,
    ) -> Self {
        let path = normalize_path(&path.into());
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into().to_ascii_lowercase(),
            port,
            matcher: UrlMatcher::new(&path),
            path,
        }
    }

    /// URL of `path` on a tenant of the configured domain
    #[must_use]
    pub fn for_tenant(settings: &Settings, tenant: &str, path: &str) -> Self {
        Self::new(
            settings.scheme.as_str(),
            settings.tenant_host(tenant),
            Some(settings.port),
            path,
        )
    }

    /// URL on a fixed external host, e.g. an identity provider
    pub fn parse(url: &str) -> PagewrightResult<Self> {
        let parsed = Url::parse(url)?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        Ok(Self::new(parsed.scheme(), host, parsed.port(), parsed.path()))
    }

    /// Scheme
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if any
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path pattern
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the path has no placeholders and can be navigated to
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.matcher.is_literal()
    }

    /// Full URL string
    #[must_use]
    pub fn href(&self) -> String {
        self.to_string()
    }

    /// Whether `current` points at this page.
    ///
    /// Compares scheme, host, effective port and path; query string and
    /// fragment are ignored. Unparseable input never matches.
    #[must_use]
    pub fn matches(&self, current: &str) -> bool {
        let Ok(current) = Url::parse(current) else {
            return false;
        };
        let expected_port = self.port.or_else(|| default_port(&self.scheme));
        current.scheme() == self.scheme
            && current.host_str().is_some_and(|h| h.eq_ignore_ascii_case(&self.host))
            && current.port_or_known_default() == expected_port
            && self.matcher.matches(current.path())
    }

    /// Path parameters of `current`, e.g. `number` for `/ideas/:number/*`
    #[must_use]
    pub fn params(&self, current: &str) -> HashMap<String, String> {
        Url::parse(current)
            .map(|u| self.matcher.extract_params(u.path()))
            .unwrap_or_default()
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        f.write_str(&self.path)
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

// =============================================================================
// URL MATCHER
// =============================================================================

/// URL path pattern matcher
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
    Tail,
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/users/*`
    /// - Named parameters: `/users/:id`
    /// - Any remainder, possibly empty: `/docs/**` (last segment only)
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, s)| match *s {
                "**" if i == last => UrlSegment::Tail,
                "*" | "**" => UrlSegment::Wildcard,
                s => s.strip_prefix(':').map_or_else(
                    || UrlSegment::Literal(s.to_string()),
                    |name| UrlSegment::Parameter(name.to_string()),
                ),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL path matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        let fixed = match self.segments.last() {
            Some(UrlSegment::Tail) => {
                let fixed = self.segments.len() - 1;
                if url_segments.len() < fixed {
                    return false;
                }
                fixed
            }
            // wildcards and parameters each consume exactly one segment
            _ => {
                if url_segments.len() != self.segments.len() {
                    return false;
                }
                self.segments.len()
            }
        };

        self.segments[..fixed]
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit.as_str() == *actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) | UrlSegment::Tail => true,
            })
    }

    /// Extract parameters from a URL path
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if let UrlSegment::Parameter(name) = segment {
                if let Some(value) = url_segments.get(i) {
                    let _ = params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        params
    }

    /// Whether the pattern is made of literal segments only
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, UrlSegment::Literal(_)))
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches("/login"));
            assert!(!matcher.matches("/register"));
            assert!(!matcher.matches("/login/extra"));
        }

        #[test]
        fn test_root() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("/"));
            assert!(matcher.matches(""));
            assert!(!matcher.matches("/ideas"));
            assert!(matcher.is_literal());
        }

        #[test]
        fn test_wildcard_and_parameter() {
            let matcher = UrlMatcher::new("/ideas/:number/*");
            assert!(matcher.matches("/ideas/42/add-dark-mode"));
            assert!(!matcher.matches("/ideas/42"));
            assert!(!matcher.matches("/posts/42/add-dark-mode"));
            assert!(!matcher.is_literal());
        }

        #[test]
        fn test_tail() {
            let matcher = UrlMatcher::new("/signin/**");
            assert!(matcher.matches("/signin"));
            assert!(matcher.matches("/signin/v2/identifier"));
            assert!(!matcher.matches("/login/v2"));
        }

        #[test]
        fn test_inner_double_star_is_single_wildcard() {
            let matcher = UrlMatcher::new("/a/**/c");
            assert!(matcher.matches("/a/b/c"));
            assert!(!matcher.matches("/a/b/b/c"));
        }

        #[test]
        fn test_extract_params() {
            let matcher = UrlMatcher::new("/ideas/:number/:slug");
            let params = matcher.extract_params("/ideas/7/dark-mode");
            assert_eq!(params.get("number"), Some(&"7".to_string()));
            assert_eq!(params.get("slug"), Some(&"dark-mode".to_string()));
            assert_eq!(matcher.pattern(), "/ideas/:number/:slug");
        }
    }

    mod page_url_tests {
        use super::*;

        #[test]
        fn test_tenant_template() {
            let settings = Settings::default();
            let url = PageUrl::for_tenant(&settings, "orange", "/");
            assert_eq!(url.href(), "http://orange.dev.fider.io:3000/");
            assert!(url.is_concrete());
        }

        #[test]
        fn test_path_without_slash() {
            let url = PageUrl::for_tenant(&Settings::default(), "demo", "ideas");
            assert_eq!(url.path(), "/ideas");
        }

        #[test]
        fn test_matches_ignores_query_and_fragment() {
            let url = PageUrl::for_tenant(&Settings::default(), "demo", "/");
            assert!(url.matches("http://demo.dev.fider.io:3000/?q=1#top"));
            assert!(url.matches("http://DEMO.dev.fider.io:3000/"));
        }

        #[test]
        fn test_rejects_other_origin() {
            let url = PageUrl::for_tenant(&Settings::default(), "demo", "/");
            assert!(!url.matches("http://other.dev.fider.io:3000/"));
            assert!(!url.matches("https://demo.dev.fider.io:3000/"));
            assert!(!url.matches("http://demo.dev.fider.io:3001/"));
            assert!(!url.matches("http://demo.dev.fider.io:3000/ideas"));
            assert!(!url.matches("not a url"));
        }

        #[test]
        fn test_external_default_port() {
            let url = PageUrl::parse("https://accounts.google.com/signin/**").unwrap();
            assert_eq!(url.port(), None);
            assert_eq!(url.host(), "accounts.google.com");
            assert!(url.matches("https://accounts.google.com/signin/v2/identifier?flow=x"));
            assert!(url.matches("https://accounts.google.com:443/signin"));
            assert!(!url.matches("https://accounts.google.com:8443/signin"));
            assert!(!url.is_concrete());
        }

        #[test]
        fn test_params() {
            let url = PageUrl::for_tenant(&Settings::default(), "demo", "/ideas/:number/*");
            let params = url.params("http://demo.dev.fider.io:3000/ideas/12/title");
            assert_eq!(params.get("number").map(String::as_str), Some("12"));
        }

        #[test]
        fn test_parse_invalid() {
            assert!(PageUrl::parse("::nope").is_err());
        }
    }

    mod binder_tests {
        use super::*;
        use crate::component::{Button, WebComponent};
        use crate::driver::MockDriver;
        use crate::element::Cardinality;

        #[test]
        fn test_binding_is_lazy() {
            let mock = MockDriver::new();
            let browser = Browser::new(mock.clone(), Settings::default());
            let bind = PageBinder::new(&browser);

            let button: Button = bind.component(".primary");
            let list: WebComponent = bind.components(".item");

            assert_eq!(button.handle().cardinality(), Cardinality::Single);
            assert_eq!(list.handle().cardinality(), Cardinality::Multiple);
            assert_eq!(bind.find_by("#x").selector().as_str(), "#x");
            assert!(mock.history().is_empty());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_tenant_url_matches_itself(
                tenant in "[a-z][a-z0-9]{0,15}",
                port in 1u16..,
                segments in prop::collection::vec("[a-z0-9-]{1,12}", 0..4)
            ) {
                let settings = Settings::default().with_port(port);
                let path = format!("/{}", segments.join("/"));
                let url = PageUrl::for_tenant(&settings, &tenant, &path);

                prop_assert_eq!(
                    url.href(),
                    format!("http://{tenant}.dev.fider.io:{port}{path}")
                );
                prop_assert!(url.matches(&url.href()));
            }

            #[test]
            fn prop_other_tenant_never_matches(
                tenant in "[a-z]{1,10}",
                other in "[a-z]{1,10}"
            ) {
                prop_assume!(tenant != other);
                let settings = Settings::default();
                let url = PageUrl::for_tenant(&settings, &tenant, "/");
                let current = PageUrl::for_tenant(&settings, &other, "/").href();
                prop_assert!(!url.matches(&current));
            }

            #[test]
            fn prop_parameter_captures_segment(value in "[a-zA-Z0-9_-]{1,20}") {
                let matcher = UrlMatcher::new("/ideas/:number");
                let path = format!("/ideas/{value}");
                prop_assert!(matcher.matches(&path));
                prop_assert_eq!(
                    matcher.extract_params(&path).get("number").cloned(),
                    Some(value)
                );
            }
        }
    }
}
