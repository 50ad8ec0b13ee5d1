//! Element handles: deferred, re-resolvable references to DOM nodes.
//!
//! # Design Philosophy
//!
//! - **Deferred**: a handle stores a selector, never a node. Every operation
//!   asks the driver again because the page may have re-rendered in between.
//! - **Strict**: single-cardinality handles fail on ambiguous matches instead
//!   of silently picking the first node.
//! - **Side-effect free resolution**: only `click` and `type_text` touch the
//!   page.

use crate::driver::{Driver, NodeRef};
use crate::result::{PagewrightError, PagewrightResult};
use std::fmt;
use std::sync::Arc;

/// A CSS-like selector, immutable once declared
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(String);

impl Selector {
    /// Create a selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Get the selector string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Self(selector)
    }
}

/// How many nodes a handle expects its selector to match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    /// Exactly one node
    #[default]
    Single,
    /// Any number of nodes (list-like regions)
    Multiple,
}

/// A deferred reference to one node or a group of nodes.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    selector: Selector,
    cardinality: Cardinality,
    index: Option<usize>,
    driver: Arc<dyn Driver>,
}

impl ElementHandle {
    /// Create a handle
    pub fn new(
        driver: Arc<dyn Driver>,
        selector: impl Into<Selector>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            selector: selector.into(),
            cardinality,
            index: None,
            driver,
        }
    }

    /// Create a handle expecting exactly one node
    pub fn single(driver: Arc<dyn Driver>, selector: impl Into<Selector>) -> Self {
        Self::new(driver, selector, Cardinality::Single)
    }

    /// Create a handle over a group of nodes
    pub fn multiple(driver: Arc<dyn Driver>, selector: impl Into<Selector>) -> Self {
        Self::new(driver, selector, Cardinality::Multiple)
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the cardinality
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Index this handle is pinned to, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Handle on the `index`-th match of this selector
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self {
            selector: self.selector.clone(),
            cardinality: Cardinality::Single,
            index: Some(index),
            driver: Arc::clone(&self.driver),
        }
    }

    /// Same selector, widened to a group of nodes
    #[must_use]
    pub fn as_multiple(&self) -> Self {
        Self {
            selector: self.selector.clone(),
            cardinality: Cardinality::Multiple,
            index: None,
            driver: Arc::clone(&self.driver),
        }
    }

    /// Human-readable target, e.g. `` `.item`[2] ``
    #[must_use]
    pub fn describe(&self) -> String {
        match self.index {
            Some(i) => format!("`{}`[{i}]", self.selector),
            None => format!("`{}`", self.selector),
        }
    }

    fn not_found(&self) -> PagewrightError {
        PagewrightError::ElementNotFound {
            selector: self.selector.to_string(),
        }
    }

    /// Resolve every current match of the selector
    pub async fn resolve_all(&self) -> PagewrightResult<Vec<NodeRef>> {
        self.driver.find(self.selector.as_str()).await
    }

    /// Resolve to the one node an action applies to.
    ///
    /// Pinned handles take their index, multiple handles take the first
    /// match, single handles require exactly one match.
    pub async fn resolve(&self) -> PagewrightResult<NodeRef> {
        let mut nodes = self.resolve_all().await?;
        match (self.index, self.cardinality) {
            (Some(i), _) => {
                if i < nodes.len() {
                    Ok(nodes.swap_remove(i))
                } else {
                    Err(self.not_found())
                }
            }
            (None, Cardinality::Multiple) => {
                if nodes.is_empty() {
                    Err(self.not_found())
                } else {
                    Ok(nodes.swap_remove(0))
                }
            }
            (None, Cardinality::Single) => match nodes.len() {
                0 => Err(self.not_found()),
                1 => Ok(nodes.swap_remove(0)),
                count => Err(PagewrightError::AmbiguousElement {
                    selector: self.selector.to_string(),
                    count,
                }),
            },
        }
    }

    /// Click the element.
    ///
    /// Returns once the driver dispatched the event; any navigation it
    /// triggers must be awaited by the caller.
    pub async fn click(&self) -> PagewrightResult<()> {
        let node = self.resolve().await?;
        tracing::debug!(target = %self.describe(), "click");
        self.driver.click(&node).await
    }

    /// Type text into the element, characters sent verbatim
    pub async fn type_text(&self, text: &str) -> PagewrightResult<()> {
        let node = self.resolve().await?;
        tracing::debug!(target = %self.describe(), len = text.len(), "type");
        self.driver.type_text(&node, text).await
    }

    /// Text content of the element
    pub async fn text(&self) -> PagewrightResult<String> {
        let node = self.resolve().await?;
        self.driver.text_content(&node).await
    }

    /// Whether the element is visible.
    ///
    /// Absence is a legitimate transient state and yields `false`.
    pub async fn is_visible(&self) -> PagewrightResult<bool> {
        match self.resolve().await {
            Ok(node) => match self.driver.is_visible(&node).await {
                Err(PagewrightError::ElementNotFound { .. }) => Ok(false),
                other => other,
            },
            Err(PagewrightError::ElementNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Number of current matches
    pub async fn count(&self) -> PagewrightResult<usize> {
        Ok(self.resolve_all().await?.len())
    }

    /// One pinned handle per current match
    pub async fn all(&self) -> PagewrightResult<Vec<Self>> {
        let count = self.count().await?;
        Ok((0..count).map(|i| self.nth(i)).collect())
    }
}
