//! Typed component wrappers over element handles.
//!
//! A component gives a handle a role (button, text input, list) so a page
//! object only exposes the interactions that make sense for the field.

use crate::element::{Cardinality, ElementHandle};
use crate::result::PagewrightResult;
use std::marker::PhantomData;

/// A typed façade over an [`ElementHandle`]
pub trait Component: Clone + Send + Sync + Sized {
    /// Wrap a handle
    fn from_handle(handle: ElementHandle) -> Self;

    /// Underlying handle
    fn handle(&self) -> &ElementHandle;

    /// Human-readable target for logs and wait descriptions
    fn describe(&self) -> String {
        self.handle().describe()
    }
}

/// Generic element: click, read, check visibility
#[derive(Debug, Clone)]
pub struct WebComponent {
    handle: ElementHandle,
}

impl Component for WebComponent {
    fn from_handle(handle: ElementHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

impl WebComponent {
    /// Click the element
    pub async fn click(&self) -> PagewrightResult<()> {
        self.handle.click().await
    }

    /// Whether the element is visible
    pub async fn is_visible(&self) -> PagewrightResult<bool> {
        self.handle.is_visible().await
    }

    /// Text content
    pub async fn text(&self) -> PagewrightResult<String> {
        self.handle.text().await
    }
}

/// A clickable control
#[derive(Debug, Clone)]
pub struct Button {
    handle: ElementHandle,
}

impl Component for Button {
    fn from_handle(handle: ElementHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

impl Button {
    /// Click the button
    pub async fn click(&self) -> PagewrightResult<()> {
        self.handle.click().await
    }

    /// Whether the button is visible
    pub async fn is_visible(&self) -> PagewrightResult<bool> {
        self.handle.is_visible().await
    }

    /// Label of the button
    pub async fn text(&self) -> PagewrightResult<String> {
        self.handle.text().await
    }
}

/// A field accepting keyboard input
#[derive(Debug, Clone)]
pub struct TextInput {
    handle: ElementHandle,
}

impl Component for TextInput {
    fn from_handle(handle: ElementHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

impl TextInput {
    /// Type text verbatim; does not submit
    pub async fn type_text(&self, text: &str) -> PagewrightResult<()> {
        self.handle.type_text(text).await
    }

    /// Click into the field
    pub async fn click(&self) -> PagewrightResult<()> {
        self.handle.click().await
    }

    /// Whether the field is visible
    pub async fn is_visible(&self) -> PagewrightResult<bool> {
        self.handle.is_visible().await
    }

    /// Current text content of the field
    pub async fn text(&self) -> PagewrightResult<String> {
        self.handle.text().await
    }
}

/// A list-like region: one multiple-cardinality handle, items typed as `T`.
#[derive(Debug)]
pub struct ElementList<T> {
    handle: ElementHandle,
    item: PhantomData<fn() -> T>,
}

impl<T> Clone for ElementList<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            item: PhantomData,
        }
    }
}

impl<T: Component> Component for ElementList<T> {
    fn from_handle(handle: ElementHandle) -> Self {
        let handle = match handle.cardinality() {
            Cardinality::Multiple => handle,
            Cardinality::Single => handle.as_multiple(),
        };
        Self {
            handle,
            item: PhantomData,
        }
    }

    fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

impl<T: Component> ElementList<T> {
    /// Number of items currently rendered
    pub async fn count(&self) -> PagewrightResult<usize> {
        self.handle.count().await
    }

    /// Item at `index`; resolution is deferred like any other handle
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        T::from_handle(self.handle.nth(index))
    }

    /// First item
    #[must_use]
    pub fn first(&self) -> T {
        self.get(0)
    }

    /// One component per item currently rendered
    pub async fn items(&self) -> PagewrightResult<Vec<T>> {
        Ok(self
            .handle
            .all()
            .await?
            .into_iter()
            .map(T::from_handle)
            .collect())
    }
}
