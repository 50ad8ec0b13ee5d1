//! Typed view over the ideas listed on the home page.

use crate::component::{Component, ElementList};
use crate::element::ElementHandle;
use crate::result::PagewrightResult;

/// One idea of the list
#[derive(Debug, Clone)]
pub struct IdeaListItem {
    handle: ElementHandle,
}

impl Component for IdeaListItem {
    fn from_handle(handle: ElementHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ElementHandle {
        &self.handle
    }
}

impl IdeaListItem {
    /// Title: the first non-blank line of the item
    pub async fn title(&self) -> PagewrightResult<String> {
        let text = self.handle.text().await?;
        Ok(text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }

    /// Open the idea
    pub async fn click(&self) -> PagewrightResult<()> {
        self.handle.click().await
    }
}

/// The idea list of a tenant's home page
#[derive(Debug, Clone)]
pub struct IdeaList {
    items: ElementList<IdeaListItem>,
}

impl Component for IdeaList {
    fn from_handle(handle: ElementHandle) -> Self {
        Self {
            items: ElementList::from_handle(handle),
        }
    }

    fn handle(&self) -> &ElementHandle {
        self.items.handle()
    }
}

impl IdeaList {
    /// Number of ideas shown
    pub async fn count(&self) -> PagewrightResult<usize> {
        self.items.count().await
    }

    /// Idea at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> IdeaListItem {
        self.items.get(index)
    }

    /// Titles in display order
    pub async fn titles(&self) -> PagewrightResult<Vec<String>> {
        let mut titles = Vec::new();
        for item in self.items.items().await? {
            titles.push(item.title().await?);
        }
        Ok(titles)
    }

    /// First idea with the given title
    pub async fn find_by_title(&self, title: &str) -> PagewrightResult<Option<IdeaListItem>> {
        for item in self.items.items().await? {
            if item.title().await? == title {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
