//! Pagewright: typed page objects for browser end-to-end tests
//!
//! A test describes each page of the application as a struct whose fields
//! are lazily-resolved element handles, and synchronizes with navigation
//! and rendering through composable wait conditions.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ Test       │──►│ Page       │──►│ Element    │──►│ Driver     │
//! │ (workflow) │   │ Object     │   │ Handles    │   │ (mock/CDP) │
//! └────────────┘   └─────┬──────┘   └────────────┘   └────────────┘
//!                        │ wait / wait_any
//!                        ▼
//!                  ┌────────────┐
//!                  │ Wait       │
//!                  │ Conditions │
//!                  └────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let browser = Browser::new(driver, Settings::from_env()?);
//! let home = goto::<HomePage>(&browser).await?;
//! home.submit_new_idea("Dark mode", "Please").await?;
//!
//! let outcome = home.sign_in_with_google().await?;
//! if outcome.is::<GoogleSignInPage>() {
//!     GoogleSignInPage::open(browser.clone())
//!         .sign_in("jon@example.com", "secret")
//!         .await?;
//! }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
#[cfg(feature = "chromium")]
mod cdp;
mod component;
mod config;
mod driver;
mod element;
pub mod logging;
#[allow(clippy::cast_possible_truncation)]
mod navigation;
mod page;
pub mod pages;
mod result;
#[allow(clippy::cast_possible_truncation)]
mod wait;

pub use browser::Browser;
#[cfg(feature = "chromium")]
pub use cdp::{CdpDriver, CdpOptions};
pub use component::{Button, Component, ElementList, TextInput, WebComponent};
pub use config::{Settings, ENV_PREFIX};
pub use driver::{Driver, MockCookie, MockDom, MockDriver, MockNode, NodeRef};
pub use element::{Cardinality, ElementHandle, Selector};
pub use navigation::{
    goto, page_has_loaded, url_matches, wait_for_any_page, wait_for_any_page_with_timeout,
    PageCandidate, PageOutcome,
};
pub use page::{Page, PageBinder, PageUrl, UrlMatcher};
pub use result::{OptionalAction, PagewrightError, PagewrightResult};
pub use wait::{
    condition, element_is_hidden, element_is_visible, wait, wait_any, RaceResult, WaitCondition,
    WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Everything a test file usually needs
pub mod prelude {
    pub use super::component::*;
    pub use super::navigation::*;
    pub use super::page::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::wait::*;
    pub use super::{Browser, ElementHandle, MockDriver, MockNode, Settings};
}
