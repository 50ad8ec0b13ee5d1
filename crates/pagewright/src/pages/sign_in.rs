//! OAuth provider login forms the home page hands over to.

use super::HomePage;
use crate::browser::Browser;
use crate::component::{Button, Component, TextInput};
use crate::navigation::page_has_loaded;
use crate::page::{Page, PageBinder, PageUrl};
use crate::result::PagewrightResult;
use crate::wait::{element_is_visible, WaitCondition};

/// Google account chooser / password form
#[derive(Debug, Clone)]
pub struct GoogleSignInPage {
    browser: Browser,
    url: PageUrl,
    /// Email or phone field
    pub email: TextInput,
    /// Button after the email step
    pub email_next: Button,
    /// Password field, rendered after the email step
    pub password: TextInput,
    /// Button after the password step
    pub password_next: Button,
}

impl Page for GoogleSignInPage {
    fn open(browser: Browser) -> Self {
        let bind = PageBinder::new(&browser);
        Self {
            url: PageUrl::new("https", "accounts.google.com", None, "/**"),
            email: bind.component("#identifierId"),
            email_next: bind.component("#identifierNext"),
            password: bind.component("input[name=password]"),
            password_next: bind.component("#passwordNext"),
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
        let email = self.email.handle().clone();
        element_is_visible(move || email.clone())
    }
}

impl GoogleSignInPage {
    /// Complete both steps of the form; returns once the tenant home page loaded
    pub async fn sign_in(&self, email: &str, password: &str) -> PagewrightResult<()> {
        self.email.type_text(email).await?;
        self.email_next.click().await?;

        let field = self.password.handle().clone();
        self.browser
            .wait(element_is_visible(move || field.clone()))
            .await?;
        self.password.type_text(password).await?;
        self.password_next.click().await?;

        self.browser.wait(page_has_loaded::<HomePage>(&self.browser)).await?;
        Ok(())
    }
}

/// Facebook login form
#[derive(Debug, Clone)]
pub struct FacebookSignInPage {
    browser: Browser,
    url: PageUrl,
    /// Email field
    pub email: TextInput,
    /// Password field
    pub password: TextInput,
    /// Submit button
    pub login: Button,
}

impl Page for FacebookSignInPage {
    fn open(browser: Browser) -> Self {
        let bind = PageBinder::new(&browser);
        Self {
            url: PageUrl::new("https", "www.facebook.com", None, "/**"),
            email: bind.component("#email"),
            password: bind.component("#pass"),
            login: bind.component("#loginbutton"),
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
        let email = self.email.handle().clone();
        element_is_visible(move || email.clone())
    }
}

impl FacebookSignInPage {
    /// Submit the form; returns once the tenant home page loaded
    pub async fn sign_in(&self, email: &str, password: &str) -> PagewrightResult<()> {
        self.email.type_text(email).await?;
        self.password.type_text(password).await?;
        self.login.click().await?;
        self.browser.wait(page_has_loaded::<HomePage>(&self.browser)).await?;
        Ok(())
    }
}
