//! Tenant home page: idea submission and the sign-in/sign-out workflows.

use super::{FacebookSignInPage, GoogleSignInPage, IdeaList, ShowIdeaPage};
use crate::browser::Browser;
use crate::component::{Button, Component, TextInput, WebComponent};
use crate::navigation::{page_has_loaded, wait_for_any_page, PageCandidate, PageOutcome};
use crate::page::{Page, PageBinder, PageUrl};
use crate::result::{OptionalAction, PagewrightResult};
use crate::wait::{element_is_hidden, element_is_visible, WaitCondition};
use std::sync::Arc;

const GOOGLE_ACCOUNTS: &str = "https://accounts.google.com";
const FACEBOOK: &str = "https://facebook.com";

/// Home page of a tenant: idea form, idea list and the sign-in modal
#[derive(Debug, Clone)]
pub struct HomePage {
    browser: Browser,
    url: PageUrl,
    /// Title of a new idea
    pub idea_title: TextInput,
    /// Description of a new idea, shown once a title is typed
    pub idea_description: TextInput,
    /// Submits the idea form
    pub submit_idea: Button,
    /// Sign-in link, or the user menu when signed in
    pub user_menu: WebComponent,
    /// Name of the signed-in user
    pub user_name: WebComponent,
    /// Modal listing the sign-in providers
    pub sign_in_modal: WebComponent,
    /// Google provider button of the modal
    pub google_sign_in: Button,
    /// Facebook provider button of the modal
    pub facebook_sign_in: Button,
    /// Validation errors of the idea form
    pub error_box: WebComponent,
    /// Ideas of the tenant
    pub idea_list: IdeaList,
    sign_out_button: Button,
}

impl Page for HomePage {
    fn open(browser: Browser) -> Self {
        let bind = PageBinder::new(&browser);
        Self {
            url: PageUrl::for_tenant(browser.settings(), browser.tenant(), "/"),
            idea_title: bind.component("#new-idea-input"),
            idea_description: bind.component(".ui.form textarea"),
            submit_idea: bind.component(".ui.button.primary"),
            user_menu: bind.component(".signin"),
            user_name: bind.component(".signin .name"),
            sign_in_modal: bind.component("#signin-modal"),
            google_sign_in: bind.component("#signin-modal .button.google"),
            facebook_sign_in: bind.component("#signin-modal .button.facebook"),
            error_box: bind.component(".ui.form .ui.negative.message"),
            idea_list: bind.components(".fdr-idea-list > .item"),
            sign_out_button: bind.component(".signout"),
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
        let title = self.idea_title.handle().clone();
        element_is_visible(move || title.clone())
    }
}

impl HomePage {
    /// Fill and submit the idea form; returns once the new idea's page loaded
    pub async fn submit_new_idea(&self, title: &str, description: &str) -> PagewrightResult<()> {
        self.idea_title.type_text(title).await?;
        self.idea_description.type_text(description).await?;
        self.submit_idea.click().await?;
        self.browser
            .wait(page_has_loaded::<ShowIdeaPage>(&self.browser))
            .await?;
        Ok(())
    }

    /// Sign out if signed in.
    ///
    /// A missing sign-out control means nobody is signed in; that is not an
    /// error. Ambiguous matches, timeouts and driver faults still are.
    pub async fn sign_out(&self) -> PagewrightResult<()> {
        if self.sign_out_button.click().await.if_present()?.is_none() {
            tracing::debug!("not signed in, nothing to sign out");
            return Ok(());
        }
        let sign_out = self.sign_out_button.handle().clone();
        let signed_out = element_is_hidden(move || sign_out.clone())
            .and(page_has_loaded::<Self>(&self.browser));
        self.browser.wait(signed_out).await?;
        Ok(())
    }

    /// Start a Google sign-in from a clean state.
    ///
    /// Resolves to the Google form, or straight to the home page when the
    /// provider remembers the consent.
    pub async fn sign_in_with_google(&self) -> PagewrightResult<PageOutcome> {
        self.sign_in_with::<GoogleSignInPage>(GOOGLE_ACCOUNTS, |page| {
            page.google_sign_in.clone()
        })
        .await
    }

    /// Start a Facebook sign-in from a clean state
    pub async fn sign_in_with_facebook(&self) -> PagewrightResult<PageOutcome> {
        self.sign_in_with::<FacebookSignInPage>(FACEBOOK, |page| page.facebook_sign_in.clone())
            .await
    }

    async fn sign_in_with<P: Page>(
        &self,
        provider: &str,
        button: fn(&Self) -> Button,
    ) -> PagewrightResult<PageOutcome> {
        self.browser.clear_cookies(provider).await?;
        self.sign_out().await?;

        let page = self.clone();
        self.sign_in(move || button(&page)).await?;

        // Home is on screen with the modal open until the redirect starts
        let modal = self.sign_in_modal.handle().clone();
        let back_home = page_has_loaded::<Self>(&self.browser)
            .and(element_is_hidden(move || modal.clone()))
            .with_description(format!("{} to load", self.page_name()));
        wait_for_any_page(
            &self.browser,
            &[
                PageCandidate::of::<P>(&self.browser),
                PageCandidate::when::<Self>(&self.browser, back_home),
            ],
        )
        .await
    }

    /// Open the sign-in modal and click the provider `locator` points at.
    ///
    /// `locator` is evaluated lazily, once the modal is up.
    pub async fn sign_in<F>(&self, locator: F) -> PagewrightResult<()>
    where
        F: Fn() -> Button + Send + Sync + 'static,
    {
        self.user_menu.click().await?;
        let locator = Arc::new(locator);
        let deferred = Arc::clone(&locator);
        self.browser
            .wait(element_is_visible(move || deferred().handle().clone()))
            .await?;
        locator().click().await
    }
}
