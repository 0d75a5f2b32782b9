//! Step-facing view of the live session
//!
//! A [`Page`] bundles a borrowed session with the resolver and the
//! application contract. It is obtained from
//! [`SuiteContext::page`](crate::SuiteContext::page) and must not outlive one
//! phase of a step: fetch a new one after anything that may replace the
//! session.

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::app::{AppContract, Route};
use crate::capability::{Browser, ElementHandle};
use crate::config::{SettleKind, Timeouts};
use crate::error::{E2eError, E2eResult};
use crate::locator::{Criticality, LocatorSpec, Predicate};
use crate::resolver::{ElementResolver, OptionChoice, Resolved};
use crate::waits::{first_signal, Signal};

use std::time::Duration;

pub struct Page<'a> {
    browser: &'a dyn Browser,
    resolver: &'a ElementResolver,
    app: &'a AppContract,
    timeouts: &'a Timeouts,
}

impl<'a> Page<'a> {
    pub fn new(
        browser: &'a dyn Browser,
        resolver: &'a ElementResolver,
        app: &'a AppContract,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            browser,
            resolver,
            app,
            timeouts,
        }
    }

    pub fn browser(&self) -> &'a dyn Browser {
        self.browser
    }

    pub fn app(&self) -> &'a AppContract {
        self.app
    }

    pub fn timeouts(&self) -> &'a Timeouts {
        self.timeouts
    }

    pub async fn url(&self) -> E2eResult<String> {
        Ok(self.browser.current_url().await?)
    }

    pub async fn open(&self, route: Route) -> E2eResult<()> {
        let url = self.app.url(route);
        debug!(url = %url, "Navigating");
        self.browser.navigate(&url).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> E2eResult<()> {
        Ok(self.browser.refresh().await?)
    }

    /// Bounded fixed delay for animations. Always follow with a polling wait.
    pub async fn settle(&self, kind: SettleKind) {
        sleep(self.timeouts.settle(kind)).await;
    }

    pub async fn find(
        &self,
        spec: &LocatorSpec,
        predicate: Predicate,
        timeout: Duration,
    ) -> E2eResult<Resolved> {
        self.resolver
            .resolve(self.browser, spec, predicate, timeout)
            .await
    }

    /// Elements currently satisfying `predicate`, without waiting.
    pub async fn find_now(
        &self,
        spec: &LocatorSpec,
        predicate: Predicate,
    ) -> E2eResult<Vec<ElementHandle>> {
        self.resolver.resolve_all(self.browser, spec, predicate).await
    }

    /// Wait (default budget) until the target is visible.
    pub async fn expect_visible(&self, spec: &LocatorSpec) -> E2eResult<Resolved> {
        self.find(spec, Predicate::Visible, self.timeouts.wait()).await
    }

    /// Assert an element expected on screen already is displayed.
    pub async fn assert_displayed(&self, spec: &LocatorSpec, what: &str) -> E2eResult<()> {
        match self
            .find(spec, Predicate::Visible, self.timeouts.lookup())
            .await
        {
            Ok(_) => Ok(()),
            Err(E2eError::ElementNotFound { .. }) => Err(E2eError::AssertionFailed(format!(
                "{} should be visible [{}]",
                what, spec
            ))),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_url_contains(&self, fragment: &str) -> E2eResult<()> {
        let url = self.url().await?;
        if url.contains(fragment) {
            Ok(())
        } else {
            Err(E2eError::AssertionFailed(format!(
                "URL should contain '{}', but was: {}",
                fragment, url
            )))
        }
    }

    /// Wait until the target is clickable, then activate it.
    pub async fn click(&self, spec: &LocatorSpec) -> E2eResult<()> {
        self.click_within(spec, self.timeouts.wait()).await
    }

    pub async fn click_within(&self, spec: &LocatorSpec, timeout: Duration) -> E2eResult<()> {
        let target = self.find(spec, Predicate::Clickable, timeout).await?;
        self.resolver.activate(self.browser, &target).await
    }

    /// Wait until the field is visible, clear it and type `text`.
    pub async fn fill(&self, spec: &LocatorSpec, text: &str) -> E2eResult<()> {
        let field = self.expect_visible(spec).await?;
        self.browser.clear(&field.handle).await?;
        self.browser.send_keys(&field.handle, text).await?;
        Ok(())
    }

    pub async fn text_of(&self, resolved: &Resolved) -> E2eResult<String> {
        Ok(self.browser.text(&resolved.handle).await?)
    }

    pub async fn attribute_of(&self, resolved: &Resolved, name: &str) -> E2eResult<Option<String>> {
        Ok(self.browser.attribute(&resolved.handle, name).await?)
    }

    /// Open a portal-rendered dropdown and pick an entry. Returns its text.
    pub async fn select_option(
        &self,
        trigger: &LocatorSpec,
        options: &LocatorSpec,
        choice: &OptionChoice,
        timeout: Duration,
    ) -> E2eResult<String> {
        self.resolver
            .select_option(
                self.browser,
                trigger,
                options,
                choice,
                self.timeouts.settle(SettleKind::Dropdown),
                timeout,
            )
            .await
    }

    /// Wait until any of `signals` holds; returns the index of the one that did.
    pub async fn first_signal(&self, signals: &[Signal], timeout: Duration) -> E2eResult<usize> {
        first_signal(self.browser, self.resolver, signals, timeout).await
    }

    pub async fn wait_url(&self, fragment: &str, timeout: Duration) -> E2eResult<()> {
        self.first_signal(&[Signal::url_contains(fragment)], timeout).await.map(|_| ())
    }

    pub async fn wait_absent(&self, spec: &LocatorSpec, timeout: Duration) -> E2eResult<()> {
        self.first_signal(&[Signal::Absent(spec.clone())], timeout).await.map(|_| ())
    }
}

/// Apply a call site's declared criticality to the result of an interaction.
///
/// Required results pass through. Optional ones turn tolerable failures into
/// `None` after logging; session loss and fatal errors always propagate.
pub fn tolerate<T>(
    criticality: Criticality,
    what: &str,
    result: E2eResult<T>,
) -> E2eResult<Option<T>> {
    match (criticality, result) {
        (_, Ok(value)) => Ok(Some(value)),
        (Criticality::Optional, Err(e)) if e.is_tolerable() => {
            warn!(error = %e, "Optional interaction skipped: {}", what);
            Ok(None)
        }
        (_, Err(e)) => Err(e),
    }
}
