//! State shared by every step of one suite run

use tracing::info;

use crate::app::AppContract;
use crate::capability::Launcher;
use crate::config::{SettleKind, SuiteConfig, Timeouts};
use crate::error::E2eResult;
use crate::fixture::Credentials;
use crate::page::Page;
use crate::reset::StateReset;
use crate::resolver::ElementResolver;
use crate::session::SessionGuardian;

/// Everything a step body may touch. The browser session itself is only
/// reachable through [`page`](Self::page), which re-validates it each time.
pub struct SuiteContext {
    guardian: SessionGuardian,
    resolver: ElementResolver,
    reset: StateReset,
    app: AppContract,
    timeouts: Timeouts,
    credentials: Credentials,
}

impl SuiteContext {
    pub fn new(
        config: &SuiteConfig,
        launcher: Box<dyn Launcher>,
        credentials: Credentials,
    ) -> Self {
        let app = AppContract::new(&config.app);
        let timeouts = config.timeouts.clone();
        let resolver = ElementResolver::new(timeouts.poll_interval());
        let reset = StateReset::new(
            resolver.clone(),
            timeouts.settle(SettleKind::Navigation),
            timeouts.wait(),
        );
        let guardian = SessionGuardian::new(launcher, config.browser.clone(), app.baseline());

        info!(
            base_url = %app.base_url(),
            user = %credentials.email(),
            "Suite context ready"
        );

        Self {
            guardian,
            resolver,
            reset,
            app,
            timeouts,
            credentials,
        }
    }

    /// A view of a session whose liveness was just confirmed. Fetch a new
    /// one after any call that takes `&mut self`.
    pub async fn page(&mut self) -> E2eResult<Page<'_>> {
        let browser = self.guardian.ensure_live().await?;
        Ok(Page::new(browser, &self.resolver, &self.app, &self.timeouts))
    }

    /// Reset the application to its unauthenticated baseline.
    pub async fn to_baseline(&mut self) -> E2eResult<()> {
        self.reset.to_baseline(&mut self.guardian).await
    }

    pub async fn ensure_live(&mut self) -> E2eResult<()> {
        self.guardian.ensure_live().await.map(|_| ())
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn app(&self) -> &AppContract {
        &self.app
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn guardian(&self) -> &SessionGuardian {
        &self.guardian
    }

    pub async fn shutdown(&mut self) {
        self.guardian.shutdown().await;
    }
}
