//! Session guardian - hides browser session death from the steps
//!
//! The guardian is the only owner of the live [`Browser`]. Steps borrow it
//! through [`SessionGuardian::ensure_live`] for the duration of one phase of
//! work and fetch it again afterwards, so a replaced session is picked up at
//! the next suspension point.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::capability::{Browser, Launcher};
use crate::config::SessionConfig;
use crate::error::{E2eError, E2eResult};
use crate::reset::Baseline;

/// Consecutive launch failures tolerated before the environment is declared unusable.
pub const MAX_LAUNCH_ATTEMPTS: usize = 2;

const RELAUNCH_BACKOFF: Duration = Duration::from_millis(500);

pub struct SessionGuardian {
    launcher: Box<dyn Launcher>,
    config: SessionConfig,
    baseline: Baseline,
    session: Option<Box<dyn Browser>>,
    launches: usize,
}

impl SessionGuardian {
    pub fn new(launcher: Box<dyn Launcher>, config: SessionConfig, baseline: Baseline) -> Self {
        Self {
            launcher,
            config,
            baseline,
            session: None,
            launches: 0,
        }
    }

    /// The configuration every session is launched with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Total sessions launched, including the first.
    pub fn launch_count(&self) -> usize {
        self.launches
    }

    /// Sessions launched to replace a dead one.
    pub fn relaunch_count(&self) -> usize {
        self.launches.saturating_sub(1)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Return a session whose liveness check just succeeded, replacing a
    /// dead one when needed.
    pub async fn ensure_live(&mut self) -> E2eResult<&dyn Browser> {
        let alive = match &self.session {
            None => false,
            Some(session) => match session.current_url().await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "Browser session lost, restarting");
                    false
                }
            },
        };

        if !alive {
            if let Some(old) = self.session.take() {
                if let Err(e) = old.quit().await {
                    debug!(error = %e, "Ignoring error while terminating dead session");
                }
            }
            let fresh = self.launch().await?;
            self.session = Some(fresh);
        }

        self.session
            .as_deref()
            .ok_or_else(|| E2eError::Environment("no browser session available".to_string()))
    }

    /// Clear cookies and both storage scopes and open the baseline route,
    /// unless the session is already there. With `fresh` the page is reloaded
    /// afterwards so the application re-reads its now empty storage.
    pub async fn reset(&mut self, fresh: bool) -> E2eResult<()> {
        let baseline = self.baseline.clone();
        let browser = self.ensure_live().await?;

        let current = browser.current_url().await?;
        if baseline.is_at(&current) {
            debug!(url = %current, "Already at baseline");
            return Ok(());
        }

        browser.delete_all_cookies().await?;
        browser.navigate(baseline.url()).await?;
        browser.clear_storage().await?;
        if fresh {
            browser.refresh().await?;
        }
        Ok(())
    }

    /// Terminate the current session, ignoring errors.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            match session.quit().await {
                Ok(()) => info!("Browser session closed"),
                Err(e) => debug!(error = %e, "Ignoring error while closing session"),
            }
        }
    }

    async fn launch(&mut self) -> E2eResult<Box<dyn Browser>> {
        let mut last_error = String::new();

        for attempt in 1..=MAX_LAUNCH_ATTEMPTS {
            match self.launcher.launch(&self.config).await {
                Ok(browser) => {
                    self.launches += 1;
                    info!(
                        attempt,
                        launches = self.launches,
                        browser = ?self.config.kind,
                        "Browser session ready"
                    );
                    return Ok(browser);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Browser launch failed");
                    last_error = e.to_string();
                    if attempt < MAX_LAUNCH_ATTEMPTS {
                        sleep(RELAUNCH_BACKOFF).await;
                    }
                }
            }
        }

        Err(E2eError::Environment(format!(
            "browser could not be launched after {} attempts: {}",
            MAX_LAUNCH_ATTEMPTS, last_error
        )))
    }
}
