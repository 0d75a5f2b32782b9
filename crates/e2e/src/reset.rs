//! Returning the application to its unauthenticated baseline

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::E2eResult;
use crate::resolver::{ElementResolver, MAX_SETTLE};
use crate::session::SessionGuardian;
use crate::waits::{first_signal, Signal};

/// The known unauthenticated entry route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    url: String,
    marker: String,
}

impl Baseline {
    /// `marker` is the URL fragment that identifies the baseline route.
    pub fn new(url: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            marker: marker.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn is_at(&self, current_url: &str) -> bool {
        current_url.contains(&self.marker)
    }
}

/// Brings whichever session the guardian currently holds back to baseline.
#[derive(Debug, Clone)]
pub struct StateReset {
    resolver: ElementResolver,
    settle: Duration,
    timeout: Duration,
}

impl StateReset {
    pub fn new(resolver: ElementResolver, settle: Duration, timeout: Duration) -> Self {
        Self {
            resolver,
            settle: settle.min(MAX_SETTLE),
            timeout,
        }
    }

    /// After success the session is unauthenticated, has no client-side
    /// storage left from earlier steps, and sits on the baseline route.
    ///
    /// A failure while resetting is retried once against a freshly ensured
    /// session; fatal errors are returned immediately.
    pub async fn to_baseline(&self, guardian: &mut SessionGuardian) -> E2eResult<()> {
        match self.reset_once(guardian).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Reset to baseline failed, retrying on a live session");
                self.reset_once(guardian).await
            }
        }
    }

    async fn reset_once(&self, guardian: &mut SessionGuardian) -> E2eResult<()> {
        guardian.reset(true).await?;
        sleep(self.settle).await;

        let marker = guardian.baseline().marker().to_string();
        let browser = guardian.ensure_live().await?;
        first_signal(
            browser,
            &self.resolver,
            &[Signal::UrlContains(marker)],
            self.timeout,
        )
        .await?;

        info!("Application reset to baseline");
        Ok(())
    }
}
