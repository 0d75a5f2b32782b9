//! Waiting for any one of several acceptable terminal states

use std::fmt;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::capability::Browser;
use crate::error::{E2eError, E2eResult};
use crate::locator::{LocatorSpec, Predicate};
use crate::resolver::ElementResolver;

/// An observable condition a wait can be satisfied by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    UrlContains(String),
    Visible(LocatorSpec),
    /// No strategy of the spec yields a visible element.
    Absent(LocatorSpec),
}

impl Signal {
    pub fn url_contains(fragment: impl Into<String>) -> Self {
        Signal::UrlContains(fragment.into())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::UrlContains(fragment) => write!(f, "url contains '{}'", fragment),
            Signal::Visible(spec) => write!(f, "visible [{}]", spec),
            Signal::Absent(spec) => write!(f, "absent [{}]", spec),
        }
    }
}

/// Poll until one of `signals` holds and return its index.
///
/// Signals are checked in order on every tick, so when several hold at once
/// the earliest declared wins.
pub async fn first_signal(
    browser: &dyn Browser,
    resolver: &ElementResolver,
    signals: &[Signal],
    timeout: Duration,
) -> E2eResult<usize> {
    if signals.is_empty() {
        return Err(E2eError::Configuration("wait declared no signals".to_string()));
    }

    let deadline = Instant::now() + timeout;
    loop {
        let mut url: Option<String> = None;
        for (index, signal) in signals.iter().enumerate() {
            let holds = match signal {
                Signal::UrlContains(fragment) => {
                    if url.is_none() {
                        url = Some(browser.current_url().await?);
                    }
                    url.as_deref().map(|u| u.contains(fragment.as_str())).unwrap_or(false)
                }
                Signal::Visible(spec) => !resolver
                    .resolve_all(browser, spec, Predicate::Visible)
                    .await?
                    .is_empty(),
                Signal::Absent(spec) => resolver
                    .resolve_all(browser, spec, Predicate::Visible)
                    .await?
                    .is_empty(),
            };
            if holds {
                debug!(signal = %signal, "Wait satisfied");
                return Ok(index);
            }
        }

        let now = Instant::now();
        if now >= deadline {
            let what = signals
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(E2eError::Timeout { what, timeout });
        }
        sleep(resolver.poll_interval().min(deadline - now)).await;
    }
}
