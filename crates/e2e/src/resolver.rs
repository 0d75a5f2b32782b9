//! Multi-strategy element resolution with bounded polling

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::capability::{Browser, CapabilityError, ElementHandle, SCRIPT_CLICK};
use crate::error::{E2eError, E2eResult};
use crate::locator::{LocatorSpec, Predicate, Strategy};

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Longest fixed delay the engine will ever apply before a polling wait.
pub const MAX_SETTLE: Duration = Duration::from_secs(2);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An element together with the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub handle: ElementHandle,
    pub strategy: Strategy,
    /// Position of the winning strategy in the spec.
    pub index: usize,
}

/// Which entry of a portal-rendered option list to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionChoice {
    /// First clickable option.
    First,
    /// Option whose trimmed text equals the value.
    Exact(String),
    /// Option whose text contains the value.
    Containing(String),
}

impl OptionChoice {
    fn accepts(&self, text: &str) -> bool {
        match self {
            OptionChoice::First => true,
            OptionChoice::Exact(wanted) => text.trim() == wanted,
            OptionChoice::Containing(wanted) => text.contains(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementResolver {
    poll_interval: Duration,
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ElementResolver {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll every strategy in order until one yields an element satisfying
    /// `predicate`, or fail with `ElementNotFound` once `timeout` elapses.
    pub async fn resolve(
        &self,
        browser: &dyn Browser,
        spec: &LocatorSpec,
        predicate: Predicate,
        timeout: Duration,
    ) -> E2eResult<Resolved> {
        self.resolve_where(browser, spec, predicate, &OptionChoice::First, timeout).await
    }

    /// Like [`resolve`](Self::resolve), additionally filtering candidates by their text.
    pub async fn resolve_where(
        &self,
        browser: &dyn Browser,
        spec: &LocatorSpec,
        predicate: Predicate,
        choice: &OptionChoice,
        timeout: Duration,
    ) -> E2eResult<Resolved> {
        if spec.is_empty() {
            return Err(E2eError::Configuration(
                "locator spec has no strategies".to_string(),
            ));
        }

        let deadline = Instant::now() + timeout;
        let mut ticks = 0u32;

        loop {
            ticks += 1;
            if let Some(found) = self.sweep(browser, spec, predicate, choice).await? {
                debug!(
                    strategy = %found.strategy,
                    ticks,
                    "Resolved element"
                );
                return Ok(found);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(E2eError::ElementNotFound {
                    spec: spec.to_string(),
                    timeout,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Single sweep without waiting: every element matched by the first
    /// strategy that yields at least one element satisfying `predicate`.
    pub async fn resolve_all(
        &self,
        browser: &dyn Browser,
        spec: &LocatorSpec,
        predicate: Predicate,
    ) -> E2eResult<Vec<ElementHandle>> {
        for strategy in spec.strategies() {
            let handles = match find(browser, strategy).await? {
                Some(handles) => handles,
                None => continue,
            };

            let mut matching = Vec::new();
            for handle in handles {
                if satisfies(browser, &handle, predicate).await? {
                    matching.push(handle);
                }
            }
            if !matching.is_empty() {
                return Ok(matching);
            }
        }
        Ok(Vec::new())
    }

    /// Activate a resolved element, through a script click when its
    /// strategy requires one.
    pub async fn activate(&self, browser: &dyn Browser, resolved: &Resolved) -> E2eResult<()> {
        if resolved.strategy.kind.clicks_via_script() {
            debug!(strategy = %resolved.strategy, "Clicking via script");
            browser
                .execute(SCRIPT_CLICK, std::slice::from_ref(&resolved.handle))
                .await?;
        } else {
            browser.click(&resolved.handle).await?;
        }
        Ok(())
    }

    /// Two-phase dropdown interaction for portal-rendered option lists.
    ///
    /// Resolves and activates `trigger`, waits `settle` (capped at
    /// [`MAX_SETTLE`]) for the list to render, then polls the document-wide
    /// `options` spec for an entry accepted by `choice` and clicks it.
    /// Returns the text of the chosen option.
    pub async fn select_option(
        &self,
        browser: &dyn Browser,
        trigger: &LocatorSpec,
        options: &LocatorSpec,
        choice: &OptionChoice,
        settle: Duration,
        timeout: Duration,
    ) -> E2eResult<String> {
        let opener = self
            .resolve(browser, trigger, Predicate::Clickable, timeout)
            .await?;
        self.activate(browser, &opener).await?;

        sleep(settle.min(MAX_SETTLE)).await;

        let option = self
            .resolve_where(browser, options, Predicate::Clickable, choice, timeout)
            .await?;
        let text = browser.text(&option.handle).await?;
        self.activate(browser, &option).await?;

        info!(option = %text.trim(), "Selected dropdown option");
        Ok(text.trim().to_string())
    }

    async fn sweep(
        &self,
        browser: &dyn Browser,
        spec: &LocatorSpec,
        predicate: Predicate,
        choice: &OptionChoice,
    ) -> E2eResult<Option<Resolved>> {
        for (index, strategy) in spec.strategies().iter().enumerate() {
            let handles = match find(browser, strategy).await? {
                Some(handles) => handles,
                None => continue,
            };

            for handle in handles {
                if !satisfies(browser, &handle, predicate).await? {
                    continue;
                }
                if !matches!(choice, OptionChoice::First) {
                    let text = match tolerate_stale(browser.text(&handle).await)? {
                        Some(text) => text,
                        None => continue,
                    };
                    if !choice.accepts(&text) {
                        continue;
                    }
                }
                return Ok(Some(Resolved {
                    handle,
                    strategy: strategy.clone(),
                    index,
                }));
            }
        }
        Ok(None)
    }
}

/// Locate by one strategy. Lookup failures other than session loss count as
/// "nothing found this tick".
async fn find(
    browser: &dyn Browser,
    strategy: &Strategy,
) -> E2eResult<Option<Vec<ElementHandle>>> {
    match browser.find_all(strategy.kind, &strategy.selector).await {
        Ok(handles) => Ok(Some(handles)),
        Err(e) if e.is_session_lost() => Err(e.into()),
        Err(e) => {
            debug!(strategy = %strategy, error = %e, "Strategy lookup failed");
            Ok(None)
        }
    }
}

async fn satisfies(
    browser: &dyn Browser,
    handle: &ElementHandle,
    predicate: Predicate,
) -> E2eResult<bool> {
    let result = match predicate {
        Predicate::Present => return Ok(true),
        Predicate::Visible => browser.is_displayed(handle).await,
        Predicate::Clickable => match browser.is_displayed(handle).await {
            Ok(true) => browser.is_enabled(handle).await,
            other => other,
        },
    };
    Ok(tolerate_stale(result)?.unwrap_or(false))
}

/// Elements detaching between lookup and inspection are treated as absent.
fn tolerate_stale<T>(result: Result<T, CapabilityError>) -> E2eResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_session_lost() => Err(e.into()),
        Err(e) => {
            debug!(error = %e, "Ignoring element that could not be inspected");
            Ok(None)
        }
    }
}
