//! Environment checks before any browser is launched

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Poll the application until it answers over HTTP.
///
/// Any response below 500 counts as up: the SPA may answer its root with a
/// redirect or a client-side 404 while still being usable.
pub async fn wait_for_app(base_url: &str, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
    let deadline = Instant::now() + timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match client.get(base_url).send().await {
            Ok(resp) if resp.status().as_u16() < 500 => {
                info!(url = %base_url, attempts, "Application is reachable");
                return Ok(());
            }
            Ok(resp) => warn!("Application answered {}", resp.status()),
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for application at {}...", base_url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Application check error: {}", e);
                }
            }
        }

        if Instant::now() + PROBE_INTERVAL > deadline {
            break;
        }
        sleep(PROBE_INTERVAL).await;
    }

    Err(E2eError::Environment(format!(
        "application at {} did not respond after {} attempts",
        base_url, attempts
    )))
}

/// Whether the WebDriver server reports itself ready on `/status`.
pub async fn webdriver_ready(webdriver_url: &str) -> bool {
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(&status_url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<serde_json::Value>().await {
            Ok(body) => body["value"]["ready"].as_bool().unwrap_or(true),
            Err(_) => true,
        },
        _ => false,
    }
}

/// Fail with an environment error when the WebDriver server is not ready.
pub async fn require_webdriver(webdriver_url: &str) -> E2eResult<()> {
    if webdriver_ready(webdriver_url).await {
        info!(url = %webdriver_url, "WebDriver is ready");
        Ok(())
    } else {
        Err(E2eError::Environment(format!(
            "no ready WebDriver server at {} (start chromedriver or geckodriver first)",
            webdriver_url
        )))
    }
}
