//! W3C WebDriver implementation of the browser capability

use async_trait::async_trait;
use fantoccini::elements::{Element, ElementRef};
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::capability::{
    Browser, CapabilityError, CapabilityResult, ElementHandle, Launcher, StrategyKind,
};
use crate::config::{BrowserKind, SessionConfig, WindowMode};

/// Connects to a running chromedriver or geckodriver.
#[derive(Debug, Clone, Default)]
pub struct WebDriverLauncher;

impl WebDriverLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    async fn launch(&self, config: &SessionConfig) -> CapabilityResult<Box<dyn Browser>> {
        debug!(url = %config.webdriver_url, browser = ?config.kind, "Connecting to WebDriver");

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                CapabilityError::Launch(format!(
                    "cannot start session at {}: {}",
                    config.webdriver_url, e
                ))
            })?;

        // Window placement is best-effort; headless drivers may refuse it.
        let placed = match config.window {
            WindowMode::Maximized => client.maximize_window().await,
            WindowMode::Fixed { width, height } => client.set_window_size(width, height).await,
        };
        if let Err(e) = placed {
            debug!(error = %e, "Could not apply window mode");
        }

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(config.page_load_timeout()),
                Some(config.implicit_wait()),
            ))
            .await
            .map_err(classify)?;

        info!(browser = ?config.kind, headless = config.headless, "WebDriver session started");
        Ok(Box::new(WebDriverBrowser { client }))
    }
}

/// Browser-specific launch capabilities for `config`.
pub fn capabilities(config: &SessionConfig) -> Map<String, Value> {
    let mut args = config.args.clone();
    let mut caps = Map::new();

    match config.kind {
        BrowserKind::Chrome => {
            if config.headless {
                args.push("--headless=new".to_string());
            }
            if let WindowMode::Fixed { width, height } = config.window {
                args.push(format!("--window-size={},{}", width, height));
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            if config.headless {
                args.push("--headless".to_string());
            }
            if let WindowMode::Fixed { width, height } = config.window {
                args.push(format!("--width={}", width));
                args.push(format!("--height={}", height));
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    fn element(&self, handle: &ElementHandle) -> Element {
        Element::from_element_id(
            self.client.clone(),
            ElementRef::from(handle.id().to_string()),
        )
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> CapabilityResult<()> {
        self.client.goto(url).await.map_err(classify)
    }

    async fn current_url(&self) -> CapabilityResult<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(classify)
    }

    async fn refresh(&self) -> CapabilityResult<()> {
        self.client.refresh().await.map_err(classify)
    }

    async fn find_all(
        &self,
        kind: StrategyKind,
        selector: &str,
    ) -> CapabilityResult<Vec<ElementHandle>> {
        let locator = match kind {
            StrategyKind::Id => Locator::Id(selector),
            StrategyKind::Css => Locator::Css(selector),
            StrategyKind::XPath | StrategyKind::ScriptClick => Locator::XPath(selector),
            StrategyKind::LinkText => Locator::LinkText(selector),
        };

        match self.client.find_all(locator).await {
            Ok(elements) => Ok(elements
                .iter()
                .map(|e| ElementHandle::new(e.element_id().to_string()))
                .collect()),
            Err(CmdError::Standard(ref wd)) if wd.error == ErrorStatus::NoSuchElement => {
                Ok(Vec::new())
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn click(&self, element: &ElementHandle) -> CapabilityResult<()> {
        self.element(element).click().await.map_err(classify)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> CapabilityResult<()> {
        self.element(element).send_keys(text).await.map_err(classify)
    }

    async fn clear(&self, element: &ElementHandle) -> CapabilityResult<()> {
        self.element(element).clear().await.map_err(classify)
    }

    async fn text(&self, element: &ElementHandle) -> CapabilityResult<String> {
        self.element(element).text().await.map_err(classify)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> CapabilityResult<Option<String>> {
        self.element(element).attr(name).await.map_err(classify)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> CapabilityResult<bool> {
        self.element(element).is_displayed().await.map_err(classify)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> CapabilityResult<bool> {
        self.element(element).is_enabled().await.map_err(classify)
    }

    async fn execute(&self, script: &str, args: &[ElementHandle]) -> CapabilityResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for handle in args {
            let value = serde_json::to_value(self.element(handle))
                .map_err(|e| CapabilityError::Script(e.to_string()))?;
            values.push(value);
        }
        self.client.execute(script, values).await.map_err(classify)
    }

    async fn delete_all_cookies(&self) -> CapabilityResult<()> {
        self.client.delete_all_cookies().await.map_err(classify)
    }

    async fn quit(&self) -> CapabilityResult<()> {
        self.client.clone().close().await.map_err(classify)
    }
}

/// Map a WebDriver command error onto the capability taxonomy.
fn classify(err: CmdError) -> CapabilityError {
    let message = err.to_string();
    match err {
        CmdError::Lost(_) => CapabilityError::SessionLost(message),
        CmdError::Standard(ref wd) => match wd.error {
            ErrorStatus::InvalidSessionId | ErrorStatus::NoSuchWindow => {
                CapabilityError::SessionLost(message)
            }
            ErrorStatus::StaleElementReference => CapabilityError::StaleElement(message),
            ErrorStatus::ElementNotInteractable | ErrorStatus::ElementClickIntercepted => {
                CapabilityError::NotInteractable(message)
            }
            ErrorStatus::JavascriptError => CapabilityError::Script(message),
            ErrorStatus::NoSuchElement => CapabilityError::NoSuchElement(message),
            _ => CapabilityError::Protocol(message),
        },
        _ if is_connection_failure(&message) => CapabilityError::SessionLost(message),
        _ => CapabilityError::Protocol(message),
    }
}

fn is_connection_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("invalid session id")
        || lower.contains("connection refused")
        || lower.contains("no such window")
}
