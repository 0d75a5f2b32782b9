//! Suite configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::resolver::MAX_SETTLE;

/// Suite configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application under test
    pub app: AppConfig,

    /// Browser session settings, reused verbatim on every relaunch
    pub browser: SessionConfig,

    /// Wait budgets and settle delays
    pub timeouts: Timeouts,

    /// Generated credentials
    pub fixture: FixtureConfig,

    /// Report output
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the application, without trailing slash
    pub base_url: String,

    /// How long preflight waits for the application to answer
    pub startup_timeout_ms: u64,

    /// Route prefixes the steps navigate to
    pub routes: Routes,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            startup_timeout_ms: 30_000,
            routes: Routes::default(),
        }
    }
}

impl AppConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub register: String,
    pub login: String,
    pub dashboard: String,
    pub projects: String,
    pub tasks: String,
    pub analytics: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            register: "/auth/register".to_string(),
            login: "/auth/login".to_string(),
            dashboard: "/dashboard".to_string(),
            projects: "/admin/projects".to_string(),
            tasks: "/admin/tasks".to_string(),
            analytics: "/admin/analytics".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            _ => Err(E2eError::Configuration(format!("unsupported browser: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowMode {
    #[default]
    Maximized,
    Fixed { width: u32, height: u32 },
}

/// Everything needed to (re)launch an identical browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// WebDriver endpoint (chromedriver / geckodriver)
    pub webdriver_url: String,

    pub kind: BrowserKind,

    pub headless: bool,

    /// Driver-side implicit wait
    pub implicit_wait_ms: u64,

    pub page_load_timeout_ms: u64,

    /// Launch flags passed to the browser binary
    pub args: Vec<String>,

    pub window: WindowMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            kind: BrowserKind::Chrome,
            headless: false,
            implicit_wait_ms: 2_000,
            page_load_timeout_ms: 30_000,
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
                "--remote-allow-origins=*".to_string(),
            ],
            window: WindowMode::Maximized,
        }
    }
}

impl SessionConfig {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }
}

/// Kinds of fixed delay applied after UI-triggering actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleKind {
    Dropdown,
    Dialog,
    Navigation,
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Default explicit wait
    pub wait_ms: u64,

    /// Wait for optional UI confirmations
    pub short_wait_ms: u64,

    /// Wait for server round trips (creation notifications, dialogs closing)
    pub long_wait_ms: u64,

    /// Budget for lookups of elements expected to be on screen already
    pub lookup_ms: u64,

    pub poll_interval_ms: u64,

    pub settle: SettleDelays,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            wait_ms: 15_000,
            short_wait_ms: 5_000,
            long_wait_ms: 10_000,
            lookup_ms: 2_000,
            poll_interval_ms: 200,
            settle: SettleDelays::default(),
        }
    }
}

impl Timeouts {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn short_wait(&self) -> Duration {
        Duration::from_millis(self.short_wait_ms)
    }

    pub fn long_wait(&self) -> Duration {
        Duration::from_millis(self.long_wait_ms)
    }

    pub fn lookup(&self) -> Duration {
        Duration::from_millis(self.lookup_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settle delay for `kind`, never longer than [`MAX_SETTLE`].
    pub fn settle(&self, kind: SettleKind) -> Duration {
        let ms = match kind {
            SettleKind::Dropdown => self.settle.dropdown_ms,
            SettleKind::Dialog => self.settle.dialog_ms,
            SettleKind::Navigation => self.settle.navigation_ms,
            SettleKind::Toast => self.settle.toast_ms,
        };
        Duration::from_millis(ms).min(MAX_SETTLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    pub dropdown_ms: u64,
    pub dialog_ms: u64,
    pub navigation_ms: u64,
    pub toast_ms: u64,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            dropdown_ms: 500,
            dialog_ms: 1_000,
            navigation_ms: 500,
            toast_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub name: String,
    pub password: String,
    pub email_prefix: String,
    pub email_domain: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            name: "Test User".to_string(),
            password: "Test@123".to_string(),
            email_prefix: "testuser".to_string(),
            email_domain: "example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> E2eResult<()> {
        if self.app.base_url.trim().is_empty() {
            return Err(E2eError::Configuration("app.base_url is empty".to_string()));
        }
        if self.browser.webdriver_url.trim().is_empty() {
            return Err(E2eError::Configuration(
                "browser.webdriver_url is empty".to_string(),
            ));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(E2eError::Configuration(
                "timeouts.poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.timeouts.wait_ms < self.timeouts.poll_interval_ms {
            return Err(E2eError::Configuration(format!(
                "timeouts.wait_ms ({}) is shorter than one poll interval ({})",
                self.timeouts.wait_ms, self.timeouts.poll_interval_ms
            )));
        }
        if let WindowMode::Fixed { width, height } = self.browser.window {
            if width == 0 || height == 0 {
                return Err(E2eError::Configuration(
                    "browser.window dimensions must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}
