//! Browser capability contract consumed by the engine
//!
//! The engine never talks to a browser directly. Everything goes through
//! [`Browser`], and new sessions come from a [`Launcher`]. The WebDriver
//! implementation lives in [`crate::webdriver`], the scripted in-memory one
//! in [`crate::mock`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::SessionConfig;

/// Script used to wipe both client-side storage scopes.
pub const CLEAR_STORAGE_SCRIPT: &str = "localStorage.clear(); sessionStorage.clear();";

/// Script used to click an element directly, bypassing overlays.
pub const SCRIPT_CLICK: &str = "arguments[0].click();";

/// How a selector value is interpreted when locating elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Id,
    Css,
    XPath,
    LinkText,
    /// XPath lookup whose activation goes through an injected script click.
    ScriptClick,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Id => "id",
            StrategyKind::Css => "css",
            StrategyKind::XPath => "xpath",
            StrategyKind::LinkText => "link",
            StrategyKind::ScriptClick => "script-click",
        }
    }

    pub fn clicks_via_script(&self) -> bool {
        matches!(self, StrategyKind::ScriptClick)
    }
}

/// Opaque reference to an element, valid only for the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Invalid session id, closed window or a dropped driver connection.
    #[error("session lost: {0}")]
    SessionLost(String),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("stale element reference: {0}")]
    StaleElement(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("failed to launch browser session: {0}")]
    Launch(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl CapabilityError {
    pub fn is_session_lost(&self) -> bool {
        matches!(self, CapabilityError::SessionLost(_))
    }
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// A live remote browser session.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> CapabilityResult<()>;

    async fn current_url(&self) -> CapabilityResult<String>;

    async fn refresh(&self) -> CapabilityResult<()>;

    /// Locate every element matching the selector. An empty result is not an error.
    async fn find_all(
        &self,
        kind: StrategyKind,
        selector: &str,
    ) -> CapabilityResult<Vec<ElementHandle>>;

    async fn click(&self, element: &ElementHandle) -> CapabilityResult<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> CapabilityResult<()>;

    async fn clear(&self, element: &ElementHandle) -> CapabilityResult<()>;

    async fn text(&self, element: &ElementHandle) -> CapabilityResult<String>;

    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> CapabilityResult<Option<String>>;

    async fn is_displayed(&self, element: &ElementHandle) -> CapabilityResult<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> CapabilityResult<bool>;

    /// Run a script in the page. Elements are passed as `arguments[i]`.
    async fn execute(&self, script: &str, args: &[ElementHandle]) -> CapabilityResult<Value>;

    async fn delete_all_cookies(&self) -> CapabilityResult<()>;

    async fn clear_storage(&self) -> CapabilityResult<()> {
        self.execute(CLEAR_STORAGE_SCRIPT, &[]).await.map(|_| ())
    }

    /// Terminate the session.
    async fn quit(&self) -> CapabilityResult<()>;
}

/// Creates browser sessions from a stored configuration.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, config: &SessionConfig) -> CapabilityResult<Box<dyn Browser>>;
}
