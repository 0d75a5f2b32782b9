//! Scripted in-memory browser for exercising the engine without a driver.
//!
//! Provides:
//! - [`MockBackend`]: shared page model, session lifecycle and recordings
//! - [`MockLauncher`] / [`MockBrowser`]: the capability implementations
//! - [`MockElement`] / [`Effect`]: a small DOM with scripted click behaviour
//!
//! Pages are registered per route path. Navigating loads a fresh copy of the
//! route's elements; clicks run the element's effects. Selectors are matched
//! literally against what each element declares, so a test states exactly
//! which strategies may find an element.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use crate::capability::{
    Browser, CapabilityError, CapabilityResult, ElementHandle, Launcher, StrategyKind,
    CLEAR_STORAGE_SCRIPT, SCRIPT_CLICK,
};
use crate::config::SessionConfig;
use crate::locator::text_xpath;

const BLANK: &str = "about:blank";

/// What happens when an element is clicked.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Load the page registered for `path`.
    Navigate(String),
    /// Change the URL without reloading the page.
    PushUrl(String),
    Show(String),
    Hide(String),
    Remove(String),
    Insert(MockElement),
    /// Run `then` when the field with the given id holds `value`, `otherwise` if not.
    IfValue {
        field: String,
        value: String,
        then: Vec<Effect>,
        otherwise: Vec<Effect>,
    },
    SetStorage { key: String, value: String },
    KillSession,
}

/// One element of a mock page.
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    key: String,
    id: Option<String>,
    css: Vec<String>,
    xpath: Vec<String>,
    link_text: Option<String>,
    text: String,
    attributes: HashMap<String, String>,
    hidden: bool,
    disabled: bool,
    blocked: bool,
    appear_after: Option<Duration>,
    disappear_after: Option<Duration>,
    on_click: Vec<Effect>,
}

impl MockElement {
    /// Element identified by `key` for [`Effect`]s, with no selectors yet.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Element whose key and DOM id are both `id`.
    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone()).id(id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn css(mut self, selector: impl Into<String>) -> Self {
        self.css.push(selector.into());
        self
    }

    pub fn xpath(mut self, selector: impl Into<String>) -> Self {
        self.xpath.push(selector.into());
        self
    }

    pub fn link_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = text.clone();
        self.link_text = Some(text);
        self
    }

    /// Set the visible text and make it findable by a text-contains xpath.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.xpath.push(text_xpath(&text));
        self.text = text;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Native clicks fail as if intercepted by an overlay; script clicks work.
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    pub fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = Some(delay);
        self
    }

    pub fn disappear_after(mut self, delay: Duration) -> Self {
        self.disappear_after = Some(delay);
        self
    }

    pub fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn matches(&self, kind: StrategyKind, selector: &str) -> bool {
        match kind {
            StrategyKind::Id => self.id.as_deref() == Some(selector),
            StrategyKind::Css => self.css.iter().any(|s| s == selector),
            StrategyKind::XPath | StrategyKind::ScriptClick => {
                self.xpath.iter().any(|s| s == selector)
            }
            StrategyKind::LinkText => self.link_text.as_deref() == Some(selector),
        }
    }
}

#[derive(Debug)]
struct Node {
    handle: u64,
    element: MockElement,
    attached_at: Instant,
    value: String,
}

impl Node {
    fn attached(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.attached_at);
        let appeared = self.element.appear_after.map_or(true, |d| elapsed >= d);
        let gone = self.element.disappear_after.map_or(false, |d| elapsed >= d);
        appeared && !gone
    }

    fn displayed(&self, now: Instant) -> bool {
        self.attached(now) && !self.element.hidden
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, Vec<MockElement>>,
    url: String,
    dom: Vec<Node>,
    next_handle: u64,
    sessions: u64,
    live: Option<u64>,
    failing_launches: usize,
    launched: Vec<SessionConfig>,
    interactions: Vec<String>,
    cookies: BTreeMap<String, String>,
    local_storage: BTreeMap<String, String>,
    session_storage: BTreeMap<String, String>,
}

impl MockState {
    fn load(&mut self, url: &str) {
        self.url = url.to_string();
        let elements = self.pages.get(path_of(url)).cloned().unwrap_or_default();
        self.dom.clear();
        for element in elements {
            self.insert(element);
        }
    }

    fn insert(&mut self, element: MockElement) {
        self.next_handle += 1;
        self.dom.push(Node {
            handle: self.next_handle,
            element,
            attached_at: Instant::now(),
            value: String::new(),
        });
    }

    fn node(&self, handle: &ElementHandle) -> CapabilityResult<&Node> {
        let wanted = parse_handle(handle)?;
        let now = Instant::now();
        self.dom
            .iter()
            .find(|n| n.handle == wanted && n.attached(now))
            .ok_or_else(|| CapabilityError::StaleElement(handle.id().to_string()))
    }

    fn node_mut(&mut self, handle: &ElementHandle) -> CapabilityResult<&mut Node> {
        let wanted = parse_handle(handle)?;
        let now = Instant::now();
        self.dom
            .iter_mut()
            .find(|n| n.handle == wanted && n.attached(now))
            .ok_or_else(|| CapabilityError::StaleElement(handle.id().to_string()))
    }

    fn field_value(&self, id: &str) -> Option<&str> {
        self.dom
            .iter()
            .find(|n| n.element.id.as_deref() == Some(id))
            .map(|n| n.value.as_str())
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Navigate(path) => {
                    let url = format!("{}{}", origin_of(&self.url), path);
                    self.load(&url);
                }
                Effect::PushUrl(path) => {
                    self.url = format!("{}{}", origin_of(&self.url), path);
                }
                Effect::Show(key) => self.set_hidden(&key, false),
                Effect::Hide(key) => self.set_hidden(&key, true),
                Effect::Remove(key) => self.dom.retain(|n| n.element.key != key),
                Effect::Insert(element) => self.insert(element),
                Effect::IfValue {
                    field,
                    value,
                    then,
                    otherwise,
                } => {
                    let branch = if self.field_value(&field) == Some(value.as_str()) {
                        then
                    } else {
                        otherwise
                    };
                    self.apply(branch);
                }
                Effect::SetStorage { key, value } => {
                    self.local_storage.insert(key, value);
                }
                Effect::KillSession => self.live = None,
            }
        }
    }

    fn set_hidden(&mut self, key: &str, hidden: bool) {
        for node in self.dom.iter_mut().filter(|n| n.element.key == key) {
            node.element.hidden = hidden;
        }
    }

    fn click(&mut self, handle: &ElementHandle, via_script: bool) -> CapabilityResult<()> {
        let now = Instant::now();
        let node = self.node(handle)?;
        let label = describe(&node.element);

        if !via_script {
            if !node.displayed(now) || node.element.disabled {
                return Err(CapabilityError::NotInteractable(label));
            }
            if node.element.blocked {
                return Err(CapabilityError::NotInteractable(format!(
                    "{} is obscured by another element",
                    label
                )));
            }
        }

        let effects = node.element.on_click.clone();
        self.interactions.push(format!(
            "{}:{}",
            if via_script { "script-click" } else { "click" },
            label
        ));
        self.apply(effects);
        Ok(())
    }
}

/// Shared state behind every session the mock launcher creates.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the elements loaded when a URL with this path is opened.
    pub fn page(&self, path: impl Into<String>, elements: Vec<MockElement>) -> &Self {
        self.inner.lock().pages.insert(path.into(), elements);
        self
    }

    pub fn launcher(&self) -> MockLauncher {
        MockLauncher {
            backend: self.clone(),
        }
    }

    /// Simulate a browser crash: the live session stops answering.
    pub fn kill_session(&self) {
        self.inner.lock().live = None;
    }

    /// Make the next `count` launch attempts fail.
    pub fn fail_next_launches(&self, count: usize) {
        self.inner.lock().failing_launches = count;
    }

    pub fn launch_count(&self) -> usize {
        self.inner.lock().launched.len()
    }

    /// Configuration each session was launched with, in launch order.
    pub fn launched_configs(&self) -> Vec<SessionConfig> {
        self.inner.lock().launched.clone()
    }

    pub fn is_live(&self) -> bool {
        self.inner.lock().live.is_some()
    }

    /// Clicks, navigations and scripts in the order they happened.
    pub fn interactions(&self) -> Vec<String> {
        self.inner.lock().interactions.clone()
    }

    pub fn clicked(&self, what: &str) -> bool {
        let needle = format!("click:{}", what);
        self.inner
            .lock()
            .interactions
            .iter()
            .any(|i| i.ends_with(&needle))
    }

    pub fn current_url(&self) -> String {
        self.inner.lock().url.clone()
    }

    /// Value typed into the field with this id on the current page.
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.inner.lock().field_value(id).map(str::to_string)
    }

    pub fn set_cookie(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().cookies.insert(name.into(), value.into());
    }

    pub fn set_local_storage(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .lock()
            .local_storage
            .insert(key.into(), value.into());
    }

    pub fn set_session_storage(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .lock()
            .session_storage
            .insert(key.into(), value.into());
    }

    pub fn cookie_count(&self) -> usize {
        self.inner.lock().cookies.len()
    }

    /// Entries left in local and session storage combined.
    pub fn storage_len(&self) -> usize {
        let state = self.inner.lock();
        state.local_storage.len() + state.session_storage.len()
    }
}

#[derive(Debug, Clone)]
pub struct MockLauncher {
    backend: MockBackend,
}

#[async_trait]
impl Launcher for MockLauncher {
    async fn launch(&self, config: &SessionConfig) -> CapabilityResult<Box<dyn Browser>> {
        let mut state = self.backend.inner.lock();
        if state.failing_launches > 0 {
            state.failing_launches -= 1;
            return Err(CapabilityError::Launch(
                "browser binary not found".to_string(),
            ));
        }

        state.sessions += 1;
        let session = state.sessions;
        state.live = Some(session);
        state.launched.push(config.clone());
        state.load(BLANK);

        Ok(Box::new(MockBrowser {
            backend: self.backend.clone(),
            session,
        }))
    }
}

/// One session of the mock browser. Calls fail with `SessionLost` once the
/// session is no longer the live one.
#[derive(Debug)]
pub struct MockBrowser {
    backend: MockBackend,
    session: u64,
}

impl MockBrowser {
    fn state(&self) -> CapabilityResult<parking_lot::MutexGuard<'_, MockState>> {
        let state = self.backend.inner.lock();
        if state.live == Some(self.session) {
            Ok(state)
        } else {
            Err(CapabilityError::SessionLost(format!(
                "invalid session id: session {} is not running",
                self.session
            )))
        }
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn navigate(&self, url: &str) -> CapabilityResult<()> {
        let mut state = self.state()?;
        state.interactions.push(format!("navigate:{}", url));
        state.load(url);
        Ok(())
    }

    async fn current_url(&self) -> CapabilityResult<String> {
        Ok(self.state()?.url.clone())
    }

    async fn refresh(&self) -> CapabilityResult<()> {
        let mut state = self.state()?;
        let url = state.url.clone();
        state.load(&url);
        Ok(())
    }

    async fn find_all(
        &self,
        kind: StrategyKind,
        selector: &str,
    ) -> CapabilityResult<Vec<ElementHandle>> {
        let state = self.state()?;
        let now = Instant::now();
        Ok(state
            .dom
            .iter()
            .filter(|n| n.attached(now) && n.element.matches(kind, selector))
            .map(|n| ElementHandle::new(format!("{}-{}", self.session, n.handle)))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> CapabilityResult<()> {
        self.state()?.click(element, false)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> CapabilityResult<()> {
        let mut state = self.state()?;
        let node = state.node_mut(element)?;
        node.value.push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> CapabilityResult<()> {
        let mut state = self.state()?;
        state.node_mut(element)?.value.clear();
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> CapabilityResult<String> {
        let state = self.state()?;
        Ok(state.node(element)?.element.text.clone())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> CapabilityResult<Option<String>> {
        let state = self.state()?;
        let node = state.node(element)?;
        if name == "value" {
            return Ok(Some(node.value.clone()));
        }
        Ok(node.element.attributes.get(name).cloned())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> CapabilityResult<bool> {
        let state = self.state()?;
        Ok(state.node(element)?.displayed(Instant::now()))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> CapabilityResult<bool> {
        let state = self.state()?;
        Ok(!state.node(element)?.element.disabled)
    }

    async fn execute(&self, script: &str, args: &[ElementHandle]) -> CapabilityResult<Value> {
        let mut state = self.state()?;
        match script {
            SCRIPT_CLICK => {
                let target = args
                    .first()
                    .ok_or_else(|| CapabilityError::Script("missing click target".to_string()))?;
                state.click(target, true)?;
            }
            CLEAR_STORAGE_SCRIPT => {
                state.interactions.push("clear-storage".to_string());
                state.local_storage.clear();
                state.session_storage.clear();
            }
            other => {
                return Err(CapabilityError::Script(format!(
                    "unsupported script: {}",
                    other
                )))
            }
        }
        Ok(Value::Null)
    }

    async fn delete_all_cookies(&self) -> CapabilityResult<()> {
        let mut state = self.state()?;
        state.interactions.push("delete-cookies".to_string());
        state.cookies.clear();
        Ok(())
    }

    async fn quit(&self) -> CapabilityResult<()> {
        let mut state = self.state()?;
        state.live = None;
        state.interactions.push("quit".to_string());
        Ok(())
    }
}

fn parse_handle(handle: &ElementHandle) -> CapabilityResult<u64> {
    handle
        .id()
        .rsplit_once('-')
        .and_then(|(_, node)| node.parse().ok())
        .ok_or_else(|| CapabilityError::Protocol(format!("malformed handle: {}", handle.id())))
}

fn describe(element: &MockElement) -> String {
    element.id.clone().unwrap_or_else(|| element.key.clone())
}

/// `http://host:port` part of a URL, or empty for non-hierarchical URLs.
fn origin_of(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').map_or(url.len(), |i| scheme_end + 3 + i);
            &url[..host_end]
        }
        None => "",
    }
}

fn path_of(url: &str) -> &str {
    let path = &url[origin_of(url).len()..];
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parts() {
        assert_eq!(origin_of("http://localhost:5173/auth/login"), "http://localhost:5173");
        assert_eq!(path_of("http://localhost:5173/auth/login?next=1"), "/auth/login");
        assert_eq!(path_of("http://localhost:5173"), "");
        assert_eq!(path_of(BLANK), BLANK);
    }

    #[tokio::test]
    async fn test_killed_session_reports_session_lost() {
        let backend = MockBackend::new();
        let browser = backend
            .launcher()
            .launch(&SessionConfig::default())
            .await
            .unwrap();
        assert_eq!(browser.current_url().await.unwrap(), BLANK);

        backend.kill_session();
        let err = browser.current_url().await.unwrap_err();
        assert!(err.is_session_lost());
    }

    #[tokio::test]
    async fn test_blocked_element_needs_script_click() {
        let backend = MockBackend::new();
        backend.page(
            "/admin/projects",
            vec![MockElement::new("pm")
                .xpath("//div[@class='relative']")
                .blocked()
                .on_click(Effect::Insert(MockElement::with_id("opened")))],
        );
        let browser = backend
            .launcher()
            .launch(&SessionConfig::default())
            .await
            .unwrap();
        browser
            .navigate("http://localhost:5173/admin/projects")
            .await
            .unwrap();

        let found = browser
            .find_all(StrategyKind::ScriptClick, "//div[@class='relative']")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(matches!(
            browser.click(&found[0]).await,
            Err(CapabilityError::NotInteractable(_))
        ));

        browser.execute(SCRIPT_CLICK, &found).await.unwrap();
        assert_eq!(
            browser.find_all(StrategyKind::Id, "opened").await.unwrap().len(),
            1
        );
        assert!(backend.interactions().contains(&"script-click:pm".to_string()));
    }
}
