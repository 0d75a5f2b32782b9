//! Session recovery and baseline reset

use std::time::Duration;

use pmcheck_e2e::config::WindowMode;
use pmcheck_e2e::mock::{MockBackend, MockElement};
use pmcheck_e2e::{
    Baseline, E2eError, ElementResolver, SessionConfig, SessionGuardian, StateReset,
};

const LOGIN: &str = "http://localhost:5173/auth/login";
const DASHBOARD: &str = "http://localhost:5173/dashboard";

fn backend() -> MockBackend {
    let backend = MockBackend::new();
    backend
        .page("/auth/login", vec![MockElement::with_id("login-form")])
        .page("/dashboard", vec![MockElement::with_id("dashboard-page")]);
    backend
}

fn guardian(backend: &MockBackend, config: SessionConfig) -> SessionGuardian {
    SessionGuardian::new(
        Box::new(backend.launcher()),
        config,
        Baseline::new(LOGIN, "/auth/login"),
    )
}

fn fixed_window() -> SessionConfig {
    SessionConfig {
        headless: true,
        implicit_wait_ms: 3_000,
        window: WindowMode::Fixed {
            width: 1280,
            height: 800,
        },
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_use_launches_once() {
    let backend = backend();
    let mut guardian = guardian(&backend, SessionConfig::default());
    assert!(!guardian.has_session());

    guardian.ensure_live().await.unwrap();
    guardian.ensure_live().await.unwrap();

    assert_eq!(backend.launch_count(), 1);
    assert_eq!(guardian.relaunch_count(), 0);
    assert!(guardian.has_session());
}

#[tokio::test(start_paused = true)]
async fn test_dead_session_replaced_with_same_config() {
    let backend = backend();
    let mut guardian = guardian(&backend, fixed_window());

    guardian
        .ensure_live()
        .await
        .unwrap()
        .navigate(DASHBOARD)
        .await
        .unwrap();
    backend.kill_session();

    let browser = guardian.ensure_live().await.unwrap();
    assert!(browser.current_url().await.is_ok());

    assert_eq!(guardian.launch_count(), 2);
    assert_eq!(guardian.relaunch_count(), 1);
    let configs = backend.launched_configs();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0], configs[1]);
    assert_eq!(configs[1], fixed_window());
}

#[tokio::test(start_paused = true)]
async fn test_single_launch_failure_is_retried() {
    let backend = backend();
    backend.fail_next_launches(1);
    let mut guardian = guardian(&backend, SessionConfig::default());

    guardian.ensure_live().await.unwrap();
    assert_eq!(guardian.launch_count(), 1);
    assert!(backend.is_live());
}

#[tokio::test(start_paused = true)]
async fn test_repeated_launch_failure_is_environment_error() {
    let backend = backend();
    backend.fail_next_launches(2);
    let mut guardian = guardian(&backend, SessionConfig::default());

    let err = guardian.ensure_live().await.err().unwrap();
    assert!(matches!(err, E2eError::Environment(_)));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("browser binary not found"));
    assert!(!guardian.has_session());
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_client_state() {
    let backend = backend();
    let mut guardian = guardian(&backend, SessionConfig::default());
    guardian
        .ensure_live()
        .await
        .unwrap()
        .navigate(DASHBOARD)
        .await
        .unwrap();
    backend.set_cookie("session", "abc");
    backend.set_local_storage("token", "jwt");
    backend.set_session_storage("draft", "{}");

    guardian.reset(true).await.unwrap();

    assert_eq!(backend.current_url(), LOGIN);
    assert_eq!(backend.cookie_count(), 0);
    assert_eq!(backend.storage_len(), 0);

    let interactions = backend.interactions();
    let cookies = interactions.iter().position(|i| i == "delete-cookies").unwrap();
    let storage = interactions.iter().position(|i| i == "clear-storage").unwrap();
    let navigate = interactions
        .iter()
        .position(|i| i == &format!("navigate:{}", LOGIN))
        .unwrap();
    assert!(cookies < navigate && navigate < storage);
}

#[tokio::test(start_paused = true)]
async fn test_reset_at_baseline_is_noop() {
    let backend = backend();
    let mut guardian = guardian(&backend, SessionConfig::default());
    guardian
        .ensure_live()
        .await
        .unwrap()
        .navigate(LOGIN)
        .await
        .unwrap();
    backend.set_cookie("session", "abc");
    let before = backend.interactions().len();

    guardian.reset(true).await.unwrap();

    assert_eq!(backend.interactions().len(), before);
    assert_eq!(backend.cookie_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_to_baseline_after_session_death() {
    let backend = backend();
    let mut guardian = guardian(&backend, SessionConfig::default());
    guardian
        .ensure_live()
        .await
        .unwrap()
        .navigate(DASHBOARD)
        .await
        .unwrap();
    backend.kill_session();

    let reset = StateReset::new(
        ElementResolver::new(Duration::from_millis(100)),
        Duration::from_millis(500),
        Duration::from_secs(5),
    );
    reset.to_baseline(&mut guardian).await.unwrap();

    assert_eq!(guardian.relaunch_count(), 1);
    assert_eq!(backend.current_url(), LOGIN);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_session() {
    let backend = backend();
    let mut guardian = guardian(&backend, SessionConfig::default());
    guardian.ensure_live().await.unwrap();

    guardian.shutdown().await;
    assert!(!backend.is_live());
    assert!(!guardian.has_session());

    // Shutting down twice is harmless.
    guardian.shutdown().await;
}
