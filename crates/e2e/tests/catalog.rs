//! Full suite runs against the scripted application

mod support;

use std::time::Duration;

use pmcheck_e2e::catalog;
use pmcheck_e2e::{Outcome, Scheduler, StepId, SuiteReport};
use test_case::test_case;

use support::{AfterRegister, AppOptions, ManagerTrigger};

async fn run_suite(options: AppOptions) -> (SuiteReport, pmcheck_e2e::mock::MockBackend) {
    let credentials = support::credentials();
    let backend = support::pms_app(&credentials, &options);
    let mut ctx = support::context(&backend, &credentials);

    let mut scheduler = Scheduler::new();
    catalog::register_all(&mut scheduler).unwrap();
    let report = scheduler.run(&mut ctx).await.unwrap();
    ctx.shutdown().await;
    (report, backend)
}

fn outcome<'a>(report: &'a SuiteReport, id: &str) -> &'a Outcome {
    report
        .outcome(&StepId::new(id))
        .unwrap_or_else(|| panic!("no outcome recorded for {}", id))
}

fn failures(report: &SuiteReport) -> Vec<String> {
    report
        .entries
        .iter()
        .filter(|e| !e.outcome.is_passed())
        .map(|e| format!("{}: {:?}", e.id, e.outcome))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_full_suite_passes() {
    let (report, backend) = run_suite(AppOptions::default()).await;

    assert_eq!(report.total(), 20);
    assert!(report.success(), "unexpected outcomes: {:?}", failures(&report));
    assert_eq!(report.passed(), 20);
    assert_eq!(report.exit_code(), 0);

    // Single session for the whole run, closed at shutdown.
    assert_eq!(backend.launch_count(), 1);
    assert!(!backend.is_live());
}

#[test_case(AfterRegister::Dashboard ; "redirect to dashboard")]
#[test_case(AfterRegister::Login ; "redirect to login")]
#[test_case(AfterRegister::Toast ; "success notification only")]
#[tokio::test(start_paused = true)]
async fn test_registration_accepts_any_success_signal(after: AfterRegister) {
    let (report, _) = run_suite(AppOptions {
        after_register: after,
        ..Default::default()
    })
    .await;

    assert_eq!(outcome(&report, "registration_submit"), &Outcome::Passed);
    assert!(report.success(), "unexpected outcomes: {:?}", failures(&report));
}

#[test_case(true ; "error notification")]
#[test_case(false ; "stays on login route")]
#[tokio::test(start_paused = true)]
async fn test_invalid_login_is_rejected(with_toast: bool) {
    let (report, _) = run_suite(AppOptions {
        invalid_login_toast: with_toast,
        ..Default::default()
    })
    .await;

    assert_eq!(outcome(&report, "login_invalid_credentials"), &Outcome::Passed);
    assert_eq!(outcome(&report, "login_success"), &Outcome::Passed);
}

#[tokio::test(start_paused = true)]
async fn test_project_dialog_left_open_fails_and_skips_dependents() {
    let (report, _) = run_suite(AppOptions {
        project_dialog_closes: false,
        ..Default::default()
    })
    .await;

    match outcome(&report, "project_create") {
        Outcome::Failed { reason } => assert!(reason.contains("dialog should close")),
        other => panic!("expected failure, got {:?}", other),
    }

    let root = StepId::new("project_create");
    for id in ["tasks_select_project", "task_create", "analytics_loads"] {
        assert_eq!(
            outcome(&report, id),
            &Outcome::Skipped {
                cause: root.clone()
            },
            "{}",
            id
        );
    }

    // Independent modules still ran.
    assert_eq!(outcome(&report, "dashboard_url"), &Outcome::Passed);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), 1);
}

#[test_case(4, true ; "closes within budget")]
#[test_case(15, false ; "closes too late")]
#[tokio::test(start_paused = true)]
async fn test_project_dialog_must_close_within_long_wait(after_secs: u64, passes: bool) {
    let (report, _) = run_suite(AppOptions {
        project_dialog_delay: Some(Duration::from_secs(after_secs)),
        ..Default::default()
    })
    .await;

    let created = outcome(&report, "project_create");
    assert_eq!(created.is_passed(), passes, "{:?}", created);
    if !passes {
        assert_eq!(
            outcome(&report, "task_create"),
            &Outcome::Skipped {
                cause: StepId::new("project_create")
            }
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_task_board_without_columns_creates_one() {
    let (report, backend) = run_suite(AppOptions::default()).await;

    assert_eq!(outcome(&report, "task_create"), &Outcome::Passed);
    assert!(backend.clicked("add-column-btn"));
    assert!(backend.clicked("column-submit"));
    assert!(backend.clicked("task-submit"));

    let clicks = backend.interactions();
    let column = clicks.iter().position(|c| c == "click:column-submit").unwrap();
    let task = clicks.iter().position(|c| c == "click:add-task-btn-1").unwrap();
    assert!(column < task, "column must exist before the task dialog opens");
}

#[tokio::test(start_paused = true)]
async fn test_existing_column_is_reused() {
    let (report, backend) = run_suite(AppOptions {
        existing_column: true,
        ..Default::default()
    })
    .await;

    assert_eq!(outcome(&report, "task_create"), &Outcome::Passed);
    assert!(!backend.clicked("add-column-btn"));
    assert!(backend.clicked("add-task-btn-1"));
}

#[tokio::test(start_paused = true)]
async fn test_project_manager_falls_back_to_script_click() {
    let (report, backend) = run_suite(AppOptions {
        manager_trigger: ManagerTrigger::BlockedContainer,
        ..Default::default()
    })
    .await;

    assert_eq!(outcome(&report, "project_create"), &Outcome::Passed);
    assert!(backend
        .interactions()
        .contains(&"script-click:pm-container".to_string()));
    assert!(backend.clicked("manager-option"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_login_skips_everything_behind_it() {
    let credentials = support::credentials();
    let backend = support::pms_app(&credentials, &AppOptions::default());
    // Registered email differs from the one the suite logs in with.
    let other = pmcheck_e2e::Credentials::with_token(&Default::default(), 42);
    let mut ctx = support::context(&backend, &other);

    let mut scheduler = Scheduler::new();
    catalog::register_all(&mut scheduler).unwrap();
    let report = scheduler.run(&mut ctx).await.unwrap();

    assert!(outcome(&report, "login_success").is_failed());
    let login = StepId::new("login_success");
    for entry in report.entries.iter().filter(|e| e.id.as_str().starts_with("dashboard")) {
        assert_eq!(
            entry.outcome,
            Outcome::Skipped {
                cause: login.clone()
            }
        );
    }
    assert_eq!(
        outcome(&report, "analytics_loads"),
        &Outcome::Skipped { cause: login }
    );
    assert_eq!(report.failed(), 1);
}
