//! Step catalog for the project management application
//!
//! Twenty steps in six groups: registration, login, dashboard, projects,
//! tasks and analytics. Later groups build on state created by earlier ones
//! (the registered account, the created project), which the dependency
//! declarations below make explicit.

mod analytics;
mod dashboard;
mod login;
mod projects;
mod registration;
mod tasks;

pub use login::ensure_logged_in;
pub use projects::PROJECT_NAME;
pub use tasks::{COLUMN_NAME, TASK_NAME};

use async_trait::async_trait;

use crate::context::SuiteContext;
use crate::error::{E2eError, E2eResult};
use crate::scheduler::Scheduler;
use crate::step::{Step, StepBody};

/// Body of one catalog step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStep {
    RegistrationPageLoads,
    RegistrationFieldsExist,
    RegistrationLoginLink,
    RegistrationSubmit,
    LoginPageLoads,
    LoginFieldsExist,
    LoginRegisterLink,
    LoginInvalidCredentials,
    LoginSuccess,
    DashboardLoads,
    DashboardStatisticsCards,
    DashboardProjectsSection,
    DashboardUrl,
    ProjectsPageLoads,
    ProjectCreateButton,
    ProjectDialogOpens,
    ProjectCreate,
    TasksSelectProject,
    TaskCreate,
    AnalyticsLoads,
}

#[async_trait]
impl StepBody for CatalogStep {
    async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<()> {
        match self {
            CatalogStep::RegistrationPageLoads => registration::page_loads(ctx).await,
            CatalogStep::RegistrationFieldsExist => registration::fields_exist(ctx).await,
            CatalogStep::RegistrationLoginLink => registration::login_link(ctx).await,
            CatalogStep::RegistrationSubmit => registration::submit(ctx).await,
            CatalogStep::LoginPageLoads => login::page_loads(ctx).await,
            CatalogStep::LoginFieldsExist => login::fields_exist(ctx).await,
            CatalogStep::LoginRegisterLink => login::register_link(ctx).await,
            CatalogStep::LoginInvalidCredentials => login::invalid_credentials(ctx).await,
            CatalogStep::LoginSuccess => login::success(ctx).await,
            CatalogStep::DashboardLoads => dashboard::loads(ctx).await,
            CatalogStep::DashboardStatisticsCards => dashboard::statistics_cards(ctx).await,
            CatalogStep::DashboardProjectsSection => dashboard::projects_section(ctx).await,
            CatalogStep::DashboardUrl => dashboard::url(ctx).await,
            CatalogStep::ProjectsPageLoads => projects::page_loads(ctx).await,
            CatalogStep::ProjectCreateButton => projects::create_button(ctx).await,
            CatalogStep::ProjectDialogOpens => projects::dialog_opens(ctx).await,
            CatalogStep::ProjectCreate => projects::create(ctx).await,
            CatalogStep::TasksSelectProject => tasks::select_project(ctx).await,
            CatalogStep::TaskCreate => tasks::create(ctx).await,
            CatalogStep::AnalyticsLoads => analytics::loads(ctx).await,
        }
    }
}

struct Entry {
    id: &'static str,
    name: &'static str,
    group: &'static str,
    body: CatalogStep,
    depends_on: &'static [&'static str],
    baseline: bool,
}

const fn entry(
    id: &'static str,
    name: &'static str,
    group: &'static str,
    body: CatalogStep,
    depends_on: &'static [&'static str],
    baseline: bool,
) -> Entry {
    Entry {
        id,
        name,
        group,
        body,
        depends_on,
        baseline,
    }
}

const REGISTRATION: &str = "Registration";
const LOGIN: &str = "Login";
const DASHBOARD: &str = "Dashboard";
const PROJECTS: &str = "Projects";
const TASKS: &str = "Tasks";
const ANALYTICS: &str = "Analytics";

/// Priorities are assigned by position, starting at 1.
const CATALOG: &[Entry] = &[
    entry(
        "registration_page_loads",
        "Registration page loads",
        REGISTRATION,
        CatalogStep::RegistrationPageLoads,
        &[],
        true,
    ),
    entry(
        "registration_fields_exist",
        "Registration form fields exist",
        REGISTRATION,
        CatalogStep::RegistrationFieldsExist,
        &["registration_page_loads"],
        false,
    ),
    entry(
        "registration_login_link",
        "Registration page links to login",
        REGISTRATION,
        CatalogStep::RegistrationLoginLink,
        &["registration_fields_exist"],
        false,
    ),
    entry(
        "registration_submit",
        "Successful registration",
        REGISTRATION,
        CatalogStep::RegistrationSubmit,
        &["registration_fields_exist"],
        false,
    ),
    entry("login_page_loads", "Login page loads", LOGIN, CatalogStep::LoginPageLoads, &[], true),
    entry(
        "login_fields_exist",
        "Login form fields exist",
        LOGIN,
        CatalogStep::LoginFieldsExist,
        &["login_page_loads"],
        false,
    ),
    entry(
        "login_register_link",
        "Login page links to registration",
        LOGIN,
        CatalogStep::LoginRegisterLink,
        &["login_page_loads"],
        false,
    ),
    entry(
        "login_invalid_credentials",
        "Invalid login is rejected",
        LOGIN,
        CatalogStep::LoginInvalidCredentials,
        &["login_fields_exist"],
        true,
    ),
    entry(
        "login_success",
        "Successful login",
        LOGIN,
        CatalogStep::LoginSuccess,
        &["login_fields_exist"],
        true,
    ),
    entry(
        "dashboard_loads",
        "Dashboard loads",
        DASHBOARD,
        CatalogStep::DashboardLoads,
        &["login_success"],
        false,
    ),
    entry(
        "dashboard_statistics_cards",
        "Dashboard shows statistics cards",
        DASHBOARD,
        CatalogStep::DashboardStatisticsCards,
        &["dashboard_loads"],
        false,
    ),
    entry(
        "dashboard_projects_section",
        "Dashboard shows projects section",
        DASHBOARD,
        CatalogStep::DashboardProjectsSection,
        &["dashboard_loads"],
        false,
    ),
    entry(
        "dashboard_url",
        "Dashboard URL is correct",
        DASHBOARD,
        CatalogStep::DashboardUrl,
        &["dashboard_loads"],
        false,
    ),
    entry(
        "projects_page_loads",
        "Projects page loads",
        PROJECTS,
        CatalogStep::ProjectsPageLoads,
        &["login_success"],
        false,
    ),
    entry(
        "project_create_button",
        "Create project button exists",
        PROJECTS,
        CatalogStep::ProjectCreateButton,
        &["projects_page_loads"],
        false,
    ),
    entry(
        "project_dialog_opens",
        "Create project dialog opens",
        PROJECTS,
        CatalogStep::ProjectDialogOpens,
        &["project_create_button"],
        false,
    ),
    entry(
        "project_create",
        "Project is created",
        PROJECTS,
        CatalogStep::ProjectCreate,
        &["project_dialog_opens"],
        false,
    ),
    entry(
        "tasks_select_project",
        "Task board opens for the project",
        TASKS,
        CatalogStep::TasksSelectProject,
        &["project_create"],
        false,
    ),
    entry(
        "task_create",
        "Task is created",
        TASKS,
        CatalogStep::TaskCreate,
        &["tasks_select_project"],
        false,
    ),
    entry(
        "analytics_loads",
        "Analytics page and charts load",
        ANALYTICS,
        CatalogStep::AnalyticsLoads,
        &["task_create"],
        false,
    ),
];

/// The full suite, in execution order.
pub fn steps() -> Vec<Step> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(index, e)| {
            let mut step = Step::new(e.id, index as u32 + 1, e.name, e.body).in_group(e.group);
            for dep in e.depends_on {
                step = step.depends_on(*dep);
            }
            if e.baseline {
                step = step.with_baseline();
            }
            step
        })
        .collect()
}

pub fn register_all(scheduler: &mut Scheduler) -> E2eResult<()> {
    for step in steps() {
        scheduler.register(step)?;
    }
    Ok(())
}

/// Turn a step-local failure into an assertion naming what the step was
/// doing. Session loss and fatal errors pass through untouched.
fn failed_to(what: &'static str) -> impl FnOnce(E2eError) -> E2eError {
    move |e| {
        if e.is_tolerable() {
            E2eError::AssertionFailed(format!("{}: {}", what, e))
        } else {
            e
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepId;

    #[test]
    fn test_catalog_is_a_valid_suite() {
        let mut scheduler = Scheduler::new();
        register_all(&mut scheduler).unwrap();
        assert_eq!(scheduler.len(), 20);
        scheduler.validate().unwrap();
    }

    #[test]
    fn test_priorities_follow_catalog_order() {
        let steps = steps();
        assert_eq!(steps[0].id, StepId::new("registration_page_loads"));
        assert_eq!(steps[0].priority, 1);
        assert_eq!(steps[19].id, StepId::new("analytics_loads"));
        assert_eq!(steps[19].priority, 20);
    }

    #[test]
    fn test_baseline_steps() {
        let baseline: Vec<_> = steps()
            .into_iter()
            .filter(|s| s.needs_baseline)
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(
            baseline,
            vec![
                "registration_page_loads",
                "login_page_loads",
                "login_invalid_credentials",
                "login_success"
            ]
        );
    }

    #[test]
    fn test_failed_to_keeps_session_loss() {
        let wrapped = failed_to("Failed to create a column")(E2eError::ElementNotFound {
            spec: "id=add-column-btn".into(),
            timeout: std::time::Duration::from_secs(15),
        });
        assert!(matches!(
            wrapped,
            E2eError::AssertionFailed(ref m) if m.starts_with("Failed to create a column")
        ));

        let lost = failed_to("x")(E2eError::SessionLost("gone".into()));
        assert!(matches!(lost, E2eError::SessionLost(_)));
    }
}
