//! Contract with the application under test: routes, DOM identifiers and
//! notification markers the steps depend on.

use crate::config::{AppConfig, Routes};
use crate::locator::LocatorSpec;
use crate::reset::Baseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Register,
    Login,
    Dashboard,
    Projects,
    Tasks,
    Analytics,
}

/// Element ids rendered by the application.
pub mod ids {
    pub const REGISTER_FORM: &str = "register-form";
    pub const REGISTER_NAME: &str = "register-name";
    pub const REGISTER_EMAIL: &str = "register-email";
    pub const REGISTER_PASSWORD: &str = "register-password";
    pub const REGISTER_SUBMIT: &str = "register-submit";

    pub const LOGIN_FORM: &str = "login-form";
    pub const LOGIN_EMAIL: &str = "login-email";
    pub const LOGIN_PASSWORD: &str = "login-password";
    pub const LOGIN_SUBMIT: &str = "login-submit";

    pub const DASHBOARD_PAGE: &str = "dashboard-page";

    pub const PROJECTS_PAGE: &str = "projects-page";
    pub const CREATE_PROJECT_BUTTON: &str = "create-project-btn";
    pub const PROJECT_NAME: &str = "project-name";
    pub const PROJECT_DESCRIPTION: &str = "project-description";
    pub const PROJECT_MANAGER_SELECT: &str = "project-manager-select";
    pub const TEAM_MEMBERS_SELECT: &str = "team-members-select";
    pub const PROJECT_SUBMIT: &str = "project-submit";

    pub const PROJECT_SELECT: &str = "project-select";
    pub const ADD_COLUMN_BUTTON: &str = "add-column-btn";
    pub const COLUMN_NAME: &str = "column-name";
    pub const COLUMN_SUBMIT: &str = "column-submit";
    pub const TASK_NAME: &str = "task-name";
    pub const TASK_DESCRIPTION: &str = "task-description";
    pub const TASK_PRIORITY: &str = "task-priority";
    pub const TASK_ASSIGNEES: &str = "task-assignees";
    pub const TASK_DUE_DATE: &str = "task-due-date";
    pub const TASK_SUBMIT: &str = "task-submit";

    pub const ANALYTICS_PAGE: &str = "analytics-page";
    pub const CHART_TASKS_PER_COLUMN: &str = "chart-tasks-per-column";
}

/// Structural selectors for controls without stable ids.
pub mod selectors {
    /// Options of portal-rendered select lists
    pub const LIST_OPTION: &str = "li[role='option']";
    /// Entries of the custom multiselect popover
    pub const MULTISELECT_ENTRY: &str =
        "//div[contains(@class, 'absolute')]//div[contains(@class, 'cursor-pointer')]";
    /// Per-column "add task" buttons
    pub const ADD_TASK_BUTTON: &str = "//button[starts-with(@id, 'add-task-btn-')]";
    pub const PROJECT_MANAGER_LABEL: &str = "//label[contains(text(), 'Project Manager')]";
    pub const PROJECT_MANAGER_CONTAINER: &str =
        "//*[text()='Project Manager']/ancestor::div[contains(@class, 'relative')]";
}

/// Notification classes.
pub mod markers {
    pub const TOAST_SUCCESS: &str = ".Toastify__toast--success";
    pub const TOAST_ERROR: &str = ".Toastify__toast--error";
}

pub fn success_toast() -> LocatorSpec {
    LocatorSpec::css(markers::TOAST_SUCCESS)
}

pub fn error_toast() -> LocatorSpec {
    LocatorSpec::css(markers::TOAST_ERROR)
}

#[derive(Debug, Clone)]
pub struct AppContract {
    base_url: String,
    routes: Routes,
}

impl AppContract {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            routes: config.routes.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self, route: Route) -> &str {
        match route {
            Route::Register => &self.routes.register,
            Route::Login => &self.routes.login,
            Route::Dashboard => &self.routes.dashboard,
            Route::Projects => &self.routes.projects,
            Route::Tasks => &self.routes.tasks,
            Route::Analytics => &self.routes.analytics,
        }
    }

    /// Last path segment of a route, e.g. `/login` for `/auth/login`.
    ///
    /// URL checks match on this fragment so nested or redirected variants of
    /// a route still count.
    pub fn fragment(&self, route: Route) -> String {
        let path = self.path(route).trim_end_matches('/');
        let last = path.rsplit('/').next().unwrap_or(path);
        format!("/{}", last)
    }

    pub fn url(&self, route: Route) -> String {
        self.url_for(self.path(route))
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// The unauthenticated entry point.
    pub fn baseline(&self) -> Baseline {
        Baseline::new(self.url(Route::Login), self.fragment(Route::Login))
    }
}
