//! Scripted project management app for integration tests
#![allow(dead_code)]

use std::time::Duration;

use pmcheck_e2e::app::{ids, markers, selectors};
use pmcheck_e2e::catalog::PROJECT_NAME;
use pmcheck_e2e::config::FixtureConfig;
use pmcheck_e2e::mock::{Effect, MockBackend, MockElement};
use pmcheck_e2e::{Credentials, SuiteConfig, SuiteContext};

pub const MANAGER: &str = "Test User";

/// Where the registration form sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterRegister {
    Dashboard,
    Login,
    Toast,
}

/// How the project manager select renders its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerTrigger {
    Label,
    /// Only the positioned container exists, and an overlay blocks native clicks.
    BlockedContainer,
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub after_register: AfterRegister,
    pub invalid_login_toast: bool,
    pub manager_trigger: ManagerTrigger,
    pub project_dialog_closes: bool,
    /// Submit shows no notification and the name field lingers this long.
    pub project_dialog_delay: Option<Duration>,
    pub existing_column: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            after_register: AfterRegister::Login,
            invalid_login_toast: true,
            manager_trigger: ManagerTrigger::Label,
            project_dialog_closes: true,
            project_dialog_delay: None,
            existing_column: false,
        }
    }
}

pub fn credentials() -> Credentials {
    Credentials::with_token(&FixtureConfig::default(), 1_767_225_600_000)
}

pub fn suite_config() -> SuiteConfig {
    SuiteConfig::default()
}

pub fn context(backend: &MockBackend, credentials: &Credentials) -> SuiteContext {
    SuiteContext::new(
        &suite_config(),
        Box::new(backend.launcher()),
        credentials.clone(),
    )
}

fn toast(class: &str) -> MockElement {
    MockElement::new("toast")
        .css(class)
        .disappear_after(Duration::from_secs(3))
}

fn field(id: &str) -> MockElement {
    MockElement::with_id(id).hidden()
}

/// Build the mock application with every route registered.
pub fn pms_app(credentials: &Credentials, options: &AppOptions) -> MockBackend {
    let backend = MockBackend::new();

    let after_register = match options.after_register {
        AfterRegister::Dashboard => Effect::Navigate("/dashboard".into()),
        AfterRegister::Login => Effect::Navigate("/auth/login".into()),
        AfterRegister::Toast => Effect::Insert(toast(markers::TOAST_SUCCESS)),
    };
    backend.page(
        "/auth/register",
        vec![
            MockElement::with_id(ids::REGISTER_FORM),
            MockElement::with_id(ids::REGISTER_NAME),
            MockElement::with_id(ids::REGISTER_EMAIL),
            MockElement::with_id(ids::REGISTER_PASSWORD),
            MockElement::with_id(ids::REGISTER_SUBMIT).on_click(after_register),
            MockElement::new("login-link").link_text("Login here"),
        ],
    );

    let rejected = if options.invalid_login_toast {
        vec![Effect::Insert(toast(markers::TOAST_ERROR))]
    } else {
        Vec::new()
    };
    backend.page(
        "/auth/login",
        vec![
            MockElement::with_id(ids::LOGIN_FORM),
            MockElement::with_id(ids::LOGIN_EMAIL),
            MockElement::with_id(ids::LOGIN_PASSWORD),
            MockElement::with_id(ids::LOGIN_SUBMIT).on_click(Effect::IfValue {
                field: ids::LOGIN_EMAIL.into(),
                value: credentials.email().into(),
                then: vec![
                    Effect::SetStorage {
                        key: "token".into(),
                        value: "jwt".into(),
                    },
                    Effect::Navigate("/dashboard".into()),
                ],
                otherwise: rejected,
            }),
            MockElement::new("register-link").link_text("Register here"),
        ],
    );

    backend.page(
        "/dashboard",
        vec![
            MockElement::with_id(ids::DASHBOARD_PAGE),
            MockElement::new("card-total").text("Total Tasks"),
            MockElement::new("card-todo").text("Todo Tasks"),
            MockElement::new("card-progress").text("In Progress"),
            MockElement::new("card-completed").text("Completed"),
            MockElement::new("projects-heading").text("Projects"),
        ],
    );

    backend.page("/admin/projects", projects_page(options));
    backend.page("/admin/tasks", tasks_page(options));
    backend.page(
        "/admin/analytics",
        vec![
            MockElement::with_id(ids::ANALYTICS_PAGE),
            MockElement::with_id(ids::CHART_TASKS_PER_COLUMN)
                .appear_after(Duration::from_millis(800)),
        ],
    );

    backend
}

fn projects_page(options: &AppOptions) -> Vec<MockElement> {
    let manager_option = MockElement::new("manager-option")
        .css(selectors::LIST_OPTION)
        .text(MANAGER)
        .on_click(Effect::Remove("manager-option".into()))
        .on_click(Effect::Insert(
            MockElement::new("manager-selected").text(MANAGER),
        ));
    let open_manager = Effect::Insert(manager_option);

    let manager_trigger = match options.manager_trigger {
        ManagerTrigger::Label => MockElement::new("manager-label")
            .xpath(selectors::PROJECT_MANAGER_LABEL)
            .hidden()
            .on_click(open_manager),
        ManagerTrigger::BlockedContainer => MockElement::new("pm-container")
            .xpath(selectors::PROJECT_MANAGER_CONTAINER)
            .blocked()
            .hidden()
            .on_click(open_manager),
    };
    let trigger_key = manager_trigger.key().to_string();

    let member = MockElement::new("member-entry")
        .xpath(selectors::MULTISELECT_ENTRY)
        .text(MANAGER)
        .on_click(Effect::Remove("member-entry".into()));

    let dialog = [
        ids::PROJECT_NAME,
        ids::PROJECT_DESCRIPTION,
        ids::TEAM_MEMBERS_SELECT,
        ids::PROJECT_SUBMIT,
    ];

    let mut submit = field(ids::PROJECT_SUBMIT);
    if let Some(delay) = options.project_dialog_delay {
        let lingering = MockElement::with_id(ids::PROJECT_NAME).disappear_after(delay);
        submit = submit
            .on_click(Effect::Remove(ids::PROJECT_NAME.into()))
            .on_click(Effect::Insert(lingering));
    } else if options.project_dialog_closes {
        submit = submit.on_click(Effect::Insert(toast(markers::TOAST_SUCCESS)));
        for id in dialog {
            submit = submit.on_click(Effect::Hide(id.into()));
        }
        submit = submit.on_click(Effect::Hide(trigger_key.clone()));
    }

    let mut create = MockElement::with_id(ids::CREATE_PROJECT_BUTTON)
        .on_click(Effect::Show(trigger_key));
    for id in dialog {
        create = create.on_click(Effect::Show(id.into()));
    }

    vec![
        MockElement::with_id(ids::PROJECTS_PAGE),
        create,
        field(ids::PROJECT_NAME),
        field(ids::PROJECT_DESCRIPTION),
        manager_trigger,
        field(ids::TEAM_MEMBERS_SELECT).on_click(Effect::Insert(member)),
        submit,
    ]
}

fn add_task_button() -> MockElement {
    let mut button = MockElement::new("add-task-btn-1")
        .id("add-task-btn-1")
        .xpath(selectors::ADD_TASK_BUTTON);
    for id in [
        ids::TASK_NAME,
        ids::TASK_DESCRIPTION,
        ids::TASK_PRIORITY,
        ids::TASK_ASSIGNEES,
        ids::TASK_DUE_DATE,
        ids::TASK_SUBMIT,
    ] {
        button = button.on_click(Effect::Show(id.into()));
    }
    button
}

fn priority_option(label: &str) -> MockElement {
    MockElement::new("priority-option")
        .css(selectors::LIST_OPTION)
        .text(label)
        .on_click(Effect::Remove("priority-option".into()))
}

fn tasks_page(options: &AppOptions) -> Vec<MockElement> {
    let project_option = MockElement::new("project-option")
        .css(selectors::LIST_OPTION)
        .text(PROJECT_NAME)
        .on_click(Effect::Remove("project-option".into()));

    let column_submit = MockElement::with_id(ids::COLUMN_SUBMIT)
        .on_click(Effect::Remove(ids::COLUMN_NAME.into()))
        .on_click(Effect::Remove(ids::COLUMN_SUBMIT.into()))
        .on_click(Effect::Insert(add_task_button()));

    let assignee = MockElement::new("assignee-entry")
        .xpath(selectors::MULTISELECT_ENTRY)
        .text(MANAGER)
        .on_click(Effect::Remove("assignee-entry".into()));

    let mut elements = vec![
        MockElement::with_id(ids::PROJECT_SELECT).on_click(Effect::Insert(project_option)),
        MockElement::with_id(ids::ADD_COLUMN_BUTTON)
            .on_click(Effect::Insert(MockElement::with_id(ids::COLUMN_NAME)))
            .on_click(Effect::Insert(column_submit)),
        field(ids::TASK_NAME),
        field(ids::TASK_DESCRIPTION),
        field(ids::TASK_PRIORITY)
            .on_click(Effect::Insert(priority_option("Low")))
            .on_click(Effect::Insert(priority_option("High"))),
        field(ids::TASK_ASSIGNEES).on_click(Effect::Insert(assignee)),
        field(ids::TASK_DUE_DATE),
        field(ids::TASK_SUBMIT).on_click(Effect::Insert(toast(markers::TOAST_SUCCESS))),
    ];
    if options.existing_column {
        elements.push(add_task_button());
    }
    elements
}
