use tracing::{info, warn};

use crate::app::{ids, selectors, success_toast, Route};
use crate::config::SettleKind;
use crate::context::SuiteContext;
use crate::error::E2eResult;
use crate::locator::{LocatorSpec, Predicate};
use crate::page::Page;
use crate::resolver::OptionChoice;
use crate::waits::Signal;

use super::failed_to;
use super::projects::PROJECT_NAME;

pub const COLUMN_NAME: &str = "To Do";
pub const TASK_NAME: &str = "Automated Test Task";
const TASK_DESCRIPTION: &str = "This task was created by the UI test suite.";
const TASK_PRIORITY: &str = "High";
const TASK_DUE_DATE: &str = "2026-12-31";

/// Open the task board and pick the project created earlier in the run.
pub(super) async fn select_project(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let wait = page.timeouts().wait();
    let fragment = page.app().fragment(Route::Tasks);

    page.open(Route::Tasks).await?;
    page.wait_url(&fragment, wait).await.map_err(failed_to("task board did not open"))?;
    page.settle(SettleKind::Navigation).await;

    let chosen = page
        .select_option(
            &LocatorSpec::id(ids::PROJECT_SELECT),
            &LocatorSpec::css(selectors::LIST_OPTION),
            &OptionChoice::Containing(PROJECT_NAME.to_string()),
            wait,
        )
        .await
        .map_err(failed_to("could not select the created project"))?;
    info!(project = %chosen, "Project selected on task board");
    Ok(())
}

/// Create a task in the first column, creating a column first when the
/// board has none.
pub(super) async fn create(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let timeouts = page.timeouts();
    let add_task = LocatorSpec::xpath(selectors::ADD_TASK_BUTTON);

    page.settle(SettleKind::Navigation).await;
    if page.find_now(&add_task, Predicate::Present).await?.is_empty() {
        warn!("No columns found, creating '{}' column", COLUMN_NAME);
        create_column(&page, &add_task).await.map_err(failed_to("failed to create a column"))?;
    }

    page.click(&add_task).await.map_err(failed_to("could not open the add task dialog"))?;

    fill_task_form(&page).await.map_err(failed_to("failed to fill the task form"))?;
    page.click(&LocatorSpec::id(ids::TASK_SUBMIT)).await?;

    page.first_signal(&[Signal::Visible(success_toast())], timeouts.long_wait())
        .await
        .map_err(failed_to("task was not confirmed"))?;
    info!(task = TASK_NAME, "Task created");
    Ok(())
}

async fn create_column(page: &Page<'_>, add_task: &LocatorSpec) -> E2eResult<()> {
    page.click(&LocatorSpec::id(ids::ADD_COLUMN_BUTTON)).await?;
    page.fill(&LocatorSpec::id(ids::COLUMN_NAME), COLUMN_NAME).await?;
    page.click(&LocatorSpec::id(ids::COLUMN_SUBMIT)).await?;
    page.expect_visible(add_task).await?;
    info!("Created '{}' column", COLUMN_NAME);
    Ok(())
}

async fn fill_task_form(page: &Page<'_>) -> E2eResult<()> {
    let wait = page.timeouts().wait();

    page.fill(&LocatorSpec::id(ids::TASK_NAME), TASK_NAME).await?;
    page.fill(&LocatorSpec::id(ids::TASK_DESCRIPTION), TASK_DESCRIPTION).await?;

    page.select_option(
        &LocatorSpec::id(ids::TASK_PRIORITY),
        &LocatorSpec::css(selectors::LIST_OPTION),
        &OptionChoice::Exact(TASK_PRIORITY.to_string()),
        wait,
    )
    .await?;

    page.select_option(
        &LocatorSpec::id(ids::TASK_ASSIGNEES),
        &LocatorSpec::xpath(selectors::MULTISELECT_ENTRY),
        &OptionChoice::First,
        wait,
    )
    .await?;

    page.fill(&LocatorSpec::id(ids::TASK_DUE_DATE), TASK_DUE_DATE).await?;
    Ok(())
}
