use tokio::time::Instant;
use tracing::{info, warn};

use crate::app::{ids, selectors, success_toast, Route};
use crate::config::SettleKind;
use crate::context::SuiteContext;
use crate::error::{E2eError, E2eResult};
use crate::locator::{text_xpath, Criticality, LocatorSpec, Predicate};
use crate::page::{tolerate, Page};
use crate::resolver::OptionChoice;
use crate::waits::Signal;

use super::login::ensure_logged_in;

pub const PROJECT_NAME: &str = "Automated Test Project";
const PROJECT_DESCRIPTION: &str = "Created automatically by the UI test suite";

pub(super) async fn page_loads(ctx: &mut SuiteContext) -> E2eResult<()> {
    ensure_logged_in(ctx).await?;

    let page = ctx.page().await?;
    page.open(Route::Projects).await?;
    page.expect_visible(&LocatorSpec::id(ids::PROJECTS_PAGE)).await?;
    info!("Projects page loaded");
    Ok(())
}

pub(super) async fn create_button(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    page.expect_visible(&LocatorSpec::id(ids::CREATE_PROJECT_BUTTON)).await?;
    Ok(())
}

pub(super) async fn dialog_opens(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    page.click(&LocatorSpec::id(ids::CREATE_PROJECT_BUTTON)).await?;
    page.settle(SettleKind::Dialog).await;

    page.expect_visible(&LocatorSpec::id(ids::PROJECT_NAME)).await?;
    page.assert_displayed(
        &LocatorSpec::id(ids::PROJECT_DESCRIPTION),
        "Project description",
    )
    .await?;
    page.assert_displayed(&LocatorSpec::id(ids::PROJECT_SUBMIT), "Submit button").await?;
    info!("Create project dialog opened");
    Ok(())
}

/// Fill and submit the project dialog. The project counts as created once
/// the dialog's name field is gone or hidden.
pub(super) async fn create(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let timeouts = page.timeouts();

    page.settle(SettleKind::Dialog).await;
    page.fill(&LocatorSpec::id(ids::PROJECT_NAME), PROJECT_NAME).await?;
    page.fill(
        &LocatorSpec::id(ids::PROJECT_DESCRIPTION),
        PROJECT_DESCRIPTION,
    )
    .await?;

    select_project_manager(&page).await?;
    select_team_member(&page).await?;

    page.click(&LocatorSpec::id(ids::PROJECT_SUBMIT)).await?;
    let budget = timeouts.long_wait();
    let deadline = Instant::now() + budget;

    // The notification is optional; the dialog closing is not. Both share
    // one budget counted from submit.
    let name_field = LocatorSpec::id(ids::PROJECT_NAME);
    let signals = [
        Signal::Visible(success_toast()),
        Signal::Absent(name_field.clone()),
    ];
    let closed = match page.first_signal(&signals, budget).await {
        Ok(0) => {
            info!("Project success notification shown");
            let left = deadline.saturating_duration_since(Instant::now());
            page.wait_absent(&name_field, left).await
        }
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    };

    match closed {
        Ok(()) => {
            info!(project = PROJECT_NAME, "Project created");
            Ok(())
        }
        Err(E2eError::Timeout { .. }) => Err(E2eError::AssertionFailed(format!(
            "project creation dialog should close on success within {:?}",
            budget
        ))),
        Err(e) => Err(e),
    }
}

/// The manager select renders its trigger differently depending on state:
/// its label, its id, or only a positioned container that needs a script click.
fn project_manager_trigger() -> LocatorSpec {
    LocatorSpec::xpath(selectors::PROJECT_MANAGER_LABEL)
        .or_id(ids::PROJECT_MANAGER_SELECT)
        .or_script_click(selectors::PROJECT_MANAGER_CONTAINER)
}

async fn select_project_manager(page: &Page<'_>) -> E2eResult<()> {
    let short = page.timeouts().short_wait();
    let chosen = page
        .select_option(
            &project_manager_trigger(),
            &LocatorSpec::css(selectors::LIST_OPTION),
            &OptionChoice::First,
            short,
        )
        .await;

    let Some(manager) = tolerate(Criticality::Optional, "project manager", chosen)? else {
        return Ok(());
    };

    let shown = page
        .find(
            &LocatorSpec::xpath(text_xpath(&manager)),
            Predicate::Present,
            short,
        )
        .await;
    if tolerate(Criticality::Optional, "project manager selection check", shown)?.is_some() {
        info!(manager = %manager, "Project manager selected");
    } else {
        warn!(manager = %manager, "Selected manager not shown, continuing");
    }
    Ok(())
}

async fn select_team_member(page: &Page<'_>) -> E2eResult<()> {
    let chosen = page
        .select_option(
            &LocatorSpec::id(ids::TEAM_MEMBERS_SELECT),
            &LocatorSpec::xpath(selectors::MULTISELECT_ENTRY),
            &OptionChoice::First,
            page.timeouts().wait(),
        )
        .await;
    if let Some(member) = tolerate(Criticality::Optional, "team member", chosen)? {
        info!(member = %member, "Team member selected");
        // Close the popover.
        let close = page
            .click_within(&LocatorSpec::id(ids::PROJECT_NAME), page.timeouts().lookup())
            .await;
        tolerate(Criticality::Optional, "closing team member list", close)?;
    }
    Ok(())
}
