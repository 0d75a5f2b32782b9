use tracing::info;

use crate::app::{ids, Route};
use crate::context::SuiteContext;
use crate::error::E2eResult;
use crate::locator::{text_xpath, LocatorSpec};

use super::login::ensure_logged_in;

const STATISTICS_CARDS: [&str; 4] = ["Total Tasks", "Todo Tasks", "In Progress", "Completed"];
const PROJECTS_HEADING: &str = "Projects";

pub(super) async fn loads(ctx: &mut SuiteContext) -> E2eResult<()> {
    ensure_logged_in(ctx).await?;

    let page = ctx.page().await?;
    page.expect_visible(&LocatorSpec::id(ids::DASHBOARD_PAGE)).await?;
    info!("Dashboard loaded");
    Ok(())
}

pub(super) async fn statistics_cards(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    for label in STATISTICS_CARDS {
        let card = LocatorSpec::xpath(text_xpath(label));
        page.assert_displayed(&card, &format!("{} card", label)).await?;
    }
    Ok(())
}

pub(super) async fn projects_section(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    page.assert_displayed(
        &LocatorSpec::xpath(text_xpath(PROJECTS_HEADING)),
        "Projects section",
    )
    .await
}

pub(super) async fn url(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let fragment = page.app().fragment(Route::Dashboard);
    page.assert_url_contains(&fragment).await
}
