use tracing::info;

use crate::app::{ids, Route};
use crate::context::SuiteContext;
use crate::error::E2eResult;
use crate::locator::LocatorSpec;

use super::failed_to;

pub(super) async fn loads(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    page.open(Route::Analytics).await?;

    page.expect_visible(&LocatorSpec::id(ids::ANALYTICS_PAGE))
        .await
        .map_err(failed_to("analytics page failed to load"))?;
    page.expect_visible(&LocatorSpec::id(ids::CHART_TASKS_PER_COLUMN))
        .await
        .map_err(failed_to("analytics charts failed to load"))?;

    info!("Analytics page and charts loaded");
    Ok(())
}
