use tracing::info;

use crate::app::{ids, success_toast, Route};
use crate::config::SettleKind;
use crate::context::SuiteContext;
use crate::error::E2eResult;
use crate::locator::{text_xpath, LocatorSpec};
use crate::waits::Signal;

const LOGIN_LINK_TEXT: &str = "Login here";

pub(super) async fn page_loads(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let fragment = page.app().fragment(Route::Register);

    page.open(Route::Register).await?;
    page.settle(SettleKind::Navigation).await;
    // The app may bounce a just-logged-out session back to login once.
    if !page.url().await?.contains(&fragment) {
        page.open(Route::Register).await?;
    }

    page.expect_visible(&LocatorSpec::id(ids::REGISTER_FORM)).await?;
    info!("Registration page loaded");
    Ok(())
}

pub(super) async fn fields_exist(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    for (id, what) in [
        (ids::REGISTER_NAME, "Name field"),
        (ids::REGISTER_EMAIL, "Email field"),
        (ids::REGISTER_PASSWORD, "Password field"),
        (ids::REGISTER_SUBMIT, "Submit button"),
    ] {
        page.assert_displayed(&LocatorSpec::id(id), what).await?;
    }
    Ok(())
}

pub(super) async fn login_link(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let link = LocatorSpec::link_text(LOGIN_LINK_TEXT).or_xpath(text_xpath(LOGIN_LINK_TEXT));
    page.assert_displayed(&link, "Login link").await
}

/// Submit the form with the run's credentials. A redirect to the dashboard
/// or to login, or a success notification, all count as success.
pub(super) async fn submit(ctx: &mut SuiteContext) -> E2eResult<()> {
    let credentials = ctx.credentials().clone();
    let page = ctx.page().await?;
    let app = page.app();

    page.fill(&LocatorSpec::id(ids::REGISTER_NAME), credentials.name()).await?;
    page.fill(&LocatorSpec::id(ids::REGISTER_EMAIL), credentials.email()).await?;
    page.fill(&LocatorSpec::id(ids::REGISTER_PASSWORD), credentials.password()).await?;
    page.click(&LocatorSpec::id(ids::REGISTER_SUBMIT)).await?;

    let signals = [
        Signal::url_contains(app.fragment(Route::Dashboard)),
        Signal::url_contains(app.fragment(Route::Login)),
        Signal::Visible(success_toast()),
    ];
    let hit = page.first_signal(&signals, page.timeouts().wait()).await?;

    info!(email = %credentials.email(), via = %signals[hit], "User registered");
    Ok(())
}
