use tracing::{debug, info};

use crate::app::{error_toast, ids, success_toast, AppContract, Route};
use crate::config::SettleKind;
use crate::context::SuiteContext;
use crate::error::{E2eError, E2eResult};
use crate::locator::{text_xpath, LocatorSpec};
use crate::page::Page;
use crate::waits::Signal;

const REGISTER_LINK_TEXT: &str = "Register here";
const INVALID_EMAIL: &str = "wrong@example.com";
const INVALID_PASSWORD: &str = "wrongpassword";

pub(super) async fn page_loads(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    open_form(&page).await?;
    info!("Login page loaded");
    Ok(())
}

pub(super) async fn fields_exist(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    for (id, what) in [
        (ids::LOGIN_EMAIL, "Email field"),
        (ids::LOGIN_PASSWORD, "Password field"),
        (ids::LOGIN_SUBMIT, "Login button"),
    ] {
        page.assert_displayed(&LocatorSpec::id(id), what).await?;
    }
    Ok(())
}

pub(super) async fn register_link(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    let link =
        LocatorSpec::link_text(REGISTER_LINK_TEXT).or_xpath(text_xpath(REGISTER_LINK_TEXT));
    page.assert_displayed(&link, "Register link").await
}

/// Unknown credentials must be rejected: an error notification, or the
/// session simply staying on the login route.
pub(super) async fn invalid_credentials(ctx: &mut SuiteContext) -> E2eResult<()> {
    let page = ctx.page().await?;
    open_form(&page).await?;
    submit_form(&page, INVALID_EMAIL, INVALID_PASSWORD).await?;

    let timeouts = page.timeouts();
    match page
        .first_signal(&[Signal::Visible(error_toast())], timeouts.short_wait())
        .await
    {
        Ok(_) => info!("Invalid login shows error notification"),
        Err(E2eError::Timeout { .. }) => {
            let login = page.app().fragment(Route::Login);
            page.assert_url_contains(&login).await?;
            info!("Invalid login kept user on login page");
        }
        Err(e) => return Err(e),
    }

    page.settle(SettleKind::Toast).await;
    Ok(())
}

pub(super) async fn success(ctx: &mut SuiteContext) -> E2eResult<()> {
    let credentials = ctx.credentials().clone();
    let page = ctx.page().await?;
    let wait = page.timeouts().wait();
    let dashboard = page.app().fragment(Route::Dashboard);

    open_form(&page).await?;
    info!(email = %credentials.email(), "Attempting login");
    submit_form(&page, credentials.email(), credentials.password()).await?;

    let signals = [
        Signal::url_contains(dashboard.as_str()),
        Signal::Visible(success_toast()),
        Signal::Visible(error_toast()),
    ];
    match page.first_signal(&signals, wait).await {
        Ok(hit) => debug!(via = %signals[hit], "Login responded"),
        Err(E2eError::Timeout { .. }) => {
            return Err(E2eError::AssertionFailed(
                "login timed out: no redirect or notification observed".to_string(),
            ))
        }
        Err(e) => return Err(e),
    }

    match page.wait_url(&dashboard, wait).await {
        Ok(()) => {}
        Err(E2eError::Timeout { .. }) => {
            let url = page.url().await?;
            return Err(E2eError::AssertionFailed(format!(
                "URL should contain '{}' after login, but was: {}",
                dashboard, url
            )));
        }
        Err(e) => return Err(e),
    }

    let url = page.url().await?;
    info!(url = %url, "Login successful");
    Ok(())
}

/// Log in with the suite credentials unless the session is already inside
/// the authenticated area. Ends on the dashboard.
pub async fn ensure_logged_in(ctx: &mut SuiteContext) -> E2eResult<()> {
    {
        let page = ctx.page().await?;
        let url = page.url().await?;
        if in_authenticated_area(page.app(), &url) {
            debug!("Already logged in");
            return Ok(());
        }
    }

    ctx.to_baseline().await?;

    let credentials = ctx.credentials().clone();
    let page = ctx.page().await?;
    let app = page.app();
    let dashboard = app.fragment(Route::Dashboard);

    page.expect_visible(&LocatorSpec::id(ids::LOGIN_FORM)).await?;
    submit_form(&page, credentials.email(), credentials.password()).await?;

    page.first_signal(
        &[
            Signal::url_contains(dashboard.as_str()),
            Signal::Visible(success_toast()),
        ],
        page.timeouts().wait(),
    )
    .await?;

    let url = page.url().await?;
    if !url.contains(&dashboard) {
        page.open(Route::Dashboard).await?;
    }
    page.settle(SettleKind::Navigation).await;
    info!(email = %credentials.email(), "Logged in");
    Ok(())
}

/// Dashboard or any route sharing the admin prefix of the project list.
fn in_authenticated_area(app: &AppContract, url: &str) -> bool {
    let admin_prefix = app
        .path(Route::Projects)
        .rsplit_once('/')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty());

    url.contains(&app.fragment(Route::Dashboard))
        || admin_prefix.map_or(false, |prefix| url.contains(prefix))
}

async fn open_form(page: &Page<'_>) -> E2eResult<()> {
    page.open(Route::Login).await?;
    page.settle(SettleKind::Navigation).await;
    page.expect_visible(&LocatorSpec::id(ids::LOGIN_FORM)).await.map(|_| ())
}

async fn submit_form(page: &Page<'_>, email: &str, password: &str) -> E2eResult<()> {
    page.fill(&LocatorSpec::id(ids::LOGIN_EMAIL), email).await?;
    page.fill(&LocatorSpec::id(ids::LOGIN_PASSWORD), password).await?;
    page.click(&LocatorSpec::id(ids::LOGIN_SUBMIT)).await
}
