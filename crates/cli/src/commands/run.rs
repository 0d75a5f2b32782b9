//! `pmcheck run` - execute the suite against a live application

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use pmcheck_e2e::config::BrowserKind;
use pmcheck_e2e::{
    catalog, preflight, Credentials, Scheduler, SuiteConfig, SuiteContext, WebDriverLauncher,
};
use tracing::{info, warn};

use crate::output::{self, OutputFormat};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Base URL of the application under test
    #[arg(long, env = "PMCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// WebDriver endpoint (chromedriver or geckodriver)
    #[arg(long, env = "PMCHECK_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Browser to drive: chrome or firefox
    #[arg(long, env = "PMCHECK_BROWSER")]
    pub browser: Option<BrowserKind>,

    /// Run the browser without a window
    #[arg(long, env = "PMCHECK_HEADLESS")]
    pub headless: bool,

    /// Directory the JSON report is written to
    #[arg(long, env = "PMCHECK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip the application and WebDriver reachability checks
    #[arg(long)]
    pub skip_preflight: bool,
}

impl RunArgs {
    /// Command-line values win over the configuration file.
    pub fn apply(&self, config: &mut SuiteConfig) {
        if let Some(url) = &self.base_url {
            config.app.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(kind) = self.browser {
            config.browser.kind = kind;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }
    }
}

/// Run the suite and return the process exit status.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let mut config = SuiteConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    args.apply(&mut config);
    config.validate()?;

    if args.skip_preflight {
        warn!("Skipping preflight checks");
    } else {
        preflight::wait_for_app(&config.app.base_url, config.app.startup_timeout()).await?;
        preflight::require_webdriver(&config.browser.webdriver_url).await?;
    }

    let mut scheduler = Scheduler::new();
    catalog::register_all(&mut scheduler)?;

    let credentials = Credentials::generate(&config.fixture);
    info!(email = %credentials.email(), "Generated suite credentials");

    let mut ctx = SuiteContext::new(&config, Box::new(WebDriverLauncher::new()), credentials);
    let result = scheduler.run(&mut ctx).await;
    ctx.shutdown().await;
    let report = result?;

    match report.write_json(&config.report.output_dir) {
        Ok(path) => output::print_info(&format!("Report written to {}", path.display())),
        Err(e) => warn!(error = %e, "Could not write report"),
    }
    output::print_report(&report, format);

    Ok(report.exit_code())
}
