//! PMCheck E2E suite engine
//!
//! This crate runs a dependency-ordered UI suite against the project
//! management web application:
//! - Schedules named steps by priority and skips those whose prerequisites failed
//! - Guards the browser session, relaunching it transparently when it dies
//! - Resolves UI controls through ordered fallback strategies with bounded polling
//! - Resets the application to an unauthenticated baseline between phases
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Scheduler                               │
//! │    for each Step (priority order):                          │
//! │      prerequisites passed? ── no ──> Skipped(root cause)    │
//! │      SessionGuardian::ensure_live()                         │
//! │      StateReset::to_baseline()      (baseline steps)        │
//! │      StepBody::run(ctx) ──> Passed | Failed(reason)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page (borrowed per phase)                                  │
//! │    ├── ElementResolver  (LocatorSpec, Predicate, polling)   │
//! │    ├── first_signal     (url | visible | absent)            │
//! │    └── settle           (bounded fixed delay)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Browser / Launcher traits                                  │
//! │    ├── WebDriverBrowser (fantoccini)                        │
//! │    └── MockBrowser      (scripted, in-memory)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod fixture;
pub mod locator;
pub mod mock;
pub mod page;
pub mod preflight;
pub mod report;
pub mod reset;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod step;
pub mod waits;
pub mod webdriver;

pub use capability::{Browser, CapabilityError, ElementHandle, Launcher, StrategyKind};
pub use config::{SessionConfig, SuiteConfig};
pub use context::SuiteContext;
pub use error::{E2eError, E2eResult};
pub use fixture::Credentials;
pub use locator::{Criticality, LocatorSpec, Predicate};
pub use page::Page;
pub use report::{ReportEntry, SuiteReport};
pub use reset::{Baseline, StateReset};
pub use resolver::{ElementResolver, OptionChoice, Resolved};
pub use scheduler::Scheduler;
pub use session::SessionGuardian;
pub use step::{Outcome, Step, StepBody, StepId};
pub use waits::Signal;
pub use webdriver::WebDriverLauncher;
