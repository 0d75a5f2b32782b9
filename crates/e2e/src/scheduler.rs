//! Dependency scheduler
//!
//! Runs registered steps once each in priority order. A step whose
//! prerequisites did not all pass is recorded as skipped without running its
//! body. Step failures are contained; only configuration and environment
//! errors stop the run.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::context::SuiteContext;
use crate::error::{E2eError, E2eResult};
use crate::report::{ReportEntry, SuiteReport};
use crate::step::{Outcome, Step, StepId};

#[derive(Debug, Default)]
pub struct Scheduler {
    steps: BTreeMap<u32, Step>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step. Priorities must strictly increase in registration order,
    /// ids must be unique, and every prerequisite must already be registered.
    pub fn register(&mut self, step: Step) -> E2eResult<()> {
        if let Some(existing) = self.steps.get(&step.priority) {
            return Err(E2eError::Configuration(format!(
                "steps '{}' and '{}' share priority {}",
                existing.id, step.id, step.priority
            )));
        }
        if let Some(last) = self.steps.values().next_back() {
            if step.priority < last.priority {
                return Err(E2eError::Configuration(format!(
                    "step '{}' has priority {} but follows '{}' (priority {})",
                    step.id, step.priority, last.id, last.priority
                )));
            }
        }
        if self.steps.values().any(|s| s.id == step.id) {
            return Err(E2eError::Configuration(format!(
                "step id '{}' registered twice",
                step.id
            )));
        }
        if let Some(dep) = step
            .depends_on
            .iter()
            .find(|dep| !self.steps.values().any(|s| &s.id == *dep))
        {
            return Err(E2eError::Configuration(format!(
                "step '{}' depends on unknown step '{}'",
                step.id, dep
            )));
        }
        self.steps.insert(step.priority, step);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    /// Every prerequisite must name a registered step of strictly lower priority.
    pub fn validate(&self) -> E2eResult<()> {
        for step in self.steps.values() {
            for dep in &step.depends_on {
                let target = self
                    .steps
                    .values()
                    .find(|s| &s.id == dep)
                    .ok_or_else(|| {
                        E2eError::Configuration(format!(
                            "step '{}' depends on unknown step '{}'",
                            step.id, dep
                        ))
                    })?;
                if target.priority >= step.priority {
                    return Err(E2eError::Configuration(format!(
                        "step '{}' (priority {}) depends on '{}' which runs later (priority {})",
                        step.id, step.priority, dep, target.priority
                    )));
                }
            }
        }
        Ok(())
    }

    /// Execute the suite. Returns `Err` only for an invalid suite definition;
    /// an environment failure during the run is recorded in the report.
    ///
    /// A configuration or environment error aborts the run. The step that
    /// hit it is recorded as `Failed`, even when the error came from
    /// launching the browser before its body started, so the report names
    /// one failed step as the cause of every `Skipped` step after it.
    pub async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<SuiteReport> {
        self.validate()?;

        let mut report = SuiteReport::new();
        let mut abort: Option<StepId> = None;
        let mut group = "";

        info!("Running {} step(s)...", self.steps.len());

        for step in self.steps.values() {
            if step.group != group {
                group = &step.group;
                if abort.is_none() && !group.is_empty() {
                    info!("=== {} ===", group);
                }
            }

            let started = Instant::now();

            if let Some(cause) = &abort {
                report.record(entry(
                    step,
                    Outcome::Skipped {
                        cause: cause.clone(),
                    },
                    Some("suite aborted".to_string()),
                    started,
                ));
                continue;
            }

            if let Some((dep, cause)) = blocking_prerequisite(step, &report) {
                let message = format!("prerequisite '{}' did not pass", dep);
                warn!("- {} skipped: {}", step.name, message);
                report.record(entry(
                    step,
                    Outcome::Skipped { cause },
                    Some(message),
                    started,
                ));
                continue;
            }

            match execute(step, ctx).await {
                Ok(()) => {
                    info!("✓ {} ({} ms)", step.name, started.elapsed().as_millis());
                    report.record(entry(step, Outcome::Passed, None, started));
                }
                Err(e) => {
                    let reason = e.to_string();
                    error!("✗ {} - {}", step.name, reason);
                    if e.is_fatal() {
                        error!("Aborting suite: {}", reason);
                        abort = Some(step.id.clone());
                        report.aborted = Some(reason.clone());
                    }
                    report.record(entry(
                        step,
                        Outcome::Failed {
                            reason: reason.clone(),
                        },
                        Some(reason),
                        started,
                    ));
                }
            }
        }

        report.finish();
        info!(
            "Suite Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed(),
            report.failed(),
            report.skipped(),
            report.duration_ms()
        );
        Ok(report)
    }
}

async fn execute(step: &Step, ctx: &mut SuiteContext) -> E2eResult<()> {
    ctx.ensure_live().await?;
    if step.needs_baseline {
        ctx.to_baseline().await?;
    }
    step.run_body(ctx).await
}

/// The first prerequisite that did not pass, with the failed step at the
/// root of its skip chain.
fn blocking_prerequisite(step: &Step, report: &SuiteReport) -> Option<(StepId, StepId)> {
    step.depends_on.iter().find_map(|dep| match report.outcome(dep) {
        Some(Outcome::Passed) => None,
        Some(Outcome::Skipped { cause }) => Some((dep.clone(), cause.clone())),
        Some(Outcome::Failed { .. }) | None => Some((dep.clone(), dep.clone())),
    })
}

fn entry(step: &Step, outcome: Outcome, message: Option<String>, started: Instant) -> ReportEntry {
    ReportEntry {
        id: step.id.clone(),
        name: step.name.clone(),
        group: step.group.clone(),
        outcome,
        message,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl crate::step::StepBody for Noop {
        async fn run(&self, _ctx: &mut SuiteContext) -> E2eResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Step::new("a", 1, "A", Noop)).unwrap();
        let err = scheduler.register(Step::new("b", 1, "B", Noop)).unwrap_err();
        assert!(matches!(err, E2eError::Configuration(_)));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Step::new("a", 1, "A", Noop)).unwrap();
        assert!(scheduler.register(Step::new("a", 2, "A again", Noop)).is_err());
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Step::new("a", 1, "A", Noop)).unwrap();
        let err = scheduler
            .register(Step::new("b", 2, "B", Noop).depends_on("missing"))
            .unwrap_err();
        assert!(err.to_string().contains("unknown step 'missing'"));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_decreasing_priority_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Step::new("b", 2, "B", Noop)).unwrap();
        let err = scheduler.register(Step::new("a", 1, "A", Noop)).unwrap_err();
        assert!(matches!(err, E2eError::Configuration(_)));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_dependency_on_later_step_rejected() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler
            .register(Step::new("a", 1, "A", Noop).depends_on("b"))
            .is_err());
        scheduler.register(Step::new("b", 2, "B", Noop)).unwrap();
    }

    #[test]
    fn test_validate_catches_forward_dependency() {
        // Bypass registration checks to exercise the backstop.
        let mut scheduler = Scheduler::new();
        scheduler
            .steps
            .insert(1, Step::new("a", 1, "A", Noop).depends_on("b"));
        scheduler.steps.insert(2, Step::new("b", 2, "B", Noop));
        assert!(matches!(
            scheduler.validate(),
            Err(E2eError::Configuration(_))
        ));
    }

    #[test]
    fn test_steps_iterate_in_priority_order() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Step::new("a", 10, "A", Noop)).unwrap();
        scheduler.register(Step::new("b", 20, "B", Noop)).unwrap();
        scheduler.register(Step::new("c", 30, "C", Noop)).unwrap();
        let order: Vec<_> = scheduler.steps().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_skip_cause_follows_chain_to_root() {
        let mut report = SuiteReport::new();
        let failed = Step::new("login", 1, "Login", Noop);
        report.record(entry(
            &failed,
            Outcome::Failed { reason: "x".into() },
            None,
            Instant::now(),
        ));
        let skipped = Step::new("dashboard", 2, "Dashboard", Noop).depends_on("login");
        report.record(entry(
            &skipped,
            Outcome::Skipped {
                cause: StepId::new("login"),
            },
            None,
            Instant::now(),
        ));

        let cards = Step::new("cards", 3, "Cards", Noop).depends_on("dashboard");
        assert_eq!(
            blocking_prerequisite(&cards, &report),
            Some((StepId::new("dashboard"), StepId::new("login")))
        );
    }
}
