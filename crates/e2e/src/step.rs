//! Steps and their outcomes

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::SuiteContext;
use crate::error::E2eResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Result of running one step. Recorded once per step per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { reason: String },
    /// Not run; `cause` is the failed step at the root of the skip chain.
    Skipped { cause: StepId },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Skipped { .. } => "SKIP",
        }
    }
}

/// Work performed by a step. Errors become `Failed` at the step boundary.
#[async_trait]
pub trait StepBody: Send + Sync {
    async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<()>;
}

/// A named unit of suite work with declared prerequisites.
pub struct Step {
    pub id: StepId,
    /// Unique, defines execution order.
    pub priority: u32,
    pub name: String,
    /// Functional area, used for progress banners and report grouping.
    pub group: String,
    pub depends_on: BTreeSet<StepId>,
    /// Reset the application to baseline before the body runs.
    pub needs_baseline: bool,
    body: Box<dyn StepBody>,
}

impl Step {
    pub fn new(
        id: impl Into<StepId>,
        priority: u32,
        name: impl Into<String>,
        body: impl StepBody + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            priority,
            name: name.into(),
            group: String::new(),
            depends_on: BTreeSet::new(),
            needs_baseline: false,
            body: Box::new(body),
        }
    }

    pub fn depends_on(mut self, id: impl Into<StepId>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_baseline(mut self) -> Self {
        self.needs_baseline = true;
        self
    }

    pub(crate) async fn run_body(&self, ctx: &mut SuiteContext) -> E2eResult<()> {
        self.body.run(ctx).await
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("name", &self.name)
            .field("group", &self.group)
            .field("depends_on", &self.depends_on)
            .field("needs_baseline", &self.needs_baseline)
            .finish()
    }
}
