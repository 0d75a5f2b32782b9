//! `pmcheck list` - show the execution plan without running it

use pmcheck_e2e::{catalog, Scheduler};

use crate::output::{print_plan, OutputFormat, PlannedStep};

pub fn execute(format: OutputFormat) -> anyhow::Result<()> {
    let mut scheduler = Scheduler::new();
    catalog::register_all(&mut scheduler)?;
    scheduler.validate()?;

    let plan: Vec<PlannedStep> = scheduler.steps().map(PlannedStep::from).collect();
    print_plan(&plan, format);
    Ok(())
}
