//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use pmcheck_e2e::{Outcome, ReportEntry, Step, SuiteReport};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// One line per step
    Plain,
}

/// Row of the planned-steps listing
#[derive(Debug, Serialize)]
pub struct PlannedStep {
    pub priority: u32,
    pub id: String,
    pub name: String,
    pub group: String,
    pub depends_on: Vec<String>,
    pub baseline: bool,
}

impl From<&Step> for PlannedStep {
    fn from(step: &Step) -> Self {
        Self {
            priority: step.priority,
            id: step.id.to_string(),
            name: step.name.clone(),
            group: step.group.clone(),
            depends_on: step.depends_on.iter().map(|d| d.to_string()).collect(),
            baseline: step.needs_baseline,
        }
    }
}

fn outcome_cell(outcome: &Outcome) -> Cell {
    let color = match outcome {
        Outcome::Passed => Color::Green,
        Outcome::Failed { .. } => Color::Red,
        Outcome::Skipped { .. } => Color::Yellow,
    };
    Cell::new(outcome.label()).fg(color)
}

fn detail(entry: &ReportEntry) -> String {
    match &entry.outcome {
        Outcome::Passed => String::new(),
        Outcome::Failed { reason } => reason.clone(),
        Outcome::Skipped { cause } => match &entry.message {
            Some(message) => format!("{} (root cause: {})", message, cause),
            None => format!("root cause: {}", cause),
        },
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a finished suite report
pub fn print_report(report: &SuiteReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["Step", "Group", "Outcome", "Duration", "Detail"]);
            for entry in &report.entries {
                table.add_row(vec![
                    Cell::new(&entry.name),
                    Cell::new(&entry.group),
                    outcome_cell(&entry.outcome),
                    Cell::new(format!("{} ms", entry.duration_ms)),
                    Cell::new(detail(entry)),
                ]);
            }
            println!("{table}");
            print_summary(report);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        }
        OutputFormat::Yaml => match report.to_yaml() {
            Ok(yaml) => println!("{}", yaml),
            Err(e) => print_error(&format!("Could not render report: {}", e)),
        },
        OutputFormat::Plain => {
            for entry in &report.entries {
                let line = format!("{} {}", entry.outcome.label(), entry.name);
                match detail(entry) {
                    d if d.is_empty() => println!("{}", line),
                    d => println!("{} - {}", line, d),
                }
            }
            print_summary(report);
        }
    }
}

fn print_summary(report: &SuiteReport) {
    println!();
    println!(
        "{} passed, {} failed, {} skipped ({} total, {} ms)",
        report.passed().to_string().green(),
        report.failed().to_string().red(),
        report.skipped().to_string().yellow(),
        report.total(),
        report.duration_ms()
    );
    if let Some(reason) = &report.aborted {
        print_error(&format!("Suite aborted: {}", reason));
    } else if report.success() {
        print_success("All executed steps passed");
    } else {
        print_error("Suite failed");
    }
}

/// Print the steps a run would execute
pub fn print_plan(steps: &[PlannedStep], format: OutputFormat) {
    if steps.is_empty() {
        println!("No steps registered.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["#", "Id", "Name", "Group", "Depends on", "Reset"]);
            for step in steps {
                table.add_row(vec![
                    step.priority.to_string(),
                    step.id.clone(),
                    step.name.clone(),
                    step.group.clone(),
                    step.depends_on.join(", "),
                    if step.baseline { "yes" } else { "" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(steps).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(steps).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for step in steps {
                println!("{:>3} {} ({})", step.priority, step.id, step.name);
            }
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
