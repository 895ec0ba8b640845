//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use dotstrap_ops::OperationResult;
use dotstrap_types::{ColorChoice, OutputFormat, PlanReport, RunReport, StepStatus};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Output format
    format: OutputFormat,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(format: OutputFormat, color_choice: ColorChoice) -> Self {
        Self {
            format,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.render_json(result),
            OutputFormat::Plain => self.render_plain(result),
            OutputFormat::Tty => self.render_table(result),
        }
    }

    /// Render as tab separated lines, one per step
    fn render_plain(&self, result: &OperationResult) -> io::Result<()> {
        for line in plain_lines(result) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Plan(plan) => self.render_plan(plan),
            OperationResult::Run(report) => self.render_run_report(report),
        }
    }

    fn render_plan(&self, plan: &PlanReport) -> io::Result<()> {
        if let (Some(config), Some(workspace)) = (&plan.config, &plan.workspace) {
            let origin = if plan.defaulted { " (defaults)" } else { "" };
            println!("{}{origin}", self.bold("Initializer arguments"));
            println!("  config:    {config}");
            println!("  workspace: {workspace}");
            println!();
        }

        if plan.steps.is_empty() {
            println!("Nothing to do.");
            return Ok(());
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Action").add_attribute(Attribute::Bold),
        ]);
        for entry in &plan.steps {
            table.add_row(vec![
                Cell::new(entry.index),
                Cell::new(&entry.label),
                Cell::new(&entry.action),
            ]);
        }
        println!("{table}");
        Ok(())
    }

    fn render_run_report(&self, report: &RunReport) -> io::Result<()> {
        let mut table = self.table();
        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Detail").add_attribute(Attribute::Bold),
        ]);
        for step in &report.steps {
            table.add_row(vec![
                Cell::new(&step.label),
                self.format_status(step.status),
                Cell::new(format_duration(step.duration_ms)),
                Cell::new(step.detail.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");

        let icon = if report.is_success() { "[OK]" } else { "[WARN]" };
        println!(
            "{icon} {} in {} (run {})",
            self.bold("Bootstrap finished"),
            format_duration(report.duration_ms),
            report.run_id
        );
        Ok(())
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.supports_color() {
            table.force_no_tty();
        }
        table
    }

    /// Format step status as colored cell
    fn format_status(&self, status: StepStatus) -> Cell {
        let cell = Cell::new(status.to_string());
        if !self.supports_color() {
            return cell;
        }
        match status {
            StepStatus::Completed => cell.fg(Color::Green),
            StepStatus::Skipped => cell.fg(Color::Yellow),
            StepStatus::Failed => cell.fg(Color::Red),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn plain_lines(result: &OperationResult) -> Vec<String> {
    match result {
        OperationResult::Plan(plan) => {
            let mut lines = Vec::with_capacity(plan.steps.len() + 2);
            if let (Some(config), Some(workspace)) = (&plan.config, &plan.workspace) {
                lines.push(format!("config\t{config}"));
                lines.push(format!("workspace\t{workspace}"));
            }
            lines.extend(
                plan.steps
                    .iter()
                    .map(|e| format!("{}\t{}\t{}", e.index, e.label, e.action)),
            );
            lines
        }
        OperationResult::Run(report) => report
            .steps
            .iter()
            .map(|s| {
                format!(
                    "{}\t{}\t{}\t{}",
                    s.label,
                    s.status,
                    s.duration_ms,
                    s.detail.as_deref().unwrap_or("-")
                )
            })
            .collect(),
    }
}

fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        #[allow(clippy::cast_precision_loss)]
        let secs = ms as f64 / 1000.0;
        format!("{secs:.1}s")
    } else {
        format!("{ms}ms")
    }
}
