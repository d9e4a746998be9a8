use crate::domain::model::{BenchReport, Comparison, Mode, RunStatus, StartupTime};
use crate::utils::error::Result;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::Path;

fn format_time(time: Option<StartupTime>) -> String {
    match time {
        Some(time) => format!("{}s", time),
        None => "None".to_string(),
    }
}

impl Comparison {
    /// The console summary printed after both modes have run.
    pub fn summary_lines(&self) -> Vec<String> {
        let width = self.baseline_label.len().max(self.optimized_label.len());
        let mut lines = vec![
            format!(
                "{:<width$}: {}",
                self.baseline_label,
                format_time(self.baseline),
                width = width
            ),
            format!(
                "{:<width$}: {}",
                self.optimized_label,
                format_time(self.optimized),
                width = width
            ),
        ];

        if let Some(diff) = self.difference() {
            if diff > 0.0 {
                lines.push(format!(
                    "{} is {:.2}s FASTER at startup.",
                    self.optimized_label, diff
                ));
            } else {
                lines.push(format!(
                    "{} is {:.2}s slower at startup (expected if init overhead > runtime savings at boot).",
                    self.optimized_label,
                    diff.abs()
                ));
            }
        }

        lines
    }
}

pub fn print_summary(report: &BenchReport) {
    println!("\n--- Results ---");
    for line in report.comparison.summary_lines() {
        println!("{}", line);
    }
}

pub fn write_json(report: &BenchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    tracing::info!("📁 Report saved to: {}", path.display());
    Ok(())
}

pub fn read_json(path: &Path) -> Result<BenchReport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    generated_at: String,
    config_file: &'a str,
    mode: &'a str,
    status: &'a str,
    startup_time_s: Option<f64>,
    wall_clock_ms: u64,
    peak_memory_mb: Option<u64>,
}

/// Appends one row per run; the header is only written into a new, empty file.
pub fn append_csv(report: &BenchReport, path: &Path) -> Result<()> {
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);

    let generated_at = report.generated_at.to_rfc3339();
    for run in &report.runs {
        let status = match &run.status {
            RunStatus::Ready => "ready",
            RunStatus::TimedOut => "timed_out",
            RunStatus::Exited => "exited",
            RunStatus::Failed(_) => "failed",
        };
        let mode = match run.mode {
            Mode::Baseline => "baseline",
            Mode::Optimized => "optimized",
        };
        writer.serialize(CsvRow {
            generated_at: generated_at.clone(),
            config_file: &report.config_file,
            mode,
            status,
            startup_time_s: run.startup_time.map(StartupTime::as_secs),
            wall_clock_ms: run.wall_clock_ms,
            peak_memory_mb: run.peak_memory_mb,
        })?;
    }
    writer.flush()?;

    tracing::info!("📁 Appended {} run(s) to {}", report.runs.len(), path.display());
    Ok(())
}
