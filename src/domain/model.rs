use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the comparison a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Optimization flags OFF (stand-in for upstream Paper).
    Baseline,
    /// Optimization flags ON.
    Optimized,
}

impl Mode {
    pub fn flags_enabled(self) -> bool {
        matches!(self, Mode::Optimized)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Baseline => write!(f, "Vanilla/Paper (Optimizations OFF)"),
            Mode::Optimized => write!(f, "MetalMC (Optimizations ON)"),
        }
    }
}

/// Seconds the server reports in its own "Done (..s)!" line.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StartupTime(f64);

impl StartupTime {
    pub fn from_secs(secs: f64) -> Option<Self> {
        (secs.is_finite() && secs >= 0.0).then_some(Self(secs))
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl fmt::Display for StartupTime {
    /// Whole seconds keep one decimal place, so `Done (3s)!` prints as `3.0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RunStatus {
    Ready,
    TimedOut,
    Exited,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub mode: Mode,
    pub startup_time: Option<StartupTime>,
    pub status: RunStatus,
    pub wall_clock_ms: u64,
    pub peak_memory_mb: Option<u64>,
}

impl RunOutcome {
    pub fn failed(mode: Mode, reason: impl Into<String>) -> Self {
        Self {
            mode,
            startup_time: None,
            status: RunStatus::Failed(reason.into()),
            wall_clock_ms: 0,
            peak_memory_mb: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline_label: String,
    pub optimized_label: String,
    pub baseline: Option<StartupTime>,
    pub optimized: Option<StartupTime>,
}

impl Comparison {
    /// Positive when the optimized build starts faster.
    pub fn difference(&self) -> Option<f64> {
        match (self.baseline, self.optimized) {
            (Some(baseline), Some(optimized)) => Some(baseline.as_secs() - optimized.as_secs()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub generated_at: DateTime<Utc>,
    pub config_file: String,
    pub runs: Vec<RunOutcome>,
    pub comparison: Comparison,
}

/// Numbers plotted by `bench-graph`. The first `bar_count` entries get bars,
/// every entry gets a point on the tick-time line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub startup_times: Vec<f64>,
    pub tick_times_ms: Vec<f64>,
    pub bar_count: usize,
    pub target_tick_ms: f64,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            title: "MetalMC vs Paper: Performance Profile".to_string(),
            labels: vec![
                "Paper (Simulated)".to_string(),
                "MetalMC".to_string(),
                "MetalMC (Optimized)".to_string(),
            ],
            startup_times: vec![12.236, 14.676, 14.676],
            // Estimated tick times under heavy load, not measured yet.
            tick_times_ms: vec![50.0, 42.0, 35.0],
            bar_count: 2,
            target_tick_ms: 50.0,
        }
    }
}
