use crate::core::flags::{apply_flags, DEFAULT_FLAG_KEYS};
use crate::core::{FlagStore, Runner};
use crate::domain::model::{BenchReport, Comparison, Mode, RunOutcome, StartupTime};
use crate::utils::error::Result;
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct BenchSettings {
    pub flag_keys: Vec<String>,
    pub runs: usize,
    pub keep_config: bool,
    pub baseline_label: String,
    pub optimized_label: String,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            flag_keys: DEFAULT_FLAG_KEYS.iter().map(|k| k.to_string()).collect(),
            runs: 1,
            keep_config: false,
            baseline_label: "Paper (Simulated)".to_string(),
            optimized_label: "MetalMC".to_string(),
        }
    }
}

/// Mean of the startup times the server reported for `mode`.
pub fn mean_startup(runs: &[RunOutcome], mode: Mode) -> Option<StartupTime> {
    let times: Vec<f64> = runs
        .iter()
        .filter(|run| run.mode == mode)
        .filter_map(|run| run.startup_time)
        .map(StartupTime::as_secs)
        .collect();

    if times.is_empty() {
        return None;
    }
    StartupTime::from_secs(times.iter().sum::<f64>() / times.len() as f64)
}

pub struct BenchEngine<S: FlagStore, R: Runner> {
    store: S,
    runner: R,
    settings: BenchSettings,
}

impl<S: FlagStore, R: Runner> BenchEngine<S, R> {
    pub fn new(store: S, runner: R, settings: BenchSettings) -> Self {
        Self {
            store,
            runner,
            settings,
        }
    }

    pub fn settings(&self) -> &BenchSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<BenchReport> {
        println!("--- Starting Benchmark ---");

        let original = self.store.read_config().await?;
        let result = self.run_modes().await;

        // 還原原始設定檔
        if !self.settings.keep_config {
            match self.store.write_config(&original).await {
                Ok(()) => tracing::debug!("Restored {}", self.store.describe()),
                Err(e) => tracing::error!("❌ Failed to restore {}: {}", self.store.describe(), e),
            }
        }

        let runs = result?;
        let comparison = Comparison {
            baseline_label: self.settings.baseline_label.clone(),
            optimized_label: self.settings.optimized_label.clone(),
            baseline: mean_startup(&runs, Mode::Baseline),
            optimized: mean_startup(&runs, Mode::Optimized),
        };

        Ok(BenchReport {
            generated_at: Utc::now(),
            config_file: self.store.describe(),
            runs,
            comparison,
        })
    }

    async fn run_modes(&self) -> Result<Vec<RunOutcome>> {
        let mut outcomes = Vec::with_capacity(self.settings.runs * 2);

        for mode in [Mode::Baseline, Mode::Optimized] {
            println!("\n[Mode: {}]", mode);
            let enabled = mode.flags_enabled();
            apply_flags(&self.store, &self.settings.flag_keys, enabled).await?;
            println!("Set optimizations to: {}", enabled);

            for attempt in 1..=self.settings.runs {
                tracing::info!("🚀 {} run {}/{}", mode, attempt, self.settings.runs);
                let outcome = match self.runner.run(mode).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!("❌ Error: {}", e);
                        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                        RunOutcome::failed(mode, e.to_string())
                    }
                };
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RunStatus;
    use crate::utils::error::BenchError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStore {
        content: Arc<Mutex<String>>,
    }

    impl FlagStore for MemoryStore {
        async fn read_config(&self) -> Result<String> {
            Ok(self.content.lock().unwrap().clone())
        }

        async fn write_config(&self, content: &str) -> Result<()> {
            *self.content.lock().unwrap() = content.to_string();
            Ok(())
        }

        fn describe(&self) -> String {
            "memory://metal.yml".to_string()
        }
    }

    /// Reports a faster startup whenever chunk ticking is switched on.
    struct FlagAwareRunner {
        store: MemoryStore,
        fail_baseline: bool,
    }

    #[async_trait]
    impl Runner for FlagAwareRunner {
        async fn run(&self, mode: Mode) -> Result<RunOutcome> {
            if self.fail_baseline && mode == Mode::Baseline {
                return Err(BenchError::LaunchError {
                    program: "java".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no java"),
                });
            }
            let content = self.store.content.lock().unwrap().clone();
            let secs = if content.contains("chunk-ticking: true") {
                12.0
            } else {
                16.0
            };
            Ok(RunOutcome {
                mode,
                startup_time: StartupTime::from_secs(secs),
                status: RunStatus::Ready,
                wall_clock_ms: (secs * 1000.0) as u64,
                peak_memory_mb: None,
            })
        }
    }

    const CONFIG: &str = "optimizations:\n  chunk-ticking: true\n  ai-throttling: true\n";

    fn store_with(content: &str) -> MemoryStore {
        MemoryStore {
            content: Arc::new(Mutex::new(content.to_string())),
        }
    }

    #[tokio::test]
    async fn test_bench_compares_modes_and_restores_config() {
        let store = store_with("optimizations:\n  chunk-ticking: false\n  ai-throttling: true\n");
        let runner = FlagAwareRunner {
            store: store.clone(),
            fail_baseline: false,
        };
        let settings = BenchSettings {
            runs: 2,
            ..BenchSettings::default()
        };
        let engine = BenchEngine::new(store.clone(), runner, settings);

        let report = engine.run().await.unwrap();

        assert_eq!(report.runs.len(), 4);
        assert_eq!(report.comparison.baseline.unwrap().as_secs(), 16.0);
        assert_eq!(report.comparison.optimized.unwrap().as_secs(), 12.0);
        assert_eq!(report.comparison.difference(), Some(4.0));
        assert_eq!(
            store.content.lock().unwrap().as_str(),
            "optimizations:\n  chunk-ticking: false\n  ai-throttling: true\n"
        );
    }

    #[tokio::test]
    async fn test_keep_config_leaves_flags_enabled() {
        let store = store_with("optimizations:\n  chunk-ticking: false\n  ai-throttling: false\n");
        let runner = FlagAwareRunner {
            store: store.clone(),
            fail_baseline: false,
        };
        let settings = BenchSettings {
            keep_config: true,
            ..BenchSettings::default()
        };
        let engine = BenchEngine::new(store.clone(), runner, settings);

        engine.run().await.unwrap();

        assert_eq!(store.content.lock().unwrap().as_str(), CONFIG);
    }

    #[tokio::test]
    async fn test_runner_error_becomes_missing_result() {
        let store = store_with(CONFIG);
        let runner = FlagAwareRunner {
            store: store.clone(),
            fail_baseline: true,
        };
        let engine = BenchEngine::new(store, runner, BenchSettings::default());

        let report = engine.run().await.unwrap();

        assert_eq!(report.runs.len(), 2);
        assert!(matches!(report.runs[0].status, RunStatus::Failed(_)));
        assert!(report.comparison.baseline.is_none());
        assert_eq!(report.comparison.optimized.unwrap().as_secs(), 12.0);
        assert_eq!(report.comparison.difference(), None);
    }

    #[test]
    fn test_mean_startup_skips_missing() {
        let runs = vec![
            RunOutcome {
                mode: Mode::Optimized,
                startup_time: StartupTime::from_secs(10.0),
                status: RunStatus::Ready,
                wall_clock_ms: 10_500,
                peak_memory_mb: Some(900),
            },
            RunOutcome::failed(Mode::Optimized, "timeout"),
            RunOutcome {
                mode: Mode::Optimized,
                startup_time: StartupTime::from_secs(14.0),
                status: RunStatus::Ready,
                wall_clock_ms: 14_200,
                peak_memory_mb: Some(950),
            },
        ];
        assert_eq!(mean_startup(&runs, Mode::Optimized).unwrap().as_secs(), 12.0);
        assert!(mean_startup(&runs, Mode::Baseline).is_none());
    }
}
