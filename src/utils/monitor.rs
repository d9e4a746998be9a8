#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples CPU and resident memory of the server process while it boots.
#[cfg(feature = "cli")]
pub struct ProcessMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl ProcessMonitor {
    pub fn new(pid: Option<u32>, enabled: bool) -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
            pid: pid.map(Pid::from_u32),
            start_time: Instant::now(),
            peak_memory: Arc::new(Mutex::new(0)),
            enabled,
        }
    }

    pub fn sample(&self) -> Option<ProcessStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        // 更新峰值記憶體
        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(ProcessStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::debug!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    /// Peak resident memory seen so far, `None` when monitoring is off.
    pub fn peak_memory_mb(&self) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        self.peak_memory.lock().ok().map(|peak| *peak)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
pub struct ProcessMonitor;

#[cfg(not(feature = "cli"))]
impl ProcessMonitor {
    pub fn new(_pid: Option<u32>, _enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn peak_memory_mb(&self) -> Option<u64> {
        None
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = ProcessMonitor::new(Some(std::process::id()), false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample().is_none());
        assert!(monitor.peak_memory_mb().is_none());
    }

    #[test]
    fn test_monitor_samples_own_process() {
        let monitor = ProcessMonitor::new(Some(std::process::id()), true);
        let stats = monitor.sample().expect("own process should be visible");
        assert_eq!(monitor.peak_memory_mb(), Some(stats.peak_memory_mb));
    }

    #[test]
    fn test_monitor_without_pid() {
        let monitor = ProcessMonitor::new(None, true);
        assert!(monitor.sample().is_none());
        assert_eq!(monitor.peak_memory_mb(), Some(0));
    }
}
