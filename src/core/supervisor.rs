use crate::core::scrape::StartupPattern;
use crate::core::Runner;
use crate::domain::model::{Mode, RunOutcome, RunStatus, StartupTime};
use crate::utils::error::{BenchError, Result};
use crate::utils::monitor::ProcessMonitor;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::time::{timeout, timeout_at, Instant};

pub const DEFAULT_JAR: &str = "paper-paperclip-1.21.10-R0.1-SNAPSHOT-mojmap.jar";
const MONITOR_INTERVAL: Duration = Duration::from_millis(500);

/// How to start the server and how long to wait for it.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub stop_command: String,
    pub startup_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for LaunchSpec {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec!["-jar".to_string(), DEFAULT_JAR.to_string(), "--nogui".to_string()],
            working_dir: PathBuf::from("."),
            stop_command: "stop".to_string(),
            startup_timeout: Duration::from_secs(120),
            shutdown_grace: Duration::from_secs(60),
        }
    }
}

impl LaunchSpec {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchResult {
    Ready(StartupTime),
    TimedOut,
    /// Every output stream reached EOF before a ready line showed up.
    Closed,
}

type LineResult = io::Result<String>;

/// Pushes every line of `reader` into `tx`.
///
/// Once the receiver is gone the remaining output is still read (and echoed at
/// trace level) so the server never stalls on a full pipe while shutting down.
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<LineResult>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut receiver_alive = true;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if receiver_alive {
                    if let Err(mpsc::error::SendError(Ok(line))) = tx.send(Ok(line)).await {
                        receiver_alive = false;
                        tracing::trace!(target: "metal_bench::server", "{}", line);
                    }
                } else {
                    tracing::trace!(target: "metal_bench::server", "{}", line);
                }
            }
            Err(e) => {
                if receiver_alive {
                    let _ = tx.send(Err(e)).await;
                }
                break;
            }
        }
    }
}

/// Reads lines until one matches `pattern`, the streams close, or `limit` passes.
pub async fn watch_lines(
    rx: &mut mpsc::Receiver<LineResult>,
    pattern: &StartupPattern,
    limit: Duration,
) -> io::Result<WatchResult> {
    let deadline = Instant::now() + limit;

    loop {
        match timeout_at(deadline, rx.recv()).await {
            Err(_) => return Ok(WatchResult::TimedOut),
            Ok(None) => return Ok(WatchResult::Closed),
            Ok(Some(Err(e))) => return Err(e),
            Ok(Some(Ok(line))) => {
                tracing::trace!(target: "metal_bench::server", "{}", line);
                if let Some(time) = pattern.extract(&line) {
                    return Ok(WatchResult::Ready(time));
                }
            }
        }
    }
}

async fn send_command(stdin: &mut ChildStdin, command: &str) -> io::Result<()> {
    stdin.write_all(format!("{}\n", command).as_bytes()).await?;
    stdin.flush().await
}

/// Runs the real server process.
pub struct ServerRunner {
    spec: LaunchSpec,
    pattern: StartupPattern,
    monitor: bool,
}

impl ServerRunner {
    pub fn new(spec: LaunchSpec, pattern: StartupPattern) -> Self {
        Self {
            spec,
            pattern,
            monitor: false,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled;
        self
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.spec.program)
            .args(&self.spec.args)
            .current_dir(&self.spec.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BenchError::LaunchError {
                program: self.spec.program.clone(),
                source,
            })
    }

    async fn shutdown(&self, child: &mut Child, stdin: &mut Option<ChildStdin>, stop_sent: bool) {
        if !stop_sent {
            if let Some(stdin) = stdin.as_mut() {
                if let Err(e) = send_command(stdin, &self.spec.stop_command).await {
                    tracing::debug!("Could not send '{}' to server: {}", self.spec.stop_command, e);
                }
            }
        }

        match timeout(self.spec.shutdown_grace, child.wait()).await {
            Ok(Ok(status)) => tracing::debug!("Server exited with {}", status),
            Ok(Err(e)) => tracing::warn!("Failed to wait for server exit: {}", e),
            Err(_) => {
                tracing::warn!(
                    "⏱️ Server still running {:?} after stop request, killing it",
                    self.spec.shutdown_grace
                );
                if let Err(e) = child.kill().await {
                    tracing::error!("❌ Failed to kill server process: {}", e);
                }
            }
        }
        stdin.take();
    }
}

#[async_trait]
impl Runner for ServerRunner {
    async fn run(&self, mode: Mode) -> Result<RunOutcome> {
        tracing::debug!(
            "Launching `{}` in {}",
            self.spec.command_line(),
            self.spec.working_dir.display()
        );

        let started = Instant::now();
        let mut child = self.spawn()?;

        let monitor = Arc::new(ProcessMonitor::new(child.id(), self.monitor));
        let sampler = monitor.is_enabled().then(|| {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(MONITOR_INTERVAL);
                loop {
                    ticker.tick().await;
                    monitor.log_stats("server startup");
                }
            })
        });

        // stdout 與 stderr 合併成同一個行串流
        let (tx, mut rx) = mpsc::channel(256);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);
        let mut stdin = child.stdin.take();

        let watched = watch_lines(&mut rx, &self.pattern, self.spec.startup_timeout).await;
        drop(rx);
        let wall_clock = started.elapsed();

        let mut stop_sent = false;
        let (startup_time, status) = match watched {
            Ok(WatchResult::Ready(time)) => {
                println!("Startup detected: {}s", time);
                tracing::info!("✅ Startup detected: {}s (wall clock {:?})", time, wall_clock);
                if let Some(stdin) = stdin.as_mut() {
                    match send_command(stdin, &self.spec.stop_command).await {
                        Ok(()) => stop_sent = true,
                        Err(e) => tracing::error!("❌ Error: failed to send stop command: {}", e),
                    }
                }
                (Some(time), RunStatus::Ready)
            }
            Ok(WatchResult::TimedOut) => {
                println!("Timeout waiting for startup.");
                tracing::warn!(
                    "⏱️ No startup line within {:?}",
                    self.spec.startup_timeout
                );
                (None, RunStatus::TimedOut)
            }
            Ok(WatchResult::Closed) => {
                tracing::warn!("⚠️ Server output ended before startup completed");
                (None, RunStatus::Exited)
            }
            Err(e) => {
                tracing::error!("❌ Error: {}", e);
                (None, RunStatus::Failed(e.to_string()))
            }
        };

        self.shutdown(&mut child, &mut stdin, stop_sent).await;

        if let Some(sampler) = sampler {
            sampler.abort();
        }
        monitor.log_stats("server stopped");

        Ok(RunOutcome {
            mode,
            startup_time,
            status,
            wall_clock_ms: wall_clock.as_millis() as u64,
            peak_memory_mb: monitor.peak_memory_mb(),
        })
    }
}
