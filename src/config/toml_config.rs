use crate::core::bench::BenchSettings;
use crate::core::flags::DEFAULT_FLAG_KEYS;
use crate::core::scrape::{StartupPattern, DEFAULT_READY_PATTERN};
use crate::core::supervisor::{LaunchSpec, DEFAULT_JAR};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub server: ServerConfig,
    pub flags: FlagsConfig,
    pub run: RunConfig,
    pub report: ReportConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub java: String,
    pub jvm_args: Vec<String>,
    pub jar: String,
    pub extra_args: Vec<String>,
    pub working_dir: String,
    pub config_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jvm_args: Vec::new(),
            jar: DEFAULT_JAR.to_string(),
            extra_args: vec!["--nogui".to_string()],
            working_dir: ".".to_string(),
            config_file: "metal.yml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    pub keys: Vec<String>,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            keys: DEFAULT_FLAG_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub runs: usize,
    pub startup_timeout_seconds: u64,
    pub shutdown_grace_seconds: u64,
    pub stop_command: String,
    pub ready_pattern: String,
    pub keep_config: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            runs: 1,
            startup_timeout_seconds: 120,
            shutdown_grace_seconds: 60,
            stop_command: "stop".to_string(),
            ready_pattern: DEFAULT_READY_PATTERN.to_string(),
            keep_config: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub baseline_label: String,
    pub optimized_label: String,
    pub json_out: Option<String>,
    pub csv_out: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            baseline_label: "Paper (Simulated)".to_string(),
            optimized_label: "MetalMC".to_string(),
            json_out: None,
            csv_out: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl BenchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SERVER_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    #[cfg(feature = "cli")]
    pub fn apply_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(dir) = &cli.working_dir {
            self.server.working_dir = dir.clone();
        }
        if let Some(jar) = &cli.jar {
            self.server.jar = jar.clone();
        }
        if let Some(java) = &cli.java {
            self.server.java = java.clone();
        }
        if let Some(config_file) = &cli.config_file {
            self.server.config_file = config_file.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.run.startup_timeout_seconds = timeout;
        }
        if let Some(runs) = cli.runs {
            self.run.runs = runs;
        }
        if cli.keep_config {
            self.run.keep_config = true;
        }
        if let Some(path) = &cli.json_out {
            self.report.json_out = Some(path.clone());
        }
        if let Some(path) = &cli.csv_out {
            self.report.csv_out = Some(path.clone());
        }
        if cli.monitor {
            self.monitoring.enabled = true;
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.java", &self.server.java)?;
        validation::validate_path("server.jar", &self.server.jar)?;
        validation::validate_path("server.working_dir", &self.server.working_dir)?;
        validation::validate_path("server.config_file", &self.server.config_file)?;
        validation::validate_non_empty_list("flags.keys", &self.flags.keys)?;
        validation::validate_positive_number("run.runs", self.run.runs, 1)?;
        validation::validate_range(
            "run.startup_timeout_seconds",
            self.run.startup_timeout_seconds,
            1,
            3600,
        )?;
        validation::validate_range(
            "run.shutdown_grace_seconds",
            self.run.shutdown_grace_seconds,
            1,
            600,
        )?;
        validation::validate_non_empty_string("run.stop_command", &self.run.stop_command)?;
        StartupPattern::new(&self.run.ready_pattern)?;

        if let Some(path) = &self.report.json_out {
            validation::validate_path("report.json_out", path)?;
        }
        if let Some(path) = &self.report.csv_out {
            validation::validate_path("report.csv_out", path)?;
        }

        Ok(())
    }

    /// Server config file, resolved against the working directory.
    pub fn config_path(&self) -> PathBuf {
        Path::new(&self.server.working_dir).join(&self.server.config_file)
    }

    pub fn launch_spec(&self) -> LaunchSpec {
        let mut args = self.server.jvm_args.clone();
        args.push("-jar".to_string());
        args.push(self.server.jar.clone());
        args.extend(self.server.extra_args.iter().cloned());

        LaunchSpec {
            program: self.server.java.clone(),
            args,
            working_dir: PathBuf::from(&self.server.working_dir),
            stop_command: self.run.stop_command.clone(),
            startup_timeout: Duration::from_secs(self.run.startup_timeout_seconds),
            shutdown_grace: Duration::from_secs(self.run.shutdown_grace_seconds),
        }
    }

    pub fn startup_pattern(&self) -> Result<StartupPattern> {
        StartupPattern::new(&self.run.ready_pattern)
    }

    pub fn bench_settings(&self) -> BenchSettings {
        BenchSettings {
            flag_keys: self.flags.keys.clone(),
            runs: self.run.runs,
            keep_config: self.run.keep_config,
            baseline_label: self.report.baseline_label.clone(),
            optimized_label: self.report.optimized_label.clone(),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for BenchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
