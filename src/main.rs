use clap::Parser;
use metal_bench::core::flags::set_flags;
use metal_bench::core::{report, FlagStore};
use metal_bench::utils::{logger, validation::Validate};
use metal_bench::{BenchConfig, BenchEngine, BenchError, CliConfig, LocalFlagFile, ServerRunner};
use std::path::Path;

fn fail(e: &BenchError) -> ! {
    tracing::error!(
        "❌ Benchmark failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting metal-bench");
    tracing::debug!("CLI config: {:?}", cli);

    // 載入 TOML 配置
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match BenchConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => BenchConfig::default(),
    };

    // 應用命令列覆蓋設定
    config.apply_overrides(&cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the server will not be started");
        perform_dry_run(&config).await;
        return Ok(());
    }

    let pattern = match config.startup_pattern() {
        Ok(pattern) => pattern,
        Err(e) => fail(&e),
    };
    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 Server process monitoring enabled");
    }

    let store = LocalFlagFile::new(config.config_path());
    let runner = ServerRunner::new(config.launch_spec(), pattern).with_monitoring(monitor_enabled);
    let engine = BenchEngine::new(store, runner, config.bench_settings());

    let bench_report = match engine.run().await {
        Ok(bench_report) => bench_report,
        Err(e) => fail(&e),
    };

    report::print_summary(&bench_report);

    if let Some(path) = &config.report.json_out {
        if let Err(e) = report::write_json(&bench_report, Path::new(path)) {
            fail(&e);
        }
        println!("📁 Report saved to: {}", path);
    }
    if let Some(path) = &config.report.csv_out {
        if let Err(e) = report::append_csv(&bench_report, Path::new(path)) {
            fail(&e);
        }
        println!("📁 Run history appended to: {}", path);
    }

    Ok(())
}

fn display_config_summary(config: &BenchConfig) {
    let spec = config.launch_spec();
    println!("📋 Configuration Summary:");
    println!("  Command: {}", spec.command_line());
    println!("  Working dir: {}", spec.working_dir.display());
    println!("  Config file: {}", config.config_path().display());
    println!("  Flags: {}", config.flags.keys.join(", "));
    println!("  Runs per mode: {}", config.run.runs);
    println!("  Startup timeout: {}s", config.run.startup_timeout_seconds);
    println!();
}

async fn perform_dry_run(config: &BenchConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    let store = LocalFlagFile::new(config.config_path());
    match store.read_config().await {
        Ok(content) => {
            println!("⚙️ Flag lines in {}:", store.path().display());
            match set_flags(&content, &config.flags.keys, false) {
                Ok(edit) => {
                    for (key, count) in &edit.matches {
                        let marker = if *count == 0 { "⚠️" } else { "✅" };
                        println!("  {} {}: {} line(s)", marker, key, count);
                    }
                }
                Err(e) => println!("  ❌ {}", e),
            }
        }
        Err(e) => println!("  ❌ Cannot read {}: {}", store.path().display(), e),
    }

    println!();
    println!("📡 Ready line pattern: {}", config.run.ready_pattern);
    println!("🛑 Stop command: {}", config.run.stop_command);
    if config.run.keep_config {
        println!("💾 Config will be left with optimizations ON");
    } else {
        println!("💾 Config will be restored after the runs");
    }

    println!();
    println!("✅ Dry run analysis complete.");
}
