use clap::Parser;
use metal_bench::core::{chart, report};
use metal_bench::domain::model::ChartData;
use metal_bench::utils::logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bench-graph")]
#[command(about = "Render the startup / tick time comparison chart")]
struct Args {
    /// Output image; a .svg extension writes SVG, anything else PNG
    #[arg(short, long, default_value = "benchmark_comparison.png")]
    output: PathBuf,

    /// JSON report written by `metal-bench --json-out`; built-in numbers when omitted
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let data = match &args.report {
        Some(path) => {
            tracing::info!("📁 Loading report from: {}", path.display());
            report::read_json(path).and_then(|r| ChartData::from_report(&r))
        }
        None => Ok(ChartData::default()),
    };

    let result = data.and_then(|mut data| {
        if let Some(title) = &args.title {
            data.title = title.clone();
        }
        chart::render(&data, &args.output)
    });

    match result {
        Ok(()) => println!("Graph generated: {}", args.output.display()),
        Err(e) => {
            tracing::error!("❌ Chart generation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
