// src/bin/analyze.rs

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use forum::analysis::{Analysis, aggregate, load_results};

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

/// Summarize listening test results per template, model and metric
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing result JSON files
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Output format: plain or json
    #[arg(short, long, default_value = "plain")]
    format: OutputFormat,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (records, problems) = load_results(&args.results_dir)?;
    for problem in &problems {
        eprintln!("{}", problem);
    }
    eprintln!("Loaded {} result file(s)", records.len());

    let analysis = aggregate(&records);
    match args.format {
        OutputFormat::Plain => print_plain(&analysis),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }

    Ok(())
}

fn print_plain(analysis: &Analysis) {
    println!("=== Listening Test Results ===");
    println!("Participants: {}", analysis.participants);
    println!();

    println!("{:<20} {:>10} {:>10}", "Template", "Presented", "Answered");
    println!("{}", "-".repeat(42));
    for (template_id, summary) in &analysis.templates {
        println!(
            "{:<20} {:>10} {:>10}",
            template_id, summary.presented, summary.answered
        );
    }
    println!();

    if analysis.metrics.is_empty() {
        println!("No ratings available.");
        return;
    }

    println!(
        "{:<12} {:<12} {:<16} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Template", "Model", "Metric", "N", "Mean", "Median", "Std", "Min", "Max"
    );
    println!("{}", "-".repeat(86));
    for m in &analysis.metrics {
        println!(
            "{:<12} {:<12} {:<16} {:>6} {:>6.2} {:>6.2} {:>6.2} {:>6.2} {:>6.2}",
            m.template_id,
            m.model,
            m.metric,
            m.stats.count,
            m.stats.mean,
            m.stats.median,
            m.stats.std_dev,
            m.stats.min,
            m.stats.max
        );
    }
}
