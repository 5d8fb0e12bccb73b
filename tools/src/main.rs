//! riskmetric-gen: headless bronze-layer generator.
//!
//! Usage:
//!   riskmetric-gen --seed 42 --out-dir ./data
//!   riskmetric-gen --config data/generator.json --parallel
//!   riskmetric-gen --users 100 --txns 1000 --out-dir /tmp/small

use anyhow::Result;
use riskmetric_core::{
    config::GeneratorConfig,
    engine::Pipeline,
    export,
    summary::RunSummary,
};
use std::env;
use std::path::Path;
use std::time::Instant;

/// Written next to the artifacts so a dataset can be regenerated.
#[derive(serde::Serialize)]
struct RunManifest<'a> {
    version:      &'static str,
    generated_at: String,
    parallel:     bool,
    config:       &'a GeneratorConfig,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let parallel = args.iter().any(|a| a == "--parallel");
    let out_dir = find_arg(&args, "--out-dir").unwrap_or("./data");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.population.size = parse_arg(&args, "--users", config.population.size);
    config.legitimate.count = parse_arg(&args, "--txns", config.legitimate.count);

    println!("RiskMetric — bronze layer generator");
    println!("  seed:       {}", config.seed);
    println!("  users:      {}", config.population.size);
    println!("  legit txns: {}", config.legitimate.count);
    println!("  out_dir:    {out_dir}");
    println!("  parallel:   {parallel}");
    println!();

    let started = Instant::now();
    let pipeline = Pipeline::build(config)?;
    let dataset = if parallel {
        pipeline.run_parallel()?
    } else {
        pipeline.run()?
    };

    let paths = export::write_dataset(&dataset, Path::new(out_dir))?;
    let manifest = RunManifest {
        version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        parallel,
        config: pipeline.config(),
    };
    let manifest_path = Path::new(out_dir).join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    log::info!("manifest -> {}", manifest_path.display());

    print_summary(&RunSummary::from_dataset(&dataset));
    println!("  transactions: {}", paths.transactions.display());
    println!("  profiles:     {}", paths.profiles.display());
    println!("  elapsed:      {:.1}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn print_summary(s: &RunSummary) {
    println!("=== GENERATION SUMMARY ===");
    println!("  total transactions: {}", s.total);
    println!("  legitimate:         {}", s.legitimate);
    println!("  impossible travel:  {}", s.impossible_travel);
    println!("  velocity spikes:    {}", s.velocity_spike);
    println!("  behavioral drift:   {}", s.behavioral_drift);
    println!("  fraud rate:         {:.2}%", s.fraud_rate * 100.0);
    match (s.first_timestamp, s.last_timestamp) {
        (Some(first), Some(last)) => println!(
            "  date range:         {} -> {}",
            first.format("%Y-%m-%d %H:%M:%S"),
            last.format("%Y-%m-%d %H:%M:%S")
        ),
        _ => println!("  date range:         (empty)"),
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
