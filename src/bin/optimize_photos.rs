use anyhow::{Context, Result};
use mosaic_folio::config::Config;
use mosaic_folio::photo_optimizer::{optimize_directory, OptimizeOptions};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.photo_path).join("dance1"));
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.photo_path).join("dance1-optimized"));

    let options = OptimizeOptions::from(&config.optimize);
    let report = optimize_directory(&input, &output, &options)
        .with_context(|| format!("Failed to optimize photos in {}", input.display()))?;

    println!(
        "Optimized {} photos ({} failed) into {}",
        report.processed,
        report.failed,
        output.display()
    );
    println!(
        "Replace {} with {} for production",
        input.display(),
        output.display()
    );

    Ok(())
}
