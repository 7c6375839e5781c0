//! EngageForge: community segmentation CLI using K-Means clustering
//!
//! This is the main entrypoint that orchestrates data generation, model
//! fitting, reporting, and prediction.

use anyhow::{Context, Result};
use clap::Parser;
use engageforge::viz::{self, ReportOptions};
use engageforge::{run_pipeline, write_csv, Args, Metric, PipelineOutput, N_FEATURES};
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let predict_values = args.parse_predict_values()?;

    let config = args.pipeline_config();
    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let output = run_pipeline(&config)?;
    log::debug!("Pipeline finished in {:.2}s", start_time.elapsed().as_secs_f64());

    match predict_values {
        Some(values) => run_prediction_mode(&output, &values),
        None => run_full_report(&args, &output),
    }
}

/// Predict the segment of a single user
fn run_prediction_mode(output: &PipelineOutput, values: &[f64; N_FEATURES]) -> Result<()> {
    println!("=== Prediction Mode ===");
    for (metric, value) in Metric::ALL.iter().zip(values) {
        println!("  {}: {}", metric, value);
    }

    let prediction = output.predict_segment(values)?;

    println!("\n✓ Predicted Cluster: {}", prediction.cluster);
    println!("  Segment: {}", prediction.segment);

    let cluster_sizes = output.model.cluster_sizes();
    let total_users = output.rows.len();
    let size = cluster_sizes[prediction.cluster];
    println!(
        "  Size: {} users ({:.1}% of total)",
        size,
        (size as f64 / total_users as f64) * 100.0
    );

    Ok(())
}

/// Print statistics, write charts and optionally export the table
fn run_full_report(args: &Args, output: &PipelineOutput) -> Result<()> {
    println!("=== Community Engagement Segmentation ===");
    println!("✓ {} users clustered into {} segments", output.rows.len(), output.model.n_clusters());

    let options = ReportOptions {
        segments: args.segments.clone(),
        x_axis: args.x_axis,
        y_axis: args.y_axis,
    };
    let files = viz::generate_report(output, &options, Path::new(&args.output))
        .context("failed to render report")?;

    println!("\n✓ Charts written");
    println!("  {}", files.bar_chart.display());
    println!("  {}", files.scatter_plot.display());
    println!("  {}", files.heatmap.display());

    if let Some(csv_path) = &args.csv {
        write_csv(&output.rows, csv_path).with_context(|| format!("failed to write {}", csv_path))?;
        println!("  {}", csv_path);
    }

    Ok(())
}
