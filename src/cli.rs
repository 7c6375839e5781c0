//! Command-line interface definitions and argument parsing

use crate::config::PipelineConfig;
use crate::data::{Metric, N_FEATURES};
use crate::model::DEFAULT_CLUSTER_SEED;
use crate::scaler::ZeroVariancePolicy;
use crate::segment::SegmentMap;
use clap::Parser;

/// Community engagement segmentation using K-Means clustering
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of synthetic users to generate
    #[arg(short = 'n', long, default_value = "1000")]
    pub users: usize,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "5")]
    pub clusters: usize,

    /// Seed for K-Means initialization
    #[arg(short, long, default_value_t = DEFAULT_CLUSTER_SEED)]
    pub seed: u64,

    /// Seed for the data generator (random if omitted)
    #[arg(long)]
    pub data_seed: Option<u64>,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Number of K-Means restarts; the lowest-inertia run is kept
    #[arg(long, default_value = "10")]
    pub n_runs: usize,

    /// Handling of zero-variance feature columns
    #[arg(long, value_enum, default_value_t = ZeroVariancePolicy::ZeroFill)]
    pub zero_variance: ZeroVariancePolicy,

    /// Segment names for clusters 0..k, comma-separated (defaults to the five community segments)
    #[arg(long, value_delimiter = ',')]
    pub segment_names: Option<Vec<String>>,

    /// Only show these segments in the report, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub segments: Option<Vec<String>>,

    /// X-axis metric for the scatter plot
    #[arg(long, value_enum, default_value_t = Metric::DiscordMessages)]
    pub x_axis: Metric,

    /// Y-axis metric for the scatter plot
    #[arg(long, value_enum, default_value_t = Metric::WebinarAttendance)]
    pub y_axis: Metric,

    /// Directory for the SVG charts
    #[arg(short, long, default_value = "report")]
    pub output: String,

    /// Also export the segmented table to this CSV file
    #[arg(long)]
    pub csv: Option<String>,

    /// Prediction mode: seven comma-separated values in column order
    /// Example: --predict "10,120,3,1,150,8,200"
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the pipeline configuration from the flags
    pub fn pipeline_config(&self) -> PipelineConfig {
        let segment_map = match &self.segment_names {
            Some(names) => SegmentMap::from_names(names.iter().map(|n| n.trim().to_string())),
            None => SegmentMap::community_default(),
        };

        PipelineConfig::default()
            .with_users(self.users)
            .with_clusters(self.clusters)
            .with_cluster_seed(self.seed)
            .with_data_seed(self.data_seed)
            .with_max_iterations(self.max_iters)
            .with_tolerance(self.tolerance)
            .with_n_runs(self.n_runs)
            .with_zero_variance(self.zero_variance)
            .with_segment_map(segment_map)
    }

    /// Parse the seven metric values from the predict string
    pub fn parse_predict_values(&self) -> crate::Result<Option<[f64; N_FEATURES]>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != N_FEATURES {
            return Err(crate::Error::invalid_config(format!(
                "predict values must be {} comma-separated numbers ({})",
                N_FEATURES,
                Metric::ALL.map(Metric::column_name).join(",")
            )));
        }

        let mut values = [0.0; N_FEATURES];
        for ((value, part), metric) in values.iter_mut().zip(&parts).zip(Metric::ALL) {
            *value = part.trim().parse().map_err(|_| {
                crate::Error::invalid_config(format!("invalid {} value: {}", metric, part))
            })?;
        }

        Ok(Some(values))
    }
}
