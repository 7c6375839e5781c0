//! EngageForge: community engagement segmentation using K-Means clustering
//!
//! Synthetic per-user engagement counters are standardized, partitioned with
//! K-Means and mapped to business segment names. The enriched table can be
//! exported as a polars DataFrame and summarized as SVG charts.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod insights;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod segment;
pub mod table;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::PipelineConfig;
pub use data::{feature_matrix, generate_records, EngagementRecord, Metric, N_FEATURES};
pub use error::{Error, Result};
pub use insights::{analyze_clusters, ClusterInsight};
pub use model::{fit_kmeans, ClusterAssignment, ClusterParams, KMeansModel};
pub use pipeline::{run_pipeline, segment_records, PipelineOutput, SegmentPrediction};
pub use scaler::{fit_scaler, ScalerParams, ZeroVariancePolicy};
pub use segment::{label_segments, SegmentMap};
pub use table::{to_dataframe, write_csv, SegmentedRecord};
