//! Generate → scale → cluster → label, in one call

use crate::config::PipelineConfig;
use crate::data::{feature_matrix, generate_records, EngagementRecord, N_FEATURES};
use crate::error::{Error, Result};
use crate::insights::{analyze_clusters, ClusterInsight};
use crate::model::{fit_kmeans, KMeansModel};
use crate::scaler::{fit_scaler, ScalerParams};
use crate::segment::label_segments;
use crate::table::{enrich_records, SegmentedRecord};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The enriched table
    pub rows: Vec<SegmentedRecord>,
    /// Fitted scaler, reusable for new rows
    pub scaler: ScalerParams,
    /// Fitted k-means model
    pub model: KMeansModel,
    /// The configuration the run used
    pub config: PipelineConfig,
}

/// Cluster and segment predicted for a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPrediction {
    pub cluster: usize,
    pub segment: String,
}

impl PipelineOutput {
    /// Per-cluster insights for the enriched table
    pub fn insights(&self) -> Vec<ClusterInsight> {
        analyze_clusters(&self.rows)
    }

    /// Scale raw metric values with the fitted scaler and predict their segment
    pub fn predict_segment(&self, raw: &[f64; N_FEATURES]) -> Result<SegmentPrediction> {
        let scaled = self.scaler.transform_row(ArrayView1::from(&raw[..]))?;
        let cluster = self.model.predict(scaled.view())?;
        let segment = self
            .config
            .segment_map
            .get(cluster)
            .ok_or(Error::UnmappedCluster { cluster })?
            .to_string();
        Ok(SegmentPrediction { cluster, segment })
    }
}

/// Run the full pipeline on freshly generated data
///
/// # Arguments
/// * `config` - Pipeline configuration; validated before any data is generated
///
/// # Returns
/// * `PipelineOutput` with the enriched table and the fitted scaler and model
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;

    let mut rng = match config.data_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let records = generate_records(config.n_users, &mut rng);
    log::info!("Generated {} engagement records", records.len());
    log::debug!("Generation took {:.3}s", start.elapsed().as_secs_f64());

    segment_records(records, config)
}

/// Run scale → cluster → label on caller-supplied records
pub fn segment_records(records: Vec<EngagementRecord>, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.segment_map.validate_domain(config.n_clusters)?;
    if records.is_empty() {
        return Err(Error::EmptyInput {
            what: "engagement records",
        });
    }

    let start = Instant::now();
    let features = feature_matrix(&records);
    let scaler = fit_scaler(features.view(), config.zero_variance)?;
    let scaled = scaler.transform(features.view())?;
    log::info!(
        "Scaled {} x {} feature matrix ({} degenerate columns)",
        scaled.nrows(),
        scaled.ncols(),
        scaler.degenerate_columns().len()
    );
    log::debug!("Scaling took {:.3}s", start.elapsed().as_secs_f64());

    let start = Instant::now();
    let model = fit_kmeans(scaled.view(), &config.cluster_params())?;
    log::info!(
        "Fitted k-means with {} clusters, inertia {:.2}",
        model.n_clusters(),
        model.inertia
    );
    log::debug!("Clustering took {:.3}s", start.elapsed().as_secs_f64());

    let labels = model.assignment.labels();
    let segments = label_segments(labels, &config.segment_map)?;
    let rows = enrich_records(records, labels, segments)?;

    Ok(PipelineOutput {
        rows,
        scaler,
        model,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentMap;

    fn small_config() -> PipelineConfig {
        PipelineConfig::default()
            .with_users(60)
            .with_clusters(3)
            .with_data_seed(Some(1))
            .with_segment_map(SegmentMap::from_names(["Low", "Mid", "High"]))
    }

    #[test]
    fn test_run_pipeline_enriches_every_row() {
        let output = run_pipeline(&small_config()).unwrap();

        assert_eq!(output.rows.len(), 60);
        for row in &output.rows {
            assert!(row.cluster < 3);
            assert_eq!(Some(row.segment.as_str()), output.config.segment_map.get(row.cluster));
        }
        assert_eq!(output.insights().iter().map(|i| i.size).sum::<usize>(), 60);
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let config = small_config().with_clusters(4);
        let err = run_pipeline(&config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_segment_records_empty() {
        let err = segment_records(Vec::new(), &small_config()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput { .. }));
    }

    #[test]
    fn test_predict_segment_matches_training_row() {
        let output = run_pipeline(&small_config()).unwrap();
        let row = &output.rows[0];

        let prediction = output.predict_segment(&row.record.features()).unwrap();
        assert_eq!(prediction.cluster, row.cluster);
        assert_eq!(prediction.segment, row.segment);
    }
}
