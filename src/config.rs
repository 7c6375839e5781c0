//! Pipeline configuration, validated once before any work is done

use crate::error::{Error, Result};
use crate::model::{ClusterParams, DEFAULT_CLUSTER_SEED};
use crate::scaler::ZeroVariancePolicy;
use crate::segment::SegmentMap;

/// Everything a pipeline run depends on
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Number of synthetic users to generate
    pub n_users: usize,
    /// Number of k-means clusters; must equal the segment map size
    pub n_clusters: usize,
    /// Seed for k-means initialization
    pub cluster_seed: u64,
    /// Seed for the data generator; `None` draws from OS entropy
    pub data_seed: Option<u64>,
    pub max_iterations: u64,
    pub tolerance: f64,
    pub n_runs: usize,
    pub zero_variance: ZeroVariancePolicy,
    pub segment_map: SegmentMap,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_users: 1000,
            n_clusters: 5,
            cluster_seed: DEFAULT_CLUSTER_SEED,
            data_seed: None,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
            zero_variance: ZeroVariancePolicy::ZeroFill,
            segment_map: SegmentMap::community_default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_users(mut self, n_users: usize) -> Self {
        self.n_users = n_users;
        self
    }

    pub fn with_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_cluster_seed(mut self, seed: u64) -> Self {
        self.cluster_seed = seed;
        self
    }

    pub fn with_data_seed(mut self, seed: Option<u64>) -> Self {
        self.data_seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_n_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs;
        self
    }

    pub fn with_zero_variance(mut self, policy: ZeroVariancePolicy) -> Self {
        self.zero_variance = policy;
        self
    }

    pub fn with_segment_map(mut self, segment_map: SegmentMap) -> Self {
        self.segment_map = segment_map;
        self
    }

    /// Check cluster count, user count, k-means knobs and segment map coverage
    pub fn validate(&self) -> Result<()> {
        if self.n_users == 0 {
            return Err(Error::invalid_config("number of users must be at least 1"));
        }
        if self.n_clusters == 0 {
            return Err(Error::invalid_config("number of clusters must be at least 1"));
        }
        if self.n_clusters > self.n_users {
            return Err(Error::invalid_config(format!(
                "number of clusters ({}) exceeds number of users ({})",
                self.n_clusters, self.n_users
            )));
        }
        if self.max_iterations == 0 || self.n_runs == 0 {
            return Err(Error::invalid_config(
                "max_iterations and n_runs must be at least 1",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::invalid_config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        self.segment_map.validate_domain(self.n_clusters)
    }

    /// K-means parameters derived from this configuration
    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams::new(self.n_clusters)
            .with_seed(self.cluster_seed)
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
            .with_n_runs(self.n_runs)
    }
}
