//! K-Means clustering model implementation

use crate::error::{Error, Result};
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::{KMeans, KMeansInit};
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Seed used for centroid initialization unless overridden
pub const DEFAULT_CLUSTER_SEED: u64 = 42;

/// Parameters for a single k-means fit
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    /// Number of clusters
    pub n_clusters: usize,
    /// Seed for k-means++ initialization
    pub seed: u64,
    /// Maximum Lloyd iterations per run
    pub max_iterations: u64,
    /// Convergence tolerance on centroid movement
    pub tolerance: f64,
    /// Independent restarts; the run with the lowest inertia wins
    pub n_runs: usize,
}

impl ClusterParams {
    /// Defaults: seed 42, 300 iterations, tolerance 1e-4, 10 runs
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            seed: DEFAULT_CLUSTER_SEED,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
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
}

/// Cluster ids for each row, all in `[0, n_clusters)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    n_clusters: usize,
}

impl ClusterAssignment {
    /// Wrap raw labels, checking they are in range
    pub fn new(labels: Vec<usize>, n_clusters: usize) -> Result<Self> {
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_clusters) {
            return Err(Error::invalid_data(format!(
                "cluster id {} outside [0, {})",
                bad, n_clusters
            )));
        }
        Ok(Self { labels, n_clusters })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Member count per cluster id
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Fitted k-means model
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Cluster centroids in scaled feature space, one row per cluster
    pub centroids: Array2<f64>,
    /// Assignments for the training rows
    pub assignment: ClusterAssignment,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl KMeansModel {
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Predict cluster for a scaled feature vector
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<usize> {
        if features.len() != self.centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.ncols(),
                actual: features.len(),
            });
        }
        Ok(nearest_centroid(features, &self.centroids).0)
    }

    /// Get cluster sizes for the training rows
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.assignment.cluster_sizes()
    }
}

/// Fit k-means on a scaled feature matrix
///
/// Centroids are seeded with k-means++ from `params.seed`, so the same input
/// and seed always give the same assignment. Final labels come from the
/// nearest centroid by squared Euclidean distance, with ties resolved to the
/// lowest cluster id.
///
/// # Arguments
/// * `features` - Scaled feature matrix, one row per user
/// * `params` - Cluster count, seed and iteration settings
///
/// # Returns
/// * Fitted `KMeansModel` with centroids, training assignment and inertia
pub fn fit_kmeans(features: ArrayView2<f64>, params: &ClusterParams) -> Result<KMeansModel> {
    let n_samples = features.nrows();
    if n_samples == 0 || features.ncols() == 0 {
        return Err(Error::EmptyInput {
            what: "scaled feature matrix",
        });
    }
    if params.n_clusters == 0 {
        return Err(Error::invalid_config("number of clusters must be at least 1"));
    }
    if params.n_clusters > n_samples {
        return Err(Error::invalid_config(format!(
            "number of clusters ({}) exceeds number of data points ({})",
            params.n_clusters, n_samples
        )));
    }
    if params.n_runs == 0 || params.max_iterations == 0 {
        return Err(Error::invalid_config(
            "n_runs and max_iterations must be at least 1",
        ));
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_data("scaled features contain non-finite values"));
    }
    let distinct = count_distinct_rows(features, params.n_clusters);
    if distinct < params.n_clusters {
        return Err(Error::invalid_data(format!(
            "only {} distinct points for {} clusters",
            distinct, params.n_clusters
        )));
    }

    log::debug!(
        "Fitting k-means: k={}, seed={}, max_iterations={}, tolerance={}, n_runs={}",
        params.n_clusters,
        params.seed,
        params.max_iterations,
        params.tolerance,
        params.n_runs
    );

    // Targets are unused by k-means
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = DatasetBase::new(features.to_owned(), targets);

    let rng = StdRng::seed_from_u64(params.seed);
    let fitted = KMeans::params_with(params.n_clusters, rng, L2Dist)
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(params.n_runs)
        .max_n_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .fit(&dataset)
        .map_err(|e| Error::clustering(e.to_string()))?;

    let centroids = fitted.centroids().to_owned();

    let mut labels = Vec::with_capacity(n_samples);
    let mut inertia = 0.0;
    for row in features.outer_iter() {
        let (cluster, distance_sq) = nearest_centroid(row, &centroids);
        labels.push(cluster);
        inertia += distance_sq;
    }
    let assignment = ClusterAssignment::new(labels, params.n_clusters)?;

    for (cluster, &size) in assignment.cluster_sizes().iter().enumerate() {
        if size == 0 {
            log::warn!("Cluster {} has no members", cluster);
        }
    }

    Ok(KMeansModel {
        centroids,
        assignment,
        inertia,
    })
}

/// Index of the closest centroid and its squared distance; ties go to the lowest index
fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut min_distance = f64::INFINITY;
    let mut closest_cluster = 0;

    for (cluster_idx, centroid) in centroids.outer_iter().enumerate() {
        let distance: f64 = point
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();

        if distance < min_distance {
            min_distance = distance;
            closest_cluster = cluster_idx;
        }
    }

    (closest_cluster, min_distance)
}

/// Count distinct rows, stopping once `enough` have been seen
fn count_distinct_rows(features: ArrayView2<f64>, enough: usize) -> usize {
    let mut seen = HashSet::new();
    for row in features.outer_iter() {
        // +0.0 and -0.0 are the same point
        let key: Vec<u64> = row.iter().map(|v| (v + 0.0).to_bits()).collect();
        seen.insert(key);
        if seen.len() >= enough {
            break;
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn create_test_features() -> Array2<f64> {
        Array2::from_shape_vec(
            (9, 2),
            vec![
                -5.0, -5.0, //
                -5.2, -4.9, //
                -4.8, -5.1, //
                0.0, 5.0, //
                0.1, 5.2, //
                -0.1, 4.9, //
                5.0, -5.0, //
                5.1, -4.8, //
                4.9, -5.2,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_kmeans() {
        let features = create_test_features();
        let model = fit_kmeans(features.view(), &ClusterParams::new(3)).unwrap();

        assert_eq!(model.n_clusters(), 3);
        assert_eq!(model.assignment.len(), 9);
        assert_eq!(model.centroids.shape(), &[3, 2]);
        assert!(model.inertia.is_finite() && model.inertia >= 0.0);
        assert!(model.assignment.labels().iter().all(|&l| l < 3));
    }

    #[test]
    fn test_every_cluster_used_on_separated_data() {
        let features = create_test_features();
        let model = fit_kmeans(features.view(), &ClusterParams::new(3)).unwrap();

        let sizes = model.cluster_sizes();
        assert_eq!(sizes, vec![3, 3, 3]);

        let labels = model.assignment.labels();
        for group in labels.chunks(3) {
            assert!(group.iter().all(|&l| l == group[0]));
        }
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let features = create_test_features();
        let params = ClusterParams::new(2).with_seed(7);

        let first = fit_kmeans(features.view(), &params).unwrap();
        let second = fit_kmeans(features.view(), &params).unwrap();
        assert_eq!(first.assignment, second.assignment);
        assert_eq!(first.centroids, second.centroids);
    }

    #[test]
    fn test_single_varying_column_splits_in_two() {
        let mut features = Array2::zeros((10, 7));
        for (i, value) in [0.0, 1.0, 2.0, 3.0, 4.0, 100.0, 101.0, 102.0, 103.0, 104.0]
            .iter()
            .enumerate()
        {
            features[[i, 2]] = *value;
        }

        let model = fit_kmeans(features.view(), &ClusterParams::new(2)).unwrap();
        let labels = model.assignment.labels();
        assert_eq!(model.cluster_sizes(), vec![5, 5]);
        assert!(labels[..5].iter().all(|&l| l == labels[0]));
        assert!(labels[5..].iter().all(|&l| l == labels[5]));
        assert_ne!(labels[0], labels[5]);
    }

    #[test]
    fn test_predict_ties_go_to_lowest_index() {
        let model = KMeansModel {
            centroids: array![[1.0, 0.0], [-1.0, 0.0], [5.0, 5.0]],
            assignment: ClusterAssignment::new(vec![0, 1, 2], 3).unwrap(),
            inertia: 0.0,
        };

        assert_eq!(model.predict(array![0.0, 0.0].view()).unwrap(), 0);
        assert_eq!(model.predict(array![-0.9, 0.1].view()).unwrap(), 1);
        assert_eq!(model.predict(array![4.0, 4.0].view()).unwrap(), 2);
        assert!(model.predict(array![0.0].view()).is_err());
    }

    #[test]
    fn test_invalid_cluster_count() {
        let features = create_test_features();

        let err = fit_kmeans(features.view(), &ClusterParams::new(0)).unwrap_err();
        assert!(err.is_configuration());

        let err = fit_kmeans(features.view(), &ClusterParams::new(10)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_empty_matrix() {
        let empty = Array2::<f64>::zeros((0, 7));
        let err = fit_kmeans(empty.view(), &ClusterParams::new(1)).unwrap_err();
        assert!(matches!(err, Error::EmptyInput { .. }));
    }

    #[test]
    fn test_too_few_distinct_points() {
        let features = Array2::<f64>::zeros((6, 3));
        let err = fit_kmeans(features.view(), &ClusterParams::new(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));

        let model = fit_kmeans(features.view(), &ClusterParams::new(1)).unwrap();
        assert_eq!(model.cluster_sizes(), vec![6]);
    }

    #[test]
    fn test_assignment_rejects_out_of_range_labels() {
        assert!(ClusterAssignment::new(vec![0, 1, 3], 3).is_err());
        let assignment = ClusterAssignment::new(vec![0, 2, 2], 3).unwrap();
        assert_eq!(assignment.cluster_sizes(), vec![1, 0, 2]);
    }
}
