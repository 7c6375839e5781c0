//! Standardization of feature columns (zero mean, unit variance)

use crate::data::Metric;
use crate::error::{Error, Result};
use clap::ValueEnum;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// What to do with a column whose values are all identical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ZeroVariancePolicy {
    /// Transform the column to all zeros
    #[default]
    ZeroFill,
    /// Fail with a `DegenerateColumn` error
    Reject,
}

/// Fitted per-column statistics
///
/// Produced by [`fit_scaler`] and never mutated afterwards, so the same
/// transform can be applied to rows seen later.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerParams {
    /// Column means
    pub mean: Array1<f64>,
    /// Population standard deviations; 0.0 marks a degenerate column
    pub std: Array1<f64>,
}

impl ScalerParams {
    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Indices of zero-variance columns
    pub fn degenerate_columns(&self) -> Vec<usize> {
        self.std
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Standardize every row of `features`
    pub fn transform(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(Error::DimensionMismatch {
                expected: self.n_features(),
                actual: features.ncols(),
            });
        }

        let mut scaled = features.to_owned();
        for mut row in scaled.outer_iter_mut() {
            self.scale_in_place(row.view_mut());
        }
        Ok(scaled)
    }

    /// Standardize a single raw row
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        if row.len() != self.n_features() {
            return Err(Error::DimensionMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_data("row contains non-finite values"));
        }

        let mut scaled = row.to_owned();
        self.scale_in_place(scaled.view_mut());
        Ok(scaled)
    }

    fn scale_in_place(&self, mut row: ndarray::ArrayViewMut1<f64>) {
        for ((value, &mean), &std) in row.iter_mut().zip(&self.mean).zip(&self.std) {
            *value = if std == 0.0 { 0.0 } else { (*value - mean) / std };
        }
    }
}

/// Fit column means and population standard deviations
///
/// A column is degenerate when all its values are equal. Under
/// [`ZeroVariancePolicy::ZeroFill`] its std is recorded as 0.0 and it
/// transforms to zeros; under [`ZeroVariancePolicy::Reject`] fitting fails.
///
/// # Arguments
/// * `features` - Raw feature matrix with at least one row
/// * `policy` - Handling of zero-variance columns
///
/// # Returns
/// * `ScalerParams` holding the fitted means and standard deviations
pub fn fit_scaler(features: ArrayView2<f64>, policy: ZeroVariancePolicy) -> Result<ScalerParams> {
    if features.nrows() == 0 {
        return Err(Error::EmptyInput {
            what: "feature matrix",
        });
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_data("feature matrix contains non-finite values"));
    }

    let mean = features
        .mean_axis(Axis(0))
        .ok_or(Error::EmptyInput {
            what: "feature matrix",
        })?;
    let mut std = features.std_axis(Axis(0), 0.0);

    for (j, column) in features.axis_iter(Axis(1)).enumerate() {
        if !is_constant(column) {
            continue;
        }
        match policy {
            ZeroVariancePolicy::Reject => {
                return Err(Error::DegenerateColumn {
                    column: j,
                    name: column_name(j),
                });
            }
            ZeroVariancePolicy::ZeroFill => {
                log::warn!("Feature column '{}' has zero variance, filling with zeros", column_name(j));
                std[j] = 0.0;
            }
        }
    }

    Ok(ScalerParams { mean, std })
}

fn is_constant(column: ArrayView1<f64>) -> bool {
    let mut values = column.iter();
    match values.next() {
        Some(&first) => values.all(|&v| v == first),
        None => true,
    }
}

fn column_name(j: usize) -> String {
    Metric::ALL
        .get(j)
        .map(|m| m.column_name().to_string())
        .unwrap_or_else(|| format!("column_{}", j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn sample_features() -> Array2<f64> {
        array![
            [1.0, 10.0, 3.0],
            [2.0, 30.0, 3.5],
            [3.0, 20.0, 9.0],
            [4.0, 60.0, 1.0],
            [5.0, 15.0, 4.0],
        ]
    }

    #[test]
    fn test_scaled_columns_have_zero_mean_unit_std() {
        let features = sample_features();
        let params = fit_scaler(features.view(), ZeroVariancePolicy::Reject).unwrap();
        let scaled = params.transform(features.view()).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            let mean = column.mean().unwrap();
            let std = column.std(0.0);
            assert!(mean.abs() < 1e-9, "mean {} not ~0", mean);
            assert!((std - 1.0).abs() < 1e-9, "std {} not ~1", std);
        }
    }

    #[test]
    fn test_population_std_is_used() {
        let features = array![[1.0], [3.0]];
        let params = fit_scaler(features.view(), ZeroVariancePolicy::Reject).unwrap();
        assert_eq!(params.mean[0], 2.0);
        assert_eq!(params.std[0], 1.0);
    }

    #[test]
    fn test_zero_fill_degenerate_column() {
        let features = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let params = fit_scaler(features.view(), ZeroVariancePolicy::ZeroFill).unwrap();
        assert_eq!(params.degenerate_columns(), vec![1]);

        let scaled = params.transform(features.view()).unwrap();
        assert!(scaled.iter().all(|v| v.is_finite()));
        assert!(scaled.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_reject_degenerate_column() {
        let features = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let err = fit_scaler(features.view(), ZeroVariancePolicy::Reject).unwrap_err();
        assert!(matches!(err, Error::DegenerateColumn { column: 1, .. }));
    }

    #[test]
    fn test_empty_and_non_finite_input() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            fit_scaler(empty.view(), ZeroVariancePolicy::ZeroFill),
            Err(Error::EmptyInput { .. })
        ));

        let bad = array![[1.0, f64::NAN], [2.0, 3.0]];
        assert!(matches!(
            fit_scaler(bad.view(), ZeroVariancePolicy::ZeroFill),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn test_transform_new_row_with_fitted_params() {
        let features = sample_features();
        let params = fit_scaler(features.view(), ZeroVariancePolicy::Reject).unwrap();

        let row = params.transform_row(array![3.0, 27.0, 4.1].view()).unwrap();
        assert!(row[0].abs() < 1e-12);
        assert!(row[1].abs() < 1e-12);

        let err = params.transform_row(array![1.0, 2.0].view()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
    }
}
