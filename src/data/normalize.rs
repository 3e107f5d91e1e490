use ndarray::{Array1, ArrayViewMut, Axis, Dimension, Zip};

use crate::{
    error::{Result, XiError},
    types::Trajectory,
};

/// Per-column mean and standard deviation removed from a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub mean: Array1<f64>,
    /// Population standard deviation; constant columns are stored as 1
    pub std: Array1<f64>,
}

impl ColumnStats {
    /// Maps normalized values back to physical units in place.
    ///
    /// Works on any array whose last axis holds the `r` coefficients, e.g. a
    /// `(batch, r)` history or a `(batch, n_steps, r)` forecast.
    ///
    /// # Panics
    ///
    /// If `values` is zero dimensional or its last axis is not of length `r`.
    pub fn denormalize<D: Dimension>(&self, mut values: ArrayViewMut<'_, f64, D>) {
        assert!(values.ndim() > 0, "cannot denormalize a scalar");
        let last = Axis(values.ndim() - 1);

        for lane in values.lanes_mut(last) {
            Zip::from(lane)
                .and(&self.std)
                .and(&self.mean)
                .for_each(|v, &std, &mean| *v = *v * std + mean);
        }
    }
}

/// Rescales each column to zero mean and unit standard deviation in place.
///
/// Statistics are taken over every row, so this must run before the data is
/// split.
pub fn standardize_columns(xi: &mut Trajectory) -> Result<ColumnStats> {
    let mean = xi
        .mean_axis(Axis(0))
        .ok_or_else(|| XiError::MalformedRecord("trajectory has no rows".to_string()))?;
    let std = xi
        .std_axis(Axis(0), 0.0)
        .mapv(|s| if s > 0.0 && s.is_finite() { s } else { 1.0 });

    for mut row in xi.rows_mut() {
        row -= &mean;
        row /= &std;
    }

    Ok(ColumnStats { mean, std })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array3};

    #[test]
    fn columns_have_zero_mean_and_unit_std() {
        let mut xi = array![[1.0, 10.0], [2.0, 20.0], [3.0, 60.0], [6.0, 10.0]];
        let stats = standardize_columns(&mut xi).unwrap();

        assert_abs_diff_eq!(stats.mean[0], 3.0);
        assert_abs_diff_eq!(stats.mean[1], 25.0);

        let mean = xi.mean_axis(Axis(0)).unwrap();
        let std = xi.std_axis(Axis(0), 0.0);
        for k in 0..2 {
            assert_abs_diff_eq!(mean[k], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(std[k], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_column_is_only_centered() {
        let mut xi = array![[5.0, 1.0], [5.0, 3.0]];
        let stats = standardize_columns(&mut xi).unwrap();

        assert_eq!(stats.std[0], 1.0);
        assert_eq!(xi.column(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(xi.column(1).to_vec(), vec![-1.0, 1.0]);
    }

    #[test]
    fn denormalize_restores_raw_values() {
        let raw = array![[1.0, -4.0], [2.0, 0.5], [7.0, 3.0]];
        let mut xi = raw.clone();
        let stats = standardize_columns(&mut xi).unwrap();

        stats.denormalize(xi.view_mut());
        for (a, b) in xi.iter().zip(raw.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn denormalize_forecast_tensor() {
        let stats = ColumnStats {
            mean: array![10.0, -1.0],
            std: array![2.0, 0.5],
        };
        // (batch = 2, n_steps = 3, r = 2)
        let mut forecast = Array3::from_shape_fn((2, 3, 2), |(b, t, k)| (b + t + k) as f64);
        stats.denormalize(forecast.view_mut());

        for ((b, t, k), &v) in forecast.indexed_iter() {
            let z = (b + t + k) as f64;
            assert_abs_diff_eq!(v, z * stats.std[k] + stats.mean[k], epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn denormalize_rejects_wrong_rank() {
        let stats = ColumnStats {
            mean: array![0.0, 0.0],
            std: array![1.0, 1.0],
        };
        let mut values = Array3::<f64>::zeros((2, 3, 4));
        stats.denormalize(values.view_mut());
    }
}
