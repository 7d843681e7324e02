//! Principal component projection.
//!
//! Centers the data and projects it onto the eigenvectors of the sample
//! covariance matrix, largest eigenvalue first:
//!
//! ```text
//! C = Xcᵀ Xc / (n - 1) = U Λ Uᵀ
//! projection = Xc U[:, :n_components]
//! ```
//!
//! The eigendecomposition is delegated to `faer`. Each component's sign is
//! fixed so that its largest-magnitude entry is positive, which keeps
//! projections reproducible across fits.

use crate::error::{Error, Result};
use faer::{Mat, Side};
use ndarray::{Array1, Array2, Axis};

/// Principal component analysis.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Requested number of components; `None` keeps `min(n_samples, n_features)`.
    n_components: Option<usize>,
    mean: Option<Array1<f64>>,
    components: Option<Array2<f64>>,
    explained_variance: Vec<f64>,
}

impl Default for Pca {
    fn default() -> Self {
        Self::new()
    }
}

impl Pca {
    /// Create a projection that keeps every component with non-zero variance.
    pub fn new() -> Self {
        Self {
            n_components: None,
            mean: None,
            components: None,
            explained_variance: Vec::new(),
        }
    }

    /// Keep at most `n` components.
    pub fn with_n_components(mut self, n: usize) -> Self {
        self.n_components = Some(n);
        self
    }

    /// Principal axes, one per row (n_components × n_features).
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    /// Variance along each component, descending.
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Learn the mean and principal axes of `x`.
    ///
    /// Components whose variance is negligible relative to the total are
    /// dropped, so fewer than `n_components` may be kept.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let (n, d) = x.dim();
        if n == 0 || d == 0 {
            return Err(Error::EmptyInput);
        }
        let wanted = self.n_components.unwrap_or_else(|| n.min(d));
        if wanted == 0 || wanted > d {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be between 1 and the number of features",
            });
        }

        let mean = x.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?;
        let centered = x - &mean;
        let denom = n.saturating_sub(1).max(1) as f64;
        let cov_nd = centered.t().dot(&centered) / denom;

        let total_variance: f64 = cov_nd.diag().sum();
        if total_variance <= 0.0 {
            return Err(Error::ZeroVariance);
        }
        let floor = total_variance * 1e-12;

        let cov = Mat::<f64>::from_fn(d, d, |i, j| cov_nd[[i, j]]);
        let eigen = cov.selfadjoint_eigendecomposition(Side::Lower);
        let values = eigen.s().column_vector();
        let vectors = eigen.u();

        // Eigenvalues come back ascending; walk them largest first.
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| values.read(b).total_cmp(&values.read(a)));

        let kept: Vec<usize> = order
            .into_iter()
            .take(wanted)
            .take_while(|&i| values.read(i) > floor)
            .collect();
        if kept.is_empty() {
            return Err(Error::ZeroVariance);
        }

        let mut components = Array2::zeros((kept.len(), d));
        for (mut row, &col) in components.rows_mut().into_iter().zip(&kept) {
            for (j, v) in row.iter_mut().enumerate() {
                *v = vectors.read(j, col);
            }
            fix_sign(&mut row);
        }

        self.mean = Some(mean);
        self.components = Some(components);
        self.explained_variance = kept.iter().map(|&i| values.read(i)).collect();
        Ok(())
    }

    /// Project `x` onto the fitted components.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (Some(mean), Some(components)) = (&self.mean, &self.components) else {
            return Err(Error::NotFitted);
        };
        if x.ncols() != mean.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                found: x.ncols(),
            });
        }
        Ok((x - mean).dot(&components.t()))
    }

    /// `fit` followed by `transform` on the same rows.
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Flip `axis` so its largest-magnitude entry is positive.
fn fix_sign(axis: &mut ndarray::ArrayViewMut1<'_, f64>) {
    let pivot = axis
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        axis.mapv_inplace(|v| -v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pca_recovers_line_direction() {
        // Points on y = 2x
        let data = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];

        let mut pca = Pca::new().with_n_components(1);
        let projected = pca.fit_transform(&data).unwrap();

        let axis = pca.components().unwrap().row(0).to_owned();
        let s5 = 5.0_f64.sqrt();
        assert_abs_diff_eq!(axis[0], 1.0 / s5, epsilon = 1e-8);
        assert_abs_diff_eq!(axis[1], 2.0 / s5, epsilon = 1e-8);

        assert_eq!(projected.dim(), (5, 1));
        // Centered coordinate along the line: (i - 2) * sqrt(5)
        for (i, v) in projected.column(0).iter().enumerate() {
            assert_abs_diff_eq!(*v, (i as f64 - 2.0) * s5, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_pca_drops_null_directions() {
        // Rank-one data: only one component has variance.
        let data = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0]];
        let mut pca = Pca::new();
        pca.fit(&data).unwrap();
        assert_eq!(pca.explained_variance().len(), 1);
    }

    #[test]
    fn test_pca_components_orthonormal_and_sorted() {
        let data = array![
            [2.5, 2.4, 0.5],
            [0.5, 0.7, 1.5],
            [2.2, 2.9, 0.1],
            [1.9, 2.2, 0.9],
            [3.1, 3.0, 0.3],
            [2.3, 2.7, 1.1],
            [2.0, 1.6, 0.4],
            [1.0, 1.1, 1.8],
        ];
        let mut pca = Pca::new();
        pca.fit(&data).unwrap();

        let comps = pca.components().unwrap();
        let gram = comps.dot(&comps.t());
        for i in 0..gram.nrows() {
            for j in 0..gram.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = 1e-6);
            }
        }

        let var = pca.explained_variance();
        assert!(var.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_pca_orders_by_variance_not_column_mass() {
        // The third column carries the most covariance mass on its own,
        // but the (1, 1, 0) diagonal has the larger variance (8/3 vs 2.2).
        let s = 1.65_f64.sqrt();
        let data = array![[1.0, 1.0, s], [-1.0, -1.0, s], [1.0, 1.0, -s], [-1.0, -1.0, -s]];

        let mut pca = Pca::new();
        pca.fit(&data).unwrap();
        let var = pca.explained_variance();
        assert_eq!(var.len(), 2);
        assert_abs_diff_eq!(var[0], 8.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(var[1], 2.2, epsilon = 1e-9);

        let mut top = Pca::new().with_n_components(1);
        let projected = top.fit_transform(&data).unwrap();
        let axis = top.components().unwrap().row(0).to_owned();
        let h = 0.5_f64.sqrt();
        assert_abs_diff_eq!(axis[0], h, epsilon = 1e-9);
        assert_abs_diff_eq!(axis[1], h, epsilon = 1e-9);
        assert_abs_diff_eq!(axis[2], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projected[[0, 0]], 2.0 * h, epsilon = 1e-9);
    }

    #[test]
    fn test_pca_zero_variance_error() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        assert_eq!(Pca::new().fit(&data), Err(Error::ZeroVariance));
    }

    #[test]
    fn test_pca_transform_before_fit_error() {
        let data = array![[1.0, 2.0]];
        assert_eq!(Pca::new().transform(&data), Err(Error::NotFitted));
    }

    #[test]
    fn test_pca_too_many_components_error() {
        let data = array![[0.0, 1.0], [1.0, 0.0]];
        let result = Pca::new().with_n_components(3).fit(&data);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "n_components", .. })));
    }
}
