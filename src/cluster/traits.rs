//! Clustering estimator trait.

use crate::error::Result;
use ndarray::Array2;

/// A clustering estimator that may transform its input before assigning labels.
///
/// Visualizers drive an estimator only through this trait. The important
/// method is [`preprocess_input`](ClusterEstimator::preprocess_input): it
/// returns the representation in which labels were actually assigned, and
/// every score is computed there.
pub trait ClusterEstimator {
    /// Currently configured number of clusters.
    fn n_clusters(&self) -> usize;

    /// Set the number of clusters used by the next `fit`.
    fn set_n_clusters(&mut self, k: usize);

    /// Fit the model to `x` (rows are samples).
    fn fit(&mut self, x: &Array2<f64>) -> Result<()>;

    /// Assign each row of `x` to a fitted cluster.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>>;

    /// Map `x` into the space the estimator clusters in.
    ///
    /// Estimators without a projection return a copy of `x`.
    fn preprocess_input(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Labels of the training rows from the last `fit`, if any.
    fn labels(&self) -> Option<&[usize]>;

    /// Whether `fit` has completed at least once.
    fn is_fitted(&self) -> bool {
        self.labels().is_some()
    }
}

impl<E: ClusterEstimator + ?Sized> ClusterEstimator for &mut E {
    fn n_clusters(&self) -> usize {
        (**self).n_clusters()
    }

    fn set_n_clusters(&mut self, k: usize) {
        (**self).set_n_clusters(k)
    }

    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        (**self).fit(x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        (**self).predict(x)
    }

    fn preprocess_input(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).preprocess_input(x)
    }

    fn labels(&self) -> Option<&[usize]> {
        (**self).labels()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}
