//! Spherical k-means on a principal component projection.
//!
//! Fitting happens in two stages:
//!
//! 1. Project the input onto its principal components ([`Pca`]).
//! 2. Scale each projected row to unit length and cluster by direction.
//!
//! Labels are therefore assigned in the projected, normalized space, not the
//! input space. [`ClusterEstimator::preprocess_input`] exposes that space so
//! scores can be computed where the clustering actually happened.

use super::kmeans::{assign, check_width, lloyd, normalize_rows, validate_input};
use super::pca::Pca;
use super::traits::ClusterEstimator;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Spherical k-means with PCA preprocessing.
#[derive(Debug, Clone)]
pub struct SphericalKmeans {
    /// Number of clusters.
    k: usize,
    /// Components kept by the projection; `None` keeps all with variance.
    n_components: Option<usize>,
    /// Maximum Lloyd iterations.
    max_iter: usize,
    /// Convergence tolerance on centroid shift.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    pca: Option<Pca>,
    centroids: Option<Array2<f64>>,
    labels: Option<Vec<usize>>,
}

impl SphericalKmeans {
    /// Create a new spherical k-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_components: None,
            max_iter: 100,
            tol: 1e-4,
            seed: None,
            pca: None,
            centroids: None,
            labels: None,
        }
    }

    /// Keep at most `n` principal components.
    pub fn with_n_components(mut self, n: usize) -> Self {
        self.n_components = Some(n);
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Unit-length centroids in the projected space.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// The fitted projection.
    pub fn pca(&self) -> Option<&Pca> {
        self.pca.as_ref()
    }
}

impl ClusterEstimator for SphericalKmeans {
    fn n_clusters(&self) -> usize {
        self.k
    }

    fn set_n_clusters(&mut self, k: usize) {
        self.k = k;
    }

    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        validate_input(x, self.k)?;

        let mut pca = Pca::new();
        if let Some(n) = self.n_components {
            pca = pca.with_n_components(n);
        }
        let mut projected = pca.fit_transform(x)?;
        normalize_rows(&mut projected);

        let (centroids, labels) = lloyd(&projected, self.k, self.max_iter, self.tol, self.seed, true);
        self.pca = Some(pca);
        self.centroids = Some(centroids);
        self.labels = Some(labels);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let centroids = self.centroids.as_ref().ok_or(Error::NotFitted)?;
        let projected = self.preprocess_input(x)?;
        check_width(&projected, centroids.ncols())?;
        let mut labels = vec![0usize; projected.nrows()];
        assign(&projected, centroids, &mut labels);
        Ok(labels)
    }

    fn preprocess_input(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let pca = self.pca.as_ref().ok_or(Error::NotFitted)?;
        let mut projected = pca.transform(x)?;
        normalize_rows(&mut projected);
        Ok(projected)
    }

    fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }
}
