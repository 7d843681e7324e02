//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS):
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each point → nearest centroid
//! 3. **Update**: Each centroid → mean of assigned points
//! 4. Repeat until the centroid shift drops below `tol`
//!
//! The same loop drives [`SphericalKmeans`](super::SphericalKmeans): on unit
//! vectors, the nearest centroid under squared Euclidean distance is the one
//! with the largest cosine, so the only change is renormalizing centroids
//! after each update.
//!
//! # Choosing k
//!
//! Lloyd needs k up front. Use [`KElbow`](crate::visualize::KElbow) or
//! [`Silhouette`](crate::visualize::Silhouette) to compare candidates.

use super::traits::ClusterEstimator;
use crate::error::{Error, Result};
use crate::metrics::squared_distance;
use ndarray::{Array2, ArrayView1};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering estimator.
///
/// Preprocessing is the identity: labels are assigned in the input space.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    centroids: Option<Array2<f64>>,
    labels: Option<Vec<usize>>,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            seed: None,
            centroids: None,
            labels: None,
        }
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

    /// Fitted centroids (k × d).
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// Fit and return the training labels.
    pub fn fit_predict(&mut self, x: &Array2<f64>) -> Result<Vec<usize>> {
        self.fit(x)?;
        Ok(self.labels.clone().unwrap_or_default())
    }
}

impl ClusterEstimator for Kmeans {
    fn n_clusters(&self) -> usize {
        self.k
    }

    fn set_n_clusters(&mut self, k: usize) {
        self.k = k;
    }

    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        validate_input(x, self.k)?;
        let (centroids, labels) = lloyd(x, self.k, self.max_iter, self.tol, self.seed, false);
        self.centroids = Some(centroids);
        self.labels = Some(labels);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let centroids = self.centroids.as_ref().ok_or(Error::NotFitted)?;
        check_width(x, centroids.ncols())?;
        let mut labels = vec![0usize; x.nrows()];
        assign(x, centroids, &mut labels);
        Ok(labels)
    }

    fn preprocess_input(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(x.to_owned())
    }

    fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }
}

/// Reject empty input and impossible cluster counts.
pub(crate) fn validate_input(x: &Array2<f64>, k: usize) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(Error::EmptyInput);
    }
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "n_clusters",
            message: "must be at least 1",
        });
    }
    if k > x.nrows() {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: x.nrows(),
        });
    }
    Ok(())
}

pub(crate) fn check_width(x: &Array2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

/// Run Lloyd iterations and return `(centroids, labels)`.
///
/// With `spherical`, centroids are renormalized to unit length after every
/// update. Labels always match the returned centroids.
pub(crate) fn lloyd(
    data: &Array2<f64>,
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
    spherical: bool,
) -> (Array2<f64>, Vec<usize>) {
    let n = data.nrows();
    let d = data.ncols();

    let mut rng: Box<dyn RngCore> = match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    };

    let mut centroids = init_centroids(data, k, &mut rng);
    if spherical {
        normalize_rows(&mut centroids);
    }
    let mut labels = vec![0usize; n];

    for _iter in 0..max_iter {
        assign(data, &centroids, &mut labels);

        // Update step
        let mut new_centroids = Array2::zeros((k, d));
        let mut counts = vec![0usize; k];

        for (i, &c) in labels.iter().enumerate() {
            for j in 0..d {
                new_centroids[[c, j]] += data[[i, j]];
            }
            counts[c] += 1;
        }

        for c in 0..k {
            if counts[c] > 0 {
                for j in 0..d {
                    new_centroids[[c, j]] /= counts[c] as f64;
                }
            } else {
                // Empty cluster: reinitialize randomly
                let idx = rng.random_range(0..n);
                new_centroids.row_mut(c).assign(&data.row(idx));
            }
        }
        if spherical {
            normalize_rows(&mut new_centroids);
        }

        let shift: f64 = centroids
            .iter()
            .zip(new_centroids.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();

        centroids = new_centroids;

        if shift < tol {
            break;
        }
    }

    assign(data, &centroids, &mut labels);
    (centroids, labels)
}

/// Assign every row to its nearest centroid.
pub(crate) fn assign(data: &Array2<f64>, centroids: &Array2<f64>, labels: &mut [usize]) {
    #[cfg(feature = "parallel")]
    labels.par_iter_mut().enumerate().for_each(|(i, label)| {
        *label = nearest(&data.row(i), centroids);
    });

    #[cfg(not(feature = "parallel"))]
    for (i, label) in labels.iter_mut().enumerate() {
        *label = nearest(&data.row(i), centroids);
    }
}

fn nearest(point: &ArrayView1<'_, f64>, centroids: &Array2<f64>) -> usize {
    let mut best_cluster = 0;
    let mut best_dist = f64::MAX;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, &centroid);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    best_cluster
}

/// Initialize centroids using k-means++.
fn init_centroids(data: &Array2<f64>, k: usize, rng: &mut impl Rng) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::zeros((k, data.ncols()));

    // First centroid: random point
    let first = rng.random_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    for i in 1..k {
        let distances: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|point| {
                (0..i)
                    .map(|c| squared_distance(&point, &centroids.row(c)))
                    .fold(f64::MAX, f64::min)
            })
            .collect();

        // Sample proportional to squared distance
        let total: f64 = distances.iter().sum();
        if total == 0.0 {
            let idx = rng.random_range(0..n);
            centroids.row_mut(i).assign(&data.row(idx));
            continue;
        }

        let threshold = rng.random::<f64>() * total;
        let mut cumsum = 0.0;
        let mut selected = n - 1;
        for (j, &d) in distances.iter().enumerate() {
            cumsum += d;
            if cumsum >= threshold {
                selected = j;
                break;
            }
        }

        centroids.row_mut(i).assign(&data.row(selected));
    }

    centroids
}

/// Scale each non-zero row to unit length.
pub(crate) fn normalize_rows(m: &mut Array2<f64>) {
    for mut row in m.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_groups() -> Array2<f64> {
        array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]]
    }

    #[test]
    fn test_kmeans_basic() {
        let mut kmeans = Kmeans::new(2).with_seed(42);
        let labels = kmeans.fit_predict(&two_groups()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_kmeans_labels_match_predict() {
        let data: Array2<f64> =
            Array2::from_shape_fn((50, 2), |(i, j)| if j == 0 { i as f64 * 0.1 } else { (i % 5) as f64 });

        let mut kmeans = Kmeans::new(5).with_seed(123);
        kmeans.fit(&data).unwrap();

        let trained = kmeans.labels().unwrap().to_vec();
        assert_eq!(trained.len(), 50);
        assert!(trained.iter().all(|&l| l < 5));
        assert_eq!(kmeans.predict(&data).unwrap(), trained);
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

        let labels = Kmeans::new(3).with_seed(42).fit_predict(&data).unwrap();

        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() {
        let labels1 = Kmeans::new(2).with_seed(42).fit_predict(&two_groups()).unwrap();
        let labels2 = Kmeans::new(2).with_seed(42).fit_predict(&two_groups()).unwrap();

        assert_eq!(labels1, labels2, "same seed should give same result");
    }

    #[test]
    fn test_kmeans_preprocess_is_identity() {
        let data = two_groups();
        let kmeans = Kmeans::new(2);
        assert_eq!(kmeans.preprocess_input(&data).unwrap(), data);
    }

    #[test]
    fn test_kmeans_predict_before_fit_error() {
        let kmeans = Kmeans::new(2);
        assert_eq!(kmeans.predict(&two_groups()), Err(Error::NotFitted));
        assert!(!kmeans.is_fitted());
    }

    #[test]
    fn test_kmeans_empty_input_error() {
        let data = Array2::<f64>::zeros((0, 2));
        assert_eq!(Kmeans::new(2).fit(&data), Err(Error::EmptyInput));
    }

    #[test]
    fn test_kmeans_k_larger_than_n_error() {
        let data = array![[0.0, 0.0], [1.0, 1.0]];
        let result = Kmeans::new(5).fit(&data);
        assert!(matches!(result, Err(Error::InvalidClusterCount { requested: 5, n_items: 2 })));
    }

    #[test]
    fn test_kmeans_predict_width_mismatch() {
        let mut kmeans = Kmeans::new(2).with_seed(1);
        kmeans.fit(&two_groups()).unwrap();
        let narrow = array![[0.0], [1.0]];
        assert!(matches!(kmeans.predict(&narrow), Err(Error::DimensionMismatch { expected: 2, found: 1 })));
    }
}
