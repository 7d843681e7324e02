//! Internal clustering scores for choosing k.
//!
//! Each score takes a data matrix and one label per row. Callers are
//! responsible for passing the representation the labels were assigned in;
//! the visualizers always pass the estimator's preprocessed input.
//!
//! # Metrics Overview
//!
//! | Metric | Range | Best | Curve over k |
//! |--------|-------|------|--------------|
//! | [`distortion_score`] | [0, ∞) | elbow | convex, decreasing |
//! | [`silhouette_score`] | [-1, 1] | 1 | concave, increasing |
//! | [`calinski_harabasz_score`] | [0, ∞) | higher | concave, increasing |
//!
//! # Example
//!
//! ```rust
//! use kselect::metrics::{distortion_score, silhouette_score};
//! use ndarray::array;
//!
//! let x = array![[0.0], [1.0], [10.0], [11.0]];
//! let labels = [0, 0, 1, 1];
//!
//! assert!((distortion_score(&x, &labels).unwrap() - 1.0).abs() < 1e-12);
//! assert!(silhouette_score(&x, &labels).unwrap() > 0.8);
//! ```
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation
//!   and validation of cluster analysis"
//! - Caliński & Harabasz (1974). "A dendrite method for cluster analysis"

use crate::error::{Error, Result};
use crate::knee::{CurveDirection, CurveNature, CurveShape};
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Signature of a user-supplied score.
pub type ScoreFn = fn(&Array2<f64>, &[usize]) -> Result<f64>;

/// Score used to rank candidate cluster counts.
#[derive(Debug, Clone, Copy, Default)]
pub enum ScoringMetric {
    /// Sum of squared distances to the cluster mean.
    #[default]
    Distortion,
    /// Mean silhouette coefficient.
    Silhouette,
    /// Calinski-Harabasz variance ratio.
    CalinskiHarabasz,
    /// Any other score. Knee detection uses the locator's default shape.
    Custom {
        /// Display name.
        name: &'static str,
        /// Scoring function.
        score: ScoreFn,
    },
}

impl ScoringMetric {
    /// Stable name of the metric.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Distortion => "distortion",
            Self::Silhouette => "silhouette",
            Self::CalinskiHarabasz => "calinski_harabasz",
            Self::Custom { name, .. } => *name,
        }
    }

    /// Score `labels` against `x`.
    pub fn score(&self, x: &Array2<f64>, labels: &[usize]) -> Result<f64> {
        match self {
            Self::Distortion => distortion_score(x, labels),
            Self::Silhouette => silhouette_score(x, labels),
            Self::CalinskiHarabasz => calinski_harabasz_score(x, labels),
            Self::Custom { score, .. } => score(x, labels),
        }
    }

    /// Expected shape of the score-vs-k curve, used to locate its knee.
    ///
    /// `None` means the knee locator runs with its defaults.
    pub fn curve_shape(&self) -> Option<CurveShape> {
        match self {
            Self::Distortion => Some(CurveShape::new(
                CurveNature::Convex,
                CurveDirection::Decreasing,
            )),
            Self::Silhouette | Self::CalinskiHarabasz => Some(CurveShape::new(
                CurveNature::Concave,
                CurveDirection::Increasing,
            )),
            Self::Custom { .. } => None,
        }
    }
}

impl fmt::Display for ScoringMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "distortion" => Ok(Self::Distortion),
            "silhouette" => Ok(Self::Silhouette),
            "calinski_harabasz" => Ok(Self::CalinskiHarabasz),
            _ => Err(Error::InvalidParameter {
                name: "metric",
                message: "expected one of distortion, silhouette, calinski_harabasz",
            }),
        }
    }
}

/// Within-cluster sum of squared Euclidean distances to each cluster mean.
///
/// ```text
/// D = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
/// ```
///
/// Any number of distinct labels is accepted, including one.
pub fn distortion_score(x: &Array2<f64>, labels: &[usize]) -> Result<f64> {
    let groups = LabelGroups::new(x, labels)?;
    let centers = groups.centers(x);

    let mut distortion = 0.0;
    for (row, &g) in x.rows().into_iter().zip(&groups.index) {
        distortion += squared_distance(&row, &centers.row(g));
    }
    Ok(distortion)
}

/// Silhouette coefficient of every sample.
///
/// For sample i with mean intra-cluster distance `a` and smallest mean
/// distance to another cluster `b`:
///
/// ```text
/// s(i) = (b - a) / max(a, b)
/// ```
///
/// Samples in singleton clusters score 0, as do samples where `a = b = 0`.
///
/// # Errors
///
/// [`Error::InvalidLabelCount`] unless `2 <= n_labels <= n_samples - 1`.
pub fn silhouette_samples(x: &Array2<f64>, labels: &[usize]) -> Result<Vec<f64>> {
    let groups = LabelGroups::new(x, labels)?;
    groups.check_label_count()?;

    let sample = |i: usize| -> f64 {
        let point = x.row(i);
        let mut sums = vec![0.0; groups.counts.len()];
        for (j, other) in x.rows().into_iter().enumerate() {
            if j != i {
                sums[groups.index[j]] += squared_distance(&point, &other).sqrt();
            }
        }

        let own = groups.index[i];
        if groups.counts[own] == 1 {
            return 0.0;
        }
        let a = sums[own] / (groups.counts[own] - 1) as f64;
        let b = sums
            .iter()
            .zip(&groups.counts)
            .enumerate()
            .filter(|(g, _)| *g != own)
            .map(|(_, (s, &c))| s / c as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            (b - a) / denom
        } else {
            0.0
        }
    };

    #[cfg(feature = "parallel")]
    let samples = (0..x.nrows()).into_par_iter().map(sample).collect();

    #[cfg(not(feature = "parallel"))]
    let samples = (0..x.nrows()).map(sample).collect();

    Ok(samples)
}

/// Mean silhouette coefficient over all samples.
pub fn silhouette_score(x: &Array2<f64>, labels: &[usize]) -> Result<f64> {
    let samples = silhouette_samples(x, labels)?;
    Ok(mean(&samples))
}

/// Calinski-Harabasz index: between-cluster over within-cluster dispersion.
///
/// ```text
/// CH = [B / (k - 1)] / [W / (n - k)]
/// ```
///
/// Returns 1.0 when the within-cluster dispersion is zero.
///
/// # Errors
///
/// [`Error::InvalidLabelCount`] unless `2 <= n_labels <= n_samples - 1`.
pub fn calinski_harabasz_score(x: &Array2<f64>, labels: &[usize]) -> Result<f64> {
    let groups = LabelGroups::new(x, labels)?;
    groups.check_label_count()?;

    let n = x.nrows();
    let k = groups.counts.len();
    let centers = groups.centers(x);
    let overall: Array1<f64> = x.mean_axis(ndarray::Axis(0)).ok_or(Error::EmptyInput)?;

    let extra: f64 = centers
        .rows()
        .into_iter()
        .zip(&groups.counts)
        .map(|(c, &count)| count as f64 * squared_distance(&c, &overall.view()))
        .sum();
    let intra: f64 = x
        .rows()
        .into_iter()
        .zip(&groups.index)
        .map(|(row, &g)| squared_distance(&row, &centers.row(g)))
        .sum();

    if intra == 0.0 {
        return Ok(1.0);
    }
    Ok(extra * (n - k) as f64 / (intra * (k - 1) as f64))
}

/// Arithmetic mean; 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// Helper functions

/// Labels re-encoded as dense group indices `0..n_labels`, in label order.
struct LabelGroups {
    index: Vec<usize>,
    counts: Vec<usize>,
}

impl LabelGroups {
    fn new(x: &Array2<f64>, labels: &[usize]) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        if labels.len() != x.nrows() {
            return Err(Error::DimensionMismatch {
                expected: x.nrows(),
                found: labels.len(),
            });
        }

        let mut encoding = BTreeMap::new();
        for &l in labels {
            encoding.entry(l).or_insert(0usize);
        }
        for (dense, slot) in encoding.values_mut().enumerate() {
            *slot = dense;
        }

        let index: Vec<usize> = labels.iter().map(|l| encoding[l]).collect();
        let mut counts = vec![0usize; encoding.len()];
        for &g in &index {
            counts[g] += 1;
        }
        Ok(Self { index, counts })
    }

    fn check_label_count(&self) -> Result<()> {
        let n_labels = self.counts.len();
        let n_samples = self.index.len();
        if n_labels < 2 || n_labels >= n_samples {
            return Err(Error::InvalidLabelCount {
                n_labels,
                n_samples,
            });
        }
        Ok(())
    }

    fn centers(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut centers = Array2::zeros((self.counts.len(), x.ncols()));
        for (row, &g) in x.rows().into_iter().zip(&self.index) {
            let mut c = centers.row_mut(g);
            c += &row;
        }
        for (mut c, &count) in centers.rows_mut().into_iter().zip(&self.counts) {
            c /= count as f64;
        }
        centers
    }
}

/// Squared Euclidean distance between two rows.
#[inline]
pub(crate) fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
