//! Silhouette analysis of a single fitted clustering.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::render::{ClusterBand, NoopRenderer, Renderer, SilhouettePlot};
use crate::cluster::ClusterEstimator;
use crate::error::{Error, Result};
use crate::metrics::{mean, silhouette_samples};

/// Gap between cluster bands, and offset of the first band.
const BAND_GAP: usize = 10;

/// When [`Silhouette::fit`] fits the wrapped estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FitPolicy {
    /// Fit only if the estimator reports it is not fitted.
    #[default]
    Auto,
    /// Always fit, even an already fitted estimator.
    Always,
    /// Never fit; the estimator must already be fitted.
    Never,
}

impl FitPolicy {
    /// Whether an estimator in this state should be fit.
    pub fn needs_fit(self, already_fitted: bool) -> bool {
        match self {
            Self::Auto => !already_fitted,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        })
    }
}

impl FromStr for FitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(Error::InvalidParameter {
                name: "is_fitted",
                message: "expected one of auto, always, never",
            }),
        }
    }
}

/// Silhouette visualizer.
///
/// Labels come from `predict`, and both the average and per-sample scores
/// are computed on the estimator's preprocessed input.
#[derive(Debug, Clone)]
pub struct Silhouette<E, R = NoopRenderer> {
    estimator: E,
    renderer: R,
    policy: FitPolicy,
    n_samples: usize,
    n_clusters: usize,
    labels: Vec<usize>,
    silhouette_score: f64,
    silhouette_samples: Vec<f64>,
    bands: Vec<ClusterBand>,
}

impl<E: ClusterEstimator> Silhouette<E> {
    /// Wrap `estimator` with [`FitPolicy::Auto`] and no renderer.
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            renderer: NoopRenderer,
            policy: FitPolicy::default(),
            n_samples: 0,
            n_clusters: 0,
            labels: Vec::new(),
            silhouette_score: 0.0,
            silhouette_samples: Vec::new(),
            bands: Vec::new(),
        }
    }
}

impl<E: ClusterEstimator, R: Renderer> Silhouette<E, R> {
    /// Set the fitted-check policy.
    pub fn with_policy(mut self, policy: FitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the renderer.
    pub fn with_renderer<R2: Renderer>(self, renderer: R2) -> Silhouette<E, R2> {
        Silhouette {
            estimator: self.estimator,
            renderer,
            policy: self.policy,
            n_samples: self.n_samples,
            n_clusters: self.n_clusters,
            labels: self.labels,
            silhouette_score: self.silhouette_score,
            silhouette_samples: self.silhouette_samples,
            bands: self.bands,
        }
    }

    /// Fit (per policy), predict, score on the projected input, and draw.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let fitted = self.estimator.is_fitted();
        let refit = self.policy.needs_fit(fitted);
        debug!(policy = %self.policy, fitted, refit, "silhouette fit check");
        if refit {
            self.estimator.fit(x)?;
        }

        self.n_samples = x.nrows();
        self.n_clusters = self.estimator.n_clusters();

        let labels = self.estimator.predict(x)?;
        let projected = self.estimator.preprocess_input(x)?;
        let samples = silhouette_samples(&projected, &labels)?;

        self.silhouette_score = mean(&samples);
        self.silhouette_samples = samples;
        self.labels = labels;
        self.bands = layout_bands(&self.labels, &self.silhouette_samples, self.n_clusters);
        debug!(
            n_samples = self.n_samples,
            n_clusters = self.n_clusters,
            score = self.silhouette_score,
            "silhouette scored"
        );

        let plot = SilhouettePlot {
            n_samples: self.n_samples,
            n_clusters: self.n_clusters,
            labels: &self.labels,
            samples: &self.silhouette_samples,
            score: self.silhouette_score,
            bands: &self.bands,
        };
        self.renderer.draw_silhouette(&plot);

        Ok(self)
    }

    /// The wrapped estimator.
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Mutable access to the wrapped estimator.
    pub fn estimator_mut(&mut self) -> &mut E {
        &mut self.estimator
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Unwrap into the estimator and renderer.
    pub fn into_parts(self) -> (E, R) {
        (self.estimator, self.renderer)
    }

    /// Configured policy.
    pub fn policy(&self) -> FitPolicy {
        self.policy
    }

    /// Rows scored by the last fit.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Cluster count configured on the estimator at the last fit.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Predicted labels from the last fit.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Mean silhouette coefficient from the last fit.
    pub fn silhouette_score(&self) -> f64 {
        self.silhouette_score
    }

    /// Per-sample silhouette coefficients from the last fit.
    pub fn silhouette_samples(&self) -> &[f64] {
        &self.silhouette_samples
    }

    /// Per-cluster layout from the last fit.
    pub fn bands(&self) -> &[ClusterBand] {
        &self.bands
    }
}

/// Stack clusters `0..n_clusters` vertically, each band sorted ascending.
fn layout_bands(labels: &[usize], samples: &[f64], n_clusters: usize) -> Vec<ClusterBand> {
    let mut y_lower = BAND_GAP;
    let mut bands = Vec::with_capacity(n_clusters);

    for label in 0..n_clusters {
        let mut values: Vec<f64> = labels
            .iter()
            .zip(samples)
            .filter(|(l, _)| **l == label)
            .map(|(_, &s)| s)
            .collect();
        values.sort_by(f64::total_cmp);

        let size = values.len();
        bands.push(ClusterBand {
            label,
            y_lower,
            values,
            tick: y_lower as f64 + 0.5 * size as f64,
        });
        y_lower += size + BAND_GAP;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert!(FitPolicy::Auto.needs_fit(false));
        assert!(!FitPolicy::Auto.needs_fit(true));
        assert!(FitPolicy::Always.needs_fit(true));
        assert!(FitPolicy::Always.needs_fit(false));
        assert!(!FitPolicy::Never.needs_fit(false));
        assert!(!FitPolicy::Never.needs_fit(true));
    }

    #[test]
    fn test_policy_parse() {
        for p in [FitPolicy::Auto, FitPolicy::Always, FitPolicy::Never] {
            assert_eq!(p.to_string().parse::<FitPolicy>().unwrap(), p);
        }
        assert!("sometimes".parse::<FitPolicy>().is_err());
    }

    #[test]
    fn test_layout_bands() {
        let labels = [1, 0, 1, 0, 1];
        let samples = [0.9, 0.4, 0.1, 0.6, 0.5];

        let bands = layout_bands(&labels, &samples, 2);

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].y_lower, 10);
        assert_eq!(bands[0].values, vec![0.4, 0.6]);
        assert_eq!(bands[0].tick, 11.0);
        // 10 + 2 samples + 10 gap
        assert_eq!(bands[1].y_lower, 22);
        assert_eq!(bands[1].values, vec![0.1, 0.5, 0.9]);
        assert_eq!(bands[1].tick, 23.5);
    }

    #[test]
    fn test_layout_skips_labels_beyond_cluster_count() {
        let bands = layout_bands(&[0, 5], &[0.3, 0.7], 1);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].values, vec![0.3]);
    }
}
