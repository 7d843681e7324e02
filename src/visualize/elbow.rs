//! Elbow-method sweep over candidate cluster counts.
//!
//! For every candidate k the estimator is refit and scored; the score curve
//! is then searched for a knee. Scores are computed on the estimator's
//! preprocessed input, the space its labels live in, so estimators that
//! project before clustering are ranked on what they actually clustered.
//!
//! ```rust
//! use kselect::cluster::SphericalKmeans;
//! use kselect::metrics::ScoringMetric;
//! use kselect::visualize::KElbow;
//! use ndarray::array;
//!
//! let x = array![
//!     [0.0, 0.0], [0.2, 0.1], [0.1, 0.3], [-0.1, 0.2],
//!     [10.0, 10.0], [10.2, 9.9], [9.8, 10.1], [10.1, 10.3],
//! ];
//!
//! let mut viz = KElbow::new(SphericalKmeans::new(2).with_seed(1))
//!     .with_k((2, 5))
//!     .with_metric(ScoringMetric::Distortion);
//! viz.fit(&x)?;
//!
//! assert_eq!(viz.k_values(), &[2, 3, 4]);
//! assert_eq!(viz.k_scores().len(), 3);
//! # Ok::<(), kselect::Error>(())
//! ```

use std::ops::{Range, RangeInclusive};
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::render::{ElbowPlot, NoopRenderer, Renderer};
use crate::cluster::ClusterEstimator;
use crate::error::{Error, Result};
use crate::knee::KneeLocator;
use crate::metrics::ScoringMetric;

/// Elbow score reported when elbow location is enabled but no knee exists.
pub const NO_ELBOW_SCORE: f64 = 0.0;

const NO_ELBOW_WARNING: &str =
    "No 'knee' or 'elbow' point detected, pass `with_locate_elbow(false)` to remove the warning";

/// Candidate cluster counts, kept sorted and free of duplicates.
///
/// - An integer `k` means `2..=k`.
/// - A pair `(start, stop)` means `start..stop`.
/// - A list is sorted and de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KValues(Vec<usize>);

impl KValues {
    /// `2..=k`.
    pub fn up_to(k: usize) -> Self {
        Self((2..=k).collect())
    }

    /// The candidates, ascending.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "candidate cluster counts must not be empty",
            });
        }
        if self.0.contains(&0) {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "candidate cluster counts must be positive",
            });
        }
        Ok(())
    }
}

impl Default for KValues {
    fn default() -> Self {
        Self::up_to(10)
    }
}

impl From<usize> for KValues {
    fn from(k: usize) -> Self {
        Self::up_to(k)
    }
}

impl From<(usize, usize)> for KValues {
    fn from((start, stop): (usize, usize)) -> Self {
        Self((start..stop).collect())
    }
}

impl From<Range<usize>> for KValues {
    fn from(r: Range<usize>) -> Self {
        Self(r.collect())
    }
}

impl From<RangeInclusive<usize>> for KValues {
    fn from(r: RangeInclusive<usize>) -> Self {
        Self(r.collect())
    }
}

impl From<Vec<usize>> for KValues {
    fn from(mut ks: Vec<usize>) -> Self {
        ks.sort_unstable();
        ks.dedup();
        Self(ks)
    }
}

impl From<&[usize]> for KValues {
    fn from(ks: &[usize]) -> Self {
        Self::from(ks.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for KValues {
    fn from(ks: [usize; N]) -> Self {
        Self::from(ks.to_vec())
    }
}

/// Located elbow of a score curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Elbow {
    /// Candidate count at the knee.
    pub k: usize,
    /// Score recorded for that candidate.
    pub score: f64,
}

/// Elbow-method visualizer.
///
/// Defaults: k = 2..=10, distortion, timings on, elbow location on.
#[derive(Debug, Clone)]
pub struct KElbow<E, R = NoopRenderer> {
    estimator: E,
    renderer: R,
    k_values: KValues,
    metric: ScoringMetric,
    timings: bool,
    locate_elbow: bool,
    k_scores: Vec<f64>,
    k_timers: Vec<f64>,
    elbow: Option<Elbow>,
    warnings: Vec<String>,
}

impl<E: ClusterEstimator> KElbow<E> {
    /// Wrap `estimator` with default settings and no renderer.
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            renderer: NoopRenderer,
            k_values: KValues::default(),
            metric: ScoringMetric::default(),
            timings: true,
            locate_elbow: true,
            k_scores: Vec::new(),
            k_timers: Vec::new(),
            elbow: None,
            warnings: Vec::new(),
        }
    }
}

impl<E: ClusterEstimator, R: Renderer> KElbow<E, R> {
    /// Set the candidate cluster counts.
    pub fn with_k(mut self, k: impl Into<KValues>) -> Self {
        self.k_values = k.into();
        self
    }

    /// Set the scoring metric.
    pub fn with_metric(mut self, metric: ScoringMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Pass fit timings to the renderer.
    pub fn with_timings(mut self, timings: bool) -> Self {
        self.timings = timings;
        self
    }

    /// Search the score curve for a knee.
    pub fn with_locate_elbow(mut self, locate_elbow: bool) -> Self {
        self.locate_elbow = locate_elbow;
        self
    }

    /// Replace the renderer.
    pub fn with_renderer<R2: Renderer>(self, renderer: R2) -> KElbow<E, R2> {
        KElbow {
            estimator: self.estimator,
            renderer,
            k_values: self.k_values,
            metric: self.metric,
            timings: self.timings,
            locate_elbow: self.locate_elbow,
            k_scores: self.k_scores,
            k_timers: self.k_timers,
            elbow: self.elbow,
            warnings: self.warnings,
        }
    }

    /// Fit and score the estimator for every candidate k, locate the elbow,
    /// and draw.
    ///
    /// # Errors
    ///
    /// Invalid candidates and any estimator or scoring failure. A missing
    /// knee is not an error: it leaves [`elbow`](Self::elbow) empty and
    /// records a warning.
    pub fn fit(&mut self, x: &ndarray::Array2<f64>) -> Result<&mut Self> {
        self.k_values.validate()?;

        self.k_scores.clear();
        self.k_timers.clear();
        self.elbow = None;
        self.warnings.clear();

        for &k in self.k_values.as_slice() {
            let start = Instant::now();

            self.estimator.set_n_clusters(k);
            self.estimator.fit(x)?;

            let elapsed = start.elapsed().as_secs_f64();
            self.k_timers.push(elapsed);

            let projected = self.estimator.preprocess_input(x)?;
            let labels = self.estimator.labels().ok_or(Error::NotFitted)?;
            let score = self.metric.score(&projected, labels)?;
            debug!(k, elapsed, score, metric = self.metric.name(), "scored candidate");
            self.k_scores.push(score);
        }

        if self.locate_elbow {
            self.locate();
        }

        let plot = ElbowPlot {
            metric: self.metric.name(),
            k_values: self.k_values.as_slice(),
            scores: &self.k_scores,
            timings: self.timings.then_some(self.k_timers.as_slice()),
            elbow: self.elbow,
        };
        self.renderer.draw_elbow(&plot);

        Ok(self)
    }

    fn locate(&mut self) {
        let ks = self.k_values.as_slice();
        let xs: Vec<f64> = ks.iter().map(|&k| k as f64).collect();

        let mut locator = KneeLocator::new(&xs, &self.k_scores);
        if let Some(shape) = self.metric.curve_shape() {
            locator = locator.with_shape(shape);
        }

        match locator.knee() {
            Some(i) => {
                let elbow = Elbow {
                    k: ks[i],
                    score: self.k_scores[i],
                };
                debug!(k = elbow.k, score = elbow.score, "located elbow");
                self.elbow = Some(elbow);
            }
            None => {
                warn!(metric = self.metric.name(), "{NO_ELBOW_WARNING}");
                self.warnings.push(NO_ELBOW_WARNING.to_string());
            }
        }
    }

    /// The wrapped estimator, as left by the last candidate fit.
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

    /// Configured metric.
    pub fn metric(&self) -> ScoringMetric {
        self.metric
    }

    /// Candidate cluster counts, ascending.
    pub fn k_values(&self) -> &[usize] {
        self.k_values.as_slice()
    }

    /// Score per candidate from the last fit.
    pub fn k_scores(&self) -> &[f64] {
        &self.k_scores
    }

    /// Fit time in seconds per candidate from the last fit.
    pub fn k_timers(&self) -> &[f64] {
        &self.k_timers
    }

    /// Located elbow from the last fit.
    pub fn elbow(&self) -> Option<Elbow> {
        self.elbow
    }

    /// Candidate count at the elbow.
    pub fn elbow_value(&self) -> Option<usize> {
        self.elbow.map(|e| e.k)
    }

    /// Score at the elbow; [`NO_ELBOW_SCORE`] when none was found.
    ///
    /// `None` when elbow location is disabled.
    pub fn elbow_score(&self) -> Option<f64> {
        self.locate_elbow
            .then(|| self.elbow.map_or(NO_ELBOW_SCORE, |e| e.score))
    }

    /// Warnings raised by the last fit.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_values_forms() {
        assert_eq!(KValues::from(4).as_slice(), &[2, 3, 4]);
        assert_eq!(KValues::from((3, 6)).as_slice(), &[3, 4, 5]);
        assert_eq!(KValues::from(vec![5, 2, 5, 3]).as_slice(), &[2, 3, 5]);
        assert_eq!(KValues::from([4, 1]).as_slice(), &[1, 4]);
        assert_eq!(KValues::from(2..=4).as_slice(), &[2, 3, 4]);
        assert_eq!(KValues::default().len(), 9);
    }

    #[test]
    fn test_k_values_validation() {
        assert!(KValues::from(1).validate().is_err());
        assert!(KValues::from(vec![0, 2]).validate().is_err());
        assert!(KValues::from(vec![1]).validate().is_ok());
    }
}
