//! # kselect
//!
//! Choose the number of clusters for estimators that transform their input
//! before clustering.
//!
//! The elbow sweep ([`KElbow`]) and silhouette analysis ([`Silhouette`])
//! compute every score on the estimator's preprocessed input, the space in
//! which labels were actually assigned, instead of the raw data.
//! [`SphericalKmeans`] (PCA projection + cosine k-means) is the motivating
//! estimator; any [`ClusterEstimator`] works.
//!
//! Plotting is delegated to a [`Renderer`]; the crate ships a no-op and a
//! plain-text renderer.

pub mod cluster;
/// Error types used across `kselect`.
pub mod error;
pub mod knee;
pub mod metrics;
pub mod visualize;


pub use cluster::{ClusterEstimator, Kmeans, Pca, SphericalKmeans};
pub use error::{Error, Result};
pub use knee::{CurveDirection, CurveNature, CurveShape, KneeLocator};
pub use metrics::{
    calinski_harabasz_score, distortion_score, silhouette_samples, silhouette_score,
    ScoringMetric,
};
pub use visualize::{
    Elbow, FitPolicy, KElbow, KValues, NoopRenderer, Renderer, Silhouette, TextRenderer,
    NO_ELBOW_SCORE,
};
