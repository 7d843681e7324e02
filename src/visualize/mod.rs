//! k-selection visualizers.
//!
//! Both visualizers wrap a [`ClusterEstimator`](crate::cluster::ClusterEstimator)
//! and a [`Renderer`]:
//!
//! - [`KElbow`] sweeps candidate cluster counts, scores each fit and locates
//!   the elbow of the score curve.
//! - [`Silhouette`] scores one clustering sample by sample.
//!
//! ## Scoring space
//!
//! Some estimators transform their input before clustering; spherical
//! k-means projects onto principal components and normalizes rows. Labels
//! produced in that space say little about distances in the raw input, so
//! both visualizers score `estimator.preprocess_input(x)` rather than `x`.
//! For estimators without a projection the two are identical.
//!
//! ## Usage
//!
//! ```rust
//! use kselect::cluster::SphericalKmeans;
//! use kselect::visualize::{FitPolicy, Silhouette, TextRenderer};
//! use ndarray::array;
//!
//! let x = array![
//!     [0.0, 0.0], [0.2, 0.1], [0.1, 0.3], [-0.1, 0.2],
//!     [10.0, 10.0], [10.2, 9.9], [9.8, 10.1], [10.1, 10.3],
//! ];
//!
//! let mut viz = Silhouette::new(SphericalKmeans::new(2).with_seed(3))
//!     .with_policy(FitPolicy::Auto)
//!     .with_renderer(TextRenderer::new());
//! viz.fit(&x)?;
//!
//! assert_eq!(viz.silhouette_samples().len(), 8);
//! assert!(viz.silhouette_score() > 0.9);
//! assert!(viz.renderer().output().starts_with("silhouette"));
//! # Ok::<(), kselect::Error>(())
//! ```

mod elbow;
mod render;
mod silhouette;

pub use elbow::{Elbow, KElbow, KValues, NO_ELBOW_SCORE};
pub use render::{ClusterBand, ElbowPlot, NoopRenderer, Renderer, SilhouettePlot, TextRenderer};
pub use silhouette::{FitPolicy, Silhouette};
