use kselect::{
    ClusterEstimator, FitPolicy, KElbow, ScoringMetric, Silhouette, SphericalKmeans, TextRenderer,
};
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::Normal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=kselect=debug shows per-k scores and the located elbow.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Three blobs in 3D, 30 points each.
    let centers = [[0.0, 0.0, 0.0], [8.0, 0.0, 2.0], [0.0, 8.0, -2.0]];
    let noise = Normal::new(0.0, 0.6)?;
    let mut rng = StdRng::seed_from_u64(7);
    let x = Array2::from_shape_fn((90, 3), |(i, j)| centers[i / 30][j] + noise.sample(&mut rng));

    // Elbow sweep scored on the PCA projection the estimator clusters in.
    let mut elbow = KElbow::new(SphericalKmeans::new(2).with_seed(7))
        .with_k((2, 8))
        .with_metric(ScoringMetric::Distortion)
        .with_renderer(TextRenderer::new());
    elbow.fit(&x)?;
    print!("{}", elbow.renderer().output());

    let k = elbow.elbow_value().unwrap_or(3);
    println!("chosen k = {k}");

    // Silhouette at the chosen k; the sweep left the estimator fitted at the
    // last candidate, so force a refit.
    let (mut estimator, _) = elbow.into_parts();
    estimator.set_n_clusters(k);
    let mut silhouette = Silhouette::new(estimator)
        .with_policy(FitPolicy::Always)
        .with_renderer(TextRenderer::new());
    silhouette.fit(&x)?;
    print!("{}", silhouette.renderer().output());

    Ok(())
}
