//! Plot renderers.
//!
//! Visualizers compute everything a plot needs and hand it to a
//! [`Renderer`]. Drawing is a side effect; nothing flows back.

use super::elbow::Elbow;

/// Data for an elbow plot: score (and optionally time) against k.
#[derive(Debug, Clone, Copy)]
pub struct ElbowPlot<'a> {
    /// Name of the scoring metric.
    pub metric: &'a str,
    /// Candidate cluster counts, ascending.
    pub k_values: &'a [usize],
    /// One score per candidate.
    pub scores: &'a [f64],
    /// Fit time in seconds per candidate, when timings are enabled.
    pub timings: Option<&'a [f64]>,
    /// Located elbow, if any.
    pub elbow: Option<Elbow>,
}

/// One cluster's band in a silhouette plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBand {
    /// Cluster label.
    pub label: usize,
    /// Vertical offset of the band's first sample.
    pub y_lower: usize,
    /// Silhouette values of the cluster's samples, ascending.
    pub values: Vec<f64>,
    /// Tick position at the band's centre.
    pub tick: f64,
}

/// Data for a silhouette plot.
#[derive(Debug, Clone, Copy)]
pub struct SilhouettePlot<'a> {
    /// Number of rows scored.
    pub n_samples: usize,
    /// Configured cluster count of the estimator.
    pub n_clusters: usize,
    /// Predicted label per row.
    pub labels: &'a [usize],
    /// Silhouette coefficient per row.
    pub samples: &'a [f64],
    /// Mean silhouette coefficient.
    pub score: f64,
    /// Per-cluster layout.
    pub bands: &'a [ClusterBand],
}

/// Plot sink for the visualizers.
pub trait Renderer {
    /// Draw an elbow plot.
    fn draw_elbow(&mut self, plot: &ElbowPlot<'_>);

    /// Draw a silhouette plot.
    fn draw_silhouette(&mut self, plot: &SilhouettePlot<'_>);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn draw_elbow(&mut self, _plot: &ElbowPlot<'_>) {}

    fn draw_silhouette(&mut self, _plot: &SilhouettePlot<'_>) {}
}

/// Renderer that writes a plain-text summary of each plot.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    out: String,
}

impl TextRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything drawn so far.
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Take the output, leaving the renderer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

impl Renderer for TextRenderer {
    fn draw_elbow(&mut self, plot: &ElbowPlot<'_>) {
        self.out.push_str(&format!("{} elbow\n", plot.metric));
        match plot.timings {
            Some(_) => self.out.push_str("     k        score    fit time (s)\n"),
            None => self.out.push_str("     k        score\n"),
        }
        for (i, (k, score)) in plot.k_values.iter().zip(plot.scores).enumerate() {
            match plot.timings.and_then(|t| t.get(i)) {
                Some(t) => self.out.push_str(&format!("{k:>6} {score:>12.4} {t:>15.6}\n")),
                None => self.out.push_str(&format!("{k:>6} {score:>12.4}\n")),
            }
        }
        match plot.elbow {
            Some(e) => self
                .out
                .push_str(&format!("elbow at k = {}, score = {:.3}\n", e.k, e.score)),
            None => self.out.push_str("no elbow\n"),
        }
    }

    fn draw_silhouette(&mut self, plot: &SilhouettePlot<'_>) {
        self.out.push_str(&format!(
            "silhouette: {} samples in {} centers, average score {:.4}\n",
            plot.n_samples, plot.n_clusters, plot.score
        ));
        for band in plot.bands {
            let lo = band.values.first().copied().unwrap_or(0.0);
            let hi = band.values.last().copied().unwrap_or(0.0);
            self.out.push_str(&format!(
                "  cluster {:>3}: {:>5} samples  [{lo:.4}, {hi:.4}]\n",
                band.label,
                band.values.len()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_renderer_elbow_with_timings() {
        let mut r = TextRenderer::new();
        r.draw_elbow(&ElbowPlot {
            metric: "distortion",
            k_values: &[2, 3],
            scores: &[10.0, 4.5],
            timings: Some(&[0.25, 0.5][..]),
            elbow: Some(Elbow { k: 2, score: 10.0 }),
        });

        let out = r.output();
        assert!(out.starts_with("distortion elbow\n"));
        assert!(out.contains("fit time"));
        assert!(out.contains("elbow at k = 2, score = 10.000"));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_text_renderer_elbow_without_knee() {
        let mut r = TextRenderer::new();
        r.draw_elbow(&ElbowPlot {
            metric: "silhouette",
            k_values: &[2],
            scores: &[0.5],
            timings: None,
            elbow: None,
        });
        let out = r.take();
        assert!(!out.contains("fit time"));
        assert!(out.ends_with("no elbow\n"));
        assert!(r.output().is_empty());
    }

    #[test]
    fn test_text_renderer_silhouette() {
        let bands = [
            ClusterBand { label: 0, y_lower: 10, values: vec![0.2, 0.9], tick: 11.0 },
            ClusterBand { label: 1, y_lower: 22, values: vec![0.5], tick: 22.5 },
        ];
        let mut r = TextRenderer::new();
        r.draw_silhouette(&SilhouettePlot {
            n_samples: 3,
            n_clusters: 2,
            labels: &[0, 0, 1],
            samples: &[0.2, 0.9, 0.5],
            score: 0.5333,
            bands: &bands,
        });
        let out = r.output();
        assert!(out.contains("3 samples in 2 centers"));
        assert!(out.contains("[0.2000, 0.9000]"));
        assert_eq!(out.lines().count(), 3);
    }
}
