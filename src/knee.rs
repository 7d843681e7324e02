//! Knee and elbow detection (Kneedle).
//!
//! Finds the point of maximum curvature on a sampled curve, e.g. the score
//! of a clustering as a function of k.
//!
//! # The Algorithm (Satopää et al., 2011)
//!
//! 1. Normalize x and y to [0, 1].
//! 2. Transform the curve so the knee becomes a maximum of an increasing,
//!    concave curve (flip convex and decreasing shapes).
//! 3. Difference curve: `d = y - x`.
//! 4. Local maxima of `d` are knee candidates. Each gets a threshold
//!    `T = d_max - S · mean(Δx)`.
//! 5. Walk the difference curve: the first candidate whose following value
//!    drops below its threshold is the knee. Reaching a local minimum resets
//!    the threshold to 0.
//!
//! The sensitivity `S` trades detection speed for confidence; larger values
//! need a sharper drop before declaring a knee.
//!
//! # Shapes
//!
//! | Nature | Direction | Typical curve |
//! |--------|-----------|---------------|
//! | Concave | Increasing | silhouette, Calinski-Harabasz |
//! | Convex | Decreasing | distortion |
//! | Concave | Decreasing | |
//! | Convex | Increasing | |
//!
//! # Example
//!
//! ```rust
//! use kselect::knee::{CurveDirection, CurveNature, KneeLocator};
//!
//! let x: Vec<f64> = (1..=10).map(f64::from).collect();
//! let y: Vec<f64> = x.iter().map(|v| 100.0 / v).collect();
//!
//! let knee = KneeLocator::new(&x, &y)
//!     .with_curve_nature(CurveNature::Convex)
//!     .with_curve_direction(CurveDirection::Decreasing)
//!     .knee();
//! assert_eq!(knee, Some(2)); // x = 3.0
//! ```
//!
//! # References
//!
//! Satopää, Albrecht, Irwin, Raghavan (2011). "Finding a 'Kneedle' in a
//! Haystack: Detecting Knee Points in System Behavior."

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the curve bends like a cap (concave) or a cup (convex).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CurveNature {
    /// Cap-shaped.
    #[default]
    Concave,
    /// Cup-shaped.
    Convex,
}

/// Overall trend of the curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CurveDirection {
    /// y grows with x.
    #[default]
    Increasing,
    /// y shrinks as x grows.
    Decreasing,
}

/// Nature and direction of a curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveShape {
    /// Concave or convex.
    pub nature: CurveNature,
    /// Increasing or decreasing.
    pub direction: CurveDirection,
}

impl CurveShape {
    /// Build a shape.
    pub const fn new(nature: CurveNature, direction: CurveDirection) -> Self {
        Self { nature, direction }
    }
}

/// Kneedle knee locator over a sampled curve.
#[derive(Debug, Clone)]
pub struct KneeLocator<'a> {
    x: &'a [f64],
    y: &'a [f64],
    shape: CurveShape,
    sensitivity: f64,
}

impl<'a> KneeLocator<'a> {
    /// Locate the knee of `y` over ascending `x` (concave, increasing, S = 1).
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        Self {
            x,
            y,
            shape: CurveShape::default(),
            sensitivity: 1.0,
        }
    }

    /// Set the curve nature.
    pub fn with_curve_nature(mut self, nature: CurveNature) -> Self {
        self.shape.nature = nature;
        self
    }

    /// Set the curve direction.
    pub fn with_curve_direction(mut self, direction: CurveDirection) -> Self {
        self.shape.direction = direction;
        self
    }

    /// Set nature and direction at once.
    pub fn with_shape(mut self, shape: CurveShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the sensitivity `S`.
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Index into `x` of the knee, or `None` if the curve has none.
    ///
    /// Curves with fewer than two points, mismatched lengths, non-finite
    /// values or zero range in x or y have no knee.
    pub fn knee(&self) -> Option<usize> {
        let n = self.x.len();
        if n < 2 || self.y.len() != n {
            return None;
        }

        let (xs, ys) = self.transformed(&normalize(self.x)?, &normalize(self.y)?);
        let diff: Vec<f64> = ys.iter().zip(&xs).map(|(y, x)| y - x).collect();

        let mut maxima = extrema(&diff, |a, b| a >= b);
        let mut minima = extrema(&diff, |a, b| a <= b);
        let first = *maxima.first()?;

        let step = ((xs[n - 1] - xs[0]) / (n - 1) as f64).abs();
        let thresholds: Vec<f64> = maxima
            .iter()
            .map(|&i| diff[i] - self.sensitivity * step)
            .collect();

        // The last point always closes a threshold region.
        maxima.push(n - 1);
        minima.push(n - 1);

        let mut next_threshold = 0;
        let mut threshold = 0.0;
        let mut threshold_index = first;

        for (i, &xv) in xs.iter().enumerate().skip(first) {
            if xv >= 1.0 || i + 1 >= n {
                break;
            }
            if maxima.contains(&i) {
                threshold = thresholds[next_threshold];
                threshold_index = i;
                next_threshold += 1;
            }
            if minima.contains(&i) {
                threshold = 0.0;
            }
            if diff[i + 1] < threshold {
                return Some(self.original_index(threshold_index, n));
            }
        }
        None
    }

    /// Map normalized-curve coordinates back onto the knee's shape.
    fn transformed(&self, xn: &[f64], yn: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let convex = self.shape.nature == CurveNature::Convex;
        let mut xs = xn.to_vec();
        let mut ys = yn.to_vec();

        if convex {
            let x_max = xs.iter().copied().fold(f64::MIN, f64::max);
            let y_max = ys.iter().copied().fold(f64::MIN, f64::max);
            xs.iter_mut().for_each(|v| *v = x_max - *v);
            ys.iter_mut().for_each(|v| *v = y_max - *v);
        }
        if self.shape.direction == CurveDirection::Decreasing {
            ys.reverse();
        }
        if convex {
            xs.reverse();
            ys.reverse();
        }
        (xs, ys)
    }

    fn original_index(&self, threshold_index: usize, n: usize) -> usize {
        match (self.shape.nature, self.shape.direction) {
            (CurveNature::Convex, CurveDirection::Decreasing)
            | (CurveNature::Concave, CurveDirection::Increasing) => threshold_index,
            (CurveNature::Concave, CurveDirection::Decreasing)
            | (CurveNature::Convex, CurveDirection::Increasing) => n - 1 - threshold_index,
        }
    }
}

fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if range <= 0.0 {
        return None;
    }
    Some(values.iter().map(|v| (v - lo) / range).collect())
}

/// Indices where `cmp(d[i], neighbour)` holds for both neighbours; edges
/// compare against themselves.
fn extrema(d: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let last = d.len().saturating_sub(1);
    (0..d.len())
        .filter(|&i| {
            let prev = d[i.saturating_sub(1)];
            let next = d[(i + 1).min(last)];
            cmp(d[i], prev) && cmp(d[i], next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    fn locate(x: &[f64], y: &[f64], nature: CurveNature, direction: CurveDirection) -> Option<usize> {
        KneeLocator::new(x, y)
            .with_curve_nature(nature)
            .with_curve_direction(direction)
            .knee()
    }

    #[test]
    fn test_convex_decreasing() {
        let x = one_to_ten();
        let y: Vec<f64> = x.iter().map(|v| 100.0 / v).collect();
        assert_eq!(locate(&x, &y, CurveNature::Convex, CurveDirection::Decreasing), Some(2));
    }

    #[test]
    fn test_concave_increasing_is_default() {
        let x = one_to_ten();
        let y = [0.0, 5.0, 8.0, 9.0, 9.5, 9.7, 9.8, 9.9, 9.95, 10.0];
        assert_eq!(KneeLocator::new(&x, &y).knee(), Some(2));
    }

    #[test]
    fn test_concave_decreasing() {
        let x = one_to_ten();
        let y = [10.0, 9.95, 9.9, 9.8, 9.7, 9.5, 9.0, 8.0, 5.0, 0.0];
        assert_eq!(locate(&x, &y, CurveNature::Concave, CurveDirection::Decreasing), Some(7));
    }

    #[test]
    fn test_convex_increasing() {
        let x = one_to_ten();
        let y = [0.0, 0.05, 0.1, 0.2, 0.3, 0.5, 1.0, 2.0, 5.0, 10.0];
        assert_eq!(locate(&x, &y, CurveNature::Convex, CurveDirection::Increasing), Some(7));
    }

    #[test]
    fn test_straight_line_has_no_knee() {
        let x = one_to_ten();
        assert_eq!(KneeLocator::new(&x, &x).knee(), None);
    }

    #[test]
    fn test_short_distortion_curve_without_knee() {
        let x = [2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 7.0, 5.0, 4.0];
        assert_eq!(locate(&x, &y, CurveNature::Convex, CurveDirection::Decreasing), None);
    }

    #[test]
    fn test_late_drop_puts_elbow_first() {
        let x = [2.0, 3.0, 4.0, 5.0];
        let y = [8573.43, 8300.83, 8000.0, 0.0];
        assert_eq!(locate(&x, &y, CurveNature::Convex, CurveDirection::Decreasing), Some(0));
    }

    #[test]
    fn test_degenerate_curves() {
        let x = [1.0, 2.0, 3.0];
        assert_eq!(KneeLocator::new(&x, &[4.0, 4.0, 4.0]).knee(), None);
        assert_eq!(KneeLocator::new(&x, &[1.0, f64::NAN, 3.0]).knee(), None);
        assert_eq!(KneeLocator::new(&x, &[1.0, 2.0]).knee(), None);
        assert_eq!(KneeLocator::new(&[1.0], &[1.0]).knee(), None);
    }

    #[test]
    fn test_higher_sensitivity_is_more_conservative() {
        let x = one_to_ten();
        let y: Vec<f64> = x.iter().map(|v| 100.0 / v).collect();
        let knee = KneeLocator::new(&x, &y)
            .with_shape(CurveShape::new(CurveNature::Convex, CurveDirection::Decreasing))
            .with_sensitivity(50.0)
            .knee();
        assert_eq!(knee, None);
    }
}
