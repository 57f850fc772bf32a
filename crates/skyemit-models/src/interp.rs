//! Tabulated emissivity curve with clamped linear interpolation.

use serde::{Deserialize, Serialize};
use skyemit_core::errors::{ErrorInfo, SkyError};

fn curve_error(code: &str, message: impl Into<String>) -> SkyError {
    SkyError::InvalidParameter(ErrorInfo::new(code, message))
}

/// Emissivity as a function of peak-scaled frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct EmissivityCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl EmissivityCurve {
    /// Builds a curve from `(scaled_frequency, amplitude)` pairs.
    ///
    /// Requires at least two points, finite values, and strictly increasing
    /// abscissae.
    pub fn new(points: &[(f64, f64)]) -> Result<Self, SkyError> {
        if points.len() < 2 {
            return Err(SkyError::InvalidParameter(
                ErrorInfo::new("short-curve", "emissivity curve needs at least two points")
                    .with_context("points", points.len()),
            ));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(curve_error(
                "non-finite-curve",
                "emissivity curve contains non-finite values",
            ));
        }
        if let Some(row) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(SkyError::InvalidParameter(
                ErrorInfo::new(
                    "non-monotonic-curve",
                    "emissivity curve abscissae must be strictly increasing",
                )
                .with_context("row", row + 1),
            ));
        }
        let (x, y) = points.iter().copied().unzip();
        Ok(Self { x, y })
    }

    /// Number of tabulated points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Interpolates the curve at `x`, clamping to the end values outside the
    /// tabulated range.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.x.len() - 1;
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[last] {
            return self.y[last];
        }
        // first index with x[j] > x; 1 <= j <= last here
        let j = self.x.partition_point(|&xp| xp <= x);
        let (x0, x1) = (self.x[j - 1], self.x[j]);
        let (y0, y1) = (self.y[j - 1], self.y[j]);
        y0 + (y1 - y0) / (x1 - x0) * (x - x0)
    }
}

impl TryFrom<Vec<(f64, f64)>> for EmissivityCurve {
    type Error = SkyError;

    fn try_from(value: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<EmissivityCurve> for Vec<(f64, f64)> {
    fn from(value: EmissivityCurve) -> Self {
        value.x.into_iter().zip(value.y).collect()
    }
}
