//! Frequency decorrelation: a Gaussian correlation model in log-frequency and
//! the constrained realization statistics derived from it.
//!
//! The correlation between two frequencies is
//! `exp(-½ (ln(ν_i/ν_j) / ℓ)²)` for a correlation length `ℓ`. Fixing the
//! emission at one reference frequency (the constraint) leaves a conditional
//! Gaussian over the remaining frequencies, whose mean and covariance square
//! root are returned by [`decorrelation_matrix`].

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use skyemit_core::errors::{ErrorInfo, SkyError};
use tracing::debug;

use crate::linalg::{reconstruct, safe_invert};

fn invalid_length(value: f64) -> SkyError {
    SkyError::InvalidParameter(
        ErrorInfo::new(
            "invalid-correlation-length",
            "correlation length must be non-negative",
        )
        .with_context("correlation_length", value),
    )
}

/// Validates a correlation length: non-negative and not NaN. Infinity means
/// fully correlated.
pub fn check_correlation_length(correlation_length: f64) -> Result<(), SkyError> {
    if correlation_length.is_nan() || correlation_length < 0.0 {
        return Err(invalid_length(correlation_length));
    }
    Ok(())
}

/// Builds the frequency correlation matrix for `freqs` (GHz).
///
/// A zero correlation length is the fully decorrelated limit: entries are 1
/// where the two frequencies are equal and 0 elsewhere.
pub fn frequency_correlation(
    freqs: &[f64],
    correlation_length: f64,
) -> Result<DMatrix<f64>, SkyError> {
    check_correlation_length(correlation_length)?;
    let n = freqs.len();
    let mut corr = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        for j in 0..i {
            let log_ratio = (freqs[i] / freqs[j]).ln();
            let value = if correlation_length == 0.0 {
                if log_ratio == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (-0.5 * (log_ratio / correlation_length).powi(2)).exp()
            };
            corr[(i, j)] = value;
            corr[(j, i)] = value;
        }
    }
    Ok(corr)
}

/// Statistics of the constrained realization over the unconstrained
/// frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariancePair {
    /// Symmetric square root of the conditional covariance, built from the
    /// eigendecomposition with negative eigenvalues clipped to zero.
    pub covariance_sqrt: DMatrix<f64>,
    /// Conditional mean, one entry per unconstrained frequency.
    pub mean: DVector<f64>,
}

impl CovariancePair {
    /// Number of unconstrained frequencies described.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the pair describes no frequencies.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Realizes one draw: `mean + covariance_sqrt · normals`.
    pub fn realize(&self, normals: &[f64]) -> Result<Vec<f64>, SkyError> {
        if normals.len() != self.len() {
            return Err(SkyError::shape_mismatch(
                "standard normal draw",
                self.len(),
                normals.len(),
            ));
        }
        let z = DVector::from_column_slice(normals);
        let realized = &self.mean + &self.covariance_sqrt * z;
        Ok(realized.iter().copied().collect())
    }
}

/// Computes the constrained mean and covariance square root for
/// `unconstrained` frequencies given the emission is pinned at `constrained`.
///
/// The constrained frequency always occupies index 0 of the joint matrix, so
/// an unconstrained frequency equal to it is still treated as a separate
/// (perfectly correlated) entry.
pub fn decorrelation_matrix(
    constrained: f64,
    unconstrained: &[f64],
    correlation_length: f64,
) -> Result<CovariancePair, SkyError> {
    check_correlation_length(correlation_length)?;
    let n = unconstrained.len();
    if n == 0 {
        return Ok(CovariancePair {
            covariance_sqrt: DMatrix::zeros(0, 0),
            mean: DVector::zeros(0),
        });
    }
    let mut freqs_all = Vec::with_capacity(n + 1);
    freqs_all.push(constrained);
    freqs_all.extend_from_slice(unconstrained);

    let corr = frequency_correlation(&freqs_all, correlation_length)?;
    let rho_inv = safe_invert(&corr)?;

    let rho_uu = rho_inv.view((1, 1), (n, n)).into_owned();
    let rho_cu = rho_inv.column(0).rows(1, n).into_owned();
    let rho_uu = safe_invert(&rho_uu)?;

    let eigen = SymmetricEigen::new(rho_uu.clone());
    let covariance_sqrt = reconstruct(&eigen, |lambda| lambda.max(0.0).sqrt());
    let mean = -(&rho_uu * rho_cu);

    debug!(
        constrained,
        nfreq = n,
        correlation_length,
        "built decorrelation matrix"
    );
    Ok(CovariancePair {
        covariance_sqrt,
        mean,
    })
}
