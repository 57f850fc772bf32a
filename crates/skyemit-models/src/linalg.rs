//! Robust inversion of nearly positive definite symmetric matrices.

use nalgebra::{DMatrix, DVector, Dyn, SymmetricEigen};
use skyemit_core::errors::{ErrorInfo, SkyError};
use tracing::{trace, warn};

/// Upper bound on diagonal-loading rounds performed by [`safe_invert`].
pub const MAX_LOADING_ITERATIONS: usize = 64;

/// Smallest diagonal increment applied per loading round.
pub const MIN_LOADING: f64 = 1e-14;

fn instability(code: &str, message: impl Into<String>) -> SkyError {
    SkyError::NumericalInstability(ErrorInfo::new(code, message))
}

fn min_eigenvalue(eigenvalues: &DVector<f64>) -> f64 {
    eigenvalues.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Rebuilds `V · diag(f(λ)) · Vᵀ` from an eigendecomposition.
pub(crate) fn reconstruct(
    eigen: &SymmetricEigen<f64, Dyn>,
    f: impl Fn(f64) -> f64,
) -> DMatrix<f64> {
    let vectors = &eigen.eigenvectors;
    let weights = DMatrix::from_diagonal(&eigen.eigenvalues.map(f));
    vectors * weights * vectors.transpose()
}

/// Inverts a symmetric matrix that should be positive semi-definite but may
/// carry zero or slightly negative eigenvalues from roundoff.
///
/// While the smallest eigenvalue is not strictly positive, every diagonal
/// entry is increased by `2 · max(1e-14, -λ_min)` and the matrix is
/// decomposed again. The inverse is then `V · diag(1/λ) · Vᵀ`. Gives up with
/// [`SkyError::NumericalInstability`] after [`MAX_LOADING_ITERATIONS`] rounds
/// or when the input is not square or not finite.
pub fn safe_invert(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, SkyError> {
    if !matrix.is_square() {
        return Err(SkyError::NumericalInstability(
            ErrorInfo::new("non-square", "only square matrices can be inverted")
                .with_context("rows", matrix.nrows())
                .with_context("cols", matrix.ncols()),
        ));
    }
    if matrix.iter().any(|value| !value.is_finite()) {
        return Err(instability(
            "non-finite",
            "matrix contains NaN or infinite entries",
        ));
    }
    if matrix.is_empty() {
        return Ok(DMatrix::zeros(0, 0));
    }

    let mut loaded = matrix.clone();
    let mut total_loading = 0.0;
    for iteration in 0..MAX_LOADING_ITERATIONS {
        let eigen = SymmetricEigen::new(loaded.clone());
        let w_min = min_eigenvalue(&eigen.eigenvalues);
        if w_min > 0.0 {
            if iteration > 0 {
                warn!(
                    iterations = iteration,
                    total_loading, "applied diagonal loading before inversion"
                );
            }
            return Ok(reconstruct(&eigen, |lambda| 1.0 / lambda));
        }
        let step = 2.0 * MIN_LOADING.max(-w_min);
        trace!(iteration, w_min, step, "loading diagonal");
        for i in 0..loaded.nrows() {
            loaded[(i, i)] += step;
        }
        total_loading += step;
    }

    Err(SkyError::NumericalInstability(
        ErrorInfo::new(
            "loading-exhausted",
            "matrix did not become positive definite under diagonal loading",
        )
        .with_context("iterations", MAX_LOADING_ITERATIONS)
        .with_context("total_loading", total_loading)
        .with_context("dim", matrix.nrows()),
    ))
}
