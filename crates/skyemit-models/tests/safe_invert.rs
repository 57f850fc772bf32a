use nalgebra::DMatrix;
use skyemit_core::SkyError;
use skyemit_models::safe_invert;

fn max_abs(matrix: &DMatrix<f64>) -> f64 {
    matrix.iter().fold(0.0f64, |acc, value| acc.max(value.abs()))
}

#[test]
fn positive_definite_matrix_is_inverted_exactly() {
    let m = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 2.0]);
    let inv = safe_invert(&m).unwrap();
    assert!(max_abs(&(&m * &inv - DMatrix::identity(3, 3))) < 1e-12);
}

#[test]
fn negative_eigenvalues_are_loaded_once() {
    // λ_min = -1, so one round adds 2 to the diagonal: diag(1, 5).
    let m = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 3.0]);
    let inv = safe_invert(&m).unwrap();
    let expected = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.2]);
    assert!(max_abs(&(inv - expected)) < 1e-12);
}

#[test]
fn loaded_matrix_is_inverted_exactly() {
    // eigenvalues 3 and -1: one round of loading by 2
    let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    let inv = safe_invert(&m).unwrap();
    let loaded = &m + DMatrix::identity(2, 2) * 2.0;
    assert!(max_abs(&(&inv * loaded - DMatrix::identity(2, 2))) < 1e-12);
}

#[test]
fn singular_matrix_yields_finite_positive_inverse() {
    let m = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let inv = safe_invert(&m).unwrap();
    assert!(inv.iter().all(|value| value.is_finite()));
    let eigen = nalgebra::SymmetricEigen::new(inv.clone());
    assert!(eigen.eigenvalues.iter().all(|&lambda| lambda > 0.0));
    assert!(max_abs(&(&inv - inv.transpose())) <= 1e-6 * max_abs(&inv));
}

#[test]
fn slightly_negative_eigenvalue_from_roundoff_is_tolerated() {
    let off = 1.0 + 1e-12;
    let m = DMatrix::from_row_slice(2, 2, &[1.0, off, off, 1.0]);
    let inv = safe_invert(&m).unwrap();
    assert!(inv.iter().all(|value| value.is_finite()));
}

#[test]
fn loading_absorbed_by_huge_entries_gives_up() {
    // 2e-14 of loading vanishes next to 1e20, so the matrix stays singular.
    let m = DMatrix::from_element(2, 2, 1e20);
    let err = safe_invert(&m).unwrap_err();
    assert!(matches!(err, SkyError::NumericalInstability(_)));
    assert_eq!(err.info().code, "loading-exhausted");
}

#[test]
fn empty_matrix_inverts_to_empty() {
    let inv = safe_invert(&DMatrix::zeros(0, 0)).unwrap();
    assert_eq!(inv.shape(), (0, 0));
}

#[test]
fn non_square_matrix_is_rejected() {
    let err = safe_invert(&DMatrix::zeros(2, 3)).unwrap_err();
    assert!(matches!(err, SkyError::NumericalInstability(_)));
    assert_eq!(err.info().code, "non-square");
}
