pub mod grid;
pub mod interpolation;
pub mod linalg;
pub mod polyfit;

pub use grid::{GridError, RegularGrid};
pub use interpolation::{BoundaryPolicy, InterpolationError, LinearInterpolator};
pub use linalg::{DenseMatrix, LuDecomposition, LuError, lu_factorize, lu_solve};
pub use polyfit::{MAX_FIT_DEGREE, PolyFitError, PolynomialFit, fit_polynomial};

/// Relative closeness test used when comparing computed tables.
pub fn approx_eq(lhs: f64, rhs: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let diff = (lhs - rhs).abs();
    diff <= abs_tol || diff <= rel_tol * lhs.abs().max(rhs.abs())
}
