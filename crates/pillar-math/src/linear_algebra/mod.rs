//! Linear algebra utilities.
//!
//! Dense systems go through `nalgebra`; the tridiagonal solver backs the
//! cubic spline.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Pivots smaller than this are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-300;

/// Solves a tridiagonal system of equations with the Thomas algorithm.
///
/// The system has the form:
/// ```text
/// | b[0]  c[0]   0    ...      0   | | x[0]   |   | d[0]   |
/// | a[0]  b[1]  c[1]  ...      0   | | x[1]   |   | d[1]   |
/// |  0    a[1]  b[2]  ...      0   | | x[2]   | = | d[2]   |
/// | ...   ...   ...   ...     ...  | | ...    |   | ...    |
/// |  0     0     0   a[n-2] b[n-1] | | x[n-1] |   | d[n-1] |
/// ```
///
/// # Arguments
///
/// * `a` - Lower diagonal (length n-1)
/// * `b` - Main diagonal (length n)
/// * `c` - Upper diagonal (length n-1)
/// * `d` - Right-hand side (length n)
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> MathResult<Vec<f64>> {
    let n = b.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if a.len() != n - 1 || c.len() != n - 1 || d.len() != n {
        return Err(MathError::invalid_input(format!(
            "tridiagonal system has inconsistent dimensions: a={}, b={n}, c={}, d={}",
            a.len(),
            c.len(),
            d.len()
        )));
    }

    // Forward elimination
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if b[0].abs() < PIVOT_TOLERANCE {
        return Err(MathError::SingularMatrix);
    }
    if n > 1 {
        c_prime[0] = c[0] / b[0];
    }
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let denom = b[i] - a[i - 1] * c_prime[i - 1];
        if denom.abs() < PIVOT_TOLERANCE {
            return Err(MathError::SingularMatrix);
        }
        if i < n - 1 {
            c_prime[i] = c[i] / denom;
        }
        d_prime[i] = (d[i] - a[i - 1] * d_prime[i - 1]) / denom;
    }

    // Back substitution
    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        x[i] -= c_prime[i] * x[i + 1];
    }

    Ok(x)
}

/// Solves a dense linear system `Ax = b` by LU decomposition with partial
/// pivoting.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if n != b.len() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: n,
            rows2: b.len(),
            cols2: 1,
        });
    }

    let x = a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(MathError::SingularMatrix)
    }
}
