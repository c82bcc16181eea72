//! Direct solvers for tridiagonal and cyclic tridiagonal linear systems.

use pathline_core::{PathError, Result};

/// Pivots below this magnitude are treated as a singular system.
const MIN_PIVOT: f64 = 1e-30;

/// Solve a tridiagonal system by forward elimination and back substitution.
///
/// Row `i` of the system reads
/// `lower[i] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1] = rhs[i]`,
/// with `lower[0]` and `upper[n-1]` ignored. Runs in O(n) and never
/// pivots; a vanishing pivot is reported instead of producing NaNs.
///
/// # Arguments
/// * `lower` - Sub-diagonal coefficients (first entry unused)
/// * `diag` - Main diagonal coefficients
/// * `upper` - Super-diagonal coefficients (last entry unused)
/// * `rhs` - Right-hand side
pub fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = diag.len();
    if n == 0 || lower.len() != n || upper.len() != n || rhs.len() != n {
        return Err(PathError::InvalidArgument(format!(
            "tridiagonal bands must share a nonzero length, got {}/{}/{}/{}",
            lower.len(),
            n,
            upper.len(),
            rhs.len()
        )));
    }

    let mut scratch = vec![0.0; n];
    let mut x = vec![0.0; n];

    let mut pivot = diag[0];
    if pivot.abs() < MIN_PIVOT {
        return Err(PathError::SingularSystem(
            "zero pivot in tridiagonal elimination at row 0".into(),
        ));
    }
    x[0] = rhs[0] / pivot;

    for i in 1..n {
        scratch[i] = upper[i - 1] / pivot;
        pivot = diag[i] - lower[i] * scratch[i];
        if pivot.abs() < MIN_PIVOT {
            return Err(PathError::SingularSystem(format!(
                "zero pivot in tridiagonal elimination at row {}",
                i
            )));
        }
        x[i] = (rhs[i] - lower[i] * x[i - 1]) / pivot;
    }

    for i in (0..n - 1).rev() {
        x[i] -= scratch[i + 1] * x[i + 1];
    }

    Ok(x)
}

/// Solve a cyclic tridiagonal system via the Sherman-Morrison correction.
///
/// The system is tridiagonal as in [`solve_tridiagonal`] plus two corner
/// entries coupling the first and last unknowns: `corner_top` sits at
/// `(0, n-1)` and `corner_bottom` at `(n-1, 0)`. The cyclic matrix is
/// split into a plain tridiagonal part and a rank-one update, so the cost
/// stays O(n) (two tridiagonal solves).
///
/// # Arguments
/// * `lower` - Sub-diagonal coefficients (first entry unused)
/// * `diag` - Main diagonal coefficients
/// * `upper` - Super-diagonal coefficients (last entry unused)
/// * `corner_top` - Matrix entry at row 0, column n-1
/// * `corner_bottom` - Matrix entry at row n-1, column 0
/// * `rhs` - Right-hand side
pub fn solve_cyclic_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    corner_top: f64,
    corner_bottom: f64,
    rhs: &[f64],
) -> Result<Vec<f64>> {
    let n = diag.len();
    if n < 2 {
        return Err(PathError::InvalidArgument(format!(
            "cyclic tridiagonal system needs at least 2 rows, got {}",
            n
        )));
    }
    if lower.len() != n || upper.len() != n || rhs.len() != n {
        return Err(PathError::InvalidArgument(format!(
            "tridiagonal bands must share one length, got {}/{}/{}/{}",
            lower.len(),
            n,
            upper.len(),
            rhs.len()
        )));
    }

    // Split M = T + u*v^T with u = (gamma, 0, .., corner_bottom) and
    // v = (1, 0, .., corner_top/gamma), absorbing the corners into a
    // rank-one update of a modified diagonal.
    let gamma = -diag[0];
    let mut modified = diag.to_vec();
    modified[0] = diag[0] - gamma;
    modified[n - 1] = diag[n - 1] - corner_top * corner_bottom / gamma;

    let x = solve_tridiagonal(lower, &modified, upper, rhs)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = corner_bottom;
    let z = solve_tridiagonal(lower, &modified, upper, &u)?;

    let v_dot_x = x[0] + corner_top * x[n - 1] / gamma;
    let v_dot_z = z[0] + corner_top * z[n - 1] / gamma;
    let denom = 1.0 + v_dot_z;
    if denom.abs() < MIN_PIVOT {
        return Err(PathError::SingularSystem(
            "degenerate rank-one correction in cyclic solve".into(),
        ));
    }

    let factor = v_dot_x / denom;
    let mut solution = x;
    for (s, zi) in solution.iter_mut().zip(z.iter()) {
        *s -= factor * zi;
    }

    Ok(solution)
}
