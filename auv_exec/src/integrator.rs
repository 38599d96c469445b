//! # Explicit ODE integrator
//!
//! Single-step explicit (Euler) integration of a system of coupled first
//! order ODEs. Each equation `k` has a right hand side `f_k(x, y)` where `y`
//! holds the value of every equation at the previous sample. All equations
//! are stepped together: `y` is only updated once every equation has been
//! evaluated for the current sample.
//!
//! Malformed inputs (mismatched counts, empty axes, bad windows) never error.
//! Instead each equation gets an empty output sequence, so callers must check
//! the shape of the result before using it.

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used when deciding if a step size evenly divides a span.
const STEP_EPSILON: f64 = 1e-9;

/// Largest axis `build_x` will produce. Steps too small for the span to be
/// covered within this many points yield an empty axis.
pub const MAX_AXIS_POINTS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Right hand side evaluated at a sampled axis value.
pub type Rhs<'a> = &'a dyn Fn(f64, &[f64]) -> f64;

/// Right hand side evaluated at an integer axis index.
pub type IndexedRhs<'a> = &'a dyn Fn(usize, &[f64]) -> f64;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate forward over the whole of `x`.
///
/// `result[k][0] == f0[k]` and for `i > 0`
/// `result[k][i] = (x[i] - x[i-1]) * f[k](x[i-1], y) + y[k]`.
pub fn integrate(x: &[f64], f: &[Rhs], f0: &[f64]) -> Vec<Vec<f64>> {
    if f.len() != f0.len() || x.is_empty() {
        return empty_result(f.len());
    }

    let mut result: Vec<Vec<f64>> = f0
        .iter()
        .map(|&v| {
            let mut r = vec![0f64; x.len()];
            r[0] = v;
            r
        })
        .collect();

    let mut prev = f0.to_vec();
    let mut next = vec![0f64; f.len()];

    for i in 1..x.len() {
        let dx = x[i] - x[i - 1];

        for (j, f_j) in f.iter().enumerate() {
            next[j] = dx * f_j(x[i - 1], &prev) + prev[j];
        }

        for j in 0..f.len() {
            result[j][i] = next[j];
        }
        prev.copy_from_slice(&next);
    }

    result
}

/// Integrate forward over the index window `[x0, xf]` of `x`.
///
/// The right hand sides are given the integer index of the sample they are
/// evaluated at rather than its value. Output sequences have length
/// `xf - x0 + 1` and start at `f0`.
pub fn integrate_window(
    x: &[f64],
    x0: usize,
    xf: usize,
    f: &[IndexedRhs],
    f0: &[f64]
) -> Vec<Vec<f64>> {
    if f.len() != f0.len() || !window_valid(x, x0, xf) {
        return empty_result(f.len());
    }

    let len = xf - x0 + 1;
    let mut result: Vec<Vec<f64>> = f0
        .iter()
        .map(|&v| {
            let mut r = vec![0f64; len];
            r[0] = v;
            r
        })
        .collect();

    let mut prev = f0.to_vec();
    let mut next = vec![0f64; f.len()];

    for i in (x0 + 1)..=xf {
        let dx = x[i] - x[i - 1];

        for (j, f_j) in f.iter().enumerate() {
            next[j] = dx * f_j(i - 1, &prev) + prev[j];
        }

        for j in 0..f.len() {
            result[j][i - x0] = next[j];
        }
        prev.copy_from_slice(&next);
    }

    result
}

/// Integrate backward over the index window `[x0, xf]` of `x`, anchored at
/// the final values `ff`.
///
/// The last element of each output sequence is `ff[k]`, and for `i` running
/// from `xf` down to `x0 + 1`,
/// `result[k][i-1-x0] = (x[i-1] - x[i]) * f[k](i, y) + y[k]`.
pub fn integrate_backward(
    x: &[f64],
    x0: usize,
    xf: usize,
    f: &[IndexedRhs],
    ff: &[f64]
) -> Vec<Vec<f64>> {
    if f.len() != ff.len() || !window_valid(x, x0, xf) {
        return empty_result(f.len());
    }

    let len = xf - x0 + 1;
    let mut result: Vec<Vec<f64>> = ff
        .iter()
        .map(|&v| {
            let mut r = vec![0f64; len];
            r[len - 1] = v;
            r
        })
        .collect();

    let mut prev = ff.to_vec();
    let mut next = vec![0f64; f.len()];

    for i in ((x0 + 1)..=xf).rev() {
        let dx = x[i - 1] - x[i];

        for (j, f_j) in f.iter().enumerate() {
            next[j] = dx * f_j(i, &prev) + prev[j];
        }

        for j in 0..f.len() {
            result[j][i - 1 - x0] = next[j];
        }
        prev.copy_from_slice(&next);
    }

    result
}

/// Build an axis from `x_start` to `x_end` with step `dx`, then integrate
/// forward over it.
///
/// Returns the axis along with the integration result.
pub fn integrate_range(
    x_start: f64,
    x_end: f64,
    dx: f64,
    f: &[Rhs],
    f0: &[f64]
) -> (Vec<f64>, Vec<Vec<f64>>) {
    let x = build_x(x_start, x_end, dx);
    let result = integrate(&x, f, f0);
    (x, result)
}

/// Build an evenly spaced axis between `x_start` and `x_end`.
///
/// The sign of `dx` is ignored, the direction is taken from the endpoints.
/// The last point is always exactly `x_end`: if `dx` doesn't evenly divide
/// the span a final short segment is appended rather than overshooting.
///
/// A zero or non-finite step, non-finite endpoints, or a step so small that
/// the axis would exceed [`MAX_AXIS_POINTS`] produce an empty axis.
pub fn build_x(x_start: f64, x_end: f64, dx: f64) -> Vec<f64> {
    if dx == 0f64 || !dx.is_finite() || !x_start.is_finite() || !x_end.is_finite() {
        return vec![];
    }

    let span = x_end - x_start;
    let step = span.signum() * dx.abs();
    let num_steps = (span / dx).abs();

    // One extra point for the start and one for a possible short segment
    if !num_steps.is_finite() || num_steps + 2.0 > MAX_AXIS_POINTS as f64 {
        return vec![];
    }

    // Number of whole steps that fit in the span
    let whole_steps = (num_steps + STEP_EPSILON).floor();
    let mut num_points = whole_steps as usize + 1;

    // Append a short final segment if the step doesn't divide the span
    if num_steps - whole_steps > STEP_EPSILON {
        num_points += 1;
    }

    let mut x: Vec<f64> = (0..num_points)
        .map(|i| x_start + (i as f64) * step)
        .collect();

    if let Some(last) = x.last_mut() {
        *last = x_end;
    }

    x
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn empty_result(num_fns: usize) -> Vec<Vec<f64>> {
    vec![vec![]; num_fns]
}

fn window_valid(x: &[f64], x0: usize, xf: usize) -> bool {
    xf < x.len() && xf > x0
}
