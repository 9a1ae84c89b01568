// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! High-order Hamilton-Jacobi ENO/WENO approximations to the gradient of a
//! scalar field on a uniform Cartesian grid, plus central differences and
//! the Laplacian.
//!
//! All reconstructions treat axes independently. Plus/minus outputs follow
//! the face-centered convention: position i of the plus derivative holds the
//! value at face i+1/2, position i of the minus derivative the value at face
//! i-1/2. Scratch difference arrays are overwritten per axis and are only
//! meaningful within a single call.

use crate::error::{LsmError, Result};
use crate::grid::{check_margin, check_spacing, shift, Field, IndexBox, Real, VectorField};

/// Regularization added to the WENO5 smoothness indicators.
pub const WENO_EPS: Real = 1e-6;

/// Widen a box by `lo` cells below and `hi` cells above along one axis.
fn widen<const N: usize>(b: &IndexBox<N>, axis: usize, lo: i32, hi: i32) -> IndexBox<N> {
    let mut out = *b;
    out.lower[axis] -= lo;
    out.upper[axis] += hi;
    out
}

/// Undivided first differences along `axis`: d1[i] holds
/// `phi[i+1] - phi[i]` (face i+1/2).
fn compute_d1<const N: usize>(d1: &mut Field<N>, phi: &Field<N>, span: &IndexBox<N>, axis: usize) {
    span.for_each(|idx| d1[idx] = phi[shift(idx, axis, 1)] - phi[idx]);
}

/// Undivided second differences at cells: d2[i] = d1[i] - d1[i-1].
fn compute_d2<const N: usize>(d2: &mut Field<N>, d1: &Field<N>, span: &IndexBox<N>, axis: usize) {
    span.for_each(|idx| d2[idx] = d1[idx] - d1[shift(idx, axis, -1)]);
}

/// Undivided third differences at faces: d3[i] = d2[i+1] - d2[i].
fn compute_d3<const N: usize>(d3: &mut Field<N>, d2: &Field<N>, span: &IndexBox<N>, axis: usize) {
    span.for_each(|idx| d3[idx] = d2[shift(idx, axis, 1)] - d2[idx]);
}

/// Pick the candidate difference with the smaller magnitude; ties go to the
/// downstream (higher-index) stencil. Returns the value and whether the
/// left candidate won.
#[inline]
fn choose(left: Real, right: Real) -> (Real, bool) {
    if left.abs() < right.abs() {
        (left, true)
    } else {
        (right, false)
    }
}

#[inline]
fn eno2_minus<const N: usize>(
    d1: &Field<N>,
    d2: &Field<N>,
    idx: [i32; N],
    axis: usize,
    h: Real,
) -> Real {
    let (sel, _) = choose(d2[shift(idx, axis, -1)], d2[idx]);
    (d1[shift(idx, axis, -1)] + 0.5 * sel) / h
}

#[inline]
fn eno2_plus<const N: usize>(
    d1: &Field<N>,
    d2: &Field<N>,
    idx: [i32; N],
    axis: usize,
    h: Real,
) -> Real {
    let (sel, _) = choose(d2[idx], d2[shift(idx, axis, 1)]);
    (d1[idx] - 0.5 * sel) / h
}

#[inline]
fn eno3_minus<const N: usize>(
    d1: &Field<N>,
    d2: &Field<N>,
    d3: &Field<N>,
    idx: [i32; N],
    axis: usize,
    h: Real,
) -> Real {
    let (sel2, left) = choose(d2[shift(idx, axis, -1)], d2[idx]);
    // Left second-difference stencil starts at i-2, right at i-1.
    let kstar = if left { -2 } else { -1 };
    let (sel3, _) = choose(d3[shift(idx, axis, kstar)], d3[shift(idx, axis, kstar + 1)]);
    let t3 = if left { sel3 / 3.0 } else { -sel3 / 6.0 };
    (d1[shift(idx, axis, -1)] + 0.5 * sel2 + t3) / h
}

#[inline]
fn eno3_plus<const N: usize>(
    d1: &Field<N>,
    d2: &Field<N>,
    d3: &Field<N>,
    idx: [i32; N],
    axis: usize,
    h: Real,
) -> Real {
    let (sel2, left) = choose(d2[idx], d2[shift(idx, axis, 1)]);
    let kstar = if left { -1 } else { 0 };
    let (sel3, _) = choose(d3[shift(idx, axis, kstar)], d3[shift(idx, axis, kstar + 1)]);
    let t3 = if left { -sel3 / 6.0 } else { sel3 / 3.0 };
    (d1[idx] - 0.5 * sel2 + t3) / h
}

/// Combine five consecutive first-difference quotients into the WENO5
/// reconstruction (Jiang-Peng weights, 0.1/0.6/0.3 optima).
#[inline]
fn weno5_combine(v1: Real, v2: Real, v3: Real, v4: Real, v5: Real) -> Real {
    let c1 = v1 / 3.0 - 7.0 * v2 / 6.0 + 11.0 * v3 / 6.0;
    let c2 = -v2 / 6.0 + 5.0 * v3 / 6.0 + v4 / 3.0;
    let c3 = v3 / 3.0 + 5.0 * v4 / 6.0 - v5 / 6.0;

    let s1 = 13.0 / 12.0 * (v1 - 2.0 * v2 + v3) * (v1 - 2.0 * v2 + v3)
        + 0.25 * (v1 - 4.0 * v2 + 3.0 * v3) * (v1 - 4.0 * v2 + 3.0 * v3);
    let s2 = 13.0 / 12.0 * (v2 - 2.0 * v3 + v4) * (v2 - 2.0 * v3 + v4)
        + 0.25 * (v2 - v4) * (v2 - v4);
    let s3 = 13.0 / 12.0 * (v3 - 2.0 * v4 + v5) * (v3 - 2.0 * v4 + v5)
        + 0.25 * (3.0 * v3 - 4.0 * v4 + v5) * (3.0 * v3 - 4.0 * v4 + v5);

    let a1 = 0.1 / ((s1 + WENO_EPS) * (s1 + WENO_EPS));
    let a2 = 0.6 / ((s2 + WENO_EPS) * (s2 + WENO_EPS));
    let a3 = 0.3 / ((s3 + WENO_EPS) * (s3 + WENO_EPS));
    let sum = a1 + a2 + a3;

    (a1 * c1 + a2 * c2 + a3 * c3) / sum
}

#[inline]
fn weno5_minus<const N: usize>(d1: &Field<N>, idx: [i32; N], axis: usize, h: Real) -> Real {
    weno5_combine(
        d1[shift(idx, axis, -3)] / h,
        d1[shift(idx, axis, -2)] / h,
        d1[shift(idx, axis, -1)] / h,
        d1[idx] / h,
        d1[shift(idx, axis, 1)] / h,
    )
}

#[inline]
fn weno5_plus<const N: usize>(d1: &Field<N>, idx: [i32; N], axis: usize, h: Real) -> Real {
    weno5_combine(
        d1[shift(idx, axis, 2)] / h,
        d1[shift(idx, axis, 1)] / h,
        d1[idx] / h,
        d1[shift(idx, axis, -1)] / h,
        d1[shift(idx, axis, -2)] / h,
    )
}

fn check_plus_minus<const N: usize>(
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    width: i32,
) -> Result<()> {
    check_spacing(dx)?;
    check_margin(phi.ghost_box(), fill_box, width, "phi")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;
    Ok(())
}

/// First-order Hamilton-Jacobi ENO approximations to the forward (plus)
/// and backward (minus) gradient of `phi` over the fill box.
///
/// # Parameters
/// - `grad_phi_plus`, `grad_phi_minus`: one-sided gradient outputs
/// - `phi`: scalar field with at least 1 ghost cell around the fill box
/// - `d1`: scratch for undivided first differences
/// - `fill_box`: index range where results are written
/// - `dx`: grid spacing per axis
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn hj_eno1<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_plus_minus(grad_phi_plus, grad_phi_minus, phi, fill_box, dx, 1)?;
    check_margin(d1.ghost_box(), fill_box, 1, "d1")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 1, 0), axis);
        fill_box.for_each(|idx| {
            grad_phi_minus[axis][idx] = d1[shift(idx, axis, -1)] / h;
            grad_phi_plus[axis][idx] = d1[idx] / h;
        });
    }
    Ok(())
}

/// Second-order Hamilton-Jacobi ENO approximations to the forward (plus)
/// and backward (minus) gradient of `phi` over the fill box.
///
/// The reconstruction keeps the candidate second difference of smaller
/// magnitude, ties preferring the downstream stencil.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn hj_eno2<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    d2: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_plus_minus(grad_phi_plus, grad_phi_minus, phi, fill_box, dx, 2)?;
    check_margin(d1.ghost_box(), fill_box, 2, "d1")?;
    check_margin(d2.ghost_box(), fill_box, 2, "d2")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 2, 1), axis);
        compute_d2(d2, d1, &widen(fill_box, axis, 1, 1), axis);
        fill_box.for_each(|idx| {
            grad_phi_minus[axis][idx] = eno2_minus(d1, d2, idx, axis, h);
            grad_phi_plus[axis][idx] = eno2_plus(d1, d2, idx, axis, h);
        });
    }
    Ok(())
}

/// Third-order Hamilton-Jacobi ENO approximations to the forward (plus)
/// and backward (minus) gradient of `phi` over the fill box.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn hj_eno3<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    d2: &mut Field<N>,
    d3: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_plus_minus(grad_phi_plus, grad_phi_minus, phi, fill_box, dx, 3)?;
    check_margin(d1.ghost_box(), fill_box, 3, "d1")?;
    check_margin(d2.ghost_box(), fill_box, 3, "d2")?;
    check_margin(d3.ghost_box(), fill_box, 3, "d3")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 3, 2), axis);
        compute_d2(d2, d1, &widen(fill_box, axis, 2, 2), axis);
        compute_d3(d3, d2, &widen(fill_box, axis, 2, 1), axis);
        fill_box.for_each(|idx| {
            grad_phi_minus[axis][idx] = eno3_minus(d1, d2, d3, idx, axis, h);
            grad_phi_plus[axis][idx] = eno3_plus(d1, d2, d3, idx, axis, h);
        });
    }
    Ok(())
}

/// Fifth-order Hamilton-Jacobi WENO approximations to the forward (plus)
/// and backward (minus) gradient of `phi` over the fill box.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn hj_weno5<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_plus_minus(grad_phi_plus, grad_phi_minus, phi, fill_box, dx, 3)?;
    check_margin(d1.ghost_box(), fill_box, 3, "d1")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 3, 2), axis);
        fill_box.for_each(|idx| {
            grad_phi_minus[axis][idx] = weno5_minus(d1, idx, axis, h);
            grad_phi_plus[axis][idx] = weno5_plus(d1, idx, axis, h);
        });
    }
    Ok(())
}

fn check_upwind<const N: usize>(
    grad_phi: &VectorField<N>,
    phi: &Field<N>,
    vel: &VectorField<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    width: i32,
) -> Result<()> {
    check_spacing(dx)?;
    check_margin(phi.ghost_box(), fill_box, width, "phi")?;
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;
    check_margin(vel.ghost_box(), fill_box, 0, "vel")?;
    Ok(())
}

/// First-order ENO upwind gradient of `phi`: per axis, the one-sided
/// derivative selected by the velocity sign (positive takes the backward
/// difference, negative the forward one, zero yields zero).
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn upwind_hj_eno1<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    vel: &VectorField<N>,
    d1: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_upwind(grad_phi, phi, vel, fill_box, dx, 1)?;
    check_margin(d1.ghost_box(), fill_box, 1, "d1")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 1, 0), axis);
        fill_box.for_each(|idx| {
            let v = vel[axis][idx];
            grad_phi[axis][idx] = if v > 0.0 {
                d1[shift(idx, axis, -1)] / h
            } else if v < 0.0 {
                d1[idx] / h
            } else {
                0.0
            };
        });
    }
    Ok(())
}

/// Second-order ENO upwind gradient of `phi` (velocity-sign selection as in
/// [`upwind_hj_eno1`]).
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn upwind_hj_eno2<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    vel: &VectorField<N>,
    d1: &mut Field<N>,
    d2: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_upwind(grad_phi, phi, vel, fill_box, dx, 2)?;
    check_margin(d1.ghost_box(), fill_box, 2, "d1")?;
    check_margin(d2.ghost_box(), fill_box, 2, "d2")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 2, 1), axis);
        compute_d2(d2, d1, &widen(fill_box, axis, 1, 1), axis);
        fill_box.for_each(|idx| {
            let v = vel[axis][idx];
            grad_phi[axis][idx] = if v > 0.0 {
                eno2_minus(d1, d2, idx, axis, h)
            } else if v < 0.0 {
                eno2_plus(d1, d2, idx, axis, h)
            } else {
                0.0
            };
        });
    }
    Ok(())
}

/// Third-order ENO upwind gradient of `phi` (velocity-sign selection as in
/// [`upwind_hj_eno1`]).
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn upwind_hj_eno3<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    vel: &VectorField<N>,
    d1: &mut Field<N>,
    d2: &mut Field<N>,
    d3: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_upwind(grad_phi, phi, vel, fill_box, dx, 3)?;
    check_margin(d1.ghost_box(), fill_box, 3, "d1")?;
    check_margin(d2.ghost_box(), fill_box, 3, "d2")?;
    check_margin(d3.ghost_box(), fill_box, 3, "d3")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 3, 2), axis);
        compute_d2(d2, d1, &widen(fill_box, axis, 2, 2), axis);
        compute_d3(d3, d2, &widen(fill_box, axis, 2, 1), axis);
        fill_box.for_each(|idx| {
            let v = vel[axis][idx];
            grad_phi[axis][idx] = if v > 0.0 {
                eno3_minus(d1, d2, d3, idx, axis, h)
            } else if v < 0.0 {
                eno3_plus(d1, d2, d3, idx, axis, h)
            } else {
                0.0
            };
        });
    }
    Ok(())
}

/// Fifth-order WENO upwind gradient of `phi` (velocity-sign selection as in
/// [`upwind_hj_eno1`]).
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn upwind_hj_weno5<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    vel: &VectorField<N>,
    d1: &mut Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_upwind(grad_phi, phi, vel, fill_box, dx, 3)?;
    check_margin(d1.ghost_box(), fill_box, 3, "d1")?;

    for axis in 0..N {
        let h = dx[axis];
        compute_d1(d1, phi, &widen(fill_box, axis, 3, 2), axis);
        fill_box.for_each(|idx| {
            let v = vel[axis][idx];
            grad_phi[axis][idx] = if v > 0.0 {
                weno5_minus(d1, idx, axis, h)
            } else if v < 0.0 {
                weno5_plus(d1, idx, axis, h)
            } else {
                0.0
            };
        });
    }
    Ok(())
}

/// Second-order central-difference gradient of `phi`:
/// `(phi[i+1] - phi[i-1]) / (2 dx)` per axis.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn central_grad_order2<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_spacing(dx)?;
    check_margin(phi.ghost_box(), fill_box, 1, "phi")?;
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;

    for axis in 0..N {
        let inv = 0.5 / dx[axis];
        fill_box.for_each(|idx| {
            grad_phi[axis][idx] = (phi[shift(idx, axis, 1)] - phi[shift(idx, axis, -1)]) * inv;
        });
    }
    Ok(())
}

/// Fourth-order central-difference gradient of `phi`:
/// `(-phi[i+2] + 8 phi[i+1] - 8 phi[i-1] + phi[i-2]) / (12 dx)` per axis.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn central_grad_order4<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_spacing(dx)?;
    check_margin(phi.ghost_box(), fill_box, 2, "phi")?;
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;

    for axis in 0..N {
        let inv = 1.0 / (12.0 * dx[axis]);
        fill_box.for_each(|idx| {
            grad_phi[axis][idx] = (-phi[shift(idx, axis, 2)] + 8.0 * phi[shift(idx, axis, 1)]
                - 8.0 * phi[shift(idx, axis, -1)]
                + phi[shift(idx, axis, -2)])
                * inv;
        });
    }
    Ok(())
}

/// Second-order central-difference Laplacian of `phi`.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin
/// or a spacing is not positive and finite.
pub fn laplacian_order2<const N: usize>(
    laplacian_phi: &mut Field<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_spacing(dx)?;
    check_margin(phi.ghost_box(), fill_box, 1, "phi")?;
    check_margin(laplacian_phi.ghost_box(), fill_box, 0, "laplacian_phi")?;

    let mut inv_sq = [0.0 as Real; N];
    for d in 0..N {
        inv_sq[d] = 1.0 / (dx[d] * dx[d]);
    }
    fill_box.for_each(|idx| {
        let mut sum = 0.0;
        for axis in 0..N {
            sum += (phi[shift(idx, axis, 1)] - 2.0 * phi[idx] + phi[shift(idx, axis, -1)])
                * inv_sq[axis];
        }
        laplacian_phi[idx] = sum;
    });
    Ok(())
}

/// Number of distinct off-diagonal Hessian components in N dimensions.
pub const fn num_cross_terms(n: usize) -> usize {
    n * (n - 1) / 2
}

/// Second-order central-difference Hessian of `phi`: diagonal second
/// partials per axis and off-diagonal mixed partials ordered
/// (0,1), (0,2), (1,2).
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin,
/// a spacing is not positive and finite, or `hess_cross` has the wrong
/// number of components.
pub fn central_hessian_order2<const N: usize>(
    hess_diag: &mut VectorField<N>,
    hess_cross: &mut [Field<N>],
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
) -> Result<()> {
    check_spacing(dx)?;
    if hess_cross.len() != num_cross_terms(N) {
        return Err(LsmError::ShapeMismatch {
            expected: vec![num_cross_terms(N)],
            got: vec![hess_cross.len()],
        });
    }
    check_margin(phi.ghost_box(), fill_box, 1, "phi")?;
    check_margin(hess_diag.ghost_box(), fill_box, 0, "hess_diag")?;
    for f in hess_cross.iter() {
        check_margin(f.ghost_box(), fill_box, 0, "hess_cross")?;
    }

    for axis in 0..N {
        let inv_sq = 1.0 / (dx[axis] * dx[axis]);
        fill_box.for_each(|idx| {
            hess_diag[axis][idx] =
                (phi[shift(idx, axis, 1)] - 2.0 * phi[idx] + phi[shift(idx, axis, -1)]) * inv_sq;
        });
    }

    let mut c = 0;
    for a in 0..N {
        for b in (a + 1)..N {
            let inv = 0.25 / (dx[a] * dx[b]);
            let out = &mut hess_cross[c];
            fill_box.for_each(|idx| {
                let pp = phi[shift(shift(idx, a, 1), b, 1)];
                let pm = phi[shift(shift(idx, a, 1), b, -1)];
                let mp = phi[shift(shift(idx, a, -1), b, 1)];
                let mm = phi[shift(shift(idx, a, -1), b, -1)];
                out[idx] = (pp - pm - mp + mm) * inv;
            });
            c += 1;
        }
    }
    Ok(())
}

/// Average of the plus and minus one-sided gradients:
/// `(grad_phi_plus + grad_phi_minus) / 2` per component.
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the fill box.
pub fn average_grad_phi<const N: usize>(
    grad_phi: &mut VectorField<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;

    for axis in 0..N {
        fill_box.for_each(|idx| {
            grad_phi[axis][idx] = 0.5 * (grad_phi_plus[axis][idx] + grad_phi_minus[axis][idx]);
        });
    }
    Ok(())
}

/// phi-upwind gradient of an auxiliary function F: per axis, where phi is
/// positive the derivative is taken from the direction of smaller phi,
/// where phi is negative from the direction of larger phi, and where phi
/// vanishes the plus/minus average is used.
///
/// phi requires one ghost cell around the fill box for the neighbor
/// comparison.
///
/// # Errors
/// Returns an error without touching any output if a ghost box is too thin.
pub fn phi_upwind_grad_f<const N: usize>(
    grad_f: &mut VectorField<N>,
    grad_f_plus: &VectorField<N>,
    grad_f_minus: &VectorField<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(grad_f.ghost_box(), fill_box, 0, "grad_f")?;
    check_margin(grad_f_plus.ghost_box(), fill_box, 0, "grad_f_plus")?;
    check_margin(grad_f_minus.ghost_box(), fill_box, 0, "grad_f_minus")?;
    check_margin(phi.ghost_box(), fill_box, 1, "phi")?;

    for axis in 0..N {
        fill_box.for_each(|idx| {
            let p = phi[idx];
            let lo = phi[shift(idx, axis, -1)];
            let hi = phi[shift(idx, axis, 1)];
            grad_f[axis][idx] = if p > 0.0 {
                if hi < lo {
                    grad_f_plus[axis][idx]
                } else {
                    grad_f_minus[axis][idx]
                }
            } else if p < 0.0 {
                if hi > lo {
                    grad_f_plus[axis][idx]
                } else {
                    grad_f_minus[axis][idx]
                }
            } else {
                0.5 * (grad_f_plus[axis][idx] + grad_f_minus[axis][idx])
            };
        });
    }
    Ok(())
}
