// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Additive contributions to the right-hand side of the level set evolution
//! equation `phi_t = ...`.
//!
//! Each term adds into an `lse_rhs` field that the caller zeroes first via
//! [`zero_out_lse_rhs`]; multi-physics runs invoke several terms against the
//! same right-hand side.

use crate::derivatives::num_cross_terms;
use crate::error::{LsmError, Result};
use crate::grid::{check_margin, Field, IndexBox, Real, VectorField};

/// Gradient magnitudes below this threshold make the curvature of a cell
/// undefined; such cells are skipped.
pub const CURVATURE_GRAD_TOL: Real = 1e-12;

/// Zero out the right-hand side of the level set equation over its whole
/// ghost box.
pub fn zero_out_lse_rhs<const N: usize>(lse_rhs: &mut Field<N>) {
    lse_rhs.fill(0.0);
}

/// Add the advection term `-V . grad(phi)` to the right-hand side, choosing
/// the upwind one-sided derivative per axis: where the velocity component is
/// positive the backward (minus) derivative is used, otherwise the forward
/// (plus) one.
///
/// # Errors
/// Returns an error without touching `lse_rhs` if any ghost box does not
/// cover the fill box.
pub fn add_advection_term<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel: &VectorField<N>,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(lse_rhs.ghost_box(), fill_box, 0, "lse_rhs")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;
    check_margin(vel.ghost_box(), fill_box, 0, "vel")?;

    fill_box.for_each(|idx| {
        let mut dot = 0.0;
        for axis in 0..N {
            let v = vel[axis][idx];
            let d = if v > 0.0 {
                grad_phi_minus[axis][idx]
            } else {
                grad_phi_plus[axis][idx]
            };
            dot += v * d;
        }
        lse_rhs[idx] -= dot;
    });
    Ok(())
}

/// Godunov Hamiltonian norm of the gradient at one cell, built from the
/// plus/minus one-sided derivatives and the sign of the normal velocity.
#[inline]
pub(crate) fn godunov_grad_norm<const N: usize>(
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    idx: [i32; N],
    vel_n: Real,
) -> Real {
    let mut sum = 0.0;
    for axis in 0..N {
        let p = grad_phi_plus[axis][idx];
        let m = grad_phi_minus[axis][idx];
        let term = if vel_n >= 0.0 {
            let m_pos = m.max(0.0);
            let p_neg = p.min(0.0);
            (m_pos * m_pos).max(p_neg * p_neg)
        } else {
            let m_neg = m.min(0.0);
            let p_pos = p.max(0.0);
            (m_neg * m_neg).max(p_pos * p_pos)
        };
        sum += term;
    }
    sum.sqrt()
}

/// Add the normal velocity term `-V_n |grad(phi)|` to the right-hand side,
/// with the gradient norm evaluated by the Godunov Hamiltonian.
///
/// # Errors
/// Returns an error without touching `lse_rhs` if any ghost box does not
/// cover the fill box.
pub fn add_normal_velocity_term<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel_n: &Field<N>,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(lse_rhs.ghost_box(), fill_box, 0, "lse_rhs")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;
    check_margin(vel_n.ghost_box(), fill_box, 0, "vel_n")?;

    fill_box.for_each(|idx| {
        let vn = vel_n[idx];
        lse_rhs[idx] -= vn * godunov_grad_norm(grad_phi_plus, grad_phi_minus, idx, vn);
    });
    Ok(())
}

/// Add the normal velocity term for a spatially constant `V_n`; no velocity
/// field (and no velocity ghost cells) required.
///
/// # Errors
/// Returns an error without touching `lse_rhs` if any ghost box does not
/// cover the fill box.
pub fn add_const_normal_velocity_term<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel_n: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(lse_rhs.ghost_box(), fill_box, 0, "lse_rhs")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;

    fill_box.for_each(|idx| {
        lse_rhs[idx] -= vel_n * godunov_grad_norm(grad_phi_plus, grad_phi_minus, idx, vel_n);
    });
    Ok(())
}

/// Add the mean-curvature term `-b kappa |grad(phi)|` to the right-hand
/// side, from central-difference first and second partials of phi.
///
/// `hess_cross` holds the mixed partials ordered (0,1), (0,2), (1,2). Cells
/// where |grad(phi)| falls below [`CURVATURE_GRAD_TOL`] are skipped.
///
/// # Errors
/// Returns an error without touching `lse_rhs` if any ghost box does not
/// cover the fill box or `hess_cross` has the wrong number of components.
pub fn add_curvature_term<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi: &VectorField<N>,
    hess_diag: &VectorField<N>,
    hess_cross: &[Field<N>],
    b: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    if hess_cross.len() != num_cross_terms(N) {
        return Err(LsmError::ShapeMismatch {
            expected: vec![num_cross_terms(N)],
            got: vec![hess_cross.len()],
        });
    }
    check_margin(lse_rhs.ghost_box(), fill_box, 0, "lse_rhs")?;
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;
    check_margin(hess_diag.ghost_box(), fill_box, 0, "hess_diag")?;
    for f in hess_cross {
        check_margin(f.ghost_box(), fill_box, 0, "hess_cross")?;
    }

    fill_box.for_each(|idx| {
        let mut g = [0.0 as Real; N];
        let mut norm_sq = 0.0;
        for axis in 0..N {
            g[axis] = grad_phi[axis][idx];
            norm_sq += g[axis] * g[axis];
        }
        if norm_sq.sqrt() < CURVATURE_GRAD_TOL {
            return;
        }

        // kappa |grad phi| = (sum_a phi_aa sum_{b != a} phi_b^2
        //                     - 2 sum_{a<b} phi_a phi_b phi_ab) / |grad phi|^2
        let mut numerator = 0.0;
        for axis in 0..N {
            numerator += hess_diag[axis][idx] * (norm_sq - g[axis] * g[axis]);
        }
        let mut c = 0;
        for a in 0..N {
            for bb in (a + 1)..N {
                numerator -= 2.0 * g[a] * g[bb] * hess_cross[c][idx];
                c += 1;
            }
        }
        lse_rhs[idx] -= b * numerator / norm_sq;
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivatives::{central_grad_order2, central_hessian_order2};

    #[test]
    fn advection_picks_upwind_side() {
        let fill = IndexBox::new([0, 0], [3, 3]).unwrap();
        let gb = fill.grow(1);
        let mut rhs = Field::zeros(gb);
        let plus = VectorField::from_fn(gb, |_, _| 2.0);
        let minus = VectorField::from_fn(gb, |_, _| 5.0);

        let vel = VectorField::from_fn(gb, |a, _| if a == 0 { 1.0 } else { -1.0 });
        add_advection_term(&mut rhs, &plus, &minus, &vel, &fill).unwrap();
        // axis 0: v=+1 uses minus (5); axis 1: v=-1 uses plus (2).
        fill.for_each(|idx| assert_eq!(rhs[idx], -(1.0 * 5.0 + (-1.0) * 2.0)));
    }

    #[test]
    fn advection_terms_compose() {
        let fill = IndexBox::new([0], [3]).unwrap();
        let gb = fill.grow(1);
        let mut rhs = Field::zeros(gb);
        let plus = VectorField::from_fn(gb, |_, _| 1.0);
        let minus = VectorField::from_fn(gb, |_, _| 1.0);
        let vel = VectorField::from_fn(gb, |_, _| 2.0);
        add_advection_term(&mut rhs, &plus, &minus, &vel, &fill).unwrap();
        add_advection_term(&mut rhs, &plus, &minus, &vel, &fill).unwrap();
        fill.for_each(|idx| assert_eq!(rhs[idx], -4.0));
    }

    #[test]
    fn godunov_norm_positive_speed() {
        let fill = IndexBox::new([0], [0]).unwrap();
        let gb = fill.grow(1);
        let mut rhs = Field::zeros(gb);
        // Expanding front (vn > 0): entropy-satisfying choice keeps
        // max(max(minus, 0)^2, min(plus, 0)^2).
        let plus = VectorField::from_fn(gb, |_, _| -1.0);
        let minus = VectorField::from_fn(gb, |_, _| 3.0);
        add_const_normal_velocity_term(&mut rhs, &plus, &minus, 2.0, &fill).unwrap();
        // norm = max(3, |-1|) = 3, rhs = -2 * 3
        assert!((rhs[[0]] + 6.0).abs() < 1e-12);

        zero_out_lse_rhs(&mut rhs);
        add_const_normal_velocity_term(&mut rhs, &plus, &minus, -2.0, &fill).unwrap();
        // vn < 0: max(min(minus,0)^2, max(plus,0)^2) = 0
        assert_eq!(rhs[[0]], 0.0);
    }

    #[test]
    fn curvature_of_circle_matches_inverse_radius() {
        // Signed distance to a circle of radius 0.5; kappa = 1/r at radius r.
        let h = 0.02;
        let fill = IndexBox::new([-40, -40], [40, 40]).unwrap();
        let gb = fill.grow(1);
        let phi = Field::from_fn(gb, |[i, j]| {
            let x = i as Real * h;
            let y = j as Real * h;
            (x * x + y * y).sqrt() - 0.5
        });
        let mut grad = VectorField::zeros(gb);
        let mut diag = VectorField::zeros(gb);
        let mut cross = vec![Field::zeros(gb)];
        // Avoid the kink at the origin.
        let ring = IndexBox::new([20, 20], [30, 30]).unwrap();
        central_grad_order2(&mut grad, &phi, &ring, [h, h]).unwrap();
        central_hessian_order2(&mut diag, &mut cross, &phi, &ring, [h, h]).unwrap();

        let b = 0.01;
        let mut rhs = Field::zeros(gb);
        add_curvature_term(&mut rhs, &grad, &diag, &cross, b, &ring).unwrap();
        ring.for_each(|[i, j]| {
            let r = ((i * i + j * j) as Real).sqrt() * h;
            let expected = -b / r; // |grad phi| = 1 for a signed distance
            assert!(
                (rhs[[i, j]] - expected).abs() < 1e-3,
                "curvature term at r={}: {} vs {}",
                r,
                rhs[[i, j]],
                expected
            );
        });
    }

    #[test]
    fn flat_gradient_cell_is_skipped() {
        let fill = IndexBox::new([0], [0]).unwrap();
        let gb = fill.grow(1);
        let mut rhs = Field::zeros(gb);
        rhs[[0]] = 42.0;
        let grad = VectorField::zeros(gb);
        let diag = VectorField::from_fn(gb, |_, _| 1.0);
        add_curvature_term(&mut rhs, &grad, &diag, &[], 1.0, &fill).unwrap();
        assert_eq!(rhs[[0]], 42.0);
    }
}
