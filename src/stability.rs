// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! CFL-limited maximum stable time steps for the level-set evolution
//! terms. Callers running several terms combine the returned values by
//! minimum. A vanishing wave speed yields `Real::INFINITY`.

use crate::error::Result;
use crate::grid::{check_margin, check_spacing, Field, IndexBox, Real, VectorField};

/// Default CFL number.
pub const DEFAULT_CFL: Real = 0.9;

/// Maximum stable time step for the advection term:
/// `dt = cfl / sum_a (max_cell |V_a| / dx_a)`.
///
/// # Errors
/// Returns an error if the velocity ghost box does not cover the fill box
/// or a spacing is not positive and finite.
pub fn compute_stable_advection_dt<const N: usize>(
    vel: &VectorField<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    cfl: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    check_margin(vel.ghost_box(), fill_box, 0, "vel")?;

    let mut speed_sum = 0.0;
    for axis in 0..N {
        let mut max_v: Real = 0.0;
        fill_box.for_each(|idx| {
            max_v = max_v.max(vel[axis][idx].abs());
        });
        speed_sum += max_v / dx[axis];
    }
    if speed_sum == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / speed_sum)
}

/// Largest `|V_n| |grad(phi)|`-style wave speed over the fill box, with the
/// per-axis gradient bound `max(|phi_a_plus|, |phi_a_minus|) / dx_a`.
#[inline]
pub(crate) fn normal_speed_at<const N: usize>(
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    idx: [i32; N],
    dx: [Real; N],
) -> Real {
    let mut sum = 0.0;
    for axis in 0..N {
        let g = grad_phi_plus[axis][idx]
            .abs()
            .max(grad_phi_minus[axis][idx].abs())
            / dx[axis];
        sum += g * g;
    }
    sum.sqrt()
}

/// Maximum stable time step for the normal velocity term:
/// `dt = cfl / max_cell (|V_n| sqrt(sum_a max(|phi_a_plus|, |phi_a_minus|)^2 / dx_a^2))`.
///
/// # Errors
/// Returns an error if a ghost box does not cover the fill box or a spacing
/// is not positive and finite.
pub fn compute_stable_normal_vel_dt<const N: usize>(
    vel_n: &Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    cfl: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    check_margin(vel_n.ghost_box(), fill_box, 0, "vel_n")?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;

    let mut max_speed: Real = 0.0;
    fill_box.for_each(|idx| {
        let speed = vel_n[idx].abs() * normal_speed_at(grad_phi_plus, grad_phi_minus, idx, dx);
        max_speed = max_speed.max(speed);
    });
    if max_speed == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / max_speed)
}

/// Maximum stable time step for a spatially constant normal velocity.
///
/// # Errors
/// Returns an error if a ghost box does not cover the fill box or a spacing
/// is not positive and finite.
pub fn compute_stable_const_normal_vel_dt<const N: usize>(
    vel_n: Real,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    cfl: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    check_margin(grad_phi_plus.ghost_box(), fill_box, 0, "grad_phi_plus")?;
    check_margin(grad_phi_minus.ghost_box(), fill_box, 0, "grad_phi_minus")?;

    let mut max_grad: Real = 0.0;
    fill_box.for_each(|idx| {
        max_grad = max_grad.max(normal_speed_at(grad_phi_plus, grad_phi_minus, idx, dx));
    });
    let max_speed = vel_n.abs() * max_grad;
    if max_speed == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / max_speed)
}

/// Maximum stable time step for the mean-curvature term:
/// `dt = cfl / (2 |b| sum_a 1/dx_a^2)` (parabolic restriction).
///
/// # Errors
/// Returns an error if a spacing is not positive and finite.
pub fn compute_stable_curvature_dt<const N: usize>(
    b: Real,
    dx: [Real; N],
    cfl: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    let mut inv_sum = 0.0;
    for &h in dx.iter() {
        inv_sum += 1.0 / (h * h);
    }
    let rate = 2.0 * b.abs() * inv_sum;
    if rate == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advection_dt_sums_axis_speeds() {
        let fill = IndexBox::new([0, 0], [4, 4]).unwrap();
        let gb = fill.grow(1);
        let vel = VectorField::from_fn(gb, |a, _| if a == 0 { 2.0 } else { -1.0 });
        let dt = compute_stable_advection_dt(&vel, &fill, [0.1, 0.2], DEFAULT_CFL).unwrap();
        // speed = 2/0.1 + 1/0.2 = 25
        assert!((dt - DEFAULT_CFL / 25.0).abs() < 1e-12);
    }

    #[test]
    fn zero_velocity_is_unrestricted() {
        let fill = IndexBox::new([0], [4]).unwrap();
        let vel = VectorField::zeros(fill);
        let dt = compute_stable_advection_dt(&vel, &fill, [0.1], DEFAULT_CFL).unwrap();
        assert!(dt.is_infinite());
    }

    #[test]
    fn normal_vel_dt_uses_largest_one_sided_gradient() {
        let fill = IndexBox::new([0], [4]).unwrap();
        let gb = fill.grow(1);
        let plus = VectorField::from_fn(gb, |_, _| 0.5);
        let minus = VectorField::from_fn(gb, |_, _| -2.0);
        let vel_n = Field::from_fn(gb, |_| 3.0);
        let dt =
            compute_stable_normal_vel_dt(&vel_n, &plus, &minus, &fill, [0.5], DEFAULT_CFL).unwrap();
        // speed = 3 * (2/0.5) = 12
        assert!((dt - DEFAULT_CFL / 12.0).abs() < 1e-12);

        let dt_const =
            compute_stable_const_normal_vel_dt(3.0, &plus, &minus, &fill, [0.5], DEFAULT_CFL)
                .unwrap();
        assert!((dt_const - dt).abs() < 1e-12);
    }

    #[test]
    fn curvature_dt_parabolic_scaling() {
        let dt = compute_stable_curvature_dt::<2>(0.01, [0.1, 0.1], DEFAULT_CFL).unwrap();
        // rate = 2 * 0.01 * (100 + 100) = 4
        assert!((dt - DEFAULT_CFL / 4.0).abs() < 1e-12);
        // Halving h quarters dt.
        let dt_fine = compute_stable_curvature_dt::<2>(0.01, [0.05, 0.05], DEFAULT_CFL).unwrap();
        assert!((dt_fine - dt / 4.0).abs() < 1e-12);
        assert!(compute_stable_curvature_dt::<2>(0.0, [0.1, 0.1], DEFAULT_CFL)
            .unwrap()
            .is_infinite());
    }
}
