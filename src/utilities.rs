// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Utility reductions over level-set fields: max-norm differences,
//! smoothed-Heaviside volume integrals, smoothed-delta surface integrals,
//! and segment sampling by multilinear interpolation.

use crate::error::{LsmError, Result};
use crate::grid::{check_margin, check_spacing, Field, IndexBox, Real, VectorField};

#[cfg(not(feature = "single-precision"))]
use std::f64::consts::PI;
#[cfg(feature = "single-precision")]
use std::f32::consts::PI;

/// Smoothed Heaviside with transition half-width `eps`.
#[inline]
fn smoothed_heaviside(s: Real, eps: Real) -> Real {
    if s < -eps {
        0.0
    } else if s > eps {
        1.0
    } else {
        0.5 * (1.0 + s / eps + (PI * s / eps).sin() / PI)
    }
}

/// Smoothed delta with support half-width `eps`.
#[inline]
fn smoothed_delta(s: Real, eps: Real) -> Real {
    if s.abs() > eps {
        0.0
    } else {
        (1.0 + (PI * s / eps).cos()) / (2.0 * eps)
    }
}

/// Maximum over the fill box of `|field1 - field2|`. Used as the
/// termination criterion for re-initialization loops.
///
/// # Errors
/// Returns an error if a ghost box does not cover the fill box.
pub fn max_norm_diff<const N: usize>(
    field1: &Field<N>,
    field2: &Field<N>,
    fill_box: &IndexBox<N>,
) -> Result<Real> {
    check_margin(field1.ghost_box(), fill_box, 0, "field1")?;
    check_margin(field2.ghost_box(), fill_box, 0, "field2")?;

    let mut max_diff: Real = 0.0;
    fill_box.for_each(|idx| {
        max_diff = max_diff.max((field1[idx] - field2[idx]).abs());
    });
    Ok(max_diff)
}

/// Integral of `psi` over the region where `phi < 0`, using the smoothed
/// Heaviside `H_eps(-phi)` and the cell volume `prod(dx)`.
///
/// # Errors
/// Returns an error if a ghost box does not cover the fill box or a
/// spacing is not positive and finite.
pub fn volume_integral<const N: usize>(
    psi: &Field<N>,
    phi: &Field<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    eps: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    check_margin(psi.ghost_box(), fill_box, 0, "psi")?;
    check_margin(phi.ghost_box(), fill_box, 0, "phi")?;

    let dv: Real = dx.iter().product();
    let mut total = 0.0;
    fill_box.for_each(|idx| {
        total += psi[idx] * smoothed_heaviside(-phi[idx], eps);
    });
    Ok(total * dv)
}

/// Integral of `psi` over the zero level set of `phi`, using the smoothed
/// delta `delta_eps(phi) |grad(phi)|` and the cell volume `prod(dx)`.
///
/// # Errors
/// Returns an error if a ghost box does not cover the fill box or a
/// spacing is not positive and finite.
pub fn surface_integral<const N: usize>(
    psi: &Field<N>,
    phi: &Field<N>,
    grad_phi: &VectorField<N>,
    fill_box: &IndexBox<N>,
    dx: [Real; N],
    eps: Real,
) -> Result<Real> {
    check_spacing(dx)?;
    check_margin(psi.ghost_box(), fill_box, 0, "psi")?;
    check_margin(phi.ghost_box(), fill_box, 0, "phi")?;
    check_margin(grad_phi.ghost_box(), fill_box, 0, "grad_phi")?;

    let dv: Real = dx.iter().product();
    let mut total = 0.0;
    fill_box.for_each(|idx| {
        let delta = smoothed_delta(phi[idx], eps);
        if delta == 0.0 {
            return;
        }
        let mut norm_sq = 0.0;
        for axis in 0..N {
            let g = grad_phi[axis][idx];
            norm_sq += g * g;
        }
        total += psi[idx] * delta * norm_sq.sqrt();
    });
    Ok(total * dv)
}

/// Sample `phi` at `n` equispaced points on the segment from `start` to
/// `end` by multilinear interpolation. Node coordinates are anchored at the
/// ghost-box lower corner: cell `idx` sits at `x_lo + (idx - lower) * dx`.
///
/// # Errors
/// Returns an error if a spacing is not positive and finite or a sample
/// point leaves the grid.
pub fn sample_on_segment<const N: usize>(
    phi: &Field<N>,
    x_lo: [Real; N],
    dx: [Real; N],
    start: [Real; N],
    end: [Real; N],
    n: usize,
) -> Result<Vec<Real>> {
    check_spacing(dx)?;

    let mut samples = Vec::with_capacity(n);
    for k in 0..n {
        let t = if n > 1 {
            k as Real / (n - 1) as Real
        } else {
            0.0
        };
        let mut base = [0i32; N];
        let mut frac = [0.0 as Real; N];
        for d in 0..N {
            let x = start[d] + t * (end[d] - start[d]);
            let u = (x - x_lo[d]) / dx[d];
            let cell = u.floor();
            base[d] = phi.ghost_box().lower[d] + cell as i32;
            frac[d] = u - cell;
        }

        let gb = *phi.ghost_box();
        let mut corner_hi = base;
        for d in 0..N {
            corner_hi[d] += 1;
        }
        if !gb.contains(base) || !gb.contains(corner_hi) {
            return Err(LsmError::Other(format!(
                "sample point {} on segment leaves the grid at cell {:?}",
                k, base
            )));
        }

        let mut value = 0.0;
        for corner in 0..(1usize << N) {
            let mut idx = base;
            let mut weight: Real = 1.0;
            for d in 0..N {
                if corner & (1 << d) != 0 {
                    idx[d] += 1;
                    weight *= frac[d];
                } else {
                    weight *= 1.0 - frac[d];
                }
            }
            value += weight * phi[idx];
        }
        samples.push(value);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_norm_diff_basic() {
        let fill = IndexBox::new([0, 0], [3, 3]).unwrap();
        let f1 = Field::from_fn(fill, |[i, j]| (i + j) as Real);
        let mut f2 = f1.clone();
        f2[[2, 3]] += 0.75;
        assert_eq!(max_norm_diff(&f1, &f2, &fill).unwrap(), 0.75);
        assert_eq!(max_norm_diff(&f1, &f1, &fill).unwrap(), 0.0);
    }

    #[test]
    fn heaviside_limits() {
        assert_eq!(smoothed_heaviside(-1.0, 0.1), 0.0);
        assert_eq!(smoothed_heaviside(1.0, 0.1), 1.0);
        assert!((smoothed_heaviside(0.0, 0.1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn volume_of_circle() {
        // phi < 0 inside a circle of radius 0.5 on [-1,1]^2.
        let h = 2.0 / 100.0;
        let fill = IndexBox::new([-50, -50], [50, 50]).unwrap();
        let phi = Field::from_fn(fill, |[i, j]| {
            let x = i as Real * h;
            let y = j as Real * h;
            (x * x + y * y).sqrt() - 0.5
        });
        let psi = Field::from_fn(fill, |_| 1.0);
        let area = volume_integral(&psi, &phi, &fill, [h, h], 1.5 * h).unwrap();
        let exact = PI * 0.25;
        assert!(
            (area - exact).abs() < 0.01,
            "area {} vs {}",
            area,
            exact
        );
    }

    #[test]
    fn perimeter_of_circle() {
        let h = 2.0 / 128.0;
        let fill = IndexBox::new([-64, -64], [64, 64]).unwrap();
        let phi = Field::from_fn(fill, |[i, j]| {
            let x = i as Real * h;
            let y = j as Real * h;
            (x * x + y * y).sqrt() - 0.5
        });
        let psi = Field::from_fn(fill, |_| 1.0);
        // A signed distance has unit gradient.
        let grad = VectorField::from_fn(fill, |a, [i, j]| {
            let x = i as Real * h;
            let y = j as Real * h;
            let r = (x * x + y * y).sqrt().max(1e-12);
            if a == 0 {
                x / r
            } else {
                y / r
            }
        });
        let len = surface_integral(&psi, &phi, &grad, &fill, [h, h], 1.5 * h).unwrap();
        let exact = 2.0 * PI * 0.5;
        assert!((len - exact).abs() < 0.05, "perimeter {} vs {}", len, exact);
    }

    #[test]
    fn segment_sampling_is_linear_along_linear_data() {
        let gb = IndexBox::new([0, 0], [10, 10]).unwrap();
        let h = 0.1;
        let phi = Field::from_fn(gb, |[i, j]| i as Real * h + 2.0 * j as Real * h);
        let samples = sample_on_segment(
            &phi,
            [0.0, 0.0],
            [h, h],
            [0.05, 0.05],
            [0.85, 0.45],
            5,
        )
        .unwrap();
        assert_eq!(samples.len(), 5);
        for (k, &s) in samples.iter().enumerate() {
            let t = k as Real / 4.0;
            let x = 0.05 + t * 0.8;
            let y = 0.05 + t * 0.4;
            assert!((s - (x + 2.0 * y)).abs() < 1e-12, "sample {}: {}", k, s);
        }
    }

    #[test]
    fn segment_leaving_grid_is_rejected() {
        let gb = IndexBox::new([0], [4]).unwrap();
        let phi = Field::zeros(gb);
        let result = sample_on_segment(&phi, [0.0], [1.0], [0.0], [10.0], 3);
        assert!(matches!(result, Err(LsmError::Other(_))));
    }
}
