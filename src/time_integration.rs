// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Total-variation-diminishing Runge-Kutta time integration, decomposed
//! into point-wise stage kernels (Shu-Osher form).
//!
//! The right-hand side passed to each stage is the one evaluated at that
//! stage's input; the caller recomputes it between stage invocations.
//! Ghost cells are never touched.

use crate::error::Result;
use crate::grid::{check_margin, Field, IndexBox, Real};

/// Single forward-Euler step: `u_next = u_cur + dt * rhs`.
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not cover
/// the fill box.
pub fn rk1_step<const N: usize>(
    u_next: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(u_next.ghost_box(), fill_box, 0, "u_next")?;
    check_margin(u_cur.ghost_box(), fill_box, 0, "u_cur")?;
    check_margin(rhs.ghost_box(), fill_box, 0, "rhs")?;

    fill_box.for_each(|idx| {
        u_next[idx] = u_cur[idx] + dt * rhs[idx];
    });
    Ok(())
}

/// First stage of second-order TVD Runge-Kutta; identical to a single
/// forward-Euler step.
///
/// # Errors
/// Returns an error without touching `u_stage1` if a ghost box does not
/// cover the fill box.
pub fn tvd_rk2_stage1<const N: usize>(
    u_stage1: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    rk1_step(u_stage1, u_cur, rhs, dt, fill_box)
}

/// Second (final) stage of second-order TVD Runge-Kutta:
/// `u_next = 1/2 u_cur + 1/2 u_stage1 + 1/2 dt * rhs`, with `rhs`
/// evaluated at `u_stage1`.
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not cover
/// the fill box.
pub fn tvd_rk2_stage2<const N: usize>(
    u_next: &mut Field<N>,
    u_stage1: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(u_next.ghost_box(), fill_box, 0, "u_next")?;
    check_margin(u_stage1.ghost_box(), fill_box, 0, "u_stage1")?;
    check_margin(u_cur.ghost_box(), fill_box, 0, "u_cur")?;
    check_margin(rhs.ghost_box(), fill_box, 0, "rhs")?;

    fill_box.for_each(|idx| {
        u_next[idx] = 0.5 * u_cur[idx] + 0.5 * (u_stage1[idx] + dt * rhs[idx]);
    });
    Ok(())
}

/// First stage of third-order TVD Runge-Kutta; identical to a single
/// forward-Euler step.
///
/// # Errors
/// Returns an error without touching `u_stage1` if a ghost box does not
/// cover the fill box.
pub fn tvd_rk3_stage1<const N: usize>(
    u_stage1: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    rk1_step(u_stage1, u_cur, rhs, dt, fill_box)
}

/// Second stage of third-order TVD Runge-Kutta:
/// `u_stage2 = 3/4 u_cur + 1/4 u_stage1 + 1/4 dt * rhs`, with `rhs`
/// evaluated at `u_stage1`.
///
/// # Errors
/// Returns an error without touching `u_stage2` if a ghost box does not
/// cover the fill box.
pub fn tvd_rk3_stage2<const N: usize>(
    u_stage2: &mut Field<N>,
    u_stage1: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(u_stage2.ghost_box(), fill_box, 0, "u_stage2")?;
    check_margin(u_stage1.ghost_box(), fill_box, 0, "u_stage1")?;
    check_margin(u_cur.ghost_box(), fill_box, 0, "u_cur")?;
    check_margin(rhs.ghost_box(), fill_box, 0, "rhs")?;

    fill_box.for_each(|idx| {
        u_stage2[idx] = 0.75 * u_cur[idx] + 0.25 * (u_stage1[idx] + dt * rhs[idx]);
    });
    Ok(())
}

/// Third (final) stage of third-order TVD Runge-Kutta:
/// `u_next = 1/3 u_cur + 2/3 u_stage2 + 2/3 dt * rhs`, with `rhs`
/// evaluated at `u_stage2`.
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not cover
/// the fill box.
pub fn tvd_rk3_stage3<const N: usize>(
    u_next: &mut Field<N>,
    u_stage2: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    fill_box: &IndexBox<N>,
) -> Result<()> {
    check_margin(u_next.ghost_box(), fill_box, 0, "u_next")?;
    check_margin(u_stage2.ghost_box(), fill_box, 0, "u_stage2")?;
    check_margin(u_cur.ghost_box(), fill_box, 0, "u_cur")?;
    check_margin(rhs.ghost_box(), fill_box, 0, "rhs")?;

    let third = 1.0 / 3.0;
    fill_box.for_each(|idx| {
        u_next[idx] = third * u_cur[idx] + 2.0 * third * (u_stage2[idx] + dt * rhs[idx]);
    });
    Ok(())
}
