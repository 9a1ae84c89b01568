// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LsmError, Result};
use crate::grid::{shift, Field, IndexBox};

/// Which face of an axis a boundary writer fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundarySide {
    /// The low-index face of the axis.
    Lower,
    /// The high-index face of the axis.
    Upper,
}

impl BoundarySide {
    /// The two sides, in face-index order (lower, upper).
    pub const BOTH: [BoundarySide; 2] = [BoundarySide::Lower, BoundarySide::Upper];
}

/// The slab of ghost cells outside face (`axis`, `side`), spanning the full
/// cross-section of the ghost box on the other axes. Returns `None` when the
/// interior touches the ghost box on that face (nothing to fill).
fn ghost_slab<const N: usize>(
    ghost_box: &IndexBox<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Option<IndexBox<N>> {
    let mut slab = *ghost_box;
    match side {
        BoundarySide::Lower => {
            slab.upper[axis] = interior.lower[axis] - 1;
        }
        BoundarySide::Upper => {
            slab.lower[axis] = interior.upper[axis] + 1;
        }
    }
    if slab.upper[axis] < slab.lower[axis] {
        None
    } else {
        Some(slab)
    }
}

/// Distance (>= 1) of a ghost cell from the interior face, and the index of
/// the boundary cell it projects onto.
#[inline]
fn face_geometry<const N: usize>(
    idx: [i32; N],
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> (i32, [i32; N]) {
    match side {
        BoundarySide::Lower => {
            let mut b = idx;
            b[axis] = interior.lower[axis];
            (interior.lower[axis] - idx[axis], b)
        }
        BoundarySide::Upper => {
            let mut b = idx;
            b[axis] = interior.upper[axis];
            (idx[axis] - interior.upper[axis], b)
        }
    }
}

/// Sign of the inward direction along the axis: +1 on the lower side, -1 on
/// the upper side.
#[inline]
fn inward(side: BoundarySide) -> i32 {
    match side {
        BoundarySide::Lower => 1,
        BoundarySide::Upper => -1,
    }
}

fn check_interior<const N: usize>(
    phi: &Field<N>,
    interior: &IndexBox<N>,
    min_width: usize,
    axis: usize,
) -> Result<()> {
    if !phi.ghost_box().contains_box(interior) {
        return Err(LsmError::FillBoxNotContained {
            field: "phi",
            margin: 0,
        });
    }
    let size = interior.dims()[axis];
    if size < min_width {
        return Err(LsmError::InvalidGridShape { axis, size });
    }
    Ok(())
}

/// Homogeneous Neumann ghost cells for first-order (ENO1) stencils: every
/// ghost cell outside face (`axis`, `side`) is a copy of the nearest
/// interior cell.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`.
pub fn homogeneous_neumann_order1<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    check_interior(phi, interior, 1, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (_, b) = face_geometry(idx, interior, axis, side);
            phi[idx] = phi[b];
        });
    }
    Ok(())
}

/// Homogeneous Neumann ghost cells for higher-order (ENO2/ENO3/WENO5)
/// stencils: ghost cells are a reflection of the interior across the face.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is thinner than the ghost width on `axis`.
pub fn homogeneous_neumann_reflect<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    let width = ghost_width(phi.ghost_box(), interior, axis, side);
    check_interior(phi, interior, width, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (dist, b) = face_geometry(idx, interior, axis, side);
            let src = shift(b, axis, inward(side) * (dist - 1));
            phi[idx] = phi[src];
        });
    }
    Ok(())
}

/// Linear-extrapolation ghost cells: a ghost cell at distance m outside the
/// face gets `2*phi[boundary] - phi[boundary + m inward]`.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is too thin to supply the extrapolation
/// stencil.
pub fn linear_extrapolation<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    let width = ghost_width(phi.ghost_box(), interior, axis, side);
    check_interior(phi, interior, width + 1, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (dist, b) = face_geometry(idx, interior, axis, side);
            let inner = shift(b, axis, inward(side) * dist);
            phi[idx] = 2.0 * phi[b] - phi[inner];
        });
    }
    Ok(())
}

/// Quadratic-extrapolation ghost cells: the three-point analogue of
/// [`linear_extrapolation`], `3*phi[b] - 3*phi[b + m] + phi[b + 2m]`.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is too thin to supply the extrapolation
/// stencil.
pub fn quadratic_extrapolation<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    let width = ghost_width(phi.ghost_box(), interior, axis, side);
    check_interior(phi, interior, 2 * width + 1, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (dist, b) = face_geometry(idx, interior, axis, side);
            let inner = shift(b, axis, inward(side) * dist);
            let inner2 = shift(b, axis, inward(side) * 2 * dist);
            phi[idx] = 3.0 * phi[b] - 3.0 * phi[inner] + phi[inner2];
        });
    }
    Ok(())
}

/// Signed linear extrapolation: linear extrapolation with the outward slope
/// zeroed whenever it would move the extrapolated value back toward zero,
/// so ghost values keep the sign of the boundary cell. Used for level-set
/// functions to avoid spurious zero crossings in the ghost region.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is too thin on `axis`.
pub fn signed_linear_extrapolation<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    check_interior(phi, interior, 2, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (dist, b) = face_geometry(idx, interior, axis, side);
            let inner = shift(b, axis, inward(side));
            let slope = phi[b] - phi[inner];
            let slope = if slope * phi[b] > 0.0 { slope } else { 0.0 };
            phi[idx] = phi[b] + dist as crate::grid::Real * slope;
        });
    }
    Ok(())
}

/// Periodic ghost cells: ghost values wrap around from the interior slab on
/// the opposite side of the axis.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is thinner than the ghost width on `axis`.
pub fn periodic<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    wrap_impl(phi, interior, axis, side, 1.0)
}

/// Anti-periodic ghost cells: as [`periodic`] but with the wrapped values
/// negated.
///
/// # Errors
/// Returns an error if `interior` is not contained in the ghost box of
/// `phi`, or if the interior is thinner than the ghost width on `axis`.
pub fn anti_periodic<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> Result<()> {
    wrap_impl(phi, interior, axis, side, -1.0)
}

fn wrap_impl<const N: usize>(
    phi: &mut Field<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
    sign: crate::grid::Real,
) -> Result<()> {
    let width = ghost_width(phi.ghost_box(), interior, axis, side);
    check_interior(phi, interior, width, axis)?;
    if let Some(slab) = ghost_slab(phi.ghost_box(), interior, axis, side) {
        slab.for_each(|idx| {
            let (dist, _) = face_geometry(idx, interior, axis, side);
            let mut src = idx;
            src[axis] = match side {
                BoundarySide::Lower => interior.upper[axis] - (dist - 1),
                BoundarySide::Upper => interior.lower[axis] + (dist - 1),
            };
            phi[idx] = sign * phi[src];
        });
    }
    Ok(())
}

/// Ghost width outside face (`axis`, `side`), in cells.
fn ghost_width<const N: usize>(
    ghost_box: &IndexBox<N>,
    interior: &IndexBox<N>,
    axis: usize,
    side: BoundarySide,
) -> usize {
    let w = match side {
        BoundarySide::Lower => interior.lower[axis] - ghost_box.lower[axis],
        BoundarySide::Upper => ghost_box.upper[axis] - interior.upper[axis],
    };
    w.max(0) as usize
}
