// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Fast Marching Method solvers on full 2D and 3D Cartesian grids: signed
//! distance functions, stationary Eikonal problems with a spatially varying
//! speed, and extension fields propagated along characteristics.
//!
//! The march is heap-ordered and single-pass: cells move Far -> Trial ->
//! Known in order of increasing |T|, and each accepted value is built from
//! Known upwind neighbors only. Arrays are flat, axis 0 fastest, one value
//! per grid node; there are no ghost cells at this surface.

mod heap;

use crate::error::{LsmError, Result};
use crate::grid::Real;
use heap::CellHeap;

/// Order of the upwind finite-difference scheme used by the march.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpatialDerivativeOrder {
    /// First-order one-sided differences.
    Order1,
    /// Second-order one-sided differences where two Known cells in a row
    /// are available, falling back to first order elsewhere.
    Order2,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Status {
    Far,
    Trial,
    Known,
    Outside,
}

/// Grid geometry shared by the marchers: shape, flat strides (axis 0
/// fastest), and spacing.
struct GridGeometry<const N: usize> {
    dims: [usize; N],
    strides: [usize; N],
    dx: [Real; N],
}

impl<const N: usize> GridGeometry<N> {
    fn new(grid_dims: [usize; N], dx: [Real; N]) -> Result<Self> {
        assert!(N == 2 || N == 3, "fast marching supports N=2 or N=3");
        for (axis, &size) in grid_dims.iter().enumerate() {
            if size < 2 {
                return Err(LsmError::InvalidGridShape { axis, size });
            }
        }
        for (axis, &h) in dx.iter().enumerate() {
            if !h.is_finite() || h <= 0.0 {
                return Err(LsmError::InvalidGridSpacing {
                    axis,
                    value: h as f64,
                });
            }
        }
        let mut strides = [0usize; N];
        strides[0] = 1;
        for d in 1..N {
            strides[d] = strides[d - 1] * grid_dims[d - 1];
        }
        Ok(GridGeometry {
            dims: grid_dims,
            strides,
            dx,
        })
    }

    fn num_nodes(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    fn neighbor(&self, flat: usize, axis: usize, dir: i32) -> Option<usize> {
        let coord = (flat / self.strides[axis]) % self.dims[axis];
        if dir < 0 {
            if coord == 0 {
                return None;
            }
            Some(flat - self.strides[axis])
        } else {
            if coord + 1 >= self.dims[axis] {
                return None;
            }
            Some(flat + self.strides[axis])
        }
    }
}

/// One axis's contribution to the upwind update at a cell.
#[derive(Clone, Copy)]
struct AxisTerm {
    /// |T| of the upwind Known neighbor.
    t1: Real,
    /// Flat index of that neighbor (extension-field donor).
    n1: usize,
    /// |T| of the second Known cell in the same direction, when the
    /// second-order switch applies.
    t2: Option<Real>,
}

fn check_len(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(LsmError::ShapeMismatch {
            expected: vec![expected],
            got: vec![len],
        });
    }
    Ok(())
}

/// Gather the per-axis upwind terms for a candidate update at `w`.
fn gather_terms<const N: usize>(
    geom: &GridGeometry<N>,
    status: &[Status],
    tt: &[Real],
    order: SpatialDerivativeOrder,
    w: usize,
) -> [Option<AxisTerm>; N] {
    let w_is_trial = status[w] == Status::Trial;
    let t_w = tt[w].abs();

    let mut terms = [None; N];
    for (axis, term) in terms.iter_mut().enumerate() {
        let mut best: Option<(Real, usize, i32)> = None;
        for dir in [-1, 1] {
            if let Some(nb) = geom.neighbor(w, axis, dir) {
                if status[nb] != Status::Known {
                    continue;
                }
                let t = tt[nb].abs();
                if w_is_trial && t > t_w {
                    continue;
                }
                if best.map_or(true, |(t_best, _, _)| t < t_best) {
                    best = Some((t, nb, dir));
                }
            }
        }
        *term = best.map(|(t1, n1, dir)| {
            let t2 = match order {
                SpatialDerivativeOrder::Order1 => None,
                SpatialDerivativeOrder::Order2 => geom
                    .neighbor(n1, axis, dir)
                    .filter(|&n2| status[n2] == Status::Known && tt[n2].abs() <= t1)
                    .map(|n2| tt[n2].abs()),
            };
            AxisTerm { t1, n1, t2 }
        });
    }
    terms
}

/// Quadratic coefficients of one axis: the update contributes
/// `(alpha T + beta)^2` to the Eikonal sum.
#[inline]
fn axis_coefficients(term: &AxisTerm, h: Real) -> (Real, Real) {
    match term.t2 {
        None => (1.0 / h, -term.t1 / h),
        Some(t2) => (1.5 / h, (-2.0 * term.t1 + 0.5 * t2) / h),
    }
}

/// Solve the upwind quadratic for the candidate |T| at a cell, applying the
/// causality correction: when the root fails to dominate every contributing
/// axis, the axis with the largest upwind value is dropped and the solve is
/// retried. Returns the accepted magnitude or None when no axis remains.
fn solve_candidate<const N: usize>(
    terms: &mut [Option<AxisTerm>; N],
    dx: [Real; N],
    rhs: Real,
) -> Option<Real> {
    loop {
        let mut a = 0.0;
        let mut b = 0.0;
        let mut c = -rhs;
        let mut max_t1: Option<(Real, usize)> = None;
        for (axis, term) in terms.iter().enumerate() {
            if let Some(term) = term {
                let (alpha, beta) = axis_coefficients(term, dx[axis]);
                a += alpha * alpha;
                b += 2.0 * alpha * beta;
                c += beta * beta;
                if max_t1.map_or(true, |(t, _)| term.t1 > t) {
                    max_t1 = Some((term.t1, axis));
                }
            }
        }
        let (largest_t1, largest_axis) = max_t1?;

        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let t = (-b + disc.sqrt()) / (2.0 * a);
            if t >= largest_t1 {
                return Some(t);
            }
        }
        terms[largest_axis] = None;
    }
}

/// Propagate the extension fields to `w` once its |T| has been accepted:
/// a weighted average over the contributing axes with the upwind scheme's
/// own weights, which keeps grad(E) . grad(T) = 0 to the scheme's order.
fn propagate_extension_fields<const N: usize>(
    terms: &[Option<AxisTerm>; N],
    dx: [Real; N],
    t_accepted: Real,
    w: usize,
    ext_fields: &mut [&mut [Real]],
) {
    if ext_fields.is_empty() {
        return;
    }
    let mut weights = [0.0 as Real; N];
    let mut weight_sum = 0.0;
    let mut count = 0usize;
    for (axis, term) in terms.iter().enumerate() {
        if let Some(term) = term {
            if term.t1 > t_accepted {
                continue;
            }
            let h_sq = dx[axis] * dx[axis];
            let weight = match term.t2 {
                None => (t_accepted - term.t1) / h_sq,
                Some(t2) => (1.5 * t_accepted - 2.0 * term.t1 + 0.5 * t2) / h_sq,
            };
            weights[axis] = weight.max(0.0);
            weight_sum += weights[axis];
            count += 1;
        }
    }
    if count == 0 {
        return;
    }
    for field in ext_fields.iter_mut() {
        let mut value = 0.0;
        if weight_sum > 0.0 {
            for (axis, term) in terms.iter().enumerate() {
                if let Some(term) = term {
                    if term.t1 <= t_accepted {
                        value += weights[axis] * field[term.n1];
                    }
                }
            }
            value /= weight_sum;
        } else {
            // Degenerate tie: every contributing neighbor carries |T| equal
            // to the accepted value; average them evenly.
            for term in terms.iter().flatten() {
                if term.t1 <= t_accepted {
                    value += field[term.n1];
                }
            }
            value /= count as Real;
        }
        field[w] = value;
    }
}

/// Recompute the candidate value of an unmasked, non-Known neighbor `w` of
/// a freshly Known cell, and fold it into the heap if it improves.
#[allow(clippy::too_many_arguments)]
fn update_neighbor<const N: usize>(
    geom: &GridGeometry<N>,
    order: SpatialDerivativeOrder,
    status: &mut [Status],
    heap: &mut CellHeap,
    tt: &mut [Real],
    w: usize,
    rhs: Real,
    sign: Real,
    ext_fields: &mut [&mut [Real]],
) {
    let mut terms = gather_terms(geom, status, tt, order, w);
    let Some(candidate) = solve_candidate(&mut terms, geom.dx, rhs) else {
        return;
    };
    if candidate >= tt[w].abs() {
        return;
    }

    tt[w] = sign * candidate;
    propagate_extension_fields(&terms, geom.dx, candidate, w, ext_fields);
    match status[w] {
        Status::Far => {
            status[w] = Status::Trial;
            heap.insert(w, candidate);
        }
        Status::Trial => heap.decrease_key(w, candidate),
        _ => unreachable!("only Far or Trial cells are updated"),
    }
}

/// Heap-ordered propagation sweep: extract the smallest-|T| Trial cell,
/// mark it Known, and recompute its eligible neighbors until the heap
/// drains.
#[allow(clippy::too_many_arguments)]
fn propagate<const N: usize>(
    geom: &GridGeometry<N>,
    order: SpatialDerivativeOrder,
    status: &mut [Status],
    heap: &mut CellHeap,
    tt: &mut [Real],
    speed: Option<&[Real]>,
    signs: Option<&[Real]>,
    ext_fields: &mut [&mut [Real]],
) {
    while let Some((cell, _)) = heap.extract_min() {
        status[cell] = Status::Known;
        relax_neighbors(
            geom, order, status, heap, tt, speed, signs, cell, ext_fields,
        );
    }
}

/// Recompute every unmasked, non-Known neighbor of `cell`.
#[allow(clippy::too_many_arguments)]
fn relax_neighbors<const N: usize>(
    geom: &GridGeometry<N>,
    order: SpatialDerivativeOrder,
    status: &mut [Status],
    heap: &mut CellHeap,
    tt: &mut [Real],
    speed: Option<&[Real]>,
    signs: Option<&[Real]>,
    cell: usize,
    ext_fields: &mut [&mut [Real]],
) {
    for axis in 0..N {
        for dir in [-1, 1] {
            let Some(w) = geom.neighbor(cell, axis, dir) else {
                continue;
            };
            if status[w] == Status::Known || status[w] == Status::Outside {
                continue;
            }
            let rhs = match speed {
                None => 1.0,
                Some(f) => 1.0 / (f[w] * f[w]),
            };
            let sign = match signs {
                None => 1.0,
                Some(phi) => {
                    if phi[w] < 0.0 {
                        -1.0
                    } else {
                        1.0
                    }
                }
            };
            update_neighbor(geom, order, status, heap, tt, w, rhs, sign, ext_fields);
        }
    }
}

/// Initialize the front for the signed-distance march: every unmasked cell
/// whose axis neighborhood crosses the zero level set of `phi` gets a
/// first-order distance from the per-axis zero crossings combined by
/// reciprocal sum of squares, becomes Known, and seeds the extension
/// fields from source values interpolated at the crossings.
#[allow(clippy::too_many_arguments)]
fn initialize_front<const N: usize>(
    geom: &GridGeometry<N>,
    phi: &[Real],
    status: &mut [Status],
    tt: &mut [Real],
    source_fields: &[&[Real]],
    ext_fields: &mut [&mut [Real]],
) -> Vec<usize> {
    let mut front = Vec::new();
    for c in 0..geom.num_nodes() {
        if status[c] == Status::Outside {
            continue;
        }
        let pc = phi[c];

        if pc == 0.0 {
            tt[c] = 0.0;
            status[c] = Status::Known;
            for (k, field) in ext_fields.iter_mut().enumerate() {
                field[c] = source_fields[k][c];
            }
            front.push(c);
            continue;
        }

        // Per-axis distance to the zero crossing, and the neighbor plus
        // interpolation fraction that realizes it.
        let mut crossing: [Option<(Real, usize, Real)>; N] = [None; N];
        let mut any = false;
        for (axis, slot) in crossing.iter_mut().enumerate() {
            for dir in [-1, 1] {
                let Some(nb) = geom.neighbor(c, axis, dir) else {
                    continue;
                };
                if status[nb] == Status::Outside {
                    continue;
                }
                let pn = phi[nb];
                if pc * pn >= 0.0 {
                    continue;
                }
                let frac = pc / (pc - pn);
                let dist = geom.dx[axis] * frac;
                if slot.map_or(true, |(d, _, _)| dist < d) {
                    *slot = Some((dist, nb, frac));
                }
            }
            any |= slot.is_some();
        }
        if !any {
            continue;
        }

        let mut inv_sq_sum = 0.0;
        let mut degenerate = false;
        for (dist, _, _) in crossing.iter().flatten() {
            if *dist == 0.0 {
                degenerate = true;
            } else {
                inv_sq_sum += 1.0 / (dist * dist);
            }
        }
        let t = if degenerate {
            0.0
        } else {
            1.0 / inv_sq_sum.sqrt()
        };
        tt[c] = if pc < 0.0 { -t } else { t };
        status[c] = Status::Known;

        // Extension seeds: inverse-square-distance weighting of the source
        // values interpolated at the axis crossings.
        for (k, field) in ext_fields.iter_mut().enumerate() {
            let src = source_fields[k];
            let mut value = 0.0;
            let mut weight_sum = 0.0;
            for (dist, nb, frac) in crossing.iter().flatten() {
                let interpolated = (1.0 - frac) * src[c] + frac * src[*nb];
                if *dist == 0.0 {
                    value = interpolated;
                    weight_sum = 1.0;
                    break;
                }
                let weight = 1.0 / (dist * dist);
                value += weight * interpolated;
                weight_sum += weight;
            }
            field[c] = value / weight_sum;
        }
        front.push(c);
    }
    front
}

/// Compute the signed distance function of the zero level set of `phi` by
/// the Fast Marching Method.
///
/// # Parameters
/// - `distance`: output array, one value per node; masked cells are left
///   untouched and unreachable cells are set to signed infinity
/// - `phi`: level set function over the full grid
/// - `mask`: optional do-not-touch marker (nonzero excludes the cell)
/// - `order`: upwind scheme order
/// - `grid_dims`: nodes per axis
/// - `dx`: grid spacing per axis
///
/// # Errors
/// Returns an error if an array length does not match the grid, a grid
/// dimension is smaller than 2, or a spacing is not positive and finite.
pub fn compute_distance_function<const N: usize>(
    distance: &mut [Real],
    phi: &[Real],
    mask: Option<&[u8]>,
    order: SpatialDerivativeOrder,
    grid_dims: [usize; N],
    dx: [Real; N],
) -> Result<()> {
    compute_extension_fields::<N>(distance, &mut [], phi, mask, &[], order, grid_dims, dx)
}

/// Compute the signed distance function of the zero level set of `phi`
/// and, alongside it, extension fields that transport the given source
/// values along the characteristics of the distance function
/// (grad(E) . grad(T) = 0 to the scheme's order).
///
/// Every extension field is paired with the source field of the same
/// position; the counts must match.
///
/// # Errors
/// Returns an error if an array length does not match the grid, the field
/// counts differ, a grid dimension is smaller than 2, or a spacing is not
/// positive and finite.
#[allow(clippy::too_many_arguments)]
pub fn compute_extension_fields<const N: usize>(
    distance: &mut [Real],
    ext_fields: &mut [&mut [Real]],
    phi: &[Real],
    mask: Option<&[u8]>,
    source_fields: &[&[Real]],
    order: SpatialDerivativeOrder,
    grid_dims: [usize; N],
    dx: [Real; N],
) -> Result<()> {
    let geom = GridGeometry::new(grid_dims, dx)?;
    let n = geom.num_nodes();
    check_len(distance.len(), n)?;
    check_len(phi.len(), n)?;
    if let Some(mask) = mask {
        check_len(mask.len(), n)?;
    }
    if ext_fields.len() != source_fields.len() {
        return Err(LsmError::ShapeMismatch {
            expected: vec![source_fields.len()],
            got: vec![ext_fields.len()],
        });
    }
    for src in source_fields {
        check_len(src.len(), n)?;
    }
    for ext in ext_fields.iter() {
        check_len(ext.len(), n)?;
    }

    let mut status = vec![Status::Far; n];
    if let Some(mask) = mask {
        for (s, &m) in status.iter_mut().zip(mask.iter()) {
            if m != 0 {
                *s = Status::Outside;
            }
        }
    }
    for (i, s) in status.iter().enumerate() {
        if *s != Status::Outside {
            distance[i] = if phi[i] < 0.0 {
                Real::NEG_INFINITY
            } else {
                Real::INFINITY
            };
        }
    }

    let front = initialize_front(&geom, phi, &mut status, distance, source_fields, ext_fields);

    let mut heap = CellHeap::new(n);
    for &cell in &front {
        relax_neighbors(
            &geom,
            order,
            &mut status,
            &mut heap,
            distance,
            None,
            Some(phi),
            cell,
            ext_fields,
        );
    }
    propagate(
        &geom,
        order,
        &mut status,
        &mut heap,
        distance,
        None,
        Some(phi),
        ext_fields,
    );
    Ok(())
}

/// Solve the stationary Eikonal equation `|grad(T)| F = 1` for a speed
/// field `F > 0`.
///
/// Boundary cells are fixed at their input values: the cells where `mask`
/// is nonzero when a mask is given, otherwise every cell whose input is
/// finite. All remaining cells are solved by the march; unreachable cells
/// are left at infinity.
///
/// # Errors
/// Returns an error if an array length does not match the grid, a speed or
/// boundary value is invalid, a grid dimension is smaller than 2, or a
/// spacing is not positive and finite.
pub fn solve_eikonal_equation<const N: usize>(
    tt: &mut [Real],
    speed: &[Real],
    mask: Option<&[u8]>,
    order: SpatialDerivativeOrder,
    grid_dims: [usize; N],
    dx: [Real; N],
) -> Result<()> {
    let geom = GridGeometry::new(grid_dims, dx)?;
    let n = geom.num_nodes();
    check_len(tt.len(), n)?;
    check_len(speed.len(), n)?;
    if let Some(mask) = mask {
        check_len(mask.len(), n)?;
    }
    for (index, &value) in speed.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(LsmError::InvalidSpeed {
                index,
                value: value as f64,
            });
        }
    }

    let mut status = vec![Status::Far; n];
    let mut seeds = Vec::new();
    for i in 0..n {
        let is_seed = match mask {
            Some(mask) => mask[i] != 0,
            None => tt[i].is_finite(),
        };
        if is_seed {
            if !tt[i].is_finite() {
                return Err(LsmError::Other(format!(
                    "Eikonal boundary value at index {} is not finite",
                    i
                )));
            }
            status[i] = Status::Known;
            seeds.push(i);
        } else {
            tt[i] = Real::INFINITY;
        }
    }

    let mut heap = CellHeap::new(n);
    for &cell in &seeds {
        relax_neighbors(
            &geom,
            order,
            &mut status,
            &mut heap,
            tt,
            Some(speed),
            None,
            cell,
            &mut [],
        );
    }
    propagate(
        &geom,
        order,
        &mut status,
        &mut heap,
        tt,
        Some(speed),
        None,
        &mut [],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_straight_interface_is_exact() {
        // phi = x - 0.5 crosses between columns; axis-aligned updates keep
        // the first-order march exact for a straight front.
        let nx = 16;
        let ny = 8;
        let h = 0.25;
        let phi: Vec<Real> = (0..nx * ny)
            .map(|i| (i % nx) as Real * h - 0.5 - 0.4 * h)
            .collect();
        let mut distance = vec![0.0; nx * ny];
        compute_distance_function::<2>(
            &mut distance,
            &phi,
            None,
            SpatialDerivativeOrder::Order1,
            [nx, ny],
            [h, h],
        )
        .unwrap();
        for (i, (&d, &p)) in distance.iter().zip(phi.iter()).enumerate() {
            assert!((d - p).abs() < 1e-9, "node {}: {} vs {}", i, d, p);
        }
    }

    #[test]
    fn signs_follow_phi() {
        let n = 21;
        let h = 0.1;
        let phi: Vec<Real> = (0..n * n)
            .map(|idx| {
                let x = (idx % n) as Real * h - 1.0;
                let y = (idx / n) as Real * h - 1.0;
                (x * x + y * y).sqrt() - 0.5
            })
            .collect();
        let mut distance = vec![0.0; n * n];
        compute_distance_function::<2>(
            &mut distance,
            &phi,
            None,
            SpatialDerivativeOrder::Order1,
            [n, n],
            [h, h],
        )
        .unwrap();
        for (idx, (&d, &p)) in distance.iter().zip(phi.iter()).enumerate() {
            assert!(d.is_finite());
            if p != 0.0 {
                assert!(
                    (d < 0.0) == (p < 0.0),
                    "sign flip at {}: d={} phi={}",
                    idx,
                    d,
                    p
                );
            }
        }
    }

    #[test]
    fn masked_cells_left_alone() {
        let n = 9;
        let h = 0.25;
        let phi: Vec<Real> = (0..n * n).map(|idx| (idx % n) as Real * h - 1.0).collect();
        let mut mask = vec![0u8; n * n];
        mask[3] = 1;
        mask[40] = 7;
        let mut distance = vec![123.0; n * n];
        compute_distance_function::<2>(
            &mut distance,
            &phi,
            Some(&mask),
            SpatialDerivativeOrder::Order1,
            [n, n],
            [h, h],
        )
        .unwrap();
        assert_eq!(distance[3], 123.0);
        assert_eq!(distance[40], 123.0);
        assert!(distance[4] != 123.0);
    }

    #[test]
    fn eikonal_point_source_first_order() {
        let n = 33;
        let h = 1.0;
        let speed = vec![1.0; n * n];
        let mut tt = vec![Real::INFINITY; n * n];
        let center = 16;
        tt[center + center * n] = 0.0;
        solve_eikonal_equation::<2>(
            &mut tt,
            &speed,
            None,
            SpatialDerivativeOrder::Order1,
            [n, n],
            [h, h],
        )
        .unwrap();

        let mut max_err: Real = 0.0;
        for j in 0..n {
            for i in 0..n {
                let d = (((i as i32 - center as i32).pow(2) + (j as i32 - center as i32).pow(2))
                    as Real)
                    .sqrt();
                if d <= 2.0 {
                    continue;
                }
                let err = (tt[i + j * n] - d).abs();
                max_err = max_err.max(err);
            }
        }
        assert!(max_err < 2.0 * h, "max error {} exceeds 2h", max_err);
    }

    #[test]
    fn eikonal_speed_scales_travel_time() {
        let n = 17;
        let h = 0.5;
        let speed = vec![2.0; n * n];
        let mut tt = vec![Real::INFINITY; n * n];
        tt[8 + 8 * n] = 0.0;
        solve_eikonal_equation::<2>(
            &mut tt,
            &speed,
            None,
            SpatialDerivativeOrder::Order1,
            [n, n],
            [h, h],
        )
        .unwrap();
        // Along the axis the update chain is exact: T = dist / F.
        let t = tt[12 + 8 * n];
        assert!((t - 4.0 * h / 2.0).abs() < 1e-9, "t = {}", t);
    }

    #[test]
    fn extension_field_carries_constant_source() {
        let n = 41;
        let h = 2.0 / (n - 1) as Real;
        let phi: Vec<Real> = (0..n * n)
            .map(|idx| {
                let x = (idx % n) as Real * h - 1.0;
                let y = (idx / n) as Real * h - 1.0;
                (x * x + y * y).sqrt() - 0.4
            })
            .collect();
        let source = vec![3.25; n * n];
        let mut distance = vec![0.0; n * n];
        let mut ext = vec![0.0; n * n];
        compute_extension_fields::<2>(
            &mut distance,
            &mut [&mut ext],
            &phi,
            None,
            &[&source],
            SpatialDerivativeOrder::Order1,
            [n, n],
            [h, h],
        )
        .unwrap();
        for (idx, &e) in ext.iter().enumerate() {
            assert!((e - 3.25).abs() < 1e-9, "ext at {}: {}", idx, e);
        }
    }

    #[test]
    fn mismatched_field_counts_rejected() {
        let n = 4;
        let phi = vec![1.0; n * n];
        let source = vec![0.0; n * n];
        let mut distance = vec![0.0; n * n];
        let result = compute_extension_fields::<2>(
            &mut distance,
            &mut [],
            &phi,
            None,
            &[&source],
            SpatialDerivativeOrder::Order1,
            [n, n],
            [1.0, 1.0],
        );
        assert!(matches!(result, Err(LsmError::ShapeMismatch { .. })));
    }

    #[test]
    fn invalid_speed_rejected() {
        let n = 4;
        let mut speed = vec![1.0; n * n];
        speed[5] = 0.0;
        let mut tt = vec![Real::INFINITY; n * n];
        tt[0] = 0.0;
        let result = solve_eikonal_equation::<2>(
            &mut tt,
            &speed,
            None,
            SpatialDerivativeOrder::Order1,
            [n, n],
            [1.0, 1.0],
        );
        assert!(matches!(
            result,
            Err(LsmError::InvalidSpeed { index: 5, .. })
        ));
    }

    #[test]
    fn wrong_length_rejected() {
        let mut distance = vec![0.0; 10];
        let phi = vec![0.0; 16];
        let result = compute_distance_function::<2>(
            &mut distance,
            &phi,
            None,
            SpatialDerivativeOrder::Order1,
            [4, 4],
            [1.0, 1.0],
        );
        assert!(matches!(result, Err(LsmError::ShapeMismatch { .. })));
    }

    #[test]
    fn second_order_tightens_point_source() {
        let n = 65;
        let h = 2.0 / (n - 1) as Real;
        let phi: Vec<Real> = (0..n * n)
            .map(|idx| {
                let x = (idx % n) as Real * h - 1.0;
                let y = (idx / n) as Real * h - 1.0;
                (x * x + y * y).sqrt() - 0.5
            })
            .collect();

        let run = |order| {
            let mut distance = vec![0.0; n * n];
            compute_distance_function::<2>(&mut distance, &phi, None, order, [n, n], [h, h])
                .unwrap();
            let mut max_err: Real = 0.0;
            for (idx, &d) in distance.iter().enumerate() {
                let x = (idx % n) as Real * h - 1.0;
                let y = (idx / n) as Real * h - 1.0;
                let exact = (x * x + y * y).sqrt() - 0.5;
                // Skip the immediate neighborhood of the center kink.
                if (x * x + y * y).sqrt() < 0.2 {
                    continue;
                }
                max_err = max_err.max((d - exact).abs());
            }
            max_err
        };

        let err1 = run(SpatialDerivativeOrder::Order1);
        let err2 = run(SpatialDerivativeOrder::Order2);
        assert!(err1 < 0.08, "first order error {}", err1);
        assert!(
            err2 <= 1.05 * err1,
            "second order {} vs first order {}",
            err2,
            err1
        );
    }
}
