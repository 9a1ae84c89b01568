// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Narrow-band (local) execution of the grid operators.
//!
//! A band is an explicit list of grid points stratified into nested layers
//! by distance from the interface, together with a per-cell layer tag over
//! the ghost box. A local operator iterates the list instead of a fill box:
//! results are written only where the tag does not exceed `mark_fb`, and
//! scratch differences are written (and trusted on read) only where the tag
//! does not exceed the corresponding `mark_d*` threshold. Stale scratch
//! cells are recomputed on demand, so the band can be grown or shrunk
//! between calls without reallocating the difference arrays.

use std::ops::Range;

use crate::error::{LsmError, Result};
use crate::evolution::godunov_grad_norm;
use crate::grid::{check_margin, check_spacing, shift, Field, IndexBox, Real, TagField, VectorField};
use crate::stability::normal_speed_at;

/// Narrow-band descriptor: index list, nested layer ranges, and a layer-tag
/// mask over the ghost box.
#[derive(Clone, Debug)]
pub struct NarrowBand<const N: usize> {
    indices: Vec<[i32; N]>,
    layers: Vec<Range<usize>>,
    mask: TagField<N>,
    bounds: IndexBox<N>,
}

impl<const N: usize> NarrowBand<N> {
    /// Build a band from an explicit index list, per-layer ranges into the
    /// list (layer `l` must end no earlier than layer `l-1`), and the tag
    /// mask.
    ///
    /// # Errors
    /// Returns an error if a listed index falls outside the mask ghost box
    /// or the layer ranges are inconsistent with the list.
    pub fn new(
        indices: Vec<[i32; N]>,
        layers: Vec<Range<usize>>,
        mask: TagField<N>,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(LsmError::InvalidBandLayers {
                layer: 0,
                len: indices.len(),
            });
        }
        let mut prev_end = 0;
        for (l, r) in layers.iter().enumerate() {
            if r.start > r.end || r.end > indices.len() || r.end < prev_end {
                return Err(LsmError::InvalidBandLayers {
                    layer: l,
                    len: indices.len(),
                });
            }
            prev_end = r.end;
        }
        for (position, &idx) in indices.iter().enumerate() {
            if !mask.ghost_box().contains(idx) {
                return Err(LsmError::BandIndexOutOfBounds {
                    position,
                    index: idx.to_vec(),
                });
            }
        }

        let bounds = bounding_box(&indices, mask.ghost_box());
        Ok(NarrowBand {
            indices,
            layers,
            mask,
            bounds,
        })
    }

    /// Build a band around the zero level set of `phi`: layer `l` collects
    /// the fill-box cells with `|phi| <= layer_widths[l]` not claimed by an
    /// earlier layer. Tags equal the layer number; cells outside the band
    /// carry the tag 255.
    ///
    /// # Errors
    /// Returns an error if `layer_widths` is empty or not ascending, or if
    /// the fill box is not covered by the ghost box of `phi`.
    pub fn from_level_set(
        phi: &Field<N>,
        fill_box: &IndexBox<N>,
        layer_widths: &[Real],
    ) -> Result<Self> {
        if layer_widths.is_empty() {
            return Err(LsmError::InvalidBandLayers { layer: 0, len: 0 });
        }
        for w in layer_widths.windows(2) {
            if w[1] < w[0] {
                return Err(LsmError::Other(
                    "narrow-band layer widths must be ascending".to_string(),
                ));
            }
        }
        check_margin(phi.ghost_box(), fill_box, 0, "phi")?;

        let mut mask = TagField::new(*phi.ghost_box(), 255);
        let mut indices = Vec::new();
        let mut layers = Vec::with_capacity(layer_widths.len());
        for (l, &width) in layer_widths.iter().enumerate() {
            let start = indices.len();
            fill_box.for_each(|idx| {
                if mask[idx] == 255 && phi[idx].abs() <= width {
                    mask[idx] = l as u8;
                    indices.push(idx);
                }
            });
            layers.push(start..indices.len());
        }
        let bounds = bounding_box(&indices, phi.ghost_box());
        Ok(NarrowBand {
            indices,
            layers,
            mask,
            bounds,
        })
    }

    /// Number of layers in the band.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of listed points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the band lists no points.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The layer-tag mask.
    pub fn mask(&self) -> &TagField<N> {
        &self.mask
    }

    /// Bounding box of the listed points (a single cell at the ghost-box
    /// corner for an empty band).
    pub fn bounding_box(&self) -> &IndexBox<N> {
        &self.bounds
    }

    /// All points of layers 0 through `layer` (clamped to the last layer),
    /// in list order.
    pub fn points_through(&self, layer: usize) -> &[[i32; N]] {
        let layer = layer.min(self.layers.len() - 1);
        &self.indices[self.layers[0].start..self.layers[layer].end]
    }
}

fn bounding_box<const N: usize>(indices: &[[i32; N]], ghost_box: &IndexBox<N>) -> IndexBox<N> {
    match indices.first() {
        None => IndexBox {
            lower: ghost_box.lower,
            upper: ghost_box.lower,
        },
        Some(&first) => {
            let mut lower = first;
            let mut upper = first;
            for idx in indices {
                for d in 0..N {
                    lower[d] = lower[d].min(idx[d]);
                    upper[d] = upper[d].max(idx[d]);
                }
            }
            IndexBox { lower, upper }
        }
    }
}

/// Shared preconditions of the local operators: stencil reads stay inside
/// the argument ghost boxes, and the mask covers the stencil neighborhood
/// of every band point.
fn check_band<const N: usize>(
    band: &NarrowBand<N>,
    width: i32,
    fields: &[(&'static str, &IndexBox<N>, i32)],
) -> Result<()> {
    check_margin(band.mask.ghost_box(), band.bounding_box(), width, "narrow_band")?;
    for &(name, ghost_box, margin) in fields {
        check_margin(ghost_box, band.bounding_box(), margin, name)?;
    }
    Ok(())
}

/// Visit the points of layers 0..=`layer` whose tag does not exceed
/// `mark_fb`.
fn for_band<const N: usize>(
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
    mut f: impl FnMut([i32; N]),
) {
    for &idx in band.points_through(layer) {
        if band.mask[idx] <= mark_fb {
            f(idx);
        }
    }
}

/// Read an undivided first difference, falling back to recomputation when
/// the cell's tag marks the cached value stale.
#[inline]
fn d1_at<const N: usize>(
    d1: &Field<N>,
    phi: &Field<N>,
    mask: &TagField<N>,
    mark_d1: u8,
    idx: [i32; N],
    axis: usize,
) -> Real {
    if mask[idx] <= mark_d1 {
        d1[idx]
    } else {
        phi[shift(idx, axis, 1)] - phi[idx]
    }
}

/// Read an undivided second difference with the same staleness discipline.
#[inline]
#[allow(clippy::too_many_arguments)]
fn d2_at<const N: usize>(
    d2: &Field<N>,
    d1: &Field<N>,
    phi: &Field<N>,
    mask: &TagField<N>,
    mark_d2: u8,
    mark_d1: u8,
    idx: [i32; N],
    axis: usize,
) -> Real {
    if mask[idx] <= mark_d2 {
        d2[idx]
    } else {
        d1_at(d1, phi, mask, mark_d1, idx, axis)
            - d1_at(d1, phi, mask, mark_d1, shift(idx, axis, -1), axis)
    }
}

#[inline]
fn choose(left: Real, right: Real) -> Real {
    if left.abs() < right.abs() {
        left
    } else {
        right
    }
}

/// Narrow-band variant of [`crate::derivatives::hj_eno1`]: one-sided
/// first-order gradients at the band points of layers 0..=`layer`.
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the band's stencil neighborhood or a spacing is invalid.
#[allow(clippy::too_many_arguments)]
pub fn hj_eno1_local<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
    mark_d1: u8,
) -> Result<()> {
    check_spacing(dx)?;
    check_band(
        band,
        1,
        &[
            ("phi", phi.ghost_box(), 1),
            ("d1", d1.ghost_box(), 1),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
        ],
    )?;

    for axis in 0..N {
        let h = dx[axis];
        for &idx in band.points_through(layer + 1) {
            if band.mask[idx] <= mark_d1 {
                d1[idx] = phi[shift(idx, axis, 1)] - phi[idx];
            }
        }
        for_band(band, layer, mark_fb, |idx| {
            grad_phi_minus[axis][idx] =
                d1_at(d1, phi, &band.mask, mark_d1, shift(idx, axis, -1), axis) / h;
            grad_phi_plus[axis][idx] = d1_at(d1, phi, &band.mask, mark_d1, idx, axis) / h;
        });
    }
    Ok(())
}

/// Narrow-band variant of [`crate::derivatives::hj_eno2`].
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the band's stencil neighborhood or a spacing is invalid.
#[allow(clippy::too_many_arguments)]
pub fn hj_eno2_local<const N: usize>(
    grad_phi_plus: &mut VectorField<N>,
    grad_phi_minus: &mut VectorField<N>,
    phi: &Field<N>,
    d1: &mut Field<N>,
    d2: &mut Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
    mark_d1: u8,
    mark_d2: u8,
) -> Result<()> {
    check_spacing(dx)?;
    check_band(
        band,
        2,
        &[
            ("phi", phi.ghost_box(), 2),
            ("d1", d1.ghost_box(), 2),
            ("d2", d2.ghost_box(), 2),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
        ],
    )?;

    for axis in 0..N {
        let h = dx[axis];
        for &idx in band.points_through(layer + 2) {
            if band.mask[idx] <= mark_d1 {
                d1[idx] = phi[shift(idx, axis, 1)] - phi[idx];
            }
        }
        for &idx in band.points_through(layer + 1) {
            if band.mask[idx] <= mark_d2 {
                d2[idx] = d1_at(d1, phi, &band.mask, mark_d1, idx, axis)
                    - d1_at(d1, phi, &band.mask, mark_d1, shift(idx, axis, -1), axis);
            }
        }
        for_band(band, layer, mark_fb, |idx| {
            let m = &band.mask;
            let sel_minus = choose(
                d2_at(d2, d1, phi, m, mark_d2, mark_d1, shift(idx, axis, -1), axis),
                d2_at(d2, d1, phi, m, mark_d2, mark_d1, idx, axis),
            );
            grad_phi_minus[axis][idx] =
                (d1_at(d1, phi, m, mark_d1, shift(idx, axis, -1), axis) + 0.5 * sel_minus) / h;
            let sel_plus = choose(
                d2_at(d2, d1, phi, m, mark_d2, mark_d1, idx, axis),
                d2_at(d2, d1, phi, m, mark_d2, mark_d1, shift(idx, axis, 1), axis),
            );
            grad_phi_plus[axis][idx] =
                (d1_at(d1, phi, m, mark_d1, idx, axis) - 0.5 * sel_plus) / h;
        });
    }
    Ok(())
}

/// Narrow-band variant of [`crate::derivatives::central_grad_order2`].
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the band's stencil neighborhood or a spacing is invalid.
pub fn central_grad_order2_local<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_spacing(dx)?;
    check_band(
        band,
        0,
        &[
            ("phi", phi.ghost_box(), 1),
            ("grad_phi", grad_phi.ghost_box(), 0),
        ],
    )?;

    for axis in 0..N {
        let inv = 0.5 / dx[axis];
        for_band(band, layer, mark_fb, |idx| {
            grad_phi[axis][idx] = (phi[shift(idx, axis, 1)] - phi[shift(idx, axis, -1)]) * inv;
        });
    }
    Ok(())
}

/// Narrow-band variant of [`crate::derivatives::central_grad_order4`].
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the band's stencil neighborhood or a spacing is invalid.
pub fn central_grad_order4_local<const N: usize>(
    grad_phi: &mut VectorField<N>,
    phi: &Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_spacing(dx)?;
    check_band(
        band,
        0,
        &[
            ("phi", phi.ghost_box(), 2),
            ("grad_phi", grad_phi.ghost_box(), 0),
        ],
    )?;

    for axis in 0..N {
        let inv = 1.0 / (12.0 * dx[axis]);
        for_band(band, layer, mark_fb, |idx| {
            grad_phi[axis][idx] = (-phi[shift(idx, axis, 2)] + 8.0 * phi[shift(idx, axis, 1)]
                - 8.0 * phi[shift(idx, axis, -1)]
                + phi[shift(idx, axis, -2)])
                * inv;
        });
    }
    Ok(())
}

/// Narrow-band variant of [`crate::derivatives::laplacian_order2`].
///
/// # Errors
/// Returns an error without touching any output if a ghost box does not
/// cover the band's stencil neighborhood or a spacing is invalid.
pub fn laplacian_order2_local<const N: usize>(
    laplacian_phi: &mut Field<N>,
    phi: &Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_spacing(dx)?;
    check_band(
        band,
        0,
        &[
            ("phi", phi.ghost_box(), 1),
            ("laplacian_phi", laplacian_phi.ghost_box(), 0),
        ],
    )?;

    let mut inv_sq = [0.0 as Real; N];
    for d in 0..N {
        inv_sq[d] = 1.0 / (dx[d] * dx[d]);
    }
    for_band(band, layer, mark_fb, |idx| {
        let mut sum = 0.0;
        for axis in 0..N {
            sum += (phi[shift(idx, axis, 1)] - 2.0 * phi[idx] + phi[shift(idx, axis, -1)])
                * inv_sq[axis];
        }
        laplacian_phi[idx] = sum;
    });
    Ok(())
}

/// Average of `|grad(phi)|` (central O(2) differences) over the band points
/// of layers 0..=`layer` with tag at most `mark_fb`. Returns zero for an
/// empty selection.
///
/// # Errors
/// Returns an error if a ghost box does not cover the band's stencil
/// neighborhood or a spacing is invalid.
pub fn average_grad_phi_norm_local<const N: usize>(
    phi: &Field<N>,
    dx: [Real; N],
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<Real> {
    check_spacing(dx)?;
    check_band(band, 0, &[("phi", phi.ghost_box(), 1)])?;

    let mut total = 0.0;
    let mut count = 0usize;
    for_band(band, layer, mark_fb, |idx| {
        let mut norm_sq = 0.0;
        for axis in 0..N {
            let g = (phi[shift(idx, axis, 1)] - phi[shift(idx, axis, -1)]) * 0.5 / dx[axis];
            norm_sq += g * g;
        }
        total += norm_sq.sqrt();
        count += 1;
    });
    if count == 0 {
        return Ok(0.0);
    }
    Ok(total / count as Real)
}

/// Narrow-band variant of [`crate::utilities::max_norm_diff`].
///
/// # Errors
/// Returns an error if a ghost box does not cover the band points.
pub fn max_norm_diff_local<const N: usize>(
    field1: &Field<N>,
    field2: &Field<N>,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<Real> {
    check_band(
        band,
        0,
        &[
            ("field1", field1.ghost_box(), 0),
            ("field2", field2.ghost_box(), 0),
        ],
    )?;

    let mut max_diff: Real = 0.0;
    for_band(band, layer, mark_fb, |idx| {
        max_diff = max_diff.max((field1[idx] - field2[idx]).abs());
    });
    Ok(max_diff)
}

/// Narrow-band variant of [`crate::evolution::add_advection_term`].
///
/// # Errors
/// Returns an error without touching `lse_rhs` if a ghost box does not
/// cover the band points.
#[allow(clippy::too_many_arguments)]
pub fn add_advection_term_local<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel: &VectorField<N>,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("lse_rhs", lse_rhs.ghost_box(), 0),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
            ("vel", vel.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
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

/// Narrow-band variant of [`crate::evolution::add_normal_velocity_term`].
///
/// # Errors
/// Returns an error without touching `lse_rhs` if a ghost box does not
/// cover the band points.
#[allow(clippy::too_many_arguments)]
pub fn add_normal_velocity_term_local<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel_n: &Field<N>,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("lse_rhs", lse_rhs.ghost_box(), 0),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
            ("vel_n", vel_n.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
        let vn = vel_n[idx];
        lse_rhs[idx] -= vn * godunov_grad_norm(grad_phi_plus, grad_phi_minus, idx, vn);
    });
    Ok(())
}

/// Narrow-band variant of
/// [`crate::evolution::add_const_normal_velocity_term`].
///
/// # Errors
/// Returns an error without touching `lse_rhs` if a ghost box does not
/// cover the band points.
pub fn add_const_normal_velocity_term_local<const N: usize>(
    lse_rhs: &mut Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    vel_n: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("lse_rhs", lse_rhs.ghost_box(), 0),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
        lse_rhs[idx] -= vel_n * godunov_grad_norm(grad_phi_plus, grad_phi_minus, idx, vel_n);
    });
    Ok(())
}

/// Narrow-band variant of [`crate::time_integration::rk1_step`].
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not
/// cover the band points.
pub fn rk1_step_local<const N: usize>(
    u_next: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("u_next", u_next.ghost_box(), 0),
            ("u_cur", u_cur.ghost_box(), 0),
            ("rhs", rhs.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
        u_next[idx] = u_cur[idx] + dt * rhs[idx];
    });
    Ok(())
}

/// Narrow-band variant of [`crate::time_integration::tvd_rk2_stage1`].
///
/// # Errors
/// Returns an error without touching `u_stage1` if a ghost box does not
/// cover the band points.
pub fn tvd_rk2_stage1_local<const N: usize>(
    u_stage1: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    rk1_step_local(u_stage1, u_cur, rhs, dt, band, layer, mark_fb)
}

/// Narrow-band variant of [`crate::time_integration::tvd_rk2_stage2`].
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not
/// cover the band points.
#[allow(clippy::too_many_arguments)]
pub fn tvd_rk2_stage2_local<const N: usize>(
    u_next: &mut Field<N>,
    u_stage1: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("u_next", u_next.ghost_box(), 0),
            ("u_stage1", u_stage1.ghost_box(), 0),
            ("u_cur", u_cur.ghost_box(), 0),
            ("rhs", rhs.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
        u_next[idx] = 0.5 * u_cur[idx] + 0.5 * (u_stage1[idx] + dt * rhs[idx]);
    });
    Ok(())
}

/// Narrow-band variant of [`crate::time_integration::tvd_rk3_stage1`].
///
/// # Errors
/// Returns an error without touching `u_stage1` if a ghost box does not
/// cover the band points.
pub fn tvd_rk3_stage1_local<const N: usize>(
    u_stage1: &mut Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    rk1_step_local(u_stage1, u_cur, rhs, dt, band, layer, mark_fb)
}

/// Narrow-band variant of [`crate::time_integration::tvd_rk3_stage2`].
///
/// # Errors
/// Returns an error without touching `u_stage2` if a ghost box does not
/// cover the band points.
#[allow(clippy::too_many_arguments)]
pub fn tvd_rk3_stage2_local<const N: usize>(
    u_stage2: &mut Field<N>,
    u_stage1: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("u_stage2", u_stage2.ghost_box(), 0),
            ("u_stage1", u_stage1.ghost_box(), 0),
            ("u_cur", u_cur.ghost_box(), 0),
            ("rhs", rhs.ghost_box(), 0),
        ],
    )?;

    for_band(band, layer, mark_fb, |idx| {
        u_stage2[idx] = 0.75 * u_cur[idx] + 0.25 * (u_stage1[idx] + dt * rhs[idx]);
    });
    Ok(())
}

/// Narrow-band variant of [`crate::time_integration::tvd_rk3_stage3`].
///
/// # Errors
/// Returns an error without touching `u_next` if a ghost box does not
/// cover the band points.
#[allow(clippy::too_many_arguments)]
pub fn tvd_rk3_stage3_local<const N: usize>(
    u_next: &mut Field<N>,
    u_stage2: &Field<N>,
    u_cur: &Field<N>,
    rhs: &Field<N>,
    dt: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<()> {
    check_band(
        band,
        0,
        &[
            ("u_next", u_next.ghost_box(), 0),
            ("u_stage2", u_stage2.ghost_box(), 0),
            ("u_cur", u_cur.ghost_box(), 0),
            ("rhs", rhs.ghost_box(), 0),
        ],
    )?;

    let third = 1.0 / 3.0;
    for_band(band, layer, mark_fb, |idx| {
        u_next[idx] = third * u_cur[idx] + 2.0 * third * (u_stage2[idx] + dt * rhs[idx]);
    });
    Ok(())
}

/// Narrow-band variant of
/// [`crate::stability::compute_stable_advection_dt`].
///
/// # Errors
/// Returns an error if a ghost box does not cover the band points or a
/// spacing is invalid.
pub fn compute_stable_advection_dt_local<const N: usize>(
    vel: &VectorField<N>,
    dx: [Real; N],
    cfl: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<Real> {
    check_spacing(dx)?;
    check_band(band, 0, &[("vel", vel.ghost_box(), 0)])?;

    let mut speed_sum = 0.0;
    for axis in 0..N {
        let mut max_v: Real = 0.0;
        for_band(band, layer, mark_fb, |idx| {
            max_v = max_v.max(vel[axis][idx].abs());
        });
        speed_sum += max_v / dx[axis];
    }
    if speed_sum == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / speed_sum)
}

/// Narrow-band variant of
/// [`crate::stability::compute_stable_normal_vel_dt`].
///
/// # Errors
/// Returns an error if a ghost box does not cover the band points or a
/// spacing is invalid.
#[allow(clippy::too_many_arguments)]
pub fn compute_stable_normal_vel_dt_local<const N: usize>(
    vel_n: &Field<N>,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    dx: [Real; N],
    cfl: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<Real> {
    check_spacing(dx)?;
    check_band(
        band,
        0,
        &[
            ("vel_n", vel_n.ghost_box(), 0),
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
        ],
    )?;

    let mut max_speed: Real = 0.0;
    for_band(band, layer, mark_fb, |idx| {
        let speed = vel_n[idx].abs() * normal_speed_at(grad_phi_plus, grad_phi_minus, idx, dx);
        max_speed = max_speed.max(speed);
    });
    if max_speed == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / max_speed)
}

/// Narrow-band variant of
/// [`crate::stability::compute_stable_const_normal_vel_dt`].
///
/// # Errors
/// Returns an error if a ghost box does not cover the band points or a
/// spacing is invalid.
#[allow(clippy::too_many_arguments)]
pub fn compute_stable_const_normal_vel_dt_local<const N: usize>(
    vel_n: Real,
    grad_phi_plus: &VectorField<N>,
    grad_phi_minus: &VectorField<N>,
    dx: [Real; N],
    cfl: Real,
    band: &NarrowBand<N>,
    layer: usize,
    mark_fb: u8,
) -> Result<Real> {
    check_spacing(dx)?;
    check_band(
        band,
        0,
        &[
            ("grad_phi_plus", grad_phi_plus.ghost_box(), 0),
            ("grad_phi_minus", grad_phi_minus.ghost_box(), 0),
        ],
    )?;

    let mut max_grad: Real = 0.0;
    for_band(band, layer, mark_fb, |idx| {
        max_grad = max_grad.max(normal_speed_at(grad_phi_plus, grad_phi_minus, idx, dx));
    });
    let max_speed = vel_n.abs() * max_grad;
    if max_speed == 0.0 {
        return Ok(Real::INFINITY);
    }
    Ok(cfl / max_speed)
}
