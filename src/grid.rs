// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::{Index, IndexMut};

use crate::error::{LsmError, Result};

/// Floating-point type used by every kernel in the crate.
///
/// Defaults to `f64`; the `single-precision` cargo feature switches the
/// whole crate to `f32` uniformly.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Floating-point type used by every kernel in the crate.
#[cfg(feature = "single-precision")]
pub type Real = f32;

/// A rectangular index set `[lower[0]..upper[0]] x ... x [lower[N-1]..upper[N-1]]`
/// (bounds inclusive).
///
/// Two distinguished boxes accompany every field: the *ghost box* (the
/// allocation extent) and the *fill box* (the interior extent where an
/// operator is allowed to write results). The generic parameter `N` is the
/// number of spatial dimensions (1, 2, or 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexBox<const N: usize> {
    /// Lower corner (inclusive).
    pub lower: [i32; N],
    /// Upper corner (inclusive).
    pub upper: [i32; N],
}

impl<const N: usize> IndexBox<N> {
    /// Create a new index box from its lower and upper corners.
    ///
    /// # Errors
    /// Returns an error if the upper corner is below the lower corner on
    /// any axis.
    pub fn new(lower: [i32; N], upper: [i32; N]) -> Result<Self> {
        for axis in 0..N {
            if upper[axis] < lower[axis] {
                return Err(LsmError::InvalidBox {
                    axis,
                    lower: lower[axis],
                    upper: upper[axis],
                });
            }
        }
        Ok(IndexBox { lower, upper })
    }

    /// Number of cells along each axis.
    pub fn dims(&self) -> [usize; N] {
        let mut dims = [0usize; N];
        for d in 0..N {
            dims[d] = (self.upper[d] - self.lower[d] + 1) as usize;
        }
        dims
    }

    /// Total number of cells in the box.
    pub fn num_cells(&self) -> usize {
        self.dims().iter().product()
    }

    /// Linear strides for a flat array laid out over this box, axis 0
    /// fastest: `(1, W0, W0*W1)`.
    pub fn strides(&self) -> [usize; N] {
        let dims = self.dims();
        let mut strides = [0usize; N];
        strides[0] = 1;
        for d in 1..N {
            strides[d] = strides[d - 1] * dims[d - 1];
        }
        strides
    }

    /// Flat offset of a grid index in an array laid out over this box.
    #[inline]
    pub fn offset_of(&self, idx: [i32; N]) -> usize {
        debug_assert!(self.contains(idx), "index {:?} outside box {:?}", idx, self);
        let strides = self.strides();
        let mut offset = 0usize;
        for d in 0..N {
            offset += (idx[d] - self.lower[d]) as usize * strides[d];
        }
        offset
    }

    /// Box widened by `w` cells on every face. Negative `w` shrinks.
    pub fn grow(&self, w: i32) -> Self {
        let mut lower = self.lower;
        let mut upper = self.upper;
        for d in 0..N {
            lower[d] -= w;
            upper[d] += w;
        }
        IndexBox { lower, upper }
    }

    /// Box widened by `w` cells on both faces of a single axis.
    pub fn grow_axis(&self, axis: usize, w: i32) -> Self {
        let mut lower = self.lower;
        let mut upper = self.upper;
        lower[axis] -= w;
        upper[axis] += w;
        IndexBox { lower, upper }
    }

    /// Check whether a grid index lies in the box (bounds inclusive).
    #[inline]
    pub fn contains(&self, idx: [i32; N]) -> bool {
        for d in 0..N {
            if idx[d] < self.lower[d] || idx[d] > self.upper[d] {
                return false;
            }
        }
        true
    }

    /// Check whether another box lies entirely inside this box.
    pub fn contains_box(&self, other: &IndexBox<N>) -> bool {
        for d in 0..N {
            if other.lower[d] < self.lower[d] || other.upper[d] > self.upper[d] {
                return false;
            }
        }
        true
    }

    /// Visit every index in the box, axis 0 fastest (matching the flat
    /// array layout).
    pub fn for_each(&self, mut f: impl FnMut([i32; N])) {
        let mut idx = self.lower;
        loop {
            f(idx);
            let mut d = 0;
            loop {
                idx[d] += 1;
                if idx[d] <= self.upper[d] {
                    break;
                }
                idx[d] = self.lower[d];
                d += 1;
                if d == N {
                    return;
                }
            }
        }
    }
}

/// Shift a grid index by `by` cells along `axis`.
#[inline]
pub fn shift<const N: usize>(idx: [i32; N], axis: usize, by: i32) -> [i32; N] {
    let mut out = idx;
    out[axis] += by;
    out
}

/// Validate grid spacings (strictly positive, finite).
pub(crate) fn check_spacing<const N: usize>(dx: [Real; N]) -> Result<()> {
    for (axis, &h) in dx.iter().enumerate() {
        if !h.is_finite() || h <= 0.0 {
            return Err(LsmError::InvalidGridSpacing {
                axis,
                value: h as f64,
            });
        }
    }
    Ok(())
}

/// Precondition shared by every stencil operator: the fill box widened by
/// the stencil margin must lie inside the ghost box of the named argument.
pub(crate) fn check_margin<const N: usize>(
    ghost_box: &IndexBox<N>,
    fill_box: &IndexBox<N>,
    margin: i32,
    field: &'static str,
) -> Result<()> {
    if !ghost_box.contains_box(&fill_box.grow(margin)) {
        return Err(LsmError::FillBoxNotContained { field, margin });
    }
    Ok(())
}

/// A dense scalar field indexed by a ghost box.
///
/// Stores one `Real` per cell of the ghost box in a flat, contiguous,
/// axis-0-fastest layout. The field carries no other metadata; operators
/// receive the fill box separately.
#[derive(Clone, Debug)]
pub struct Field<const N: usize> {
    data: Vec<Real>,
    ghost_box: IndexBox<N>,
    strides: [usize; N],
}

impl<const N: usize> Field<N> {
    /// Create a zero-initialized field over the given ghost box.
    pub fn zeros(ghost_box: IndexBox<N>) -> Self {
        Field {
            data: vec![0.0; ghost_box.num_cells()],
            strides: ghost_box.strides(),
            ghost_box,
        }
    }

    /// Create a field over the given ghost box by evaluating `f` at every
    /// cell index.
    pub fn from_fn(ghost_box: IndexBox<N>, mut f: impl FnMut([i32; N]) -> Real) -> Self {
        let mut field = Field::zeros(ghost_box);
        ghost_box.for_each(|idx| {
            let offset = field.offset(idx);
            field.data[offset] = f(idx);
        });
        field
    }

    /// The ghost box the field is allocated over.
    pub fn ghost_box(&self) -> &IndexBox<N> {
        &self.ghost_box
    }

    /// Flat offset of a grid index in the backing array.
    #[inline]
    pub fn offset(&self, idx: [i32; N]) -> usize {
        debug_assert!(
            self.ghost_box.contains(idx),
            "index {:?} outside ghost box {:?}",
            idx,
            self.ghost_box
        );
        let mut offset = 0usize;
        for d in 0..N {
            offset += (idx[d] - self.ghost_box.lower[d]) as usize * self.strides[d];
        }
        offset
    }

    /// Set every cell (ghost cells included) to `value`.
    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }

    /// Raw backing storage, ghost cells included.
    pub fn data(&self) -> &[Real] {
        &self.data
    }

    /// Mutable raw backing storage, ghost cells included.
    pub fn data_mut(&mut self) -> &mut [Real] {
        &mut self.data
    }
}

impl<const N: usize> Index<[i32; N]> for Field<N> {
    type Output = Real;

    #[inline]
    fn index(&self, idx: [i32; N]) -> &Real {
        &self.data[self.offset(idx)]
    }
}

impl<const N: usize> IndexMut<[i32; N]> for Field<N> {
    #[inline]
    fn index_mut(&mut self, idx: [i32; N]) -> &mut Real {
        let offset = self.offset(idx);
        &mut self.data[offset]
    }
}

/// An N-component vector field stored component-major: each component is a
/// separate contiguous [`Field`] with an identical ghost box.
#[derive(Clone, Debug)]
pub struct VectorField<const N: usize> {
    components: [Field<N>; N],
}

impl<const N: usize> VectorField<N> {
    /// Create a zero-initialized vector field over the given ghost box.
    pub fn zeros(ghost_box: IndexBox<N>) -> Self {
        VectorField {
            components: std::array::from_fn(|_| Field::zeros(ghost_box)),
        }
    }

    /// Create a vector field by evaluating `f(axis, idx)` at every cell of
    /// every component.
    pub fn from_fn(ghost_box: IndexBox<N>, mut f: impl FnMut(usize, [i32; N]) -> Real) -> Self {
        VectorField {
            components: std::array::from_fn(|a| Field::from_fn(ghost_box, |idx| f(a, idx))),
        }
    }

    /// The shared ghost box of all components.
    pub fn ghost_box(&self) -> &IndexBox<N> {
        self.components[0].ghost_box()
    }

    /// Mutable references to all components at once.
    pub fn components_mut(&mut self) -> &mut [Field<N>; N] {
        &mut self.components
    }
}

impl<const N: usize> Index<usize> for VectorField<N> {
    type Output = Field<N>;

    #[inline]
    fn index(&self, axis: usize) -> &Field<N> {
        &self.components[axis]
    }
}

impl<const N: usize> IndexMut<usize> for VectorField<N> {
    #[inline]
    fn index_mut(&mut self, axis: usize) -> &mut Field<N> {
        &mut self.components[axis]
    }
}

/// A dense byte field over a ghost box, used for narrow-band layer tags.
#[derive(Clone, Debug)]
pub struct TagField<const N: usize> {
    data: Vec<u8>,
    ghost_box: IndexBox<N>,
    strides: [usize; N],
}

impl<const N: usize> TagField<N> {
    /// Create a tag field over the given ghost box, every cell set to
    /// `initial`.
    pub fn new(ghost_box: IndexBox<N>, initial: u8) -> Self {
        TagField {
            data: vec![initial; ghost_box.num_cells()],
            strides: ghost_box.strides(),
            ghost_box,
        }
    }

    /// The ghost box the tags are allocated over.
    pub fn ghost_box(&self) -> &IndexBox<N> {
        &self.ghost_box
    }

    #[inline]
    fn offset(&self, idx: [i32; N]) -> usize {
        debug_assert!(self.ghost_box.contains(idx));
        let mut offset = 0usize;
        for d in 0..N {
            offset += (idx[d] - self.ghost_box.lower[d]) as usize * self.strides[d];
        }
        offset
    }
}

impl<const N: usize> Index<[i32; N]> for TagField<N> {
    type Output = u8;

    #[inline]
    fn index(&self, idx: [i32; N]) -> &u8 {
        &self.data[self.offset(idx)]
    }
}

impl<const N: usize> IndexMut<[i32; N]> for TagField<N> {
    #[inline]
    fn index_mut(&mut self, idx: [i32; N]) -> &mut u8 {
        let offset = self.offset(idx);
        &mut self.data[offset]
    }
}
