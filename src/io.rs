// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! `.npy` import/export for fields and flat solution arrays, mainly for
//! inspecting level-set data from NumPy and for seeding tests with
//! externally generated fields.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};

use crate::error::{LsmError, Result};
use crate::grid::{Field, IndexBox, Real};

fn read_as_real(path: &Path) -> Result<ArrayD<Real>> {
    // Try f64 first, then f32.
    match ndarray_npy::read_npy::<_, ArrayD<f64>>(path) {
        Ok(arr) => Ok(arr.mapv(|v| v as Real)),
        Err(_) => {
            let arr32: ArrayD<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| LsmError::UnsupportedDtype(format!("{}", e)))?;
            Ok(arr32.mapv(|v| v as Real))
        }
    }
}

/// Load a field over the given ghost box from a `.npy` file. The file
/// shape must equal the ghost-box dims; both `f64` and `f32` files are
/// accepted (`f32` is promoted).
///
/// # Errors
/// Returns an error on I/O failure, unsupported dtype, or shape mismatch.
pub fn load_field_npy<const N: usize>(path: &Path, ghost_box: IndexBox<N>) -> Result<Field<N>> {
    let arr = read_as_real(path)?;
    let expected = ghost_box.dims();
    if arr.shape() != expected {
        return Err(LsmError::ShapeMismatch {
            expected: expected.to_vec(),
            got: arr.shape().to_vec(),
        });
    }
    let mut field = Field::zeros(ghost_box);
    for (nd, &value) in arr.indexed_iter() {
        let mut idx = ghost_box.lower;
        for d in 0..N {
            idx[d] += nd[d] as i32;
        }
        field[idx] = value;
    }
    Ok(field)
}

/// Save a field (ghost cells included) to a `.npy` file, shaped by its
/// ghost box. Values are written as `f64`.
///
/// # Errors
/// Returns an error on I/O failure.
pub fn save_field_npy<const N: usize>(field: &Field<N>, path: &Path) -> Result<()> {
    let gb = *field.ghost_box();
    let dims = gb.dims();
    let arr = ArrayD::from_shape_fn(IxDyn(&dims), |nd| {
        let mut idx = gb.lower;
        for d in 0..N {
            idx[d] += nd[d] as i32;
        }
        field[idx] as f64
    });
    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| LsmError::Other(format!("npy write error: {}", e)))?;
    Ok(())
}

/// Load a flat grid array (the Fast Marching Method surface) from a
/// `.npy` file and check it against the expected shape. The flat layout is
/// axis 0 fastest, matching the solver arrays.
///
/// # Errors
/// Returns an error on I/O failure, unsupported dtype, or shape mismatch.
pub fn load_grid_npy(path: &Path, expected_shape: &[usize]) -> Result<Vec<Real>> {
    let arr = read_as_real(path)?;
    if arr.shape() != expected_shape {
        return Err(LsmError::ShapeMismatch {
            expected: expected_shape.to_vec(),
            got: arr.shape().to_vec(),
        });
    }
    let mut out = vec![0.0; arr.len()];
    let mut strides = vec![0usize; expected_shape.len()];
    if !strides.is_empty() {
        strides[0] = 1;
        for d in 1..strides.len() {
            strides[d] = strides[d - 1] * expected_shape[d - 1];
        }
    }
    for (nd, &value) in arr.indexed_iter() {
        let mut flat = 0;
        for d in 0..strides.len() {
            flat += nd[d] * strides[d];
        }
        out[flat] = value;
    }
    Ok(out)
}

/// Save a flat grid array (axis 0 fastest) to a `.npy` file with the given
/// shape. Values are written as `f64`.
///
/// # Errors
/// Returns an error on I/O failure or if the data length does not match the
/// shape.
pub fn save_grid_npy(data: &[Real], grid_dims: &[usize], path: &Path) -> Result<()> {
    let expected: usize = grid_dims.iter().product();
    if data.len() != expected {
        return Err(LsmError::ShapeMismatch {
            expected: vec![expected],
            got: vec![data.len()],
        });
    }
    let mut strides = vec![0usize; grid_dims.len()];
    if !strides.is_empty() {
        strides[0] = 1;
        for d in 1..strides.len() {
            strides[d] = strides[d - 1] * grid_dims[d - 1];
        }
    }
    let arr = ArrayD::from_shape_fn(IxDyn(grid_dims), |nd| {
        let mut flat = 0;
        for d in 0..strides.len() {
            flat += nd[d] * strides[d];
        }
        data[flat] as f64
    });
    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| LsmError::Other(format!("npy write error: {}", e)))?;
    Ok(())
}
