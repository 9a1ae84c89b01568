// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during operator setup, narrow-band handling, I/O,
/// or Fast Marching Method execution.
#[derive(Debug)]
pub enum LsmError {
    /// An index box has an upper corner below its lower corner.
    InvalidBox {
        /// The axis index.
        axis: usize,
        /// The lower corner on that axis.
        lower: i32,
        /// The upper corner on that axis.
        upper: i32,
    },
    /// The fill box, widened by the operator's stencil width, is not
    /// contained in the ghost box of one of the arguments.
    FillBoxNotContained {
        /// Name of the offending argument.
        field: &'static str,
        /// Stencil margin (in cells) the operator requires.
        margin: i32,
    },
    /// Grid spacing is not positive and finite.
    InvalidGridSpacing {
        /// The axis index.
        axis: usize,
        /// The spacing provided.
        value: f64,
    },
    /// Grid shape is invalid (dimension too small for the stencil).
    InvalidGridShape {
        /// The axis index.
        axis: usize,
        /// The size provided.
        size: usize,
    },
    /// Array length or shape does not match the expected shape.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape encountered.
        got: Vec<usize>,
    },
    /// Speed value in an Eikonal solve is not positive and finite.
    InvalidSpeed {
        /// The flat index of the invalid value.
        index: usize,
        /// The invalid value.
        value: f64,
    },
    /// A narrow-band index list entry falls outside the mask ghost box.
    BandIndexOutOfBounds {
        /// Position of the entry in the index list.
        position: usize,
        /// The offending grid index.
        index: Vec<i32>,
    },
    /// Narrow-band layer cursors are inconsistent with the index list.
    InvalidBandLayers {
        /// The layer whose cursors are out of range.
        layer: usize,
        /// Length of the index list.
        len: usize,
    },
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for LsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsmError::InvalidBox { axis, lower, upper } => {
                write!(
                    f,
                    "invalid index box: axis {} has upper corner {} below lower corner {}",
                    axis, upper, lower
                )
            }
            LsmError::FillBoxNotContained { field, margin } => {
                write!(
                    f,
                    "fill box widened by {} cells is not contained in the ghost box of '{}'",
                    margin, field
                )
            }
            LsmError::InvalidGridSpacing { axis, value } => {
                write!(
                    f,
                    "invalid grid spacing on axis {}: {} (must be positive and finite)",
                    axis, value
                )
            }
            LsmError::InvalidGridShape { axis, size } => {
                write!(
                    f,
                    "invalid grid shape: axis {} has size {} (must be >= 2)",
                    axis, size
                )
            }
            LsmError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            LsmError::InvalidSpeed { index, value } => {
                write!(
                    f,
                    "invalid speed at index {}: {} (must be positive and finite)",
                    index, value
                )
            }
            LsmError::BandIndexOutOfBounds { position, index } => {
                write!(
                    f,
                    "narrow-band list entry {} at {:?} falls outside the mask ghost box",
                    position, index
                )
            }
            LsmError::InvalidBandLayers { layer, len } => {
                write!(
                    f,
                    "narrow-band layer {} has cursors outside the index list (length {})",
                    layer, len
                )
            }
            LsmError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            LsmError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            LsmError::IoError(e) => write!(f, "I/O error: {}", e),
            LsmError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LsmError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LsmError {
    fn from(e: std::io::Error) -> Self {
        LsmError::IoError(e)
    }
}

/// Convenience type alias for Results with LsmError.
pub type Result<T> = std::result::Result<T, LsmError>;
