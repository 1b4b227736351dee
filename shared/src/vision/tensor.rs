use std::fmt;

use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};

use super::VisionError;

/// Channels 0..4 carry `[x, y, w, h]`; class scores follow.
pub const BOX_CHANNELS: usize = 4;

/// Declared `[1, C, N]` output shape taken from model metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    /// `C = 4 + num_classes`
    pub channels: usize,
    /// `N`, number of candidate boxes
    pub candidates: usize,
}

impl OutputShape {
    pub const fn new(channels: usize, candidates: usize) -> Self {
        Self { channels, candidates }
    }

    pub const fn for_classes(num_classes: usize, candidates: usize) -> Self {
        Self::new(BOX_CHANNELS + num_classes, candidates)
    }

    /// Shape of an already materialized tensor.
    pub fn of(tensor: &ArrayView3<'_, f32>) -> Self {
        let (_, channels, candidates) = tensor.dim();
        Self { channels, candidates }
    }

    /// Reads `[1, C, N]` dims as reported by the inference runtime.
    ///
    /// # Errors
    ///
    /// [`VisionError::InvalidOutputShape`] unless `dims` is three non-negative
    /// values with a batch of one.
    pub fn from_dims(dims: &[i64]) -> Result<Self, VisionError> {
        let bad = || VisionError::InvalidOutputShape {
            expected: "[1, channels, candidates]".into(),
            got: format!("{dims:?}"),
        };

        let &[batch, channels, candidates] = dims else {
            return Err(bad());
        };
        if batch != 1 || channels < 0 || candidates < 0 {
            return Err(bad());
        }

        let channels = usize::try_from(channels).map_err(|_| bad())?;
        let candidates = usize::try_from(candidates).map_err(|_| bad())?;
        Ok(Self { channels, candidates })
    }

    pub const fn num_classes(&self) -> usize {
        self.channels.saturating_sub(BOX_CHANNELS)
    }

    /// True when decoding cannot yield any detection.
    pub const fn is_degenerate(&self) -> bool {
        self.num_classes() == 0 || self.candidates == 0
    }

    /// `C * N`, or `None` when the declared dims overflow `usize`.
    pub const fn element_count(&self) -> Option<usize> {
        self.channels.checked_mul(self.candidates)
    }

    /// Fails unless `tensor` is exactly `[1, C, N]`.
    ///
    /// # Errors
    ///
    /// [`VisionError::ShapeMismatch`] naming both shapes.
    pub fn check(&self, tensor: &ArrayView3<'_, f32>) -> Result<(), VisionError> {
        if tensor.dim() != (1, self.channels, self.candidates) {
            return Err(VisionError::ShapeMismatch {
                declared: self.to_string(),
                actual: format!("{:?}", tensor.shape()),
            });
        }
        Ok(())
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[1, {}, {}]", self.channels, self.candidates)
    }
}

/// Borrows a flat channel-major buffer as a `[1, C, N]` tensor.
///
/// # Errors
///
/// [`VisionError::InvalidOutputShape`] when `dims` is malformed, too large to
/// address, or disagrees with the buffer length.
pub fn view_from_flat<'a>(dims: &[i64], data: &'a [f32]) -> Result<ArrayView3<'a, f32>, VisionError> {
    let shape = OutputShape::from_dims(dims)?;
    let Some(expected_len) = shape.element_count() else {
        return Err(VisionError::InvalidOutputShape {
            expected: "[1, channels, candidates] addressable in memory".into(),
            got: format!("{dims:?}"),
        });
    };
    if data.len() != expected_len {
        return Err(VisionError::InvalidOutputShape {
            expected: format!("{expected_len} elements for {shape}"),
            got: format!("{} elements", data.len()),
        });
    }

    ArrayView3::from_shape((1, shape.channels, shape.candidates), data)
        .map_err(|e| VisionError::InvalidOutputShape {
            expected: shape.to_string(),
            got: e.to_string(),
        })
}
