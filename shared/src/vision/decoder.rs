use ndarray::ArrayView3;
use tracing::debug;

use super::tensor::BOX_CHANNELS;
use super::{ClassNames, Detection, OutputShape, VisionError};

/// Decodes a channel-major `[1, C, N]` output into thresholded candidates.
///
/// Each candidate keeps its highest-scoring class; the scan starts at 0.0 and
/// only a strictly greater score wins, so the lowest class index takes ties.
/// Candidates whose best score is below `confidence_threshold` are dropped.
/// Box channels are scaled from image fractions to pixels of the original
/// image. A degenerate `shape` (no classes or no candidates) yields nothing.
///
/// # Errors
///
/// [`VisionError::ShapeMismatch`] when `raw_output` is not exactly the declared
/// shape, and [`VisionError::LabelLookup`] when `class_names` fails.
pub fn decode<L>(
    raw_output: &ArrayView3<'_, f32>,
    shape: OutputShape,
    original_width: f32,
    original_height: f32,
    class_names: &L,
    confidence_threshold: f32,
) -> Result<Vec<Detection>, VisionError>
where
    L: ClassNames + ?Sized,
{
    if shape.is_degenerate() {
        debug!(%shape, "degenerate output shape, nothing to decode");
        return Ok(Vec::new());
    }
    shape.check(raw_output)?;

    let num_classes = shape.num_classes();
    let mut detections = Vec::new();

    for i in 0..shape.candidates {
        let Some((class_index, best_score)) = best_class(raw_output, i, num_classes) else {
            continue;
        };
        if best_score < confidence_threshold {
            continue;
        }

        let class_name = class_names.class_name(class_index)?.unwrap_or_default();

        detections.push(Detection {
            class_index,
            class_name,
            confidence: best_score,
            box_x: raw_output[[0, 0, i]] * original_width,
            box_y: raw_output[[0, 1, i]] * original_height,
            box_width: raw_output[[0, 2, i]] * original_width,
            box_height: raw_output[[0, 3, i]] * original_height,
        });
    }

    Ok(detections)
}

/// Left-to-right scan over the class channels of candidate `i`.
fn best_class(raw_output: &ArrayView3<'_, f32>, i: usize, num_classes: usize) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    let mut best_score = 0.0f32;

    for class_index in 0..num_classes {
        let score = raw_output[[0, BOX_CHANNELS + class_index, i]];
        if score > best_score {
            best_score = score;
            best = Some((class_index, score));
        }
    }

    best
}
