use tracing::trace;

use super::error::check_threshold;
use super::{Detection, VisionError};

/// Greedy non-maximum suppression.
///
/// Candidates are stably sorted by confidence (descending), so equal scores
/// keep their input order. Walking that order, each surviving box suppresses
/// every later box whose IoU with it is strictly greater than
/// `iou_threshold`. The result stays in descending-confidence order.
///
/// # Errors
///
/// [`VisionError::InvalidThreshold`] unless `0.0 < iou_threshold <= 1.0`.
pub fn suppress(mut candidates: Vec<Detection>, iou_threshold: f32) -> Result<Vec<Detection>, VisionError> {
    let iou_threshold = check_threshold("iou threshold", iou_threshold)?;

    if candidates.len() < 2 {
        return Ok(candidates);
    }

    // slice::sort_by is stable
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let n = candidates.len();
    let mut suppressed = vec![false; n];

    for i in 0..n {
        if suppressed[i] {
            continue;
        }

        let kept = &candidates[i];
        for j in (i + 1)..n {
            if suppressed[j] {
                continue;
            }
            if kept.iou(&candidates[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    let detections: Vec<Detection> = candidates
        .into_iter()
        .zip(suppressed)
        .filter_map(|(det, gone)| (!gone).then_some(det))
        .collect();

    trace!(before = n, after = detections.len(), "nms finished");
    Ok(detections)
}
