use serde::{Deserialize, Serialize};

use crate::vision::error::check_threshold;
use crate::vision::VisionError;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MAX_CONCURRENT_FRAMES: usize = 1;
pub const MAX_CONCURRENT_FRAMES: usize = 16;

/// Post-processing settings shared by the pipeline and the frame detector.
///
/// Missing fields fall back to their defaults when deserialized, so the shell
/// only has to ship the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum winning class score for a candidate to be kept (inclusive)
    pub confidence_threshold: f32,
    /// Overlap above which the weaker of two boxes is suppressed (exclusive)
    pub iou_threshold: f32,
    /// Frames allowed in flight at once on the async path
    pub max_concurrent_frames: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_concurrent_frames: DEFAULT_MAX_CONCURRENT_FRAMES,
        }
    }
}

impl DetectorConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`VisionError::Config`] for malformed JSON, otherwise as [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, VisionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_max_concurrent_frames(mut self, frames: usize) -> Self {
        self.max_concurrent_frames = frames.clamp(1, MAX_CONCURRENT_FRAMES);
        self
    }

    /// Thresholds must lie in `(0, 1]`; the frame limit is clamped.
    ///
    /// # Errors
    ///
    /// [`VisionError::InvalidThreshold`] naming the first bad threshold.
    pub fn validate(mut self) -> Result<Self, VisionError> {
        check_threshold("confidence threshold", self.confidence_threshold)?;
        check_threshold("iou threshold", self.iou_threshold)?;
        self.max_concurrent_frames = self.max_concurrent_frames.clamp(1, MAX_CONCURRENT_FRAMES);
        Ok(self)
    }
}
