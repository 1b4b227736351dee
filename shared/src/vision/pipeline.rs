use std::time::Instant;

use metrics::{counter, histogram};
use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{decode, suppress, ClassNames, Detection, OutputShape, VisionError};
use crate::config::DetectorConfig;

/// Detections plus metadata about the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct DetectionReport {
    pub detections: Vec<Detection>,
    /// Candidates that passed the confidence threshold, before NMS
    pub candidates_before_nms: usize,
    /// Decode + NMS duration
    pub postprocess_ms: f64,
}

/// Decoder followed by suppressor, with validated thresholds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionPipeline {
    config: DetectorConfig,
}

impl DetectionPipeline {
    /// # Errors
    ///
    /// Returns [`VisionError::InvalidThreshold`] for thresholds outside `(0, 1]`.
    pub fn new(config: DetectorConfig) -> Result<Self, VisionError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs detection using the tensor's own dims as the declared shape.
    ///
    /// # Errors
    ///
    /// [`VisionError::LabelLookup`] when `class_names` fails.
    pub fn run<L>(
        &self,
        raw_output: &ArrayView3<'_, f32>,
        original_width: f32,
        original_height: f32,
        class_names: &L,
    ) -> Result<Vec<Detection>, VisionError>
    where
        L: ClassNames + ?Sized,
    {
        self.run_with_report(raw_output, OutputShape::of(raw_output), original_width, original_height, class_names)
            .map(|report| report.detections)
    }

    /// Runs detection against the shape declared by model metadata.
    ///
    /// # Errors
    ///
    /// See [`Self::run_with_report`].
    pub fn run_declared<L>(
        &self,
        raw_output: &ArrayView3<'_, f32>,
        shape: OutputShape,
        original_width: f32,
        original_height: f32,
        class_names: &L,
    ) -> Result<Vec<Detection>, VisionError>
    where
        L: ClassNames + ?Sized,
    {
        self.run_with_report(raw_output, shape, original_width, original_height, class_names)
            .map(|report| report.detections)
    }

    /// Decode + suppress, reporting the pre-NMS count and timing.
    ///
    /// # Errors
    ///
    /// [`VisionError::ShapeMismatch`] when `raw_output` disagrees with `shape`,
    /// [`VisionError::LabelLookup`] when `class_names` fails.
    #[instrument(skip(self, raw_output, class_names))]
    pub fn run_with_report<L>(
        &self,
        raw_output: &ArrayView3<'_, f32>,
        shape: OutputShape,
        original_width: f32,
        original_height: f32,
        class_names: &L,
    ) -> Result<DetectionReport, VisionError>
    where
        L: ClassNames + ?Sized,
    {
        let start = Instant::now();
        counter!("vision.pipeline.runs").increment(1);

        let candidates = decode(
            raw_output,
            shape,
            original_width,
            original_height,
            class_names,
            self.config.confidence_threshold,
        )?;
        let candidates_before_nms = candidates.len();

        let detections = suppress(candidates, self.config.iou_threshold)?;
        let postprocess_ms = start.elapsed().as_secs_f64() * 1000.0;

        histogram!("vision.pipeline.candidates").record(candidates_before_nms as f64);
        histogram!("vision.pipeline.duration_ms").record(postprocess_ms);

        debug!(
            detections = detections.len(),
            candidates_before_nms,
            postprocess_ms,
            "Detection completed"
        );

        Ok(DetectionReport {
            detections,
            candidates_before_nms,
            postprocess_ms,
        })
    }
}

/// Decode then suppress with the default thresholds (confidence 0.5, IoU 0.5).
///
/// This is the entry point the inference wrapper and the renderer share.
///
/// # Errors
///
/// [`VisionError::LabelLookup`] when `class_names` fails.
pub fn run_detection<L>(
    raw_output: &ArrayView3<'_, f32>,
    original_width: f32,
    original_height: f32,
    class_names: &L,
) -> Result<Vec<Detection>, VisionError>
where
    L: ClassNames + ?Sized,
{
    DetectionPipeline::default().run(raw_output, original_width, original_height, class_names)
}
