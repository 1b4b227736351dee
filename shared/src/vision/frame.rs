use std::sync::Arc;

use metrics::counter;
use ndarray::Array3;
use tokio::sync::Semaphore;
use tracing::{instrument, warn};

use super::{ClassLabels, Detection, DetectionPipeline, OutputShape, VisionError};
use crate::config::DetectorConfig;

/// The raw inference function supplied by the platform shell.
///
/// Implementations own the interpreter and any preprocessing; the core only
/// sees the `[1, C, N]` output and the declared shape from model metadata.
pub trait InferenceBackend: Send + Sync + 'static {
    type Frame: Send + 'static;

    fn output_shape(&self) -> OutputShape;

    fn infer(&self, frame: &Self::Frame) -> Result<Array3<f32>, VisionError>;
}

/// Runs inference and post-processing for camera frames.
///
/// # Thread Safety
///
/// `detect` may be called from any thread. `detect_async` moves the work onto
/// the blocking pool and admits at most `max_concurrent_frames` frames at a
/// time; frames arriving while all slots are taken are rejected with
/// [`VisionError::Overloaded`] instead of queueing behind stale ones. A frame
/// whose future is dropped keeps its slot until its inference returns.
pub struct FrameDetector<B> {
    backend: Arc<B>,
    labels: Arc<ClassLabels>,
    pipeline: DetectionPipeline,
    semaphore: Arc<Semaphore>,
}

impl<B> Clone for FrameDetector<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            labels: Arc::clone(&self.labels),
            pipeline: self.pipeline.clone(),
            semaphore: Arc::clone(&self.semaphore),
        }
    }
}

impl<B: InferenceBackend> FrameDetector<B> {
    /// # Errors
    ///
    /// [`VisionError::InvalidThreshold`] when `config` fails validation.
    pub fn new(backend: B, labels: ClassLabels, config: DetectorConfig) -> Result<Self, VisionError> {
        let pipeline = DetectionPipeline::new(config)?;
        let semaphore = Arc::new(Semaphore::new(pipeline.config().max_concurrent_frames));
        Ok(Self {
            backend: Arc::new(backend),
            labels: Arc::new(labels),
            pipeline,
            semaphore,
        })
    }

    /// [`Self::new`] with [`DetectorConfig::default`].
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn with_defaults(backend: B, labels: ClassLabels) -> Result<Self, VisionError> {
        Self::new(backend, labels, DetectorConfig::default())
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Synchronous inference + post-processing of one frame.
    ///
    /// # Errors
    ///
    /// Backend failures as returned by [`InferenceBackend::infer`], plus any
    /// pipeline error such as [`VisionError::ShapeMismatch`].
    pub fn detect(
        &self,
        frame: &B::Frame,
        original_width: f32,
        original_height: f32,
    ) -> Result<Vec<Detection>, VisionError> {
        Self::detect_with(&self.backend, &self.pipeline, &self.labels, frame, original_width, original_height)
    }

    /// Like [`Self::detect`], off the async runtime's worker threads.
    ///
    /// # Errors
    ///
    /// [`VisionError::Overloaded`] when every slot is busy,
    /// [`VisionError::Worker`] when the blocking task panics, otherwise as
    /// [`Self::detect`].
    #[instrument(skip(self, frame))]
    pub async fn detect_async(
        &self,
        frame: B::Frame,
        original_width: f32,
        original_height: f32,
    ) -> Result<Vec<Detection>, VisionError> {
        let permit = Arc::clone(&self.semaphore).try_acquire_owned().map_err(|_| {
            counter!("vision.frame.rejected").increment(1);
            VisionError::Overloaded
        })?;

        let backend = Arc::clone(&self.backend);
        let labels = Arc::clone(&self.labels);
        let pipeline = self.pipeline.clone();

        // slot is released by the blocking job, not by this future
        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            Self::detect_with(&backend, &pipeline, &labels, &frame, original_width, original_height)
        })
        .await
        .map_err(|e| VisionError::Worker(e.to_string()))?;

        if let Err(e) = &result {
            counter!("vision.frame.errors").increment(1);
            warn!(error = %e, "frame detection failed");
        }

        result
    }

    fn detect_with(
        backend: &B,
        pipeline: &DetectionPipeline,
        labels: &ClassLabels,
        frame: &B::Frame,
        original_width: f32,
        original_height: f32,
    ) -> Result<Vec<Detection>, VisionError> {
        let output = backend.infer(frame)?;
        pipeline.run_declared(&output.view(), backend.output_shape(), original_width, original_height, labels)
    }
}
