// lib.rs - Detection core shared by the mobile shells

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod vision;

use serde::{Deserialize, Serialize};

pub use config::DetectorConfig;
pub use vision::{
    decode, run_detection, suppress, ClassLabels, ClassNames, Detection, DetectionPipeline,
    DetectionReport, OutputShape, VisionError,
};

#[cfg(feature = "frame")]
pub use vision::{FrameDetector, InferenceBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    ModelMismatch,
    LabelLookup,
    Inference,
    Overloaded,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::ModelMismatch => "MODEL_MISMATCH",
            Self::LabelLookup => "LABEL_LOOKUP_ERROR",
            Self::Inference => "INFERENCE_ERROR",
            Self::Overloaded => "OVERLOADED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Overloaded => ErrorSeverity::Transient,

            Self::ModelMismatch | Self::Internal => ErrorSeverity::Fatal,

            Self::Validation | Self::LabelLookup | Self::Inference => ErrorSeverity::Permanent,
        }
    }

    /// Only a dropped frame is worth resubmitting as-is.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Overloaded)
    }
}
