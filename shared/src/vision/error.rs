use crate::ErrorKind;

// ============================================================================
// Error Types (sanitized for external consumption)
// ============================================================================

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    #[error("output tensor shape {actual} does not match declared shape {declared}")]
    ShapeMismatch { declared: String, actual: String },

    #[error("invalid model output shape: expected {expected}, got {got}")]
    InvalidOutputShape { expected: String, got: String },

    #[error("invalid {name}: {value}, must be in (0.0, 1.0]")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("class name lookup failed: {0}")]
    LabelLookup(String),

    #[error("inference engine error: {0}")]
    InferenceEngine(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("detector busy, frame dropped")]
    Overloaded,

    #[error("detection worker failed: {0}")]
    Worker(String),
}

// Manual From impl so parser internals stay out of the public error
impl From<serde_json::Error> for VisionError {
    fn from(e: serde_json::Error) -> Self {
        tracing::debug!(error = %e, "config parse error");
        VisionError::Config(format!("line {}, column {}", e.line(), e.column()))
    }
}

impl VisionError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. } | Self::InvalidOutputShape { .. } => ErrorKind::ModelMismatch,
            Self::InvalidThreshold { .. } | Self::Config(_) => ErrorKind::Validation,
            Self::LabelLookup(_) => ErrorKind::LabelLookup,
            Self::InferenceEngine(_) => ErrorKind::Inference,
            Self::Overloaded => ErrorKind::Overloaded,
            Self::Worker(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

pub(crate) fn check_threshold(name: &'static str, value: f32) -> Result<f32, VisionError> {
    if value.is_nan() || value <= 0.0 || value > 1.0 {
        return Err(VisionError::InvalidThreshold { name, value });
    }
    Ok(value)
}
