//! Post-processing for YOLO-family detector outputs.
//!
//! The model hands back a channel-major `[1, 4 + classes, candidates]` tensor.
//! [`decode`] picks the best class per candidate and scales boxes to the
//! original image, [`suppress`] removes overlapping boxes, and
//! [`run_detection`] chains the two with the default thresholds.

mod decoder;
mod detection;
pub(crate) mod error;
mod labels;
mod nms;
mod pipeline;
mod tensor;

#[cfg(feature = "frame")]
mod frame;

pub use self::decoder::decode;
pub use self::detection::Detection;
pub use self::error::VisionError;
pub use self::labels::{ClassLabels, ClassNames, LookupFn};
pub use self::nms::suppress;
pub use self::pipeline::{run_detection, DetectionPipeline, DetectionReport};
pub use self::tensor::{view_from_flat, OutputShape, BOX_CHANNELS};

#[cfg(feature = "frame")]
pub use self::frame::{FrameDetector, InferenceBackend};
