use ndarray::Array3;
use tfliteyolo_shared::vision::view_from_flat;
use tfliteyolo_shared::{
    decode, run_detection, suppress, ClassLabels, Detection, DetectionPipeline, DetectorConfig,
    OutputShape, VisionError,
};

const LABELS: &str = "person\nbicycle\ncar";

/// Lays candidates out channel-major: `[x, y, w, h, scores...]` per column.
fn output(candidates: &[([f32; 4], Vec<f32>)]) -> Array3<f32> {
    let classes = candidates.first().map_or(0, |(_, s)| s.len());
    let mut t = Array3::<f32>::zeros((1, 4 + classes, candidates.len()));
    for (i, (bbox, scores)) in candidates.iter().enumerate() {
        for (c, v) in bbox.iter().chain(scores.iter()).enumerate() {
            t[[0, c, i]] = *v;
        }
    }
    t
}

#[test]
fn near_identical_boxes_collapse_to_the_strongest() {
    let t = output(&[
        ([0.5, 0.5, 0.4, 0.4], vec![0.9, 0.1]),
        ([0.52, 0.5, 0.4, 0.4], vec![0.85, 0.05]),
    ]);
    let labels = ClassLabels::from_lines(LABELS);
    let shape = OutputShape::of(&t.view());

    // 1. Decode keeps both candidates, scaled to the 100x100 image
    let decoded = decode(&t.view(), shape, 100.0, 100.0, &labels, 0.5).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].confidence, 0.9);
    assert_eq!(decoded[1].confidence, 0.85);
    assert!((decoded[1].box_x - 52.0).abs() < 1e-4);
    assert!(decoded[0].iou(&decoded[1]) > 0.5);

    // 2. Suppression drops the weaker duplicate
    let kept = suppress(decoded, 0.5).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].confidence, 0.9);
    assert_eq!(kept[0].class_name, "person");

    // 3. The one-call entry point agrees
    assert_eq!(run_detection(&t.view(), 100.0, 100.0, &labels).unwrap(), kept);
}

#[test]
fn weak_frame_yields_nothing() {
    let t = output(&[
        ([0.5, 0.5, 0.4, 0.4], vec![0.2, 0.3, 0.1]),
        ([0.1, 0.1, 0.1, 0.1], vec![0.49, 0.0, 0.0]),
    ]);
    let labels = ClassLabels::from_lines(LABELS);

    let decoded = decode(&t.view(), OutputShape::of(&t.view()), 100.0, 100.0, &labels, 0.5).unwrap();
    assert!(decoded.is_empty());
    assert!(suppress(decoded, 0.5).unwrap().is_empty());
    assert!(run_detection(&t.view(), 100.0, 100.0, &labels).unwrap().is_empty());
}

#[test]
fn separate_objects_come_back_strongest_first() {
    let t = output(&[
        ([0.2, 0.2, 0.1, 0.1], vec![0.0, 0.6, 0.0]),
        ([0.8, 0.8, 0.1, 0.1], vec![0.0, 0.0, 0.95]),
        ([0.5, 0.2, 0.1, 0.1], vec![0.7, 0.0, 0.0]),
    ]);
    let labels = ClassLabels::from_lines(LABELS);

    let out = run_detection(&t.view(), 640.0, 480.0, &labels).unwrap();
    let names: Vec<&str> = out.iter().map(|d| d.class_name.as_str()).collect();
    assert_eq!(names, ["car", "person", "bicycle"]);
    assert_eq!(out[0].display_label(), "car (95.00%)");
}

#[test]
fn flat_runtime_buffers_decode_like_arrays() {
    // two classes, two candidates, channel-major
    let data: [f32; 12] = [
        0.5, 0.1, // x
        0.5, 0.1, // y
        0.2, 0.1, // w
        0.2, 0.1, // h
        0.1, 0.8, // class 0
        0.7, 0.0, // class 1
    ];
    let view = view_from_flat(&[1, 6, 2], &data).unwrap();
    let out = run_detection(&view, 10.0, 10.0, &ClassLabels::from_lines(LABELS)).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!((out[0].class_index, out[0].confidence), (0, 0.8));
    assert_eq!((out[1].class_index, out[1].confidence), (1, 0.7));
    assert!((out[1].box_x - 5.0).abs() < 1e-4);
}

#[test]
fn unknown_classes_get_empty_labels() {
    let t = output(&[([0.5, 0.5, 0.2, 0.2], vec![0.0, 0.0, 0.0, 0.9])]);
    let out = run_detection(&t.view(), 1.0, 1.0, &ClassLabels::from_lines(LABELS)).unwrap();
    assert_eq!(out[0].class_index, 3);
    assert_eq!(out[0].class_name, "");
}

#[test]
fn metadata_mismatch_fails_loudly() {
    let t = output(&[([0.5, 0.5, 0.2, 0.2], vec![0.9])]);
    let pipeline = DetectionPipeline::default();
    let err = pipeline
        .run_declared(&t.view(), OutputShape::for_classes(80, 8400), 1.0, 1.0, &ClassLabels::default())
        .unwrap_err();
    assert!(matches!(err, VisionError::ShapeMismatch { .. }));
    assert_eq!(err.kind().code(), "MODEL_MISMATCH");
}

#[test]
fn configured_pipeline_from_json() {
    let config = DetectorConfig::from_json(r#"{ "confidence_threshold": 0.8, "iou_threshold": 0.3 }"#).unwrap();
    let pipeline = DetectionPipeline::new(config).unwrap();

    let t = output(&[
        ([0.5, 0.5, 0.4, 0.4], vec![0.9]),
        ([0.6, 0.5, 0.4, 0.4], vec![0.85]),
        ([0.1, 0.1, 0.1, 0.1], vec![0.75]),
    ]);
    let report = pipeline
        .run_with_report(&t.view(), OutputShape::of(&t.view()), 100.0, 100.0, &ClassLabels::from_lines("thing"))
        .unwrap();

    // 0.75 is under the confidence threshold; the 0.85 box overlaps 0.9 by 0.6
    assert_eq!(report.candidates_before_nms, 2);
    assert_eq!(report.detections.len(), 1);
    assert!(report.postprocess_ms >= 0.0);
}

#[test]
fn results_are_plain_serializable_values() {
    let t = output(&[([0.5, 0.5, 0.4, 0.4], vec![0.9])]);
    let out = run_detection(&t.view(), 100.0, 100.0, &ClassLabels::from_lines("thing")).unwrap();

    let json = serde_json::to_string(&out).unwrap();
    let back: Vec<Detection> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, out);
}
