use serde::{Deserialize, Serialize};

/// One labeled bounding box in original-image pixel space.
///
/// The box is center-based: `(box_x, box_y)` is the center and
/// `box_width`/`box_height` the full extent. Negative extents coming from the
/// model are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Detection {
    /// Index into the class-name table
    pub class_index: usize,
    /// Resolved label, empty when the table has no entry for `class_index`
    pub class_name: String,
    /// Winning class score (0.0..=1.0)
    pub confidence: f32,
    pub box_x: f32,
    pub box_y: f32,
    pub box_width: f32,
    pub box_height: f32,
}

impl Detection {
    /// Edges as `[left, top, right, bottom]`.
    pub fn corners(&self) -> [f32; 4] {
        let half_w = self.box_width / 2.0;
        let half_h = self.box_height / 2.0;
        [
            self.box_x - half_w,
            self.box_y - half_h,
            self.box_x + half_w,
            self.box_y + half_h,
        ]
    }

    pub fn area(&self) -> f32 {
        self.box_width * self.box_height
    }

    /// Intersection over union with `other`; 0.0 when the union is empty.
    pub fn iou(&self, other: &Detection) -> f32 {
        let [a_left, a_top, a_right, a_bottom] = self.corners();
        let [b_left, b_top, b_right, b_bottom] = other.corners();

        let left = a_left.max(b_left);
        let top = a_top.max(b_top);
        let right = a_right.min(b_right);
        let bottom = a_bottom.min(b_bottom);

        let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Overlay caption, e.g. `person (91.25%)`.
    pub fn display_label(&self) -> String {
        format!("{} ({:.2}%)", self.class_name, self.confidence * 100.0)
    }
}

#[cfg(test)]
pub(crate) fn boxed(confidence: f32, x: f32, y: f32, w: f32, h: f32) -> Detection {
    Detection {
        class_index: 0,
        class_name: String::new(),
        confidence,
        box_x: x,
        box_y: y,
        box_width: w,
        box_height: h,
    }
}
