//! Perception frame data model.
//!
//! A `Frame` is one snapshot of detected `Object`s, each carrying a class
//! label, a detection confidence, and a `BoundingBox`. This crate holds
//! only plain data and geometry — no temporal logic, no I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box `(xmin, xmax, ymin, ymax)`.
///
/// Invariant: `xmin <= xmax` and `ymin <= ymax`. Construct via [`BoundingBox::new`]
/// to have this checked, or via the `Default` impl for the degenerate zero box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            xmin: 0.0,
            xmax: 0.0,
            ymin: 0.0,
            ymax: 0.0,
        }
    }
}

impl BoundingBox {
    /// Construct a bounding box, clamping out-of-order coordinates so the
    /// invariant always holds rather than panicking on malformed detector
    /// output.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin: xmin.min(xmax),
            xmax: xmin.max(xmax),
            ymin: ymin.min(ymax),
            ymax: ymin.max(ymax),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    /// Project this box onto a single 2-D point via `rp`.
    pub fn reference_point(&self, rp: ReferencePoint) -> (f64, f64) {
        let (cx, cy) = self.center();
        match rp {
            ReferencePoint::Center => (cx, cy),
            ReferencePoint::LeftMargin => (self.xmin, cy),
            ReferencePoint::RightMargin => (self.xmax, cy),
            ReferencePoint::TopMargin => (cx, self.ymin),
            ReferencePoint::BottomMargin => (cx, self.ymax),
        }
    }
}

/// Selects which point on a bounding box to project onto when computing
/// spatial distances between detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferencePoint {
    Center,
    LeftMargin,
    RightMargin,
    TopMargin,
    BottomMargin,
}

/// Euclidean distance between two points.
pub fn euclidean_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// A single detected object within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub object_class: i64,
    pub probability: f64,
    pub bbox: BoundingBox,
}

impl Object {
    /// Construct an object, clamping `probability` into `[0, 1]` so that a
    /// slightly out-of-range detector score never trips downstream
    /// confidence comparisons into undefined territory.
    pub fn new(object_class: i64, probability: f64, bbox: BoundingBox) -> Self {
        Self {
            object_class,
            probability: probability.clamp(0.0, 1.0),
            bbox,
        }
    }
}

/// One perception snapshot: a set of detected objects keyed by a stable
/// per-frame ID, plus frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame_num: u64,
    pub timestamp: f64,
    pub size_x: u32,
    pub size_y: u32,
    pub objects: HashMap<String, Object>,
}

impl Frame {
    pub fn new(frame_num: u64, timestamp: f64, size_x: u32, size_y: u32) -> Self {
        Self {
            frame_num,
            timestamp,
            size_x,
            size_y,
            objects: HashMap::new(),
        }
    }

    /// The full image rectangle this frame's detections live in.
    pub fn universe_bbox(&self) -> BoundingBox {
        BoundingBox::new(0.0, self.size_x as f64, 0.0, self.size_y as f64)
    }
}

/// Convert a duration in seconds to a non-negative frame count via `ceil(t * fps)`.
///
/// `fps` must be strictly positive (enforced by callers that accept `fps`
/// as configuration, e.g. `stql-monitor::OnlineMonitor::new`).
pub fn seconds_to_frames(seconds: f64, fps: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * fps).ceil() as u64
}
