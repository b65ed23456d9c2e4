use serde::{Deserialize, Serialize};

use crate::FrameClock;

/// A detected object in content space, ie. pixels of the source video.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub confidence: f64, // 0.0 to 1.0
}

impl BoundingBox {
	pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Self {
		Self {
			x1,
			y1,
			x2,
			y2,
			confidence,
		}
	}

	pub fn width(&self) -> f64 {
		self.x2 - self.x1
	}

	pub fn height(&self) -> f64 {
		self.y2 - self.y1
	}

	/// The confidence as a whole percentage, rounded half away from zero.
	pub fn percent(&self) -> i64 {
		(self.confidence * 100.0).round() as i64
	}
}

/// The detections for a single analysis frame.
///
/// Records from the batch source carry bounding boxes; records synthesized
/// from live updates only carry a count and have no boxes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectionRecord {
	pub frame_number: u64,

	/// Seconds from the start of the video.
	///
	/// Older rows from the backend may lack it; see [`DetectionRecord::fill_timestamp`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<f64>,

	pub object_count: u64,

	#[serde(default, rename = "bounding_boxes")]
	pub boxes: Vec<BoundingBox>,
}

impl DetectionRecord {
	pub fn new(frame_number: u64, timestamp: f64, object_count: u64, boxes: Vec<BoundingBox>) -> Self {
		Self {
			frame_number,
			timestamp: Some(timestamp),
			object_count,
			boxes,
		}
	}

	/// Synthesize a box-less record from a live update.
	pub fn live(frame_number: u64, object_count: u64, clock: &FrameClock) -> Self {
		Self::new(frame_number, clock.timestamp_for(frame_number), object_count, Vec::new())
	}

	/// Derive a missing timestamp from the frame number at the clock's rate.
	pub fn fill_timestamp(&mut self, clock: &FrameClock) -> f64 {
		let frame = self.frame_number;
		*self.timestamp.get_or_insert_with(|| clock.timestamp_for(frame))
	}

	pub fn has_boxes(&self) -> bool {
		!self.boxes.is_empty()
	}
}
