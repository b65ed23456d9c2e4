use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use super::DetectionRecord;

/// Identifies the video currently selected for viewing.
#[derive(
	Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct SubjectId(pub u64);

/// How far the backend has progressed analyzing a video.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ProcessingStatus {
	NotProcessed = 0,
	Processing = 1,
	Processed = 2,
	Error = 3,
}

impl std::fmt::Display for ProcessingStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let text = match self {
			Self::NotProcessed => "not processed",
			Self::Processing => "processing",
			Self::Processed => "processed",
			Self::Error => "error",
		};
		f.pad(text)
	}
}

/// An uploaded video, as listed by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Video {
	pub id: SubjectId,
	pub filename: String,

	/// ISO 8601, passed through untouched.
	pub upload_date: String,

	pub processed: ProcessingStatus,
}

/// A video along with every detection recorded so far.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoDetections {
	#[serde(flatten)]
	pub video: Video,

	#[serde(default)]
	pub detections: Vec<DetectionRecord>,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn decode() {
		let encoded = r#"{
			"id": 7,
			"filename": "lobby.mp4",
			"upload_date": "2025-03-01T12:00:00",
			"processed": 1,
			"detections": [
				{ "frame_number": 0, "timestamp": 0.0, "object_count": 0, "bounding_boxes": [] }
			]
		}"#;

		let decoded: VideoDetections = serde_json::from_str(encoded).expect("failed to decode");
		assert_eq!(decoded.video.id, SubjectId(7));
		assert_eq!(decoded.video.processed, ProcessingStatus::Processing);
		assert_eq!(decoded.detections.len(), 1);
	}

	#[test]
	fn invalid_status() {
		let encoded = r#"{ "id": 1, "filename": "a.mp4", "upload_date": "", "processed": 9 }"#;
		assert!(serde_json::from_str::<Video>(encoded).is_err());
	}
}
