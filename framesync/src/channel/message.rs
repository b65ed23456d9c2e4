use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Epoch;
use crate::{Error, Result, SubjectId};

/// A live progress message: the object count for one frame, without boxes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveMessage {
	#[serde(rename = "video_id")]
	pub subject: SubjectId,
	pub frame_number: u64,
	pub object_count: u64,
}

impl LiveMessage {
	pub fn parse(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(|err| Error::Parse(Arc::new(err)))
	}
}

/// A parsed live message, tagged with the epoch it was received under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveUpdate {
	pub epoch: Epoch,
	pub message: LiveMessage,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parse() {
		let message = LiveMessage::parse(r#"{"video_id": 7, "frame_number": 12, "object_count": 2}"#)
			.expect("failed to parse");

		assert_eq!(
			message,
			LiveMessage {
				subject: SubjectId(7),
				frame_number: 12,
				object_count: 2,
			}
		);
	}

	#[test]
	fn malformed() {
		for text in [
			"",
			"not json",
			"[]",
			r#"{"video_id": 7}"#,
			r#"{"video_id": 7, "frame_number": -1, "object_count": 2}"#,
			r#"{"video_id": "seven", "frame_number": 1, "object_count": 2}"#,
		] {
			assert!(
				matches!(LiveMessage::parse(text), Err(Error::Parse(_))),
				"parsed {text:?}"
			);
		}
	}
}
