use std::collections::{hash_map, HashMap};

use serde::{Deserialize, Serialize};

use super::DetectionRecord;

/// How an upsert resolves a record that already exists for the same frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
	/// The newer record replaces the older one entirely.
	///
	/// A box-less live update will erase the boxes of a batch record for the same frame.
	/// This mirrors what the viewer has always done, even if it loses detail.
	#[default]
	Replace,

	/// Like [`Replace`](Self::Replace), but an incoming record without boxes
	/// keeps the boxes of the record it replaces.
	KeepBoxes,
}

/// The detection records of one subject, keyed by frame number.
///
/// There is at most one record per frame.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
	records: HashMap<u64, DetectionRecord>,
	policy: MergePolicy,
}

impl Timeline {
	pub fn new(policy: MergePolicy) -> Self {
		Self {
			records: HashMap::new(),
			policy,
		}
	}

	/// Seed a timeline from a batch, upserting each record in order.
	pub fn from_records(records: impl IntoIterator<Item = DetectionRecord>, policy: MergePolicy) -> Self {
		let mut this = Self::new(policy);
		for record in records {
			this.upsert(record);
		}
		this
	}

	pub fn policy(&self) -> MergePolicy {
		self.policy
	}

	/// Insert a record, resolving any existing record for the frame with the merge policy.
	///
	/// Returns true if a record for the frame already existed.
	pub fn upsert(&mut self, mut record: DetectionRecord) -> bool {
		match self.records.entry(record.frame_number) {
			hash_map::Entry::Vacant(entry) => {
				entry.insert(record);
				false
			}
			hash_map::Entry::Occupied(mut entry) => {
				if self.policy == MergePolicy::KeepBoxes && record.boxes.is_empty() {
					record.boxes = std::mem::take(&mut entry.get_mut().boxes);
				}

				entry.insert(record);
				true
			}
		}
	}

	pub fn lookup(&self, frame: u64) -> Option<&DetectionRecord> {
		self.records.get(&frame)
	}

	/// Every record in ascending frame order.
	pub fn all(&self) -> Vec<&DetectionRecord> {
		let mut all: Vec<_> = self.records.values().collect();
		all.sort_unstable_by_key(|record| record.frame_number);
		all
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// The sum of the object counts of every frame.
	pub fn total_objects(&self) -> u64 {
		self.records.values().map(|record| record.object_count).sum()
	}

	/// The number of frames that carry at least one bounding box.
	pub fn frames_with_boxes(&self) -> usize {
		self.records.values().filter(|record| record.has_boxes()).count()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::BoundingBox;

	fn boxed(frame: u64) -> DetectionRecord {
		DetectionRecord::new(
			frame,
			frame as f64 / 30.0,
			1,
			vec![BoundingBox::new(10.0, 20.0, 30.0, 40.0, 0.9)],
		)
	}

	fn bare(frame: u64, count: u64) -> DetectionRecord {
		DetectionRecord::new(frame, frame as f64 / 30.0, count, vec![])
	}

	#[test]
	fn lookup() {
		let timeline = Timeline::from_records([boxed(10), bare(11, 0)], MergePolicy::Replace);

		assert_eq!(timeline.len(), 2);
		assert_eq!(timeline.lookup(10).map(|r| r.object_count), Some(1));
		assert_eq!(timeline.lookup(11), Some(&bare(11, 0)));
		assert_eq!(timeline.lookup(12), None);
	}

	#[test]
	fn idempotent() {
		let mut once = Timeline::default();
		once.upsert(boxed(4));

		let mut twice = Timeline::default();
		assert!(!twice.upsert(boxed(4)));
		assert!(twice.upsert(boxed(4)));

		assert_eq!(once.lookup(4), twice.lookup(4));
		assert_eq!(twice.len(), 1);
	}

	#[test]
	fn replace_wins() {
		let mut timeline = Timeline::from_records([boxed(5)], MergePolicy::Replace);
		timeline.upsert(bare(5, 3));

		let record = timeline.lookup(5).expect("missing record");
		assert!(record.boxes.is_empty());
		assert_eq!(record.object_count, 3);
		assert_eq!(timeline.frames_with_boxes(), 0);
	}

	#[test]
	fn keep_boxes() {
		let mut timeline = Timeline::from_records([boxed(5)], MergePolicy::KeepBoxes);
		timeline.upsert(bare(5, 3));

		let record = timeline.lookup(5).expect("missing record");
		assert_eq!(record.boxes, boxed(5).boxes);
		assert_eq!(record.object_count, 3);

		// Records that do carry boxes still replace.
		let mut other = boxed(5);
		other.boxes[0].confidence = 0.5;
		timeline.upsert(other.clone());
		assert_eq!(timeline.lookup(5), Some(&other));
	}

	#[test]
	fn ordered() {
		let timeline = Timeline::from_records([bare(9, 1), bare(2, 1), boxed(30), bare(0, 4)], MergePolicy::Replace);

		let frames: Vec<_> = timeline.all().iter().map(|r| r.frame_number).collect();
		assert_eq!(frames, vec![0, 2, 9, 30]);
		assert_eq!(timeline.total_objects(), 7);
		assert_eq!(timeline.frames_with_boxes(), 1);
	}
}
