/// The rate, in frames per second, at which the backend samples detections.
///
/// This is NOT the frame rate of the video itself. Playback time is mapped to
/// analysis frames at this fixed rate, so a 24fps or 60fps video will appear to
/// drift slightly relative to its detections. Whatever rate is used here must
/// match the one used to produce the detections.
pub const SAMPLING_RATE: f64 = 30.0;

/// Map a playback position to a discrete analysis frame index.
///
/// Negative and NaN positions map to frame 0.
pub fn frame_index_for(seconds: f64, rate: f64) -> u64 {
	// f64::max ignores NaN, and float to int casts saturate.
	(seconds.max(0.0) * rate).floor() as u64
}

/// Converts between playback time and analysis frame numbers at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
	rate: f64,
}

impl Default for FrameClock {
	fn default() -> Self {
		Self::new(SAMPLING_RATE)
	}
}

impl FrameClock {
	pub fn new(rate: f64) -> Self {
		Self { rate }
	}

	pub fn rate(&self) -> f64 {
		self.rate
	}

	/// The frame under the playhead at the given position in seconds.
	pub fn frame_at(&self, seconds: f64) -> u64 {
		frame_index_for(seconds, self.rate)
	}

	/// The position in seconds where the given frame starts.
	pub fn timestamp_for(&self, frame: u64) -> f64 {
		frame as f64 / self.rate
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn floor() {
		assert_eq!(frame_index_for(0.0, SAMPLING_RATE), 0);
		assert_eq!(frame_index_for(0.0333, SAMPLING_RATE), 0);
		assert_eq!(frame_index_for(0.034, SAMPLING_RATE), 1);
		assert_eq!(frame_index_for(0.4, SAMPLING_RATE), 12);
		assert_eq!(frame_index_for(10.0, SAMPLING_RATE), 300);
	}

	#[test]
	fn clamps() {
		assert_eq!(frame_index_for(-5.0, SAMPLING_RATE), 0);
		assert_eq!(frame_index_for(f64::NAN, SAMPLING_RATE), 0);
		assert_eq!(frame_index_for(f64::INFINITY, SAMPLING_RATE), u64::MAX);
	}

	#[test]
	fn monotonic() {
		let mut last = 0;
		for step in 0..10_000 {
			let frame = frame_index_for(step as f64 * 0.0071, SAMPLING_RATE);
			assert!(frame >= last, "frame went backwards at step {step}");
			last = frame;
		}
	}

	#[test]
	fn timestamps() {
		let clock = FrameClock::default();
		assert_eq!(clock.timestamp_for(12), 0.4);
		assert_eq!(clock.frame_at(clock.timestamp_for(12)), 12);

		let slow = FrameClock::new(10.0);
		assert_eq!(slow.frame_at(1.25), 12);
		assert_eq!(slow.timestamp_for(5), 0.5);
	}
}
