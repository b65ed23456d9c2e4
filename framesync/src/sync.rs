use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelEvent, ChannelOutput, ChannelState, Connector, LiveChannel, LiveUpdate};
use crate::render::{OverlayInput, OverlayRenderer, OverlayStyle, Scale, Size, Surface};
use crate::{DetectionRecord, FrameClock, MergePolicy, Result, SubjectId, Timeline, SAMPLING_RATE};

/// Fetches every detection recorded so far for a subject.
pub trait BatchSource {
	fn fetch(&self, subject: SubjectId) -> impl Future<Output = Result<Vec<DetectionRecord>>>;
}

/// Tunables for a [`PlaybackSync`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
	/// The rate detections were sampled at.
	///
	/// Used to find the frame under the playhead, to timestamp live updates and to
	/// fill in stored records that lack a timestamp.
	pub sampling_rate: f64,

	/// How live updates are merged into records that already exist.
	pub merge: MergePolicy,

	pub style: OverlayStyle,

	/// Whether boxes are shown initially.
	pub visible: bool,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			sampling_rate: SAMPLING_RATE,
			merge: MergePolicy::default(),
			style: OverlayStyle::default(),
			visible: true,
		}
	}
}

/// Keeps the overlay in lockstep with playback for the selected subject.
///
/// One instance per active view. It owns the live channel, so dropping it closes
/// any open connection.
pub struct PlaybackSync<C: Connector, S: Surface> {
	clock: FrameClock,
	merge: MergePolicy,
	channel: LiveChannel<C>,
	renderer: OverlayRenderer,
	surface: S,

	subject: Option<SubjectId>,
	timeline: Option<Timeline>,

	// The frame under the playhead as of the last position sample.
	frame: Option<u64>,

	native: Size,
	display: Size,
	visible: bool,

	// Incremented on every draw that reached the surface.
	renders: u64,
}

impl<C: Connector, S: Surface> PlaybackSync<C, S> {
	pub fn new(config: SyncConfig, channel: LiveChannel<C>, surface: S) -> Self {
		Self {
			clock: FrameClock::new(config.sampling_rate),
			merge: config.merge,
			channel,
			renderer: OverlayRenderer::new(config.style),
			surface,
			subject: None,
			timeline: None,
			frame: None,
			native: Size::default(),
			display: Size::default(),
			visible: config.visible,
			renders: 0,
		}
	}

	/// Select a subject: seed a fresh timeline from the batch source, then go live.
	///
	/// If the fetch fails the subject is still selected, with an empty timeline and
	/// the live channel bound, and the error is returned for the caller to report.
	///
	/// The previous subject's connection is closed before fetching, so dropping the
	/// returned future part way leaves the channel idle rather than bound to the old subject.
	pub async fn select<B: BatchSource>(&mut self, subject: SubjectId, source: &B) -> Result<()> {
		tracing::info!(%subject, "selecting");

		self.channel.bind(None);
		self.subject = Some(subject);
		self.timeline = Some(Timeline::new(self.merge));
		self.frame = None;
		self.render();

		let res = match source.fetch(subject).await {
			Ok(mut records) => {
				for record in &mut records {
					record.fill_timestamp(&self.clock);
				}

				let timeline = Timeline::from_records(records, self.merge);
				tracing::info!(%subject, frames = timeline.len(), "fetched detections");
				self.timeline = Some(timeline);
				Ok(())
			}
			Err(err) => {
				tracing::warn!(%subject, %err, "failed to fetch detections");
				Err(err)
			}
		};

		self.channel.bind(Some(subject));
		self.render();

		res
	}

	/// Drop the subject, closing the live channel and discarding the timeline.
	pub fn deselect(&mut self) {
		if let Some(subject) = self.subject.take() {
			tracing::info!(%subject, "deselecting");
		}

		self.channel.bind(None);
		self.timeline = None;
		self.frame = None;
		self.render();
	}

	/// Handle a playback position sample, in seconds.
	///
	/// Only redraws when the position crossed into a different frame.
	/// Returns true if it did.
	pub fn on_time(&mut self, seconds: f64) -> bool {
		let frame = self.clock.frame_at(seconds);
		if self.frame == Some(frame) {
			return false;
		}

		self.frame = Some(frame);
		self.render().is_some()
	}

	/// Handle an event from the live transport.
	///
	/// Returns the new channel state if it changed.
	pub fn on_channel(&mut self, event: ChannelEvent) -> Option<ChannelState> {
		match self.channel.handle(event)? {
			ChannelOutput::State(state) => Some(state),
			ChannelOutput::Update(update) => {
				self.on_update(update);
				None
			}
		}
	}

	/// Apply a live update, unless it belongs to a previous binding.
	///
	/// Returns true if the timeline was changed.
	pub fn on_update(&mut self, update: LiveUpdate) -> bool {
		let current = self.channel.epoch();
		if update.epoch != current {
			tracing::debug!(epoch = %update.epoch, %current, "dropping stale update");
			return false;
		}

		let message = update.message;
		if self.subject != Some(message.subject) {
			tracing::debug!(subject = %message.subject, "dropping update for another subject");
			return false;
		}

		let record = DetectionRecord::live(message.frame_number, message.object_count, &self.clock);
		self.apply(record)
	}

	/// Insert a record produced locally, ie. an optimistic update.
	///
	/// Returns false if no subject is selected.
	pub fn insert_local(&mut self, record: DetectionRecord) -> bool {
		self.apply(record)
	}

	/// The intrinsic video size became known (or changed).
	pub fn on_metadata(&mut self, native: Size) {
		self.native = native;
		self.render();
	}

	/// The video element was resized.
	pub fn on_resize(&mut self, display: Size) {
		self.display = display;
		self.render();
	}

	pub fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
		self.render();
	}

	/// Flip the visibility of the boxes, returning the new value.
	pub fn toggle_visible(&mut self) -> bool {
		self.set_visible(!self.visible);
		self.visible
	}

	/// Send a payload over the live channel if it's open. Best-effort.
	pub fn send<T: Serialize>(&mut self, payload: &T) -> bool {
		self.channel.send(payload)
	}

	/// The playback position to seek to in order to show a frame.
	pub fn seek_time(&self, frame: u64) -> f64 {
		self.clock.timestamp_for(frame)
	}

	pub fn subject(&self) -> Option<SubjectId> {
		self.subject
	}

	pub fn timeline(&self) -> Option<&Timeline> {
		self.timeline.as_ref()
	}

	pub fn current_frame(&self) -> Option<u64> {
		self.frame
	}

	/// The record for the frame under the playhead.
	pub fn current_record(&self) -> Option<&DetectionRecord> {
		self.timeline.as_ref()?.lookup(self.frame?)
	}

	pub fn channel(&self) -> &LiveChannel<C> {
		&self.channel
	}

	pub fn channel_state(&self) -> ChannelState {
		self.channel.state()
	}

	pub fn visible(&self) -> bool {
		self.visible
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// How many times the overlay has been redrawn.
	pub fn renders(&self) -> u64 {
		self.renders
	}

	fn apply(&mut self, record: DetectionRecord) -> bool {
		let Some(timeline) = self.timeline.as_mut() else {
			return false;
		};

		let frame = record.frame_number;
		timeline.upsert(record);

		if self.frame == Some(frame) {
			self.render();
		}

		true
	}

	fn render(&mut self) -> Option<Scale> {
		let record = match (self.timeline.as_ref(), self.frame) {
			(Some(timeline), Some(frame)) => timeline.lookup(frame),
			_ => None,
		};

		let input = OverlayInput {
			native: self.native,
			display: self.display,
			record,
			visible: self.visible,
		};

		let scale = self.renderer.draw(&mut self.surface, input)?;
		self.renders += 1;
		Some(scale)
	}
}
