//! The live update subscription for the selected subject.
//!
//! A [`LiveChannel`] owns at most one connection at a time. Every bind closes the
//! previous connection and bumps the [`Epoch`]; anything the old connection still
//! delivers afterwards is ignored.
mod link;
mod message;

pub use link::*;
pub use message::*;

use serde::Serialize;
use tokio::sync::watch;

use crate::SubjectId;

/// The lifecycle of the live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum ChannelState {
	/// No subject is bound.
	#[default]
	#[display("idle")]
	Idle,

	/// The handshake for the subject is in progress.
	#[display("connecting to {_0}")]
	Connecting(SubjectId),

	/// Live updates for the subject are flowing.
	#[display("open for {_0}")]
	Open(SubjectId),

	/// The connection ended. Nothing reconnects automatically.
	#[display("closed for {_0}")]
	Closed(SubjectId),
}

impl ChannelState {
	pub fn subject(&self) -> Option<SubjectId> {
		match *self {
			Self::Idle => None,
			Self::Connecting(subject) | Self::Open(subject) | Self::Closed(subject) => Some(subject),
		}
	}

	pub fn is_open(&self) -> bool {
		matches!(self, Self::Open(_))
	}
}

/// The result of feeding a [`ChannelEvent`] to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutput {
	/// The channel moved to a new state.
	State(ChannelState),

	/// A live update was received.
	Update(LiveUpdate),
}

/// Manages the single live subscription, bound to at most one subject.
pub struct LiveChannel<C: Connector> {
	connector: C,
	events: EventSender,
	epoch: Epoch,
	state: watch::Sender<ChannelState>,
	link: Option<C::Link>,
}

impl<C: Connector> LiveChannel<C> {
	/// Create an idle channel; transports will report on `events`.
	pub fn new(connector: C, events: EventSender) -> Self {
		Self {
			connector,
			events,
			epoch: Epoch::default(),
			state: watch::Sender::new(ChannelState::Idle),
			link: None,
		}
	}

	pub fn state(&self) -> ChannelState {
		*self.state.borrow()
	}

	/// Watch for state changes, ie. to show whether live updates are enabled.
	pub fn state_watch(&self) -> watch::Receiver<ChannelState> {
		self.state.subscribe()
	}

	/// The epoch of the current binding.
	pub fn epoch(&self) -> Epoch {
		self.epoch
	}

	/// Bind the channel to a new subject, or to nothing.
	///
	/// Any existing connection is closed first and the epoch is always incremented,
	/// even when rebinding the same subject.
	pub fn bind(&mut self, subject: Option<SubjectId>) -> Epoch {
		self.release();
		self.epoch = self.epoch.next();

		let Some(subject) = subject else {
			tracing::debug!(epoch = %self.epoch, "unbound");
			self.set_state(ChannelState::Idle);
			return self.epoch;
		};

		tracing::debug!(%subject, epoch = %self.epoch, "connecting");
		self.set_state(ChannelState::Connecting(subject));

		match self.connector.open(subject, self.epoch, self.events.clone()) {
			Ok(link) => self.link = Some(link),
			Err(err) => {
				tracing::warn!(%subject, %err, "failed to connect");
				self.set_state(ChannelState::Closed(subject));
			}
		}

		self.epoch
	}

	/// Close the current connection without binding a new subject.
	pub fn close(&mut self) {
		self.release();

		match self.state() {
			ChannelState::Connecting(subject) | ChannelState::Open(subject) => {
				self.set_state(ChannelState::Closed(subject));
			}
			ChannelState::Idle | ChannelState::Closed(_) => {}
		}
	}

	/// Process an event reported by a transport.
	///
	/// Events from any epoch other than the current one are dropped.
	pub fn handle(&mut self, event: ChannelEvent) -> Option<ChannelOutput> {
		if event.epoch != self.epoch {
			tracing::debug!(epoch = %event.epoch, current = %self.epoch, "dropping stale event");
			return None;
		}

		let state = self.state();

		match (event.kind, state) {
			(LinkEvent::Opened, ChannelState::Connecting(subject)) => {
				tracing::info!(%subject, "live updates enabled");
				Some(self.set_state(ChannelState::Open(subject)))
			}
			(LinkEvent::Message(text), ChannelState::Open(_)) => match LiveMessage::parse(&text) {
				Ok(message) => Some(ChannelOutput::Update(LiveUpdate {
					epoch: event.epoch,
					message,
				})),
				Err(err) => {
					tracing::warn!(%err, raw = %text, "ignoring malformed message");
					None
				}
			},
			(LinkEvent::Closed(reason), ChannelState::Connecting(subject) | ChannelState::Open(subject)) => {
				match reason {
					Some(reason) => tracing::warn!(%subject, %reason, "connection failed"),
					None => tracing::info!(%subject, "connection closed"),
				}

				// The transport is already gone, but drop our handle too.
				self.release();
				Some(self.set_state(ChannelState::Closed(subject)))
			}
			(kind, state) => {
				tracing::debug!(?kind, %state, "ignoring unexpected event");
				None
			}
		}
	}

	/// Send a JSON payload over the connection, only if it's open.
	///
	/// Returns false if nothing was sent. Nothing is queued and there's no delivery guarantee.
	pub fn send<T: Serialize>(&mut self, payload: &T) -> bool {
		if !self.state().is_open() {
			return false;
		}

		let Some(link) = self.link.as_mut() else {
			return false;
		};

		let text = match serde_json::to_string(payload) {
			Ok(text) => text,
			Err(err) => {
				tracing::warn!(%err, "failed to encode payload");
				return false;
			}
		};

		match link.send(text) {
			Ok(()) => true,
			Err(err) => {
				tracing::debug!(%err, "failed to send");
				false
			}
		}
	}

	fn set_state(&mut self, state: ChannelState) -> ChannelOutput {
		self.state.send_replace(state);
		ChannelOutput::State(state)
	}

	// Close errors are ignored; the handle is released regardless.
	fn release(&mut self) {
		if let Some(mut link) = self.link.take() {
			if let Err(err) = link.close() {
				tracing::debug!(%err, "error while closing connection");
			}
		}
	}
}

impl<C: Connector> Drop for LiveChannel<C> {
	fn drop(&mut self) {
		self.release();
	}
}
