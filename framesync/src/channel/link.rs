use tokio::sync::mpsc;

use crate::{Result, SubjectId};

/// Incremented every time the live channel is rebound.
///
/// Each connection is opened under one epoch and every event it reports carries it,
/// so events from a previous subject can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, derive_more::Display)]
#[display("#{_0}")]
pub struct Epoch(u64);

impl Epoch {
	pub(crate) fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

/// What a transport reports about a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
	/// The handshake completed.
	Opened,

	/// A raw text message was received.
	Message(String),

	/// The connection ended, with an error message if it failed.
	Closed(Option<String>),
}

/// A [`LinkEvent`] tagged with the epoch of the connection that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
	pub epoch: Epoch,
	pub kind: LinkEvent,
}

impl ChannelEvent {
	pub fn new(epoch: Epoch, kind: LinkEvent) -> Self {
		Self { epoch, kind }
	}
}

/// Where transports deliver their events.
pub type EventSender = mpsc::UnboundedSender<ChannelEvent>;

/// A handle to one open (or opening) connection.
pub trait Link {
	/// Queue a text message for delivery.
	fn send(&mut self, text: String) -> Result<()>;

	/// Close the connection. Must be safe to call more than once.
	fn close(&mut self) -> Result<()>;
}

/// Opens connections to the live update stream of a subject.
pub trait Connector {
	type Link: Link;

	/// Start connecting without blocking.
	///
	/// The transport must report progress on `events`, tagging everything with `epoch`,
	/// and must report [`LinkEvent::Closed`] exactly once unless the link is closed locally first.
	fn open(&mut self, subject: SubjectId, epoch: Epoch, events: EventSender) -> Result<Self::Link>;
}
