use std::sync::Arc;

/// Error types for the overlay engine and its adapters.
///
/// Only [`Error::Fetch`] is ever returned to the caller of
/// [`PlaybackSync::select`](crate::PlaybackSync::select). Parse and connection
/// errors are absorbed by the live channel and surface as state changes.
#[derive(Debug, thiserror::Error, Clone)]
pub enum Error {
	/// JSON serialization/deserialization error.
	#[error("json error: {0}")]
	Json(Arc<serde_json::Error>),

	/// A live message could not be decoded.
	#[error("malformed live message: {0}")]
	Parse(Arc<serde_json::Error>),

	/// A connection failed to open or was dropped.
	#[error("connection error: {0}")]
	Connection(String),

	/// The batch of detections could not be fetched.
	#[error("fetch failed: {0}")]
	Fetch(String),

	/// The server answered with a non-success status code.
	#[error("http status {0}")]
	Http(u16),

	/// The configured endpoint can't be used to build a request URL.
	#[error("invalid url")]
	InvalidUrl,

	/// A size was not of the form `WIDTHxHEIGHT`.
	#[error("invalid size: {0}")]
	InvalidSize(String),
}

/// A Result type alias for framesync operations.
pub type Result<T> = std::result::Result<T, Error>;

// Wrap in an Arc so it is Clone
impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Json(Arc::new(err))
	}
}
