//! Painting detection boxes over a video, scaled to its display size.
//!
//! The video has a native size (its intrinsic resolution, known once metadata has loaded)
//! and a display size (the box it occupies on screen), and the two change independently.
//! Boxes are recorded in native pixels and scaled to display pixels on every draw.
mod overlay;
mod style;
mod surface;

pub use overlay::*;
pub use style::*;
pub use surface::*;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A width and height in pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// True unless both dimensions are positive, ie. before video metadata has loaded.
	///
	/// NaN counts as empty.
	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}
}

impl std::fmt::Display for Size {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// Parses `WIDTHxHEIGHT`, ie. `1920x1080`.
impl FromStr for Size {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || Error::InvalidSize(s.to_string());

		let (width, height) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
		let width: f64 = width.trim().parse().map_err(|_| invalid())?;
		let height: f64 = height.trim().parse().map_err(|_| invalid())?;

		if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
			return Err(invalid());
		}

		Ok(Self { width, height })
	}
}

/// An axis-aligned rectangle in display pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self { x, y, width, height }
	}
}

/// The ratio of display size to native size on each axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Scale {
	pub x: f64,
	pub y: f64,
}

impl Scale {
	/// Returns None when the native size is unknown.
	pub fn between(native: Size, display: Size) -> Option<Self> {
		if native.is_empty() {
			return None;
		}

		Some(Self {
			x: display.width / native.width,
			y: display.height / native.height,
		})
	}
}
