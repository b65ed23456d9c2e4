use serde::Serialize;

use super::{Color, Rect, Size};

/// A 2D drawing target layered over the video, ie. a canvas.
pub trait Surface {
	/// Resize the backing store. This also clears it.
	fn resize(&mut self, size: Size);

	/// Erase everything drawn so far.
	fn clear(&mut self);

	fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

	fn fill_rect(&mut self, rect: Rect, color: Color);

	/// Draw text with its baseline starting at `(x, y)`.
	fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color, font_size: f64);

	/// The rendered width of `text`.
	///
	/// The default is a rough estimate for a proportional sans-serif font.
	fn measure_text(&self, text: &str, font_size: f64) -> f64 {
		text.chars().count() as f64 * font_size * 0.6
	}
}

/// A single paint operation recorded by a [`DisplayList`].
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
	StrokeRect {
		rect: Rect,
		color: Color,
		line_width: f64,
	},
	FillRect {
		rect: Rect,
		color: Color,
	},
	FillText {
		text: String,
		x: f64,
		y: f64,
		color: Color,
		font_size: f64,
	},
}

/// A [`Surface`] that records what is painted instead of rasterizing it.
///
/// Useful for headless viewers and for asserting on the output.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
	pub size: Size,
	pub commands: Vec<Command>,

	/// How many times the surface was cleared, including by a resize.
	#[serde(skip)]
	pub clears: u64,
}

impl DisplayList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}

	pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
		self.commands.iter().filter_map(|command| match command {
			Command::StrokeRect { rect, .. } => Some(*rect),
			_ => None,
		})
	}

	pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
		self.commands.iter().filter_map(|command| match command {
			Command::FillText { text, .. } => Some(text.as_str()),
			_ => None,
		})
	}
}

impl Surface for DisplayList {
	fn resize(&mut self, size: Size) {
		self.size = size;
		self.clear();
	}

	fn clear(&mut self) {
		self.commands.clear();
		self.clears += 1;
	}

	fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
		self.commands.push(Command::StrokeRect {
			rect,
			color,
			line_width,
		});
	}

	fn fill_rect(&mut self, rect: Rect, color: Color) {
		self.commands.push(Command::FillRect { rect, color });
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color, font_size: f64) {
		self.commands.push(Command::FillText {
			text: text.to_string(),
			x,
			y,
			color,
			font_size,
		});
	}
}
