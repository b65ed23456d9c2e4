use serde::{Deserialize, Serialize};

/// An sRGB color with alpha.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const WHITE: Self = Self::rgba(255, 255, 255, 1.0);

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}
}

/// Formatted as a CSS color, ie. `rgba(0, 255, 0, 0.9)`.
impl std::fmt::Display for Color {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// How boxes and their confidence labels are painted.
///
/// The label panel sits on top of the box's top-left corner:
/// `panel_rise` pixels above it, `panel_height` tall and as wide as the text plus padding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OverlayStyle {
	pub stroke: Color,
	pub line_width: f64,

	pub panel: Color,
	pub panel_rise: f64,
	pub panel_height: f64,
	pub padding: f64,

	pub text: Color,
	pub font_size: f64,

	/// The distance from the top of the box to the text baseline.
	pub baseline_rise: f64,
}

impl Default for OverlayStyle {
	fn default() -> Self {
		Self {
			stroke: Color::rgba(0, 255, 0, 0.9),
			line_width: 2.0,
			panel: Color::rgba(0, 128, 0, 0.7),
			panel_rise: 18.0,
			panel_height: 16.0,
			padding: 4.0,
			text: Color::WHITE,
			font_size: 13.0,
			baseline_rise: 5.0,
		}
	}
}
