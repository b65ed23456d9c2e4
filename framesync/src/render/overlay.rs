use crate::{BoundingBox, DetectionRecord};

use super::{OverlayStyle, Rect, Scale, Size, Surface};

/// Everything a single draw depends on.
#[derive(Debug, Clone, Copy)]
pub struct OverlayInput<'a> {
	/// The intrinsic size of the video, zero until metadata has loaded.
	pub native: Size,

	/// The size the video is displayed at.
	pub display: Size,

	/// The detections for the frame under the playhead, if any.
	pub record: Option<&'a DetectionRecord>,

	pub visible: bool,
}

/// Paints the boxes of one detection record, scaled to the display size.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
	style: OverlayStyle,
}

impl OverlayRenderer {
	pub fn new(style: OverlayStyle) -> Self {
		Self { style }
	}

	pub fn style(&self) -> &OverlayStyle {
		&self.style
	}

	/// Redraw the overlay from scratch.
	///
	/// Does nothing and returns None until the native size is known.
	/// Otherwise the surface is resized to the display size and cleared, so drawing
	/// the same input twice leaves the same result as drawing it once.
	pub fn draw<S: Surface>(&self, surface: &mut S, input: OverlayInput<'_>) -> Option<Scale> {
		let scale = Scale::between(input.native, input.display)?;

		surface.resize(input.display);
		surface.clear();

		if !input.visible {
			return Some(scale);
		}

		for bbox in input.record.into_iter().flat_map(|record| &record.boxes) {
			self.draw_box(surface, bbox, scale);
		}

		Some(scale)
	}

	fn draw_box<S: Surface>(&self, surface: &mut S, bbox: &BoundingBox, scale: Scale) {
		let style = &self.style;
		let rect = place(bbox, scale);

		surface.stroke_rect(rect, style.stroke, style.line_width);

		let text = label(bbox);
		let width = surface.measure_text(&text, style.font_size);
		let panel = Rect::new(
			rect.x,
			rect.y - style.panel_rise,
			width + style.padding * 2.0,
			style.panel_height,
		);

		surface.fill_rect(panel, style.panel);
		surface.fill_text(
			&text,
			rect.x + style.padding,
			rect.y - style.baseline_rise,
			style.text,
			style.font_size,
		);
	}
}

/// Where a content-space box lands on the display.
pub fn place(bbox: &BoundingBox, scale: Scale) -> Rect {
	Rect::new(
		bbox.x1 * scale.x,
		bbox.y1 * scale.y,
		bbox.width() * scale.x,
		bbox.height() * scale.y,
	)
}

/// The confidence label of a box, ie. `87%`.
pub fn label(bbox: &BoundingBox) -> String {
	format!("{}%", bbox.percent())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::render::{Command, DisplayList};

	fn record() -> DetectionRecord {
		DetectionRecord::new(
			10,
			0.3333,
			2,
			vec![
				BoundingBox::new(100.0, 100.0, 200.0, 200.0, 0.87),
				BoundingBox::new(0.0, 540.0, 1920.0, 1080.0, 0.31),
			],
		)
	}

	fn input(record: Option<&DetectionRecord>) -> OverlayInput<'_> {
		OverlayInput {
			native: Size::new(1920.0, 1080.0),
			display: Size::new(960.0, 540.0),
			record,
			visible: true,
		}
	}

	#[test]
	fn scaled() {
		let record = record();
		let mut surface = DisplayList::new();

		let scale = OverlayRenderer::default().draw(&mut surface, input(Some(&record)));
		assert_eq!(scale, Some(Scale { x: 0.5, y: 0.5 }));
		assert_eq!(surface.size, Size::new(960.0, 540.0));

		let rects: Vec<_> = surface.rects().collect();
		assert_eq!(
			rects,
			vec![Rect::new(50.0, 50.0, 50.0, 50.0), Rect::new(0.0, 270.0, 960.0, 270.0)]
		);

		let labels: Vec<_> = surface.labels().collect();
		assert_eq!(labels, vec!["87%", "31%"]);
	}

	#[test]
	fn label_panel() {
		let record = DetectionRecord::new(0, 0.0, 1, vec![BoundingBox::new(100.0, 100.0, 200.0, 200.0, 0.87)]);
		let mut surface = DisplayList::new();
		let style = OverlayStyle::default();

		OverlayRenderer::new(style.clone()).draw(&mut surface, input(Some(&record)));

		let width = surface.measure_text("87%", style.font_size);
		assert_eq!(
			surface.commands,
			vec![
				Command::StrokeRect {
					rect: Rect::new(50.0, 50.0, 50.0, 50.0),
					color: style.stroke,
					line_width: 2.0,
				},
				Command::FillRect {
					rect: Rect::new(50.0, 32.0, width + 8.0, 16.0),
					color: style.panel,
				},
				Command::FillText {
					text: "87%".to_string(),
					x: 54.0,
					y: 45.0,
					color: style.text,
					font_size: 13.0,
				},
			]
		);
	}

	#[test]
	fn before_metadata() {
		let record = record();
		let mut surface = DisplayList::new();

		let mut unloaded = input(Some(&record));
		unloaded.native = Size::default();

		assert_eq!(OverlayRenderer::default().draw(&mut surface, unloaded), None);
		assert_eq!(surface, DisplayList::new());
	}

	#[test]
	fn hidden() {
		let record = record();
		let mut surface = DisplayList::new();
		let renderer = OverlayRenderer::default();

		renderer.draw(&mut surface, input(Some(&record)));
		assert!(!surface.is_empty());

		let mut hidden = input(Some(&record));
		hidden.visible = false;

		let clears = surface.clears;
		assert!(renderer.draw(&mut surface, hidden).is_some());
		assert!(surface.is_empty());
		assert!(surface.clears > clears);
	}

	#[test]
	fn idempotent() {
		let record = record();
		let renderer = OverlayRenderer::default();

		let mut once = DisplayList::new();
		renderer.draw(&mut once, input(Some(&record)));

		let mut twice = DisplayList::new();
		renderer.draw(&mut twice, input(Some(&record)));
		renderer.draw(&mut twice, input(Some(&record)));

		assert_eq!(once.commands, twice.commands);
	}

	#[test]
	fn resized() {
		let record = record();
		let renderer = OverlayRenderer::default();
		let mut surface = DisplayList::new();

		renderer.draw(&mut surface, input(Some(&record)));

		let mut larger = input(Some(&record));
		larger.display = Size::new(3840.0, 2160.0);
		renderer.draw(&mut surface, larger);

		assert_eq!(surface.size, Size::new(3840.0, 2160.0));
		assert_eq!(surface.rects().next(), Some(Rect::new(200.0, 200.0, 200.0, 200.0)));
	}

	#[test]
	fn empty_record() {
		let mut surface = DisplayList::new();
		let renderer = OverlayRenderer::default();

		assert!(renderer.draw(&mut surface, input(None)).is_some());
		assert!(surface.is_empty());

		let bare = DetectionRecord::new(12, 0.4, 2, vec![]);
		assert!(renderer.draw(&mut surface, input(Some(&bare))).is_some());
		assert!(surface.is_empty());
	}
}
