use std::time::Duration;

use anyhow::Context;
use framesync::render::{DisplayList, Size};
use framesync::{LiveChannel, MergePolicy, PlaybackSync, SubjectId, SyncConfig};
use framesync_native::{Client, WsConnector};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(clap::Args, Clone, Debug)]
pub struct Args {
	/// The id of the video to watch.
	#[arg(long)]
	pub video: u64,

	/// Stop after this many seconds of playback.
	#[arg(long, default_value_t = 10.0)]
	pub duration: f64,

	/// The playback rate, ie. 2 plays twice as fast.
	#[arg(long, default_value_t = 1.0)]
	pub speed: f64,

	/// The intrinsic resolution of the video.
	#[arg(long, default_value = "1920x1080")]
	pub native: Size,

	/// The size the video is displayed at.
	#[arg(long, default_value = "960x540")]
	pub display: Size,

	/// How live updates are merged into stored detections.
	#[arg(long, value_enum, default_value_t = Merge::Replace)]
	pub merge: Merge,

	/// Don't draw the boxes.
	#[arg(long)]
	pub hide: bool,

	/// How often the playhead is sampled, in milliseconds.
	#[arg(long, default_value_t = 33)]
	pub tick: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Merge {
	/// A later record replaces an earlier one entirely.
	Replace,

	/// A later record without boxes keeps the earlier boxes.
	KeepBoxes,
}

impl From<Merge> for MergePolicy {
	fn from(merge: Merge) -> Self {
		match merge {
			Merge::Replace => MergePolicy::Replace,
			Merge::KeepBoxes => MergePolicy::KeepBoxes,
		}
	}
}

// One line of output per redraw.
#[derive(Serialize)]
struct Frame<'a> {
	seconds: f64,
	frame: Option<u64>,
	objects: Option<u64>,
	overlay: &'a DisplayList,
}

pub async fn run(client: Client, args: Args) -> anyhow::Result<()> {
	anyhow::ensure!(args.speed > 0.0, "speed must be positive");

	let (tx, mut events) = mpsc::unbounded_channel();
	let channel = LiveChannel::new(client.connector(), tx);

	let config = SyncConfig {
		merge: args.merge.into(),
		visible: !args.hide,
		..Default::default()
	};

	let mut sync = PlaybackSync::new(config, channel, DisplayList::new());
	sync.on_resize(args.display);
	sync.on_metadata(args.native);

	let subject = SubjectId(args.video);
	if let Err(err) = sync.select(subject, &client).await {
		// Live updates can still arrive, so keep going.
		tracing::warn!(%subject, %err, "playing without stored detections");
	}

	let mut ticker = tokio::time::interval(Duration::from_millis(args.tick.max(1)));
	let start = tokio::time::Instant::now();
	let mut seconds = 0.0;
	let mut printed = sync.renders();

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				seconds = start.elapsed().as_secs_f64() * args.speed;
				if seconds > args.duration {
					break;
				}
				sync.on_time(seconds);
			}
			Some(event) = events.recv() => {
				if let Some(state) = sync.on_channel(event) {
					tracing::info!(%subject, %state, "live updates");
				}
			}
			_ = &mut ctrl_c => {
				tracing::info!("interrupted");
				break;
			}
		}

		if sync.renders() != printed {
			printed = sync.renders();
			print_frame(&sync, seconds)?;
		}
	}

	summary(&sync);
	Ok(())
}

fn print_frame(sync: &PlaybackSync<WsConnector, DisplayList>, seconds: f64) -> anyhow::Result<()> {
	let frame = Frame {
		seconds,
		frame: sync.current_frame(),
		objects: sync.current_record().map(|record| record.object_count),
		overlay: sync.surface(),
	};

	let line = serde_json::to_string(&frame).context("failed to encode frame")?;
	println!("{line}");

	Ok(())
}

// The per-frame table shown next to the player.
fn summary(sync: &PlaybackSync<WsConnector, DisplayList>) {
	let Some(timeline) = sync.timeline() else {
		return;
	};

	eprintln!(
		"{} frames, {} objects, {} with boxes",
		timeline.len(),
		timeline.total_objects(),
		timeline.frames_with_boxes()
	);

	eprintln!("{:>8}  {:>10}  {:>7}  BOXES", "FRAME", "TIME", "OBJECTS");
	for record in timeline.all() {
		let time = record.timestamp.map(|seconds| format!("{seconds:.3}")).unwrap_or_default();
		eprintln!(
			"{:>8}  {:>10}  {:>7}  {}",
			record.frame_number,
			time,
			record.object_count,
			record.boxes.len()
		);
	}
}
