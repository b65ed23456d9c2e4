use anyhow::Context;
use clap::Parser;
use framesync::{FrameClock, MergePolicy, SubjectId, Timeline};

mod watch;

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Config {
	/// The backend to talk to.
	#[command(flatten)]
	pub client: framesync_native::ClientConfig,

	/// The log configuration.
	#[command(flatten)]
	pub log: framesync_native::Log,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(clap::Subcommand, Clone)]
pub enum Command {
	/// List uploaded videos and how far their analysis got.
	List,

	/// Print the stored detections of a video, one JSON record per line.
	Dump {
		/// The id of the video.
		#[arg(long)]
		video: u64,
	},

	/// Play a video back, printing the overlay whenever it changes.
	Watch(watch::Args),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let config = Config::parse();
	config.log.init();

	let client = config.client.init()?;

	match config.command {
		Command::List => list(&client).await,
		Command::Dump { video } => dump(&client, SubjectId(video)).await,
		Command::Watch(args) => watch::run(client, args).await,
	}
}

async fn list(client: &framesync_native::Client) -> anyhow::Result<()> {
	let videos = client.videos().await.context("failed to list videos")?;

	println!("{:>6}  {:<13}  {:<19}  FILENAME", "ID", "STATUS", "UPLOADED");
	for video in videos {
		println!(
			"{:>6}  {:<13}  {:<19}  {}",
			video.id.to_string(),
			video.processed,
			video.upload_date,
			video.filename
		);
	}

	Ok(())
}

async fn dump(client: &framesync_native::Client, subject: SubjectId) -> anyhow::Result<()> {
	let video = client
		.video(subject)
		.await
		.with_context(|| format!("failed to fetch video {subject}"))?;

	let clock = FrameClock::default();
	let mut records = video.detections;
	for record in &mut records {
		record.fill_timestamp(&clock);
	}

	let timeline = Timeline::from_records(records, MergePolicy::Replace);
	tracing::info!(
		%subject,
		filename = %video.video.filename,
		status = %video.video.processed,
		frames = timeline.len(),
		objects = timeline.total_objects(),
		"fetched detections"
	);

	for record in timeline.all() {
		println!("{}", serde_json::to_string(record)?);
	}

	Ok(())
}
