use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

// Dependencies that are too chatty at the default level.
const QUIET: &[&str] = &["hyper=warn", "reqwest=info", "tungstenite=info", "tokio_tungstenite=info"];

#[serde_as]
#[derive(clap::Args, Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Log {
	/// The level to log at. RUST_LOG takes precedence when set.
	#[arg(id = "log-level", long = "log-level", default_value_t = Level::INFO, env = "FRAMESYNC_LOG_LEVEL")]
	#[serde_as(as = "DisplayFromStr")]
	pub level: Level,
}

impl Default for Log {
	fn default() -> Self {
		Self { level: Level::INFO }
	}
}

impl Log {
	pub fn new(level: Level) -> Self {
		Self { level }
	}

	pub fn filter(&self) -> EnvFilter {
		let filter = EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy(); // Allow overriding with RUST_LOG

		QUIET
			.iter()
			.filter_map(|directive| directive.parse::<Directive>().ok())
			.fold(filter, EnvFilter::add_directive)
	}

	/// Install a global subscriber writing to stderr.
	pub fn init(&self) {
		let logger = tracing_subscriber::FmtSubscriber::builder()
			.with_writer(std::io::stderr)
			.with_env_filter(self.filter())
			.finish();

		if let Err(err) = tracing::subscriber::set_global_default(logger) {
			// Someone beat us to it, so at least this goes somewhere.
			tracing::warn!(%err, "logging already initialized");
		}
	}
}
