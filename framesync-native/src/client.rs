use anyhow::Context;
use framesync::{BatchSource, DetectionRecord, Error, SubjectId, Video, VideoDetections};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::WsConnector;

const DEFAULT_API: &str = "http://localhost:8000/api";
const DEFAULT_WS: &str = "ws://localhost:8000";

#[derive(clap::Args, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
	/// The base URL of the REST API.
	/// Defaults to `http://localhost:8000/api` if not provided.
	#[arg(long, env = "FRAMESYNC_API")]
	pub api: Option<Url>,

	/// The base URL for live update WebSockets.
	/// Defaults to `ws://localhost:8000` if not provided.
	#[arg(long, env = "FRAMESYNC_WS")]
	pub ws: Option<Url>,
}

impl ClientConfig {
	pub fn init(self) -> anyhow::Result<Client> {
		Client::new(self)
	}
}

/// Talks to the detection backend.
#[derive(Clone, Debug)]
pub struct Client {
	http: reqwest::Client,
	api: Url,
	ws: Url,
}

impl Client {
	pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
		let api = match config.api {
			Some(api) => api,
			None => Url::parse(DEFAULT_API).context("invalid default api url")?,
		};

		let ws = match config.ws {
			Some(ws) => ws,
			None => Url::parse(DEFAULT_WS).context("invalid default ws url")?,
		};

		anyhow::ensure!(!api.cannot_be_a_base(), "api url can't have a path: {api}");
		anyhow::ensure!(
			matches!(ws.scheme(), "ws" | "wss"),
			"ws url must start with ws:// or wss://: {ws}"
		);

		let http = reqwest::Client::builder()
			.build()
			.context("failed to build http client")?;

		Ok(Self { http, api, ws })
	}

	pub fn api(&self) -> &Url {
		&self.api
	}

	pub fn ws(&self) -> &Url {
		&self.ws
	}

	/// Every uploaded video.
	pub async fn videos(&self) -> framesync::Result<Vec<Video>> {
		self.get(&["videos"]).await
	}

	/// A single video with the detections recorded so far.
	pub async fn video(&self, id: SubjectId) -> framesync::Result<VideoDetections> {
		self.get(&["videos", &id.to_string()]).await
	}

	/// A connector for live updates from the same backend.
	pub fn connector(&self) -> WsConnector {
		WsConnector::new(self.ws.clone())
	}

	async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> framesync::Result<T> {
		let url = endpoint(&self.api, segments)?;
		tracing::debug!(%url, "GET");

		let res = self
			.http
			.get(url)
			.send()
			.await
			.map_err(|err| Error::Connection(err.to_string()))?;

		let status = res.status();
		if !status.is_success() {
			return Err(Error::Http(status.as_u16()));
		}

		let body = res.text().await.map_err(|err| Error::Connection(err.to_string()))?;
		Ok(serde_json::from_str(&body)?)
	}
}

impl BatchSource for Client {
	async fn fetch(&self, subject: SubjectId) -> framesync::Result<Vec<DetectionRecord>> {
		match self.video(subject).await {
			Ok(video) => Ok(video.detections),
			Err(err) => Err(Error::Fetch(err.to_string())),
		}
	}
}

/// Append path segments to a base URL, ignoring any trailing slash.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> framesync::Result<Url> {
	let mut url = base.clone();
	url.path_segments_mut()
		.map_err(|_| Error::InvalidUrl)?
		.pop_if_empty()
		.extend(segments);
	Ok(url)
}
