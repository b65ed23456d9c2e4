use framesync::channel::Link;
use framesync::{ChannelEvent, Connector, Epoch, Error, EventSender, LinkEvent, SubjectId};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::client::endpoint;

/// Opens live update WebSockets at `{base}/ws/{id}`.
#[derive(Clone, Debug)]
pub struct WsConnector {
	base: Url,
}

impl WsConnector {
	pub fn new(base: Url) -> Self {
		Self { base }
	}

	pub fn url(&self, subject: SubjectId) -> framesync::Result<Url> {
		endpoint(&self.base, &["ws", &subject.to_string()])
	}
}

impl Connector for WsConnector {
	type Link = WsLink;

	/// Spawns a task for the connection; must be called within a tokio runtime.
	fn open(&mut self, subject: SubjectId, epoch: Epoch, events: EventSender) -> framesync::Result<WsLink> {
		let url = self.url(subject)?;
		let runtime = tokio::runtime::Handle::try_current().map_err(|err| Error::Connection(err.to_string()))?;

		let (outbound, rx) = mpsc::unbounded_channel();
		runtime.spawn(run(url, epoch, events, rx));

		Ok(WsLink { outbound })
	}
}

enum Outbound {
	Text(String),
	Close,
}

/// A handle to a WebSocket driven by a background task.
///
/// Dropping the handle closes the connection.
pub struct WsLink {
	outbound: mpsc::UnboundedSender<Outbound>,
}

impl Link for WsLink {
	fn send(&mut self, text: String) -> framesync::Result<()> {
		self.outbound
			.send(Outbound::Text(text))
			.map_err(|_| Error::Connection("connection closed".to_string()))
	}

	fn close(&mut self) -> framesync::Result<()> {
		self.outbound
			.send(Outbound::Close)
			.map_err(|_| Error::Connection("connection closed".to_string()))
	}
}

// Reports exactly one Closed event, however the connection ends.
async fn run(url: Url, epoch: Epoch, events: EventSender, outbound: mpsc::UnboundedReceiver<Outbound>) {
	let reason = match session(&url, epoch, &events, outbound).await {
		Ok(()) => None,
		Err(err) => {
			tracing::debug!(%url, %epoch, %err, "websocket failed");
			Some(err.to_string())
		}
	};

	// Nobody is listening if this fails, which is fine.
	let _ = events.send(ChannelEvent::new(epoch, LinkEvent::Closed(reason)));
}

async fn session(
	url: &Url,
	epoch: Epoch,
	events: &EventSender,
	mut outbound: mpsc::UnboundedReceiver<Outbound>,
) -> framesync::Result<()> {
	tracing::debug!(%url, %epoch, "connecting");

	let ws = tokio::select! {
		res = connect_async(url.as_str()) => res.map_err(|err| Error::Connection(err.to_string()))?.0,
		// Closed before the handshake finished.
		_ = closed(&mut outbound) => return Ok(()),
	};

	let (mut sink, mut stream) = ws.split();

	if events.send(ChannelEvent::new(epoch, LinkEvent::Opened)).is_err() {
		return Ok(());
	}

	loop {
		tokio::select! {
			msg = stream.next() => match msg {
				Some(Ok(Message::Text(text))) => {
					if events.send(ChannelEvent::new(epoch, LinkEvent::Message(text))).is_err() {
						break;
					}
				}
				Some(Ok(Message::Close(frame))) => {
					tracing::debug!(?frame, %epoch, "closed by remote");
					return Ok(());
				}
				// Ping and pong are handled by tungstenite, binary is unused.
				Some(Ok(_)) => {}
				Some(Err(err)) => return Err(Error::Connection(err.to_string())),
				None => return Ok(()),
			},
			cmd = outbound.recv() => match cmd {
				Some(Outbound::Text(text)) => {
					sink.send(Message::Text(text))
						.await
						.map_err(|err| Error::Connection(err.to_string()))?;
				}
				Some(Outbound::Close) | None => break,
			},
		}
	}

	// Best-effort close frame; the socket is dropped either way.
	if let Err(err) = sink.close().await {
		tracing::debug!(%err, %epoch, "failed to close websocket");
	}

	Ok(())
}

// Resolves once the link is closed or dropped, discarding anything sent in the meantime.
async fn closed(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
	while let Some(Outbound::Text(_)) = outbound.recv().await {}
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use tokio::net::TcpListener;
	use tokio::task::JoinHandle;
	use tokio_tungstenite::accept_hdr_async;
	use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

	use super::*;

	// What the server saw: the request path and every text frame.
	type Seen = (String, Vec<String>);

	async fn server<F, Fut>(script: F) -> (Url, JoinHandle<Seen>)
	where
		F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut + Send + 'static,
		Fut: std::future::Future<Output = Vec<String>> + Send + 'static,
	{
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();

		let handle = tokio::spawn(async move {
			let (stream, _) = listener.accept().await.unwrap();

			let mut path = String::new();
			let ws = accept_hdr_async(stream, |req: &Request, res: Response| -> Result<Response, ErrorResponse> {
				path = req.uri().path().to_string();
				Ok(res)
			})
			.await
			.unwrap();

			(path, script(ws).await)
		});

		(Url::parse(&format!("ws://{addr}")).unwrap(), handle)
	}

	// Read text frames until the client goes away.
	async fn drain(mut ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Vec<String> {
		let mut seen = Vec::new();
		while let Some(Ok(msg)) = ws.next().await {
			if let Message::Text(text) = msg {
				seen.push(text);
			}
		}
		seen
	}

	async fn next(events: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> LinkEvent {
		let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
			.await
			.expect("timed out")
			.expect("channel closed");
		assert_eq!(event.epoch, Epoch::default());
		event.kind
	}

	#[tokio::test]
	async fn live() {
		let (url, server) = server(|mut ws| async move {
			ws.send(Message::Text(
				r#"{"video_id": 7, "frame_number": 12, "object_count": 2}"#.to_string(),
			))
			.await
			.unwrap();
			drain(ws).await
		})
		.await;

		let (tx, mut events) = mpsc::unbounded_channel();
		let mut link = WsConnector::new(url).open(SubjectId(7), Epoch::default(), tx).unwrap();

		assert_eq!(next(&mut events).await, LinkEvent::Opened);
		assert_eq!(
			next(&mut events).await,
			LinkEvent::Message(r#"{"video_id": 7, "frame_number": 12, "object_count": 2}"#.to_string())
		);

		link.send(r#"{"seek":12}"#.to_string()).unwrap();
		link.close().unwrap();
		assert_eq!(next(&mut events).await, LinkEvent::Closed(None));

		let (path, seen) = server.await.unwrap();
		assert_eq!(path, "/ws/7");
		assert_eq!(seen, vec![r#"{"seek":12}"#.to_string()]);

		// The task is gone.
		assert!(events.recv().await.is_none());
		assert!(link.close().is_err());
	}

	#[tokio::test]
	async fn remote_close() {
		let (url, server) = server(|mut ws| async move {
			ws.close(None).await.unwrap();
			drain(ws).await
		})
		.await;

		let (tx, mut events) = mpsc::unbounded_channel();
		let _link = WsConnector::new(url).open(SubjectId(7), Epoch::default(), tx).unwrap();

		assert_eq!(next(&mut events).await, LinkEvent::Opened);
		assert_eq!(next(&mut events).await, LinkEvent::Closed(None));

		server.await.unwrap();
	}

	#[tokio::test]
	async fn dropped() {
		let (url, server) = server(drain).await;

		let (tx, mut events) = mpsc::unbounded_channel();
		let link = WsConnector::new(url).open(SubjectId(9), Epoch::default(), tx).unwrap();
		assert_eq!(next(&mut events).await, LinkEvent::Opened);

		drop(link);
		assert_eq!(next(&mut events).await, LinkEvent::Closed(None));

		let (path, seen) = server.await.unwrap();
		assert_eq!(path, "/ws/9");
		assert!(seen.is_empty());
	}

	#[tokio::test]
	async fn refused() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let url = Url::parse(&format!("ws://{addr}")).unwrap();
		let (tx, mut events) = mpsc::unbounded_channel();
		let _link = WsConnector::new(url).open(SubjectId(7), Epoch::default(), tx).unwrap();

		assert!(matches!(next(&mut events).await, LinkEvent::Closed(Some(_))));
	}

	#[test]
	fn outside_runtime() {
		let url = Url::parse("ws://localhost:8000").unwrap();
		let (tx, _events) = mpsc::unbounded_channel();

		let res = WsConnector::new(url).open(SubjectId(7), Epoch::default(), tx);
		assert!(matches!(res, Err(Error::Connection(_))));
	}
}
