//! # framesync: detection overlays in lockstep with playback
//!
//! `framesync` keeps per-frame object detections aligned with a playing video.
//! Detections arrive from two places: a one-shot batch of rich records
//! (with bounding boxes) and a live stream of sparse updates produced while the
//! analysis is still running. Both are merged into a [`Timeline`] and the
//! record for the frame under the playhead is painted onto an overlay
//! [`Surface`](render::Surface), scaled to whatever size the video is displayed at.
//!
//! ## Overview
//!
//! The crate is sans-IO; every input is a method call on [`PlaybackSync`]:
//! - **Clock**: maps playback time to an analysis frame index.
//! - **Timeline**: one record per frame number, last write wins.
//! - **Channel**: a single live subscription per selected video, guarded by an epoch.
//! - **Render**: scales boxes from native video size to display size and paints them.
//!
//! The network side lives behind the [`BatchSource`] and [`Connector`] traits;
//! `framesync-native` provides HTTP and WebSocket implementations.
mod clock;
mod error;
mod sync;

pub mod channel;
pub mod model;
pub mod render;

pub use channel::{ChannelEvent, ChannelState, Connector, Epoch, EventSender, LinkEvent, LiveChannel, LiveUpdate};
pub use clock::*;
pub use error::*;
pub use model::*;
pub use sync::*;
