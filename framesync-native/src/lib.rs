//! Native adapters for [`framesync`]: a REST client for stored detections,
//! a WebSocket transport for live updates, and logging setup for binaries.
mod client;
mod log;
mod ws;

pub use client::*;
pub use log::*;
pub use ws::*;
