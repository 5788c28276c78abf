//! Channel bridge between the synchronous engine loop and the async
//! transport.
//!
//! ```text
//! Engine loop (sync)                       Transport (async)
//!       │                                        │
//!       │──── Frame ─(tokio broadcast)──────────▶│ fan out to subscribers
//!       │                                        │
//!       │◀─── Command ─(crossbeam channel)───────│ parsed from client lines
//! ```
//!
//! The frame channel is fire-and-forget: with no subscriber connected, sends
//! fail silently and the engine never blocks. The command channel is
//! unbounded so slow ticks cannot drop controller input.

use crossbeam_channel::Receiver;
use tokio::sync::broadcast;
use types::{Command, Frame};

/// Capacity of the frame fan-out ring; laggards skip ahead rather than
/// blocking the engine.
pub const FRAME_BUFFER: usize = 1024;

/// The engine loop's handles to the outside world.
pub struct EngineEndpoints {
    /// Inbound commands, drained non-blockingly every tick.
    pub commands: Receiver<Command>,
    /// Outbound frames, broadcast to every connected observer.
    pub frames: broadcast::Sender<Frame>,
}

impl EngineEndpoints {
    /// Publish a frame, ignoring the absence of receivers.
    pub fn publish(&self, frame: Frame) {
        let _ = self.frames.send(frame);
    }
}
