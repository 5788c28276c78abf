//! TCP line transport: frame publisher and command listener.
//!
//! Frames go out as one text line per frame to every connected observer;
//! commands come in as text lines and are parsed into typed [`Command`]s.
//! A slow or vanished observer never blocks the engine: lagged subscribers
//! skip ahead, write failures drop the connection.

use crossbeam_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use types::{Command, Frame};

/// Accept observers and fan frames out to each.
pub async fn run_publisher(listener: TcpListener, frames: broadcast::Sender<Frame>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "observer connected");
                let rx = frames.subscribe();
                tokio::spawn(publish_to_client(stream, rx));
            }
            Err(e) => {
                warn!("publisher accept failed: {e}");
            }
        }
    }
}

/// Write frames to one observer until it goes away.
async fn publish_to_client(mut stream: TcpStream, mut rx: broadcast::Receiver<Frame>) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                let line = format!("{frame}\n");
                if stream.write_all(line.as_bytes()).await.is_err() {
                    debug!("observer disconnected");
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Fire-and-forget contract: laggards lose frames, not the
                // connection.
                debug!("observer lagged by {skipped} frames");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

/// Accept controllers and feed parsed commands into the engine channel.
pub async fn run_command_listener(listener: TcpListener, commands: Sender<Command>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "controller connected");
                tokio::spawn(read_commands(stream, commands.clone()));
            }
            Err(e) => {
                warn!("command accept failed: {e}");
            }
        }
    }
}

/// Parse command lines from one controller connection.
async fn read_commands(stream: TcpStream, commands: Sender<Command>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match Command::parse(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        // Engine loop is gone; nothing left to feed.
                        return;
                    }
                }
                None => {
                    if !line.trim().is_empty() {
                        debug!("dropping unparseable command: {line:?}");
                    }
                }
            },
            Ok(None) => {
                debug!("controller disconnected");
                return;
            }
            Err(e) => {
                warn!("controller read failed: {e}");
                return;
            }
        }
    }
}
