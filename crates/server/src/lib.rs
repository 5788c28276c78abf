//! Server crate: async TCP transport for the open-outcry engine.
//!
//! The engine itself is a synchronous single-threaded loop; this crate owns
//! the network edge and bridges it over channels:
//!
//! ```text
//! ┌─────────────────────┐          ┌───────────────────────────┐
//! │  Engine loop        │          │  Tokio runtime (own        │
//! │  (sync, paced)      │          │  threads)                  │
//! │                     │  Frame   │                            │
//! │  engine.step()      │─────────▶│  publisher :5555           │
//! │  endpoints.publish  │broadcast │  one line per frame        │
//! │                     │          │                            │
//! │  commands.try_recv  │◀─────────│  command listener :5556    │
//! │                     │ crossbeam│  one Command per line      │
//! └─────────────────────┘          └───────────────────────────┘
//! ```
//!
//! Binding either address is the only fatal failure; everything after that
//! is best-effort per the publish contract.

mod bridge;
mod error;
mod transport;

pub use bridge::{EngineEndpoints, FRAME_BUFFER};
pub use error::{Result, ServerError};

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the frame publisher binds.
    pub publish_addr: String,
    /// Address the command listener binds.
    pub command_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            publish_addr: "127.0.0.1:5555".to_string(),
            command_addr: "127.0.0.1:5556".to_string(),
        }
    }
}

/// A running transport, plus the engine-side channel endpoints.
///
/// Dropping the handle shuts the runtime (and all client connections) down.
pub struct ServerHandle {
    pub endpoints: EngineEndpoints,
    publish_addr: SocketAddr,
    command_addr: SocketAddr,
    _runtime: tokio::runtime::Runtime,
}

impl ServerHandle {
    /// Actual bound publisher address (useful with port 0).
    pub fn publish_addr(&self) -> SocketAddr {
        self.publish_addr
    }

    /// Actual bound command address.
    pub fn command_addr(&self) -> SocketAddr {
        self.command_addr
    }
}

/// Bind both channels and start serving on a dedicated runtime.
///
/// Returns an error if either bind fails; the caller is expected to treat
/// that as fatal and exit non-zero.
pub fn start(config: &ServerConfig) -> Result<ServerHandle> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;

    let publisher = runtime
        .block_on(TcpListener::bind(&config.publish_addr))
        .map_err(|source| ServerError::Bind {
            addr: config.publish_addr.clone(),
            source,
        })?;
    let command_listener = runtime
        .block_on(TcpListener::bind(&config.command_addr))
        .map_err(|source| ServerError::Bind {
            addr: config.command_addr.clone(),
            source,
        })?;

    let publish_addr = publisher.local_addr().map_err(ServerError::Runtime)?;
    let command_addr = command_listener.local_addr().map_err(ServerError::Runtime)?;
    info!(%publish_addr, %command_addr, "transport bound");

    let (frame_tx, _) = broadcast::channel(FRAME_BUFFER);
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();

    runtime.spawn(transport::run_publisher(publisher, frame_tx.clone()));
    runtime.spawn(transport::run_command_listener(command_listener, cmd_tx));

    Ok(ServerHandle {
        endpoints: EngineEndpoints {
            commands: cmd_rx,
            frames: frame_tx,
        },
        publish_addr,
        command_addr,
        _runtime: runtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;
    use std::time::Duration;
    use types::{Command, Frame, Scenario};

    fn ephemeral() -> ServerConfig {
        ServerConfig {
            publish_addr: "127.0.0.1:0".to_string(),
            command_addr: "127.0.0.1:0".to_string(),
        }
    }

    #[test]
    fn test_commands_flow_from_socket_to_channel() {
        let handle = start(&ephemeral()).unwrap();

        let mut stream = TcpStream::connect(handle.command_addr()).unwrap();
        stream.write_all(b"SCENARIO 1\nPAUSE\nGIBBERISH\nSTOP\n").unwrap();
        stream.flush().unwrap();

        let timeout = Duration::from_secs(5);
        let commands = &handle.endpoints.commands;
        assert_eq!(
            commands.recv_timeout(timeout).unwrap(),
            Command::Scenario(Scenario::PumpDump)
        );
        assert_eq!(commands.recv_timeout(timeout).unwrap(), Command::Pause);
        // The unparseable line was dropped silently.
        assert_eq!(commands.recv_timeout(timeout).unwrap(), Command::Stop);
    }

    #[test]
    fn test_frames_reach_a_connected_observer() {
        let handle = start(&ephemeral()).unwrap();

        let stream = TcpStream::connect(handle.publish_addr()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut reader = BufReader::new(stream);

        // The subscription races connection setup; keep publishing until the
        // observer sees a line.
        let mut line = String::new();
        for _ in 0..100 {
            handle.endpoints.publish(Frame::Data {
                price: 101.25,
                volume: 7,
            });
            line.clear();
            if reader.read_line(&mut line).is_ok() && !line.is_empty() {
                break;
            }
        }
        assert_eq!(line.trim_end(), "DATA 101.25 7");
    }

    #[test]
    fn test_publishing_without_observers_is_silent() {
        let handle = start(&ephemeral()).unwrap();
        // No subscriber: must not error or block.
        handle.endpoints.publish(Frame::Data {
            price: 100.0,
            volume: 0,
        });
    }

    #[test]
    fn test_bind_conflict_is_fatal() {
        let first = start(&ephemeral()).unwrap();
        let taken = ServerConfig {
            publish_addr: first.publish_addr().to_string(),
            command_addr: "127.0.0.1:0".to_string(),
        };
        match start(&taken) {
            Err(ServerError::Bind { addr, .. }) => {
                assert_eq!(addr, first.publish_addr().to_string());
            }
            other => panic!("expected bind failure, got {:?}", other.map(|_| ())),
        }
    }
}
