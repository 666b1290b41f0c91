//! Network transport layer for Modbus TCP communication
//!
//! This module decouples the protocol engines from the async I/O substrate
//! through two narrow abstractions:
//!
//! - [`ModbusChannel`]: a reliable, ordered, bidirectional byte stream with
//!   exact-count reads. Both the client transaction loop and the server
//!   per-connection loop speak only to this trait.
//! - [`ModbusListener`]: a bound endpoint handing out channels, one per
//!   accepted connection.
//!
//! Concrete adapters are provided for tokio TCP ([`TcpChannel`],
//! [`TcpServerTransport`]) and for in-process loopback testing
//! ([`MemoryChannel`]). The frame codec itself never suspends and never
//! touches I/O; every operation here is a suspension point.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::constants::MAX_MBAP_LENGTH;
use crate::error::{ModbusError, ModbusResult};

/// Format raw bytes as hex string for packet logging
pub(crate) fn format_hex_packet(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Communication statistics maintained by the client engine
#[derive(Debug, Clone, Default)]
pub struct TransportStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// A reliable, ordered, bidirectional byte channel
///
/// `read_exact` completes only once the requested count has arrived; EOF and
/// I/O failures are terminal for the channel. All methods may suspend while
/// waiting for the kernel.
#[async_trait]
pub trait ModbusChannel: Send {
    /// Read exactly `count` bytes, suspending until they have all arrived
    async fn read_exact(&mut self, count: usize) -> ModbusResult<Vec<u8>>;

    /// Write the whole buffer, suspending until it is flushed to the kernel
    async fn write_all(&mut self, data: &[u8]) -> ModbusResult<()>;

    /// Shut down both directions; idempotent
    async fn close(&mut self) -> ModbusResult<()>;

    /// Whether the channel still believes it is usable
    fn is_connected(&self) -> bool;
}

/// A bound endpoint accepting connections for the server engine
///
/// The server engine owns the accept loop; the listener only hands out
/// channels, so the engine stays independent of the concrete substrate.
#[async_trait]
pub trait ModbusListener: Send {
    /// Wait for the next connection and wrap it as a channel
    async fn accept(&mut self) -> ModbusResult<(Box<dyn ModbusChannel>, SocketAddr)>;

    /// The locally bound address
    fn local_addr(&self) -> ModbusResult<SocketAddr>;
}

/// Modbus TCP channel over a tokio [`TcpStream`]
///
/// An optional timeout is applied to every read and write; expiry is
/// reported as [`ModbusError::Timeout`] and marks the channel disconnected,
/// as does any other I/O failure.
pub struct TcpChannel {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    timeout: Option<Duration>,
    /// Emit hex dumps of every frame at debug level
    packet_logging: bool,
}

impl TcpChannel {
    /// Connect to a Modbus TCP endpoint
    pub async fn connect(peer: SocketAddr, io_timeout: Duration) -> ModbusResult<Self> {
        let connect = TcpStream::connect(peer);
        let stream = match timeout(io_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ModbusError::connection(format!(
                    "failed to connect to {}: {}",
                    peer, e
                )))
            }
            Err(_) => {
                return Err(ModbusError::timeout(
                    format!("connect to {}", peer),
                    io_timeout.as_millis() as u64,
                ))
            }
        };

        Ok(Self {
            stream: Some(stream),
            peer,
            timeout: Some(io_timeout),
            packet_logging: false,
        })
    }

    /// Wrap an accepted stream (server side); no per-operation timeout
    pub fn from_accepted(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream: Some(stream),
            peer,
            timeout: None,
            packet_logging: false,
        }
    }

    /// The remote endpoint of this channel
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Enable or disable hex packet logging
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.packet_logging = enabled;
    }

    fn stream_mut(&mut self) -> ModbusResult<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| ModbusError::connection("channel is closed"))
    }
}

#[async_trait]
impl ModbusChannel for TcpChannel {
    async fn read_exact(&mut self, count: usize) -> ModbusResult<Vec<u8>> {
        let io_timeout = self.timeout;
        let stream = self.stream_mut()?;
        let mut buffer = vec![0u8; count];

        let result = match io_timeout {
            Some(io_timeout) => {
                let outcome = timeout(io_timeout, stream.read_exact(&mut buffer)).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        self.stream = None;
                        return Err(ModbusError::timeout("read", io_timeout.as_millis() as u64));
                    }
                }
            }
            None => stream.read_exact(&mut buffer).await,
        };

        if let Err(e) = result {
            self.stream = None;
            return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ModbusError::connection("read: connection closed by peer")
            } else {
                ModbusError::io(format!("read: {}", e))
            });
        }

        if self.packet_logging {
            debug!("[{}] recv {}", self.peer, format_hex_packet(&buffer));
        }
        Ok(buffer)
    }

    async fn write_all(&mut self, data: &[u8]) -> ModbusResult<()> {
        if self.packet_logging {
            debug!("[{}] send {}", self.peer, format_hex_packet(data));
        }

        let io_timeout = self.timeout;
        let stream = self.stream_mut()?;

        let result = match io_timeout {
            Some(io_timeout) => {
                let outcome = timeout(io_timeout, stream.write_all(data)).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        self.stream = None;
                        return Err(ModbusError::timeout("write", io_timeout.as_millis() as u64));
                    }
                }
            }
            None => stream.write_all(data).await,
        };

        if let Err(e) = result {
            self.stream = None;
            return Err(ModbusError::io(format!("write: {}", e)));
        }
        Ok(())
    }

    async fn close(&mut self) -> ModbusResult<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Modbus TCP listener over a tokio [`TcpListener`]
pub struct TcpServerTransport {
    listener: TcpListener,
}

impl TcpServerTransport {
    /// Bind a TCP endpoint
    pub async fn bind(address: SocketAddr) -> ModbusResult<Self> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| ModbusError::connection(format!("failed to bind {}: {}", address, e)))?;
        Ok(Self { listener })
    }
}

#[async_trait]
impl ModbusListener for TcpServerTransport {
    async fn accept(&mut self) -> ModbusResult<(Box<dyn ModbusChannel>, SocketAddr)> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(|e| ModbusError::io(format!("accept: {}", e)))?;
        Ok((Box::new(TcpChannel::from_accepted(stream, peer)), peer))
    }

    fn local_addr(&self) -> ModbusResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| ModbusError::io(format!("local_addr: {}", e)))
    }
}

/// In-process loopback channel over [`tokio::io::duplex`]
///
/// [`MemoryChannel::pair`] returns two connected ends; frames written to one
/// end are read from the other. Used to exercise the client and server
/// engines without sockets.
pub struct MemoryChannel {
    stream: Option<DuplexStream>,
}

impl MemoryChannel {
    /// Create a connected pair of loopback channels
    pub fn pair() -> (Self, Self) {
        let (a, b) = tokio::io::duplex(MAX_MBAP_LENGTH * 4);
        (Self { stream: Some(a) }, Self { stream: Some(b) })
    }
}

#[async_trait]
impl ModbusChannel for MemoryChannel {
    async fn read_exact(&mut self, count: usize) -> ModbusResult<Vec<u8>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ModbusError::connection("channel is closed"))?;
        let mut buffer = vec![0u8; count];
        if let Err(e) = stream.read_exact(&mut buffer).await {
            self.stream = None;
            return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ModbusError::connection("read: connection closed by peer")
            } else {
                ModbusError::io(format!("read: {}", e))
            });
        }
        Ok(buffer)
    }

    async fn write_all(&mut self, data: &[u8]) -> ModbusResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ModbusError::connection("channel is closed"))?;
        if let Err(e) = stream.write_all(data).await {
            self.stream = None;
            return Err(ModbusError::io(format!("write: {}", e)));
        }
        Ok(())
    }

    async fn close(&mut self) -> ModbusResult<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
