//! Modbus TCP server implementation
//!
//! The server owns a listener and a shared [`DataStore`]. Each accepted
//! connection becomes an independent task running a strictly serial
//! request/response loop: the next frame is read only after the previous
//! response has been fully written, which preserves ordering on the TCP
//! stream without transaction-id bookkeeping.
//!
//! Modbus-level problems (unsupported function, bad quantity, unknown
//! address) never tear down a connection; they are answered in-band with an
//! exception ADU. Frame-level problems (short header, bad protocol id,
//! foreign unit id, I/O failure) close only the affected connection.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ember_modbus::{MemoryStore, ModbusTcpServer, ModbusTcpServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ModbusTcpServerConfig {
//!         bind_address: "127.0.0.1:502".parse()?,
//!         unit_id: 1,
//!     };
//!
//!     let store = Arc::new(MemoryStore::with_size(1000));
//!     let mut server = ModbusTcpServer::with_config(config, store)?;
//!     server.start().await?;
//!
//!     // Server is now running...
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::codec::{
    decode_header, decode_request, encode_exception_response, encode_read_bits_response,
    encode_read_registers_response, encode_write_response,
};
use crate::constants::{MAX_MBAP_LENGTH, MBAP_HEADER_LEN};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{
    DecodedRequest, ExceptionCode, ExceptionData, MbapHeader, ModbusFunction, RequestData, UnitId,
};
use crate::store::{AddressSpace, DataStore, SpaceValue, StoreError};
use crate::transport::{ModbusChannel, ModbusListener, TcpServerTransport};

/// Modbus TCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusTcpServerConfig {
    pub bind_address: SocketAddr,
    pub unit_id: UnitId,
}

impl Default for ModbusTcpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:502".parse().unwrap(),
            unit_id: 1,
        }
    }
}

/// Server statistics
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    pub connections_count: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub exception_responses: u64,
    pub failed_requests: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Modbus TCP server
pub struct ModbusTcpServer {
    config: ModbusTcpServerConfig,
    store: Arc<dyn DataStore>,
    stats: Arc<Mutex<ServerStats>>,
    shutdown_tx: Option<broadcast::Sender<()>>,
    is_running: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
}

impl ModbusTcpServer {
    /// Create a server from an address string with the given unit id
    pub fn new(bind_address: &str, unit_id: UnitId, store: Arc<dyn DataStore>) -> ModbusResult<Self> {
        let bind_address = bind_address
            .parse()
            .map_err(|e| ModbusError::configuration(format!("Invalid bind address: {}", e)))?;
        Self::with_config(
            ModbusTcpServerConfig {
                bind_address,
                unit_id,
            },
            store,
        )
    }

    /// Create a server with an explicit configuration
    pub fn with_config(config: ModbusTcpServerConfig, store: Arc<dyn DataStore>) -> ModbusResult<Self> {
        if config.unit_id == 0 || config.unit_id > 247 {
            return Err(ModbusError::configuration(format!(
                "unit id {} outside 1-247",
                config.unit_id
            )));
        }

        Ok(Self {
            config,
            store,
            stats: Arc::new(Mutex::new(ServerStats::default())),
            shutdown_tx: None,
            is_running: Arc::new(AtomicBool::new(false)),
            local_addr: None,
        })
    }

    /// Bind the endpoint and start accepting connections
    ///
    /// Returns once the listener is bound; connections are served on spawned
    /// tasks until [`stop`](Self::stop) is called or the server is dropped.
    pub async fn start(&mut self) -> ModbusResult<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Err(ModbusError::configuration("server is already running"));
        }

        let listener = TcpServerTransport::bind(self.config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);

        let (shutdown_tx, _) = broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx.clone());
        self.is_running.store(true, Ordering::Relaxed);

        info!("Modbus TCP server listening on {} (unit {})", local_addr, self.config.unit_id);

        let store = self.store.clone();
        let stats = self.stats.clone();
        let unit_id = self.config.unit_id;
        let is_running = self.is_running.clone();

        tokio::spawn(async move {
            Self::accept_loop(listener, store, stats, unit_id, shutdown_tx).await;
            is_running.store(false, Ordering::Relaxed);
        });

        Ok(())
    }

    /// Signal shutdown; in-flight connection tasks exit at their next
    /// suspension point
    pub fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        self.is_running.store(false, Ordering::Relaxed);
        info!("Modbus TCP server stopped");
    }

    /// Whether the accept loop is running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// The bound address, available after [`start`](Self::start)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Snapshot of server statistics
    pub fn get_stats(&self) -> ServerStats {
        self.stats.lock().unwrap().clone()
    }

    /// The shared data store
    pub fn store(&self) -> Arc<dyn DataStore> {
        self.store.clone()
    }

    async fn accept_loop(
        mut listener: impl ModbusListener,
        store: Arc<dyn DataStore>,
        stats: Arc<Mutex<ServerStats>>,
        unit_id: UnitId,
        shutdown_tx: broadcast::Sender<()>,
    ) {
        let mut shutdown_rx = shutdown_tx.subscribe();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((channel, peer)) => {
                            debug!("accepted connection from {}", peer);
                            stats.lock().unwrap().connections_count += 1;

                            let store = store.clone();
                            let stats = stats.clone();
                            let shutdown_rx = shutdown_tx.subscribe();
                            tokio::spawn(async move {
                                Self::connection_loop(channel, peer, store, stats, unit_id, shutdown_rx).await;
                            });
                        }
                        Err(e) => {
                            error!("accept failed: {}", e);
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!("shutdown signal received, leaving accept loop");
                    break;
                }
            }
        }
    }

    /// Serve one connection until the peer closes, an error occurs, or
    /// shutdown is signalled
    pub(crate) async fn connection_loop(
        mut channel: Box<dyn ModbusChannel>,
        peer: SocketAddr,
        store: Arc<dyn DataStore>,
        stats: Arc<Mutex<ServerStats>>,
        unit_id: UnitId,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        info!("client connected: {}", peer);

        loop {
            let header_bytes = tokio::select! {
                read = channel.read_exact(MBAP_HEADER_LEN) => match read {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!("connection {} closed: {}", peer, e);
                        break;
                    }
                },
                _ = shutdown_rx.recv() => {
                    debug!("shutdown signal received for {}", peer);
                    break;
                }
            };

            match Self::serve_request(&mut channel, &header_bytes, &store, &stats, unit_id).await {
                Ok(()) => {}
                Err(e) => {
                    stats.lock().unwrap().failed_requests += 1;
                    if !matches!(e, ModbusError::Connection { .. }) {
                        warn!("connection {} terminated: {}", peer, e);
                    }
                    break;
                }
            }
        }

        let _ = channel.close().await;
        info!("client disconnected: {}", peer);
    }

    /// Read the PDU belonging to `header_bytes`, dispatch it, and write the
    /// response. Any returned error is terminal for the connection.
    async fn serve_request(
        channel: &mut Box<dyn ModbusChannel>,
        header_bytes: &[u8],
        store: &Arc<dyn DataStore>,
        stats: &Arc<Mutex<ServerStats>>,
        unit_id: UnitId,
    ) -> ModbusResult<()> {
        let header = decode_header(header_bytes)?;

        if header.unit_id != unit_id {
            return Err(ModbusError::protocol(format!(
                "request for foreign unit id {}",
                header.unit_id
            )));
        }
        if header.length < 2 || header.length as usize > MAX_MBAP_LENGTH {
            return Err(ModbusError::frame(format!(
                "invalid request length field: {}",
                header.length
            )));
        }

        let pdu = channel.read_exact(header.length as usize - 1).await?;
        {
            let mut stats = stats.lock().unwrap();
            stats.total_requests += 1;
            stats.bytes_received += (MBAP_HEADER_LEN + pdu.len()) as u64;
        }

        let (response, exception) = match decode_request(&pdu)? {
            DecodedRequest::Request(request) => match Self::dispatch(&header, &request, store) {
                Ok(response) => (response, None),
                Err(exception) => {
                    (encode_exception_response(&header, &exception), Some(exception))
                }
            },
            DecodedRequest::Exception(exception) => {
                (encode_exception_response(&header, &exception), Some(exception))
            }
        };

        if let Some(exception) = exception {
            debug!(
                "answering FC 0x{:02X} with {}",
                exception.function, exception.code
            );
        }

        channel.write_all(&response).await?;
        {
            let mut stats = stats.lock().unwrap();
            stats.bytes_sent += response.len() as u64;
            if exception.is_some() {
                stats.exception_responses += 1;
            } else {
                stats.successful_requests += 1;
            }
        }
        Ok(())
    }

    /// Map a decoded request onto the data store and encode the response
    ///
    /// Store errors become in-band exceptions: `NotFound`/`ReadOnly` map to
    /// ILLEGAL_DATA_ADDRESS, anything else to SLAVE_DEVICE_FAILURE.
    fn dispatch(
        header: &MbapHeader,
        request: &RequestData,
        store: &Arc<dyn DataStore>,
    ) -> Result<Vec<u8>, ExceptionData> {
        let to_exception = |e: StoreError| {
            let code = match e {
                StoreError::NotFound { .. } | StoreError::ReadOnly { .. } => {
                    ExceptionCode::IllegalDataAddress
                }
                StoreError::Failure { .. } => ExceptionCode::SlaveDeviceFailure,
            };
            ExceptionData::new(request.function.to_u8(), code)
        };
        // A bit where a word belongs (or vice versa) is a store defect
        let type_mismatch =
            || ExceptionData::new(request.function.to_u8(), ExceptionCode::SlaveDeviceFailure);

        let base = request.start_addr;
        match request.function {
            ModbusFunction::ReadCoils | ModbusFunction::ReadDiscreteInputs => {
                let space = if request.function == ModbusFunction::ReadCoils {
                    AddressSpace::Coils
                } else {
                    AddressSpace::DiscreteInputs
                };
                let mut bits = Vec::with_capacity(request.number as usize);
                for i in 0..request.number {
                    match store.read(space, base.wrapping_add(i)).map_err(to_exception)? {
                        SpaceValue::Bit(bit) => bits.push(bit),
                        SpaceValue::Word(_) => return Err(type_mismatch()),
                    }
                }
                Ok(encode_read_bits_response(header, request, &bits))
            }
            ModbusFunction::ReadHoldingRegisters | ModbusFunction::ReadInputRegisters => {
                let space = if request.function == ModbusFunction::ReadHoldingRegisters {
                    AddressSpace::HoldingRegisters
                } else {
                    AddressSpace::InputRegisters
                };
                let mut registers = Vec::with_capacity(request.number as usize);
                for i in 0..request.number {
                    match store.read(space, base.wrapping_add(i)).map_err(to_exception)? {
                        SpaceValue::Word(word) => registers.push(word),
                        SpaceValue::Bit(_) => return Err(type_mismatch()),
                    }
                }
                Ok(encode_read_registers_response(header, request, &registers))
            }
            ModbusFunction::WriteSingleCoil => {
                store
                    .write(AddressSpace::Coils, base, request.value)
                    .map_err(to_exception)?;
                Ok(encode_write_response(header, request))
            }
            ModbusFunction::WriteSingleRegister => {
                store
                    .write(AddressSpace::HoldingRegisters, base, request.value)
                    .map_err(to_exception)?;
                Ok(encode_write_response(header, request))
            }
        }
    }
}

impl Drop for ModbusTcpServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
