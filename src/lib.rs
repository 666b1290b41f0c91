//! # Ember Modbus - Async Modbus TCP Stack
//!
//! **Version:** 0.2.1
//! **License:** MIT
//!
//! A Modbus TCP client and server implementation in pure Rust for industrial
//! supervisory tools and device simulators: query PLCs, RTUs and sensors, or
//! emulate them behind a pluggable data store.
//!
//! ## Features
//!
//! - **Async I/O**: Built on Tokio; one task per server connection
//! - **Byte-Exact Codec**: Pure MBAP/PDU encode-decode, fully unit tested
//! - **Client and Server**: Transaction loop and per-connection state machine
//! - **Pluggable Storage**: Bind your own process image behind [`DataStore`]
//! - **Transport Abstraction**: Protocol engines are independent of the I/O
//!   substrate; TCP and in-memory loopback adapters included
//! - **Memory Safe**: Pure Rust implementation with zero unsafe code
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Client | Server |
//! |------|----------|--------|--------|
//! | 0x01 | Read Coils | ✅ | ✅ |
//! | 0x02 | Read Discrete Inputs | ✅ | ✅ |
//! | 0x03 | Read Holding Registers | ✅ | ✅ |
//! | 0x04 | Read Input Registers | ✅ | ✅ |
//! | 0x05 | Write Single Coil | ✅ | ✅ |
//! | 0x06 | Write Single Register | ✅ | ✅ |
//!
//! ## Quick Start
//!
//! ### Client Example
//!
//! ```rust,no_run
//! use ember_modbus::{ModbusClient, ModbusTcpClient, ModbusResult};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     // Connect to a Modbus TCP server
//!     let mut client = ModbusTcpClient::from_address("127.0.0.1:502", Duration::from_secs(5)).await?;
//!
//!     // Read holding registers
//!     let values = client.read_03(1, 0, 10).await?;
//!     println!("Read registers: {:?}", values);
//!
//!     // Write single register
//!     client.write_06(1, 100, 0x1234).await?;
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Server Example
//!
//! ```rust,no_run
//! use ember_modbus::{MemoryStore, ModbusTcpServer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::with_size(1000));
//!     let mut server = ModbusTcpServer::new("127.0.0.1:502", 1, store)?;
//!     server.start().await?;
//!
//!     // Server is now running...
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Modbus protocol constants based on official specification
pub mod constants;

/// Modbus protocol definitions and data structures
pub mod protocol;

/// Byte-exact MBAP/PDU frame codec
pub mod codec;

/// Network transport layer for TCP communication
pub mod transport;

/// Pluggable data store behind the server engine
pub mod store;

/// Modbus client implementations
pub mod client;

/// Modbus server implementation
pub mod server;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use ember_modbus::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::{GenericModbusClient, ModbusClient, ModbusTcpClient};

// === Core server API ===
pub use server::{ModbusTcpServer, ModbusTcpServerConfig, ServerStats};

// === Error handling ===
pub use error::{ModbusError, ModbusResult};

// === Core types ===
pub use protocol::{
    DecodedRequest, ExceptionCode, ExceptionData, MbapHeader, ModbusFunction, RequestData, UnitId,
};

// === Storage ===
pub use store::{AddressSpace, DataStore, MemoryStore, SpaceValue, StoreError};

// === Transport ===
pub use transport::{
    MemoryChannel, ModbusChannel, ModbusListener, TcpChannel, TcpServerTransport, TransportStats,
};

// === Protocol limits (commonly needed constants) ===
pub use constants::{MAX_PDU_SIZE, MAX_READ_BITS, MAX_READ_REGISTERS, MBAP_HEADER_LEN};

/// Default timeout for client operations (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Modbus TCP default port
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("Ember Modbus v{} - async Modbus TCP client/server stack", VERSION)
}
