//! Core error types and result handling
//!
//! All fallible operations in this crate return [`ModbusResult`]. The error
//! taxonomy distinguishes transport failures (terminal for a connection),
//! frame errors, protocol violations detected while validating a peer's
//! response, and in-band Modbus exceptions reported by a server.

use thiserror::Error;

/// Result type used throughout the crate
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Errors produced by the Modbus stack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModbusError {
    /// Connection establishment or loss (connect refused, EOF, reset)
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// I/O failure on an established channel
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Malformed frame: short buffer, bad protocol id, inconsistent length
    #[error("Frame error: {message}")]
    Frame { message: String },

    /// Protocol violation: response does not match the request
    /// (transaction id, unit id, or function code mismatch)
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Operation did not complete within the configured timeout
    #[error("Timeout during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Function code outside the supported set
    #[error("Invalid function code: 0x{code:02X}")]
    InvalidFunction { code: u8 },

    /// Caller-supplied argument rejected before wire emission
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Invalid configuration (bad address string, unit id out of range)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// In-band Modbus exception returned by the server
    #[error("Modbus exception: function 0x{function:02X}, exception code 0x{code:02X}")]
    Exception { function: u8, code: u8 },
}

impl ModbusError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        ModbusError::Connection {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        ModbusError::Io {
            message: message.into(),
        }
    }

    /// Create a frame error
    pub fn frame<S: Into<String>>(message: S) -> Self {
        ModbusError::Frame {
            message: message.into(),
        }
    }

    /// Create a protocol violation error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        ModbusError::Protocol {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, timeout_ms: u64) -> Self {
        ModbusError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create an invalid function code error
    pub fn invalid_function(code: u8) -> Self {
        ModbusError::InvalidFunction { code }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        ModbusError::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        ModbusError::Configuration {
            message: message.into(),
        }
    }

    /// Create a Modbus exception error from an exception response PDU
    pub fn exception(function: u8, code: u8) -> Self {
        ModbusError::Exception {
            function: function & 0x7F,
            code,
        }
    }

    /// Whether this error terminates the connection it occurred on
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ModbusError::Connection { .. }
                | ModbusError::Io { .. }
                | ModbusError::Frame { .. }
                | ModbusError::Timeout { .. }
        )
    }
}
