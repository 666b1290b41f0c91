//! Modbus protocol definitions and data structures
//!
//! This module contains the core protocol definitions: the supported function
//! codes, exception codes, the MBAP header, and the decoded request forms the
//! server engine dispatches on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModbusError, ModbusResult};

/// Modbus address type (0-65535)
pub type ModbusAddress = u16;

/// Modbus slave/unit identifier (1-247)
pub type UnitId = u8;

/// Modbus function codes supported by this stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModbusFunction {
    /// Read Coils (0x01)
    ReadCoils = 0x01,
    /// Read Discrete Inputs (0x02)
    ReadDiscreteInputs = 0x02,
    /// Read Holding Registers (0x03)
    ReadHoldingRegisters = 0x03,
    /// Read Input Registers (0x04)
    ReadInputRegisters = 0x04,
    /// Write Single Coil (0x05)
    WriteSingleCoil = 0x05,
    /// Write Single Register (0x06)
    WriteSingleRegister = 0x06,
}

impl ModbusFunction {
    /// Convert from u8 to ModbusFunction
    pub fn from_u8(value: u8) -> ModbusResult<Self> {
        match value {
            0x01 => Ok(ModbusFunction::ReadCoils),
            0x02 => Ok(ModbusFunction::ReadDiscreteInputs),
            0x03 => Ok(ModbusFunction::ReadHoldingRegisters),
            0x04 => Ok(ModbusFunction::ReadInputRegisters),
            0x05 => Ok(ModbusFunction::WriteSingleCoil),
            0x06 => Ok(ModbusFunction::WriteSingleRegister),
            _ => Err(ModbusError::invalid_function(value)),
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Check if this is a read function
    pub fn is_read_function(self) -> bool {
        matches!(
            self,
            ModbusFunction::ReadCoils
                | ModbusFunction::ReadDiscreteInputs
                | ModbusFunction::ReadHoldingRegisters
                | ModbusFunction::ReadInputRegisters
        )
    }

    /// Check if this is a single-write function
    pub fn is_write_function(self) -> bool {
        matches!(
            self,
            ModbusFunction::WriteSingleCoil | ModbusFunction::WriteSingleRegister
        )
    }

    /// Check if this function reads or writes bit-valued entities
    pub fn is_bit_function(self) -> bool {
        matches!(
            self,
            ModbusFunction::ReadCoils
                | ModbusFunction::ReadDiscreteInputs
                | ModbusFunction::WriteSingleCoil
        )
    }
}

impl fmt::Display for ModbusFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModbusFunction::ReadCoils => "Read Coils",
            ModbusFunction::ReadDiscreteInputs => "Read Discrete Inputs",
            ModbusFunction::ReadHoldingRegisters => "Read Holding Registers",
            ModbusFunction::ReadInputRegisters => "Read Input Registers",
            ModbusFunction::WriteSingleCoil => "Write Single Coil",
            ModbusFunction::WriteSingleRegister => "Write Single Register",
        };
        write!(f, "{} (0x{:02X})", name, *self as u8)
    }
}

/// Modbus exception codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
}

impl ExceptionCode {
    /// Convert from u8 to ExceptionCode
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ExceptionCode::IllegalFunction),
            0x02 => Some(ExceptionCode::IllegalDataAddress),
            0x03 => Some(ExceptionCode::IllegalDataValue),
            0x04 => Some(ExceptionCode::SlaveDeviceFailure),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExceptionCode::IllegalFunction => {
                "The function code received in the query is not an allowable action for the server"
            }
            ExceptionCode::IllegalDataAddress => {
                "The data address received in the query is not an allowable address for the server"
            }
            ExceptionCode::IllegalDataValue => {
                "A value contained in the query data field is not an allowable value for the server"
            }
            ExceptionCode::SlaveDeviceFailure => {
                "An unrecoverable error occurred while the server was attempting the requested action"
            }
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modbus Exception 0x{:02X}: {}", self.to_u8(), self.description())
    }
}

/// TCP MBAP header
///
/// Seven bytes on the wire, all multi-byte fields big-endian. The `length`
/// field counts everything after itself: unit id plus PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    /// Correlates request and response within one connection
    pub transaction_id: u16,
    /// Always 0x0000 for Modbus
    pub protocol_id: u16,
    /// Byte count of unit id + PDU
    pub length: u16,
    /// Slave address (1-247 valid, 0 broadcast, 248-255 reserved)
    pub unit_id: UnitId,
}

/// Decoded request PDU for the supported function codes
///
/// `number` is the read quantity (0 for single writes); `value` is the write
/// value (0 for reads, and 0/1 for FC05 after wire decoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestData {
    pub function: ModbusFunction,
    pub start_addr: ModbusAddress,
    pub number: u16,
    pub value: u16,
}

/// Exception payload produced while decoding or dispatching a request
///
/// Carries the offending function byte so the exception response echoes
/// `function | 0x80`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionData {
    pub function: u8,
    pub code: ExceptionCode,
}

impl ExceptionData {
    pub fn new(function: u8, code: ExceptionCode) -> Self {
        Self { function, code }
    }
}

/// Outcome of decoding a request PDU: either a well-formed request or the
/// exception the server must answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedRequest {
    Request(RequestData),
    Exception(ExceptionData),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_conversion() {
        assert_eq!(ModbusFunction::from_u8(0x03).unwrap(), ModbusFunction::ReadHoldingRegisters);
        assert_eq!(ModbusFunction::ReadCoils.to_u8(), 0x01);

        for fc in [0x00, 0x07, 0x0F, 0x10, 0x83] {
            assert_eq!(
                ModbusFunction::from_u8(fc),
                Err(ModbusError::InvalidFunction { code: fc })
            );
        }
    }

    #[test]
    fn test_function_classification() {
        assert!(ModbusFunction::ReadDiscreteInputs.is_read_function());
        assert!(!ModbusFunction::WriteSingleCoil.is_read_function());
        assert!(ModbusFunction::WriteSingleRegister.is_write_function());
        assert!(ModbusFunction::ReadCoils.is_bit_function());
        assert!(!ModbusFunction::ReadInputRegisters.is_bit_function());
    }

    #[test]
    fn test_exception_code_conversion() {
        assert_eq!(ExceptionCode::from_u8(0x02), Some(ExceptionCode::IllegalDataAddress));
        assert_eq!(ExceptionCode::from_u8(0x05), None);
        assert_eq!(ExceptionCode::IllegalDataValue.to_u8(), 0x03);
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            ModbusFunction::ReadHoldingRegisters.to_string(),
            "Read Holding Registers (0x03)"
        );
    }
}
