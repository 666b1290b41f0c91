//! Pluggable data store behind the server engine
//!
//! A Modbus server exposes four independent address spaces: coils and
//! holding registers are writable, discrete inputs and input registers are
//! read-only from the wire. The server engine only speaks [`DataStore`];
//! hosts bind their own storage (process image, database, hardware mirror)
//! by implementing it. Implementations must be safe under concurrent access:
//! the server invokes reads and writes from multiple connection tasks.
//!
//! Addressing convention: wire addresses are used as-is, so address 0 on the
//! wire is index 0 in the store.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four Modbus address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressSpace {
    /// Bit-valued, read/write
    Coils,
    /// Bit-valued, read-only
    DiscreteInputs,
    /// 16-bit word, read/write
    HoldingRegisters,
    /// 16-bit word, read-only
    InputRegisters,
}

impl AddressSpace {
    /// Whether the wire may write into this space
    pub fn is_writable(self) -> bool {
        matches!(self, AddressSpace::Coils | AddressSpace::HoldingRegisters)
    }
}

/// A value read from a store: a bit or a 16-bit word depending on the space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceValue {
    Bit(bool),
    Word(u16),
}

/// Errors reported by a data store
///
/// The server translates `NotFound` and `ReadOnly` into
/// ILLEGAL_DATA_ADDRESS, anything else into SLAVE_DEVICE_FAILURE.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("address {address} not found in {space:?}")]
    NotFound { space: AddressSpace, address: u16 },

    #[error("{space:?} is read-only")]
    ReadOnly { space: AddressSpace },

    #[error("store failure: {message}")]
    Failure { message: String },
}

/// Random-access map of the four typed address spaces
pub trait DataStore: Send + Sync {
    /// Read one entity; `NotFound` for an address outside the space
    fn read(&self, space: AddressSpace, address: u16) -> Result<SpaceValue, StoreError>;

    /// Write one entity; `ReadOnly` for the input spaces, `NotFound` for an
    /// address outside the space. Bit spaces treat any nonzero value as ON.
    fn write(&self, space: AddressSpace, address: u16, value: u16) -> Result<(), StoreError>;
}

/// In-memory data store with per-space locks
///
/// Each space holds `size` entities addressed `0..size`. Suitable for
/// simulators and tests; production hosts typically bind their own
/// [`DataStore`] over the real process image.
pub struct MemoryStore {
    coils: RwLock<Vec<bool>>,
    discrete_inputs: RwLock<Vec<bool>>,
    holding_registers: RwLock<Vec<u16>>,
    input_registers: RwLock<Vec<u16>>,
}

impl MemoryStore {
    /// Create a store with `size` zero-initialized entities per space
    pub fn with_size(size: usize) -> Self {
        Self {
            coils: RwLock::new(vec![false; size]),
            discrete_inputs: RwLock::new(vec![false; size]),
            holding_registers: RwLock::new(vec![0; size]),
            input_registers: RwLock::new(vec![0; size]),
        }
    }

    /// Create a store covering the full 16-bit address range
    pub fn new() -> Self {
        Self::with_size(u16::MAX as usize + 1)
    }

    /// Seed a discrete input (host side; the wire cannot write this space)
    pub fn set_discrete_input(&self, address: u16, value: bool) -> Result<(), StoreError> {
        let mut inputs = self.discrete_inputs.write().unwrap();
        let slot = inputs
            .get_mut(address as usize)
            .ok_or(StoreError::NotFound {
                space: AddressSpace::DiscreteInputs,
                address,
            })?;
        *slot = value;
        Ok(())
    }

    /// Seed an input register (host side; the wire cannot write this space)
    pub fn set_input_register(&self, address: u16, value: u16) -> Result<(), StoreError> {
        let mut registers = self.input_registers.write().unwrap();
        let slot = registers
            .get_mut(address as usize)
            .ok_or(StoreError::NotFound {
                space: AddressSpace::InputRegisters,
                address,
            })?;
        *slot = value;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for MemoryStore {
    fn read(&self, space: AddressSpace, address: u16) -> Result<SpaceValue, StoreError> {
        let not_found = StoreError::NotFound { space, address };
        match space {
            AddressSpace::Coils => self
                .coils
                .read()
                .unwrap()
                .get(address as usize)
                .map(|&bit| SpaceValue::Bit(bit))
                .ok_or(not_found),
            AddressSpace::DiscreteInputs => self
                .discrete_inputs
                .read()
                .unwrap()
                .get(address as usize)
                .map(|&bit| SpaceValue::Bit(bit))
                .ok_or(not_found),
            AddressSpace::HoldingRegisters => self
                .holding_registers
                .read()
                .unwrap()
                .get(address as usize)
                .map(|&word| SpaceValue::Word(word))
                .ok_or(not_found),
            AddressSpace::InputRegisters => self
                .input_registers
                .read()
                .unwrap()
                .get(address as usize)
                .map(|&word| SpaceValue::Word(word))
                .ok_or(not_found),
        }
    }

    fn write(&self, space: AddressSpace, address: u16, value: u16) -> Result<(), StoreError> {
        if !space.is_writable() {
            return Err(StoreError::ReadOnly { space });
        }
        let not_found = StoreError::NotFound { space, address };
        match space {
            AddressSpace::Coils => {
                let mut coils = self.coils.write().unwrap();
                let slot = coils.get_mut(address as usize).ok_or(not_found)?;
                *slot = value != 0;
                Ok(())
            }
            AddressSpace::HoldingRegisters => {
                let mut registers = self.holding_registers.write().unwrap();
                let slot = registers.get_mut(address as usize).ok_or(not_found)?;
                *slot = value;
                Ok(())
            }
            _ => unreachable!("writable spaces handled above"),
        }
    }
}
