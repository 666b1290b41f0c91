//! High-level Modbus client implementations
//!
//! The client engine owns one channel and performs strictly serial
//! request/response exchanges on it: there is no pipelining, so a wrapping
//! 16-bit transaction counter is sufficient to correlate responses. Callers
//! needing parallelism instantiate multiple clients.
//!
//! # API Naming Convention
//!
//! This library provides a **dual-track API**:
//!
//! | Function Code | Primary Name | Semantic Alias |
//! |---------------|--------------|----------------|
//! | 0x01 | `read_01()` | `read_coils()` |
//! | 0x02 | `read_02()` | `read_discrete_inputs()` |
//! | 0x03 | `read_03()` | `read_holding_registers()` |
//! | 0x04 | `read_04()` | `read_input_registers()` |
//! | 0x05 | `write_05()` | `write_single_coil()` |
//! | 0x06 | `write_06()` | `write_single_register()` |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ember_modbus::{ModbusClient, ModbusTcpClient, ModbusResult};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut client = ModbusTcpClient::from_address(
//!         "127.0.0.1:502",
//!         Duration::from_secs(5)
//!     ).await?;
//!
//!     // Read 10 holding registers from unit 1, starting at address 0
//!     let registers = client.read_03(1, 0, 10).await?;
//!     println!("Registers: {:?}", registers);
//!
//!     // Write a value to register 100
//!     client.write_06(1, 100, 0x1234).await?;
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use tracing::debug;

use crate::codec::{
    decode_header, decode_read_bits_response, decode_read_registers_response, decode_request,
    encode_read_request, encode_write_request,
};
use crate::constants::{EXCEPTION_FLAG, MAX_MBAP_LENGTH, MAX_READ_BITS, MAX_READ_REGISTERS, MBAP_HEADER_LEN};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{DecodedRequest, ModbusFunction, UnitId};
use crate::transport::{ModbusChannel, TcpChannel, TransportStats};

/// Trait defining the interface for Modbus client operations
///
/// All standard read and single-write functions are provided with the
/// function code in the primary name and semantic aliases for readability.
///
/// # Protocol Limits
///
/// | Operation | Limit |
/// |-----------|-------|
/// | Read Coils (0x01) | 2000 bits |
/// | Read Discrete Inputs (0x02) | 2000 bits |
/// | Read Holding Registers (0x03) | 125 registers |
/// | Read Input Registers (0x04) | 125 registers |
pub trait ModbusClient: Send {
    /// Read coils (function code 0x01).
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Starting coil address (0-65535)
    /// * `quantity` - Number of coils to read (1-2000)
    fn read_01(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<bool>>> + Send;

    /// Read discrete inputs (function code 0x02).
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Starting input address (0-65535)
    /// * `quantity` - Number of inputs to read (1-2000)
    fn read_02(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<bool>>> + Send;

    /// Read holding registers (function code 0x03).
    ///
    /// This is the most commonly used function for reading process data.
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Starting register address (0-65535)
    /// * `quantity` - Number of registers to read (1-125)
    fn read_03(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Read input registers (function code 0x04).
    ///
    /// Input registers are typically read-only analog inputs.
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Starting register address (0-65535)
    /// * `quantity` - Number of registers to read (1-125)
    fn read_04(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Write single coil (function code 0x05).
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Coil address (0-65535)
    /// * `value` - `true` for ON (0xFF00), `false` for OFF (0x0000)
    fn write_05(
        &mut self,
        unit_id: UnitId,
        address: u16,
        value: bool,
    ) -> impl std::future::Future<Output = ModbusResult<()>> + Send;

    /// Write single register (function code 0x06).
    ///
    /// # Arguments
    ///
    /// * `unit_id` - The Modbus slave/unit ID (1-247)
    /// * `address` - Register address (0-65535)
    /// * `value` - 16-bit value to write
    fn write_06(
        &mut self,
        unit_id: UnitId,
        address: u16,
        value: u16,
    ) -> impl std::future::Future<Output = ModbusResult<()>> + Send;

    /// Check if the client is connected.
    fn is_connected(&self) -> bool;

    /// Close the client connection.
    fn close(&mut self) -> impl std::future::Future<Output = ModbusResult<()>> + Send;

    /// Get transport statistics.
    fn get_stats(&self) -> TransportStats;

    // ===== Semantic name aliases (for readability) =====

    /// Alias for `read_01` - Read coils
    #[inline]
    fn read_coils(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<bool>>> + Send {
        self.read_01(unit_id, address, quantity)
    }

    /// Alias for `read_02` - Read discrete inputs
    #[inline]
    fn read_discrete_inputs(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<bool>>> + Send {
        self.read_02(unit_id, address, quantity)
    }

    /// Alias for `read_03` - Read holding registers
    #[inline]
    fn read_holding_registers(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_03(unit_id, address, quantity)
    }

    /// Alias for `read_04` - Read input registers
    #[inline]
    fn read_input_registers(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> impl std::future::Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_04(unit_id, address, quantity)
    }

    /// Alias for `write_05` - Write single coil
    #[inline]
    fn write_single_coil(
        &mut self,
        unit_id: UnitId,
        address: u16,
        value: bool,
    ) -> impl std::future::Future<Output = ModbusResult<()>> + Send {
        self.write_05(unit_id, address, value)
    }

    /// Alias for `write_06` - Write single register
    #[inline]
    fn write_single_register(
        &mut self,
        unit_id: UnitId,
        address: u16,
        value: u16,
    ) -> impl std::future::Future<Output = ModbusResult<()>> + Send {
        self.write_06(unit_id, address, value)
    }
}

/// Generic Modbus client over any channel
///
/// Implements the transaction loop once; the concrete transport is supplied
/// by the channel type. [`ModbusTcpClient`] wraps this over [`TcpChannel`].
pub struct GenericModbusClient<C: ModbusChannel> {
    channel: C,
    next_tid: u16,
    stats: TransportStats,
}

impl<C: ModbusChannel> GenericModbusClient<C> {
    /// Create a new generic client over an established channel
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            next_tid: 0,
            stats: TransportStats::default(),
        }
    }

    /// Get a reference to the underlying channel
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Get a mutable reference to the underlying channel
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Allocate the next transaction id (wrapping 16-bit counter)
    fn next_transaction_id(&mut self) -> u16 {
        let tid = self.next_tid;
        self.next_tid = self.next_tid.wrapping_add(1);
        tid
    }

    fn validate_unit_id(unit_id: UnitId) -> ModbusResult<()> {
        if unit_id == 0 || unit_id > 247 {
            return Err(ModbusError::invalid_data(format!(
                "invalid unit id: {}",
                unit_id
            )));
        }
        Ok(())
    }

    /// Execute one request/response exchange and return the response PDU
    ///
    /// Validates the response header against the request (protocol id,
    /// transaction id, unit id) and surfaces exception PDUs as
    /// [`ModbusError::Exception`].
    async fn transact(
        &mut self,
        request: Vec<u8>,
        tid: u16,
        unit_id: UnitId,
    ) -> ModbusResult<Vec<u8>> {
        let result = self.transact_inner(request, tid, unit_id).await;
        if let Err(ref e) = result {
            self.stats.errors += 1;
            if matches!(e, ModbusError::Timeout { .. }) {
                self.stats.timeouts += 1;
            }
        }
        result
    }

    async fn transact_inner(
        &mut self,
        request: Vec<u8>,
        tid: u16,
        unit_id: UnitId,
    ) -> ModbusResult<Vec<u8>> {
        self.stats.requests_sent += 1;
        self.stats.bytes_sent += request.len() as u64;
        self.channel.write_all(&request).await?;

        let header_bytes = self.channel.read_exact(MBAP_HEADER_LEN).await?;
        let header = decode_header(&header_bytes)?;

        if header.transaction_id != tid {
            return Err(ModbusError::protocol(format!(
                "transaction id mismatch: expected {}, got {}",
                tid, header.transaction_id
            )));
        }
        if header.unit_id != unit_id {
            return Err(ModbusError::protocol(format!(
                "unit id mismatch: expected {}, got {}",
                unit_id, header.unit_id
            )));
        }
        if header.length < 2 || header.length as usize > MAX_MBAP_LENGTH {
            return Err(ModbusError::frame(format!(
                "invalid response length field: {}",
                header.length
            )));
        }

        let pdu = self.channel.read_exact(header.length as usize - 1).await?;
        self.stats.responses_received += 1;
        self.stats.bytes_received += (MBAP_HEADER_LEN + pdu.len()) as u64;

        if pdu[0] & EXCEPTION_FLAG != 0 {
            if pdu.len() < 2 {
                return Err(ModbusError::frame("truncated exception response"));
            }
            return Err(ModbusError::exception(pdu[0], pdu[1]));
        }

        Ok(pdu)
    }

    async fn read_bits(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
        function: ModbusFunction,
    ) -> ModbusResult<Vec<bool>> {
        Self::validate_unit_id(unit_id)?;
        if quantity == 0 || quantity > MAX_READ_BITS {
            return Err(ModbusError::invalid_data(format!(
                "invalid bit read quantity: {}",
                quantity
            )));
        }

        let tid = self.next_transaction_id();
        let request = encode_read_request(tid, unit_id, address, quantity, function);
        let pdu = self.transact(request, tid, unit_id).await?;
        decode_read_bits_response(&pdu, quantity)
    }

    async fn read_registers(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
        function: ModbusFunction,
    ) -> ModbusResult<Vec<u16>> {
        Self::validate_unit_id(unit_id)?;
        if quantity == 0 || quantity > MAX_READ_REGISTERS {
            return Err(ModbusError::invalid_data(format!(
                "invalid register read quantity: {}",
                quantity
            )));
        }

        let tid = self.next_transaction_id();
        let request = encode_read_request(tid, unit_id, address, quantity, function);
        let pdu = self.transact(request, tid, unit_id).await?;
        decode_read_registers_response(&pdu, quantity)
    }

    /// Single-write exchange; the response must echo the request
    async fn write_single(
        &mut self,
        unit_id: UnitId,
        address: u16,
        value: u16,
        function: ModbusFunction,
    ) -> ModbusResult<()> {
        Self::validate_unit_id(unit_id)?;

        let tid = self.next_transaction_id();
        let request = encode_write_request(tid, unit_id, address, value, function);
        let pdu = self.transact(request, tid, unit_id).await?;

        let echo = match decode_request(&pdu)? {
            DecodedRequest::Request(echo) => echo,
            DecodedRequest::Exception(exception) => {
                return Err(ModbusError::protocol(format!(
                    "malformed write echo: FC 0x{:02X}, {}",
                    exception.function, exception.code
                )))
            }
        };

        if echo.function != function {
            return Err(ModbusError::protocol(format!(
                "write echo function mismatch: expected {}, got {}",
                function, echo.function
            )));
        }
        if echo.start_addr != address {
            return Err(ModbusError::protocol(format!(
                "write echo address mismatch: expected {}, got {}",
                address, echo.start_addr
            )));
        }
        // FC05 echoes decode to the normalized 0/1 value
        let expected = match function {
            ModbusFunction::WriteSingleCoil => u16::from(value != 0),
            _ => value,
        };
        if echo.value != expected {
            return Err(ModbusError::protocol(format!(
                "write echo value mismatch: expected {}, got {}",
                expected, echo.value
            )));
        }

        debug!("{} confirmed at address {}", function, address);
        Ok(())
    }
}

impl<C: ModbusChannel> ModbusClient for GenericModbusClient<C> {
    async fn read_01(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.read_bits(unit_id, address, quantity, ModbusFunction::ReadCoils)
            .await
    }

    async fn read_02(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.read_bits(unit_id, address, quantity, ModbusFunction::ReadDiscreteInputs)
            .await
    }

    async fn read_03(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.read_registers(unit_id, address, quantity, ModbusFunction::ReadHoldingRegisters)
            .await
    }

    async fn read_04(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.read_registers(unit_id, address, quantity, ModbusFunction::ReadInputRegisters)
            .await
    }

    async fn write_05(&mut self, unit_id: UnitId, address: u16, value: bool) -> ModbusResult<()> {
        self.write_single(
            unit_id,
            address,
            u16::from(value),
            ModbusFunction::WriteSingleCoil,
        )
        .await
    }

    async fn write_06(&mut self, unit_id: UnitId, address: u16, value: u16) -> ModbusResult<()> {
        self.write_single(unit_id, address, value, ModbusFunction::WriteSingleRegister)
            .await
    }

    fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    async fn close(&mut self) -> ModbusResult<()> {
        self.channel.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.stats.clone()
    }
}

/// Modbus TCP client implementation using the generic client
pub struct ModbusTcpClient {
    inner: GenericModbusClient<TcpChannel>,
    address: SocketAddr,
}

impl ModbusTcpClient {
    /// Create a new TCP client
    pub async fn new(address: SocketAddr, timeout: Duration) -> ModbusResult<Self> {
        let channel = TcpChannel::connect(address, timeout).await?;
        Ok(Self {
            inner: GenericModbusClient::new(channel),
            address,
        })
    }

    /// Create a new TCP client from an address string
    pub async fn from_address(address: &str, timeout: Duration) -> ModbusResult<Self> {
        let address: SocketAddr = address
            .parse()
            .map_err(|e| ModbusError::configuration(format!("Invalid address: {}", e)))?;
        Self::new(address, timeout).await
    }

    /// Create a new TCP client from an established channel
    pub fn from_channel(channel: TcpChannel) -> Self {
        let address = channel.peer_addr();
        Self {
            inner: GenericModbusClient::new(channel),
            address,
        }
    }

    /// Get the server address
    pub fn server_address(&self) -> SocketAddr {
        self.address
    }

    /// Enable or disable hex packet logging on the channel
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.inner.channel_mut().set_packet_logging(enabled);
    }
}

impl ModbusClient for ModbusTcpClient {
    async fn read_01(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.inner.read_01(unit_id, address, quantity).await
    }

    async fn read_02(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.inner.read_02(unit_id, address, quantity).await
    }

    async fn read_03(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.inner.read_03(unit_id, address, quantity).await
    }

    async fn read_04(
        &mut self,
        unit_id: UnitId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.inner.read_04(unit_id, address, quantity).await
    }

    async fn write_05(&mut self, unit_id: UnitId, address: u16, value: bool) -> ModbusResult<()> {
        self.inner.write_05(unit_id, address, value).await
    }

    async fn write_06(&mut self, unit_id: UnitId, address: u16, value: u16) -> ModbusResult<()> {
        self.inner.write_06(unit_id, address, value).await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn close(&mut self) -> ModbusResult<()> {
        self.inner.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.inner.get_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_read_bits_response, encode_read_registers_response};
    use crate::protocol::{MbapHeader, RequestData};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Scripted channel: records writes, serves reads from a byte queue
    struct MockChannel {
        written: Vec<u8>,
        incoming: VecDeque<u8>,
        connected: bool,
    }

    impl MockChannel {
        fn new() -> Self {
            Self {
                written: Vec::new(),
                incoming: VecDeque::new(),
                connected: true,
            }
        }

        /// Queue a full response ADU for the client to read back
        fn push_response(&mut self, adu: &[u8]) {
            self.incoming.extend(adu.iter().copied());
        }
    }

    #[async_trait]
    impl ModbusChannel for MockChannel {
        async fn read_exact(&mut self, count: usize) -> ModbusResult<Vec<u8>> {
            if self.incoming.len() < count {
                return Err(ModbusError::connection("read: connection closed by peer"));
            }
            Ok(self.incoming.drain(..count).collect())
        }

        async fn write_all(&mut self, data: &[u8]) -> ModbusResult<()> {
            self.written.extend_from_slice(data);
            Ok(())
        }

        async fn close(&mut self) -> ModbusResult<()> {
            self.connected = false;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn response_header(tid: u16, unit_id: u8) -> MbapHeader {
        MbapHeader {
            transaction_id: tid,
            protocol_id: 0,
            length: 0,
            unit_id,
        }
    }

    fn read_request(function: ModbusFunction, start_addr: u16, number: u16) -> RequestData {
        RequestData {
            function,
            start_addr,
            number,
            value: 0,
        }
    }

    #[tokio::test]
    async fn test_read_03_round_trip() {
        let mut channel = MockChannel::new();
        channel.push_response(&encode_read_registers_response(
            &response_header(0, 1),
            &read_request(ModbusFunction::ReadHoldingRegisters, 0, 3),
            &[0x0102, 0x0304, 0x0506],
        ));

        let mut client = GenericModbusClient::new(channel);
        let values = client.read_03(1, 0, 3).await.unwrap();
        assert_eq!(values, [0x0102, 0x0304, 0x0506]);

        // The emitted request carries tid 0 and the read parameters
        assert_eq!(
            client.channel().written,
            encode_read_request(0, 1, 0, 3, ModbusFunction::ReadHoldingRegisters)
        );

        let stats = client.get_stats();
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.responses_received, 1);
        assert_eq!(stats.errors, 0);
    }

    #[tokio::test]
    async fn test_read_01_round_trip() {
        let mut channel = MockChannel::new();
        channel.push_response(&encode_read_bits_response(
            &response_header(0, 1),
            &read_request(ModbusFunction::ReadCoils, 5, 3),
            &[true, false, true],
        ));

        let mut client = GenericModbusClient::new(channel);
        let bits = client.read_01(1, 5, 3).await.unwrap();
        assert_eq!(bits, [true, false, true]);
    }

    #[tokio::test]
    async fn test_transaction_id_increments() {
        let mut channel = MockChannel::new();
        for tid in 0..2u16 {
            channel.push_response(&encode_read_registers_response(
                &response_header(tid, 1),
                &read_request(ModbusFunction::ReadInputRegisters, 0, 1),
                &[7],
            ));
        }

        let mut client = GenericModbusClient::new(channel);
        client.read_04(1, 0, 1).await.unwrap();
        client.read_04(1, 0, 1).await.unwrap();

        let written = &client.channel().written;
        assert_eq!(&written[0..2], [0x00, 0x00]);
        assert_eq!(&written[12..14], [0x00, 0x01]);
    }

    #[tokio::test]
    async fn test_transaction_id_mismatch() {
        let mut channel = MockChannel::new();
        // Server answers with tid 7 instead of 0
        channel.push_response(&encode_read_registers_response(
            &response_header(7, 1),
            &read_request(ModbusFunction::ReadHoldingRegisters, 0, 1),
            &[0],
        ));

        let mut client = GenericModbusClient::new(channel);
        let result = client.read_03(1, 0, 1).await;
        assert!(matches!(result, Err(ModbusError::Protocol { .. })));
        assert_eq!(client.get_stats().errors, 1);
    }

    #[tokio::test]
    async fn test_unit_id_mismatch() {
        let mut channel = MockChannel::new();
        channel.push_response(&encode_read_registers_response(
            &response_header(0, 9),
            &read_request(ModbusFunction::ReadHoldingRegisters, 0, 1),
            &[0],
        ));

        let mut client = GenericModbusClient::new(channel);
        let result = client.read_03(1, 0, 1).await;
        assert!(matches!(result, Err(ModbusError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_exception_response_surfaces_code() {
        let mut channel = MockChannel::new();
        // Exception ADU: FC 0x83, code 0x02
        channel.push_response(&[
            0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x01, 0x83, 0x02,
        ]);

        let mut client = GenericModbusClient::new(channel);
        let result = client.read_03(1, 1000, 1).await;
        assert_eq!(
            result,
            Err(ModbusError::Exception {
                function: 0x03,
                code: 0x02
            })
        );
    }

    #[tokio::test]
    async fn test_write_06_echo_verification() {
        let mut channel = MockChannel::new();
        channel.push_response(&encode_write_request(
            0,
            1,
            7,
            200,
            ModbusFunction::WriteSingleRegister,
        ));

        let mut client = GenericModbusClient::new(channel);
        client.write_06(1, 7, 200).await.unwrap();
        assert_eq!(
            client.channel().written,
            encode_write_request(0, 1, 7, 200, ModbusFunction::WriteSingleRegister)
        );
    }

    #[tokio::test]
    async fn test_write_06_echo_value_mismatch() {
        let mut channel = MockChannel::new();
        // Echo reports a different value than requested
        channel.push_response(&encode_write_request(
            0,
            1,
            7,
            201,
            ModbusFunction::WriteSingleRegister,
        ));

        let mut client = GenericModbusClient::new(channel);
        let result = client.write_06(1, 7, 200).await;
        assert!(matches!(result, Err(ModbusError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_write_05_wire_format() {
        let mut channel = MockChannel::new();
        channel.push_response(&encode_write_request(
            0,
            1,
            8,
            1,
            ModbusFunction::WriteSingleCoil,
        ));

        let mut client = GenericModbusClient::new(channel);
        client.write_05(1, 8, true).await.unwrap();

        // Value bytes on the wire are the ON pattern
        assert_eq!(&client.channel().written[10..12], [0xFF, 0x00]);
    }

    #[tokio::test]
    async fn test_caller_side_validation() {
        let mut client = GenericModbusClient::new(MockChannel::new());

        assert!(matches!(
            client.read_01(1, 0, 0).await,
            Err(ModbusError::InvalidData { .. })
        ));
        assert!(matches!(
            client.read_01(1, 0, 2001).await,
            Err(ModbusError::InvalidData { .. })
        ));
        assert!(matches!(
            client.read_03(1, 0, 126).await,
            Err(ModbusError::InvalidData { .. })
        ));
        assert!(matches!(
            client.read_03(0, 0, 1).await,
            Err(ModbusError::InvalidData { .. })
        ));
        assert!(matches!(
            client.read_03(248, 0, 1).await,
            Err(ModbusError::InvalidData { .. })
        ));

        // Nothing reached the wire
        assert!(client.channel().written.is_empty());
    }

    #[tokio::test]
    async fn test_close_marks_disconnected() {
        let mut client = GenericModbusClient::new(MockChannel::new());
        assert!(client.is_connected());
        client.close().await.unwrap();
        assert!(!client.is_connected());
    }
}
