//! Modbus TCP frame codec
//!
//! Pure, side-effect-free encode/decode functions for the MBAP header and the
//! request/response PDUs of the supported function codes. All multi-byte
//! fields are big-endian on the wire. Nothing in this module performs I/O;
//! the client and server engines feed it buffers obtained from a
//! [`crate::transport::ModbusChannel`].
//!
//! Frame layout (Modbus TCP ADU):
//!
//! ```text
//! +----------------+---------------+--------+---------+----------------+
//! | Transaction ID | Protocol ID=0 | Length | Unit ID | PDU (FC + data)|
//! |    2 bytes     |    2 bytes    | 2 bytes| 1 byte  |  <= 253 bytes  |
//! +----------------+---------------+--------+---------+----------------+
//! ```
//!
//! The `Length` field counts the unit id plus the PDU.

use tracing::debug;

use crate::constants::{
    COIL_ON, EXCEPTION_FLAG, MAX_READ_BITS, MAX_READ_REGISTERS, MBAP_HEADER_LEN, REQUEST_ADU_LEN,
};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{
    DecodedRequest, ExceptionCode, ExceptionData, MbapHeader, ModbusFunction, RequestData,
};

/// Encode a 7-byte MBAP header for a PDU of `pdu_size` bytes
///
/// The length field is `pdu_size + 1` to account for the unit id byte.
pub fn encode_header(pdu_size: u16, transaction_id: u16, unit_id: u8) -> [u8; MBAP_HEADER_LEN] {
    let mut header = [0u8; MBAP_HEADER_LEN];
    header[0..2].copy_from_slice(&transaction_id.to_be_bytes());
    // 2-3: protocol id, always 0x0000
    header[4..6].copy_from_slice(&(pdu_size + 1).to_be_bytes());
    header[6] = unit_id;
    header
}

/// Decode a 7-byte MBAP header
///
/// Fails with a frame error on a short buffer or a nonzero protocol id.
/// The unit id is returned unvalidated; accepting or rejecting it is the
/// caller's policy.
pub fn decode_header(buffer: &[u8]) -> ModbusResult<MbapHeader> {
    if buffer.len() < MBAP_HEADER_LEN {
        return Err(ModbusError::frame(format!(
            "MBAP header too short: {} bytes",
            buffer.len()
        )));
    }

    let header = MbapHeader {
        transaction_id: u16::from_be_bytes([buffer[0], buffer[1]]),
        protocol_id: u16::from_be_bytes([buffer[2], buffer[3]]),
        length: u16::from_be_bytes([buffer[4], buffer[5]]),
        unit_id: buffer[6],
    };

    if header.protocol_id != 0 {
        return Err(ModbusError::frame(format!(
            "invalid protocol id: 0x{:04X}",
            header.protocol_id
        )));
    }

    Ok(header)
}

/// Encode a 12-byte read request ADU (FC01-FC04)
pub fn encode_read_request(
    transaction_id: u16,
    unit_id: u8,
    start_address: u16,
    quantity: u16,
    function: ModbusFunction,
) -> Vec<u8> {
    // PDU = FC + start address + quantity
    let mut adu = Vec::with_capacity(REQUEST_ADU_LEN);
    adu.extend_from_slice(&encode_header(5, transaction_id, unit_id));
    adu.push(function.to_u8());
    adu.extend_from_slice(&start_address.to_be_bytes());
    adu.extend_from_slice(&quantity.to_be_bytes());
    adu
}

/// Encode a 12-byte single-write request ADU (FC05/FC06)
///
/// For FC05 any nonzero `value` is encoded as the ON pattern `FF 00` and zero
/// as `00 00`. For FC06 the value is emitted big-endian as given.
pub fn encode_write_request(
    transaction_id: u16,
    unit_id: u8,
    address: u16,
    value: u16,
    function: ModbusFunction,
) -> Vec<u8> {
    let mut adu = Vec::with_capacity(REQUEST_ADU_LEN);
    adu.extend_from_slice(&encode_header(5, transaction_id, unit_id));
    adu.push(function.to_u8());
    adu.extend_from_slice(&address.to_be_bytes());

    let wire_value = match function {
        ModbusFunction::WriteSingleCoil => {
            if value != 0 {
                COIL_ON
            } else {
                0
            }
        }
        _ => value,
    };
    adu.extend_from_slice(&wire_value.to_be_bytes());
    adu
}

/// Decode a request PDU into a [`DecodedRequest`]
///
/// Well-formed requests for an unsupported function code or with an
/// out-of-range read quantity are not errors: they decode to the
/// [`ExceptionData`] the server must answer with. Only a buffer too short to
/// inspect is a frame error, which terminates the connection.
pub fn decode_request(pdu: &[u8]) -> ModbusResult<DecodedRequest> {
    if pdu.len() < 5 {
        return Err(ModbusError::frame(format!(
            "request PDU too short: {} bytes",
            pdu.len()
        )));
    }

    let fc = pdu[0];
    let start_addr = u16::from_be_bytes([pdu[1], pdu[2]]);
    let data_word = u16::from_be_bytes([pdu[3], pdu[4]]);

    let function = match ModbusFunction::from_u8(fc) {
        Ok(function) => function,
        Err(_) => {
            debug!("request decode: unsupported FC 0x{:02X}", fc);
            return Ok(DecodedRequest::Exception(ExceptionData::new(
                fc,
                ExceptionCode::IllegalFunction,
            )));
        }
    };

    let request = match function {
        ModbusFunction::WriteSingleCoil => {
            // Only FF00/0000 are legal output values on the wire
            let value = match data_word {
                COIL_ON => 1,
                0x0000 => 0,
                _ => {
                    debug!("request decode: illegal coil value 0x{:04X}", data_word);
                    return Ok(DecodedRequest::Exception(ExceptionData::new(
                        fc,
                        ExceptionCode::IllegalDataValue,
                    )));
                }
            };
            RequestData {
                function,
                start_addr,
                number: 0,
                value,
            }
        }
        ModbusFunction::WriteSingleRegister => RequestData {
            function,
            start_addr,
            number: 0,
            value: data_word,
        },
        _ => {
            // Register responses carry 2 bytes per entity, so their bound is
            // tighter than the bit bound: quantities above it cannot be
            // framed within the one-byte count field
            let max_quantity = if function.is_bit_function() {
                MAX_READ_BITS
            } else {
                MAX_READ_REGISTERS
            };
            if data_word == 0 || data_word > max_quantity {
                debug!("request decode: illegal read quantity {}", data_word);
                return Ok(DecodedRequest::Exception(ExceptionData::new(
                    fc,
                    ExceptionCode::IllegalDataValue,
                )));
            }
            RequestData {
                function,
                start_addr,
                number: data_word,
                value: 0,
            }
        }
    };

    debug!(
        "request decode: {} start={} number={} value={}",
        request.function, request.start_addr, request.number, request.value
    );
    Ok(DecodedRequest::Request(request))
}

/// Encode a full read-bits response ADU (FC01/FC02)
///
/// Bits are packed LSB-first within each data byte: `bits[i]` lands in bit
/// `i % 8` of byte `i / 8`. `byte_count = ceil(quantity / 8)`.
pub fn encode_read_bits_response(
    header: &MbapHeader,
    request: &RequestData,
    bits: &[bool],
) -> Vec<u8> {
    let quantity = request.number as usize;
    let byte_count = quantity.div_ceil(8);

    let mut data_bytes = vec![0u8; byte_count];
    for (i, &bit) in bits.iter().take(quantity).enumerate() {
        if bit {
            data_bytes[i / 8] |= 1 << (i % 8);
        }
    }

    let pdu_size = (2 + byte_count) as u16;
    let mut adu = Vec::with_capacity(MBAP_HEADER_LEN + pdu_size as usize);
    adu.extend_from_slice(&encode_header(pdu_size, header.transaction_id, header.unit_id));
    adu.push(request.function.to_u8());
    adu.push(byte_count as u8);
    adu.extend_from_slice(&data_bytes);
    adu
}

/// Encode a full read-registers response ADU (FC03/FC04)
///
/// Each register is emitted MSB then LSB; `byte_count = 2 * quantity`.
pub fn encode_read_registers_response(
    header: &MbapHeader,
    request: &RequestData,
    registers: &[u16],
) -> Vec<u8> {
    let quantity = request.number as usize;
    let byte_count = quantity * 2;

    let pdu_size = (2 + byte_count) as u16;
    let mut adu = Vec::with_capacity(MBAP_HEADER_LEN + pdu_size as usize);
    adu.extend_from_slice(&encode_header(pdu_size, header.transaction_id, header.unit_id));
    adu.push(request.function.to_u8());
    adu.push(byte_count as u8);
    for &register in registers.iter().take(quantity) {
        adu.extend_from_slice(&register.to_be_bytes());
    }
    adu
}

/// Encode the response to a single-write request (FC05/FC06)
///
/// Single-write responses echo the request, so this re-encodes the request
/// fields under the request's transaction id.
pub fn encode_write_response(header: &MbapHeader, request: &RequestData) -> Vec<u8> {
    encode_write_request(
        header.transaction_id,
        header.unit_id,
        request.start_addr,
        request.value,
        request.function,
    )
}

/// Encode a 9-byte exception response ADU
///
/// PDU = `[function | 0x80, exception code]`, length field = 3.
pub fn encode_exception_response(header: &MbapHeader, exception: &ExceptionData) -> Vec<u8> {
    let mut adu = Vec::with_capacity(MBAP_HEADER_LEN + 2);
    adu.extend_from_slice(&encode_header(2, header.transaction_id, header.unit_id));
    adu.push(exception.function | EXCEPTION_FLAG);
    adu.push(exception.code.to_u8());
    adu
}

/// Decode a read-bits response PDU (FC01/FC02) into bit values
///
/// Returns the first `quantity` bits, LSB-first within each data byte.
/// An exception PDU surfaces as [`ModbusError::Exception`]; a function code
/// outside the bit-read family is a protocol violation.
pub fn decode_read_bits_response(pdu: &[u8], quantity: u16) -> ModbusResult<Vec<bool>> {
    let function = check_response_function(
        pdu,
        &[ModbusFunction::ReadCoils, ModbusFunction::ReadDiscreteInputs],
    )?;

    let byte_count = pdu[1] as usize;
    if pdu.len() != 2 + byte_count {
        return Err(ModbusError::frame(format!(
            "byte count {} does not match PDU length {}",
            byte_count,
            pdu.len()
        )));
    }

    let mut bits = Vec::with_capacity(quantity as usize);
    'outer: for &data_byte in &pdu[2..] {
        for bit in 0..8 {
            if bits.len() == quantity as usize {
                break 'outer;
            }
            bits.push((data_byte >> bit) & 0x01 != 0);
        }
    }

    debug!("response decode: {} -> {} bits", function, bits.len());
    Ok(bits)
}

/// Decode a read-registers response PDU (FC03/FC04) into register values
///
/// Requires `byte_count == 2 * quantity` and a PDU of exactly
/// `2 + byte_count` bytes.
pub fn decode_read_registers_response(pdu: &[u8], quantity: u16) -> ModbusResult<Vec<u16>> {
    let function = check_response_function(
        pdu,
        &[
            ModbusFunction::ReadHoldingRegisters,
            ModbusFunction::ReadInputRegisters,
        ],
    )?;

    let byte_count = pdu[1] as usize;
    if pdu.len() != 2 + byte_count || byte_count != quantity as usize * 2 {
        return Err(ModbusError::frame(format!(
            "byte count {} inconsistent with PDU length {} and quantity {}",
            byte_count,
            pdu.len(),
            quantity
        )));
    }

    let registers = pdu[2..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect::<Vec<u16>>();

    debug!("response decode: {} -> {} registers", function, registers.len());
    Ok(registers)
}

/// Common response preamble checks: exception flag, then function family
fn check_response_function(
    pdu: &[u8],
    expected: &[ModbusFunction],
) -> ModbusResult<ModbusFunction> {
    if pdu.len() < 2 {
        return Err(ModbusError::frame(format!(
            "response PDU too short: {} bytes",
            pdu.len()
        )));
    }

    if pdu[0] & EXCEPTION_FLAG != 0 {
        return Err(ModbusError::exception(pdu[0], pdu[1]));
    }

    let function = ModbusFunction::from_u8(pdu[0])
        .map_err(|_| ModbusError::protocol(format!("unexpected function code 0x{:02X}", pdu[0])))?;
    if !expected.contains(&function) {
        return Err(ModbusError::protocol(format!(
            "function code {} does not match the request family",
            function
        )));
    }
    Ok(function)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(transaction_id: u16, length: u16, unit_id: u8) -> MbapHeader {
        MbapHeader {
            transaction_id,
            protocol_id: 0,
            length,
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

    #[test]
    fn test_encode_header() {
        let header = encode_header(5, 1, 1);
        assert_eq!(header, [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01]);
    }

    #[test]
    fn test_header_round_trip() {
        for (pdu_size, tid, unit) in [(5u16, 0u16, 1u8), (2, 0xFFFF, 247), (250, 0x1234, 17)] {
            let decoded = decode_header(&encode_header(pdu_size, tid, unit)).unwrap();
            assert_eq!(decoded.transaction_id, tid);
            assert_eq!(decoded.protocol_id, 0);
            assert_eq!(decoded.length, pdu_size + 1);
            assert_eq!(decoded.unit_id, unit);
        }
    }

    #[test]
    fn test_decode_header_short_buffer() {
        let result = decode_header(&[0x00, 0x01, 0x00]);
        assert!(matches!(result, Err(ModbusError::Frame { .. })));
    }

    #[test]
    fn test_decode_header_bad_protocol_id() {
        let buffer = [0x00, 0x01, 0x00, 0x07, 0x00, 0x06, 0x01];
        let result = decode_header(&buffer);
        assert!(matches!(result, Err(ModbusError::Frame { .. })));
    }

    #[test]
    fn test_read_coils_request_frame() {
        // tid=0, unit=1, start=5, qty=2
        let adu = encode_read_request(0, 1, 5, 2, ModbusFunction::ReadCoils);
        assert_eq!(
            adu,
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x01, 0x01, 0x00, 0x05, 0x00, 0x02]
        );
    }

    #[test]
    fn test_write_single_coil_request_frame() {
        // tid=4, unit=1, address=8, value on
        let adu = encode_write_request(4, 1, 8, 1, ModbusFunction::WriteSingleCoil);
        assert_eq!(
            adu,
            [0x00, 0x04, 0x00, 0x00, 0x00, 0x06, 0x01, 0x05, 0x00, 0x08, 0xFF, 0x00]
        );

        // Encoding is forgiving: any nonzero value selects the ON pattern
        let adu = encode_write_request(4, 1, 8, 0x1234, ModbusFunction::WriteSingleCoil);
        assert_eq!(&adu[10..], [0xFF, 0x00]);

        let adu = encode_write_request(4, 1, 8, 0, ModbusFunction::WriteSingleCoil);
        assert_eq!(&adu[10..], [0x00, 0x00]);
    }

    #[test]
    fn test_write_single_register_request_frame() {
        // tid=5, unit=1, address=7, value=200
        let adu = encode_write_request(5, 1, 7, 200, ModbusFunction::WriteSingleRegister);
        assert_eq!(
            adu,
            [0x00, 0x05, 0x00, 0x00, 0x00, 0x06, 0x01, 0x06, 0x00, 0x07, 0x00, 0xC8]
        );
    }

    #[test]
    fn test_request_round_trip_all_functions() {
        let reads = [
            (ModbusFunction::ReadCoils, 5u16, 2u16),
            (ModbusFunction::ReadDiscreteInputs, 20, 3),
            (ModbusFunction::ReadHoldingRegisters, 11, 4),
            (ModbusFunction::ReadInputRegisters, 6, 1),
        ];
        for (function, start, quantity) in reads {
            let adu = encode_read_request(9, 1, start, quantity, function);
            let decoded = decode_request(&adu[MBAP_HEADER_LEN..]).unwrap();
            assert_eq!(
                decoded,
                DecodedRequest::Request(RequestData {
                    function,
                    start_addr: start,
                    number: quantity,
                    value: 0,
                })
            );
        }

        let adu = encode_write_request(9, 1, 8, 1, ModbusFunction::WriteSingleCoil);
        let decoded = decode_request(&adu[MBAP_HEADER_LEN..]).unwrap();
        assert_eq!(
            decoded,
            DecodedRequest::Request(RequestData {
                function: ModbusFunction::WriteSingleCoil,
                start_addr: 8,
                number: 0,
                value: 1,
            })
        );

        let adu = encode_write_request(9, 1, 7, 200, ModbusFunction::WriteSingleRegister);
        let decoded = decode_request(&adu[MBAP_HEADER_LEN..]).unwrap();
        assert_eq!(
            decoded,
            DecodedRequest::Request(RequestData {
                function: ModbusFunction::WriteSingleRegister,
                start_addr: 7,
                number: 0,
                value: 200,
            })
        );
    }

    #[test]
    fn test_decode_request_quantity_bounds() {
        // FC=3, start=1, qty=3000 is out of range
        let pdu = [0x03, 0x00, 0x01, 0x0B, 0xB8];
        let decoded = decode_request(&pdu).unwrap();
        assert_eq!(
            decoded,
            DecodedRequest::Exception(ExceptionData::new(0x03, ExceptionCode::IllegalDataValue))
        );

        // Zero quantity is equally illegal for every read function
        for fc in 0x01..=0x04u8 {
            let pdu = [fc, 0x00, 0x00, 0x00, 0x00];
            let decoded = decode_request(&pdu).unwrap();
            assert_eq!(
                decoded,
                DecodedRequest::Exception(ExceptionData::new(fc, ExceptionCode::IllegalDataValue))
            );
        }

        // 2000 is the last legal bit quantity
        let pdu = [0x01, 0x00, 0x00, 0x07, 0xD0];
        assert!(matches!(
            decode_request(&pdu).unwrap(),
            DecodedRequest::Request(_)
        ));

        // Register reads are bounded by the response frame: 125 is the last
        // legal quantity, 126 cannot be framed
        let pdu = [0x03, 0x00, 0x00, 0x00, 0x7D];
        assert!(matches!(
            decode_request(&pdu).unwrap(),
            DecodedRequest::Request(_)
        ));
        let pdu = [0x04, 0x00, 0x00, 0x00, 0x7E];
        assert_eq!(
            decode_request(&pdu).unwrap(),
            DecodedRequest::Exception(ExceptionData::new(0x04, ExceptionCode::IllegalDataValue))
        );
    }

    #[test]
    fn test_decode_request_unsupported_function() {
        for fc in [0x00, 0x0F, 0x10, 0x2B] {
            let pdu = [fc, 0x00, 0x01, 0x00, 0x01];
            let decoded = decode_request(&pdu).unwrap();
            assert_eq!(
                decoded,
                DecodedRequest::Exception(ExceptionData::new(fc, ExceptionCode::IllegalFunction))
            );
        }
    }

    #[test]
    fn test_decode_request_illegal_coil_value() {
        // FC05 with a value word that is neither FF00 nor 0000
        let pdu = [0x05, 0x00, 0x08, 0x12, 0x34];
        let decoded = decode_request(&pdu).unwrap();
        assert_eq!(
            decoded,
            DecodedRequest::Exception(ExceptionData::new(0x05, ExceptionCode::IllegalDataValue))
        );
    }

    #[test]
    fn test_decode_request_short_pdu() {
        let result = decode_request(&[0x03, 0x00, 0x01]);
        assert!(matches!(result, Err(ModbusError::Frame { .. })));
    }

    #[test]
    fn test_read_bits_response_frame() {
        let request = read_request(ModbusFunction::ReadCoils, 5, 2);
        let adu = encode_read_bits_response(&header(0, 6, 1), &request, &[false, false]);
        assert_eq!(
            adu,
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x01, 0x01, 0x01, 0x00]
        );
    }

    #[test]
    fn test_read_registers_response_frame() {
        // tid=2, unit=1, start=11, qty=4, all zero values -> 17-byte ADU
        let request = read_request(ModbusFunction::ReadHoldingRegisters, 11, 4);
        let adu = encode_read_registers_response(&header(2, 11, 1), &request, &[0, 0, 0, 0]);
        assert_eq!(
            adu,
            [
                0x00, 0x02, 0x00, 0x00, 0x00, 0x0B, 0x01, 0x03, 0x08, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn test_decode_read_bits_response() {
        // PDU 02 01 05 with quantity 3 -> [1, 0, 1]
        let bits = decode_read_bits_response(&[0x02, 0x01, 0x05], 3).unwrap();
        assert_eq!(bits, [true, false, true]);
    }

    #[test]
    fn test_bit_packing_round_trip() {
        for quantity in [1u16, 7, 8, 9, 16, 19] {
            let bits: Vec<bool> = (0..quantity).map(|i| i % 3 == 0).collect();
            let request = read_request(ModbusFunction::ReadCoils, 0, quantity);
            let adu = encode_read_bits_response(&header(7, 0, 1), &request, &bits);
            let decoded = decode_read_bits_response(&adu[MBAP_HEADER_LEN..], quantity).unwrap();
            assert_eq!(decoded, bits);
        }
    }

    #[test]
    fn test_register_round_trip() {
        let registers = [0xBEEF, 0x0000, 0x1234, 0xFFFF];
        let request = read_request(ModbusFunction::ReadInputRegisters, 10, 4);
        let adu = encode_read_registers_response(&header(3, 0, 1), &request, &registers);
        let decoded = decode_read_registers_response(&adu[MBAP_HEADER_LEN..], 4).unwrap();
        assert_eq!(decoded, registers);
    }

    #[test]
    fn test_length_field_invariant() {
        let frames = [
            encode_read_request(1, 1, 0, 10, ModbusFunction::ReadHoldingRegisters),
            encode_write_request(2, 1, 3, 77, ModbusFunction::WriteSingleRegister),
            encode_read_bits_response(
                &header(3, 0, 1),
                &read_request(ModbusFunction::ReadCoils, 0, 13),
                &[true; 13],
            ),
            encode_read_registers_response(
                &header(4, 0, 1),
                &read_request(ModbusFunction::ReadInputRegisters, 0, 5),
                &[1, 2, 3, 4, 5],
            ),
            encode_exception_response(
                &header(5, 0, 1),
                &ExceptionData::new(0x03, ExceptionCode::IllegalDataAddress),
            ),
        ];
        for adu in frames {
            let length = u16::from_be_bytes([adu[4], adu[5]]) as usize;
            assert_eq!(length, adu.len() - 6);
        }
    }

    #[test]
    fn test_exception_response_framing() {
        let exception = ExceptionData::new(0x04, ExceptionCode::IllegalDataAddress);
        let adu = encode_exception_response(&header(0x0102, 0, 0x11), &exception);

        assert_eq!(adu.len(), 9);
        assert_eq!(&adu[0..2], [0x01, 0x02]);
        assert_eq!(u16::from_be_bytes([adu[4], adu[5]]), 3);
        assert_eq!(adu[6], 0x11);
        assert_eq!(adu[7], 0x04 | EXCEPTION_FLAG);
        assert_eq!(adu[8], 0x02);
    }

    #[test]
    fn test_write_response_echoes_request() {
        let request = RequestData {
            function: ModbusFunction::WriteSingleCoil,
            start_addr: 8,
            number: 0,
            value: 1,
        };
        let response = encode_write_response(&header(4, 6, 1), &request);
        assert_eq!(
            response,
            encode_write_request(4, 1, 8, 1, ModbusFunction::WriteSingleCoil)
        );
    }

    #[test]
    fn test_decode_response_exception_pdu() {
        let result = decode_read_bits_response(&[0x81, 0x02], 1);
        assert_eq!(
            result,
            Err(ModbusError::Exception {
                function: 0x01,
                code: 0x02
            })
        );

        let result = decode_read_registers_response(&[0x83, 0x04], 1);
        assert_eq!(
            result,
            Err(ModbusError::Exception {
                function: 0x03,
                code: 0x04
            })
        );
    }

    #[test]
    fn test_decode_response_wrong_function_family() {
        // A register-read FC is not acceptable for a bit read, and vice versa
        let result = decode_read_bits_response(&[0x03, 0x02, 0x00, 0x00], 1);
        assert!(matches!(result, Err(ModbusError::Protocol { .. })));

        let result = decode_read_registers_response(&[0x01, 0x01, 0x00], 1);
        assert!(matches!(result, Err(ModbusError::Protocol { .. })));
    }

    #[test]
    fn test_decode_response_byte_count_mismatch() {
        // byte_count says 2 but only one data byte present
        let result = decode_read_bits_response(&[0x01, 0x02, 0x05], 9);
        assert!(matches!(result, Err(ModbusError::Frame { .. })));

        // byte_count inconsistent with the requested quantity
        let result = decode_read_registers_response(&[0x03, 0x02, 0x00, 0x01], 2);
        assert!(matches!(result, Err(ModbusError::Frame { .. })));
    }
}
