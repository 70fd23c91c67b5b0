//! Framing layer for the PCM60X wire protocol.
//!
//! Frames are `header, length, payload, CRC` with the CRC computed over everything before it.
//! This module knows nothing about what the payload bytes mean; see
//! [`registers`](crate::registers) for that.

/// Marker byte opening every request and response frame.
pub const FRAME_HEADER: u8 = 0xA5;
/// The single command the controller understands: read the status block.
pub const STATUS_COMMAND: u8 = 0x51;
/// Largest payload the parser will accept. The status payload is 42 bytes;
/// the extra headroom covers longer frames from newer firmware without
/// reallocating.
pub const MAX_PAYLOAD: usize = 64;
/// Header + length byte + two CRC bytes. Anything shorter cannot be judged.
pub const MIN_FRAME_LEN: usize = 4;

const REQUEST_LEN: usize = MIN_FRAME_LEN + 1;
const RESPONSE_BUF: usize = MAX_PAYLOAD + MIN_FRAME_LEN;

/// One validated response frame. The payload is copied out of the receive
/// buffer on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl ResponseFrame {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Result of feeding the accumulated receive buffer to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete, CRC-validated frame.
    Complete(ResponseFrame),
    /// Not enough bytes buffered yet; keep reading.
    NeedMoreBytes,
    /// Header or CRC mismatch. The caller must discard bytes via [`resync`]
    /// rather than retry the same buffer.
    Invalid,
}

/// CRC-16/IBM, poly `0xA001`, init 0. This is the checksum the controller
/// firmware computes over its frames.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Produce the fixed "read status" request frame.
pub fn encode_request() -> [u8; REQUEST_LEN] {
    let mut frame = [FRAME_HEADER, 0x01, STATUS_COMMAND, 0, 0];
    let crc = crc16(&frame[..3]).to_le_bytes();
    frame[3] = crc[0];
    frame[4] = crc[1];
    frame
}

/// Build a well-formed response frame around `payload`.
///
/// The controller does this on the other end of the wire; here it exists for
/// unit tests and device simulators. Returns `None` when the payload exceeds
/// [`MAX_PAYLOAD`].
pub fn encode_response(payload: &[u8]) -> Option<heapless::Vec<u8, RESPONSE_BUF>> {
    if payload.len() > MAX_PAYLOAD {
        return None;
    }
    let mut frame: heapless::Vec<u8, RESPONSE_BUF> = heapless::Vec::new();
    frame.push(FRAME_HEADER).ok()?;
    frame.push(payload.len() as u8).ok()?;
    frame.extend_from_slice(payload).ok()?;
    let crc = crc16(&frame);
    frame.extend_from_slice(&crc.to_le_bytes()).ok()?;
    Some(frame)
}

/// Try to extract one frame from the front of the accumulated buffer.
pub fn try_parse(buf: &[u8]) -> ParseOutcome {
    if buf.len() < MIN_FRAME_LEN {
        return ParseOutcome::NeedMoreBytes;
    }
    if buf[0] != FRAME_HEADER {
        return ParseOutcome::Invalid;
    }
    let len = buf[1] as usize;
    if len > MAX_PAYLOAD {
        return ParseOutcome::Invalid;
    }
    let total = len + MIN_FRAME_LEN;
    if buf.len() < total {
        return ParseOutcome::NeedMoreBytes;
    }
    let expected = crc16(&buf[..2 + len]);
    let received = u16::from_le_bytes([buf[2 + len], buf[3 + len]]);
    if expected != received {
        return ParseOutcome::Invalid;
    }
    let mut payload = heapless::Vec::new();
    if payload.extend_from_slice(&buf[2..2 + len]).is_err() {
        return ParseOutcome::Invalid;
    }
    ParseOutcome::Complete(ResponseFrame { payload })
}

/// Discard buffered bytes up to the next plausible header byte.
///
/// Always drops at least one byte, so repeated `try_parse`/`resync` rounds
/// terminate. Empties the buffer when no header candidate remains.
pub fn resync<const L: usize>(buf: &mut heapless::Vec<u8, L>) {
    let skip = buf
        .iter()
        .skip(1)
        .position(|&b| b == FRAME_HEADER)
        .map(|p| p + 1)
        .unwrap_or(buf.len());
    let len = buf.len();
    buf.copy_within(skip..len, 0);
    buf.truncate(len - skip);
}
