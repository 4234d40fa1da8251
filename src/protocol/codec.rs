//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! Strings are `str_len (4 bytes) + utf8`.
//! - LIST:          empty
//! - GET_RECORD:    surname
//! - GET_ENTRY:     surname + first_name
//! - PUT:           JSON update document (rest of payload)
//! - DELETE_RECORD: surname
//! - DELETE_ENTRY:  surname + first_name
//! - PING:          empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{PhoneBookError, Result};

use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();
    match command {
        Command::List | Command::Ping => {}
        Command::GetRecord { surname } | Command::DeleteRecord { surname } => {
            put_string(&mut payload, surname);
        }
        Command::GetEntry {
            surname,
            first_name,
        }
        | Command::DeleteEntry {
            surname,
            first_name,
        } => {
            put_string(&mut payload, surname);
            put_string(&mut payload, first_name);
        }
        Command::Put { document } => payload.put_slice(document),
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_byte, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::try_from(cmd_byte).map_err(|b| {
        PhoneBookError::Protocol(format!("Unknown command type: 0x{:02x}", b))
    })?;

    let mut buf = payload;
    let command = match cmd_type {
        CommandType::List => Command::List,
        CommandType::Ping => Command::Ping,
        CommandType::GetRecord => Command::GetRecord {
            surname: get_string(&mut buf, "GET_RECORD surname")?,
        },
        CommandType::DeleteRecord => Command::DeleteRecord {
            surname: get_string(&mut buf, "DELETE_RECORD surname")?,
        },
        CommandType::GetEntry => Command::GetEntry {
            surname: get_string(&mut buf, "GET_ENTRY surname")?,
            first_name: get_string(&mut buf, "GET_ENTRY first name")?,
        },
        CommandType::DeleteEntry => Command::DeleteEntry {
            surname: get_string(&mut buf, "DELETE_ENTRY surname")?,
            first_name: get_string(&mut buf, "DELETE_ENTRY first name")?,
        },
        CommandType::Put => Command::Put {
            document: std::mem::take(&mut buf).to_vec(),
        },
    };

    if buf.has_remaining() {
        return Err(PhoneBookError::Protocol(format!(
            "{:?} command: unexpected {} trailing bytes",
            cmd_type,
            buf.remaining()
        )));
    }

    Ok(command)
}

fn put_string(buf: &mut BytesMut, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

fn get_string(buf: &mut &[u8], what: &str) -> Result<String> {
    if buf.remaining() < 4 {
        return Err(PhoneBookError::Protocol(format!("{}: missing length", what)));
    }
    let len = buf.get_u32() as usize;

    if buf.remaining() < len {
        return Err(PhoneBookError::Protocol(format!(
            "{}: incomplete (expected {}, got {})",
            what,
            len,
            buf.remaining()
        )));
    }
    let value = String::from_utf8(buf[..len].to_vec())
        .map_err(|_| PhoneBookError::Protocol(format!("{}: invalid UTF-8", what)))?;
    buf.advance(len);

    Ok(value)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        0x03 => Status::BadRequest,
        _ => {
            return Err(PhoneBookError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate a complete frame and split it into tag and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(PhoneBookError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = header.get_u32() as usize;
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(PhoneBookError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: usize) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(PhoneBookError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32() as usize;
    check_payload_len(payload_len)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}
