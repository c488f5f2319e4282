//! Token serialization for T-code commands.
//!
//! This module provides the [`Serialize`] trait for writing [`Command`] and
//! [`DataCommandType`] values back to the wire format, for hosts that drive a
//! T-code device.
//!
//! # Token Format
//!
//! ```text
//! <Class><Channel>[<MagnitudeDigits>][S<SpeedDigits>][I<IntervalDigits>]
//! D<Code>
//! ```
//!
//! Tokens are written without a delimiter; see
//! [`serialize_line`](crate::builder::serialize_line) for whole lines.
//!
//! # Example
//!
//! ```
//! use tcode_proto::{decode, Serialize};
//!
//! let cmd = decode(b"V299S50").unwrap();
//! let mut buf = [0u8; 64];
//! let len = cmd.serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"V299S50");
//! ```

use crate::fmt::{write_fraction, write_u32, MAX_FRACTION_DIGITS, MAX_U32_DIGITS};
use crate::types::{Command, DataCommandType, MAX_CHANNEL};

/// Fraction digits used when a command carries no wire precision of its own.
pub const DEFAULT_MAGNITUDE_DIGITS: u8 = 4;

/// Maximum size of a serialized command token.
///
/// Breakdown: class(1) + channel(1) + magnitude(9) + S(1) + speed(10) + I(1) + interval(10) = 33
pub const MAX_COMMAND_SIZE: usize = 33;

/// Maximum size of a serialized data-query token: D(1) + code(1).
pub const MAX_DATA_SIZE: usize = 2;

/// Helper for buffer management while writing a token.
struct SerializeBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SerializeBuf<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn write(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
    }

    #[inline]
    fn write_u32(&mut self, value: u32) {
        let mut tmp = [0u8; MAX_U32_DIGITS];
        let len = write_u32(&mut tmp, value);
        self.buf[self.pos..self.pos + len].copy_from_slice(&tmp[..len]);
        self.pos += len;
    }

    #[inline]
    fn write_fraction(&mut self, value: f32, digits: u8) {
        let mut tmp = [0u8; MAX_FRACTION_DIGITS as usize];
        let len = write_fraction(&mut tmp, value, digits);
        self.buf[self.pos..self.pos + len].copy_from_slice(&tmp[..len]);
        self.pos += len;
    }

    #[inline]
    fn finalize(self) -> usize {
        self.pos
    }
}

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized token.
    BufferTooSmall,
    /// A write operation failed (for I/O adapters).
    WriteError,
    /// The command's channel has no single-digit wire form.
    InvalidChannel(u8),
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
            Self::InvalidChannel(channel) => write!(f, "channel {} out of range", channel),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SerializeError {}

/// Extension trait for serializing protocol tokens.
///
/// Implemented for [`Command`] and [`DataCommandType`].
pub trait Serialize {
    /// Serialize to the provided buffer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is not large enough.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Serialize to a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize to a `core::fmt::Write` implementation such as `heapless::String`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_COMMAND_SIZE];
        let len = self.serialize(&mut buf)?;
        let s = core::str::from_utf8(&buf[..len]).map_err(|_| SerializeError::WriteError)?;
        writer.write_str(s).map_err(|_| SerializeError::WriteError)
    }

    /// Serialize to an `embedded_io::Write` implementation (UART, USB CDC, ...).
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_COMMAND_SIZE];
        let len = self.serialize(&mut buf)?;
        writer
            .write_all(&buf[..len])
            .map_err(|_| SerializeError::WriteError)
    }
}

impl Serialize for Command {
    /// Writes the decoded `target`, not the in-flight ramp value.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if self.channel > MAX_CHANNEL {
            return Err(SerializeError::InvalidChannel(self.channel));
        }
        if buf.len() < MAX_COMMAND_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write(self.kind.letter());
        sb.write(b'0' + self.channel);

        sb.write_fraction(self.target, magnitude_digits(self));

        if self.speed > 0 {
            sb.write(b'S');
            sb.write_u32(self.speed);
        }
        if self.interval > 0 {
            sb.write(b'I');
            sb.write_u32(self.interval);
        }

        Ok(sb.finalize())
    }
}

impl Serialize for DataCommandType {
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < MAX_DATA_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write(b'D');
        sb.write(b'0' + self.code());
        Ok(sb.finalize())
    }
}

/// Precision to emit for a command's magnitude.
///
/// A bare `<Class><Channel>` is not a valid token, so a command without ramp
/// fields always gets at least [`DEFAULT_MAGNITUDE_DIGITS`].
fn magnitude_digits(cmd: &Command) -> u8 {
    if cmd.magnitude_digits > 0 {
        cmd.magnitude_digits
    } else if cmd.target > 0.0 || !cmd.is_ramping() {
        DEFAULT_MAGNITUDE_DIGITS
    } else {
        0
    }
}
