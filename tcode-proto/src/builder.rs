//! Builder pattern API for constructing T-code commands.
//!
//! # Example
//!
//! ```
//! use tcode_proto::{serialize_line, CommandBuilder};
//!
//! let stroke = CommandBuilder::linear(0).magnitude(0.9).digits(2).build();
//! let buzz = CommandBuilder::vibrate(1).speed(50).build();
//!
//! let mut buf = [0u8; 64];
//! let len = serialize_line(&[stroke, buzz], &mut buf).unwrap();
//! assert_eq!(&buf[..len], b"L090 V1S50\n");
//! ```

use crate::serialize::{Serialize, SerializeError, DEFAULT_MAGNITUDE_DIGITS, MAX_COMMAND_SIZE};
use crate::types::{Command, CommandType, DEFAULT_TICK_PERIOD_MS};

/// Builder for a single actuator command.
///
/// Starts as a one-shot command at magnitude 0 on the given channel.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    cmd: Command,
}

impl CommandBuilder {
    /// Start building a command of the given type.
    ///
    /// Channels above [`MAX_CHANNEL`](crate::MAX_CHANNEL) build, but fail to
    /// serialize with [`SerializeError::InvalidChannel`].
    #[must_use]
    pub fn new(kind: CommandType, channel: u8) -> Self {
        Self {
            cmd: Command::new(kind, channel, 0.0),
        }
    }

    /// Start building a linear (`L`) command.
    #[must_use]
    pub fn linear(channel: u8) -> Self {
        Self::new(CommandType::Linear, channel)
    }

    /// Start building a rotate (`R`) command.
    #[must_use]
    pub fn rotate(channel: u8) -> Self {
        Self::new(CommandType::Rotate, channel)
    }

    /// Start building a vibrate (`V`) command.
    #[must_use]
    pub fn vibrate(channel: u8) -> Self {
        Self::new(CommandType::Vibrate, channel)
    }

    /// Start building an auxiliary (`A`) command.
    #[must_use]
    pub fn auxiliary(channel: u8) -> Self {
        Self::new(CommandType::Auxiliary, channel)
    }

    /// Set the target magnitude (clamped to `[0, 1]`).
    ///
    /// Uses [`DEFAULT_MAGNITUDE_DIGITS`] on the wire unless [`digits`](Self::digits)
    /// is called.
    #[must_use]
    pub fn magnitude(mut self, magnitude: f32) -> Self {
        let magnitude = magnitude.clamp(0.0, 1.0);
        self.cmd.magnitude = magnitude;
        self.cmd.target = magnitude;
        if self.cmd.magnitude_digits == 0 {
            self.cmd.magnitude_digits = DEFAULT_MAGNITUDE_DIGITS;
        }
        self
    }

    /// Set the number of magnitude digits written on the wire.
    #[must_use]
    pub fn digits(mut self, digits: u8) -> Self {
        self.cmd.magnitude_digits = digits;
        self
    }

    /// Ramp at `speed` percent of full travel per 100 ms.
    #[must_use]
    pub fn speed(mut self, speed: u32) -> Self {
        self.cmd.speed = speed;
        self
    }

    /// Ramp to the target over `interval_ms`.
    #[must_use]
    pub fn interval(mut self, interval_ms: u32) -> Self {
        self.cmd.interval = interval_ms;
        self
    }

    /// Get the built command without serializing.
    ///
    /// The provisional transition matches what [`decode`](crate::decode)
    /// would produce for the serialized token.
    #[must_use]
    pub fn build(self) -> Command {
        let mut cmd = self.cmd;
        let magnitude = cmd.magnitude;
        if cmd.interval > 0 {
            cmd.magnitude = 0.0;
        }
        cmd.derive_transition(0, DEFAULT_TICK_PERIOD_MS);
        cmd.magnitude = magnitude;
        cmd
    }

    /// Serialize the command token to the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is too small,
    /// or [`SerializeError::InvalidChannel`] for a channel above 9.
    pub fn serialize(self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        self.build().serialize(buf)
    }

    /// Serialize to a `heapless::Vec`.
    #[cfg(feature = "heapless")]
    pub fn serialize_to_vec<const N: usize>(self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        self.build().serialize_to_vec()
    }

    /// Serialize to a `core::fmt::Write` implementation.
    pub fn serialize_fmt<W: core::fmt::Write>(self, writer: &mut W) -> Result<(), SerializeError> {
        self.build().serialize_fmt(writer)
    }

    /// Serialize to an `embedded_io::Write` implementation.
    #[cfg(feature = "embedded-io")]
    pub fn serialize_io<W: embedded_io::Write>(self, writer: &mut W) -> Result<(), SerializeError> {
        self.build().serialize_io(writer)
    }
}

/// Serialize several commands as one line: space-separated, newline-terminated.
///
/// The receiving device applies every command on the line at once.
///
/// # Errors
///
/// Returns [`SerializeError::BufferTooSmall`] if the line does not fit.
pub fn serialize_line(commands: &[Command], buf: &mut [u8]) -> Result<usize, SerializeError> {
    let mut pos = 0;

    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            *buf.get_mut(pos).ok_or(SerializeError::BufferTooSmall)? = b' ';
            pos += 1;
        }

        let mut tmp = [0u8; MAX_COMMAND_SIZE];
        let len = cmd.serialize(&mut tmp)?;
        buf.get_mut(pos..pos + len)
            .ok_or(SerializeError::BufferTooSmall)?
            .copy_from_slice(&tmp[..len]);
        pos += len;
    }

    *buf.get_mut(pos).ok_or(SerializeError::BufferTooSmall)? = b'\n';
    Ok(pos + 1)
}
