//! Handler traits for decoded commands and data queries.

use core::fmt;
use tcode_proto::{CommandKey, DataCommandType};

/// Receives actuator updates from the scheduler.
///
/// Called once per live command per tick with the value the actuator should
/// take now. Implemented for every `FnMut(CommandKey, f32)`.
pub trait CommandHandler {
    fn dispatch(&mut self, key: CommandKey, magnitude: f32);
}

impl<F: FnMut(CommandKey, f32)> CommandHandler for F {
    #[inline]
    fn dispatch(&mut self, key: CommandKey, magnitude: f32) {
        self(key, magnitude)
    }
}

/// Answers data queries (`D<code>`) as soon as they are decoded.
///
/// The reply is written without a line terminator; the session appends one.
pub trait DataHandler {
    fn respond<W: fmt::Write>(&mut self, command: DataCommandType, out: &mut W) -> fmt::Result;
}

/// Minimal data handler that acknowledges every query with `?<code>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEcho;

impl DataHandler for QueryEcho {
    fn respond<W: fmt::Write>(&mut self, command: DataCommandType, out: &mut W) -> fmt::Result {
        write!(out, "?{}", command.code())
    }
}
