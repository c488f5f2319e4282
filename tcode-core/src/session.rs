//! One T-code connection: input buffering, token parsing, staging and the
//! active command queue.
//!
//! Commands decoded from a line are staged until the line ends, then merged
//! into the active queue in one step. The scheduler only ever sees the active
//! queue, so a half-received line never moves an actuator.

use core::fmt::{self, Write};

use heapless::String;
use tcode_proto::{decode, decode_data, is_data_token, DecodeError};

use crate::input::ByteSource;
use crate::output::{CommandHandler, DataHandler};
use crate::queue::{CommandQueue, QueueFull, MAX_COMMANDS};
use crate::ring_buffer::{BufferOverflow, RingBuffer, TEXT_BUFFER_LEN};
use crate::scheduler::Scheduler;
use crate::tokenizer::{TokenTooLong, Tokenizer, MAX_TOKEN_LEN};

/// Longest data-query reply, excluding the trailing newline.
pub const MAX_RESPONSE_LEN: usize = 40;

/// Error type for session operations.
///
/// Every variant is recoverable: the offending input has already been
/// consumed, so the caller can keep polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// The input buffer filled up.
    Overflow,
    /// A token exceeded the token buffer and was dropped.
    TokenTooLong,
    /// A data-query reply did not fit or could not be written.
    ResponseTooLong,
    /// A token was malformed and dropped.
    Decode(DecodeError),
    /// No free command slot.
    QueueFull,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "input buffer overflow"),
            Self::TokenTooLong => write!(f, "token too long"),
            Self::ResponseTooLong => write!(f, "response too long"),
            Self::Decode(e) => write!(f, "decode error: {}", e),
            Self::QueueFull => write!(f, "command queue full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {}

impl From<BufferOverflow> for SessionError {
    fn from(_: BufferOverflow) -> Self {
        Self::Overflow
    }
}

impl From<TokenTooLong> for SessionError {
    fn from(_: TokenTooLong) -> Self {
        Self::TokenTooLong
    }
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<QueueFull> for SessionError {
    fn from(_: QueueFull) -> Self {
        Self::QueueFull
    }
}

/// What a successfully parsed token turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    /// Nothing between two delimiters.
    Empty,
    /// An actuator command, now staged.
    Command,
    /// A data query, already answered.
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedToken {
    pub kind: TokenKind,
    /// The token ended its line; staged commands are now active.
    pub end_of_line: bool,
}

/// Complete protocol state for one input stream.
///
/// - `N`: input ring buffer slots
/// - `M`: longest token in bytes
/// - `Q`: command slots in each of the staging and active queues
pub struct Session<
    const N: usize = TEXT_BUFFER_LEN,
    const M: usize = MAX_TOKEN_LEN,
    const Q: usize = MAX_COMMANDS,
> {
    input: RingBuffer<N>,
    tokenizer: Tokenizer<M>,
    pending: CommandQueue<Q>,
    active: CommandQueue<Q>,
    scheduler: Scheduler,
}

impl<const N: usize, const M: usize, const Q: usize> Session<N, M, Q> {
    pub const fn new() -> Self {
        Self {
            input: RingBuffer::new(),
            tokenizer: Tokenizer::new(),
            pending: CommandQueue::new(),
            active: CommandQueue::new(),
            scheduler: Scheduler::new(),
        }
    }

    /// Buffer every byte `source` has ready.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Overflow`] when the buffer fills first. Parse
    /// the buffered tokens and call again to pick up the rest.
    pub fn fill<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<usize, SessionError> {
        Ok(self.input.fill_from(source)?)
    }

    /// Parse the next complete token from the input buffer.
    ///
    /// Actuator commands are staged; data queries are answered through
    /// `responder`, with the reply and a trailing `\n` written to `response`.
    /// A token that ends its line flushes the staged commands into the active
    /// queue, whether or not the token itself was accepted.
    ///
    /// Returns `Ok(None)` when no complete token is buffered.
    ///
    /// # Errors
    ///
    /// Returns an error for a token that was rejected. The token has been
    /// consumed; call again to continue with the next one.
    pub fn parse_next<D, W>(
        &mut self,
        responder: &mut D,
        response: &mut W,
    ) -> Result<Option<ParsedToken>, SessionError>
    where
        D: DataHandler + ?Sized,
        W: Write + ?Sized,
    {
        let token = match self.tokenizer.next_token(&mut self.input)? {
            Some(token) => token,
            None => return Ok(None),
        };

        let handled = self.handle_token(token.as_bytes(), token.end_of_line, responder, response);
        let flushed = if token.end_of_line {
            self.flush()
        } else {
            Ok(())
        };

        let kind = handled?;
        flushed?;
        Ok(Some(ParsedToken {
            kind,
            end_of_line: token.end_of_line,
        }))
    }

    fn handle_token<D, W>(
        &mut self,
        bytes: &[u8],
        end_of_line: bool,
        responder: &mut D,
        response: &mut W,
    ) -> Result<TokenKind, SessionError>
    where
        D: DataHandler + ?Sized,
        W: Write + ?Sized,
    {
        if bytes.is_empty() {
            return Ok(TokenKind::Empty);
        }

        if is_data_token(bytes) {
            let query = decode_data(bytes)?;
            // One spare byte so the terminator goes out in the same write.
            let mut reply: String<{ MAX_RESPONSE_LEN + 1 }> = String::new();
            responder
                .respond(query, &mut reply)
                .map_err(|_| SessionError::ResponseTooLong)?;
            if reply.len() > MAX_RESPONSE_LEN || reply.push('\n').is_err() {
                return Err(SessionError::ResponseTooLong);
            }
            response
                .write_str(&reply)
                .map_err(|_| SessionError::ResponseTooLong)?;
            debug!("answered data query {:?}", query);
            return Ok(TokenKind::Data);
        }

        let mut cmd = decode(bytes)?;
        cmd.execute_immediate = end_of_line;
        self.pending.enqueue(cmd)?;
        trace!("staged {:?} target {}", cmd.key(), cmd.target);
        Ok(TokenKind::Command)
    }

    /// Merge staged commands into the active queue and clear the staging
    /// queue.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::QueueFull`] if the active queue cannot take
    /// every staged command. The active queue is left unchanged and the
    /// staged line is dropped.
    pub fn flush(&mut self) -> Result<(), SessionError> {
        let merged = self.pending.copy_all(&mut self.active);
        let staged = self.pending.len();
        self.pending.clear();
        match merged {
            Ok(()) => {
                debug!("line complete, {} staged, {} active", staged, self.active.len());
                Ok(())
            }
            Err(e) => {
                warn!("dropped line of {} commands: active queue full", staged);
                Err(e.into())
            }
        }
    }

    /// Drop buffered input up to the next delimiter.
    ///
    /// Used to recover when the input buffer filled up without a delimiter:
    /// the partial token is discarded, along with its remainder still in
    /// transit.
    pub fn discard_partial(&mut self) {
        self.input.clear();
        self.tokenizer.discard_until_delimiter();
    }

    /// Dispatch the active queue once. Returns the number of dispatches.
    pub fn tick<H: CommandHandler + ?Sized>(&mut self, handler: &mut H, now_ms: u64) -> usize {
        self.scheduler.tick(&mut self.active, handler, now_ms)
    }

    /// Commands the scheduler is currently driving.
    pub fn active(&self) -> &CommandQueue<Q> {
        &self.active
    }

    /// Commands staged for the current line.
    pub fn pending(&self) -> &CommandQueue<Q> {
        &self.pending
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Bytes buffered but not yet tokenized.
    pub fn buffered(&self) -> usize {
        self.input.len()
    }

    /// Whether the input buffer has no free slot left.
    pub fn is_input_full(&self) -> bool {
        self.input.is_full()
    }
}

impl<const N: usize, const M: usize, const Q: usize> Default for Session<N, M, Q> {
    fn default() -> Self {
        Self::new()
    }
}
