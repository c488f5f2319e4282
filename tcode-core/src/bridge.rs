//! TcodeBridge: connects a byte source to actuator and data-query handlers.

use core::fmt::Write;

use crate::input::ByteSource;
use crate::output::{CommandHandler, DataHandler};
use crate::queue::MAX_COMMANDS;
use crate::ring_buffer::TEXT_BUFFER_LEN;
use crate::session::{Session, TokenKind};
use crate::tokenizer::MAX_TOKEN_LEN;

/// Upper bound on fill/parse rounds per poll, so a source that never runs
/// dry cannot starve the scheduler.
const MAX_FILL_ROUNDS: usize = 8;

/// Counters for one [`TcodeBridge::poll`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Actuator commands staged.
    pub commands: usize,
    /// Data queries answered.
    pub queries: usize,
    /// Lines completed.
    pub lines: usize,
    /// Tokens dropped as malformed or oversized.
    pub rejected: usize,
    /// Times the input buffer filled up.
    pub overflows: usize,
    /// Actuator updates dispatched by the tick.
    pub dispatched: usize,
}

/// Runs a [`Session`] against its collaborators.
///
/// # Error Handling
///
/// Rejected tokens are logged and counted, never fatal. When the input buffer
/// fills without a delimiter, the partial token is discarded so the stream
/// resynchronizes at the next delimiter.
pub struct TcodeBridge<
    S,
    H,
    R,
    const N: usize = TEXT_BUFFER_LEN,
    const M: usize = MAX_TOKEN_LEN,
    const Q: usize = MAX_COMMANDS,
> {
    source: S,
    handler: H,
    responder: R,
    session: Session<N, M, Q>,
}

impl<S, H, R, const N: usize, const M: usize, const Q: usize> TcodeBridge<S, H, R, N, M, Q>
where
    S: ByteSource,
    H: CommandHandler,
    R: DataHandler,
{
    /// Create a new bridge with an empty session.
    pub fn new(source: S, handler: H, responder: R) -> Self {
        Self {
            source,
            handler,
            responder,
            session: Session::new(),
        }
    }

    /// Read all pending input, parse every complete token, then tick.
    ///
    /// Data-query replies are written to `response`.
    pub fn poll<W: Write + ?Sized>(&mut self, now_ms: u64, response: &mut W) -> PollReport {
        let mut report = PollReport::default();

        for _ in 0..MAX_FILL_ROUNDS {
            let filled = self.session.fill(&mut self.source);
            self.parse_all(response, &mut report);

            match filled {
                Ok(_) => break,
                Err(_) => {
                    report.overflows += 1;
                    if self.session.is_input_full() {
                        warn!("input buffer full without delimiter, discarding partial token");
                        self.session.discard_partial();
                    }
                }
            }
        }

        report.dispatched = self.session.tick(&mut self.handler, now_ms);
        report
    }

    fn parse_all<W: Write + ?Sized>(&mut self, response: &mut W, report: &mut PollReport) {
        loop {
            match self.session.parse_next(&mut self.responder, response) {
                Ok(None) => break,
                Ok(Some(parsed)) => {
                    match parsed.kind {
                        TokenKind::Command => report.commands += 1,
                        TokenKind::Data => report.queries += 1,
                        TokenKind::Empty => {}
                    }
                    if parsed.end_of_line {
                        report.lines += 1;
                    }
                }
                Err(e) => {
                    warn!("rejected token: {}", e);
                    report.rejected += 1;
                }
            }
        }
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &Session<N, M, Q> {
        &self.session
    }

    /// Get a reference to the byte source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the byte source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the command handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get a mutable reference to the command handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Get a mutable reference to the data handler.
    pub fn responder_mut(&mut self) -> &mut R {
        &mut self.responder
    }

    /// Decompose the bridge into its source and handlers.
    pub fn into_parts(self) -> (S, H, R) {
        (self.source, self.handler, self.responder)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::input::SliceSource;
    use crate::output::QueryEcho;
    use std::string::String;
    use std::vec::Vec;
    use tcode_proto::{CommandKey, CommandType};

    // Records every dispatch
    #[derive(Default)]
    struct MockHandler {
        dispatched: Vec<(CommandKey, f32)>,
    }

    impl CommandHandler for MockHandler {
        fn dispatch(&mut self, key: CommandKey, magnitude: f32) {
            self.dispatched.push((key, magnitude));
        }
    }

    // Hands out a fixed script, one chunk per refill
    struct ChunkedSource {
        chunks: Vec<&'static [u8]>,
        pos: usize,
    }

    impl ByteSource for ChunkedSource {
        fn next_byte(&mut self) -> Option<u8> {
            let chunk: &'static [u8] = self.chunks.first().copied()?;
            match chunk.get(self.pos) {
                Some(&b) => {
                    self.pos += 1;
                    Some(b)
                }
                None => {
                    self.chunks.remove(0);
                    self.pos = 0;
                    None
                }
            }
        }
    }

    #[test]
    fn test_poll_parses_and_ticks() {
        let source = SliceSource::new(b"L090 V1S50\n");
        let mut bridge: TcodeBridge<_, _, _> =
            TcodeBridge::new(source, MockHandler::default(), QueryEcho);

        let mut response = String::new();
        let report = bridge.poll(0, &mut response);
        assert_eq!(
            report,
            PollReport {
                commands: 2,
                lines: 1,
                dispatched: 2,
                ..PollReport::default()
            }
        );

        let handler = bridge.handler();
        assert_eq!(handler.dispatched.len(), 2);
        assert_eq!(handler.dispatched[0].0, CommandKey::new(CommandType::Linear, 0));

        let report = bridge.poll(10, &mut response);
        assert_eq!(report.dispatched, 1);
        assert!(response.is_empty());
    }

    #[test]
    fn test_poll_answers_queries_and_counts_rejections() {
        let source = SliceSource::new(b"X12 L0Z D0\n");
        let mut bridge: TcodeBridge<_, _, _> =
            TcodeBridge::new(source, MockHandler::default(), QueryEcho);

        let mut response = String::new();
        let report = bridge.poll(0, &mut response);
        assert_eq!(report.queries, 1);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.lines, 1);
        assert_eq!(response, "?0\n");
        assert!(bridge.session().active().is_empty());
    }

    #[test]
    fn test_poll_handles_input_larger_than_buffer() {
        let line = b"L010 L110 L210 L310 L410 L510 L610 L710 L810 L910\n";
        let source = SliceSource::new(line);
        let mut bridge: TcodeBridge<_, _, _, 16, 8, 40> =
            TcodeBridge::new(source, MockHandler::default(), QueryEcho);

        let mut response = String::new();
        let report = bridge.poll(0, &mut response);
        assert!(report.overflows > 0);
        assert_eq!(report.commands, 10);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.dispatched, 10);
    }

    #[test]
    fn test_poll_resyncs_after_runaway_token() {
        let source = ChunkedSource {
            chunks: std::vec![&b"L0999999999999"[..], &b"99999 V150\n"[..]],
            pos: 0,
        };
        let mut bridge: TcodeBridge<_, _, _, 8, 16, 40> =
            TcodeBridge::new(source, MockHandler::default(), QueryEcho);

        let mut response = String::new();
        let report = bridge.poll(0, &mut response);
        assert!(report.overflows > 0);
        assert_eq!(report.dispatched, 0);

        let report = bridge.poll(10, &mut response);
        assert_eq!(report.commands, 1);
        assert_eq!(report.dispatched, 1);

        let (_, handler, _) = bridge.into_parts();
        assert_eq!(
            handler.dispatched[0].0,
            CommandKey::new(CommandType::Vibrate, 1)
        );
    }

    #[test]
    fn test_closure_handler() {
        let mut count = 0;
        {
            let source = SliceSource::new(b"A050 A150\n");
            let handler = |_: CommandKey, _: f32| count += 1;
            let mut bridge: TcodeBridge<_, _, _> = TcodeBridge::new(source, handler, QueryEcho);
            let mut response = String::new();
            bridge.poll(0, &mut response);
        }
        assert_eq!(count, 2);
    }
}
