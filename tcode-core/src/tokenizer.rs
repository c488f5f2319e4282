//! Splits buffered input into space- or newline-delimited tokens.

use heapless::Vec;

use crate::ring_buffer::RingBuffer;

/// Default token buffer size in bytes.
pub const MAX_TOKEN_LEN: usize = 40;

/// A token did not fit in the token buffer and was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TokenTooLong;

impl core::fmt::Display for TokenTooLong {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "token too long")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TokenTooLong {}

/// One delimited unit of input, without its delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<const M: usize = MAX_TOKEN_LEN> {
    pub bytes: Vec<u8, M>,
    /// The token was terminated by `\n` rather than a space.
    pub end_of_line: bool,
}

impl<const M: usize> Token<M> {
    fn empty(end_of_line: bool) -> Self {
        Self {
            bytes: Vec::new(),
            end_of_line,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Extracts tokens from a [`RingBuffer`].
///
/// Stateless except after an oversized token: the rest of that token is
/// skipped up to the next delimiter, which is then reported as an empty token
/// so line boundaries are never lost.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer<const M: usize = MAX_TOKEN_LEN> {
    discarding: bool,
}

impl<const M: usize> Tokenizer<M> {
    pub const fn new() -> Self {
        Self { discarding: false }
    }

    /// Whether input is being skipped after an oversized token.
    #[inline]
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Skip input up to and including the next delimiter.
    pub fn discard_until_delimiter(&mut self) {
        self.discarding = true;
    }

    /// Take the next complete token out of `input`.
    ///
    /// Returns `Ok(None)` when no delimiter has arrived yet; `input` is left
    /// untouched in that case. A `\r` right before the delimiter is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`TokenTooLong`] when the token exceeds `M` bytes. The scanned
    /// bytes are consumed and the tokenizer skips ahead to the next delimiter.
    pub fn next_token<const N: usize>(
        &mut self,
        input: &mut RingBuffer<N>,
    ) -> Result<Option<Token<M>>, TokenTooLong> {
        let available = input.len();

        for scanned in 0..available {
            let Some(byte) = input.peek(scanned) else {
                break;
            };
            if byte != b' ' && byte != b'\n' {
                continue;
            }

            let end_of_line = byte == b'\n';
            if self.discarding {
                input.consume(scanned + 1);
                self.discarding = false;
                return Ok(Some(Token::empty(end_of_line)));
            }

            let mut end = scanned;
            if end > 0 && input.peek(end - 1) == Some(b'\r') {
                end -= 1;
            }
            if end > M {
                // Leave the delimiter for the next call.
                input.consume(scanned);
                self.discarding = true;
                return Err(TokenTooLong);
            }

            let mut token = Token::empty(end_of_line);
            for offset in 0..end {
                if let Some(b) = input.peek(offset) {
                    token.bytes.push(b).map_err(|_| TokenTooLong)?;
                }
            }
            input.consume(scanned + 1);
            return Ok(Some(token));
        }

        if self.discarding {
            input.consume(available);
        } else if available > M + 1 {
            input.consume(available);
            self.discarding = true;
            return Err(TokenTooLong);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(data: &[u8]) -> RingBuffer<64> {
        let mut rb = RingBuffer::new();
        for &b in data {
            rb.push(b).unwrap();
        }
        rb
    }

    #[test]
    fn test_splits_on_space_and_newline() {
        let mut rb = buffer(b"L090 V1S50\n");
        let mut tok: Tokenizer = Tokenizer::new();

        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"L090");
        assert!(!t.end_of_line);

        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"V1S50");
        assert!(t.end_of_line);

        assert_eq!(tok.next_token(&mut rb), Ok(None));
        assert!(rb.is_empty());
    }

    #[test]
    fn test_incomplete_token_is_left_in_place() {
        let mut rb = buffer(b"L09");
        let mut tok: Tokenizer = Tokenizer::new();
        assert_eq!(tok.next_token(&mut rb), Ok(None));
        assert_eq!(rb.len(), 3);

        rb.push(b'0').unwrap();
        rb.push(b'\n').unwrap();
        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"L090");
        assert!(t.end_of_line);
    }

    #[test]
    fn test_empty_tokens_are_reported() {
        let mut rb = buffer(b"  \n");
        let mut tok: Tokenizer = Tokenizer::new();
        for eol in [false, false, true] {
            let t = tok.next_token(&mut rb).unwrap().unwrap();
            assert!(t.is_empty());
            assert_eq!(t.end_of_line, eol);
        }
    }

    #[test]
    fn test_strips_carriage_return() {
        let mut rb = buffer(b"L090\r\n");
        let mut tok: Tokenizer = Tokenizer::new();
        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"L090");
        assert!(t.end_of_line);
    }

    #[test]
    fn test_oversized_token_with_delimiter() {
        let mut rb = buffer(b"L0123456 V1\n");
        let mut tok: Tokenizer<4> = Tokenizer::new();

        assert_eq!(tok.next_token(&mut rb), Err(TokenTooLong));
        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert!(t.is_empty());
        assert!(!t.end_of_line);

        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"V1");
        assert!(t.end_of_line);
    }

    #[test]
    fn test_oversized_token_without_delimiter() {
        let mut rb = buffer(b"L0123456");
        let mut tok: Tokenizer<4> = Tokenizer::new();

        assert_eq!(tok.next_token(&mut rb), Err(TokenTooLong));
        assert!(rb.is_empty());
        assert!(tok.is_discarding());

        // Tail of the oversized token is skipped, its newline still counts.
        for &b in b"789\nL1" {
            rb.push(b).unwrap();
        }
        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert!(t.is_empty());
        assert!(t.end_of_line);
        assert!(!tok.is_discarding());
        assert_eq!(tok.next_token(&mut rb), Ok(None));
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_token_of_exact_capacity() {
        let mut rb = buffer(b"L090\n");
        let mut tok: Tokenizer<4> = Tokenizer::new();
        let t = tok.next_token(&mut rb).unwrap().unwrap();
        assert_eq!(t.as_bytes(), b"L090");
    }
}
