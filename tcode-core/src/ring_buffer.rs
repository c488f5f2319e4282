//! Fixed-capacity byte ring buffer for raw input.

use crate::input::ByteSource;

/// Default ring buffer size in bytes.
pub const TEXT_BUFFER_LEN: usize = 128;

/// The ring buffer is full; the byte was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferOverflow;

impl core::fmt::Display for BufferOverflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "input buffer overflow")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferOverflow {}

/// Circular byte buffer with `N` slots, one of which is always kept free to
/// tell "full" from "empty". Holds at most `N - 1` bytes.
///
/// `N` must be at least 2; smaller sizes fail to compile.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize = TEXT_BUFFER_LEN> {
    buf: [u8; N],
    head: usize,
    tail: usize,
    /// Byte pulled from a source while full, stored as soon as space frees up.
    held: Option<u8>,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        const { assert!(N >= 2, "RingBuffer needs at least two slots") };
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            held: None,
        }
    }

    /// Append one byte.
    ///
    /// # Errors
    ///
    /// Returns [`BufferOverflow`] if the buffer already holds `N - 1` bytes.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferOverflow> {
        let next = (self.head + 1) % N;
        if next == self.tail {
            return Err(BufferOverflow);
        }
        self.buf[self.head] = byte;
        self.head = next;
        Ok(())
    }

    /// Pull bytes from `source` until it runs dry.
    ///
    /// Returns the number of bytes stored. A source that runs dry exactly as
    /// the buffer fills is not an overflow. When one more byte arrives while
    /// full, it is held back and stored by the next [`consume`](Self::consume)
    /// or [`clear`](Self::clear); everything after it stays in the source.
    ///
    /// # Errors
    ///
    /// Returns [`BufferOverflow`] if the source still had data once the
    /// buffer was full, or if a held byte is still waiting for space.
    pub fn fill_from<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<usize, BufferOverflow> {
        self.restore_held();
        if self.held.is_some() {
            return Err(BufferOverflow);
        }

        let mut stored = 0;
        loop {
            let Some(byte) = source.next_byte() else {
                return Ok(stored);
            };
            if self.push(byte).is_err() {
                self.held = Some(byte);
                return Err(BufferOverflow);
            }
            stored += 1;
        }
    }

    /// Number of buffered bytes.
    #[inline]
    pub fn len(&self) -> usize {
        (self.head + N - self.tail) % N
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Maximum number of bytes the buffer can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Byte at `offset` from the oldest buffered byte.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<u8> {
        if offset >= self.len() {
            return None;
        }
        Some(self.buf[(self.tail + offset) % N])
    }

    /// Drop up to `count` of the oldest bytes.
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.len());
        self.tail = (self.tail + count) % N;
        self.restore_held();
    }

    /// Drop everything buffered. A held byte was never buffered and survives.
    pub fn clear(&mut self) {
        self.tail = self.head;
        self.restore_held();
    }

    fn restore_held(&mut self) {
        if let Some(byte) = self.held {
            if self.push(byte).is_ok() {
                self.held = None;
            }
        }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
