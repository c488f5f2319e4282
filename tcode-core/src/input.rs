//! Byte source trait and adapters.
//!
//! The session pulls raw bytes through [`ByteSource`] until the source reports
//! that nothing more is available right now.

/// Non-blocking source of raw input bytes.
///
/// Implementations wrap whatever delivers bytes on the target: a UART FIFO,
/// a channel fed by an interrupt or task, or a test fixture.
pub trait ByteSource {
    /// Next available byte, or `None` when no data is pending.
    ///
    /// `None` is not end-of-stream: the source may produce more bytes later.
    fn next_byte(&mut self) -> Option<u8>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }
}

/// Byte source over an in-memory slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }
}

/// Byte source backed by a closure, e.g. a UART register read.
pub struct FnSource<F>(pub F);

impl<F: FnMut() -> Option<u8>> ByteSource for FnSource<F> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_drains_in_order() {
        let mut source = SliceSource::new(b"L0");
        assert_eq!(source.next_byte(), Some(b'L'));
        assert_eq!(source.remaining(), b"0");
        assert_eq!(source.next_byte(), Some(b'0'));
        assert_eq!(source.next_byte(), None);
        assert_eq!(source.next_byte(), None);
    }

    #[test]
    fn test_fn_source() {
        let mut count = 0u8;
        let mut source = FnSource(|| {
            count += 1;
            (count <= 2).then_some(b'0' + count)
        });
        assert_eq!(source.next_byte(), Some(b'1'));
        assert_eq!(source.next_byte(), Some(b'2'));
        assert_eq!(source.next_byte(), None);
    }
}
