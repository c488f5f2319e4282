//! No-std compatible number formatting utilities for token serialization.
//!
//! These functions write formatted numbers directly to byte buffers without
//! requiring heap allocation or the standard library.

/// Longest decimal rendering of a `u32` ("4294967295").
pub const MAX_U32_DIGITS: usize = 10;

/// Most fraction digits [`write_fraction`] will emit.
pub const MAX_FRACTION_DIGITS: u8 = 9;

/// Write a u32 as an unsigned decimal string.
///
/// Returns the number of bytes written (1-10 bytes).
///
/// # Panics
///
/// Panics if the buffer is shorter than the rendered number.
#[inline]
pub fn write_u32(buf: &mut [u8], value: u32) -> usize {
    if value == 0 {
        buf[0] = b'0';
        return 1;
    }

    // Write digits in reverse order to temporary buffer
    let mut temp = [0u8; MAX_U32_DIGITS];
    let mut n = value;
    let mut len = 0;
    while n > 0 {
        temp[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
    }

    for i in 0..len {
        buf[i] = temp[len - 1 - i];
    }

    len
}

/// Write `value` in `[0, 1]` as exactly `digits` zero-padded fraction digits.
///
/// `0.9` with 2 digits becomes `90`, `0.05` with 3 digits becomes `050`.
/// Full scale saturates at all nines since the wire format has no integer
/// part. Returns the number of bytes written (`digits`, capped at
/// [`MAX_FRACTION_DIGITS`]).
///
/// # Panics
///
/// Panics if `buf.len() < digits`.
#[inline]
pub fn write_fraction(buf: &mut [u8], value: f32, digits: u8) -> usize {
    let digits = digits.min(MAX_FRACTION_DIGITS) as usize;
    if digits == 0 {
        return 0;
    }

    let scale = 10u32.pow(digits as u32);
    let scaled = value.clamp(0.0, 1.0) * scale as f32 + 0.5;
    let mut n = (scaled as u32).min(scale - 1);

    for i in (0..digits).rev() {
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_u32() {
        let mut buf = [0u8; MAX_U32_DIGITS];

        let len = write_u32(&mut buf, 0);
        assert_eq!(&buf[..len], b"0");

        let len = write_u32(&mut buf, 7);
        assert_eq!(&buf[..len], b"7");

        let len = write_u32(&mut buf, 50);
        assert_eq!(&buf[..len], b"50");

        let len = write_u32(&mut buf, 3000);
        assert_eq!(&buf[..len], b"3000");

        let len = write_u32(&mut buf, u32::MAX);
        assert_eq!(&buf[..len], b"4294967295");
    }

    #[test]
    fn test_write_fraction() {
        let mut buf = [0u8; 9];

        let len = write_fraction(&mut buf, 0.9, 2);
        assert_eq!(&buf[..len], b"90");

        let len = write_fraction(&mut buf, 0.05, 3);
        assert_eq!(&buf[..len], b"050");

        let len = write_fraction(&mut buf, 0.0, 4);
        assert_eq!(&buf[..len], b"0000");

        let len = write_fraction(&mut buf, 0.299, 3);
        assert_eq!(&buf[..len], b"299");
    }

    #[test]
    fn test_write_fraction_saturates_full_scale() {
        let mut buf = [0u8; 9];

        let len = write_fraction(&mut buf, 1.0, 2);
        assert_eq!(&buf[..len], b"99");

        let len = write_fraction(&mut buf, 0.9999, 2);
        assert_eq!(&buf[..len], b"99");

        let len = write_fraction(&mut buf, 2.0, 1);
        assert_eq!(&buf[..len], b"9");
    }

    #[test]
    fn test_write_fraction_zero_digits() {
        let mut buf = [0u8; 1];
        assert_eq!(write_fraction(&mut buf, 0.5, 0), 0);
    }
}
