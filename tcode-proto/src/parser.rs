//! T-code token decoder.
//!
//! A token is one space- or newline-delimited unit of input (without the
//! delimiter):
//!
//! ```text
//! <Class><Channel>[<MagnitudeDigits>][S<SpeedDigits>][I<IntervalDigits>]
//! D<Code>
//! ```

use crate::types::{Command, CommandType, DataCommandType, DEFAULT_TICK_PERIOD_MS};

/// Shortest token that can carry an actuator command (`L0` plus one field byte).
const MIN_COMMAND_LEN: usize = 3;

/// Magnitude digits beyond this add no precision to an `f32`.
const MAX_MAGNITUDE_DIGITS: u8 = 9;

/// Decode failure. The offending token is dropped; parsing resumes with the
/// next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Token shorter than three bytes.
    TooShort,
    /// First byte is not one of `L`, `R`, `V`, `A`.
    UnknownClass(u8),
    /// Second byte is not a decimal digit.
    InvalidChannel(u8),
    /// A field byte that is neither a digit nor `S`/`I`.
    UnexpectedByte(u8),
    /// Speed or interval does not fit in a `u32`.
    ValueOverflow,
    /// `D` query with an unsupported code.
    UnknownDataCommand(u8),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort => write!(f, "token too short"),
            Self::UnknownClass(b) => write!(f, "unknown command class {:#04x}", b),
            Self::InvalidChannel(b) => write!(f, "invalid channel {:#04x}", b),
            Self::UnexpectedByte(b) => write!(f, "unexpected byte {:#04x}", b),
            Self::ValueOverflow => write!(f, "value out of range"),
            Self::UnknownDataCommand(code) => write!(f, "unknown data command D{}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Field currently receiving digits.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Magnitude,
    Speed,
    Interval,
}

/// Decode one actuator token into a [`Command`].
///
/// Magnitude digits form a left-aligned decimal fraction (`L090` is 0.90);
/// speed and interval digits are plain integers. The returned command carries
/// a provisional `transition_magnitude` computed for
/// [`DEFAULT_TICK_PERIOD_MS`]; the scheduler re-derives it once the real tick
/// period is known.
///
/// # Example
///
/// ```text
/// L090     -> linear 0, magnitude 0.90, one-shot
/// V1S50    -> vibrate 1, ramp at 50% per 100 ms
/// R2I3000  -> rotate 2, ramp to 0.0 over 3 s
/// ```
pub fn decode(token: &[u8]) -> Result<Command, DecodeError> {
    if token.len() < MIN_COMMAND_LEN {
        return Err(DecodeError::TooShort);
    }

    let kind = CommandType::from_letter(token[0]).ok_or(DecodeError::UnknownClass(token[0]))?;

    if !token[1].is_ascii_digit() {
        return Err(DecodeError::InvalidChannel(token[1]));
    }
    let channel = token[1] - b'0';

    let mut field = Field::Magnitude;
    let mut numerator: u32 = 0;
    let mut digits: u8 = 0;
    let mut speed: u32 = 0;
    let mut interval: u32 = 0;

    for &b in &token[2..] {
        if b.is_ascii_digit() {
            let digit = u32::from(b - b'0');
            match field {
                Field::Magnitude => {
                    if digits < MAX_MAGNITUDE_DIGITS {
                        numerator = numerator * 10 + digit;
                        digits += 1;
                    }
                }
                Field::Speed => speed = accumulate(speed, digit)?,
                Field::Interval => interval = accumulate(interval, digit)?,
            }
            continue;
        }

        field = match b.to_ascii_uppercase() {
            b'S' => Field::Speed,
            b'I' => Field::Interval,
            _ => return Err(DecodeError::UnexpectedByte(b)),
        };
    }

    let magnitude = if digits == 0 {
        0.0
    } else {
        numerator as f32 / 10u32.pow(u32::from(digits)) as f32
    };

    let mut cmd = Command::new(kind, channel, magnitude);
    cmd.magnitude_digits = digits;
    cmd.speed = speed;
    cmd.interval = interval;
    // Interval wins when both are present, matching the scheduler.
    if interval > 0 {
        cmd.magnitude = 0.0;
    }
    cmd.derive_transition(0, DEFAULT_TICK_PERIOD_MS);
    cmd.magnitude = magnitude;

    Ok(cmd)
}

/// Decode a data-query token (`D0`).
pub fn decode_data(token: &[u8]) -> Result<DataCommandType, DecodeError> {
    match token {
        [d, code] if d.eq_ignore_ascii_case(&b'D') => {
            if !code.is_ascii_digit() {
                return Err(DecodeError::UnexpectedByte(*code));
            }
            let code = code - b'0';
            DataCommandType::from_code(code).ok_or(DecodeError::UnknownDataCommand(code))
        }
        [d, code, extra, ..] if d.eq_ignore_ascii_case(&b'D') => {
            let offending = if code.is_ascii_digit() { extra } else { code };
            Err(DecodeError::UnexpectedByte(*offending))
        }
        [d] if d.eq_ignore_ascii_case(&b'D') => Err(DecodeError::TooShort),
        [] => Err(DecodeError::TooShort),
        [b, ..] => Err(DecodeError::UnknownClass(*b)),
    }
}

/// Whether a token belongs to the data-query family.
#[inline]
#[must_use]
pub fn is_data_token(token: &[u8]) -> bool {
    token.first().is_some_and(|b| b.eq_ignore_ascii_case(&b'D'))
}

#[inline]
fn accumulate(value: u32, digit: u32) -> Result<u32, DecodeError> {
    value
        .checked_mul(10)
        .and_then(|v| v.checked_add(digit))
        .ok_or(DecodeError::ValueOverflow)
}
