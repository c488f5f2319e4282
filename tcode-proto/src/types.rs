//! Core T-code types: CommandType, CommandKey, Command, DataCommandType.

/// Length of the ramp rate quantum: `S50` means 50% of full travel per quantum.
pub const SPEED_QUANTUM_MS: u32 = 100;

/// Tick period assumed before the scheduler has observed a real one.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 10;

/// Highest channel number the grammar can express (single decimal digit).
pub const MAX_CHANNEL: u8 = 9;

/// Number of distinct (type, channel) pairs.
pub const KEY_COUNT: usize = CommandType::ALL.len() * (MAX_CHANNEL as usize + 1);

/// Actuator class selected by the first letter of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandType {
    /// `L`: linear axis.
    Linear,
    /// `R`: rotary axis.
    Rotate,
    /// `V`: vibration motor.
    Vibrate,
    /// `A`: auxiliary output.
    Auxiliary,
}

impl CommandType {
    /// Every command type, in key-index order.
    pub const ALL: [Self; 4] = [Self::Linear, Self::Rotate, Self::Vibrate, Self::Auxiliary];

    /// Map a class letter (either case) to its command type.
    #[inline]
    #[must_use]
    pub const fn from_letter(byte: u8) -> Option<Self> {
        match byte.to_ascii_uppercase() {
            b'L' => Some(Self::Linear),
            b'R' => Some(Self::Rotate),
            b'V' => Some(Self::Vibrate),
            b'A' => Some(Self::Auxiliary),
            _ => None,
        }
    }

    /// Upper-case class letter used on the wire.
    #[inline]
    #[must_use]
    pub const fn letter(self) -> u8 {
        match self {
            Self::Linear => b'L',
            Self::Rotate => b'R',
            Self::Vibrate => b'V',
            Self::Auxiliary => b'A',
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Rotate => "rotate",
            Self::Vibrate => "vibrate",
            Self::Auxiliary => "auxiliary",
        }
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Linear => 0,
            Self::Rotate => 1,
            Self::Vibrate => 2,
            Self::Auxiliary => 3,
        }
    }
}

impl core::fmt::Display for CommandType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an actuator: at most one live command exists per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandKey {
    pub kind: CommandType,
    pub channel: u8,
}

impl CommandKey {
    #[must_use]
    pub const fn new(kind: CommandType, channel: u8) -> Self {
        Self { kind, channel }
    }

    /// Whether the channel fits the single-digit wire format.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.channel <= MAX_CHANNEL
    }

    /// Dense index in `0..KEY_COUNT`, usable for per-actuator tables.
    ///
    /// `None` for channels above [`MAX_CHANNEL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        Some(self.kind.index() * (MAX_CHANNEL as usize + 1) + self.channel as usize)
    }
}

/// One decoded actuator instruction plus its ramp state.
///
/// `magnitude` is the value handed to the dispatch handler on the next tick;
/// `target` is the value decoded from the wire. They only differ while a
/// ramp is in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub kind: CommandType,
    pub channel: u8,
    pub magnitude: f32,
    pub target: f32,
    /// Magnitude digits present on the wire; drives re-encoding precision.
    pub magnitude_digits: u8,
    /// Percent of full travel per [`SPEED_QUANTUM_MS`]; zero when absent.
    pub speed: u32,
    /// Milliseconds to reach `target`; zero when absent.
    pub interval: u32,
    pub transition_magnitude: f32,
    pub last_transition_ms: Option<u64>,
    /// Fixed at first dispatch of an interval ramp.
    pub deadline_ms: Option<u64>,
    /// Set when the token that produced this command ended its line.
    pub execute_immediate: bool,
}

impl Command {
    /// Create a one-shot command that sets `magnitude` (clamped to `[0, 1]`).
    #[must_use]
    pub fn new(kind: CommandType, channel: u8, magnitude: f32) -> Self {
        let magnitude = magnitude.clamp(0.0, 1.0);
        Self {
            kind,
            channel,
            magnitude,
            target: magnitude,
            magnitude_digits: 0,
            speed: 0,
            interval: 0,
            transition_magnitude: 0.0,
            last_transition_ms: None,
            deadline_ms: None,
            execute_immediate: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn key(&self) -> CommandKey {
        CommandKey::new(self.kind, self.channel)
    }

    /// Whether the command still has ramp work left (speed or interval set).
    #[inline]
    #[must_use]
    pub const fn is_ramping(&self) -> bool {
        self.speed > 0 || self.interval > 0
    }

    /// Drop all ramp state so the command retires after its next dispatch.
    pub fn clear_ramp(&mut self) {
        self.speed = 0;
        self.interval = 0;
        self.transition_magnitude = 0.0;
        self.deadline_ms = None;
    }

    /// Recompute `transition_magnitude` for a tick of `period_ms`.
    ///
    /// Interval ramps without a deadline yet assume the full interval remains.
    pub fn derive_transition(&mut self, now_ms: u64, period_ms: u32) {
        self.transition_magnitude = if self.interval > 0 {
            let remaining_ms = match self.deadline_ms {
                Some(deadline) => deadline.saturating_sub(now_ms),
                None => u64::from(self.interval),
            };
            interval_step(self.magnitude, self.target, remaining_ms, period_ms)
        } else if self.speed > 0 {
            speed_step(self.speed, period_ms)
        } else {
            0.0
        };
    }
}

/// Magnitude change over `period_ms` for a ramp of `speed` percent per quantum.
#[inline]
#[must_use]
pub fn speed_step(speed: u32, period_ms: u32) -> f32 {
    (speed as f32 / 100.0) * (period_ms as f32 / SPEED_QUANTUM_MS as f32)
}

/// Magnitude change over `period_ms` that lands on `to` after `remaining_ms`.
///
/// When the remaining time fits in one period the whole distance is covered.
#[inline]
#[must_use]
pub fn interval_step(from: f32, to: f32, remaining_ms: u64, period_ms: u32) -> f32 {
    if remaining_ms <= u64::from(period_ms) {
        return to - from;
    }
    (to - from) / (remaining_ms as f32 / period_ms as f32)
}

/// Data-query commands (`D` prefix), answered immediately and never queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataCommandType {
    /// `D0`: report device capabilities.
    GetCapabilities,
}

impl DataCommandType {
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::GetCapabilities),
            _ => None,
        }
    }

    /// Numeric code following the `D` on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::GetCapabilities => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        let d = a - b;
        d < 1e-5 && d > -1e-5
    }

    #[test]
    fn test_command_type_letters() {
        for kind in CommandType::ALL {
            assert_eq!(CommandType::from_letter(kind.letter()), Some(kind));
            assert_eq!(
                CommandType::from_letter(kind.letter().to_ascii_lowercase()),
                Some(kind)
            );
        }
        assert_eq!(CommandType::from_letter(b'Q'), None);
        assert_eq!(CommandType::from_letter(b'D'), None);
    }

    #[test]
    fn test_key_index_is_dense() {
        let mut seen = [false; KEY_COUNT];
        for kind in CommandType::ALL {
            for channel in 0..=MAX_CHANNEL {
                let index = CommandKey::new(kind, channel).index().unwrap();
                assert!(!seen[index]);
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_key_index_rejects_wide_channels() {
        let key = CommandKey::new(CommandType::Linear, 10);
        assert!(!key.is_valid());
        assert_eq!(key.index(), None);
        assert_eq!(CommandKey::new(CommandType::Auxiliary, 12).index(), None);
        assert_eq!(
            CommandKey::new(CommandType::Auxiliary, MAX_CHANNEL).index(),
            Some(KEY_COUNT - 1)
        );
    }

    #[test]
    fn test_new_clamps_magnitude() {
        let cmd = Command::new(CommandType::Vibrate, 1, 1.5);
        assert_eq!(cmd.magnitude, 1.0);
        assert_eq!(cmd.target, 1.0);
        assert!(!cmd.is_ramping());
    }

    #[test]
    fn test_speed_step() {
        // 50% per 100 ms over a 10 ms tick
        assert!(approx(speed_step(50, 10), 0.05));
        assert!(approx(speed_step(100, 100), 1.0));
        assert_eq!(speed_step(0, 10), 0.0);
    }

    #[test]
    fn test_interval_step_lands_on_target() {
        assert!(approx(interval_step(0.0, 1.0, 1000, 10), 0.01));
        assert!(approx(interval_step(0.2, 0.8, 5, 10), 0.6));
        assert!(approx(interval_step(0.8, 0.2, 100, 50), -0.3));
    }

    #[test]
    fn test_clear_ramp() {
        let mut cmd = Command::new(CommandType::Rotate, 2, 0.5);
        cmd.interval = 3000;
        cmd.deadline_ms = Some(3000);
        cmd.transition_magnitude = 0.1;
        assert!(cmd.is_ramping());
        cmd.clear_ramp();
        assert!(!cmd.is_ramping());
        assert_eq!(cmd.transition_magnitude, 0.0);
        assert_eq!(cmd.deadline_ms, None);
    }

    #[test]
    fn test_data_command_codes() {
        assert_eq!(
            DataCommandType::from_code(0),
            Some(DataCommandType::GetCapabilities)
        );
        assert_eq!(DataCommandType::GetCapabilities.code(), 0);
        assert_eq!(DataCommandType::from_code(7), None);
    }
}
