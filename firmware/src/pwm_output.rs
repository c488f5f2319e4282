//! PWM actuator outputs and the device capability report.

use core::fmt;

use defmt::{trace, warn};
use embassy_rp::pwm::{Pwm, PwmOutput};
use embedded_hal::pwm::SetDutyCycle;
use tcode_core::{CommandHandler, DataHandler};
use tcode_proto::{CommandKey, CommandType, DataCommandType};

/// Actuators wired on this board, in PWM slice order.
pub const ACTUATOR_KEYS: [CommandKey; 3] = [
    CommandKey::new(CommandType::Linear, 0),
    CommandKey::new(CommandType::Rotate, 0),
    CommandKey::new(CommandType::Vibrate, 0),
];

/// One PWM channel bound to an actuator key.
pub struct PwmActuator<'d> {
    key: CommandKey,
    output: PwmOutput<'d>,
}

impl<'d> PwmActuator<'d> {
    /// Bind channel A of `pwm` to `key`.
    ///
    /// Returns `None` if the slice was not configured with a channel A pin.
    pub fn new(key: CommandKey, pwm: Pwm<'d>) -> Option<Self> {
        let (output, _) = pwm.split();
        Some(Self {
            key,
            output: output?,
        })
    }

    #[inline]
    pub fn key(&self) -> CommandKey {
        self.key
    }

    /// Set the duty cycle to `magnitude` of full scale.
    pub fn set(&mut self, magnitude: f32) {
        let duty = (magnitude.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        if self.output.set_duty_cycle_fraction(duty, u16::MAX).is_err() {
            warn!("PWM update failed for {:?}", self.key);
        }
    }
}

/// Routes scheduler dispatches to the matching PWM output.
pub struct PwmActuators<'d, const K: usize> {
    actuators: [PwmActuator<'d>; K],
}

impl<'d, const K: usize> PwmActuators<'d, K> {
    pub fn new(actuators: [PwmActuator<'d>; K]) -> Self {
        Self { actuators }
    }
}

impl<const K: usize> CommandHandler for PwmActuators<'_, K> {
    fn dispatch(&mut self, key: CommandKey, magnitude: f32) {
        match self.actuators.iter_mut().find(|a| a.key == key) {
            Some(actuator) => {
                trace!("{:?} -> {}", key, magnitude);
                actuator.set(magnitude);
            }
            None => trace!("no actuator for {:?}", key),
        }
    }
}

/// Answers `D0` with the wired actuators, e.g. `L0 R0 V0`.
pub struct Capabilities<'a> {
    keys: &'a [CommandKey],
}

impl<'a> Capabilities<'a> {
    pub fn new(keys: &'a [CommandKey]) -> Self {
        Self { keys }
    }
}

impl DataHandler for Capabilities<'_> {
    fn respond<W: fmt::Write>(&mut self, command: DataCommandType, out: &mut W) -> fmt::Result {
        match command {
            DataCommandType::GetCapabilities => {
                for (i, key) in self.keys.iter().enumerate() {
                    if i > 0 {
                        out.write_char(' ')?;
                    }
                    write!(out, "{}{}", char::from(key.kind.letter()), key.channel)?;
                }
                Ok(())
            }
        }
    }
}
