//! Per-tick dispatch and ramp advancement for the active command queue.

use tcode_proto::{CommandKey, DEFAULT_TICK_PERIOD_MS, KEY_COUNT};

use crate::output::CommandHandler;
use crate::queue::CommandQueue;

/// Drives the active queue: dispatches every live command once per tick,
/// steps ramps toward their target and retires finished commands.
///
/// Remembers the last value dispatched per actuator so that interval ramps
/// start from where the actuator actually is.
#[derive(Debug, Clone)]
pub struct Scheduler {
    last_tick_ms: Option<u64>,
    outputs: [Option<f32>; KEY_COUNT],
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            last_tick_ms: None,
            outputs: [None; KEY_COUNT],
        }
    }

    /// Last magnitude dispatched for `key`, if any.
    ///
    /// Keys with a channel above 9 are dispatched but never recorded.
    pub fn last_output(&self, key: CommandKey) -> Option<f32> {
        key.index().and_then(|slot| self.outputs[slot])
    }

    /// Time between the two most recent ticks, or the default before that.
    pub fn period_ms(&self, now_ms: u64) -> u32 {
        self.last_tick_ms
            .map(|last| now_ms.saturating_sub(last))
            .filter(|elapsed| *elapsed > 0)
            .map_or(DEFAULT_TICK_PERIOD_MS, clamp_period)
    }

    /// Run one tick over `queue` at time `now_ms`.
    ///
    /// Every entry is dispatched once, in queue order. One-shot commands are
    /// removed right after their dispatch; ramping commands advance by one
    /// step and retire on the tick after they reach their end value.
    ///
    /// Returns the number of dispatches.
    pub fn tick<const Q: usize, H: CommandHandler + ?Sized>(
        &mut self,
        queue: &mut CommandQueue<Q>,
        handler: &mut H,
        now_ms: u64,
    ) -> usize {
        let tick_period = self.period_ms(now_ms);
        self.last_tick_ms = Some(now_ms);

        let mut dispatched = 0;
        let mut index = 0;
        while let Some(cmd) = queue.get_at_mut(index) {
            let key = cmd.key();
            let slot = key.index();
            let period = cmd
                .last_transition_ms
                .map(|last| now_ms.saturating_sub(last))
                .filter(|elapsed| *elapsed > 0)
                .map_or(tick_period, clamp_period);

            if cmd.interval > 0 && cmd.deadline_ms.is_none() {
                cmd.magnitude = slot.and_then(|i| self.outputs[i]).unwrap_or(0.0);
                cmd.deadline_ms = Some(now_ms.saturating_add(u64::from(cmd.interval)));
            }

            handler.dispatch(key, cmd.magnitude);
            if let Some(i) = slot {
                self.outputs[i] = Some(cmd.magnitude);
            }
            dispatched += 1;

            if !cmd.is_ramping() {
                trace!("retire {:?} at {}", key, cmd.magnitude);
                queue.remove_at(index);
                continue;
            }

            cmd.derive_transition(now_ms, period);
            cmd.magnitude = (cmd.magnitude + cmd.transition_magnitude).clamp(0.0, 1.0);
            cmd.last_transition_ms = Some(now_ms);

            let finished = match cmd.deadline_ms {
                Some(deadline) if cmd.interval > 0 => {
                    deadline.saturating_sub(now_ms) <= u64::from(period)
                }
                _ => cmd.magnitude >= 1.0,
            };
            if finished {
                if cmd.interval > 0 {
                    cmd.magnitude = cmd.target;
                }
                cmd.clear_ramp();
                trace!("ramp {:?} complete at {}", key, cmd.magnitude);
            }

            index += 1;
        }

        dispatched
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn clamp_period(elapsed_ms: u64) -> u32 {
    u32::try_from(elapsed_ms).unwrap_or(u32::MAX)
}
