//! UART receive path: a task pushes bytes into a channel, the control loop
//! drains it through [`ChannelSource`].
//!
//! # Pins
//!
//! Uses UART1 by default:
//! - GPIO 8: TX
//! - GPIO 9: RX

use defmt::warn;
use embassy_rp::uart::{Async, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use portable_atomic::{AtomicU32, Ordering};
use tcode_core::ByteSource;

/// Bytes the RX task can queue ahead of the control loop.
pub const RX_QUEUE_LEN: usize = 128;

pub type RxChannel = Channel<CriticalSectionRawMutex, u8, RX_QUEUE_LEN>;

static RX_ERRORS: AtomicU32 = AtomicU32::new(0);

/// UART receive errors (framing, overrun, break) since boot.
pub fn rx_errors() -> u32 {
    RX_ERRORS.load(Ordering::Relaxed)
}

/// Non-blocking [`ByteSource`] over the receive channel.
pub struct ChannelSource<'a> {
    rx: Receiver<'a, CriticalSectionRawMutex, u8, RX_QUEUE_LEN>,
}

impl<'a> ChannelSource<'a> {
    #[must_use]
    pub fn new(channel: &'a RxChannel) -> Self {
        Self {
            rx: channel.receiver(),
        }
    }
}

impl ByteSource for ChannelSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        self.rx.try_receive().ok()
    }
}

/// Forwards every received UART byte into an [`RxChannel`].
pub struct UartReader<'d> {
    rx: UartRx<'d, Async>,
}

impl<'d> UartReader<'d> {
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self { rx }
    }

    /// Read forever. Waits for channel space rather than dropping bytes.
    pub async fn run(&mut self, channel: &RxChannel) -> ! {
        let mut byte = [0u8; 1];
        loop {
            match self.rx.read(&mut byte).await {
                Ok(()) => channel.send(byte[0]).await,
                Err(e) => {
                    let count = RX_ERRORS.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!("UART receive error {:?} ({} total)", e, count);
                }
            }
        }
    }
}
