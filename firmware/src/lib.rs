//! T-code actuator controller for RP2040.
//!
//! This crate provides the embedded glue around [`tcode_core`]: a UART byte
//! stream in, PWM duty cycles out.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives T-code over UART (115200 baud, 8N1)
//! 2. Buffers, tokenizes and decodes it into actuator commands
//! 3. Ticks the command scheduler every 10 ms and drives one PWM output per
//!    actuator
//! 4. Answers data queries (`D0`) back over UART
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description |
//! |-----------|------|-------------|
//! | UART1 TX  | 8    | Query replies |
//! | UART1 RX  | 9    | T-code input |
//! | PWM0 A    | 0    | Linear axis `L0` |
//! | PWM1 A    | 2    | Rotary axis `R0` |
//! | PWM2 A    | 4    | Vibration motor `V0` |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two concurrent tasks:
//!
//! - **RX Task**: Reads UART bytes into a [`Channel`](embassy_sync::channel::Channel)
//! - **Control Task**: On every tick, drains the channel through a
//!   [`TcodeBridge`] and writes any replies to UART TX
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

// Re-export core types for convenience
pub use tcode_core::{
    ByteSource, CommandHandler, CommandKey, CommandType, DataHandler, PollReport, Session,
    SessionError, TcodeBridge,
};

pub mod pwm_output;
pub mod uart_input;

pub use pwm_output::{Capabilities, PwmActuator, PwmActuators, ACTUATOR_KEYS};
pub use uart_input::{rx_errors, ChannelSource, RxChannel, UartReader, RX_QUEUE_LEN};

/// Scheduler tick period.
pub const TICK_PERIOD_MS: u64 = tcode_proto::DEFAULT_TICK_PERIOD_MS as u64;
