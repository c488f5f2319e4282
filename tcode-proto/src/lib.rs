//! T-code wire types, token decoding, and serialization.
//!
//! This crate provides everything needed to work with individual T-code
//! tokens:
//!
//! - **Types**: Core data structures
//!   - [`CommandType`] - Actuator class (linear, rotate, vibrate, auxiliary)
//!   - [`CommandKey`] - (type, channel) identity of an actuator
//!   - [`Command`] - Decoded instruction with its ramp state
//!   - [`DataCommandType`] - Data queries answered immediately
//!
//! - **Decoding**: Parse incoming tokens
//!   - [`decode()`] - Decode an actuator token
//!   - [`decode_data()`] - Decode a data-query token
//!
//! - **Serialization**: Produce outgoing tokens
//!   - [`Serialize`] trait - Extension trait for serialization
//!   - [`CommandBuilder`] - Fluent builder API
//!   - [`serialize_line()`] - Several commands on one line
//!
//! # Token Format
//!
//! ```text
//! <Class><Channel>[<MagnitudeDigits>][S<SpeedDigits>][I<IntervalDigits>]
//! ```
//!
//! - `Class` - `L` linear, `R` rotate, `V` vibrate, `A` auxiliary (any case)
//! - `Channel` - single decimal digit
//! - `MagnitudeDigits` - decimal fraction, most significant first (`90` is 0.90)
//! - `S<n>` - ramp at `n` percent of full travel per 100 ms
//! - `I<n>` - ramp to the magnitude over `n` milliseconds
//!
//! Data queries are `D<Code>`; `D0` asks for the device capabilities.
//!
//! # Examples
//!
//! ## Decoding Tokens
//!
//! ```
//! use tcode_proto::{decode, CommandType};
//!
//! let cmd = decode(b"L090").unwrap();
//! assert_eq!(cmd.kind, CommandType::Linear);
//! assert_eq!(cmd.channel, 0);
//! assert!(!cmd.is_ramping());
//!
//! let ramp = decode(b"R2I3000").unwrap();
//! assert_eq!(ramp.interval, 3000);
//! ```
//!
//! ## Serializing with the Builder API
//!
//! ```
//! use tcode_proto::CommandBuilder;
//!
//! let mut buf = [0u8; 64];
//! let len = CommandBuilder::vibrate(1)
//!     .magnitude(0.99)
//!     .digits(2)
//!     .speed(50)
//!     .serialize(&mut buf)
//!     .unwrap();
//! assert_eq!(&buf[..len], b"V199S50");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (`std::error::Error` impls)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `serialize_to_vec()` methods
//! - **`embedded-io`**: Enable `serialize_io()` methods for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
mod fmt;
pub mod parser;
pub mod serialize;
pub mod types;

// Re-export types at crate root for convenience
pub use builder::{serialize_line, CommandBuilder};
pub use parser::{decode, decode_data, is_data_token, DecodeError};
pub use serialize::{
    Serialize, SerializeError, DEFAULT_MAGNITUDE_DIGITS, MAX_COMMAND_SIZE, MAX_DATA_SIZE,
};
pub use types::{
    interval_step, speed_step, Command, CommandKey, CommandType, DataCommandType,
    DEFAULT_TICK_PERIOD_MS, KEY_COUNT, MAX_CHANNEL, SPEED_QUANTUM_MS,
};
