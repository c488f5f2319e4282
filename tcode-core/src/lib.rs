//! Platform-agnostic T-code input handling, command queueing and ramp
//! scheduling.
//!
//! This crate turns a raw byte stream into timed actuator updates without any
//! platform-specific dependencies. It can be used both in embedded `no_std`
//! environments and on host for testing.
//!
//! # Overview
//!
//! - [`ring_buffer`]: Raw input bytes ([`RingBuffer`])
//! - [`tokenizer`]: Space/newline token splitting ([`Tokenizer`])
//! - [`queue`]: Deduplicated command queue ([`CommandQueue`])
//! - [`scheduler`]: Per-tick dispatch and ramps ([`Scheduler`])
//! - [`session`]: All of the above for one stream ([`Session`])
//! - [`input`]: Byte source trait ([`ByteSource`])
//! - [`output`]: Handler traits ([`CommandHandler`], [`DataHandler`])
//! - [`bridge`]: Drives a session from its collaborators ([`TcodeBridge`])
//!
//! Commands on a line take effect together: they are staged as they are
//! decoded and merged into the active queue when the newline arrives. Within
//! a line, the last command for an actuator wins.
//!
//! # Example
//!
//! ```rust
//! use tcode_core::{CommandKey, QueryEcho, SliceSource, TcodeBridge};
//!
//! let mut positions = [0.0f32; 10];
//! let source = SliceSource::new(b"L090 L150\n");
//! let handler = |key: CommandKey, magnitude: f32| {
//!     positions[key.channel as usize] = magnitude;
//! };
//!
//! let mut bridge: TcodeBridge<_, _, _> = TcodeBridge::new(source, handler, QueryEcho);
//! let mut replies = heapless::String::<64>::new();
//! let report = bridge.poll(0, &mut replies);
//! assert_eq!(report.dispatched, 2);
//! drop(bridge);
//!
//! assert_eq!(positions[1], 0.5);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Log through the `log` facade when `defmt` is off
//! - **`embedded-io`**: Enable `serialize_io()` on protocol types
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations. Every
//! buffer is sized at compile time through const generics.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod logging;

pub mod bridge;
pub mod input;
pub mod output;
pub mod queue;
pub mod ring_buffer;
pub mod scheduler;
pub mod session;
pub mod tokenizer;

// Re-export main types at crate root
pub use bridge::{PollReport, TcodeBridge};
pub use input::{ByteSource, FnSource, SliceSource};
pub use output::{CommandHandler, DataHandler, QueryEcho};
pub use queue::{CommandQueue, QueueFull, MAX_COMMANDS};
pub use ring_buffer::{BufferOverflow, RingBuffer, TEXT_BUFFER_LEN};
pub use scheduler::Scheduler;
pub use session::{ParsedToken, Session, SessionError, TokenKind, MAX_RESPONSE_LEN};
pub use tokenizer::{Token, TokenTooLong, Tokenizer, MAX_TOKEN_LEN};

pub use tcode_proto::{Command, CommandKey, CommandType, DataCommandType, DecodeError};
