//! HD44780/Noritake CUU Character Display Driver
//!
//! A driver for HD44780-class character LCD controllers and the Noritake
//! CUU class of vacuum fluorescent displays, presenting one cursor-addressed
//! text console over three kinds of wiring.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - 8-bit parallel, 4-bit parallel and bit-banged synchronous serial
//!   transports behind one [`DisplayInterface`] trait
//! - Datasheet power-up reset handshake, shadow cursor/geometry model,
//!   custom CGRAM glyphs, VFD brightness control
//! - ANSI/VT100 escape-sequence layer (with the `terminal` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use charlcd::{Builder, Display, Geometry, Parallel4};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let (rs, en) = (MockPin, MockPin);
//! # let (d4, d5, d6, d7) = (MockPin, MockPin, MockPin, MockPin);
//! # let mut delay = MockDelay;
//! let interface = match Parallel4::new(rs, en, d4, d5, d6, d7) {
//!     Ok(interface) => interface,
//!     Err(_) => return,
//! };
//! let geometry = match Geometry::new(16, 2) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().geometry(geometry).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.begin(&mut delay);
//! let _ = display.write_str("HELLO WORLD", &mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// HD44780 command definitions and protocol timing
pub mod command;
/// Display geometry and configuration builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Transport abstraction
pub mod interface;
/// Parallel bus transports
pub mod parallel;
/// Bit-banged synchronous serial transport
pub mod serial;

/// ANSI escape-sequence support (requires `terminal` feature)
#[cfg(feature = "terminal")]
pub mod terminal;

pub use config::{
    Builder, Config, DEFAULT_ROW_OFFSETS, Font, Geometry, MAX_COLS, MAX_ROWS,
};
pub use display::{Display, GLYPH_ROWS, GLYPH_SLOTS, Writer};
pub use error::{BuilderError, Error};
pub use interface::{BusWidth, DisplayInterface, InterfaceError, NoPin, Register};
pub use parallel::{Parallel4, Parallel8};
pub use serial::Serial;

#[cfg(feature = "terminal")]
pub use terminal::Terminal;
