//! Transport abstraction
//!
//! This module provides the [`DisplayInterface`] trait that the
//! [`Display`](crate::display::Display) drives, and the pieces shared by
//! the three bundled wire-level transports:
//!
//! - [`Parallel8`](crate::parallel::Parallel8): 8 data lines, one transfer
//!   per byte
//! - [`Parallel4`](crate::parallel::Parallel4): 4 data lines, two
//!   nibble transfers per byte
//! - [`Serial`](crate::serial::Serial): bit-banged synchronous serial with
//!   a per-transfer command header (Noritake CUU modules)
//!
//! The transport is chosen once, at construction, and never changes for
//! the lifetime of a display instance. The link is fire-and-forget: no
//! transfer carries an acknowledgement, and a miswired or absent display
//! is indistinguishable from a working one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use charlcd::{DisplayInterface, Parallel4, Register};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::delay::DelayNs;
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let mut interface = match Parallel4::new(MockPin, MockPin, MockPin, MockPin, MockPin, MockPin) {
//!     Ok(interface) => interface,
//!     Err(_) => return,
//! };
//!
//! // Send a command byte (two nibble transfers on this transport)
//! let _ = interface.send(0x01, Register::Command, &mut delay);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, OutputPin};

/// Destination register of a transfer
///
/// The register-select line (or serial header bit) tags every byte as
/// either an instruction or display data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    /// Instruction register
    Command,
    /// Data register (DDRAM/CGRAM)
    Data,
}

/// Data-bus width a transport presents to the controller
///
/// Only the function-set "DL" bit cares; nibble splitting itself is the
/// transport's business.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusWidth {
    /// Two 4-bit transfers per byte
    Four,
    /// One 8-bit transfer per byte
    Eight,
}

/// Trait for wire-level transports to an HD44780-class controller
///
/// Implementations own the pins and perform the bit-level protocol,
/// including the sub-microsecond settle delays around each latching edge.
/// Command pacing (the per-instruction execution wait) is the caller's
/// job; transports are pure signal drivers.
///
/// ## Implementing
///
/// For most wiring, use one of the bundled transports. Implement this
/// trait yourself for expander-based wiring (I2C backpacks, shift
/// registers) or inverted-polarity lines.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Bus width reported to the controller in the function-set register
    const BUS_WIDTH: BusWidth;

    /// Send one byte, tagged as command or data
    ///
    /// The implementation must assert the register-select state for the
    /// whole transfer and latch the byte per its protocol (one enable
    /// pulse, two nibble pulses, or a framed serial shift).
    ///
    /// # Errors
    ///
    /// Returns an error if driving a pin fails.
    fn send<D: DelayNs>(
        &mut self,
        byte: u8,
        register: Register,
        delay: &mut D,
    ) -> Result<(), Self::Error>;

    /// Single-transfer command write used by the reset handshake
    ///
    /// The power-up resynchronization sequence must be framed as 8-bit
    /// transfers even on a 4-bit bus: a 4-bit transport performs exactly
    /// one enable pulse carrying the high nibble, everything else sends
    /// the byte normally. Always targets the instruction register.
    ///
    /// # Errors
    ///
    /// Returns an error if driving a pin fails.
    fn send_sync<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), Self::Error>;

    /// Pulse the hardware reset line, when one is wired
    ///
    /// A no-op for transports without a reset line; the software reset
    /// handshake is still required either way.
    ///
    /// # Errors
    ///
    /// Returns an error if driving a pin fails.
    fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;
}

/// Errors produced by the bundled transports
///
/// Pin failures are reduced to their [`ErrorKind`] so a transport can mix
/// pin types from different sources (including [`NoPin`] placeholders)
/// without a generic error parameter per line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceError {
    /// GPIO pin error
    Pin(ErrorKind),
}

impl core::fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pin(kind) => write!(f, "pin error: {kind:?}"),
        }
    }
}

impl core::error::Error for InterfaceError {}

/// Map an embedded-hal pin error into an [`InterfaceError`]
pub(crate) fn pin_err<E: embedded_hal::digital::Error>(err: E) -> InterfaceError {
    InterfaceError::Pin(err.kind())
}

/// Placeholder output pin for omitted optional lines
///
/// Stands in for the read/write line on parallel transports and the reset
/// line on serial transports when those are not wired. Every operation
/// succeeds and drives nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pin_always_succeeds() {
        let mut pin = NoPin;
        assert!(pin.set_high().is_ok());
        assert!(pin.set_low().is_ok());
    }

    #[test]
    fn test_interface_error_display() {
        let err = InterfaceError::Pin(ErrorKind::Other);
        assert!(!alloc::format!("{err}").is_empty());
    }
}
