//! Error types for the driver
//!
//! This module defines error types for configuration building
//! ([`BuilderError`]) and display operations ([`Error`]).
//!
//! The wire protocol itself is unacknowledged: a present-but-broken
//! display cannot be detected, so there is deliberately no "display did
//! not respond" error. What can fail is construction (bad geometry) and
//! the host's own pins.
//!
//! ## Example
//!
//! ```
//! use charlcd::{Builder, BuilderError, Geometry};
//!
//! // Missing geometry
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingGeometry)));
//!
//! // Invalid geometry
//! let result = Geometry::new(16, 0); // zero rows
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;

/// Maximum number of rows addressable through the row-offset table
///
/// The HD44780 DDRAM map supports at most four rows (two-line controllers
/// reused as four-line glass via the offset table).
pub const MAX_ROWS: u8 = 4;

/// Maximum number of columns per row
///
/// Bounded by the 80-byte DDRAM on two-line controllers (40x2 modules are
/// the widest produced).
pub const MAX_COLS: u8 = 40;

/// Errors that can occur when operating the display
///
/// Generic over the interface type to preserve the specific hardware
/// error, so calling code can match on the underlying pin failure.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Transport error (GPIO)
    ///
    /// Wraps the underlying hardware error from the
    /// [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// Custom-glyph slot outside the CGRAM range
    ///
    /// The character generator holds eight glyph slots (0-7).
    GlyphSlotOutOfRange {
        /// Slot index requested
        slot: u8,
    },
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::GlyphSlotOutOfRange { slot } => {
                write!(f, "Glyph slot {slot} out of range (0-7)")
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is
/// created; they are the loud, fail-fast half of the error model.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Geometry was not specified
    ///
    /// [`Builder::geometry()`](crate::config::Builder::geometry) must be
    /// called before building.
    MissingGeometry,
    /// Invalid geometry provided
    ///
    /// See [`Geometry::new()`](crate::config::Geometry::new) for
    /// constraints.
    InvalidGeometry {
        /// Number of columns requested
        cols: u8,
        /// Number of rows requested
        rows: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingGeometry => write!(f, "Geometry must be specified"),
            Self::InvalidGeometry { cols, rows } => write!(
                f,
                "Invalid geometry {cols}x{rows} (max {MAX_COLS}x{MAX_ROWS}, neither may be zero)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
