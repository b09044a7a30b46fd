//! ANSI/VT100 escape-sequence layer (requires `terminal` feature)
//!
//! [`Terminal`] wraps [`Display`] and filters a minimal VT100 subset out
//! of the byte stream before it reaches the core write sink, so firmware
//! can drive the glass from escape-annotated text (serial consoles,
//! canned menu strings) without the transport/geometry core knowing
//! anything about text protocols.
//!
//! ## Recognized sequences
//!
//! | Sequence | Action |
//! |----------|--------|
//! | `ESC [ n A` / `B` / `C` / `D` | cursor up / down / forward / back |
//! | `ESC [ row ; col H` (or `f`) | absolute position, 0-based cells |
//! | `ESC [ 2 J` | erase display and home |
//! | `ESC [ s` / `ESC [ u` | save / restore cursor (single slot) |
//! | `ESC [ n m` | brightness: 0=50%, 1=100%, 2=20%, 30-39 in 10% steps |
//!
//! Anything malformed aborts the sequence and the offending byte falls
//! through to the display as ordinary text. Escape bytes never count
//! toward the rendered-cell totals.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! use charlcd::{Builder, Display, Geometry, Terminal};
//! # use charlcd::{BusWidth, DisplayInterface, Register};
//! # struct MockInterface;
//! # impl DisplayInterface for MockInterface {
//! #     type Error = Infallible;
//! #     const BUS_WIDTH: BusWidth = BusWidth::Eight;
//! #     fn send<D: DelayNs>(&mut self, _: u8, _: Register, _: &mut D) -> Result<(), Self::Error> { Ok(()) }
//! #     fn send_sync<D: DelayNs>(&mut self, _: u8, _: &mut D) -> Result<(), Self::Error> { Ok(()) }
//! #     fn hardware_reset<D: DelayNs>(&mut self, _: &mut D) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let geometry = match Geometry::new(20, 4) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().geometry(geometry).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut terminal = Terminal::new(Display::new(MockInterface, config));
//! let _ = terminal.begin(&mut delay);
//!
//! // position to row 1, column 4, then print
//! let _ = terminal.write_str("\x1b[1;4HREADY", &mut delay);
//! ```

use embedded_hal::delay::DelayNs;

use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayInterface;

const ESC: u8 = 0x1B;

/// Maximum numeric parameters per control sequence
const MAX_PARAMS: usize = 4;

/// Parser state
///
/// Ground passes bytes straight through; a sequence in progress absorbs
/// them until a terminator or a malformed byte.
enum State {
    Ground,
    Escape,
    Csi {
        params: [u16; MAX_PARAMS],
        index: usize,
    },
}

/// Escape-filtering decorator over a [`Display`]
///
/// Owns the display; the parser state machine lives here, outside the
/// core driver, and emits only resolved operations (`set_cursor`,
/// `clear`, `set_brightness`, ...) downward.
pub struct Terminal<I>
where
    I: DisplayInterface,
{
    display: Display<I>,
    state: State,
}

impl<I> Terminal<I>
where
    I: DisplayInterface,
{
    /// Wrap a display in the escape-sequence layer
    pub fn new(display: Display<I>) -> Self {
        Self {
            display,
            state: State::Ground,
        }
    }

    /// Run the wrapped display's reset handshake
    pub fn begin<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.state = State::Ground;
        self.display.begin(delay)
    }

    /// Borrow the wrapped display
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Mutably borrow the wrapped display
    ///
    /// Bypasses the parser; direct writes are fine as long as no escape
    /// sequence is mid-flight.
    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    /// Unwrap back into the display
    pub fn into_display(self) -> Display<I> {
        self.display
    }

    /// Write one byte through the escape filter
    ///
    /// Returns the number of cells rendered (0 for escape and control
    /// bytes), mirroring [`Display::write_byte`].
    pub fn write_byte<D: DelayNs>(
        &mut self,
        byte: u8,
        delay: &mut D,
    ) -> Result<usize, Error<I>> {
        match core::mem::replace(&mut self.state, State::Ground) {
            State::Ground => {
                if byte == ESC {
                    self.state = State::Escape;
                    Ok(0)
                } else {
                    self.display.write_byte(byte, delay)
                }
            }
            State::Escape => {
                if byte == b'[' {
                    self.state = State::Csi {
                        params: [0; MAX_PARAMS],
                        index: 0,
                    };
                    Ok(0)
                } else {
                    // not a control sequence; the byte prints normally
                    self.display.write_byte(byte, delay)
                }
            }
            State::Csi { mut params, index } => match byte {
                b'0'..=b'9' => {
                    params[index] = params[index]
                        .saturating_mul(10)
                        .saturating_add(u16::from(byte - b'0'));
                    self.state = State::Csi { params, index };
                    Ok(0)
                }
                b';' => {
                    if index + 1 < MAX_PARAMS {
                        self.state = State::Csi {
                            params,
                            index: index + 1,
                        };
                        Ok(0)
                    } else {
                        // too many parameters; abort and print
                        self.display.write_byte(byte, delay)
                    }
                }
                b'A' | b'B' | b'C' | b'D' | b'H' | b'f' | b'J' | b's' | b'u' | b'm' => {
                    self.dispatch(byte, &params, index + 1, delay)?;
                    Ok(0)
                }
                _ => self.display.write_byte(byte, delay),
            },
        }
    }

    /// Write a string through the escape filter
    ///
    /// Returns the number of cells rendered, excluding escape and
    /// control bytes.
    pub fn write_str<D: DelayNs>(&mut self, s: &str, delay: &mut D) -> Result<usize, Error<I>> {
        let mut rendered = 0;
        for byte in s.bytes() {
            rendered += self.write_byte(byte, delay)?;
        }
        Ok(rendered)
    }

    fn dispatch<D: DelayNs>(
        &mut self,
        terminator: u8,
        params: &[u16; MAX_PARAMS],
        count: usize,
        delay: &mut D,
    ) -> Result<(), Error<I>> {
        let (col, row) = self.display.cursor();
        let geometry = *self.display.geometry();
        match terminator {
            b'A' => {
                let n = params[0].max(1);
                let row = u16::from(row).saturating_sub(n) as u8;
                self.display.set_cursor(col, row, delay)
            }
            b'B' => {
                let n = params[0].max(1);
                let row = (u16::from(row) + n).min(u16::from(geometry.rows - 1)) as u8;
                self.display.set_cursor(col, row, delay)
            }
            b'C' => {
                let n = params[0].max(1);
                let col = (u16::from(col) + n).min(u16::from(geometry.cols - 1)) as u8;
                self.display.set_cursor(col, row, delay)
            }
            b'D' => {
                let n = params[0].max(1);
                let col = u16::from(col).saturating_sub(n) as u8;
                self.display.set_cursor(col, row, delay)
            }
            b'H' | b'f' => {
                // 0-based cell coordinates, wrap-normalized by the core
                let row = params[0].min(255) as u8;
                let col = if count > 1 { params[1].min(255) as u8 } else { 0 };
                self.display.set_cursor(col, row, delay)
            }
            b'J' => {
                if params[0] == 2 {
                    self.display.clear(delay)
                } else {
                    Ok(())
                }
            }
            b's' => {
                self.display.push_cursor();
                Ok(())
            }
            b'u' => self.display.pop_cursor(delay),
            b'm' => {
                for param in params.iter().take(count) {
                    let percent = match *param {
                        0 => Some(50),
                        1 => Some(100),
                        2 => Some(20),
                        30..=39 => Some(((*param - 29) * 10) as u8),
                        _ => None,
                    };
                    if let Some(percent) = percent {
                        self.display.set_brightness(percent, delay)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Geometry};
    use crate::interface::{BusWidth, Register};
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct MockInterface {
        writes: Vec<(Register, u8)>,
    }

    impl MockInterface {
        fn data(&self) -> Vec<u8> {
            self.writes
                .iter()
                .filter(|(register, _)| *register == Register::Data)
                .map(|(_, byte)| *byte)
                .collect()
        }

        fn commands(&self) -> Vec<u8> {
            self.writes
                .iter()
                .filter(|(register, _)| *register == Register::Command)
                .map(|(_, byte)| *byte)
                .collect()
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = Infallible;

        const BUS_WIDTH: BusWidth = BusWidth::Eight;

        fn send<D: DelayNs>(
            &mut self,
            byte: u8,
            register: Register,
            _delay: &mut D,
        ) -> Result<(), Self::Error> {
            self.writes.push((register, byte));
            Ok(())
        }

        fn send_sync<D: DelayNs>(&mut self, _byte: u8, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }

        fn hardware_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockDelay;
    impl embedded_hal::delay::DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn terminal(cols: u8, rows: u8) -> Terminal<MockInterface> {
        let config = Builder::new()
            .geometry(Geometry::new(cols, rows).unwrap())
            .build()
            .unwrap();
        let mut terminal = Terminal::new(Display::new(MockInterface::default(), config));
        terminal.begin(&mut MockDelay).unwrap();
        terminal.display_mut().interface_mut().writes.clear();
        terminal
    }

    #[test]
    fn test_absolute_position_no_visible_output() {
        let mut terminal = terminal(20, 4);
        let rendered = terminal.write_str("\x1b[10;5H", &mut MockDelay).unwrap();
        assert_eq!(rendered, 0);
        // row 10 wraps modulo 4 rows
        assert_eq!(terminal.display().cursor(), (5, 2));
        assert!(terminal.display().interface().data().is_empty());
    }

    #[test]
    fn test_absolute_position_row_only() {
        let mut terminal = terminal(20, 4);
        terminal.write_str("\x1b[3H", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (0, 3));
    }

    #[test]
    fn test_relative_moves_saturate_at_edges() {
        let mut terminal = terminal(20, 4);
        terminal
            .display_mut()
            .set_cursor(5, 1, &mut MockDelay)
            .unwrap();

        terminal.write_str("\x1b[2B", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (5, 3));
        terminal.write_str("\x1b[9B", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (5, 3));

        terminal.write_str("\x1b[A", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (5, 2));
        terminal.write_str("\x1b[7A", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (5, 0));

        terminal.write_str("\x1b[30C", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (19, 0));
        terminal.write_str("\x1b[3D", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (16, 0));
    }

    #[test]
    fn test_erase_display_clears_and_homes() {
        let mut terminal = terminal(16, 2);
        terminal.write_str("AB\x1b[2J", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (0, 0));
        assert!(terminal.display().interface().commands().contains(&0x01));
    }

    #[test]
    fn test_erase_display_other_modes_ignored() {
        let mut terminal = terminal(16, 2);
        terminal.write_str("\x1b[1J", &mut MockDelay).unwrap();
        assert!(!terminal.display().interface().commands().contains(&0x01));
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut terminal = terminal(16, 2);
        terminal.write_str("\x1b[1;7H\x1b[s", &mut MockDelay).unwrap();
        terminal.write_str("\x1b[0;0H", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (0, 0));
        terminal.write_str("\x1b[u", &mut MockDelay).unwrap();
        assert_eq!(terminal.display().cursor(), (7, 1));
    }

    #[test]
    fn test_sgr_brightness_codes() {
        // (sequence, quantized code)
        for (sequence, code) in [
            ("\x1b[1m", 0b00u8), // 100%
            ("\x1b[0m", 0b10),   // 50%
            ("\x1b[2m", 0b11),   // 20%
            ("\x1b[35m", 0b01),  // 60%
            ("\x1b[39m", 0b00),  // 100%
        ] {
            let mut terminal = terminal(16, 2);
            terminal.write_str(sequence, &mut MockDelay).unwrap();
            assert_eq!(
                terminal.display().interface().data(),
                &[code],
                "sequence {sequence:?}"
            );
        }
    }

    #[test]
    fn test_malformed_sequence_prints_offending_byte() {
        let mut terminal = terminal(16, 2);
        let rendered = terminal.write_str("\x1b[1x", &mut MockDelay).unwrap();
        assert_eq!(rendered, 1);
        assert_eq!(terminal.display().interface().data(), &[b'x']);
        assert_eq!(terminal.display().cursor(), (1, 0));
    }

    #[test]
    fn test_lone_escape_prints_following_byte() {
        let mut terminal = terminal(16, 2);
        let rendered = terminal.write_str("\x1bZ", &mut MockDelay).unwrap();
        assert_eq!(rendered, 1);
        assert_eq!(terminal.display().interface().data(), &[b'Z']);
    }

    #[test]
    fn test_text_passes_through_with_counts() {
        let mut terminal = terminal(16, 2);
        let rendered = terminal
            .write_str("OK\x1b[5;0H!\r\n", &mut MockDelay)
            .unwrap();
        assert_eq!(rendered, 3);
        assert_eq!(terminal.display().interface().data(), &[b'O', b'K', b'!']);
    }

    #[test]
    fn test_unrecognized_final_byte_aborts_and_prints() {
        let mut terminal = terminal(16, 2);
        let rendered = terminal.write_str("\x1b[3Q", &mut MockDelay).unwrap();
        assert_eq!(rendered, 1);
        assert_eq!(terminal.display().interface().data(), &[b'Q']);
    }
}
