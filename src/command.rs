//! HD44780 instruction set and Noritake serial framing
//!
//! This module defines the command bytes and register flag bits used to
//! control HD44780-class LCD controllers and the Noritake CUU VFD modules
//! that emulate them, plus the timing constants the protocol mandates.
//!
//! ## Command structure
//!
//! Every instruction is a single byte whose high bit(s) select the register
//! and whose low bits carry the register payload. Registers with multiple
//! independent attributes (entry mode, display control, function set) must
//! always be written whole; the driver caches the live flag bits and ORs
//! them back in on every write (there is no partial-bit-set operation and,
//! in the common wiring, no way to read the register back).
//!
//! ## Example
//!
//! ```
//! use charlcd::command::{DISPLAY_CONTROL, DISPLAY_ON, CURSOR_ON};
//!
//! // Display on, underline cursor on, blink off
//! let byte = DISPLAY_CONTROL | DISPLAY_ON | CURSOR_ON;
//! assert_eq!(byte, 0x0E);
//! ```

// Stand-alone commands

/// Clear display command (0x01)
///
/// Blanks all of DDRAM and resets the address pointer. Needs the long
/// [`CLEAR_SETTLE_US`] wait; the controller clears its RAM internally.
pub const CLEAR_DISPLAY: u8 = 0x01;

/// Return home command (0x02)
///
/// Resets the address pointer and undoes any display shift. Same long
/// settle time as [`CLEAR_DISPLAY`].
pub const RETURN_HOME: u8 = 0x02;

/// Set CGRAM address command (0x40 | address)
///
/// Low 6 bits select the character-generator RAM address. Glyph slot `n`
/// starts at address `n * 8`.
pub const SET_CGRAM_ADDR: u8 = 0x40;

/// Set DDRAM address command (0x80 | address)
///
/// Low 7 bits select the display-data RAM address. Row layouts are not
/// linear; see [`Geometry`](crate::config::Geometry) for the per-row base
/// offsets.
pub const SET_DDRAM_ADDR: u8 = 0x80;

// Entry mode set command and flags

/// Entry mode set command (0x04)
pub const ENTRY_MODE_SET: u8 = 0x04;

/// Entry mode "I/D" bit: increment the address pointer after each access
pub const ENTRY_INCREMENT: u8 = 0x02;

/// Entry mode "S" bit: shift the display window instead of the cursor
pub const ENTRY_SHIFT: u8 = 0x01;

// Display control command and flags

/// Display on/off control command (0x08)
pub const DISPLAY_CONTROL: u8 = 0x08;

/// Display control "D" bit: display on
pub const DISPLAY_ON: u8 = 0x04;

/// Display control "C" bit: underline cursor on
pub const CURSOR_ON: u8 = 0x02;

/// Display control "B" bit: cursor blink on
pub const BLINK_ON: u8 = 0x01;

// Cursor/display shift command and flags

/// Cursor or display shift command (0x10)
///
/// A one-shot operation; unlike the other registers there is no live state
/// to cache.
pub const CURSOR_SHIFT: u8 = 0x10;

/// Shift "S/C" bit: move the visible window rather than the cursor
pub const SHIFT_DISPLAY: u8 = 0x08;

/// Shift "R/L" bit: shift right (left when clear)
pub const SHIFT_RIGHT: u8 = 0x04;

// Function set command and flags

/// Function set command (0x20)
pub const FUNCTION_SET: u8 = 0x20;

/// Function set "DL" bit: 8-bit bus (4-bit when clear)
pub const EIGHT_BIT_MODE: u8 = 0x10;

/// Function set "N" bit: two-line addressing (one line when clear)
pub const TWO_LINE: u8 = 0x08;

/// Function set "F" bit: 5x10 font (5x8 when clear; two-line controllers
/// ignore it)
pub const TALL_FONT: u8 = 0x04;

// Serial framing (Noritake CU20049 manual pg. 12)
//
// Each serial transfer is prefixed with a header byte: bits 7..3 are fixed
// sync bits, bit 2 is read/write (1 = read), bit 1 is register select
// (1 = data register), bit 0 is zero. The header is rebuilt before every
// transfer; the host keeps no committed serial register state.

/// Fixed synchronization bits of the serial header byte
pub const SYNC_HEAD: u8 = 0b1111_1000;

/// Serial header read/write bit (set = read)
pub const HEAD_READ: u8 = 0b0000_0100;

/// Serial header register-select bit (set = data register)
pub const HEAD_DATA: u8 = 0b0000_0010;

// Timing
//
// The link is write-only in the common wiring, so the driver cannot poll
// the busy flag and must instead wait out the datasheet worst case after
// every operation. The sub-microsecond values bound the signal edges
// around the latch and must come from a spinning delay provider, not a
// scheduler sleep.

/// Minimum wait after power-up before the controller accepts commands
pub const POWER_UP_DELAY_US: u32 = 50_000;

/// Wait after the first resynchronization function-set write (>= 4.1 ms)
pub const RESYNC_FIRST_DELAY_US: u32 = 4_500;

/// Wait after the second and third resynchronization writes (>= 100 us)
pub const RESYNC_DELAY_US: u32 = 150;

/// Worst-case instruction execution time plus margin (>= 37 us)
pub const EXECUTE_DELAY_US: u32 = 50;

/// Settle time for [`CLEAR_DISPLAY`] and [`RETURN_HOME`] (>= 1.52 ms)
pub const CLEAR_SETTLE_US: u32 = 2_000;

/// Minimum width of the enable pulse that latches a parallel transfer
pub const ENABLE_PULSE_NS: u32 = 450;

/// Data setup/hold time around the enable pulse edges
pub const BUS_SETTLE_NS: u32 = 60;

/// Half-period of the bit-banged serial clock
pub const SERIAL_HALF_PERIOD_NS: u32 = 500;

/// Width of the optional hardware reset pulse on serial modules
pub const RESET_PULSE_US: u32 = 1_000;
