//! Core display operations
//!
//! [`Display`] owns a transport, the configured geometry, and the shadow
//! state the protocol forces the host to keep: the controller is
//! write-only in the common wiring, so the cursor position and the three
//! multi-attribute registers (function set, entry mode, display control)
//! are cached here and re-transmitted whole on every change.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::command::{
    BLINK_ON, CLEAR_DISPLAY, CLEAR_SETTLE_US, CURSOR_ON, CURSOR_SHIFT, DISPLAY_CONTROL,
    DISPLAY_ON, EIGHT_BIT_MODE, ENTRY_INCREMENT, ENTRY_MODE_SET, ENTRY_SHIFT, EXECUTE_DELAY_US,
    FUNCTION_SET, POWER_UP_DELAY_US, RESYNC_DELAY_US, RESYNC_FIRST_DELAY_US, RETURN_HOME,
    SET_CGRAM_ADDR, SET_DDRAM_ADDR, SHIFT_DISPLAY, SHIFT_RIGHT, TALL_FONT, TWO_LINE,
};
use crate::config::{Config, Font, Geometry};
use crate::error::Error;
use crate::interface::{BusWidth, DisplayInterface, Register};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Number of custom glyph slots in the character generator
pub const GLYPH_SLOTS: u8 = 8;

/// Rows of pixel data per custom glyph
pub const GLYPH_ROWS: u8 = 8;

// Control bytes consumed by the write sink
const BACKSPACE: u8 = 0x08;
const TAB: u8 = 0x09;
const LINE_FEED: u8 = 0x0A;
const FORM_FEED: u8 = 0x0C;
const CARRIAGE_RETURN: u8 = 0x0D;

// Tab stops every four columns
const TAB_STOP: u8 = 4;

/// Core character-display driver
///
/// Generic over any [`DisplayInterface`]; the transport is fixed at
/// construction. All operations are synchronous and blocking; mandated
/// settle times are waited out inline through the caller's [`DelayNs`].
/// A display instance has a single owner (`&mut self` throughout); share
/// one across tasks only behind external serialization.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Wire-level transport
    interface: I,
    /// Geometry and font, fixed at construction
    config: Config,
    /// Function-set flag bits as last transmitted
    function_set: u8,
    /// Entry-mode flag bits as last transmitted
    entry_mode: u8,
    /// Display-control flag bits as last transmitted
    display_control: u8,
    /// Shadow cursor column
    col: u8,
    /// Shadow cursor row
    row: u8,
    /// Single-slot saved cursor position
    saved: (u8, u8),
    /// Byte codes substituted by CGRAM glyph slots during writes
    glyph_map: [Option<u8>; GLYPH_SLOTS as usize],
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent until [`begin`](Self::begin) runs the reset
    /// handshake.
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            function_set: 0,
            entry_mode: ENTRY_INCREMENT,
            display_control: DISPLAY_ON,
            col: 0,
            row: 0,
            saved: (0, 0),
            glyph_map: [None; GLYPH_SLOTS as usize],
        }
    }

    /// Run the power-up reset handshake and program the default state
    ///
    /// The controller's power-on state is unknown and cannot be queried,
    /// so this reproduces the datasheet recovery sequence: three
    /// function-set writes forced to 8-bit framing with decreasing
    /// mandatory waits, which resynchronizes the controller regardless of
    /// the bit mode it was left in. Only then is the configured function
    /// set programmed and the normal transport safe to use.
    ///
    /// Safe to call again; the full (slow) handshake re-runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails. A wired-but-broken
    /// display cannot be detected; the sequence is fire-and-forget.
    pub fn begin<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let Geometry { cols, rows, .. } = self.config.geometry;
        debug!("charlcd: begin {}x{}", cols, rows);

        self.interface
            .hardware_reset(delay)
            .map_err(Error::Interface)?;
        delay.delay_us(POWER_UP_DELAY_US);

        // unknown-state recovery: 8-bit-framed function set, three times
        let resync = FUNCTION_SET | EIGHT_BIT_MODE;
        self.interface
            .send_sync(resync, delay)
            .map_err(Error::Interface)?;
        delay.delay_us(RESYNC_FIRST_DELAY_US);
        self.interface
            .send_sync(resync, delay)
            .map_err(Error::Interface)?;
        delay.delay_us(RESYNC_DELAY_US);
        self.interface
            .send_sync(resync, delay)
            .map_err(Error::Interface)?;
        delay.delay_us(RESYNC_DELAY_US);

        let mut function = match I::BUS_WIDTH {
            BusWidth::Eight => EIGHT_BIT_MODE,
            BusWidth::Four => 0,
        };
        if rows > 1 {
            function |= TWO_LINE;
        } else if self.config.font == Font::FiveByTen {
            // the tall font only exists on one-line glass
            function |= TALL_FONT;
        }
        self.function_set = function;
        self.command(FUNCTION_SET | function, delay)?;

        self.entry_mode = ENTRY_INCREMENT;
        self.command(ENTRY_MODE_SET | self.entry_mode, delay)?;

        self.display_control = DISPLAY_ON;
        self.command(DISPLAY_CONTROL | self.display_control, delay)?;

        self.clear(delay)?;
        debug!("charlcd: ready");
        Ok(())
    }

    /// Clear the display and home the cursor
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.command(CLEAR_DISPLAY, delay)?;
        delay.delay_us(CLEAR_SETTLE_US);
        self.col = 0;
        self.row = 0;
        Ok(())
    }

    /// Home the cursor and undo any display shift
    pub fn home<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.command(RETURN_HOME, delay)?;
        delay.delay_us(CLEAR_SETTLE_US);
        self.col = 0;
        self.row = 0;
        Ok(())
    }

    /// Move the cursor to a character cell
    ///
    /// Out-of-range coordinates wrap modulo the geometry on each axis
    /// independently; a cursor move never fails on range.
    pub fn set_cursor<D: DelayNs>(&mut self, col: u8, row: u8, delay: &mut D) -> DisplayResult<I> {
        let col = col % self.config.geometry.cols;
        let row = row % self.config.geometry.rows;
        self.command(
            SET_DDRAM_ADDR | self.config.geometry.ddram_address(col, row),
            delay,
        )?;
        self.col = col;
        self.row = row;
        Ok(())
    }

    /// Current cursor position as (column, row)
    pub fn cursor(&self) -> (u8, u8) {
        (self.col, self.row)
    }

    /// Save the cursor position into the single restore slot
    ///
    /// Not a stack; a second save overwrites the first.
    pub fn push_cursor(&mut self) {
        self.saved = (self.col, self.row);
    }

    /// Restore the cursor position saved by [`push_cursor`](Self::push_cursor)
    ///
    /// Restores (0,0) if nothing was ever saved. The slot is not
    /// consumed; repeated restores return to the same cell.
    pub fn pop_cursor<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let (col, row) = self.saved;
        self.set_cursor(col, row, delay)
    }

    /// Write one byte to the display
    ///
    /// The single path by which text reaches the glass. Control bytes are
    /// consumed for cursor movement: backspace (0x08) erases the previous
    /// cell and stays on it, tab (0x09) spaces to the next multiple-of-4
    /// column, line feed (0x0A) moves down one row wrapping at the
    /// bottom, form feed (0x0C) clears the screen, carriage return (0x0D)
    /// returns to column 0. Anything else is rendered at the cursor,
    /// which then advances, wrapping to the next row at the right edge
    /// and to (0,0) past the last row.
    ///
    /// Returns the number of cells rendered: 1 for a printable byte, 0
    /// for a consumed control byte.
    pub fn write_byte<D: DelayNs>(
        &mut self,
        byte: u8,
        delay: &mut D,
    ) -> Result<usize, Error<I>> {
        match byte {
            BACKSPACE => {
                self.backspace(delay)?;
                Ok(0)
            }
            TAB => {
                self.tab(delay)?;
                Ok(0)
            }
            LINE_FEED => {
                self.line_feed(delay)?;
                Ok(0)
            }
            FORM_FEED => {
                self.clear(delay)?;
                Ok(0)
            }
            CARRIAGE_RETURN => {
                let row = self.row;
                self.set_cursor(0, row, delay)?;
                Ok(0)
            }
            _ => {
                self.put_cell(byte, delay)?;
                Ok(1)
            }
        }
    }

    /// Write a string through [`write_byte`](Self::write_byte)
    ///
    /// Returns the number of cells rendered, excluding control bytes.
    pub fn write_str<D: DelayNs>(&mut self, s: &str, delay: &mut D) -> Result<usize, Error<I>> {
        let mut rendered = 0;
        for byte in s.bytes() {
            rendered += self.write_byte(byte, delay)?;
        }
        Ok(rendered)
    }

    /// Borrow the display as a [`core::fmt::Write`] sink
    ///
    /// ```rust,ignore
    /// use core::fmt::Write;
    /// write!(display.writer(&mut delay), "t={}s", seconds)?;
    /// ```
    pub fn writer<'a, D: DelayNs>(&'a mut self, delay: &'a mut D) -> Writer<'a, I, D> {
        Writer {
            display: self,
            delay,
        }
    }

    /// Turn the display on or off
    ///
    /// Display data is retained while off.
    pub fn set_display<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> DisplayResult<I> {
        self.update_display_control(DISPLAY_ON, on, delay)
    }

    /// Show or hide the underline cursor
    pub fn set_underline<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> DisplayResult<I> {
        self.update_display_control(CURSOR_ON, on, delay)
    }

    /// Enable or disable cursor blink
    pub fn set_blink<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> DisplayResult<I> {
        self.update_display_control(BLINK_ON, on, delay)
    }

    /// Enable or disable autoscroll (display shift on write)
    pub fn set_autoscroll<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> DisplayResult<I> {
        self.update_entry_mode(ENTRY_SHIFT, on, delay)
    }

    /// Text flows left to right (the power-on default)
    pub fn left_to_right<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.update_entry_mode(ENTRY_INCREMENT, true, delay)
    }

    /// Text flows right to left
    pub fn right_to_left<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.update_entry_mode(ENTRY_INCREMENT, false, delay)
    }

    /// Shift the visible window one column left
    ///
    /// DDRAM contents and the cursor address are unchanged.
    pub fn scroll_display_left<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.command(CURSOR_SHIFT | SHIFT_DISPLAY, delay)
    }

    /// Shift the visible window one column right
    pub fn scroll_display_right<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.command(CURSOR_SHIFT | SHIFT_DISPLAY | SHIFT_RIGHT, delay)
    }

    /// Set VFD brightness as a percentage
    ///
    /// Quantizes onto the module's four brightness codes (`0b00`
    /// brightest through `0b11` dimmest) with thresholds at 25/50/75
    /// percent; a value exactly on a threshold takes the dimmer code.
    /// Zero turns the display off entirely (the filament supply shuts
    /// down) rather than selecting the dimmest lit level, and any
    /// non-zero value turns it back on. LCD controllers ignore the
    /// brightness data byte; values above 100 clamp.
    pub fn set_brightness<D: DelayNs>(&mut self, percent: u8, delay: &mut D) -> DisplayResult<I> {
        if percent == 0 {
            return self.set_display(false, delay);
        }

        let tenths = u16::from(percent.min(100)) * 10;
        let mut code: u8 = 0b11;
        let mut threshold: u16 = 250;
        while code > 0 && threshold <= 750 {
            if tenths > threshold {
                code -= 1;
            }
            threshold += 250;
        }

        if self.display_control & DISPLAY_ON == 0 {
            self.set_display(true, delay)?;
        }
        // brightness loads as a function-set write followed by one data
        // byte (Noritake CUU); the cursor does not move
        self.command(FUNCTION_SET | self.function_set, delay)?;
        self.data(code, delay)
    }

    /// Load a custom glyph into a CGRAM slot
    ///
    /// Eight bytes of bitmap, one per pixel row, low five bits
    /// significant. The DDRAM address of the current cursor is re-issued
    /// afterwards so the next write cannot land in CGRAM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GlyphSlotOutOfRange`] for slots past 7.
    pub fn create_char<D: DelayNs>(
        &mut self,
        slot: u8,
        glyph: &[u8; GLYPH_ROWS as usize],
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.create_char_with(slot, |row| glyph[usize::from(row)], delay)
    }

    /// Load a custom glyph, pulling each row through a read primitive
    ///
    /// For bitmaps held in memory the driver cannot slice directly
    /// (program memory, EEPROM, generated on the fly). Otherwise
    /// identical to [`create_char`](Self::create_char).
    pub fn create_char_with<D: DelayNs, F>(
        &mut self,
        slot: u8,
        mut read: F,
        delay: &mut D,
    ) -> DisplayResult<I>
    where
        F: FnMut(u8) -> u8,
    {
        if slot >= GLYPH_SLOTS {
            return Err(Error::GlyphSlotOutOfRange { slot });
        }
        self.command(SET_CGRAM_ADDR | (slot << 3), delay)?;
        for row in 0..GLYPH_ROWS {
            // bits 7..5 are not pixels; keep them zero
            self.data(read(row) & 0x1F, delay)?;
        }
        let (col, row) = (self.col, self.row);
        self.set_cursor(col, row, delay)
    }

    /// Substitute a CGRAM glyph slot for a byte code during writes
    ///
    /// After `map_glyph(0xE4, 3)`, writing byte 0xE4 renders glyph slot
    /// 3 instead. One code per slot; remapping a slot replaces its code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GlyphSlotOutOfRange`] for slots past 7.
    pub fn map_glyph(&mut self, code: u8, slot: u8) -> DisplayResult<I> {
        if slot >= GLYPH_SLOTS {
            return Err(Error::GlyphSlotOutOfRange { slot });
        }
        self.glyph_map[usize::from(slot)] = Some(code);
        Ok(())
    }

    /// Remove a byte code from the glyph translation table
    pub fn unmap_glyph(&mut self, code: u8) {
        for entry in &mut self.glyph_map {
            if *entry == Some(code) {
                *entry = None;
            }
        }
    }

    /// Display geometry
    pub fn geometry(&self) -> &Geometry {
        &self.config.geometry
    }

    /// Borrow the underlying transport
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Mutably borrow the underlying transport
    ///
    /// Mostly needed for testing and for transport-level reconfiguration.
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn update_display_control<D: DelayNs>(
        &mut self,
        flag: u8,
        on: bool,
        delay: &mut D,
    ) -> DisplayResult<I> {
        if on {
            self.display_control |= flag;
        } else {
            self.display_control &= !flag;
        }
        self.command(DISPLAY_CONTROL | self.display_control, delay)
    }

    fn update_entry_mode<D: DelayNs>(
        &mut self,
        flag: u8,
        on: bool,
        delay: &mut D,
    ) -> DisplayResult<I> {
        if on {
            self.entry_mode |= flag;
        } else {
            self.entry_mode &= !flag;
        }
        self.command(ENTRY_MODE_SET | self.entry_mode, delay)
    }

    /// Render one cell and advance the cursor
    fn put_cell<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> DisplayResult<I> {
        let byte = self.translate_glyph(byte);
        self.data(byte, delay)?;

        let Geometry { cols, rows, .. } = self.config.geometry;
        let mut col = self.col + 1;
        let mut row = self.row;
        if col >= cols {
            col = 0;
            row += 1;
            if row >= rows {
                row = 0;
            }
        }
        // re-address after every write; with no read-back this is the
        // only way shadow and hardware stay in lockstep
        self.set_cursor(col, row, delay)
    }

    fn backspace<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let Geometry { cols, rows, .. } = self.config.geometry;
        let (col, row) = if self.col > 0 {
            (self.col - 1, self.row)
        } else if self.row > 0 {
            (cols - 1, self.row - 1)
        } else {
            (cols - 1, rows - 1)
        };
        self.set_cursor(col, row, delay)?;
        self.data(b' ', delay)?;
        // stay on the erased cell
        self.set_cursor(col, row, delay)
    }

    fn tab<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        loop {
            self.put_cell(b' ', delay)?;
            if self.col % TAB_STOP == 0 {
                break;
            }
        }
        Ok(())
    }

    fn line_feed<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let col = self.col;
        let row = (self.row + 1) % self.config.geometry.rows;
        self.set_cursor(col, row, delay)
    }

    fn translate_glyph(&self, byte: u8) -> u8 {
        for (slot, mapped) in self.glyph_map.iter().enumerate() {
            if *mapped == Some(byte) {
                return slot as u8;
            }
        }
        byte
    }

    /// Send a command byte and wait out the instruction time
    fn command<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> DisplayResult<I> {
        self.interface
            .send(byte, Register::Command, delay)
            .map_err(Error::Interface)?;
        delay.delay_us(EXECUTE_DELAY_US);
        Ok(())
    }

    /// Send a data byte and wait out the instruction time
    fn data<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> DisplayResult<I> {
        self.interface
            .send(byte, Register::Data, delay)
            .map_err(Error::Interface)?;
        delay.delay_us(EXECUTE_DELAY_US);
        Ok(())
    }
}

/// Short-lived [`core::fmt::Write`] adapter over a display and a delay
///
/// Created by [`Display::writer`]; lets `write!`/`writeln!` print to the
/// glass without the display owning a delay provider.
pub struct Writer<'a, I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    display: &'a mut Display<I>,
    delay: &'a mut D,
}

impl<I, D> core::fmt::Write for Writer<'_, I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        match self.display.write_str(s, self.delay) {
            Ok(_) => Ok(()),
            Err(_) => Err(core::fmt::Error),
        }
    }
}
