//! Parallel bus transports
//!
//! [`Parallel8`] drives the full 8-line data bus with one enable pulse per
//! byte. [`Parallel4`] drives the upper four data lines (D4-D7 on the
//! module) and splits every byte into two nibble transfers, high nibble
//! first, each with its own enable pulse. The order is fixed by the
//! HD44780 4-bit protocol and must not be swapped.
//!
//! Both transports keep the read/write line (when wired) parked in the
//! read state between transfers and drop it to write only around the
//! enable pulse, so a shared bus is never driven against the controller.
//! Without a read/write line the controller is permanently strapped to
//! write and all transfers are blind.
//!
//! Data lines map LSB-first: `d0` carries bit 0 of the byte (`d4` carries
//! bit 0 of each nibble on the 4-bit bus).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::command::{BUS_SETTLE_NS, ENABLE_PULSE_NS};
use crate::interface::{BusWidth, DisplayInterface, InterfaceError, NoPin, Register, pin_err};

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), InterfaceError> {
    if high {
        pin.set_high().map_err(pin_err)
    } else {
        pin.set_low().map_err(pin_err)
    }
}

/// 8-bit parallel transport
///
/// ## Type parameters
///
/// * `RS` - register-select pin
/// * `RW` - read/write pin ([`NoPin`] when not wired)
/// * `EN` - enable (latch) pin
/// * `D0`..`D7` - data bus pins, LSB first
pub struct Parallel8<RS, RW, EN, D0, D1, D2, D3, D4, D5, D6, D7> {
    rs: RS,
    rw: Option<RW>,
    enable: EN,
    bus: (D0, D1, D2, D3, D4, D5, D6, D7),
}

impl<RS, EN, D0, D1, D2, D3, D4, D5, D6, D7>
    Parallel8<RS, NoPin, EN, D0, D1, D2, D3, D4, D5, D6, D7>
where
    RS: OutputPin,
    EN: OutputPin,
    D0: OutputPin,
    D1: OutputPin,
    D2: OutputPin,
    D3: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    /// Create an 8-bit transport without a read/write line
    ///
    /// The controller's R/W pin must be strapped to ground (write).
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rs: RS,
        enable: EN,
        d0: D0,
        d1: D1,
        d2: D2,
        d3: D3,
        d4: D4,
        d5: D5,
        d6: D6,
        d7: D7,
    ) -> Result<Self, InterfaceError> {
        Self::init(rs, None, enable, (d0, d1, d2, d3, d4, d5, d6, d7))
    }
}

impl<RS, RW, EN, D0, D1, D2, D3, D4, D5, D6, D7>
    Parallel8<RS, RW, EN, D0, D1, D2, D3, D4, D5, D6, D7>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D0: OutputPin,
    D1: OutputPin,
    D2: OutputPin,
    D3: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    /// Create an 8-bit transport with an actively driven read/write line
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rw(
        rs: RS,
        rw: RW,
        enable: EN,
        d0: D0,
        d1: D1,
        d2: D2,
        d3: D3,
        d4: D4,
        d5: D5,
        d6: D6,
        d7: D7,
    ) -> Result<Self, InterfaceError> {
        Self::init(rs, Some(rw), enable, (d0, d1, d2, d3, d4, d5, d6, d7))
    }

    fn init(
        mut rs: RS,
        mut rw: Option<RW>,
        mut enable: EN,
        bus: (D0, D1, D2, D3, D4, D5, D6, D7),
    ) -> Result<Self, InterfaceError> {
        rs.set_low().map_err(pin_err)?;
        enable.set_low().map_err(pin_err)?;
        if let Some(rw) = rw.as_mut() {
            // park at read until the first transfer
            rw.set_high().map_err(pin_err)?;
        }
        Ok(Self {
            rs,
            rw,
            enable,
            bus,
        })
    }

    fn drive_bus(&mut self, value: u8) -> Result<(), InterfaceError> {
        set_level(&mut self.bus.0, value & 0x01 != 0)?;
        set_level(&mut self.bus.1, value & 0x02 != 0)?;
        set_level(&mut self.bus.2, value & 0x04 != 0)?;
        set_level(&mut self.bus.3, value & 0x08 != 0)?;
        set_level(&mut self.bus.4, value & 0x10 != 0)?;
        set_level(&mut self.bus.5, value & 0x20 != 0)?;
        set_level(&mut self.bus.6, value & 0x40 != 0)?;
        set_level(&mut self.bus.7, value & 0x80 != 0)?;
        Ok(())
    }

    fn latch<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), InterfaceError> {
        delay.delay_ns(BUS_SETTLE_NS);
        self.enable.set_high().map_err(pin_err)?;
        delay.delay_ns(ENABLE_PULSE_NS);
        self.enable.set_low().map_err(pin_err)?;
        delay.delay_ns(BUS_SETTLE_NS);
        Ok(())
    }

    fn transfer<D: DelayNs>(
        &mut self,
        byte: u8,
        register: Register,
        delay: &mut D,
    ) -> Result<(), InterfaceError> {
        set_level(&mut self.rs, register == Register::Data)?;
        if let Some(rw) = self.rw.as_mut() {
            rw.set_low().map_err(pin_err)?;
        }
        self.drive_bus(byte)?;
        self.latch(delay)?;
        if let Some(rw) = self.rw.as_mut() {
            rw.set_high().map_err(pin_err)?;
        }
        Ok(())
    }
}

impl<RS, RW, EN, D0, D1, D2, D3, D4, D5, D6, D7> DisplayInterface
    for Parallel8<RS, RW, EN, D0, D1, D2, D3, D4, D5, D6, D7>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D0: OutputPin,
    D1: OutputPin,
    D2: OutputPin,
    D3: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    type Error = InterfaceError;

    const BUS_WIDTH: BusWidth = BusWidth::Eight;

    fn send<D: DelayNs>(
        &mut self,
        byte: u8,
        register: Register,
        delay: &mut D,
    ) -> Result<(), Self::Error> {
        self.transfer(byte, register, delay)
    }

    fn send_sync<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), Self::Error> {
        // an 8-bit bus is already single-transfer framed
        self.transfer(byte, Register::Command, delay)
    }

    fn hardware_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// 4-bit parallel transport
///
/// Uses the module's upper data lines D4-D7. Every byte is delivered as
/// two transfers, high nibble then low nibble.
///
/// ## Type parameters
///
/// * `RS` - register-select pin
/// * `RW` - read/write pin ([`NoPin`] when not wired)
/// * `EN` - enable (latch) pin
/// * `D4`..`D7` - data bus pins, nibble LSB first
pub struct Parallel4<RS, RW, EN, D4, D5, D6, D7> {
    rs: RS,
    rw: Option<RW>,
    enable: EN,
    bus: (D4, D5, D6, D7),
}

impl<RS, EN, D4, D5, D6, D7> Parallel4<RS, NoPin, EN, D4, D5, D6, D7>
where
    RS: OutputPin,
    EN: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    /// Create a 4-bit transport without a read/write line
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    pub fn new(
        rs: RS,
        enable: EN,
        d4: D4,
        d5: D5,
        d6: D6,
        d7: D7,
    ) -> Result<Self, InterfaceError> {
        Self::init(rs, None, enable, (d4, d5, d6, d7))
    }
}

impl<RS, RW, EN, D4, D5, D6, D7> Parallel4<RS, RW, EN, D4, D5, D6, D7>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    /// Create a 4-bit transport with an actively driven read/write line
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rw(
        rs: RS,
        rw: RW,
        enable: EN,
        d4: D4,
        d5: D5,
        d6: D6,
        d7: D7,
    ) -> Result<Self, InterfaceError> {
        Self::init(rs, Some(rw), enable, (d4, d5, d6, d7))
    }

    fn init(
        mut rs: RS,
        mut rw: Option<RW>,
        mut enable: EN,
        bus: (D4, D5, D6, D7),
    ) -> Result<Self, InterfaceError> {
        rs.set_low().map_err(pin_err)?;
        enable.set_low().map_err(pin_err)?;
        if let Some(rw) = rw.as_mut() {
            rw.set_high().map_err(pin_err)?;
        }
        Ok(Self {
            rs,
            rw,
            enable,
            bus,
        })
    }

    fn drive_bus(&mut self, nibble: u8) -> Result<(), InterfaceError> {
        set_level(&mut self.bus.0, nibble & 0x01 != 0)?;
        set_level(&mut self.bus.1, nibble & 0x02 != 0)?;
        set_level(&mut self.bus.2, nibble & 0x04 != 0)?;
        set_level(&mut self.bus.3, nibble & 0x08 != 0)?;
        Ok(())
    }

    fn latch<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), InterfaceError> {
        delay.delay_ns(BUS_SETTLE_NS);
        self.enable.set_high().map_err(pin_err)?;
        delay.delay_ns(ENABLE_PULSE_NS);
        self.enable.set_low().map_err(pin_err)?;
        delay.delay_ns(BUS_SETTLE_NS);
        Ok(())
    }

    fn write_begin(&mut self, register: Register) -> Result<(), InterfaceError> {
        set_level(&mut self.rs, register == Register::Data)?;
        if let Some(rw) = self.rw.as_mut() {
            rw.set_low().map_err(pin_err)?;
        }
        Ok(())
    }

    fn write_end(&mut self) -> Result<(), InterfaceError> {
        if let Some(rw) = self.rw.as_mut() {
            rw.set_high().map_err(pin_err)?;
        }
        Ok(())
    }
}

impl<RS, RW, EN, D4, D5, D6, D7> DisplayInterface for Parallel4<RS, RW, EN, D4, D5, D6, D7>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
{
    type Error = InterfaceError;

    const BUS_WIDTH: BusWidth = BusWidth::Four;

    fn send<D: DelayNs>(
        &mut self,
        byte: u8,
        register: Register,
        delay: &mut D,
    ) -> Result<(), Self::Error> {
        self.write_begin(register)?;
        // high nibble first; fixed protocol order
        self.drive_bus(byte >> 4)?;
        self.latch(delay)?;
        self.drive_bus(byte & 0x0F)?;
        self.latch(delay)?;
        self.write_end()
    }

    fn send_sync<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), Self::Error> {
        // 8-bit framing on a 4-bit bus: one lone pulse carrying the high
        // nibble, the controller treats it as a complete transfer
        self.write_begin(Register::Command)?;
        self.drive_bus(byte >> 4)?;
        self.latch(delay)?;
        self.write_end()
    }

    fn hardware_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
        Ok(())
    }
}
