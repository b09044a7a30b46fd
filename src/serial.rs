//! Bit-banged synchronous serial transport
//!
//! Drives Noritake CUU-class VFD modules over their SPI-like serial
//! interface: a strobe (chip-select), a clock, and a shared data line.
//! Every transfer is two bytes inside one strobe window: a header whose
//! sync bits, read/write bit and register-select bit frame the operation,
//! then the payload. Bits shift MSB-first; the module samples the data
//! line on the clock's rising edge.
//!
//! The header is rebuilt for every transfer (the host keeps no committed
//! serial register state), and the read/write bit always signals a write:
//! embedded-hal 1.0 has no bidirectional-pin abstraction, and the link is
//! used write-only in this wiring. The controller reports as an 8-bit bus
//! in the function-set register.
//!
//! Some modules expose a hardware reset line behind a jumper; wire it via
//! [`Serial::with_reset`] and the driver will pulse it during `begin`.
//! The software reset handshake still runs either way.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::command::{HEAD_DATA, RESET_PULSE_US, SERIAL_HALF_PERIOD_NS, SYNC_HEAD};
use crate::interface::{BusWidth, DisplayInterface, InterfaceError, NoPin, Register, pin_err};

/// Synchronous serial transport
///
/// ## Type parameters
///
/// * `SCK` - serial clock pin
/// * `STB` - strobe (chip-select, active low) pin
/// * `SIO` - serial data pin
/// * `RST` - hardware reset pin ([`NoPin`] when not wired)
pub struct Serial<SCK, STB, SIO, RST> {
    sck: SCK,
    stb: STB,
    sio: SIO,
    reset: Option<RST>,
}

impl<SCK, STB, SIO> Serial<SCK, STB, SIO, NoPin>
where
    SCK: OutputPin,
    STB: OutputPin,
    SIO: OutputPin,
{
    /// Create a serial transport without a hardware reset line
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    pub fn new(sck: SCK, stb: STB, sio: SIO) -> Result<Self, InterfaceError> {
        Self::init(sck, stb, sio, None)
    }
}

impl<SCK, STB, SIO, RST> Serial<SCK, STB, SIO, RST>
where
    SCK: OutputPin,
    STB: OutputPin,
    SIO: OutputPin,
    RST: OutputPin,
{
    /// Create a serial transport with a wired hardware reset line
    ///
    /// # Errors
    ///
    /// Returns an error if establishing the idle line states fails.
    pub fn with_reset(sck: SCK, stb: STB, sio: SIO, reset: RST) -> Result<Self, InterfaceError> {
        Self::init(sck, stb, sio, Some(reset))
    }

    fn init(
        mut sck: SCK,
        mut stb: STB,
        mut sio: SIO,
        mut reset: Option<RST>,
    ) -> Result<Self, InterfaceError> {
        // idle: clock high, strobe de-asserted, data released high
        sck.set_high().map_err(pin_err)?;
        stb.set_high().map_err(pin_err)?;
        sio.set_high().map_err(pin_err)?;
        if let Some(reset) = reset.as_mut() {
            reset.set_high().map_err(pin_err)?;
        }
        Ok(Self {
            sck,
            stb,
            sio,
            reset,
        })
    }

    fn shift_out<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), InterfaceError> {
        for bit in (0..8).rev() {
            self.sck.set_low().map_err(pin_err)?;
            if byte & (1 << bit) != 0 {
                self.sio.set_high().map_err(pin_err)?;
            } else {
                self.sio.set_low().map_err(pin_err)?;
            }
            delay.delay_ns(SERIAL_HALF_PERIOD_NS);
            // rising edge: the module samples here
            self.sck.set_high().map_err(pin_err)?;
            delay.delay_ns(SERIAL_HALF_PERIOD_NS);
        }
        Ok(())
    }

    fn transfer<D: DelayNs>(
        &mut self,
        byte: u8,
        register: Register,
        delay: &mut D,
    ) -> Result<(), InterfaceError> {
        // header rebuilt per transfer: sync bits, r/w clear (write),
        // register-select per tag
        let mut header = SYNC_HEAD;
        if register == Register::Data {
            header |= HEAD_DATA;
        }

        self.stb.set_low().map_err(pin_err)?;
        delay.delay_ns(SERIAL_HALF_PERIOD_NS);
        self.shift_out(header, delay)?;
        self.shift_out(byte, delay)?;
        self.stb.set_high().map_err(pin_err)?;
        delay.delay_ns(SERIAL_HALF_PERIOD_NS);
        Ok(())
    }
}

impl<SCK, STB, SIO, RST> DisplayInterface for Serial<SCK, STB, SIO, RST>
where
    SCK: OutputPin,
    STB: OutputPin,
    SIO: OutputPin,
    RST: OutputPin,
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
        // serial transfers are always byte-framed
        self.transfer(byte, Register::Command, delay)
    }

    fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        if let Some(reset) = self.reset.as_mut() {
            reset.set_low().map_err(pin_err)?;
            delay.delay_us(RESET_PULSE_US);
            reset.set_high().map_err(pin_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::HEAD_READ;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::convert::Infallible;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Event {
        line: &'static str,
        high: bool,
    }

    #[derive(Clone)]
    struct LogPin {
        line: &'static str,
        log: Rc<RefCell<Vec<Event>>>,
    }

    impl LogPin {
        fn new(line: &'static str, log: &Rc<RefCell<Vec<Event>>>) -> Self {
            Self {
                line,
                log: Rc::clone(log),
            }
        }
    }

    impl embedded_hal::digital::ErrorType for LogPin {
        type Error = Infallible;
    }

    impl OutputPin for LogPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(Event {
                line: self.line,
                high: false,
            });
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(Event {
                line: self.line,
                high: true,
            });
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Sample the data line at every clock rising edge inside a strobe
    /// window and fold the samples into bytes, MSB first.
    fn shifted_bytes(log: &[Event]) -> Vec<u8> {
        let mut sio = false;
        let mut selected = false;
        let mut bits = Vec::new();
        for event in log {
            match event.line {
                "sio" => sio = event.high,
                "stb" => selected = !event.high,
                "sck" if event.high && selected => bits.push(sio),
                _ => {}
            }
        }
        bits.chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |byte, bit| (byte << 1) | u8::from(*bit)))
            .collect()
    }

    fn serial(log: &Rc<RefCell<Vec<Event>>>) -> Serial<LogPin, LogPin, LogPin, NoPin> {
        Serial::new(
            LogPin::new("sck", log),
            LogPin::new("stb", log),
            LogPin::new("sio", log),
        )
        .unwrap()
    }

    #[test]
    fn test_header_register_bit_tracks_tag() {
        let mut delay = MockDelay;
        for (register, expect_data_bit) in [(Register::Command, false), (Register::Data, true)] {
            let log = Rc::new(RefCell::new(Vec::new()));
            let mut interface = serial(&log);
            interface.send(0x00, register, &mut delay).unwrap();

            let bytes = shifted_bytes(&log.borrow());
            assert_eq!(bytes.len(), 2);
            let header = bytes[0];
            assert_eq!(header & SYNC_HEAD, SYNC_HEAD);
            assert_eq!(header & HEAD_DATA != 0, expect_data_bit);
        }
    }

    #[test]
    fn test_header_always_signals_write() {
        let mut delay = MockDelay;
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut interface = serial(&log);

        // independent of prior call history
        interface.send(0xAA, Register::Data, &mut delay).unwrap();
        interface.send(0x55, Register::Command, &mut delay).unwrap();
        interface.send(0xFF, Register::Data, &mut delay).unwrap();

        let bytes = shifted_bytes(&log.borrow());
        assert_eq!(bytes.len(), 6);
        for header in [bytes[0], bytes[2], bytes[4]] {
            assert_eq!(header & HEAD_READ, 0);
        }
    }

    #[test]
    fn test_payload_shifts_msb_first() {
        let mut delay = MockDelay;
        for value in [0x00u8, 0x01, 0x80, 0xA5, 0xFF] {
            let log = Rc::new(RefCell::new(Vec::new()));
            let mut interface = serial(&log);
            interface.send(value, Register::Data, &mut delay).unwrap();

            let bytes = shifted_bytes(&log.borrow());
            assert_eq!(bytes[1], value);
        }
    }

    #[test]
    fn test_strobe_frames_each_transfer() {
        let mut delay = MockDelay;
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut interface = serial(&log);
        interface.send(0x42, Register::Command, &mut delay).unwrap();

        let events = log.borrow();
        let strobes: Vec<bool> = events
            .iter()
            .filter(|event| event.line == "stb")
            .map(|event| event.high)
            .collect();
        // idle high from construction, low for the transfer, high after
        assert_eq!(strobes, &[true, false, true]);
    }

    #[test]
    fn test_hardware_reset_pulses_wired_line() {
        let mut delay = MockDelay;
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut interface = Serial::with_reset(
            LogPin::new("sck", &log),
            LogPin::new("stb", &log),
            LogPin::new("sio", &log),
            LogPin::new("rst", &log),
        )
        .unwrap();
        interface.hardware_reset(&mut delay).unwrap();

        let events = log.borrow();
        let resets: Vec<bool> = events
            .iter()
            .filter(|event| event.line == "rst")
            .map(|event| event.high)
            .collect();
        assert_eq!(resets, &[true, false, true]);
    }

    #[test]
    fn test_hardware_reset_without_line_is_noop() {
        let mut delay = MockDelay;
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut interface = serial(&log);
        let before = log.borrow().len();
        interface.hardware_reset(&mut delay).unwrap();
        assert_eq!(log.borrow().len(), before);
    }
}
