//! Display interface using SPI
//!
//! [`PanelTransport`] is the capability the controller drives: command and data
//! frames, the control lines and the delay provider. [`SpiInterface`] is the
//! `embedded-hal` implementation for a 4-wire bus with explicit chip-select.
use core::convert::Infallible;

use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin, PinState},
    spi::SpiBus,
};

/// Control lines of the panel connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Hardware reset, active low
    Reset,
    /// Driven high by the panel while it is working
    Busy,
    /// Chip select, active low
    ChipSelect,
    /// Data/Command Control Pin (High for data, Low for command)
    DataCommand,
}

/// Direction of a control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Sensed by the host
    Input,
    /// Driven by the host
    Output,
}

/// Bus and line access needed to drive a panel.
///
/// Delays belong to the transport so that every suspension point is ordered
/// with the bus traffic around it.
pub trait PanelTransport {
    /// Send `command` followed by `payload` as data.
    ///
    /// Returns the byte clocked in while the command byte went out. Chip-select
    /// stays asserted when `keep_selected` is set, so more data can follow with
    /// [`PanelTransport::send_data`].
    fn send_command(
        &mut self,
        command: u8,
        payload: &[u8],
        keep_selected: bool,
    ) -> Result<u8, DisplayError>;

    /// Stream data into the open transaction.
    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    /// Close the open transaction and release chip-select.
    fn end_transaction(&mut self) -> Result<(), DisplayError>;

    /// Read one data byte from the bus.
    fn read_byte(&mut self) -> Result<u8, DisplayError>;

    /// Whether `line` is wired. Chip-select and data/command always are.
    fn has_line(&self, line: Line) -> bool;

    /// Drive `line` to `level`.
    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), DisplayError>;

    /// Sample `line`.
    fn get_line(&mut self, line: Line) -> Result<PinState, DisplayError>;

    /// Switch the direction of `line`.
    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> Result<(), DisplayError>;

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Placeholder for a line that is not connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// The connection interface of the Spectra COG panels
pub struct SpiInterface<SPI, CS, DC, RST, BUSY, DELAY> {
    /// SPI bus, chip-select is handled here and not by the bus
    spi: SPI,
    /// Chip select, low while a transaction is open
    cs: CS,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: Option<RST>,
    /// High for busy, Wait until display is ready!
    busy: Option<BUSY>,
    delay: DELAY,
}

impl<SPI, CS, DC, DELAY> SpiInterface<SPI, CS, DC, NoPin, NoPin, DELAY> {
    /// Interface without reset and busy lines
    pub fn new(spi: SPI, cs: CS, dc: DC, delay: DELAY) -> Self {
        SpiInterface {
            spi,
            cs,
            dc,
            rst: None,
            busy: None,
            delay,
        }
    }
}

impl<SPI, CS, DC, RST, BUSY, DELAY> SpiInterface<SPI, CS, DC, RST, BUSY, DELAY> {
    /// Attach the reset line
    pub fn with_reset<R>(self, rst: R) -> SpiInterface<SPI, CS, DC, R, BUSY, DELAY> {
        SpiInterface {
            spi: self.spi,
            cs: self.cs,
            dc: self.dc,
            rst: Some(rst),
            busy: self.busy,
            delay: self.delay,
        }
    }

    /// Attach the busy line
    pub fn with_busy<B>(self, busy: B) -> SpiInterface<SPI, CS, DC, RST, B, DELAY> {
        SpiInterface {
            spi: self.spi,
            cs: self.cs,
            dc: self.dc,
            rst: self.rst,
            busy: Some(busy),
            delay: self.delay,
        }
    }

    /// Give back the bus, the pins and the delay provider
    #[allow(clippy::type_complexity)]
    pub fn release(self) -> (SPI, CS, DC, Option<RST>, Option<BUSY>, DELAY) {
        (self.spi, self.cs, self.dc, self.rst, self.busy, self.delay)
    }
}

impl<SPI, CS, DC, RST, BUSY, DELAY> SpiInterface<SPI, CS, DC, RST, BUSY, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Basic function for sending an array of u8-values over spi
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        match self.spi.write(bytes) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for {} bytes: {:?}", bytes.len(), e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    /// Clock out one byte and return the byte read back at the same time
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, DisplayError> {
        let mut frame = [byte];
        match self.spi.transfer_in_place(&mut frame) {
            Ok(_) => Ok(frame[0]),
            Err(e) => {
                log::error!("SPI transfer error for 0x{:02X}: {:?}", byte, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }
}

impl<SPI, CS, DC, RST, BUSY, DELAY> PanelTransport for SpiInterface<SPI, CS, DC, RST, BUSY, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    fn send_command(
        &mut self,
        command: u8,
        payload: &[u8],
        keep_selected: bool,
    ) -> Result<u8, DisplayError> {
        self.select()?;

        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        let status = self.transfer_byte(command)?;

        if !payload.is_empty() {
            self.dc.set_high().map_err(|_| DisplayError::DCError)?;
            self.write(payload)?;
        }

        if !keep_selected {
            self.end_transaction()?;
        }
        Ok(status)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.write(data)
    }

    fn end_transaction(&mut self) -> Result<(), DisplayError> {
        self.spi.flush().map_err(|_| DisplayError::BusWriteError)?;
        self.cs.set_high().map_err(|_| DisplayError::CSError)
    }

    fn read_byte(&mut self) -> Result<u8, DisplayError> {
        self.select()?;
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;

        let mut buffer = [0u8; 1];
        self.spi
            .read(&mut buffer)
            .map_err(|_| DisplayError::BusWriteError)?;

        self.end_transaction()?;
        Ok(buffer[0])
    }

    fn has_line(&self, line: Line) -> bool {
        match line {
            Line::Reset => self.rst.is_some(),
            Line::Busy => self.busy.is_some(),
            Line::ChipSelect | Line::DataCommand => true,
        }
    }

    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), DisplayError> {
        match line {
            Line::Reset => match self.rst.as_mut() {
                Some(rst) => rst.set_state(level).map_err(|_| DisplayError::RSError),
                None => Err(DisplayError::RSError),
            },
            Line::ChipSelect => self.cs.set_state(level).map_err(|_| DisplayError::CSError),
            Line::DataCommand => self.dc.set_state(level).map_err(|_| DisplayError::DCError),
            Line::Busy => {
                // embedded-hal input pins cannot be driven
                log::trace!("Ignoring drive of the busy line to {:?}", level);
                Ok(())
            }
        }
    }

    fn get_line(&mut self, line: Line) -> Result<PinState, DisplayError> {
        match (line, self.busy.as_mut()) {
            // DisplayError has no busy variant, report as DCError
            (Line::Busy, Some(busy)) => busy
                .is_high()
                .map(PinState::from)
                .map_err(|_| DisplayError::DCError),
            (Line::Busy, None) => Err(DisplayError::DCError),
            // Output-only lines cannot be sampled
            _ => Err(DisplayError::InvalidFormatError),
        }
    }

    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> Result<(), DisplayError> {
        // Pin direction is fixed by the embedded-hal types
        log::trace!("Line {:?} stays in its wired direction ({:?} requested)", line, mode);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
