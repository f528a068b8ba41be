//! Spectra COG panel controller
//!
//! Drives one panel through its whole life cycle:
//!
//! 1. [`PanelController::power_up`] - hardware reset, soft reset, temperature
//!    and panel settings
//! 1. [`PanelController::write_plane`] - black plane, then color plane
//! 1. [`PanelController::update`] - DC/DC on, refresh, then
//!    [`PanelController::power_down`]
//!
//! [`PanelController::show`] runs all of the above in order.
//!
//! ## Busy line
//!
//! The COG holds BUSY high while it works. Without a busy line every wait
//! becomes a fixed 500 ms sleep. With one, the line is polled every 10 ms and,
//! under the default [`BusyWait::Indefinite`] policy, a panel that never
//! clears BUSY blocks the caller forever.
//!
//! ## Refresh rate
//!
//! Do not refresh more often than [`MIN_REFRESH_INTERVAL_S`]. The driver has
//! no clock and leaves this to the caller.
//!
//! [`MIN_REFRESH_INTERVAL_S`]: crate::MIN_REFRESH_INTERVAL_S

use embedded_hal::digital::PinState;

use crate::spectra::cmd::Cmd;
use crate::spectra::config::{Geometry, PanelConfig};
use crate::spectra::error::{DisplayError, Error};
use crate::spectra::flag::Flag;
use crate::spectra::interface::{Line, LineMode, PanelTransport};
use crate::spectra::plane::{BitPlane, Plane, RamCommandMapping};
use crate::spectra::timing::{
    BusyWait, BUSY_FALLBACK_MS, BUSY_POLL_INTERVAL_MS, POWER_DOWN_SETTLE_MS, RESET_PULSE,
};

/// Bytes complemented on the stack per transfer when a plane is inverted
const CHUNK_SIZE: usize = 32;

/// Where the controller is in its power cycle.
///
/// After a failed operation the state is left at the step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Unpowered or not yet initialised
    Off,
    /// Hardware and soft reset in progress
    Resetting,
    /// Temperature and panel settings being sent
    Configuring,
    /// Ready to accept RAM writes
    Writing,
    /// DC/DC on and refresh running
    Refreshing,
    /// DC/DC off and lines being released
    PoweringDown,
}

/// Spectra ePaper panel controller
///
/// Owns the transport and both bit planes. One controller per physical panel;
/// there is no internal locking, callers serialise access.
///
/// ## Type Parameters
///
/// - `T` - the [`PanelTransport`] the panel is connected through
pub struct PanelController<T> {
    transport: T,
    geometry: Geometry,
    mapping: RamCommandMapping,
    black: BitPlane,
    color: BitPlane,
    busy_wait: BusyWait,
    /// Busy line level meaning "busy"
    busy_level: PinState,
    state: PowerState,
}

impl<T> PanelController<T>
where
    T: PanelTransport,
{
    /// Create the controller and allocate both planes.
    ///
    /// No bus activity happens until [`PanelController::power_up`].
    pub fn new(config: PanelConfig, transport: T) -> Result<Self, Error> {
        let geometry = config.geometry()?;
        let mapping = RamCommandMapping::resolve(&config);

        log::info!(
            "Spectra panel {}x{}, black -> 0x{:02X}, color -> 0x{:02X}",
            geometry.ram_width(),
            geometry.ram_height(),
            mapping.binding(Plane::Black).command,
            mapping.binding(Plane::Color).command
        );

        Ok(PanelController {
            transport,
            geometry,
            mapping,
            black: BitPlane::new(geometry, mapping.binding(Plane::Black)),
            color: BitPlane::new(geometry, mapping.binding(Plane::Color)),
            busy_wait: config.busy_wait,
            busy_level: PinState::from(config.busy_active_high),
            state: PowerState::Off,
        })
    }

    /// Bring the panel from unknown state to ready for RAM writes.
    pub fn power_up(&mut self) -> Result<(), Error> {
        log::info!("Powering up COG driver");
        self.state = PowerState::Resetting;

        if self.transport.has_line(Line::Busy) {
            self.transport.set_line_mode(Line::Busy, LineMode::Input)?;
        }

        self.transport.set_line(Line::DataCommand, PinState::High)?;
        self.transport.set_line(Line::ChipSelect, PinState::High)?;

        if self.transport.has_line(Line::Reset) {
            self.hardware_reset()?;
        } else {
            log::debug!("No reset line, relying on soft reset");
        }

        self.command(Cmd::SOFT_RESET, &[Flag::SOFT_RESET])?;
        self.wait_until_idle()?;

        self.state = PowerState::Configuring;
        self.command(Cmd::INPUT_TEMPERATURE, &[Flag::INPUT_TEMPERATURE_25C])?;
        self.command(Cmd::ACTIVE_TEMPERATURE, &[Flag::ACTIVE_TEMPERATURE])?;
        self.command(Cmd::PANEL_SETTINGS, &Flag::PANEL_SETTINGS)?;

        self.state = PowerState::Writing;
        Ok(())
    }

    /// Send one plane to its RAM bank.
    ///
    /// Inversion is applied on the wire; the plane itself is left untouched.
    pub fn write_plane(&mut self, plane: Plane) -> Result<(), Error> {
        if self.state != PowerState::Writing {
            log::warn!("Writing {:?} plane while {:?}", plane, self.state);
        }

        let buffer = match plane {
            Plane::Black => &self.black,
            Plane::Color => &self.color,
        };

        log::debug!(
            "Writing {:?} plane, {} bytes to RAM 0x{:02X}{}",
            plane,
            buffer.len(),
            buffer.ram_command(),
            if buffer.inverted() { " (inverted)" } else { "" }
        );

        stream_plane(&mut self.transport, buffer).map_err(|e| {
            log::error!("Failed writing {:?} plane: {:?}", plane, e);
            Error::Transport(e)
        })
    }

    /// [`PanelController::write_plane`] for callers holding a plane index.
    pub fn write_plane_index(&mut self, index: u8) -> Result<(), Error> {
        let plane = Plane::try_from(index)?;
        self.write_plane(plane)
    }

    /// Set the RAM address counter.
    ///
    /// The Spectra COG always writes whole frames, so this does nothing. It
    /// still succeeds so that generic callers can issue it unconditionally.
    pub fn set_ram_address(&mut self, x: u16, y: u16) -> Result<(), Error> {
        log::trace!("RAM address ({}, {}) ignored", x, y);
        Ok(())
    }

    /// Block until the panel is ready for the next command.
    pub fn wait_until_idle(&mut self) -> Result<(), Error> {
        if !self.transport.has_line(Line::Busy) {
            log::trace!("No busy line, waiting {} ms", BUSY_FALLBACK_MS);
            self.transport.delay_ms(BUSY_FALLBACK_MS);
            return Ok(());
        }

        let mut waited_ms: u32 = 0;
        loop {
            if self.transport.get_line(Line::Busy)? != self.busy_level {
                log::trace!("Panel idle after {} ms", waited_ms);
                return Ok(());
            }
            if self.busy_wait.is_exhausted(waited_ms) {
                log::error!("Panel still busy after {} ms", waited_ms);
                return Err(Error::BusyTimeout { waited_ms });
            }
            self.transport.delay_ms(BUSY_POLL_INTERVAL_MS);
            waited_ms = waited_ms.saturating_add(BUSY_POLL_INTERVAL_MS);
        }
    }

    /// Refresh the panel from its RAM and power it down.
    ///
    /// Both planes must have been written since [`PanelController::power_up`].
    pub fn update(&mut self) -> Result<(), Error> {
        log::info!("Refreshing display");
        self.state = PowerState::Refreshing;

        self.command(Cmd::DCDC_POWER_ON, &[Flag::DCDC_POWER_ON])?;
        self.wait_until_idle()?;

        self.command(Cmd::DISPLAY_REFRESH, &[])?;
        self.wait_until_idle()?;

        self.power_down()
    }

    /// Switch the DC/DC converter off and release the control lines.
    pub fn power_down(&mut self) -> Result<(), Error> {
        log::info!("Powering down COG driver");
        self.state = PowerState::PoweringDown;

        self.command(Cmd::DCDC_POWER_OFF, &[Flag::DCDC_POWER_OFF])?;
        self.wait_until_idle()?;

        self.transport.set_line(Line::DataCommand, PinState::Low)?;
        self.transport.set_line(Line::ChipSelect, PinState::Low)?;

        if self.transport.has_line(Line::Busy) {
            self.transport.set_line_mode(Line::Busy, LineMode::Output)?;
            self.transport.set_line(Line::Busy, PinState::Low)?;
        }

        self.transport.delay_ms(POWER_DOWN_SETTLE_MS);

        if self.transport.has_line(Line::Reset) {
            self.transport.set_line(Line::Reset, PinState::Low)?;
        }

        self.state = PowerState::Off;
        Ok(())
    }

    /// Full display cycle: power up, write both planes, refresh, power down.
    pub fn show(&mut self) -> Result<(), Error> {
        self.power_up()?;
        self.write_plane(Plane::Black)?;
        self.write_plane(Plane::Color)?;
        self.update()
    }

    /// Current power state
    pub fn power_state(&self) -> PowerState {
        self.state
    }

    /// Validated geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The plane to RAM bank mapping chosen at construction
    pub fn ram_mapping(&self) -> RamCommandMapping {
        self.mapping
    }

    /// Read access to one plane
    pub fn plane(&self, plane: Plane) -> &BitPlane {
        match plane {
            Plane::Black => &self.black,
            Plane::Color => &self.color,
        }
    }

    /// Write access to one plane
    pub fn plane_mut(&mut self, plane: Plane) -> &mut BitPlane {
        match plane {
            Plane::Black => &mut self.black,
            Plane::Color => &mut self.color,
        }
    }

    /// Both planes at once, black first
    pub fn planes_mut(&mut self) -> (&mut BitPlane, &mut BitPlane) {
        (&mut self.black, &mut self.color)
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drop the controller and give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// Pulse the reset line: low 1 ms, high 5 ms, low 10 ms, high 5 ms.
    fn hardware_reset(&mut self) -> Result<(), Error> {
        log::debug!("Hardware reset");
        for (high, ms) in RESET_PULSE {
            self.transport.set_line(Line::Reset, PinState::from(high))?;
            self.transport.delay_ms(ms);
        }
        Ok(())
    }

    /// Basic function for sending a command and the data belonging to it.
    ///
    /// Returns the byte the COG clocked back during the command byte.
    fn command(&mut self, command: u8, payload: &[u8]) -> Result<u8, Error> {
        log::debug!("Command 0x{:02X} {:02X?}", command, payload);
        let status = self
            .transport
            .send_command(command, payload, false)
            .map_err(|e| {
                log::error!("Command 0x{:02X} failed: {:?}", command, e);
                Error::Transport(e)
            })?;
        log::trace!("Command 0x{:02X} read back 0x{:02X}", command, status);
        Ok(status)
    }
}

/// Send `plane` as the data of its RAM command in a single transaction.
fn stream_plane<T: PanelTransport>(transport: &mut T, plane: &BitPlane) -> Result<(), DisplayError> {
    transport.send_command(plane.ram_command(), &[], true)?;

    if plane.inverted() {
        let mut chunk = [0u8; CHUNK_SIZE];
        for block in plane.as_bytes().chunks(CHUNK_SIZE) {
            for (dst, src) in chunk.iter_mut().zip(block) {
                *dst = !src;
            }
            transport.send_data(&chunk[..block.len()])?;
        }
    } else {
        transport.send_data(plane.as_bytes())?;
    }

    transport.end_transaction()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectra::mock::{Event, Frame, RecordingTransport};
    use alloc::vec;

    fn controller(config: PanelConfig) -> PanelController<RecordingTransport> {
        PanelController::new(config, RecordingTransport::new()).unwrap()
    }

    #[test]
    fn new_is_silent_and_off() {
        let panel = controller(PanelConfig::new(16, 4));
        assert_eq!(panel.power_state(), PowerState::Off);
        assert!(panel.transport().events().is_empty());
        assert_eq!(panel.plane(Plane::Black).len(), 8);
        assert_eq!(panel.plane(Plane::Color).len(), 8);
    }

    #[test]
    fn new_rejects_bad_geometry() {
        let result = PanelController::new(PanelConfig::new(3, 3), RecordingTransport::new());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn power_up_ends_ready_for_writes() {
        let mut panel = controller(PanelConfig::new(16, 4));
        panel.power_up().unwrap();
        assert_eq!(panel.power_state(), PowerState::Writing);
    }

    #[test]
    fn inverted_plane_is_complemented_in_chunks() {
        let mut panel = controller(PanelConfig::new(40, 8));
        panel.plane_mut(Plane::Color).as_mut_bytes()[0] = 0x0F;
        panel.write_plane(Plane::Color).unwrap();

        let events = panel.transport().events();
        // 40 bytes: one full chunk and one of 8
        assert_eq!(events.len(), 4);
        match &events[1] {
            Event::Data(data) => {
                assert_eq!(data.len(), CHUNK_SIZE);
                assert_eq!(data[0], 0xF0);
                assert!(data[1..].iter().all(|&b| b == 0xFF));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(events[2], Event::Data(vec![0xFF; 8]));
        assert_eq!(events[3], Event::EndTransaction);

        // The plane itself still holds ink bits
        assert_eq!(panel.plane(Plane::Color).as_bytes()[0], 0x0F);
    }

    #[test]
    fn plain_plane_is_sent_as_is() {
        let mut panel = controller(PanelConfig::new(16, 1));
        panel.plane_mut(Plane::Black).as_mut_bytes()[1] = 0xA5;
        panel.write_plane(Plane::Black).unwrap();
        assert_eq!(
            panel.transport().frames(),
            vec![Frame::new(0x10, &[0x00, 0xA5])]
        );
    }

    #[test]
    fn write_plane_index_rejects_unknown_planes() {
        let mut panel = controller(PanelConfig::new(8, 1));
        assert!(matches!(panel.write_plane_index(2), Err(Error::InvalidPlane(2))));
        assert!(panel.transport().events().is_empty());

        panel.write_plane_index(1).unwrap();
        assert_eq!(panel.transport().frames(), vec![Frame::new(0x13, &[0xFF])]);
    }

    #[test]
    fn set_ram_address_is_a_no_op() {
        let mut panel = controller(PanelConfig::new(8, 8));
        for (x, y) in [(0, 0), (7, 7), (u16::MAX, u16::MAX)] {
            assert!(panel.set_ram_address(x, y).is_ok());
        }
        assert!(panel.transport().events().is_empty());
    }

    #[test]
    fn failure_stops_the_sequence() {
        let mut transport = RecordingTransport::new();
        transport.fail_on_command(Cmd::ACTIVE_TEMPERATURE);
        let mut panel = PanelController::new(PanelConfig::new(8, 8), transport).unwrap();

        assert!(matches!(
            panel.power_up(),
            Err(Error::Transport(DisplayError::BusWriteError))
        ));
        assert_eq!(panel.power_state(), PowerState::Configuring);

        // Panel settings never went out
        let frames = panel.transport().frames();
        assert_eq!(frames.last(), Some(&Frame::new(0xE5, &[0x19])));
    }

    #[test]
    fn data_failure_mid_plane_aborts_the_transfer() {
        let mut panel = controller(PanelConfig::new(40, 8));
        panel.plane_mut(Plane::Color).as_mut_bytes()[0] = 0x0F;
        panel.power_up().unwrap();
        panel.transport_mut().clear();
        panel.transport_mut().fail_on_data(1);

        assert!(matches!(
            panel.write_plane(Plane::Color),
            Err(Error::Transport(DisplayError::BusWriteError))
        ));

        // First chunk went out, the second failed and the transaction stays open
        let events = panel.transport().events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::Data(ref data) if data.len() == CHUNK_SIZE));
        assert!(!events.contains(&Event::EndTransaction));

        let plane = panel.plane(Plane::Color).as_bytes();
        assert_eq!(plane[0], 0x0F);
        assert!(plane[1..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn data_failure_stops_show_before_refresh() {
        let mut transport = RecordingTransport::new();
        transport.fail_on_data(0);
        let mut panel = PanelController::new(PanelConfig::new(8, 8), transport).unwrap();

        assert!(matches!(panel.show(), Err(Error::Transport(_))));
        assert_eq!(panel.power_state(), PowerState::Writing);

        let commands: Vec<u8> = panel
            .transport()
            .frames()
            .iter()
            .map(|frame| frame.command)
            .collect();
        assert_eq!(commands, vec![0x00, 0xE5, 0xE0, 0x00, 0x10]);
    }

    #[test]
    fn command_status_is_read_back() {
        let mut panel = controller(PanelConfig::new(8, 8));
        panel.transport_mut().script_replies(&[0xA5]);
        assert!(matches!(panel.command(Cmd::DCDC_POWER_ON, &[0x00]), Ok(0xA5)));
    }

    #[test]
    fn active_low_busy_line() {
        let transport = RecordingTransport::new().with_idle_level(PinState::High);
        let config = PanelConfig::new(8, 8).busy_active_high(false);
        let mut panel = PanelController::new(config, transport).unwrap();

        panel.transport_mut().script_busy(&[PinState::Low, PinState::Low]);
        panel.wait_until_idle().unwrap();
        assert_eq!(panel.transport().busy_polls(), 3);
        assert_eq!(panel.transport().delays(), vec![10, 10]);
    }
}
