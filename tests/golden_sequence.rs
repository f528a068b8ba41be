//! Golden wire sequence for a full display cycle.
//!
//! The byte stream is the contract with the COG and must match exactly.
//!
//! Run with: cargo test --test golden_sequence

use pdi_spectra::mock::{Event, Frame, RecordingTransport};
use pdi_spectra::{Line, LineMode, PanelConfig, PanelController, PinState, Plane, PowerState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn command(command: u8, payload: &[u8]) -> Event {
    Event::Command {
        command,
        payload: payload.to_vec(),
        keep_selected: false,
    }
}

fn idle_poll() -> Event {
    Event::GetLine(Line::Busy, PinState::Low)
}

/// Events of `power_up` with reset and busy lines wired and an idle panel.
fn power_up_events() -> Vec<Event> {
    vec![
        Event::LineMode(Line::Busy, LineMode::Input),
        Event::SetLine(Line::DataCommand, PinState::High),
        Event::SetLine(Line::ChipSelect, PinState::High),
        Event::SetLine(Line::Reset, PinState::Low),
        Event::Delay(1),
        Event::SetLine(Line::Reset, PinState::High),
        Event::Delay(5),
        Event::SetLine(Line::Reset, PinState::Low),
        Event::Delay(10),
        Event::SetLine(Line::Reset, PinState::High),
        Event::Delay(5),
        command(0x00, &[0x0E]),
        idle_poll(),
        command(0xE5, &[0x19]),
        command(0xE0, &[0x02]),
        command(0x00, &[0xCF, 0x89]),
    ]
}

fn ram_write(ram: u8, data: &[u8]) -> Vec<Event> {
    vec![
        Event::Command {
            command: ram,
            payload: Vec::new(),
            keep_selected: true,
        },
        Event::Data(data.to_vec()),
        Event::EndTransaction,
    ]
}

/// Events of `update` with reset and busy lines wired and an idle panel.
fn update_events() -> Vec<Event> {
    vec![
        command(0x04, &[0x00]),
        idle_poll(),
        command(0x12, &[]),
        idle_poll(),
        command(0x02, &[0x00]),
        idle_poll(),
        Event::SetLine(Line::DataCommand, PinState::Low),
        Event::SetLine(Line::ChipSelect, PinState::Low),
        Event::LineMode(Line::Busy, LineMode::Output),
        Event::SetLine(Line::Busy, PinState::Low),
        Event::Delay(150),
        Event::SetLine(Line::Reset, PinState::Low),
    ]
}

fn drawn_panel(config: PanelConfig) -> anyhow::Result<PanelController<RecordingTransport>> {
    let mut panel = PanelController::new(config, RecordingTransport::new())?;
    let (black, color) = panel.planes_mut();
    black.as_mut_bytes().copy_from_slice(&[0x81, 0x00]);
    color.as_mut_bytes().copy_from_slice(&[0x0F, 0xF0]);
    Ok(panel)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn normal_polarity_full_cycle() -> anyhow::Result<()> {
    let mut panel = drawn_panel(PanelConfig::new(8, 2))?;

    panel.power_up()?;
    panel.write_plane(Plane::Black)?;
    panel.write_plane(Plane::Color)?;
    panel.update()?;

    let mut expected = power_up_events();
    expected.extend(ram_write(0x10, &[0x81, 0x00]));
    // Color is inverted on the wire
    expected.extend(ram_write(0x13, &[0xF0, 0x0F]));
    expected.extend(update_events());

    assert_eq!(panel.transport().events(), expected.as_slice());
    assert_eq!(panel.power_state(), PowerState::Off);
    Ok(())
}

#[test]
fn swapped_polarity_full_cycle() -> anyhow::Result<()> {
    let mut panel = drawn_panel(PanelConfig::new(8, 2).swap_rams(true))?;

    panel.show()?;

    let mut expected = power_up_events();
    // Black goes to 0x13 inverted, color to 0x10 as is
    expected.extend(ram_write(0x13, &[0x7E, 0xFF]));
    expected.extend(ram_write(0x10, &[0x0F, 0xF0]));
    expected.extend(update_events());

    assert_eq!(panel.transport().events(), expected.as_slice());
    Ok(())
}

#[test]
fn command_stream_without_optional_lines() -> anyhow::Result<()> {
    let mut panel = PanelController::new(PanelConfig::new(8, 1), RecordingTransport::bare())?;
    panel.show()?;

    assert_eq!(
        panel.transport().frames(),
        vec![
            Frame::new(0x00, &[0x0E]),
            Frame::new(0xE5, &[0x19]),
            Frame::new(0xE0, &[0x02]),
            Frame::new(0x00, &[0xCF, 0x89]),
            Frame::new(0x10, &[0x00]),
            Frame::new(0x13, &[0xFF]),
            Frame::new(0x04, &[0x00]),
            Frame::new(0x12, &[]),
            Frame::new(0x02, &[0x00]),
        ]
    );

    // No reset pulse, no busy samples, no busy release
    let events = panel.transport().events();
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::SetLine(Line::Reset | Line::Busy, _))));
    assert_eq!(panel.transport().busy_polls(), 0);

    // One fallback wait after soft reset, DC/DC on, refresh and DC/DC off
    assert_eq!(panel.transport().delays(), vec![500, 500, 500, 500, 150]);
    Ok(())
}

#[test]
fn explicit_overrides_reach_the_wire() -> anyhow::Result<()> {
    let config = PanelConfig::new(8, 1)
        .color_bits_inverted(false)
        .black_bits_inverted(true);
    let mut panel = PanelController::new(config, RecordingTransport::new())?;
    panel.plane_mut(Plane::Color).as_mut_bytes()[0] = 0x3C;

    panel.write_plane(Plane::Black)?;
    panel.write_plane(Plane::Color)?;

    assert_eq!(
        panel.transport().frames(),
        vec![Frame::new(0x10, &[0xFF]), Frame::new(0x13, &[0x3C])]
    );
    Ok(())
}

#[test]
fn refresh_failure_aborts_before_power_down() -> anyhow::Result<()> {
    let mut panel = drawn_panel(PanelConfig::new(8, 2))?;
    panel.power_up()?;
    panel.transport_mut().clear();
    panel.transport_mut().fail_on_command(0x12);

    assert!(matches!(
        panel.update(),
        Err(pdi_spectra::Error::Transport(_))
    ));
    assert_eq!(panel.power_state(), PowerState::Refreshing);
    assert_eq!(panel.transport().frames(), vec![Frame::new(0x04, &[0x00])]);
    Ok(())
}
