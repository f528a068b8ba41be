//! In-memory transport for host-side tests.
//!
//! [`RecordingTransport`] records every call in order and answers busy-line
//! samples from a script, so whole panel sequences can be compared byte for
//! byte against a recording.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use display_interface::DisplayError;
use embedded_hal::digital::PinState;

use crate::spectra::interface::{Line, LineMode, PanelTransport};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `send_command`
    Command {
        /// Command byte
        command: u8,
        /// Inline payload
        payload: Vec<u8>,
        /// Chip-select left asserted
        keep_selected: bool,
    },
    /// `send_data`
    Data(Vec<u8>),
    /// `end_transaction`
    EndTransaction,
    /// `read_byte`
    ReadByte,
    /// `set_line`
    SetLine(Line, PinState),
    /// `get_line`, with the level that was answered
    GetLine(Line, PinState),
    /// `set_line_mode`
    LineMode(Line, LineMode),
    /// `delay_ms`
    Delay(u32),
}

/// A command together with all data sent in its transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command byte
    pub command: u8,
    /// Payload and streamed data
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame from a command and its data.
    pub fn new(command: u8, data: &[u8]) -> Self {
        Frame {
            command,
            data: data.to_vec(),
        }
    }
}

/// Scripted [`PanelTransport`] that records what it is asked to do.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    events: Vec<Event>,
    has_reset: bool,
    has_busy: bool,
    busy_script: VecDeque<PinState>,
    idle_level: PinState,
    read_script: VecDeque<u8>,
    reply_script: VecDeque<u8>,
    fail_command: Option<u8>,
    fail_data_after: Option<usize>,
}

impl RecordingTransport {
    /// Transport with reset and busy lines wired. The busy line reads low
    /// (idle) unless scripted otherwise.
    pub fn new() -> Self {
        RecordingTransport {
            events: Vec::new(),
            has_reset: true,
            has_busy: true,
            busy_script: VecDeque::new(),
            idle_level: PinState::Low,
            read_script: VecDeque::new(),
            reply_script: VecDeque::new(),
            fail_command: None,
            fail_data_after: None,
        }
    }

    /// Transport with neither reset nor busy line.
    pub fn bare() -> Self {
        Self::new().with_reset(false).with_busy(false)
    }

    /// Wire or unwire the reset line.
    pub fn with_reset(mut self, wired: bool) -> Self {
        self.has_reset = wired;
        self
    }

    /// Wire or unwire the busy line.
    pub fn with_busy(mut self, wired: bool) -> Self {
        self.has_busy = wired;
        self
    }

    /// Level answered once the busy script is exhausted.
    pub fn with_idle_level(mut self, level: PinState) -> Self {
        self.idle_level = level;
        self
    }

    /// Answer the next busy samples with `levels`, in order.
    pub fn script_busy(&mut self, levels: &[PinState]) {
        self.busy_script.extend(levels.iter().copied());
    }

    /// Answer the next `read_byte` calls with `bytes`, in order.
    pub fn script_reads(&mut self, bytes: &[u8]) {
        self.read_script.extend(bytes.iter().copied());
    }

    /// Answer the next `send_command` calls with `bytes`, in order.
    pub fn script_replies(&mut self, bytes: &[u8]) {
        self.reply_script.extend(bytes.iter().copied());
    }

    /// Fail with `BusWriteError` the next time `command` is sent.
    pub fn fail_on_command(&mut self, command: u8) {
        self.fail_command = Some(command);
    }

    /// Let `accepted` more `send_data` calls through, then fail the next one
    /// with `BusWriteError`.
    pub fn fail_on_data(&mut self, accepted: usize) {
        self.fail_data_after = Some(accepted);
    }

    /// Everything recorded so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Forget the recording, keep the scripts.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Delays in the order they were requested.
    pub fn delays(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Delay(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    /// Number of busy-line samples taken.
    pub fn busy_polls(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::GetLine(Line::Busy, _)))
            .count()
    }

    /// Commands with their payload and streamed data, in wire order.
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut open: Option<Frame> = None;
        for event in &self.events {
            match event {
                Event::Command {
                    command,
                    payload,
                    keep_selected,
                } => {
                    if let Some(frame) = open.take() {
                        frames.push(frame);
                    }
                    let frame = Frame::new(*command, payload);
                    if *keep_selected {
                        open = Some(frame);
                    } else {
                        frames.push(frame);
                    }
                }
                Event::Data(data) => {
                    if let Some(frame) = open.as_mut() {
                        frame.data.extend_from_slice(data);
                    }
                }
                Event::EndTransaction => {
                    if let Some(frame) = open.take() {
                        frames.push(frame);
                    }
                }
                _ => {}
            }
        }
        if let Some(frame) = open {
            frames.push(frame);
        }
        frames
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelTransport for RecordingTransport {
    fn send_command(
        &mut self,
        command: u8,
        payload: &[u8],
        keep_selected: bool,
    ) -> Result<u8, DisplayError> {
        if self.fail_command == Some(command) {
            self.fail_command = None;
            return Err(DisplayError::BusWriteError);
        }
        self.events.push(Event::Command {
            command,
            payload: payload.to_vec(),
            keep_selected,
        });
        Ok(self.reply_script.pop_front().unwrap_or(0x00))
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        match self.fail_data_after {
            Some(0) => {
                self.fail_data_after = None;
                return Err(DisplayError::BusWriteError);
            }
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        self.events.push(Event::Data(data.to_vec()));
        Ok(())
    }

    fn end_transaction(&mut self) -> Result<(), DisplayError> {
        self.events.push(Event::EndTransaction);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, DisplayError> {
        self.events.push(Event::ReadByte);
        Ok(self.read_script.pop_front().unwrap_or(0x00))
    }

    fn has_line(&self, line: Line) -> bool {
        match line {
            Line::Reset => self.has_reset,
            Line::Busy => self.has_busy,
            Line::ChipSelect | Line::DataCommand => true,
        }
    }

    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), DisplayError> {
        if !self.has_line(line) {
            return Err(DisplayError::RSError);
        }
        self.events.push(Event::SetLine(line, level));
        Ok(())
    }

    fn get_line(&mut self, line: Line) -> Result<PinState, DisplayError> {
        if line != Line::Busy || !self.has_busy {
            return Err(DisplayError::InvalidFormatError);
        }
        let level = self.busy_script.pop_front().unwrap_or(self.idle_level);
        self.events.push(Event::GetLine(line, level));
        Ok(level)
    }

    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> Result<(), DisplayError> {
        if !self.has_line(line) {
            return Err(DisplayError::InvalidFormatError);
        }
        self.events.push(Event::LineMode(line, mode));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::Delay(ms));
    }
}
