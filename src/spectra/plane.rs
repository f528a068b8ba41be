//! Bit planes and their fixed binding to the panel RAM banks.
//!
//! The COG has two RAM banks selected by `0x10` and `0x13`. Which plane goes
//! to which bank, and whether its bits are sent inverted, is decided once at
//! construction:
//!
//! | polarity | black plane       | color plane       |
//! |----------|-------------------|-------------------|
//! | normal   | `0x10`, as is     | `0x13`, inverted  |
//! | swapped  | `0x13`, inverted  | `0x10`, as is     |
//!
//! Either inversion can be overridden explicitly.

use alloc::vec;
use alloc::vec::Vec;

use crate::spectra::cmd::Cmd;
use crate::spectra::config::{Geometry, PanelConfig};
use crate::spectra::error::Error;

/// One of the two ink channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Black ink
    Black,
    /// Color (red) ink
    Color,
}

impl TryFrom<u8> for Plane {
    type Error = Error;

    /// `0` is black, `1` is color.
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Plane::Black),
            1 => Ok(Plane::Color),
            other => Err(Error::InvalidPlane(other)),
        }
    }
}

/// Where a plane is written and how its bits are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamBinding {
    /// RAM-select command (`0x10` or `0x13`).
    pub command: u8,
    /// Complement every byte during transmission.
    pub inverted: bool,
}

/// The plane to RAM bank association, fixed for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamCommandMapping {
    black: RamBinding,
    color: RamBinding,
}

impl RamCommandMapping {
    /// Resolve the polarity and inversion overrides of `config`.
    pub fn resolve(config: &PanelConfig) -> Self {
        let (black_command, color_command, black_default, color_default) = if config.swap_rams {
            (Cmd::WRITE_RAM_SECONDARY, Cmd::WRITE_RAM_PRIMARY, true, false)
        } else {
            (Cmd::WRITE_RAM_PRIMARY, Cmd::WRITE_RAM_SECONDARY, false, true)
        };
        RamCommandMapping {
            black: RamBinding {
                command: black_command,
                inverted: config.black_bits_inverted.unwrap_or(black_default),
            },
            color: RamBinding {
                command: color_command,
                inverted: config.color_bits_inverted.unwrap_or(color_default),
            },
        }
    }

    /// Binding of `plane`.
    pub fn binding(&self, plane: Plane) -> RamBinding {
        match plane {
            Plane::Black => self.black,
            Plane::Color => self.color,
        }
    }
}

/// A densely packed 1-bit-per-pixel buffer.
///
/// Row-major over the native RAM geometry, most significant bit first. A set
/// bit means "ink"; inversion for the hardware happens on the wire only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlane {
    bytes: Vec<u8>,
    geometry: Geometry,
    binding: RamBinding,
}

impl BitPlane {
    pub(crate) fn new(geometry: Geometry, binding: RamBinding) -> Self {
        BitPlane {
            bytes: vec![0x00; geometry.buffer_len()],
            geometry,
            binding,
        }
    }

    /// Raw packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw packed bytes, for the framebuffer layer to draw into.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a validated geometry.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Geometry the plane was sized for
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Whether this plane is complemented on the wire.
    pub fn inverted(&self) -> bool {
        self.binding.inverted
    }

    /// RAM-select command this plane is written with.
    pub fn ram_command(&self) -> u8 {
        self.binding.command
    }

    /// Set every pixel to `ink`.
    pub fn fill(&mut self, ink: bool) {
        let byte = if ink { 0xFF } else { 0x00 };
        self.bytes.fill(byte);
    }

    /// Read the pixel at native RAM coordinates, `None` when out of range.
    pub fn pixel(&self, x: u16, y: u16) -> Option<bool> {
        let (index, mask) = self.locate(x, y)?;
        self.bytes.get(index).map(|byte| byte & mask != 0)
    }

    /// Write the pixel at native RAM coordinates. Out of range writes are
    /// ignored and return `false`.
    pub fn set_pixel(&mut self, x: u16, y: u16, ink: bool) -> bool {
        let Some((index, mask)) = self.locate(x, y) else {
            return false;
        };
        match self.bytes.get_mut(index) {
            Some(byte) => {
                if ink {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
                true
            }
            None => false,
        }
    }

    fn locate(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.geometry.ram_width() || y >= self.geometry.ram_height() {
            return None;
        }
        let bit = usize::from(y) * usize::from(self.geometry.ram_width()) + usize::from(x);
        Some((bit / 8, 0x80 >> (bit % 8)))
    }
}
