//! Panel configuration
//!
//! A [`PanelConfig`] is built once, handed to [`crate::PanelController::new`] and
//! resolved into an immutable [`Geometry`] and [`crate::RamCommandMapping`].

use crate::spectra::error::ConfigError;
use crate::spectra::timing::BusyWait;

/// Orientation of the logical drawing surface relative to the panel RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// Rotate by 90 degrees clockwise
    Deg90,
    /// Rotate by 180 degrees clockwise
    Deg180,
    /// Rotate 270 degrees clockwise
    Deg270,
}

impl Rotation {
    /// Whether the logical width and height are swapped against the RAM.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Spectra panels the start sequence is valid for (up to about 4.2").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PanelModel {
    /// 1.54" 152x152
    E2154FS091,
    /// 2.13" 104x212
    E2213FS091,
    /// 2.66" 152x296
    E2266FS092,
    /// 2.71" 176x264
    E2271FS091,
    /// 2.87" 128x296
    E2287FS091,
    /// 3.70" 240x416
    E2370FS081,
    /// 4.17" 300x400
    E2417FS051,
}

impl PanelModel {
    /// Native RAM geometry as `(width, height)`.
    pub const fn size(self) -> (u16, u16) {
        match self {
            PanelModel::E2154FS091 => (152, 152),
            PanelModel::E2213FS091 => (104, 212),
            PanelModel::E2266FS092 => (152, 296),
            PanelModel::E2271FS091 => (176, 264),
            PanelModel::E2287FS091 => (128, 296),
            PanelModel::E2370FS081 => (240, 416),
            PanelModel::E2417FS051 => (300, 400),
        }
    }
}

/// Validated panel dimensions.
///
/// `ram_width` x `ram_height` is what the panel RAM holds; `width` x `height`
/// is the drawing surface after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    ram_width: u16,
    ram_height: u16,
    rotation: Rotation,
}

impl Geometry {
    /// Validate native dimensions.
    ///
    /// Both must be non-zero and their product must pack into whole bytes.
    pub fn new(ram_width: u16, ram_height: u16, rotation: Rotation) -> Result<Self, ConfigError> {
        if ram_width == 0 || ram_height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: ram_width,
                height: ram_height,
            });
        }
        if (u32::from(ram_width) * u32::from(ram_height)) % 8 != 0 {
            return Err(ConfigError::NotBytePacked {
                width: ram_width,
                height: ram_height,
            });
        }
        Ok(Geometry {
            ram_width,
            ram_height,
            rotation,
        })
    }

    /// Logical width, pixels horizontally
    pub fn width(&self) -> u16 {
        if self.rotation.is_quarter_turn() {
            self.ram_height
        } else {
            self.ram_width
        }
    }

    /// Logical height, pixels vertically
    pub fn height(&self) -> u16 {
        if self.rotation.is_quarter_turn() {
            self.ram_width
        } else {
            self.ram_height
        }
    }

    /// Native width of the panel RAM
    pub fn ram_width(&self) -> u16 {
        self.ram_width
    }

    /// Native height of the panel RAM
    pub fn ram_height(&self) -> u16 {
        self.ram_height
    }

    /// Configured rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Number of pixels in one plane.
    pub fn pixel_count(&self) -> usize {
        usize::from(self.ram_width) * usize::from(self.ram_height)
    }

    /// Length in bytes of one densely packed bit plane.
    pub fn buffer_len(&self) -> usize {
        self.pixel_count() / 8
    }
}

/// Everything needed to construct a [`crate::PanelController`].
///
/// ```
/// use pdi_spectra::{PanelConfig, PanelModel};
///
/// let config = PanelConfig::for_model(PanelModel::E2266FS092)
///     .swap_rams(true)
///     .color_bits_inverted(true);
/// assert_eq!(config.width, 152);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelConfig {
    /// Native RAM width in pixels.
    pub width: u16,
    /// Native RAM height in pixels.
    pub height: u16,
    /// Color and black RAM commands are swapped on this panel.
    pub swap_rams: bool,
    /// Overrides the polarity default for the black plane.
    pub black_bits_inverted: Option<bool>,
    /// Overrides the polarity default for the color plane.
    pub color_bits_inverted: Option<bool>,
    /// Orientation of the drawing surface.
    pub rotation: Rotation,
    /// How long to wait on the busy line.
    pub busy_wait: BusyWait,
    /// Busy line level meaning "busy". High on the Spectra COG.
    pub busy_active_high: bool,
}

impl PanelConfig {
    /// Configuration with the given native geometry and all defaults.
    pub fn new(width: u16, height: u16) -> Self {
        PanelConfig {
            width,
            height,
            swap_rams: false,
            black_bits_inverted: None,
            color_bits_inverted: None,
            rotation: Rotation::Deg0,
            busy_wait: BusyWait::Indefinite,
            busy_active_high: true,
        }
    }

    /// Configuration for a catalogued panel.
    pub fn for_model(model: PanelModel) -> Self {
        let (width, height) = model.size();
        Self::new(width, height)
    }

    /// Select the swapped RAM command polarity.
    pub fn swap_rams(mut self, swap: bool) -> Self {
        self.swap_rams = swap;
        self
    }

    /// Force the inversion of the black plane.
    pub fn black_bits_inverted(mut self, inverted: bool) -> Self {
        self.black_bits_inverted = Some(inverted);
        self
    }

    /// Force the inversion of the color plane.
    pub fn color_bits_inverted(mut self, inverted: bool) -> Self {
        self.color_bits_inverted = Some(inverted);
        self
    }

    /// Set the drawing surface orientation.
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the busy-wait policy.
    pub fn busy_wait(mut self, policy: BusyWait) -> Self {
        self.busy_wait = policy;
        self
    }

    /// Set which busy line level means "busy".
    pub fn busy_active_high(mut self, active_high: bool) -> Self {
        self.busy_active_high = active_high;
        self
    }

    /// Validate the geometry part of the configuration.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self.width, self.height, self.rotation)
    }
}
