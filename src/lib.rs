//! A driver for the [Pervasive Displays](https://www.pervasivedisplays.com/) Spectra
//! chip-on-glass ePaper panels.
//!
//! - Built using [`embedded-hal`] traits.
//! - Graphics support is added through [`embedded-graphics`]
//!
//! [`embedded-graphics`]: https://docs.rs/embedded-graphics/
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! # Example
//!
//! ```
//! use pdi_spectra::mock::RecordingTransport;
//! use pdi_spectra::{PanelConfig, PanelController, PanelModel, Plane};
//!
//! let config = PanelConfig::for_model(PanelModel::E2154FS091);
//! let mut panel = PanelController::new(config, RecordingTransport::new())?;
//!
//! panel.plane_mut(Plane::Black).set_pixel(10, 10, true);
//! panel.plane_mut(Plane::Color).fill(false);
//! panel.show()?;
//! # Ok::<(), pdi_spectra::Error>(())
//! ```
//!
//! The example uses `mock::RecordingTransport` from the `mock` feature. On
//! hardware, replace it with an [`SpiInterface`] built from the SPI bus,
//! chip-select, data/command, reset and busy pins.
#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

mod spectra;

pub use crate::spectra::config::{Geometry, PanelConfig, PanelModel, Rotation};
pub use crate::spectra::driver::{PanelController, PowerState};
pub use crate::spectra::error::{ConfigError, DisplayError, Error};
pub use crate::spectra::interface::{Line, LineMode, NoPin, PanelTransport, SpiInterface};
#[cfg(any(test, feature = "mock"))]
pub use crate::spectra::mock;
pub use crate::spectra::plane::{BitPlane, Plane, RamBinding, RamCommandMapping};
pub use crate::spectra::timing::{
    BusyWait, BUSY_FALLBACK_MS, BUSY_POLL_INTERVAL_MS, MIN_REFRESH_INTERVAL_S,
    POWER_DOWN_SETTLE_MS, RESET_PULSE,
};

pub use embedded_hal::digital::PinState;
