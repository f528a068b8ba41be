//! Spectra COG ePaper Display Driver
//!
//! Used in the Pervasive Displays small-format (up to 4.2") black/white/red
//! panels, e.g. the E2154FS091 and E2266FS092.
//!
//! ### Usage
//! This driver does not hide that you're working with two bit planes. To
//! display something you:
//!
//! 1. draw into the black and color planes, preferably with
//!    [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. then run the whole cycle with [`driver::PanelController::show`], or step
//!    through `power_up`, `write_plane` and `update` yourself

pub mod config;
pub mod driver;
pub mod error;
pub mod interface;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod plane;
pub mod timing;

mod cmd;
mod flag;
#[cfg(feature = "graphics")]
pub mod graphics;
