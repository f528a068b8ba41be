//! Error types.

pub use display_interface::DisplayError;

/// Why a [`crate::PanelConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("panel geometry {width}x{height} has a zero dimension")]
    ZeroDimension {
        /// Configured width.
        width: u16,
        /// Configured height.
        height: u16,
    },
    /// `width * height` is not a whole number of bytes.
    #[error("panel geometry {width}x{height} does not pack into whole bytes")]
    NotBytePacked {
        /// Configured width.
        width: u16,
        /// Configured height.
        height: u16,
    },
}

/// Errors returned by the panel controller.
///
/// Nothing is retried internally: a failed transaction leaves the panel in an
/// unknown state and the remaining steps of the operation are abandoned.
///
/// Not comparable with `==`, since [`DisplayError`] is not; match on the
/// variant instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The configuration can never describe a working panel.
    #[error("invalid configuration: {0}")]
    Configuration(ConfigError),
    /// The bus or one of the control lines failed.
    #[error("transport failure: {0:?}")]
    Transport(DisplayError),
    /// A plane index other than black (0) or color (1).
    #[error("no bit plane with index {0}")]
    InvalidPlane(u8),
    /// The busy line did not clear within a bounded [`crate::BusyWait`].
    #[error("panel still busy after {waited_ms} ms")]
    BusyTimeout {
        /// Accumulated poll delay when the wait was abandoned.
        waited_ms: u32,
    },
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Transport(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err)
    }
}
