//! Device session: the libinput context and the devices it holds.
//!
//! Two modes:
//! - seat-wide: udev enumerates everything on a seat, every device is
//!   grabbed for the lifetime of the session and there is no toggle.
//! - explicit path list: only the given nodes are opened, and their grab
//!   follows the runtime chord toggle.

#[cfg(target_os = "linux")]
mod context;
#[cfg(target_os = "linux")]
pub mod devices;
#[cfg(target_os = "linux")]
pub mod evdev;

#[cfg(target_os = "linux")]
pub use context::DeviceSession;
#[cfg(target_os = "linux")]
pub use devices::{DeviceGrabs, DeviceTable, RestrictedInterface};
#[cfg(target_os = "linux")]
pub use evdev::{EvdevGrab, ExclusiveAccess};

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{Result, StealerError};

/// Seat used when none is configured.
pub const DEFAULT_SEAT: &str = "seat0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Everything udev reports on `seat`, permanently grabbed.
    SeatWide { seat: String },
    /// Only these device nodes; `start_grabbed` is the initial grab state.
    ExplicitPathList {
        paths: Vec<PathBuf>,
        start_grabbed: bool,
    },
}

impl SessionMode {
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::ExplicitPathList { .. })
    }

    /// Grab state the session starts in.
    pub fn starts_captured(&self) -> bool {
        match self {
            Self::SeatWide { .. } => true,
            Self::ExplicitPathList { start_grabbed, .. } => *start_grabbed,
        }
    }
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::SeatWide {
            seat: DEFAULT_SEAT.to_string(),
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeatWide { seat } => write!(f, "seat-wide ({})", seat),
            Self::ExplicitPathList { paths, .. } => {
                let noun = if paths.len() == 1 { "path" } else { "paths" };
                write!(f, "explicit ({} {})", paths.len(), noun)
            }
        }
    }
}

/// Which configured paths made it into the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReport {
    pub opened: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Add each path with `add`, skipping the ones that fail.
///
/// Fails only when not a single path could be added.
pub fn add_devices<F>(paths: &[PathBuf], mut add: F) -> Result<OpenReport>
where
    F: FnMut(&Path) -> std::result::Result<(), String>,
{
    let mut report = OpenReport::default();

    for path in paths {
        match add(path) {
            Ok(()) => {
                info!(path = %path.display(), "Input device added");
                report.opened.push(path.clone());
            }
            Err(reason) => {
                let err = StealerError::DeviceOpen {
                    path: path.clone(),
                    reason,
                };
                error!("{}", err);
                report.failed.push(path.clone());
            }
        }
    }

    if report.opened.is_empty() {
        return Err(StealerError::NoDevicesOpened {
            attempted: paths.len(),
        });
    }
    Ok(report)
}
