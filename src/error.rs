//! Error types for the input session.
//!
//! Only `SessionInit`, `NoDevicesOpened` and `Config` ever abort an
//! operation. `DeviceOpen` and `GrabApply` are recovered where they occur:
//! they are built so the failure can be logged and reported, and the
//! affected device is skipped or left non-exclusive.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StealerError {
    /// The libinput context could not be created or bound to its seat.
    #[error("Failed to initialize input session: {0}")]
    SessionInit(String),

    /// Explicit device list where every path failed to open.
    #[error("None of the {attempted} configured input devices could be opened")]
    NoDevicesOpened { attempted: usize },

    #[error("Failed to open input device {}: {reason}", .path.display())]
    DeviceOpen { path: PathBuf, reason: String },

    #[error(
        "Failed to {} exclusive grab on {}: {source}",
        grab_verb(.grab),
        .path.display()
    )]
    GrabApply {
        path: PathBuf,
        grab: bool,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StealerError>;

fn grab_verb(grab: &bool) -> &'static str {
    if *grab {
        "acquire"
    } else {
        "release"
    }
}
