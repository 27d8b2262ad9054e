//! JSON-line protocol spoken by the host binary.
//!
//! Events use `{"event": "<name>", "data": {...}}` format (stdout).
//! Commands use `{"command": "<name>", ...}` format (stdin).

pub mod bridge;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events: stdout
// ---------------------------------------------------------------------------

/// Everything written to stdout, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    Starting {},
    Ready {
        mode: String,
        devices: usize,
        captured: bool,
        /// Configured paths that could not be opened.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        skipped: Vec<String>,
    },
    Motion { dx: f64, dy: f64, seq: u32 },
    Warp { x: f64, y: f64, seq: u32 },
    Button { code: u32, pressed: bool, seq: u32 },
    Key { code: u32, pressed: bool, seq: u32 },
    Wheel { dx: f64, dy: f64, seq: u32 },
    GrabChanged { captured: bool },
    Pong {},
    Status {
        captured: bool,
        devices: usize,
        seq: u32,
        #[serde(rename = "idleMs", skip_serializing_if = "Option::is_none")]
        idle_ms: Option<u64>,
    },
    Error { message: String },
    Stopping {},
}

// ---------------------------------------------------------------------------
// Commands: stdin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum HostCommand {
    Ping {},
    Status {},
    Stop {},
}
