//! Configuration reading and command-line overrides.

pub mod paths;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StealerError};
use crate::grab::DEFAULT_CHORD;
use crate::session::{SessionMode, DEFAULT_SEAT};

use paths::get_config_path;

/// config.json shape. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StealerConfig {
    /// Device nodes to hold. Empty means every device on `seat`.
    pub devices: Vec<PathBuf>,
    pub seat: String,
    /// Initial grab state for an explicit device list.
    pub start_grabbed: bool,
    pub keyboard_enabled: bool,
    pub pointer_enabled: bool,
    /// Key codes that, held together and then released, flip the grab.
    pub toggle_chord: [u32; 2],
}

impl Default for StealerConfig {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            seat: DEFAULT_SEAT.to_string(),
            start_grabbed: true,
            keyboard_enabled: true,
            pointer_enabled: true,
            toggle_chord: DEFAULT_CHORD,
        }
    }
}

impl StealerConfig {
    pub fn session_mode(&self) -> SessionMode {
        if self.devices.is_empty() {
            SessionMode::SeatWide {
                seat: self.seat.clone(),
            }
        } else {
            SessionMode::ExplicitPathList {
                paths: self.devices.clone(),
                start_grabbed: self.start_grabbed,
            }
        }
    }

    /// Command-line values win over the file.
    pub fn apply(&mut self, overrides: &CliOverrides) {
        if !overrides.devices.is_empty() {
            self.devices = overrides.devices.clone();
        }
        if let Some(seat) = &overrides.seat {
            self.seat = seat.clone();
        }
        if overrides.released {
            self.start_grabbed = false;
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub devices: Vec<PathBuf>,
    pub seat: Option<String>,
    pub released: bool,
    /// Also write daily-rotated logs here. Command line only, since
    /// logging is up before the config file is read.
    pub log_dir: Option<PathBuf>,
}

impl CliOverrides {
    /// Parse `--config <path>`, `--device <path>` (repeatable),
    /// `--seat <name>`, `--log-dir <path>` and `--released`.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut overrides = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => overrides.config_path = Some(PathBuf::from(value(&arg, args.next())?)),
                "--device" => overrides.devices.push(PathBuf::from(value(&arg, args.next())?)),
                "--seat" => overrides.seat = Some(value(&arg, args.next())?),
                "--log-dir" => overrides.log_dir = Some(PathBuf::from(value(&arg, args.next())?)),
                "--released" => overrides.released = true,
                other => {
                    return Err(StealerError::Config(format!("unknown argument: {}", other)));
                }
            }
        }
        Ok(overrides)
    }
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    next.ok_or_else(|| StealerError::Config(format!("{} expects a value", flag)))
}

/// Read the config file, falling back to defaults.
///
/// A missing file is normal; a malformed one is logged and ignored.
pub fn load_config(path: Option<&Path>) -> StealerConfig {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    read_json_file(&path).unwrap_or_default()
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_device_list_is_seat_wide() {
        let config = StealerConfig::default();
        assert_eq!(
            config.session_mode(),
            SessionMode::SeatWide {
                seat: "seat0".to_string()
            }
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: StealerConfig = serde_json::from_str(
            r#"{"devices": ["/dev/input/event4"], "startGrabbed": false, "toggleChord": [29, 57]}"#,
        )
        .unwrap();

        assert_eq!(config.toggle_chord, [29, 57]);
        assert!(config.pointer_enabled);
        assert_eq!(
            config.session_mode(),
            SessionMode::ExplicitPathList {
                paths: vec![PathBuf::from("/dev/input/event4")],
                start_grabbed: false,
            }
        );
    }

    #[test]
    fn parse_overrides() {
        let o = CliOverrides::parse(args(&[
            "--device",
            "/dev/input/event3",
            "--device",
            "/dev/input/event5",
            "--seat",
            "seat1",
            "--released",
        ]))
        .unwrap();

        assert_eq!(
            o.devices,
            vec![PathBuf::from("/dev/input/event3"), PathBuf::from("/dev/input/event5")]
        );
        assert_eq!(o.seat.as_deref(), Some("seat1"));
        assert!(o.released);
        assert_eq!(o.config_path, None);
    }

    #[test]
    fn parse_rejects_bad_args() {
        assert!(CliOverrides::parse(args(&["--device"])).is_err());
        assert!(CliOverrides::parse(args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let mut config = StealerConfig {
            devices: vec![PathBuf::from("/dev/input/event1")],
            ..Default::default()
        };
        config.apply(&CliOverrides {
            devices: vec![PathBuf::from("/dev/input/event9")],
            released: true,
            ..Default::default()
        });

        assert_eq!(config.devices, vec![PathBuf::from("/dev/input/event9")]);
        assert!(!config.start_grabbed);
    }

    #[test]
    fn missing_and_malformed_files_fall_back() {
        let dir = std::env::temp_dir().join("input_stealer_config_test");
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        let _ = std::fs::remove_file(&missing);
        assert_eq!(load_config(Some(missing.as_path())), StealerConfig::default());

        let broken = dir.join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_config(Some(broken.as_path())), StealerConfig::default());

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"seat": "seat9", "keyboardEnabled": false}"#).unwrap();
        let config = load_config(Some(good.as_path()));
        assert_eq!(config.seat, "seat9");
        assert!(!config.keyboard_enabled);
    }
}
