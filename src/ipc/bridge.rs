//! IPC bridge: stdin command reader, stdout event emitter, and the
//! consumer that turns translated input into event lines.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{HostCommand, HostEvent};
use crate::sink::InputSink;

/// Emit a `HostEvent` as a JSON line on stdout and flush.
pub fn emit_event(event: &HostEvent) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_event(&mut handle, event);
}

/// Convenience helper for emitting error events.
pub fn emit_error(message: &str) {
    emit_event(&HostEvent::Error {
        message: message.to_string(),
    });
}

fn write_event<W: Write>(out: &mut W, event: &HostEvent) {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            return;
        }
    };
    // Ignore write/flush errors; the pipe may be closed.
    let _ = writeln!(out, "{}", json);
    let _ = out.flush();
}

/// Consumer writing every input event as a JSON line.
pub struct JsonLineSink<W> {
    out: W,
}

impl JsonLineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> InputSink for JsonLineSink<W> {
    fn motion(&mut self, dx: f64, dy: f64, seq: u32) {
        write_event(&mut self.out, &HostEvent::Motion { dx, dy, seq });
    }

    fn warp(&mut self, x: f64, y: f64, seq: u32) {
        write_event(&mut self.out, &HostEvent::Warp { x, y, seq });
    }

    fn button(&mut self, code: u32, pressed: bool, seq: u32) {
        write_event(&mut self.out, &HostEvent::Button { code, pressed, seq });
    }

    fn key(&mut self, code: u32, pressed: bool, seq: u32) {
        write_event(&mut self.out, &HostEvent::Key { code, pressed, seq });
    }

    fn wheel(&mut self, dx: f64, dy: f64, seq: u32) {
        write_event(&mut self.out, &HostEvent::Wheel { dx, dy, seq });
    }
}

/// Spawn a blocking thread that reads JSON lines from stdin, deserializes
/// them into `HostCommand`, and forwards them through the returned channel.
///
/// The thread exits when stdin is closed or on unrecoverable read error.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<HostCommand> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        let reader = stdin.lock();
        for line in reader.lines() {
            match line {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<HostCommand>(trimmed) {
                        Ok(cmd) => {
                            debug!(?cmd, "Received command");
                            if tx.send(cmd).is_err() {
                                break; // Receiver dropped, main task is gone.
                            }
                        }
                        Err(e) => {
                            error!("Invalid JSON command: {} (input: {})", e, trimmed);
                            emit_error(&format!("Invalid JSON command: {}", e));
                        }
                    }
                }
                Err(e) => {
                    error!("stdin read error: {}", e);
                    break;
                }
            }
        }
        debug!("stdin reader thread exiting");
    });

    rx
}
