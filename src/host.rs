//! Host event loop: one tokio reactor, single thread.
//!
//! libinput is not thread-safe, so the session, the translator and the
//! drain cycles all stay on the runtime's only thread.

use std::os::fd::{AsRawFd, RawFd};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tracing::{error, info};

use input_stealer::config::{load_config, CliOverrides};
use input_stealer::ipc::bridge::{emit_error, emit_event, spawn_stdin_reader, JsonLineSink};
use input_stealer::ipc::{HostCommand, HostEvent};
use input_stealer::logger;
use input_stealer::sink::{ActivityClock, InputPolicy, InputSink};
use input_stealer::{DeviceSession, EventTranslator};

/// The session's descriptor, registered with the reactor. Ownership stays
/// with libinput.
struct PollHandle(RawFd);

impl AsRawFd for PollHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

pub async fn run() -> anyhow::Result<()> {
    let overrides = CliOverrides::parse(std::env::args().skip(1))?;
    logger::init(overrides.log_dir.as_deref())?;

    emit_event(&HostEvent::Starting {});

    let mut config = load_config(overrides.config_path.as_deref());
    config.apply(&overrides);
    info!(?config, "Configuration loaded");

    let mut session = match DeviceSession::open(config.session_mode()) {
        Ok(session) => session,
        Err(e) => {
            emit_error(&e.to_string());
            return Err(e).context("Failed to open input session");
        }
    };

    let policy = InputPolicy::new(config.keyboard_enabled, config.pointer_enabled);
    let activity = ActivityClock::new();
    let sink = Arc::new(Mutex::new(JsonLineSink::stdout()));
    let mut translator = EventTranslator::new(sink, policy, session.grab_toggle(config.toggle_chord))
        .with_notifier(Box::new(activity.clone()));

    let poll = AsyncFd::with_interest(PollHandle(session.poll_handle()), Interest::READABLE)
        .context("Failed to register input session with the reactor")?;
    let mut cmd_rx = spawn_stdin_reader();

    // Device-added events from open are already queued.
    drain(&mut session, &mut translator);

    emit_event(&HostEvent::Ready {
        mode: session.mode().to_string(),
        devices: session.device_count(),
        captured: translator.is_captured(),
        skipped: session
            .report()
            .failed
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    });
    info!("Input stealer ready");

    loop {
        tokio::select! {
            ready = poll.readable() => {
                let mut guard = ready.context("Input session poll failed")?;
                guard.clear_ready();
                drain(&mut session, &mut translator);
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(HostCommand::Ping {}) => emit_event(&HostEvent::Pong {}),
                    Some(HostCommand::Status {}) => emit_event(&HostEvent::Status {
                        captured: translator.is_captured(),
                        devices: session.device_count(),
                        seq: translator.sequence(),
                        idle_ms: activity.idle_ms(),
                    }),
                    Some(HostCommand::Stop {}) => break,
                    None => {
                        // stdin closed, parent process gone
                        info!("stdin closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    emit_event(&HostEvent::Stopping {});
    drop(poll);
    drop(session);
    info!("Input stealer stopped");
    Ok(())
}

fn drain<S: InputSink>(session: &mut DeviceSession, translator: &mut EventTranslator<S>) {
    match session.drain_into(translator) {
        Ok(report) => {
            if let Some(state) = report.grab_change {
                emit_event(&HostEvent::GrabChanged {
                    captured: state.is_captured(),
                });
            }
        }
        Err(e) => error!("Drain cycle failed: {}", e),
    }
}
