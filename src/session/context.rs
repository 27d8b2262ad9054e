//! The libinput context wrapped as a device session.

use std::cell::RefCell;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::rc::Rc;

use input::event::keyboard::{KeyState, KeyboardEvent, KeyboardEventTrait};
use input::event::pointer::{Axis, ButtonState, PointerEvent, PointerScrollEvent};
use input::{Event, Libinput};
use tracing::{error, info};

use super::devices::{DeviceGrabs, DeviceTable, RestrictedInterface};
use super::evdev::{EvdevGrab, ExclusiveAccess};
use super::{add_devices, OpenReport, SessionMode};
use crate::error::{Result, StealerError};
use crate::grab::{GrabState, GrabToggle};
use crate::sink::InputSink;
use crate::translate::{CycleReport, EventTranslator, RawEvent};

/// One long-lived libinput context and the devices it has open.
///
/// Dropping the session releases every outstanding grab before libinput
/// closes the descriptors.
pub struct DeviceSession {
    libinput: Libinput,
    mode: SessionMode,
    devices: Rc<RefCell<DeviceTable>>,
    report: OpenReport,
}

impl DeviceSession {
    pub fn open(mode: SessionMode) -> Result<Self> {
        Self::open_with(mode, Box::new(EvdevGrab))
    }

    /// Open with a custom exclusive-access control.
    pub fn open_with(mode: SessionMode, control: Box<dyn ExclusiveAccess>) -> Result<Self> {
        let devices = Rc::new(RefCell::new(DeviceTable::new(mode.starts_captured(), control)));
        let interface = RestrictedInterface(devices.clone());

        let (libinput, report) = match &mode {
            SessionMode::SeatWide { seat } => {
                let mut libinput = Libinput::new_with_udev(interface);
                if libinput.udev_assign_seat(seat).is_err() {
                    let err = StealerError::SessionInit(format!("could not assign seat \"{}\"", seat));
                    error!("{}", err);
                    return Err(err);
                }
                (libinput, OpenReport::default())
            }
            SessionMode::ExplicitPathList { paths, .. } => {
                let mut libinput = Libinput::new_from_path(interface);
                let report = add_devices(paths, |path| {
                    let path = path
                        .to_str()
                        .ok_or_else(|| "path is not valid UTF-8".to_string())?;
                    libinput
                        .path_add_device(path)
                        .map(|_| ())
                        .ok_or_else(|| "libinput rejected the device".to_string())
                })?;
                if libinput.resume().is_err() {
                    let err = StealerError::SessionInit("could not resume libinput context".into());
                    error!("{}", err);
                    return Err(err);
                }
                (libinput, report)
            }
        };

        info!(
            mode = %mode,
            devices = devices.borrow().len(),
            captured = devices.borrow().is_captured(),
            "Input session opened"
        );

        Ok(Self {
            libinput,
            mode,
            devices,
            report,
        })
    }

    /// Descriptor to poll for readability.
    pub fn poll_handle(&self) -> RawFd {
        self.libinput.as_raw_fd()
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn report(&self) -> &OpenReport {
        &self.report
    }

    pub fn device_count(&self) -> usize {
        self.devices.borrow().len()
    }

    pub fn is_captured(&self) -> bool {
        self.devices.borrow().is_captured()
    }

    /// Build the chord toggle matching this session's mode.
    pub fn grab_toggle(&self, chord: [u32; 2]) -> GrabToggle {
        match self.mode {
            SessionMode::SeatWide { .. } => GrabToggle::seat_wide(chord),
            SessionMode::ExplicitPathList { .. } => GrabToggle::switchable(
                chord,
                GrabState::from_captured(self.is_captured()),
                Box::new(DeviceGrabs(self.devices.clone())),
            ),
        }
    }

    /// Read pending data from the kernel into libinput's queue.
    pub fn dispatch(&mut self) -> io::Result<()> {
        self.libinput.dispatch()
    }

    /// Queued events, consumed as they are yielded.
    pub fn events(&mut self) -> impl Iterator<Item = RawEvent> + '_ {
        self.libinput.by_ref().map(|event| raw_event(&event))
    }

    /// One full drain cycle: dispatch, translate everything queued, flush.
    pub fn drain_into<S: InputSink>(&mut self, translator: &mut EventTranslator<S>) -> Result<CycleReport> {
        self.dispatch()?;
        Ok(translator.drain(self.events()))
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.devices.borrow_mut().release_all();
        info!("Input session closed");
    }
}

fn raw_event(event: &Event) -> RawEvent {
    match event {
        Event::Pointer(PointerEvent::Motion(motion)) => RawEvent::PointerMotion {
            dx: motion.dx(),
            dy: motion.dy(),
        },
        Event::Pointer(PointerEvent::MotionAbsolute(motion)) => RawEvent::PointerMotionAbsolute {
            x: motion.absolute_x(),
            y: motion.absolute_y(),
        },
        Event::Pointer(PointerEvent::Button(button)) => RawEvent::PointerButton {
            button: button.button(),
            pressed: matches!(button.button_state(), ButtonState::Pressed),
        },
        Event::Pointer(PointerEvent::ScrollWheel(wheel)) => RawEvent::ScrollWheel {
            horizontal: wheel
                .has_axis(Axis::Horizontal)
                .then(|| wheel.scroll_value_v120(Axis::Horizontal)),
            vertical: wheel
                .has_axis(Axis::Vertical)
                .then(|| wheel.scroll_value_v120(Axis::Vertical)),
        },
        Event::Keyboard(KeyboardEvent::Key(key)) => RawEvent::Keyboard {
            key: key.key(),
            pressed: matches!(key.key_state(), KeyState::Pressed),
        },
        _ => RawEvent::Other,
    }
}
