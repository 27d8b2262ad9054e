//! Device table: the open/close hooks libinput calls, and the grab
//! bookkeeping for every descriptor they hand out.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use input::LibinputInterface;
use tracing::{debug, warn};

use super::evdev::ExclusiveAccess;
use crate::error::StealerError;
use crate::grab::GrabTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedDevice {
    fd: RawFd,
    path: PathBuf,
}

/// Every descriptor opened on libinput's behalf, plus the grab flag they
/// should currently reflect.
pub struct DeviceTable {
    captured: bool,
    tracked: Vec<TrackedDevice>,
    control: Box<dyn ExclusiveAccess>,
}

impl DeviceTable {
    pub fn new(captured: bool, control: Box<dyn ExclusiveAccess>) -> Self {
        Self {
            captured,
            tracked: Vec::new(),
            control,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Open a device node, grabbing it when captured.
    ///
    /// A failed grab leaves the device open and usable; the error is the
    /// raw errno libinput expects.
    pub fn open(&mut self, path: &Path, flags: i32) -> Result<OwnedFd, i32> {
        let access = flags & libc::O_ACCMODE;
        let file = OpenOptions::new()
            .custom_flags(flags)
            .read(access != libc::O_WRONLY)
            .write(access != libc::O_RDONLY)
            .open(path)
            .map_err(|e| {
                debug!(path = %path.display(), error = %e, "Device node open failed");
                e.raw_os_error().unwrap_or(libc::EIO)
            })?;

        let fd = OwnedFd::from(file);
        if self.captured {
            self.apply(fd.as_raw_fd(), path, true);
        }
        self.tracked.push(TrackedDevice {
            fd: fd.as_raw_fd(),
            path: path.to_path_buf(),
        });
        debug!(path = %path.display(), captured = self.captured, "Device node opened");
        Ok(fd)
    }

    /// Release the grab if held, forget the descriptor, then close it.
    pub fn close(&mut self, fd: OwnedFd) {
        let raw = fd.as_raw_fd();
        match self.tracked.iter().position(|d| d.fd == raw) {
            Some(index) => {
                let device = self.tracked.remove(index);
                if self.captured {
                    self.apply(raw, &device.path, false);
                }
                debug!(path = %device.path.display(), "Device node closed");
            }
            None => debug!(fd = raw, "Closing untracked descriptor"),
        }
        drop(File::from(fd));
    }

    /// Move every tracked descriptor to the given grab state. Returns the
    /// number of devices whose grab call failed.
    pub fn set_captured(&mut self, captured: bool) -> usize {
        self.captured = captured;
        let mut failed = 0;
        for device in &self.tracked {
            if !self.apply(device.fd, &device.path, captured) {
                failed += 1;
            }
        }
        failed
    }

    /// Drop every outstanding grab. Descriptors stay open for libinput to
    /// close.
    pub fn release_all(&mut self) {
        if self.captured {
            self.set_captured(false);
        }
    }

    fn apply(&self, fd: RawFd, path: &Path, grab: bool) -> bool {
        match self.control.set_exclusive(fd, grab) {
            Ok(()) => true,
            Err(source) => {
                let err = StealerError::GrabApply {
                    path: path.to_path_buf(),
                    grab,
                    source,
                };
                warn!("{}", err);
                false
            }
        }
    }
}

/// libinput's `open_restricted`/`close_restricted` hooks, backed by a
/// shared [`DeviceTable`].
pub struct RestrictedInterface(pub Rc<RefCell<DeviceTable>>);

impl LibinputInterface for RestrictedInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> Result<OwnedFd, i32> {
        self.0.borrow_mut().open(path, flags)
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        self.0.borrow_mut().close(fd);
    }
}

/// The toggle's handle on the table.
pub struct DeviceGrabs(pub Rc<RefCell<DeviceTable>>);

impl GrabTarget for DeviceGrabs {
    fn set_captured(&mut self, captured: bool) -> usize {
        self.0.borrow_mut().set_captured(captured)
    }

    fn device_count(&self) -> usize {
        self.0.borrow().len()
    }
}
