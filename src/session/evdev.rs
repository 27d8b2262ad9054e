//! `EVIOCGRAB`: kernel-level exclusive access to an evdev node.

use std::io;
use std::os::fd::RawFd;

// asm-generic/ioctl.h layout; powerpc, mips and sparc use a 3-bit
// direction field with a different write bit.
#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64", target_arch = "mips", target_arch = "mips64", target_arch = "sparc", target_arch = "sparc64"))]
const IOC_WRITE: libc::c_ulong = 4;
#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64", target_arch = "mips", target_arch = "mips64", target_arch = "sparc", target_arch = "sparc64"))]
const IOC_SIZEBITS: u32 = 13;

#[cfg(not(any(target_arch = "powerpc", target_arch = "powerpc64", target_arch = "mips", target_arch = "mips64", target_arch = "sparc", target_arch = "sparc64")))]
const IOC_WRITE: libc::c_ulong = 1;
#[cfg(not(any(target_arch = "powerpc", target_arch = "powerpc64", target_arch = "mips", target_arch = "mips64", target_arch = "sparc", target_arch = "sparc64")))]
const IOC_SIZEBITS: u32 = 14;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;

/// `_IOW(ty, nr, size)`.
const fn ioc_write(ty: u8, nr: u8, size: usize) -> libc::c_ulong {
    let size_shift = IOC_NRBITS + IOC_TYPEBITS;
    let dir_shift = size_shift + IOC_SIZEBITS;
    (IOC_WRITE << dir_shift)
        | ((size as libc::c_ulong) << size_shift)
        | ((ty as libc::c_ulong) << IOC_NRBITS)
        | nr as libc::c_ulong
}

/// `_IOW('E', 0x90, int)` from linux/input.h.
const EVIOCGRAB: libc::c_ulong = ioc_write(b'E', 0x90, std::mem::size_of::<libc::c_int>());

/// Control over a device's exclusive grab.
pub trait ExclusiveAccess {
    fn set_exclusive(&self, fd: RawFd, exclusive: bool) -> io::Result<()>;
}

/// Grabs through the evdev ioctl.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevGrab;

impl ExclusiveAccess for EvdevGrab {
    fn set_exclusive(&self, fd: RawFd, exclusive: bool) -> io::Result<()> {
        // SAFETY: EVIOCGRAB takes an int by value and does not retain
        // anything; an invalid fd just yields EBADF.
        let rc = unsafe { libc::ioctl(fd, EVIOCGRAB as _, libc::c_int::from(exclusive)) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
