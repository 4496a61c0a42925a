//! Negative-errno status codes
//!
//! Watch resources report failures as `-errno` integers (0 is success).
//! On Unix the names and descriptions come from the platform's errno set
//! via `nix`, so codes follow the host (ENOSYS is 38 on Linux, 78 on macOS).

use std::fmt;
use std::io;

/// Status code reported by a watch resource. Zero means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const ENOENT: Status = Status(-errno::ENOENT);
    pub const EACCES: Status = Status(-errno::EACCES);
    pub const EINVAL: Status = Status(-errno::EINVAL);
    pub const ENOSPC: Status = Status(-errno::ENOSPC);
    pub const ENOSYS: Status = Status(-errno::ENOSYS);
    /// Catch-all for errors that carry no OS code
    pub const UNKNOWN: Status = Status(-4094);

    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Symbolic name such as `"ENOENT"`, or `"UNKNOWN"` for codes the
    /// platform does not define
    pub fn name(self) -> String {
        if self.is_ok() {
            return "OK".to_string();
        }
        errno::describe(-self.0).map_or_else(|| "UNKNOWN".to_string(), |(name, _)| name)
    }

    /// Human-readable description of the code
    pub fn description(self) -> &'static str {
        if self.is_ok() {
            return "success";
        }
        errno::describe(-self.0).map_or("unknown error", |(_, desc)| desc)
    }

    /// Convert an I/O error into a status.
    ///
    /// On Unix the raw errno is used directly. Elsewhere, and for errors
    /// without an OS code, the error kind is mapped.
    pub fn from_io_error(err: &io::Error) -> Self {
        match errno::raw(err) {
            Some(code) => Self(-code),
            None => Self::from_io_kind(err.kind()),
        }
    }

    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::ENOENT,
            io::ErrorKind::PermissionDenied => Self::EACCES,
            io::ErrorKind::InvalidInput => Self::EINVAL,
            io::ErrorKind::Unsupported => Self::ENOSYS,
            io::ErrorKind::OutOfMemory => Self(-errno::ENOMEM),
            io::ErrorKind::Interrupted => Self(-errno::EINTR),
            _ => Self::UNKNOWN,
        }
    }
}

#[cfg(unix)]
mod errno {
    use nix::errno::Errno;
    use std::io;

    pub const ENOENT: i32 = Errno::ENOENT as i32;
    pub const EACCES: i32 = Errno::EACCES as i32;
    pub const EINVAL: i32 = Errno::EINVAL as i32;
    pub const ENOSPC: i32 = Errno::ENOSPC as i32;
    pub const ENOSYS: i32 = Errno::ENOSYS as i32;
    pub const ENOMEM: i32 = Errno::ENOMEM as i32;
    pub const EINTR: i32 = Errno::EINTR as i32;

    /// (name, description) of a positive errno
    pub fn describe(errno: i32) -> Option<(String, &'static str)> {
        match Errno::from_i32(errno) {
            Errno::UnknownErrno => None,
            known => Some((format!("{:?}", known), known.desc())),
        }
    }

    pub fn raw(err: &io::Error) -> Option<i32> {
        err.raw_os_error()
    }
}

// Raw OS codes are not errno values here; only the kinds we map are named
#[cfg(not(unix))]
mod errno {
    use std::io;

    pub const ENOENT: i32 = 2;
    pub const EACCES: i32 = 13;
    pub const EINVAL: i32 = 22;
    pub const ENOSPC: i32 = 28;
    pub const ENOSYS: i32 = 38;
    pub const ENOMEM: i32 = 12;
    pub const EINTR: i32 = 4;

    pub fn describe(errno: i32) -> Option<(String, &'static str)> {
        let (name, desc) = match errno {
            ENOENT => ("ENOENT", "no such file or directory"),
            EACCES => ("EACCES", "permission denied"),
            EINVAL => ("EINVAL", "invalid argument"),
            ENOSPC => ("ENOSPC", "no space left on device"),
            ENOSYS => ("ENOSYS", "function not implemented"),
            ENOMEM => ("ENOMEM", "not enough memory"),
            EINTR => ("EINTR", "interrupted system call"),
            _ => return None,
        };
        Some((name.to_string(), desc))
    }

    pub fn raw(_err: &io::Error) -> Option<i32> {
        None
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.description())
    }
}
