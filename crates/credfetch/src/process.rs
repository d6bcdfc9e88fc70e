//! Process-level protections: core-dump lockout and interrupt flagging.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::FetchError;

/// Keep secret material out of crash dumps for the life of the process.
pub fn disable_core_dumps() -> io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: setrlimit reads a valid rlimit struct and touches no other state.
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &limit) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

static CANCELLED: AtomicBool = AtomicBool::new(false);

extern "C" fn flag_cancel(_sig: libc::c_int) {
    // A single atomic store: the handler runs at arbitrary points and must
    // not allocate, lock, or touch the filesystem. Cleanup belongs to the
    // Drop guards on the unwind path.
    CANCELLED.store(true, Ordering::SeqCst);
}

/// Cancellation signal shared between the signal handlers and the workflow.
///
/// SIGINT and SIGTERM set the flag; the workflow polls it at step
/// boundaries and inside subprocess waits, then unwinds with
/// [`FetchError::Interrupted`] so temp-file erasure runs on the ordinary
/// exit path.
#[derive(Clone, Copy, Debug)]
pub struct CancelFlag {
    inner: &'static AtomicBool,
}

impl CancelFlag {
    /// Install the SIGINT and SIGTERM handlers and return the flag they set.
    pub fn install() -> io::Result<Self> {
        for sig in [libc::SIGINT, libc::SIGTERM] {
            // SAFETY: flag_cancel is async-signal-safe (one atomic store).
            let prev = unsafe { libc::signal(sig, flag_cancel as libc::sighandler_t) };
            if prev == libc::SIG_ERR {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(Self { inner: &CANCELLED })
    }

    /// A detached flag with no handlers behind it. Used by tests.
    pub const fn from_static(inner: &'static AtomicBool) -> Self {
        Self { inner }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Error out if an interrupt has been flagged.
    pub fn checkpoint(&self) -> Result<(), FetchError> {
        if self.is_cancelled() {
            Err(FetchError::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_core_dumps() {
        // Lowering RLIMIT_CORE to zero is always permitted.
        disable_core_dumps().unwrap();
    }

    #[test]
    fn test_checkpoint_clear() {
        static CLEAR: AtomicBool = AtomicBool::new(false);
        let flag = CancelFlag::from_static(&CLEAR);
        assert!(!flag.is_cancelled());
        assert!(flag.checkpoint().is_ok());
    }

    #[test]
    fn test_checkpoint_set() {
        static SET: AtomicBool = AtomicBool::new(true);
        let flag = CancelFlag::from_static(&SET);
        assert!(flag.is_cancelled());
        assert!(matches!(flag.checkpoint(), Err(FetchError::Interrupted)));
    }
}
