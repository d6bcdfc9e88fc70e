//! Secure-delete capability.
//!
//! PATH is probed for shred once, at startup; every erase after that uses
//! the fixed strategy. Erasure never fails outward: a file that is already
//! gone, or a shred run that breaks or overruns, ends in a plain remove
//! with the error swallowed. Only recoverable secret content would be a
//! problem, and neither outcome leaves any.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;
use which::which;

use crate::config::ERASE_TIMEOUT;
use crate::runner;

/// How temp files get destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Multi-pass overwrite via shred, then unlink.
    Shred,
    /// Plain unlink; used when shred is not on PATH.
    Remove,
}

/// Fixed-strategy eraser handed to every [`SecretFile`](crate::secrets::SecretFile).
#[derive(Debug, Clone, Copy)]
pub struct SecureEraser {
    strategy: Strategy,
}

impl SecureEraser {
    /// Probe PATH for shred and fix the strategy for the process lifetime.
    pub fn detect() -> Self {
        let strategy = if which("shred").is_ok() {
            Strategy::Shred
        } else {
            Strategy::Remove
        };
        debug!(?strategy, "secure eraser ready");
        Self { strategy }
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Destroy `path`: overwrite passes when shred is the strategy, then
    /// unlink. Idempotent and quiet.
    pub fn erase(&self, path: &Path) {
        if !path.exists() {
            return;
        }

        if self.strategy == Strategy::Shred {
            self.overwrite(path);
        }

        if let Err(e) = fs::remove_file(path) {
            debug!("could not remove {}: {}", path.display(), e);
        }
    }

    /// Best-effort multi-pass overwrite with its own deadline. Failures are
    /// logged and the unlink above still runs.
    fn overwrite(&self, path: &Path) {
        let mut cmd = Command::new("shred");
        cmd.args(["-fz", "-n", "3"]).arg(path).stderr(Stdio::null());

        match runner::run_with_timeout(cmd, "shred", ERASE_TIMEOUT, None) {
            Ok(status) if !status.success() => {
                debug!("shred of {} exited with {}", path.display(), status);
            }
            Err(e) => {
                debug!("shred of {} failed: {}", path.display(), e);
            }
            Ok(_) => {}
        }
    }
}
