//! Subprocess execution with an enforced deadline.
//!
//! Every external tool call goes through here, so no blocking wait can
//! outlive its budget and the interrupt flag is observed even while a
//! transfer or decrypt is in flight.

use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use crate::process::CancelFlag;
use crate::FetchError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawn `cmd` and wait for it with [`wait_with_timeout`].
pub fn run_with_timeout(
    mut cmd: Command,
    what: &str,
    timeout: Duration,
    cancel: Option<CancelFlag>,
) -> Result<ExitStatus, FetchError> {
    let mut child = cmd.spawn()?;
    wait_with_timeout(&mut child, what, timeout, cancel)
}

/// Wait for `child`, polling so the deadline and the interrupt flag are
/// both honored. The child never outlives this call: on timeout or
/// cancellation it is killed and reaped before the error is returned.
pub fn wait_with_timeout(
    child: &mut Child,
    what: &str,
    timeout: Duration,
    cancel: Option<CancelFlag>,
) -> Result<ExitStatus, FetchError> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if let Some(flag) = cancel {
            if flag.is_cancelled() {
                kill_and_reap(child);
                return Err(FetchError::Interrupted);
            }
        }

        if Instant::now() >= deadline {
            kill_and_reap(child);
            return Err(FetchError::Timeout {
                what: what.to_string(),
                secs: timeout.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Terminate a child and collect its exit status so no zombie is left.
pub fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
