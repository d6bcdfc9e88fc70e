//! Decryption tool wrapper.
//!
//! gpg runs in batch + loopback mode with the symmetric-key cache off, and
//! receives the passphrase on stdin (`--passphrase-fd 0`). The passphrase
//! is never placed on the command line, where process listings would
//! expose it.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::DECRYPT_TIMEOUT;
use crate::process::CancelFlag;
use crate::runner;
use crate::FetchError;

/// Decrypt `encrypted` into `output` with the given passphrase.
pub fn decrypt(
    encrypted: &Path,
    output: &Path,
    passphrase: &Zeroizing<String>,
    cancel: CancelFlag,
) -> Result<(), FetchError> {
    debug!("gpg decrypt start");

    let mut child = gpg_command(encrypted, output).spawn()?;

    // Feed the passphrase and close the pipe so gpg sees EOF. A broken
    // pipe means gpg already exited; its status decides the outcome.
    match child.stdin.take() {
        Some(mut stdin) => {
            let write = stdin
                .write_all(passphrase.as_bytes())
                .and_then(|_| stdin.write_all(b"\n"));
            if let Err(e) = write {
                if e.kind() != ErrorKind::BrokenPipe {
                    runner::kill_and_reap(&mut child);
                    return Err(e.into());
                }
            }
        }
        None => {
            runner::kill_and_reap(&mut child);
            return Err(FetchError::Io(std::io::Error::new(
                ErrorKind::Other,
                "failed to open gpg stdin",
            )));
        }
    }

    let status = runner::wait_with_timeout(
        &mut child,
        "GPG decryption",
        DECRYPT_TIMEOUT,
        Some(cancel),
    )?;

    if !status.success() {
        return Err(FetchError::Decryption);
    }

    Ok(())
}

fn gpg_command(encrypted: &Path, output: &Path) -> Command {
    let mut cmd = Command::new("gpg");
    cmd.args([
        "--quiet",
        "--batch",
        "--yes",
        "--pinentry-mode",
        "loopback",
        "--no-symkey-cache",
        "--decrypt",
        "--passphrase-fd",
        "0",
    ])
    .arg("--output")
    .arg(output)
    .arg(encrypted)
    .stdin(Stdio::piped())
    .stderr(Stdio::null());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_gpg_args_keep_passphrase_off_argv() {
        let cmd = gpg_command(Path::new("/tmp/in.gpg"), Path::new("/tmp/out.txt"));
        assert_eq!(cmd.get_program(), "gpg");

        let args: Vec<OsString> = cmd.get_args().map(|a| a.to_os_string()).collect();
        assert_eq!(
            args,
            [
                "--quiet",
                "--batch",
                "--yes",
                "--pinentry-mode",
                "loopback",
                "--no-symkey-cache",
                "--decrypt",
                "--passphrase-fd",
                "0",
                "--output",
                "/tmp/out.txt",
                "/tmp/in.gpg",
            ]
        );
        // The passphrase travels over stdin only.
        assert!(args.iter().all(|a| a != "--passphrase"));
    }
}
