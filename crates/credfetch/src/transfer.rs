//! Transfer client wrapper.
//!
//! All HTTP goes through curl: `-f` turns HTTP errors into exit codes,
//! `-sS` keeps progress quiet but real errors visible, `-L` follows the
//! redirect GitHub serves for raw content.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::config::TRANSFER_TIMEOUT;
use crate::process::CancelFlag;
use crate::runner;
use crate::FetchError;

/// Download `url` into `dest`, optionally authenticating with a bearer
/// token. `label` names the payload in error messages.
pub fn fetch(
    url: &str,
    dest: &Path,
    token: Option<&str>,
    label: &str,
    cancel: CancelFlag,
) -> Result<(), FetchError> {
    debug!(%url, "transfer start");

    let what = format!("Download of {}", label);
    let status = runner::run_with_timeout(
        curl_command(url, dest, token),
        &what,
        TRANSFER_TIMEOUT,
        Some(cancel),
    )?;

    if !status.success() {
        return Err(FetchError::Network {
            what: label.to_string(),
            detail: format!("curl exited with {}", status),
        });
    }

    Ok(())
}

fn curl_command(url: &str, dest: &Path, token: Option<&str>) -> Command {
    let mut cmd = Command::new("curl");
    cmd.arg("-fsSL");
    if let Some(token) = token {
        cmd.arg("-H").arg(format!("Authorization: token {}", token));
    }
    cmd.arg(url).arg("-o").arg(dest);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(cmd: &Command) -> Vec<OsString> {
        cmd.get_args().map(|a| a.to_os_string()).collect()
    }

    #[test]
    fn test_anonymous_curl_args() {
        let cmd = curl_command("https://example.com/blob.gpg", Path::new("/tmp/out.gpg"), None);
        assert_eq!(cmd.get_program(), "curl");
        assert_eq!(
            args(&cmd),
            ["-fsSL", "https://example.com/blob.gpg", "-o", "/tmp/out.gpg"]
        );
    }

    #[test]
    fn test_bearer_header_args() {
        let cmd = curl_command(
            "https://example.com/config.ini",
            Path::new("config.ini"),
            Some("ghp_abc123"),
        );
        assert_eq!(
            args(&cmd),
            [
                "-fsSL",
                "-H",
                "Authorization: token ghp_abc123",
                "https://example.com/config.ini",
                "-o",
                "config.ini",
            ]
        );
    }
}
