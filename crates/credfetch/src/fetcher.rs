//! The bootstrap workflow.

use std::path::Path;

use tracing::debug;
use which::which;
use zeroize::Zeroizing;

use crate::config::{ENCRYPTED_TOKEN_URL, PRIVATE_RAW_BASE};
use crate::decrypt;
use crate::eraser::SecureEraser;
use crate::process::CancelFlag;
use crate::secrets::{self, SecretFile};
use crate::transfer;
use crate::FetchError;

/// Owns the secret material for one run: the two temp files, and the
/// decrypted token while the authenticated downloads are in flight.
///
/// Every step short-circuits on the first error, and the interrupt flag is
/// checked at each step boundary. Cleanup is guaranteed on all exit paths:
/// the temp files erase themselves at drop, and [`cleanup`](Self::cleanup)
/// can run the same erasure early.
pub struct CredentialFetcher {
    encrypted: SecretFile,
    plaintext: SecretFile,
    token: Option<Zeroizing<String>>,
    cancel: CancelFlag,
}

impl CredentialFetcher {
    /// Allocate both temp files up front, owner-only, before any secret
    /// byte exists to put in them.
    pub fn new(eraser: SecureEraser, cancel: CancelFlag) -> Result<Self, FetchError> {
        Ok(Self {
            encrypted: SecretFile::create("credfetch", ".gpg", eraser)?,
            plaintext: SecretFile::create("credfetch", ".txt", eraser)?,
            token: None,
            cancel,
        })
    }

    /// Fail with [`FetchError::MissingDependency`] unless `tool` is on PATH.
    pub fn check_prerequisite(&self, tool: &str) -> Result<(), FetchError> {
        which(tool)
            .map(|_| ())
            .map_err(|_| FetchError::MissingDependency(tool.to_string()))
    }

    /// Execute the full workflow: prerequisites, passphrase, token fetch,
    /// decrypt, then one authenticated download per manifest entry.
    pub fn run(&mut self, manifest: &[(&str, &str)]) -> Result<(), FetchError> {
        self.cancel.checkpoint()?;
        self.check_prerequisite("gpg")?;
        self.check_prerequisite("curl")?;

        let passphrase = secrets::prompt_passphrase()?;
        self.cancel.checkpoint()?;

        debug!("fetching encrypted token");
        transfer::fetch(
            ENCRYPTED_TOKEN_URL,
            self.encrypted.path(),
            None,
            "encrypted token",
            self.cancel,
        )?;
        self.cancel.checkpoint()?;

        decrypt::decrypt(
            self.encrypted.path(),
            self.plaintext.path(),
            &passphrase,
            self.cancel,
        )?;
        drop(passphrase);
        self.cancel.checkpoint()?;

        self.token = Some(secrets::read_token(self.plaintext.path())?);

        for &(remote, dest) in manifest {
            self.cancel.checkpoint()?;
            let url = format!("{}/{}", PRIVATE_RAW_BASE, remote);
            let bearer = self.token.as_ref().map(|t| t.as_str());
            transfer::fetch(&url, Path::new(dest), bearer, dest, self.cancel)?;
            debug!(file = %dest, "downloaded");
        }

        Ok(())
    }

    /// Erase both temp files and drop the in-memory token. Idempotent, and
    /// also implied by drop.
    pub fn cleanup(&mut self) {
        self.encrypted.erase();
        self.plaintext.erase();
        self.token = None;
    }
}
