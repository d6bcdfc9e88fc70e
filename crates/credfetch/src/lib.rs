//! Credential bootstrap library
//!
//! Retrieves a GPG-encrypted access token from a public location, decrypts
//! it locally with a prompted passphrase, and uses the resulting bearer
//! credential to download a fixed set of files from a private repository.
//! Transfer, decryption, and secure deletion are delegated to external
//! tools (curl, gpg, shred); this crate is the sequencing and the secret
//! hygiene around them.
//!
//! The workflow is strictly one-shot: every failure is terminal, nothing is
//! retried, and on every exit path - success, error, or interrupt - the two
//! temporary files holding secret material are erased and the in-memory
//! token is dropped.

pub mod config;
pub mod decrypt;
pub mod eraser;
pub mod fetcher;
pub mod process;
pub mod runner;
pub mod secrets;
pub mod transfer;

use std::io;
use thiserror::Error;

/// Failure classes for the bootstrap workflow. All of them are terminal:
/// the binary reports one line on stderr and exits with status 1.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0} not installed")]
    MissingDependency(String),

    #[error("Empty passphrase provided")]
    EmptyPassphrase,

    #[error("Failed to read passphrase: {0}")]
    PassphraseInput(io::Error),

    #[error("Failed to download {what}: {detail}")]
    Network { what: String, detail: String },

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("GPG decryption failed")]
    Decryption,

    #[error("Decrypted token file is empty")]
    EmptyToken,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Interrupted by user")]
    Interrupted,
}

pub use eraser::SecureEraser;
pub use fetcher::CredentialFetcher;
pub use process::CancelFlag;
