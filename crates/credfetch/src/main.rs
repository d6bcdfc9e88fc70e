//! credfetch - credential bootstrap
//!
//! Downloads a GPG-encrypted access token, decrypts it with a prompted
//! passphrase, pulls the files the token grants access to, and erases
//! every trace of the secret material on the way out.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use credfetch::config::MANIFEST;
use credfetch::{CancelFlag, CredentialFetcher, SecureEraser};

#[derive(Parser)]
#[command(name = "credfetch")]
#[command(about = "Fetch an encrypted token, decrypt it, and download private files with it")]
#[command(version)]
#[derive(Debug)]
#[command(after_help = r#"WORKFLOW:
    1. curl the encrypted token from its public location
    2. gpg --decrypt with your passphrase (prompted, never echoed)
    3. curl each private file with the decrypted bearer token
    4. erase both temp files (shred when available, plain delete otherwise)

SECURITY:
    - Temp files are created mode 0600 before any content is written
    - The passphrase goes to gpg over stdin, never on the command line
    - Core dumps are disabled for the life of the process
    - Ctrl+C still erases everything before exiting with status 1"#)]
struct Cli {}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let _cli = Cli::parse();

    match bootstrap() {
        Ok(()) => {
            println!("success: Downloaded {} files", MANIFEST.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn bootstrap() -> Result<()> {
    credfetch::process::disable_core_dumps().context("Failed to disable core dumps")?;
    let cancel = CancelFlag::install().context("Failed to install signal handlers")?;
    let eraser = SecureEraser::detect();

    let mut fetcher = CredentialFetcher::new(eraser, cancel)?;
    let result = fetcher.run(MANIFEST);
    fetcher.cleanup();
    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_parse() {
        Cli::try_parse_from(["credfetch"]).unwrap();
    }

    #[test]
    fn test_cli_rejects_stray_args() {
        assert!(Cli::try_parse_from(["credfetch", "extra"]).is_err());
    }

    #[test]
    fn test_cli_version() {
        let err = Cli::try_parse_from(["credfetch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}
