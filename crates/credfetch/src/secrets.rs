//! Secret material handling: owner-only temp files and zeroized buffers.

use std::env;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use zeroize::Zeroizing;

use crate::eraser::SecureEraser;
use crate::FetchError;

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A temp file that holds secret bytes for the life of one workflow run.
///
/// The file is created with owner-only permissions before anything is
/// written to it, and erased through the [`SecureEraser`] either explicitly
/// or when the guard drops. Erasure is recorded, so an early `cleanup()`
/// followed by drop stays a single delete.
pub struct SecretFile {
    path: PathBuf,
    eraser: SecureEraser,
    erased: bool,
}

impl SecretFile {
    /// Create a uniquely named, empty, mode-0600 file in the system temp
    /// directory. The handle is closed immediately; the external tools
    /// write to it by path.
    pub fn create(label: &str, suffix: &str, eraser: SecureEraser) -> Result<Self, FetchError> {
        let mut opts = OpenOptions::new();
        opts.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }

        // pid + counter keeps names unique within and across runs; on the
        // rare collision with a leftover file, take the next name.
        for _ in 0..16 {
            let path = unique_path(label, suffix);
            match opts.open(&path) {
                Ok(_) => {
                    return Ok(Self {
                        path,
                        eraser,
                        erased: false,
                    })
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(FetchError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "could not allocate a unique temp file",
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Erase now instead of at drop. Safe to call repeatedly.
    pub fn erase(&mut self) {
        if !self.erased {
            self.eraser.erase(&self.path);
            self.erased = true;
        }
    }
}

impl Drop for SecretFile {
    fn drop(&mut self) {
        self.erase();
    }
}

fn unique_path(label: &str, suffix: &str) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    env::temp_dir().join(format!("{}_{}_{}{}", label, process::id(), n, suffix))
}

/// Prompt for the passphrase without echoing it.
pub fn prompt_passphrase() -> Result<Zeroizing<String>, FetchError> {
    let raw = rpassword::prompt_password("Enter GPG passphrase: ")
        .map_err(FetchError::PassphraseInput)?;
    validate_passphrase(raw)
}

/// Trim and reject empty input. The raw buffer is wiped either way.
fn validate_passphrase(raw: String) -> Result<Zeroizing<String>, FetchError> {
    let raw = Zeroizing::new(raw);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyPassphrase);
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

/// Read the decrypted token from `path`, trimmed.
pub fn read_token(path: &Path) -> Result<Zeroizing<String>, FetchError> {
    let contents = Zeroizing::new(std::fs::read_to_string(path)?);
    let token = contents.trim();
    if token.is_empty() {
        return Err(FetchError::EmptyToken);
    }
    Ok(Zeroizing::new(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eraser::Strategy;
    use std::fs;

    fn plain_eraser() -> SecureEraser {
        SecureEraser::with_strategy(Strategy::Remove)
    }

    #[test]
    fn test_created_empty_with_owner_only_mode() {
        let file = SecretFile::create("credfetch_test", ".gpg", plain_eraser()).unwrap();
        let meta = fs::metadata(file.path()).unwrap();
        assert_eq!(meta.len(), 0);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        }
    }

    #[test]
    fn test_unique_paths() {
        let a = SecretFile::create("credfetch_test", ".txt", plain_eraser()).unwrap();
        let b = SecretFile::create("credfetch_test", ".txt", plain_eraser()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_drop_erases() {
        let path = {
            let file = SecretFile::create("credfetch_test", ".txt", plain_eraser()).unwrap();
            fs::write(file.path(), "ghp_secret").unwrap();
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_erase_is_idempotent() {
        let mut file = SecretFile::create("credfetch_test", ".txt", plain_eraser()).unwrap();
        let path = file.path().to_path_buf();
        file.erase();
        assert!(!path.exists());
        file.erase();
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_passphrase_rejects_whitespace() {
        assert!(matches!(
            validate_passphrase("   \n".to_string()),
            Err(FetchError::EmptyPassphrase)
        ));
        assert!(matches!(
            validate_passphrase(String::new()),
            Err(FetchError::EmptyPassphrase)
        ));
    }

    #[test]
    fn test_passphrase_trimmed() {
        let pw = validate_passphrase("  hunter2\n".to_string()).unwrap();
        assert_eq!(pw.as_str(), "hunter2");
    }

    #[test]
    fn test_read_token_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        fs::write(&path, "ghp_abc123\n").unwrap();
        let token = read_token(&path).unwrap();
        assert_eq!(token.as_str(), "ghp_abc123");
    }

    #[test]
    fn test_read_token_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        fs::write(&path, "\n  \n").unwrap();
        assert!(matches!(read_token(&path), Err(FetchError::EmptyToken)));
    }

    #[test]
    fn test_read_token_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_token(&dir.path().join("gone.txt")),
            Err(FetchError::Io(_))
        ));
    }
}
