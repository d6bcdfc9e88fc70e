//! Fixed endpoints and budgets.
//!
//! There is deliberately no file, environment, or flag surface here: the
//! tool bootstraps credentials for one known repository, and a wider
//! configuration surface would only widen what has to be audited.

use std::time::Duration;

/// Public HTTPS location of the GPG-encrypted access token.
pub const ENCRYPTED_TOKEN_URL: &str =
    "https://github.com/kmicb/keys/raw/refs/heads/main/gh_token.txt.gpg";

/// Private raw-content base URL; manifest paths are relative to this.
pub const PRIVATE_RAW_BASE: &str = "https://raw.githubusercontent.com/kmicb/rpi/main";

/// Files pulled once the token is decrypted: (path under the base URL,
/// local destination).
pub const MANIFEST: &[(&str, &str)] = &[
    ("setup_rpi.py", "setup_rpi.py"),
    ("config.ini", "config.ini"),
];

/// Upper bound for each network transfer.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for the gpg decrypt call.
pub const DECRYPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for one shred run over a temp file.
pub const ERASE_TIMEOUT: Duration = Duration::from_secs(5);
