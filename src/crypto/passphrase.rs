//! Transient passphrase values.
//!
//! A passphrase lives only as long as the gateway call that consumes it. The
//! backing string is wiped when the value is dropped.

use crate::constants::REDACTED_PLACEHOLDER;
use crate::errors::{AppResult, CryptoError};
use std::fmt;
use zeroize::Zeroizing;

/// A secret string whose storage is zeroized on drop.
///
/// # Example
///
/// ```
/// use gpgedit::crypto::Passphrase;
///
/// let passphrase = Passphrase::new("correct horse".to_string());
/// assert_eq!(passphrase.expose(), "correct horse");
/// assert!(!format!("{:?}", passphrase).contains("horse"));
/// ```
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// Take ownership of `secret`. The string is wiped when the passphrase is dropped.
    pub fn new(secret: String) -> Self {
        Self(Zeroizing::new(secret))
    }

    /// Borrow the secret for handing it to a subprocess.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare for a confirmation prompt without stopping at the first differing byte.
    pub fn matches(&self, other: &Passphrase) -> bool {
        let a = self.0.as_bytes();
        let b = other.0.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }

    /// Reject empty input.
    pub fn non_empty(self) -> AppResult<Self> {
        if self.is_empty() {
            return Err(CryptoError::EmptyPassphrase.into());
        }
        Ok(self)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Passphrase")
            .field(&REDACTED_PLACEHOLDER)
            .finish()
    }
}

/// The passphrases collected for one session.
///
/// `current` unlocks the existing file; `replacement` is set only when the user
/// asked to change the passphrase.
#[derive(Debug)]
pub struct Passphrases {
    current: Passphrase,
    replacement: Option<Passphrase>,
}

impl Passphrases {
    pub fn new(current: Passphrase, replacement: Option<Passphrase>) -> Self {
        Self {
            current,
            replacement,
        }
    }

    /// The passphrase used for decryption.
    pub fn current(&self) -> &Passphrase {
        &self.current
    }

    /// Consume the set, keeping only the key for re-encryption.
    ///
    /// When a replacement exists the old passphrase is dropped here.
    pub fn into_encryption_key(self) -> Passphrase {
        match self.replacement {
            Some(replacement) => replacement,
            None => self.current,
        }
    }
}
