//! Cryptographic plumbing for an edit session.
//!
//! Nothing in here implements a cipher. Encryption is delegated to GnuPG; this
//! module only decides how gpg is invoked, how passphrases are held, and where
//! plaintext is allowed to exist.
//!
//! # Module Structure
//!
//! - `gpg`: the gateway that runs gpg with the passphrase on a private pipe
//! - `passphrase`: zeroize-on-drop passphrase values
//! - `workspace`: the owner-only scratch directory on RAM-backed storage

pub mod gpg;
pub mod passphrase;
pub mod workspace;

// Re-export commonly used types
pub use self::gpg::CryptoGateway;
pub use self::passphrase::{Passphrase, Passphrases};
pub use self::workspace::{current_user_name, SecureWorkspace, WorkspaceConfig};
