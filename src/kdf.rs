//! Passphrase to key derivation
//!
//! The key is the SHA-256 digest of the raw passphrase bytes. There is no
//! salt and no work factor: the same passphrase always yields the same key,
//! and a stolen artifact can be attacked offline at hash speed. This is a
//! known weakness of the artifact format, kept for compatibility.

use std::fmt;

use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};

/// Length of the derived key in bytes
pub const KEY_LEN: usize = 32;

/// Minimum accepted passphrase length in bytes
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// A 256-bit symmetric key, wiped from memory on drop.
pub struct SymmetricKey(Zeroizing<[u8; KEY_LEN]>);

impl SymmetricKey {
    /// Wraps raw key material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Reject passphrases shorter than [`MIN_PASSPHRASE_LEN`] bytes.
pub fn validate_passphrase(passphrase: &[u8]) -> Result<()> {
    if passphrase.len() < MIN_PASSPHRASE_LEN {
        return Err(SealfileError::with_kind(
            ErrorCategory::User,
            ErrorKind::WeakPassphrase,
            format!(
                "passphrase must be at least {} bytes (got {})",
                MIN_PASSPHRASE_LEN,
                passphrase.len()
            ),
        ));
    }
    Ok(())
}

/// Derive a key from a passphrase.
///
/// Fails with [`ErrorKind::WeakPassphrase`] before any hashing if the
/// passphrase is too short.
pub fn derive(passphrase: &[u8]) -> Result<SymmetricKey> {
    validate_passphrase(passphrase)?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let mut hasher = Sha256::new();
    hasher.update(passphrase);
    hasher.finalize_into(GenericArray::from_mut_slice(&mut key[..]));

    Ok(SymmetricKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let key = derive(b"password123").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f"
        );
    }

    #[test]
    fn test_deterministic() {
        let k1 = derive(b"correct horse battery staple").unwrap();
        let k2 = derive(b"correct horse battery staple").unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_passphrases_different_keys() {
        let k1 = derive(b"password123").unwrap();
        let k2 = derive(b"password124").unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_seven_bytes_rejected() {
        let err = derive(b"1234567").expect_err("expected weak passphrase error");
        assert_eq!(err.kind, Some(ErrorKind::WeakPassphrase));
        assert_eq!(err.category, ErrorCategory::User);
        assert!(err.message().contains("(got 7)"));
    }

    #[test]
    fn test_empty_rejected() {
        let err = derive(b"").expect_err("expected weak passphrase error");
        assert_eq!(err.kind, Some(ErrorKind::WeakPassphrase));
    }

    #[test]
    fn test_eight_bytes_accepted() {
        assert!(derive(b"12345678").is_ok());
    }

    #[test]
    fn test_length_counts_bytes_not_chars() {
        // Four characters, eight UTF-8 bytes.
        assert!(validate_passphrase("ääää".as_bytes()).is_ok());
    }

    #[test]
    fn test_debug_redacts() {
        let key = SymmetricKey::from_bytes([0xAB; KEY_LEN]);
        let shown = format!("{:?}", key);
        assert_eq!(shown, "SymmetricKey([REDACTED])");
        assert!(!shown.to_lowercase().contains("ab"));
    }
}
