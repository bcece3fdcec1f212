//! Authenticated encryption of raw bytes using Serpent-GCM
//!
//! This module implements the binary layer of the artifact format:
//! - Serpent with a 256-bit key as the 128-bit block cipher
//! - GCM for confidentiality and integrity, no associated data
//!
//! The binary format is:
//! - nonce: 12 bytes
//! - ciphertext: same length as the plaintext
//! - tag: 16 bytes

use aes_gcm::AesGcm;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serpent::Serpent;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};
use crate::kdf::SymmetricKey;

/// GCM over Serpent with a 96-bit nonce and the default 128-bit tag
type SerpentGcm = AesGcm<Serpent, U12>;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Smallest valid sealed payload: a nonce and the tag of an empty plaintext
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Source of fresh nonces
///
/// Implementations must never hand out the same nonce twice for one key.
pub trait NonceSource {
    fn fill_nonce(&mut self, nonce: &mut [u8; NONCE_LEN]) -> Result<()>;
}

/// Draws nonces from the operating system's CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn fill_nonce(&mut self, nonce: &mut [u8; NONCE_LEN]) -> Result<()> {
        OsRng.try_fill_bytes(nonce).map_err(|e| {
            SealfileError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::RandomSourceUnavailable,
                format!("failed to generate nonce: {}", e),
            )
        })
    }
}

fn cipher(key: &SymmetricKey) -> Result<SerpentGcm> {
    let block = Serpent::new_from_slice(key.as_bytes()).map_err(|e| {
        SealfileError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            format!("serpent rejected a 256-bit key: {}", e),
        )
    })?;
    Ok(SerpentGcm::from(block))
}

/// Seal plaintext under `key` with a nonce from the OS random source
///
/// Returns the binary format: nonce(12) + ciphertext + tag(16)
pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    seal_from(key, &mut OsNonceSource, plaintext)
}

/// Seal plaintext under `key` with a nonce taken from `nonces`
pub fn seal_from(
    key: &SymmetricKey,
    nonces: &mut dyn NonceSource,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    nonces.fill_nonce(&mut nonce)?;
    seal_with_nonce(key, plaintext, &nonce)
}

/// Seal plaintext under `key` with the provided nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - reusing a nonce under one key breaks GCM.
pub fn seal_with_nonce(
    key: &SymmetricKey,
    plaintext: &[u8],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let cipher = cipher(key)?;
    let tagged = cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| {
            SealfileError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                format!("encryption failed: {}", e),
            )
        })?;

    let mut output = Vec::with_capacity(NONCE_LEN + tagged.len());
    output.extend_from_slice(nonce);
    output.extend_from_slice(&tagged);

    tracing::trace!(
        plaintext_len = plaintext.len(),
        sealed_len = output.len(),
        "sealed payload"
    );
    Ok(output)
}

/// Open a sealed payload
///
/// The tag is verified before any plaintext is returned; on failure nothing
/// is released.
pub fn open(key: &SymmetricKey, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < MIN_SEALED_LEN {
        return Err(SealfileError::with_kind(
            ErrorCategory::User,
            ErrorKind::TruncatedArtifact,
            format!(
                "input likely truncated: need at least {} bytes for nonce and tag, got {}",
                MIN_SEALED_LEN,
                sealed.len()
            ),
        ));
    }

    let (nonce, tagged) = sealed.split_at(NONCE_LEN);
    let cipher = cipher(key)?;
    let plaintext = cipher
        .decrypt(GenericArray::from_slice(nonce), tagged)
        .map_err(|_| {
            SealfileError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailed,
                "corrupt input, tampered-with data, or bad passphrase",
            )
        })?;

    tracing::trace!(sealed_len = sealed.len(), "opened payload");
    Ok(Zeroizing::new(plaintext))
}
