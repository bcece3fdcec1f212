//! Sealed file codec
//!
//! Combines the key, the AEAD layer and the text armor into the two
//! operations callers need: turn plaintext into an armored artifact, and
//! turn an armored artifact back into plaintext.

use zeroize::Zeroizing;

use crate::aead::{self, NonceSource};
use crate::armor;
use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};
use crate::kdf::{self, SymmetricKey};

/// Direction of a codec run, chosen explicitly by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plaintext in, armored artifact out
    Seal,
    /// Armored artifact in, plaintext out
    Open,
}

/// Seals and opens artifacts under a single key
///
/// Holds no state besides the key, so one codec may be shared across threads.
#[derive(Debug)]
pub struct SealedFileCodec {
    key: SymmetricKey,
}

impl SealedFileCodec {
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Derive the key from `passphrase` and build a codec around it.
    pub fn from_passphrase(passphrase: &[u8]) -> Result<Self> {
        Ok(Self::new(kdf::derive(passphrase)?))
    }

    /// Seal `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let sealed = aead::seal(&self.key, plaintext)?;
        Ok(armor::wrap(&sealed))
    }

    /// Seal `plaintext` with a nonce drawn from `nonces`.
    pub fn seal_from(&self, nonces: &mut dyn NonceSource, plaintext: &[u8]) -> Result<String> {
        let sealed = aead::seal_from(&self.key, nonces, plaintext)?;
        Ok(armor::wrap(&sealed))
    }

    /// Open an armored artifact.
    ///
    /// Errors are [`ErrorKind::MalformedEncoding`], [`ErrorKind::TruncatedArtifact`]
    /// or [`ErrorKind::AuthenticationFailed`]; no plaintext is returned on failure.
    pub fn open(&self, artifact: &str) -> Result<Zeroizing<Vec<u8>>> {
        let sealed = armor::unwrap(artifact)?;
        aead::open(&self.key, &sealed)
    }

    /// Run the codec in the given direction over raw input bytes.
    ///
    /// In [`Mode::Open`] the input must be the UTF-8 artifact text.
    pub fn process(&self, mode: Mode, input: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match mode {
            Mode::Seal => Ok(Zeroizing::new(self.seal(input)?.into_bytes())),
            Mode::Open => {
                let artifact = std::str::from_utf8(input).map_err(|e| {
                    SealfileError::with_kind_and_source(
                        ErrorCategory::User,
                        ErrorKind::MalformedEncoding,
                        "artifact is not valid UTF-8 text",
                        e,
                    )
                })?;
                self.open(artifact)
            }
        }
    }
}
