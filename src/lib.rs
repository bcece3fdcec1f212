//! sealfile - Passphrase-based file encryption using Serpent-GCM

#![forbid(unsafe_code)]

pub mod aead;
pub mod armor;
pub mod codec;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod passphrase;

pub use codec::{Mode, SealedFileCodec};
pub use error::{ErrorCategory, ErrorKind, Result, SealfileError};
pub use kdf::SymmetricKey;
