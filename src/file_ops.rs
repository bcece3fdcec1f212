//! File encryption/decryption operations
//!
//! This module provides high-level file operations for encrypting, decrypting,
//! and updating files using the sealfile artifact format.

use crate::codec::{Mode, SealedFileCodec};
use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};
use crate::passphrase::PassphraseReader;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Encrypt a file with a passphrase
///
/// Reads plaintext from `input_path`, encrypts it using a passphrase from
/// `passphrase_reader`, and writes the armored artifact to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    run_file(Mode::Seal, input_path, output_path, passphrase_reader)
}

/// Decrypt a file with a passphrase
///
/// Reads the armored artifact from `input_path`, decrypts it using a passphrase from
/// `passphrase_reader`, and writes the plaintext to `output_path`. Nothing is
/// written unless the artifact authenticates.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    run_file(Mode::Open, input_path, output_path, passphrase_reader)
}

fn run_file(
    mode: Mode,
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let input = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    debug!(?mode, path = %input_path.display(), len = input.len(), "read input");

    let input = match mode {
        Mode::Seal => &input[..],
        Mode::Open => trim_trailing_whitespace(&input),
    };

    let passphrase = passphrase_reader.read_passphrase()?;
    let codec = SealedFileCodec::from_passphrase(&passphrase)?;
    let output = codec.process(mode, input).map_err(|e| match mode {
        Mode::Seal => e.with_context("encryption failed"),
        Mode::Open => e.with_context("failed to decrypt"),
    })?;

    write_file_secure(output_path, &output)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    info!(?mode, path = %output_path.display(), len = output.len(), "wrote output");
    Ok(())
}

/// Update an encrypted file with new plaintext using the same passphrase
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the passphrase
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext under a fresh nonce
/// 4. Atomically replaces `crypt_path`
///
/// The passphrase validation prevents accidental passphrase changes.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let armored = fs::read(crypt_path).map_err(|e| read_error(crypt_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let codec = SealedFileCodec::from_passphrase(&passphrase)?;

    // Validate passphrase by decrypting existing file (discard plaintext)
    codec
        .process(Mode::Open, trim_trailing_whitespace(&armored))
        .map_err(|e| e.with_context("failed to decrypt"))?;
    debug!(path = %crypt_path.display(), "existing artifact authenticated");

    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_armored = codec
        .seal(&new_plaintext)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    write_file_secure(crypt_path, new_armored.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", crypt_path.display())))?;
    info!(path = %crypt_path.display(), len = new_armored.len(), "replaced artifact");
    Ok(())
}

/// Drops trailing ASCII whitespace, such as the newline an editor appends.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> SealfileError {
    SealfileError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}

/// Write a file atomically with secure permissions (0o600 on Unix)
///
/// Contents go to a tempfile in the destination directory, which is flushed,
/// fsynced and renamed over `path`. Either the old file or the complete new
/// file exists afterwards, never a partial one.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        io_error(
            ErrorCategory::User,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                io_error(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file
        .write_all(contents)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", path.display()),
            e.error,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> SealfileError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    io_error(category, format!("failed to read from {}", path.display()), err)
}
