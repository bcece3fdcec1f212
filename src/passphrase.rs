//! Passphrase reading functionality

use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

const DEFAULT_PROMPT: &str = "Passphrase (sealfile): ";
const CONFIRM_PROMPT: &str = "Confirm passphrase (sealfile): ";

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a passphrase as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the passphrase wrapped in `Zeroizing` so it is wiped from
    /// memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed passphrase (for testing)
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<Vec<u8>>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: Vec<u8>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.passphrase).clone()))
    }
}

/// Reads passphrase from any io::Read source, verbatim
pub struct ReaderPassphraseReader {
    reader: Box<dyn Read>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            SealfileError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "error reading passphrase",
                e,
            )
        })?;
        Ok(data)
    }
}

/// Reads passphrase from terminal with no echo
pub struct TerminalPassphraseReader {
    prompt: &'static str,
}

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self {
            prompt: DEFAULT_PROMPT,
        }
    }

    pub fn with_prompt(prompt: &'static str) -> Self {
        Self { prompt }
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    /// Read passphrase from terminal.
    ///
    /// Note: Terminal input is limited to UTF-8 due to rpassword library constraints.
    /// For non-UTF-8 passphrases, use --passphrase-stdin instead.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(SealfileError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(self.prompt.as_bytes())
            .and_then(|_| stderr.flush())
            .map_err(|e| {
                SealfileError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to write prompt",
                    e,
                )
            })?;

        // rpassword hands back a plain String; move it into a zeroizing buffer right away
        let passphrase = rpassword::read_password().map_err(|e| {
            SealfileError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                "failure reading passphrase",
                e,
            )
        })?;

        Ok(Zeroizing::new(passphrase.into_bytes()))
    }
}

/// Reads the passphrase twice and fails if the two entries differ
///
/// Used when creating a new artifact, where a typo would make the file
/// unrecoverable.
pub struct ConfirmingPassphraseReader {
    first: Box<dyn PassphraseReader>,
    confirm: Box<dyn PassphraseReader>,
}

impl ConfirmingPassphraseReader {
    pub fn new(first: Box<dyn PassphraseReader>, confirm: Box<dyn PassphraseReader>) -> Self {
        Self { first, confirm }
    }

    /// Prompt on the terminal, then prompt again for confirmation.
    pub fn terminal() -> Self {
        Self::new(
            Box::new(TerminalPassphraseReader::new()),
            Box::new(TerminalPassphraseReader::with_prompt(CONFIRM_PROMPT)),
        )
    }
}

impl PassphraseReader for ConfirmingPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let passphrase = self.first.read_passphrase()?;
        let confirmation = self.confirm.read_passphrase()?;
        if *passphrase != *confirmation {
            return Err(SealfileError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseMismatch,
                "passphrases do not match",
            ));
        }
        Ok(passphrase)
    }
}
