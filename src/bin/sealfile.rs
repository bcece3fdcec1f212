//! sealfile CLI - Passphrase-based file encryption
//!
//! Command-line interface for encrypting and decrypting files using
//! Serpent-GCM with a SHA-256 derived key.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Level;

use sealfile::file_ops;
use sealfile::passphrase::{
    ConfirmingPassphraseReader, PassphraseReader, ReaderPassphraseReader,
    TerminalPassphraseReader,
};

#[derive(Parser)]
#[command(name = "sealfile")]
#[command(version)]
#[command(about = "Passphrase-based file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the unencrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing sealfile artifact to replace with encrypted text
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt { input, output } => {
            let mut reader = passphrase_reader(cli.passphrase_stdin, true);
            file_ops::encrypt_file(&input, &output, &mut *reader)
        }
        Commands::Decrypt { input, output } => {
            let mut reader = passphrase_reader(cli.passphrase_stdin, false);
            file_ops::decrypt_file(&input, &output, &mut *reader)
        }
        Commands::Update { input, output } => {
            let mut reader = passphrase_reader(cli.passphrase_stdin, false);
            file_ops::update_file(&input, &output, &mut *reader)
        }
    };

    if let Err(e) = result {
        tracing::debug!(category = ?e.category, kind = ?e.kind, "command failed");
        eprintln!("Error: {}", e.chain_message());
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// With `confirm`, the terminal reader asks for the passphrase twice.
fn passphrase_reader(use_stdin: bool, confirm: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else if confirm {
        Box::new(ConfirmingPassphraseReader::terminal())
    } else {
        Box::new(TerminalPassphraseReader::new())
    }
}
