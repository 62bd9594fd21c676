//! # Keygen Subcommand
//!
//! `cnft keygen --out <PATH>` writes a fresh ed25519 keypair in the ledger's
//! JSON key file format and prints its address.
//!
//! The file is created exclusively and, on unix, with mode `0600` from the
//! first byte written. An existing file is never opened for writing; with
//! `--force` it is removed and a new file is created in its place.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use cnft_core::{Pubkey, TransactionSigner};
use cnft_ledger_client::Keypair;

/// Permission bits of a written key file: owner read and write only.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Arguments for `cnft keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key file.
    #[arg(long, short)]
    pub out: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[cfg(unix)]
fn create_key_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(KEY_FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn create_key_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Generate and write a keypair, returning its address.
pub fn generate_key_file(args: &KeygenArgs) -> Result<Pubkey> {
    if args.force {
        match std::fs::remove_file(&args.out) {
            Ok(()) => tracing::warn!(path = %args.out.display(), "replacing existing key file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("removing {}", args.out.display()));
            }
        }
    }

    let mut file = match create_key_file(&args.out) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("{} already exists (use --force to overwrite)", args.out.display());
        }
        Err(e) => return Err(e).with_context(|| format!("creating {}", args.out.display())),
    };

    let keypair = Keypair::generate();
    let json = keypair.to_json()?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("writing {}", args.out.display()))?;
    tracing::info!(path = %args.out.display(), "wrote keypair");
    Ok(keypair.address())
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let address = generate_key_file(args)?;
    println!("{address}");
    Ok(0)
}
