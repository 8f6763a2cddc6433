//! `seal` / `unseal`: field encryption from the command line
//!
//! The key is derived from ENCRYPTION_MASTER_KEY. Envelopes are printed as
//! one line of JSON.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use waypoint_core::{Envelope, FieldCipher, Settings};

/// Arguments for the seal command
#[derive(Parser, Debug)]
pub struct SealArgs {
    /// Value to encrypt (reads stdin when omitted)
    pub value: Option<String>,

    /// Associated data bound to the envelope
    #[arg(long)]
    pub aad: Option<String>,
}

/// Arguments for the unseal command
#[derive(Parser, Debug)]
pub struct UnsealArgs {
    /// Envelope JSON (reads stdin when omitted)
    pub envelope: Option<String>,

    /// Associated data given at seal time
    #[arg(long)]
    pub aad: Option<String>,
}

fn cipher() -> Result<FieldCipher> {
    let settings = Settings::from_env().context("Failed to load settings")?;
    Ok(FieldCipher::from_settings(&settings)?)
}

fn input(arg: Option<String>) -> Result<Vec<u8>> {
    match arg {
        Some(value) => Ok(value.into_bytes()),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn run_seal(args: SealArgs) -> Result<()> {
    let cipher = cipher()?;
    let plaintext = input(args.value)?;
    let envelope = cipher.encrypt(&plaintext, args.aad.as_deref().map(str::as_bytes))?;
    println!("{}", serde_json::to_string(&envelope)?);
    Ok(())
}

pub fn run_unseal(args: UnsealArgs) -> Result<()> {
    let cipher = cipher()?;
    let raw = input(args.envelope)?;
    let envelope: Envelope =
        serde_json::from_slice(&raw).context("Input is not an envelope ({\"n\": ..., \"ct\": ...})")?;
    let plaintext = cipher
        .decrypt(&envelope, args.aad.as_deref().map(str::as_bytes))
        .context("Failed to unseal envelope")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}
