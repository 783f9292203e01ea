//! Command-line front end for fobkey license keys.
//!
//! Usage:
//!   fobkey issue --key privkey.pem --product MyApp --name "Jane Doe" --email jane@example.com
//!   fobkey check --key pubkey.pem --product MyApp --name "Jane Doe" <LICENSE>
//!   fobkey inspect --key pubkey.pem
//!   fobkey export-public --key privkey.pem

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fobkey_license::{LicenseAuthority, LicenseData};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fobkey")]
#[command(about = "Issue and check ECDSA license keys")]
pub struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a license key for a record (needs a private key)
    Issue {
        /// Path to the PEM key file
        #[arg(short, long)]
        key: PathBuf,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Check a license key against a record
    Check {
        /// Path to the PEM key file
        #[arg(short, long)]
        key: PathBuf,

        #[command(flatten)]
        record: RecordArgs,

        /// License key text
        license: String,

        /// Report malformed license keys as invalid instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Show which operations a key file supports
    Inspect {
        /// Path to the PEM key file
        #[arg(short, long)]
        key: PathBuf,
    },

    /// Print the public key to ship with an application
    ExportPublic {
        /// Path to the PEM key file
        #[arg(short, long)]
        key: PathBuf,
    },
}

/// The license record, given field by field or as a JSON file.
#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// JSON file holding the record (`{"product": .., "name": .., "email": ..}`)
    #[arg(long, conflicts_with_all = ["product", "name", "email"])]
    pub record: Option<PathBuf>,

    /// Product code
    #[arg(long, required_unless_present = "record")]
    pub product: Option<String>,

    /// Licensee name
    #[arg(long, required_unless_present = "record")]
    pub name: Option<String>,

    /// Licensee email
    #[arg(long)]
    pub email: Option<String>,
}

impl RecordArgs {
    /// Builds the license record from the arguments.
    pub fn to_license_data(&self) -> Result<LicenseData> {
        if let Some(path) = &self.record {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read record {}", path.display()))?;
            return serde_json::from_str(&json)
                .with_context(|| format!("invalid record JSON in {}", path.display()));
        }

        let product = self.product.as_deref().context("--product is required")?;
        let name = self.name.as_deref().context("--name is required")?;
        let record = LicenseData::new(product, name)?;
        Ok(match &self.email {
            Some(email) => record.with_email(email.as_str())?,
            None => record,
        })
    }
}

fn load_authority(path: &Path) -> Result<LicenseAuthority> {
    LicenseAuthority::from_path(path)
        .with_context(|| format!("cannot use key file {}", path.display()))
}

/// Runs a command, writing its output to `out`.
///
/// Returns `Ok(false)` only when `check` finds the license invalid.
pub fn run(command: &Command, out: &mut impl Write) -> Result<bool> {
    match command {
        Command::Issue { key, record } => {
            let authority = load_authority(key)?;
            let record = record.to_license_data()?;
            let license = authority.issue(&record)?;
            info!("License issued");
            writeln!(out, "{license}")?;
            Ok(true)
        }
        Command::Check {
            key,
            record,
            license,
            lenient,
        } => {
            let authority = load_authority(key)?;
            let record = record.to_license_data()?;
            let valid = if *lenient {
                authority.check_lenient(&record, license)?
            } else {
                authority.check(&record, license)?
            };
            writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
            Ok(valid)
        }
        Command::Inspect { key } => {
            let authority = load_authority(key)?;
            writeln!(out, "can sign:   {}", authority.can_sign())?;
            writeln!(out, "can verify: {}", authority.can_verify())?;
            Ok(true)
        }
        Command::ExportPublic { key } => {
            let authority = load_authority(key)?;
            let pem = authority.key_material().public_key_pem()?;
            write!(out, "{pem}")?;
            Ok(true)
        }
    }
}
