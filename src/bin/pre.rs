// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

//! Command line access to the hex boundary of the `pre` crate.
//!
//! Results go to stdout as JSON, logs go to stderr.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pre::{Capsule, Keypair, Observation, ObservationResponse, PublicKey, SecretKey};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Proxy re-encryption of vendor observations over P-256
#[derive(Parser, Debug)]
#[command(name = "pre", author, version, about, long_about = None)]
struct Cli {
    /// Default log directive, overridden by RUST_LOG
    #[arg(long, env = "PRE_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a vendor keypair
    Keygen,

    /// Encrypt a message for a public key and print the observation record
    Encrypt {
        /// Producer public key (SEC1 hex)
        #[arg(long, env = "PRE_PUBLIC_KEY")]
        pk: String,

        /// Attribute name stored next to the ciphertext
        #[arg(long, default_value = "")]
        attribute: String,

        /// Message to encrypt; read from stdin if absent
        message: Option<String>
    },

    /// Derive the re-encryption key from a delegator to a delegatee
    Rekey {
        /// Delegator secret key (hex)
        #[arg(long, env = "PRE_SECRET_KEY", hide_env_values = true)]
        sk: String,

        /// Delegatee public key (SEC1 hex)
        #[arg(long)]
        delegatee: String
    },

    /// Transform a capsule with a re-encryption key
    Reencrypt {
        #[arg(long, env = "PRE_REKEY", hide_env_values = true)]
        rk: String,

        #[arg(long)]
        capsule_e: String,

        #[arg(long)]
        capsule_v: String,

        #[arg(long)]
        capsule_s: String
    },

    /// Decrypt an observation response read from stdin
    Decrypt {
        /// Reader secret key (hex)
        #[arg(long, env = "PRE_SECRET_KEY", hide_env_values = true)]
        sk: String
    }
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
    Ok(buf)
}

fn print_json(v: &impl serde::Serialize) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, v)?;
    writeln!(out)?;
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Keygen => {
            let keypair = Keypair::new()?;
            tracing::info!(pk = %keypair.public().to_hex(), "generated keypair");
            print_json(&json!({
                "pk": keypair.public().to_hex(),
                "sk": keypair.secret().to_hex()
            }))
        }
        Command::Encrypt { pk, attribute, message } => {
            let pk = PublicKey::from_hex(&pk).context("invalid public key")?;
            let message = match message {
                Some(m) => m.into_bytes(),
                None => read_stdin()?
            };
            print_json(&Observation::produce(&pk, &attribute, &message)?)
        }
        Command::Rekey { sk, delegatee } => {
            let sk = SecretKey::from_hex(&sk).context("invalid secret key")?;
            let pk_b = PublicKey::from_hex(&delegatee).context("invalid delegatee public key")?;
            let [rk, pk_x] = sk.rekey(&pk_b)?.to_hex_pair();
            print_json(&json!({ "rk": rk, "pkX": pk_x }))
        }
        Command::Reencrypt { rk, capsule_e, capsule_v, capsule_s } => {
            let rk = pre::Scalar::from_hex(&rk).context("invalid re-encryption key")?;
            let cap = Capsule::from_hex_components(&capsule_e, &capsule_v, &capsule_s)?;
            let [e, v, s] = pre::reencrypt(&rk, &cap)?.to_hex_components();
            print_json(&json!({ "capsuleE": e, "capsuleV": v, "capsuleS": s }))
        }
        Command::Decrypt { sk } => {
            let sk = SecretKey::from_hex(&sk).context("invalid secret key")?;
            let response: ObservationResponse = serde_json::from_slice(&read_stdin()?)
                .context("stdin is not an observation response")?;
            if response.reencryption_metadata.is_some() {
                tracing::debug!(producer = %response.pk, "re-encrypting before decryption");
            }
            let plain = response.open(&sk)?;
            io::stdout().lock().write_all(&plain)?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .context("invalid log directive")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    run(cli.command)
}
