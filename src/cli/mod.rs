//! CLI module for Cyber Auth
//!
//! Provides offline subcommands around the account backend:
//! - `keygen`: generate an RSA keypair as key-exchange XML
//! - `inspect-key`: summarize a key-exchange XML file
//! - `demo`: run a register, login, validate and delete cycle in memory

pub mod demo;
pub mod inspect;
pub mod keygen;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Cyber Auth - Account, keypair and token backend
#[derive(Parser)]
#[command(name = "cyber-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate an RSA keypair and print it as XML
    Keygen(keygen::KeygenArgs),

    /// Print the fields present in a key XML file
    InspectKey {
        /// Path to an RSAKeyValue XML document
        file: PathBuf,
    },

    /// Register, log in, validate a token and delete an account in memory
    Demo(demo::DemoArgs),
}

/// Load `.env` and configuration, then install logging
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);
    config
}
