//! qkey CLI - Main entry point

mod cli;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use qkey_core::KeyCodec;
use qkey_foundation::{KeyConfig, QKEY_CONFIG_FILE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{compare_tokens, describe, require_token, KeySpec};

/// qkey - build and inspect portable query-result cache keys
#[derive(Parser, Debug)]
#[command(name = "qkey")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Codec limits file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a key from a JSON description and print its token
    Encode {
        /// JSON file to read (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print a token's key as JSON
    Decode {
        token: String,
    },
    /// Check whether two tokens name the same key (exit code 1 when not)
    Compare {
        left: String,
        right: String,
    },
    /// Print the SHA-256 digest of a token's key
    Digest {
        token: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = match &args.config {
        Some(path) => KeyConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => KeyConfig::load_or_default(QKEY_CONFIG_FILE)?,
    };
    tracing::debug!(limits = ?config.limits, "Using codec limits");
    let codec = KeyCodec::from_config(&config);

    match args.command {
        Command::Encode { input } => {
            let text = read_input(input.as_ref())?;
            let key = KeySpec::parse(&text)
                .and_then(|spec| spec.to_key())
                .context("Invalid key description")?;
            println!("{}", codec.encode_token(&key)?);
        }
        Command::Decode { token } => {
            let key = codec.decode_token(require_token(&token)?)?;
            println!("{}", serde_json::to_string_pretty(&describe(&key, &codec)?)?);
        }
        Command::Compare { left, right } => {
            let equal = compare_tokens(&codec, require_token(&left)?, require_token(&right)?)?;
            println!("{}", if equal { "equal" } else { "different" });
            if !equal {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Digest { token } => {
            let key = codec.decode_token(require_token(&token)?)?;
            println!("{}", codec.digest(&key)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
