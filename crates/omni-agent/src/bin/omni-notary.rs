//! File notarization CLI.
//!
//! Computes a SHA3-256 digest for each named file, writes a signed
//! `<file>.notarized.json` sidecar next to it, and (with `--emit`) also
//! ships an `automation` event to the hub carrying the digest.
//!
//! ```text
//! omni-notary [--chain LABEL] [--emit] FILE...
//! ```
//!
//! Requires `OMNI_UID` in the environment; `--emit` additionally uses
//! the hub settings (`HUB_URL`, `OMNI_SOURCE`, `OMNI_PROJECT`).

use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use omni_agent::config::AgentConfig;
use omni_agent::emitter::Emitter;
use omni_sign::Signer;
use omni_types::EventKind;

/// Default chain label stamped into sidecar records.
const DEFAULT_CHAIN_LABEL: &str = "main";

/// Parsed command line.
struct Cli {
    chain_label: String,
    emit: bool,
    files: Vec<PathBuf>,
}

/// Parse arguments by hand; the surface is three flags and a file list.
fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Cli> {
    let mut chain_label = DEFAULT_CHAIN_LABEL.to_owned();
    let mut emit = false;
    let mut files = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--chain" => {
                chain_label = args
                    .next()
                    .context("--chain requires a label argument")?;
            }
            "--emit" => emit = true,
            "--help" | "-h" => {
                bail!("usage: omni-notary [--chain LABEL] [--emit] FILE...");
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    if files.is_empty() {
        bail!("no files given; usage: omni-notary [--chain LABEL] [--emit] FILE...");
    }

    Ok(Cli {
        chain_label,
        emit,
        files,
    })
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, or
/// when any file cannot be notarized or delivered.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = parse_args(std::env::args().skip(1))?;

    let config = AgentConfig::from_env().context("loading emitter config")?;
    let signer = Signer::for_uid(&config.uid);
    let emitter = cli.emit.then(|| Emitter::new(&config));

    for path in &cli.files {
        let (sidecar, record) = omni_chain::notarize_file(&signer, path, &cli.chain_label)
            .with_context(|| format!("notarizing {}", path.display()))?;

        info!(
            artifact = record.artifact,
            hash = record.hash,
            sidecar = %sidecar.display(),
            "notarized"
        );

        if let Some(emitter) = &emitter {
            let payload = serde_json::json!({
                "action": "notarize",
                "artifact": record.artifact,
                "hash": record.hash,
                "chain": record.chain,
            });
            emitter
                .emit(EventKind::Automation, payload)
                .await
                .with_context(|| format!("delivering notarization of {}", path.display()))?;
            info!(artifact = record.artifact, "notarization delivered to hub");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_files() {
        let args = ["--chain", "audit", "--emit", "a.txt", "b.txt"]
            .into_iter()
            .map(ToOwned::to_owned);
        let cli = parse_args(args);
        assert!(cli.is_ok());
        let Ok(cli) = cli else { return };
        assert_eq!(cli.chain_label, "audit");
        assert!(cli.emit);
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn defaults_without_flags() {
        let args = ["a.txt"].into_iter().map(ToOwned::to_owned);
        let Ok(cli) = parse_args(args) else { return };
        assert_eq!(cli.chain_label, "main");
        assert!(!cli.emit);
    }

    #[test]
    fn empty_file_list_is_an_error() {
        let args = ["--emit"].into_iter().map(ToOwned::to_owned);
        assert!(parse_args(args).is_err());
    }
}
