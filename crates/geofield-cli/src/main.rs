//! geofield — dataset manager for geofield-core
//!
//! The registry in `geofield-core` fetches datasets on first use. This tool
//! lets you do that ahead of time, inspect what is installed and clean up.
//!
//! Usage examples
//! --------------
//!
//! - List every model and whether its dataset is installed
//!   $ geofield list
//!   $ geofield list --kind magnetic --json
//!
//! - Pre-fetch the default geoid, gravity and magnetic datasets
//!   $ geofield fetch --all-defaults
//!
//! - Fetch specific models into a custom directory
//!   $ geofield --data-dir /srv/geofield fetch egm2008-1 wmm2015v2
//!
//! - Show where a dataset lives, or delete it
//!   $ geofield path egm96-5
//!   $ geofield remove egm96-5
//!
//! Configuration
//! -------------
//!
//! `GEOFIELD_DATA_DIR`, `GEOFIELD_BASE_URL` and `GEOFIELD_OFFLINE` are read
//! from the environment; `--data-dir` and `--offline` take precedence.
//! Logging goes to stderr and honors `RUST_LOG`.
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::{bail, Context};
use clap::Parser;
use geofield_core::{AnyKey, DatasetStatus, DatasetStore, DiskStore, ModelKind, StoreConfig};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut config = StoreConfig::from_env();
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if args.offline {
        config = config.offline(true);
    }
    debug!(?config, "store configuration");
    let store = DiskStore::new(config);

    match args.command {
        Commands::List { kind, json } => {
            let kind = kind.map(ModelKind::from);
            let keys: Vec<AnyKey> = AnyKey::all()
                .filter(|k| kind.map_or(true, |want| k.kind() == want))
                .collect();

            if json {
                let rows: Vec<_> = keys
                    .iter()
                    .map(|k| {
                        let sha256 = match store.status(&k.dataset()) {
                            DatasetStatus::Present(m) => Some(m.sha256),
                            _ => None,
                        };
                        json!({
                            "name": k.to_string(),
                            "kind": k.kind().to_string(),
                            "dataset": k.dataset().id,
                            "default": k.is_default(),
                            "installed": sha256.is_some(),
                            "sha256": sha256,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<14} {:<9} {:<8} STATUS", "MODEL", "KIND", "DEFAULT");
                for k in keys {
                    let status = match store.status(&k.dataset()) {
                        DatasetStatus::Missing => "-",
                        DatasetStatus::Incomplete => "incomplete",
                        DatasetStatus::Present(_) => "installed",
                    };
                    let default = if k.is_default() { "*" } else { "" };
                    println!(
                        "{:<14} {:<9} {:<8} {status}",
                        k.to_string(),
                        k.kind().to_string(),
                        default
                    );
                }
            }
        }

        Commands::Fetch {
            models,
            all_defaults,
            force,
        } => {
            let mut keys = models
                .iter()
                .map(|m| m.parse::<AnyKey>())
                .collect::<Result<Vec<_>, _>>()?;
            if all_defaults {
                keys.extend(AnyKey::defaults());
            }
            keys.sort();
            keys.dedup();
            if keys.is_empty() {
                bail!("nothing to fetch; name one or more models or pass --all-defaults");
            }

            for key in keys {
                let dataset = key.dataset();
                let fetched = if force {
                    store.refetch(&dataset)
                } else {
                    store.locate(&dataset)
                };
                let path = fetched.with_context(|| format!("fetching {key}"))?;
                println!("{key}: {}", path.display());
            }
        }

        Commands::Path { model } => {
            let key: AnyKey = model.parse()?;
            let dataset = key.dataset();
            match store.status(&dataset) {
                DatasetStatus::Present(_) => {
                    let dir = store.dataset_dir(&dataset).join(dataset.kind.subdir());
                    println!("{}", dir.display());
                }
                DatasetStatus::Incomplete => {
                    bail!("{key} is incomplete; run `geofield fetch --force {key}`")
                }
                DatasetStatus::Missing => {
                    bail!("{key} is not installed; run `geofield fetch {key}`")
                }
            }
        }

        Commands::Remove { model } => {
            let key: AnyKey = model.parse()?;
            if store.remove(&key.dataset())? {
                println!("Removed {key}");
            } else {
                eprintln!("{key} is not installed");
            }
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(store.config())?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn,geofield_core=info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
