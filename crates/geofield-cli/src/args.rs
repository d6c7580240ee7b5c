use clap::{Parser, Subcommand, ValueEnum};
use geofield_core::ModelKind;
use std::path::PathBuf;

/// CLI arguments for geofield
#[derive(Debug, Parser)]
#[command(
    name = "geofield",
    version,
    about = "Manage the geoid, gravity and magnetic model datasets used by geofield-core"
)]
pub struct CliArgs {
    /// Dataset directory (overrides GEOFIELD_DATA_DIR)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Never download; report missing datasets instead
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List known models and whether their datasets are installed
    List {
        /// Only show models of this kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download and unpack model datasets
    Fetch {
        /// Model names (e.g. egm96-5, egm2008, wmm2020)
        models: Vec<String>,

        /// Fetch the default model of every kind
        #[arg(long)]
        all_defaults: bool,

        /// Re-download even if installed; the old copy stays if that fails
        #[arg(long)]
        force: bool,
    },

    /// Print the directory a model's dataset is installed in
    Path {
        /// Model name
        model: String,
    },

    /// Delete an installed dataset
    Remove {
        /// Model name
        model: String,
    },

    /// Show the effective store configuration as JSON
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Geoid,
    Gravity,
    Magnetic,
}

impl From<KindArg> for ModelKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Geoid => ModelKind::Geoid,
            KindArg::Gravity => ModelKind::Gravity,
            KindArg::Magnetic => ModelKind::Magnetic,
        }
    }
}
