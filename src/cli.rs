//! Command-line definitions (clap derive).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::mods::LoaderType;

/// CraftPacker - batch mod resolver and downloader
///
/// Turns a list of loosely-written mod names into downloaded jars for one
/// loader and game version, pulling in required dependencies.
#[derive(Parser, Debug)]
#[command(name = "craftpacker", author, version)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Directory holding settings.json and profiles
    #[arg(long, global = true, env = "CRAFTPACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve mod names without downloading
    Search(SearchArgs),

    /// Resolve mod names and download them with their dependencies
    Download(DownloadArgs),

    /// Manage saved mod lists
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Derive mod names from the jars in a folder
    Import(ImportArgs),

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Where the mod names of a run come from. Sources are combined.
#[derive(Args, Debug, Default)]
pub struct ModInputs {
    /// Mod names, jar file names or slugs
    pub names: Vec<String>,

    /// Read names from a file, one per line
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Read names from a saved profile
    #[arg(long, short = 'p')]
    pub profile: Option<String>,
}

/// Per-invocation overrides of the persisted settings.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Mod loader: fabric, forge, neoforge or quilt
    #[arg(long)]
    pub loader: Option<LoaderType>,

    /// Minecraft version, e.g. 1.20.1
    #[arg(long)]
    pub game_version: Option<String>,

    /// Maximum concurrent lookups and transfers
    #[arg(long)]
    pub threads: Option<usize>,

    /// Registry calls per minute
    #[arg(long)]
    pub rate: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub inputs: ModInputs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub inputs: ModInputs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Destination folder (defaults to the configured download_dir)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Search once more for names that were not found before downloading
    #[arg(long)]
    pub retry_not_found: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List saved profiles
    List,

    /// Print the mod names of a profile
    Show { name: String },

    /// Save mod names as a profile, replacing any existing one
    Save {
        name: String,

        #[command(flatten)]
        inputs: ModInputs,
    },

    /// Delete a profile
    Delete { name: String },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Folder to scan for .jar files
    pub folder: PathBuf,

    /// Save the imported names as this profile
    #[arg(long)]
    pub save_as: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Change one setting
    Set { key: String, value: String },
}
