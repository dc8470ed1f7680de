use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wood",
    about = "Compare directory snapshots, sync them to a store and purge changed paths",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML settings file (batch sizes, key prefix, excludes, retry)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a directory into a JSON manifest
    Snapshot(SnapshotArgs),
    /// Print the entity tree of a directory or manifest
    Tree(TreeArgs),
    /// List new, modified and deleted paths between two snapshots
    Diff(DiffArgs),
    /// List the aggregated cache-invalidation prefixes between two snapshots
    Invalidations(PairArgs),
    /// Make a destination directory mirror a source directory
    Sync(SyncArgs),
}

#[derive(Args)]
pub struct SnapshotArgs {
    pub dir: PathBuf,
    /// Write the manifest here instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// A directory or a `.json` manifest
    pub source: PathBuf,
}

#[derive(Args)]
pub struct PairArgs {
    /// The "before" snapshot: a directory or a `.json` manifest
    pub left: PathBuf,
    /// The "after" snapshot: a directory or a `.json` manifest
    pub right: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// Prefix prepended to every reported path
    #[arg(long, default_value = "")]
    pub base: String,
    /// Omit new non-empty directories, listing only their contents
    #[arg(long)]
    pub no_intermediates: bool,
    /// Omit the contents of deleted directories
    #[arg(long)]
    pub no_children: bool,
    /// Omit deleted directories themselves
    #[arg(long)]
    pub no_directories: bool,
    /// Print the classified comparison tree instead of path lists
    #[arg(long)]
    pub tree: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Local directory holding the desired state
    pub source: PathBuf,
    /// Destination directory to bring up to date
    pub dest: PathBuf,
    /// Report what would change without touching the destination
    #[arg(long)]
    pub dry_run: bool,
}
