use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use verfs::{VerfsConfig, VersioningFs};

use crate::{
    cmd_cat, cmd_ls, cmd_mv, cmd_prune, cmd_rm, cmd_snapshot, cmd_status, cmd_versions,
    cmd_write,
};

/// CLI для versioning filesystem (rdiff-backup или встроенный copy-бэкенд)
#[derive(Parser, Debug)]
#[command(
    name = "verfs",
    version,
    about = "Incremental versioning filesystem over rdiff-backup",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Write a file (stdin by default), snapshotting the result
    Write {
        #[arg(long)]
        root: PathBuf,
        path: String,
        /// Read content from a file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Append instead of truncating
        #[arg(long, default_value_t = false)]
        append: bool,
        /// Skip the snapshot-on-close
        #[arg(long, default_value_t = false)]
        no_snapshot: bool,
    },
    /// Print a file (optionally a historical version) to stdout
    Cat {
        #[arg(long)]
        root: PathBuf,
        path: String,
        /// Version ordinal 1..=N (default: live content)
        #[arg(long)]
        version: Option<u64>,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List recorded versions of a file (ordinal, timestamp, size)
    Versions {
        #[arg(long)]
        root: PathBuf,
        path: String,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List directory entries (backup/scratch dirs hidden by default)
    Ls {
        #[arg(long)]
        root: PathBuf,
        /// Directory to list (default: fs root)
        path: Option<String>,
        /// Include hidden entries
        #[arg(long, default_value_t = false)]
        hidden: bool,
    },
    /// Remove a file (with its history) or a directory
    Rm {
        #[arg(long)]
        root: PathBuf,
        path: String,
        /// Target is a directory
        #[arg(long, default_value_t = false)]
        dir: bool,
        /// Remove a directory recursively
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Rename/move a file or directory; history follows
    Mv {
        #[arg(long)]
        root: PathBuf,
        src: String,
        dst: String,
    },
    /// Drop history older than a version ordinal or a timestamp
    Prune {
        #[arg(long)]
        root: PathBuf,
        path: String,
        /// Keep versions k..=N (k >= 2)
        #[arg(long)]
        before_version: Option<u64>,
        /// Cutoff as %Y-%m-%dT%H:%M:%S
        #[arg(long)]
        before_time: Option<String>,
    },
    /// Take an explicit snapshot of a file
    Snapshot {
        #[arg(long)]
        root: PathBuf,
        path: String,
    },
    /// Print fs layout + metrics summary
    Status {
        #[arg(long)]
        root: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn open_fs(root: PathBuf) -> Result<VersioningFs> {
    VersioningFs::new(root, VerfsConfig::from_env())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Write { root, path, input, append, no_snapshot } =>
            cmd_write::exec(root, path, input, append, no_snapshot),

        Cmd::Cat { root, path, version, out } =>
            cmd_cat::exec(root, path, version, out),

        Cmd::Versions { root, path, json } =>
            cmd_versions::exec(root, path, json),

        Cmd::Ls { root, path, hidden } =>
            cmd_ls::exec(root, path, hidden),

        Cmd::Rm { root, path, dir, force } =>
            cmd_rm::exec(root, path, dir, force),

        Cmd::Mv { root, src, dst } =>
            cmd_mv::exec(root, src, dst),

        Cmd::Prune { root, path, before_version, before_time } =>
            cmd_prune::exec(root, path, before_version, before_time),

        Cmd::Snapshot { root, path } =>
            cmd_snapshot::exec(root, path),

        Cmd::Status { root, json } =>
            cmd_status::exec(root, json),
    }
}
