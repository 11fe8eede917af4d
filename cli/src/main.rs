//! mfs - mask-driven copy, move and delete
//!
//! Usage: mfs [OPTIONS] <COMMAND>
//!
//! Paths are relative to `--root`. A path written as `NAME:PATH` addresses
//! the disk mounted with `--mount NAME=DIR`; a transfer between two mounts
//! runs on a disk rooted where both meet.

use clap::{Parser, Subcommand, ValueEnum};
use maskfs::{
    Action, DeleteStats, Disk, Entry, ErrorCode, Meta, Mounts, Placeholder, TransferOptions,
    TransferStats, copy_with_replacements, create_progress_bar, delete, delete_directory,
    list_contents, progress_callback, resolve_mask, transfer,
};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Name of the disk opened at `--root`.
const DEFAULT_DISK: &str = "root";

#[derive(Parser, Debug)]
#[command(name = "mfs")]
#[command(version, about = "Copy, move and delete files by path mask", long_about = None)]
#[command(after_help = "Masks:\n  \
    docs/*             direct children of docs\n  \
    docs/*.txt         text files under docs (all levels with -r)\n  \
    reports/*-*.csv    captures, usable in TO as $1, $2, ...\n\n\
Examples:\n  \
    mfs cp 'reports/*-*.csv' 'archive/$1.csv'\n  \
    mfs mv -f -r incoming library\n  \
    mfs --mount media=/srv/media cp 'media:photos/*' backup")]
struct Args {
    /// Root directory of the default disk
    #[arg(long, global = true, env = "MASKFS_ROOT", default_value = ".")]
    root: PathBuf,

    /// Mount an extra disk, addressed as NAME:PATH
    #[arg(long = "mount", value_name = "NAME=DIR", global = true)]
    mounts: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputMode::Human, global = true)]
    output: OutputMode,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print every primitive as it is issued
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy everything FROM resolves to onto TO
    Cp(TransferArgs),

    /// Move everything FROM resolves to onto TO
    Mv(TransferArgs),

    /// Delete files (directories matched by a mask are removed whole)
    Rm {
        /// Paths or masks
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Delete directories matching a path or mask
    Rmdir {
        /// Path or mask
        expr: String,
    },

    /// Create a directory and its parents
    Mkdir {
        /// Directory to create
        path: String,
    },

    /// List a directory, or the entries matching a mask
    Ls {
        /// Directory or mask (defaults to the disk root)
        dir: Option<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Group directories before files
        #[arg(long)]
        by_type: bool,
    },

    /// Show what a mask resolves to without touching anything
    Resolve {
        /// Source path or mask
        from: String,

        /// Destination path or template
        to: Option<String>,

        /// Match general masks at any depth
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show metadata for one entry
    Stat {
        /// Entry to inspect
        path: String,

        /// Print only this field
        #[arg(long)]
        key: Option<String>,
    },

    /// Copy text files, filling in {{ placeholders }}
    Render {
        /// Source path or mask
        from: String,

        /// Destination path or template
        to: String,

        /// Placeholder value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        values: Vec<String>,

        /// Opening delimiter
        #[arg(long, default_value = "{{")]
        prefix: String,

        /// Closing delimiter
        #[arg(long, default_value = "}}")]
        suffix: String,

        /// Match general masks at any depth
        #[arg(short, long)]
        recursive: bool,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Cp(_) => "cp",
            Self::Mv(_) => "mv",
            Self::Rm { .. } => "rm",
            Self::Rmdir { .. } => "rmdir",
            Self::Mkdir { .. } => "mkdir",
            Self::Ls { .. } => "ls",
            Self::Resolve { .. } => "resolve",
            Self::Stat { .. } => "stat",
            Self::Render { .. } => "render",
        }
    }
}

#[derive(clap::Args, Debug)]
struct TransferArgs {
    /// Source path or mask
    from: String,

    /// Destination path or template ($1, $2, ... refer to captures)
    to: String,

    /// Replace existing destinations
    #[arg(short, long)]
    force: bool,

    /// Merge directories file by file and match masks at any depth
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Invalid mount '{value}', expected NAME=DIR")]
    InvalidMount { value: String },

    #[error("Invalid value '{value}', expected KEY=VALUE")]
    InvalidAssignment { value: String },

    #[error(transparent)]
    Maskfs(#[from] maskfs::Error),

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidMount { .. } | Self::InvalidAssignment { .. } => ErrorCode::InvalidInput,
            Self::Maskfs(error) => error.code(),
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidInput => 2,
        _ => 1,
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(error) = run(&args) {
        let code = error.code();
        if args.output == OutputMode::Json {
            let payload = json!({
                "schema_version": "1.0",
                "command": args.command.name(),
                "status": "error",
                "error": {
                    "code": code.as_str(),
                    "message": error.to_string(),
                },
            });
            println!("{payload}");
        }
        eprintln!("mfs: error[{code}]: {error}");
        std::process::exit(exit_code_for(code));
    }
}

fn init_tracing(args: &Args) {
    let default = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(args: &Args) -> CliResult<()> {
    let mut workspace = Workspace::open(args)?;

    match &args.command {
        Command::Cp(transfer_args) => {
            run_transfer(args, &mut workspace, Action::Copy, transfer_args)
        }
        Command::Mv(transfer_args) => {
            run_transfer(args, &mut workspace, Action::Rename, transfer_args)
        }
        Command::Rm { paths } => run_rm(args, &workspace, paths),
        Command::Rmdir { expr } => run_rmdir(args, &workspace, expr),
        Command::Mkdir { path } => run_mkdir(args, &workspace, path),
        Command::Ls {
            dir,
            recursive,
            by_type,
        } => run_ls(args, &workspace, dir.as_deref(), *recursive, *by_type),
        Command::Resolve {
            from,
            to,
            recursive,
        } => run_resolve(args, &mut workspace, from, to.as_deref(), *recursive),
        Command::Stat { path, key } => run_stat(args, &workspace, path, key.as_deref()),
        Command::Render {
            from,
            to,
            values,
            prefix,
            suffix,
            recursive,
        } => {
            let placeholder = Placeholder::new(prefix.as_str(), suffix.as_str());
            let replacements = parse_values(values)?;
            let options = transfer_options(args).with_recursive(*recursive);
            let (disk, from, to) = workspace.locate_pair(from, to)?;
            let stats =
                copy_with_replacements(&disk, &from, &to, &placeholder, &replacements, &options)?;
            match args.output {
                OutputMode::Human => {
                    if !args.quiet {
                        println!(
                            "Rendered {} in {:.2?}",
                            plural(stats.entries_transferred, "file"),
                            stats.duration
                        );
                    }
                    Ok(())
                }
                OutputMode::Json => print_json_value(&json!({
                    "schema_version": "1.0",
                    "command": "render",
                    "status": "ok",
                    "from": from,
                    "to": to,
                    "stats": transfer_stats_json(&stats),
                })),
            }
        }
    }
}

/// Disks available to one invocation.
struct Workspace {
    mounts: Mounts,
}

impl Workspace {
    fn open(args: &Args) -> CliResult<Self> {
        let mut mounts = Mounts::new();
        let root = mounts.mount(DEFAULT_DISK, &args.root, false)?;
        tracing::debug!(root = root.root(), "opened default disk");

        for value in &args.mounts {
            let (name, dir) = value
                .split_once('=')
                .filter(|(name, dir)| !name.is_empty() && !dir.is_empty())
                .ok_or_else(|| CliError::InvalidMount { value: value.clone() })?;
            mounts.mount(name, dir, true)?;
        }
        Ok(Self { mounts })
    }

    /// Split `NAME:PATH` when `NAME` is mounted; anything else is a path on
    /// the default disk.
    fn split<'a>(&self, target: &'a str) -> (&'a str, &'a str) {
        match target.split_once(':') {
            Some((name, path)) if self.mounts.has_disk(name) => (name, path),
            _ => (DEFAULT_DISK, target),
        }
    }

    fn locate(&self, target: &str) -> CliResult<(Disk, String)> {
        let (name, path) = self.split(target);
        Ok((self.mounts.disk(name)?.clone(), path.to_owned()))
    }

    /// One disk serving both paths, with the paths expressed on it.
    fn locate_pair(&mut self, from: &str, to: &str) -> CliResult<(Disk, String, String)> {
        let (from_name, from_path) = self.split(from);
        let (to_name, to_path) = self.split(to);
        if from_name == to_name {
            let disk = self.mounts.disk(from_name)?.clone();
            return Ok((disk, from_path.to_owned(), to_path.to_owned()));
        }

        let from_disk = self.mounts.disk(from_name)?.clone();
        let to_disk = self.mounts.disk(to_name)?.clone();
        let merged = self.mounts.merge(from_name, to_name, false)?;
        tracing::debug!(
            from = from_disk.root(),
            to = to_disk.root(),
            merged = merged.root(),
            "merged disks"
        );

        let from_path = reroot(&merged, &from_disk, from_path);
        let to_path = reroot(&merged, &to_disk, to_path);
        Ok((merged, from_path, to_path))
    }
}

/// Re-express `path` on `disk` as a path on `merged`, whose root contains
/// the root of `disk`.
fn reroot(merged: &Disk, disk: &Disk, path: &str) -> String {
    let prefix = Path::new(disk.root())
        .strip_prefix(merged.root())
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let path = path.trim_start_matches('/');

    if prefix.is_empty() {
        path.to_owned()
    } else if path.is_empty() {
        prefix
    } else {
        format!("{prefix}/{path}")
    }
}

fn parse_values(values: &[String]) -> CliResult<HashMap<String, String>> {
    values
        .iter()
        .map(|item| {
            item.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| CliError::InvalidAssignment { value: item.clone() })
        })
        .collect()
}

fn print_verbose(msg: &str) {
    eprintln!("{msg}");
}

fn transfer_options(args: &Args) -> TransferOptions {
    let options = TransferOptions::default();
    if args.verbose && args.output == OutputMode::Human {
        options.with_verbose_handler(print_verbose)
    } else {
        options
    }
}

fn run_transfer(
    args: &Args,
    workspace: &mut Workspace,
    action: Action,
    transfer_args: &TransferArgs,
) -> CliResult<()> {
    let (disk, from, to) = workspace.locate_pair(&transfer_args.from, &transfer_args.to)?;
    let mut options = transfer_options(args)
        .with_overwrite(transfer_args.force)
        .with_recursive(transfer_args.recursive);

    let show_progress = args.output == OutputMode::Human && !args.quiet && !args.verbose;
    let pb = show_progress.then(|| create_progress_bar(0));
    if let Some(pb) = &pb {
        options = options.with_progress(progress_callback(pb.clone()));
    }

    let result = transfer(&disk, action, &from, &to, &options);
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let stats = result?;

    match args.output {
        OutputMode::Human => {
            if !args.quiet && stats.pairs > 0 {
                print_transfer_stats(action, &stats, args.verbose);
            }
            Ok(())
        }
        OutputMode::Json => print_json_value(&json!({
            "schema_version": "1.0",
            "command": args.command.name(),
            "status": "ok",
            "from": from,
            "to": to,
            "stats": transfer_stats_json(&stats),
        })),
    }
}

fn print_transfer_stats(action: Action, stats: &TransferStats, verbose: bool) {
    let verb = match action {
        Action::Copy => "Copied",
        Action::Rename => "Moved",
    };
    println!(
        "{verb} {} in {:.2?}",
        plural(stats.pairs as u64, "entry"),
        stats.duration
    );

    if verbose {
        println!("  Primitives issued: {}", stats.entries_transferred);
        if stats.entries_replaced > 0 {
            println!("  Replaced: {}", stats.entries_replaced);
        }
        if stats.directories_merged > 0 {
            println!("  Directories merged: {}", stats.directories_merged);
        }
        if stats.sources_removed > 0 {
            println!("  Sources removed: {}", stats.sources_removed);
        }
    }
}

fn transfer_stats_json(stats: &TransferStats) -> Value {
    json!({
        "pairs": stats.pairs,
        "entries_transferred": stats.entries_transferred,
        "entries_replaced": stats.entries_replaced,
        "directories_merged": stats.directories_merged,
        "sources_removed": stats.sources_removed,
        "duration_ms": stats.duration.as_millis() as u64,
    })
}

fn run_rm(args: &Args, workspace: &Workspace, paths: &[String]) -> CliResult<()> {
    let mut by_disk: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for target in paths {
        let (name, path) = workspace.split(target);
        by_disk.entry(name).or_default().push(path);
    }

    let options = transfer_options(args);
    let mut total = DeleteStats::default();
    for (name, exprs) in by_disk {
        let disk = workspace.mounts.disk(name)?;
        let stats = delete(disk, &exprs, &options)?;
        total.files_deleted += stats.files_deleted;
        total.directories_deleted += stats.directories_deleted;
        total.skipped += stats.skipped;
        total.duration += stats.duration;
    }
    print_delete_stats(args, &total)
}

fn run_rmdir(args: &Args, workspace: &Workspace, expr: &str) -> CliResult<()> {
    let (disk, expr) = workspace.locate(expr)?;
    let stats = delete_directory(&disk, &expr, &transfer_options(args))?;
    print_delete_stats(args, &stats)
}

fn print_delete_stats(args: &Args, stats: &DeleteStats) -> CliResult<()> {
    match args.output {
        OutputMode::Human => {
            if !args.quiet {
                println!(
                    "Deleted {} and {}",
                    plural(stats.files_deleted, "file"),
                    plural(stats.directories_deleted, "directory")
                );
                if stats.skipped > 0 {
                    println!("Skipped {}", plural(stats.skipped, "path"));
                }
            }
            Ok(())
        }
        OutputMode::Json => print_json_value(&json!({
            "schema_version": "1.0",
            "command": args.command.name(),
            "status": "ok",
            "stats": {
                "files_deleted": stats.files_deleted,
                "directories_deleted": stats.directories_deleted,
                "skipped": stats.skipped,
                "duration_ms": stats.duration.as_millis() as u64,
            },
        })),
    }
}

fn run_mkdir(args: &Args, workspace: &Workspace, target: &str) -> CliResult<()> {
    let (disk, path) = workspace.locate(target)?;
    disk.make_directory(&path)?;

    match args.output {
        OutputMode::Human => {
            if args.verbose {
                eprintln!("mkdir {path}");
            }
            Ok(())
        }
        OutputMode::Json => print_json_value(&json!({
            "schema_version": "1.0",
            "command": "mkdir",
            "status": "ok",
            "path": path,
        })),
    }
}

fn run_ls(
    args: &Args,
    workspace: &Workspace,
    dir: Option<&str>,
    recursive: bool,
    by_type: bool,
) -> CliResult<()> {
    let (disk, path) = workspace.locate(dir.unwrap_or(""))?;
    let entries = list_contents(&disk, Some(path.as_str()), recursive)?;
    let (directories, files): (Vec<&Entry>, Vec<&Entry>) =
        entries.iter().partition(|entry| entry.is_dir());

    match args.output {
        OutputMode::Human => {
            if by_type {
                for entry in directories.iter().chain(files.iter()) {
                    println!("{}\t{}", entry.kind, entry.path);
                }
            } else {
                for entry in &entries {
                    println!("{}", entry.path);
                }
            }
            Ok(())
        }
        OutputMode::Json => {
            let payload = if by_type {
                json!({
                    "schema_version": "1.0",
                    "command": "ls",
                    "status": "ok",
                    "directories": directories.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
                    "files": files.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
                })
            } else {
                let entries = serde_json::to_value(&entries)
                    .map_err(|source| CliError::JsonSerialize { source })?;
                json!({
                    "schema_version": "1.0",
                    "command": "ls",
                    "status": "ok",
                    "entries": entries,
                })
            };
            print_json_value(&payload)
        }
    }
}

fn run_resolve(
    args: &Args,
    workspace: &mut Workspace,
    from: &str,
    to: Option<&str>,
    recursive: bool,
) -> CliResult<()> {
    let (disk, from, to) = match to {
        Some(to) => {
            let (disk, from, to) = workspace.locate_pair(from, to)?;
            (disk, from, Some(to))
        }
        None => {
            let (disk, from) = workspace.locate(from)?;
            (disk, from, None)
        }
    };
    let resolution = resolve_mask(&disk, &from, to.as_deref(), recursive)?;

    match args.output {
        OutputMode::Human => {
            match resolution.destinations() {
                Some(destinations) => {
                    for (source, destination) in resolution.sources().iter().zip(destinations) {
                        println!("{source} -> {destination}");
                    }
                }
                None => {
                    for source in resolution.sources() {
                        println!("{source}");
                    }
                }
            }
            Ok(())
        }
        OutputMode::Json => {
            let resolution = serde_json::to_value(&resolution)
                .map_err(|source| CliError::JsonSerialize { source })?;
            print_json_value(&json!({
                "schema_version": "1.0",
                "command": "resolve",
                "status": "ok",
                "resolution": resolution,
            }))
        }
    }
}

fn run_stat(args: &Args, workspace: &Workspace, target: &str, key: Option<&str>) -> CliResult<()> {
    let (disk, path) = workspace.locate(target)?;
    let meta = disk.meta(&path)?;

    match (args.output, key) {
        (OutputMode::Human, Some(key)) => {
            println!("{}", meta.get(key)?);
            Ok(())
        }
        (OutputMode::Human, None) => {
            for (key, value) in meta_fields(&meta) {
                println!("{key}: {value}");
            }
            Ok(())
        }
        (OutputMode::Json, Some(key)) => {
            let value = meta.get(key)?;
            print_json_value(&json!({
                "schema_version": "1.0",
                "command": "stat",
                "status": "ok",
                "path": meta.path,
                "key": key,
                "value": value,
            }))
        }
        (OutputMode::Json, None) => {
            let fields: Map<String, Value> = meta_fields(&meta)
                .into_iter()
                .map(|(key, value)| (key.to_owned(), Value::String(value)))
                .collect();
            print_json_value(&json!({
                "schema_version": "1.0",
                "command": "stat",
                "status": "ok",
                "meta": fields,
            }))
        }
    }
}

/// Every field present on the entry, in display order.
fn meta_fields(meta: &Meta) -> Vec<(&'static str, String)> {
    Meta::KEYS
        .iter()
        .filter_map(|key| meta.get(key).ok().map(|value| (*key, value)))
        .collect()
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn plural(count: u64, noun: &str) -> String {
    match (count, noun) {
        (1, _) => format!("1 {noun}"),
        (_, "entry") => format!("{count} entries"),
        (_, "directory") => format!("{count} directories"),
        _ => format!("{count} {noun}s"),
    }
}
