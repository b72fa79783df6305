//! trail - cached, resumable walks over the files in a directory tree.
//!
//! Usage:
//!   trail scan ROOT          Build (or load) the tree and print it
//!   trail list ROOT          Print every file in traversal order
//!   trail next ROOT -n 5     Print the next pending files, checkpointing each
//!   trail status ROOT        Show checkpoint progress
//!   trail reset ROOT         Start the checkpoint over
//!   trail --help             Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use filetrail_core::{FileOptions, IteratorConfig, TreeNode, TypedFile};
use filetrail_files::{ImageFile, JsonFile, RawFile};
use filetrail_scan::FileIterator;

#[derive(Parser)]
#[command(
    name = "trail",
    version,
    about = "Cached, resumable walks over the files in a directory tree",
    long_about = "trail scans a directory once, caches the tree next to it and \
                  walks its files in a stable order. Progress checkpoints let an \
                  interrupted batch pick up exactly where it stopped."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct TreeArgs {
    /// Root directory
    root: PathBuf,

    /// How files are interpreted
    #[arg(short, long, value_enum, default_value = "raw")]
    kind: KindArg,

    /// Tree cache file (defaults to <ROOT>.cache)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Always scan, never read or write the tree cache
    #[arg(long)]
    no_cache: bool,

    /// Rescan when the cached tree references missing files
    #[arg(long)]
    validate: bool,

    /// Decode or parse every file while scanning
    #[arg(long)]
    check_content: bool,

    /// Checkpoint file (defaults to <ROOT>.progress)
    #[arg(long)]
    progress: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Build or load the tree and print it
    Scan(TreeArgs),

    /// Print every file in traversal order
    List(TreeArgs),

    /// Print the next pending files, checkpointing after each one
    Next {
        #[command(flatten)]
        tree: TreeArgs,

        /// Number of files to hand out
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Show checkpoint progress
    Status(TreeArgs),

    /// Move the checkpoint back to the first file
    Reset(TreeArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum KindArg {
    #[default]
    Raw,
    Image,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    let (args, action) = match cli.command {
        Command::Scan(args) => (args, Action::Scan),
        Command::List(args) => (args, Action::List),
        Command::Next { tree, count } => (tree, Action::Next(count)),
        Command::Status(args) => (args, Action::Status),
        Command::Reset(args) => (args, Action::Reset),
    };

    match args.kind {
        KindArg::Raw => run::<RawFile>(&args, action),
        KindArg::Image => run::<ImageFile>(&args, action),
        KindArg::Json => run::<JsonFile>(&args, action),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[derive(Clone, Copy)]
enum Action {
    Scan,
    List,
    Next(usize),
    Status,
    Reset,
}

fn run<F>(args: &TreeArgs, action: Action) -> Result<()>
where
    F: TypedFile<Options = FileOptions>,
{
    let config = IteratorConfig::builder()
        .root(&args.root)
        .use_cache(!args.no_cache)
        .cache_path(args.cache.clone())
        .validate(args.validate)
        .build()
        .wrap_err("Invalid arguments")?;
    let options = FileOptions {
        validate: args.check_content,
    };
    let progress = args
        .progress
        .clone()
        .unwrap_or_else(|| progress_path(&args.root));

    match action {
        Action::Scan => {
            let iter = FileIterator::<F>::new(&config, options).wrap_err("Scan failed")?;
            let stats = iter.stats();
            println!("{}", iter.root().display());
            for node in iter.tree() {
                print_node(node, 1);
            }
            println!();
            println!(
                " {} files, {} directories, depth {}",
                stats.total_files, stats.total_dirs, stats.max_depth
            );
            if !iter.warnings().is_empty() {
                println!(" {} entries ignored during scan", iter.warnings().len());
            }
        }
        Action::List => {
            let mut iter = FileIterator::<F>::new(&config, options).wrap_err("Scan failed")?;
            for file in &mut iter {
                println!("{}", file.path().display());
            }
        }
        Action::Next(count) => {
            let mut iter = open_progress::<F>(&config, options, &progress)?;
            let mut walk = iter.begin_iteration();
            let mut handed_out = 0;
            while handed_out < count {
                let Some(file) = walk.next() else { break };
                println!("{}", file.path().display());
                walk.checkpoint(&progress)
                    .wrap_err_with(|| format!("Failed to write {}", progress.display()))?;
                handed_out += 1;
            }
            if handed_out == 0 {
                eprintln!("All files done.");
            }
        }
        Action::Status => {
            let iter = open_progress::<F>(&config, options, &progress)?;
            println!(
                "{} of {} files done, {} remaining",
                iter.finished_before(),
                iter.len(),
                iter.remaining()
            );
        }
        Action::Reset => {
            let mut iter = open_progress::<F>(&config, options, &progress)?;
            iter.reset_progress(&progress)
                .wrap_err_with(|| format!("Failed to write {}", progress.display()))?;
            println!("Progress reset, {} files pending", iter.remaining());
        }
    }

    Ok(())
}

/// Resume from `progress` if it exists, otherwise start over from the tree.
fn open_progress<F: TypedFile>(
    config: &IteratorConfig,
    options: F::Options,
    progress: &Path,
) -> Result<FileIterator<F>> {
    if progress.exists() {
        return FileIterator::load(progress)
            .wrap_err_with(|| format!("Failed to load {}", progress.display()));
    }
    FileIterator::new(config, options).context("Scan failed")
}

/// Sibling checkpoint file: `/data/set` -> `/data/set.progress`.
fn progress_path(root: &Path) -> PathBuf {
    filetrail_core::default_cache_path(root).with_extension("progress")
}

/// Print a node and its children.
fn print_node<F: TypedFile>(node: &TreeNode<F>, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = node
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match node {
        TreeNode::Leaf(_) => println!("{indent}  {name}"),
        TreeNode::Directory { children, .. } => {
            println!("{indent}▼ {name}/ ({} files)", node.file_count());
            for child in children {
                print_node(child, depth + 1);
            }
        }
    }
}
