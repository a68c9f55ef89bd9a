mod config;
mod interactive;
mod items;
mod output;
mod store;

use clap::Parser;
use duelrank_core::constants::{
    DEFAULT_BUCKET_COUNT, DEFAULT_WRITE_INTERVAL_SECS, DIRECT_WIN_MARGIN, EXPORT_ITERATIONS,
};
use duelrank_core::{
    boost_ratings, reconcile, train_davidson_model, train_elo_model, DavidsonOptions, EloOptions,
    ExportOptions, FittedModel, ModelKind, SelectionPolicy, SessionConfig, Snapshot, ThrottledSink,
    VotingSession,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::DuelrankConfig;
use crate::store::JsonFileSink;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(
    name = "duelrank",
    version,
    about = "Rank a folder of images and videos by voting on pairs"
)]
struct Cli {
    /// Log what the engine is doing (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Vote on pairs from a directory until you quit
    Vote(VoteArgs),
    /// Print the current ranking of a directory
    Rank(RankArgs),
    /// Create a default config file at ~/.config/duelrank/config.toml
    Init,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Directory of images and videos (searched recursively)
    dir: PathBuf,

    /// Rating model: "elo" or "davidson"
    #[arg(long)]
    model: Option<String>,

    /// Elo passes for stored and displayed ratings. Default: 1000.
    #[arg(long)]
    export_iterations: Option<usize>,

    /// Path to config file (default: ~/.config/duelrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct VoteArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Pair selection: "fast" or "exhaustive"
    #[arg(long)]
    selection: Option<String>,

    /// Seconds between writes of the voting history. Default: 10.
    #[arg(long)]
    write_interval: Option<u64>,

    /// Number of rating buckets stored with the history. Default: 10.
    #[arg(long)]
    buckets: Option<usize>,
}

#[derive(Parser)]
struct RankArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

fn parse_model(value: &str) -> ModelKind {
    match value {
        "elo" => ModelKind::Elo,
        "davidson" => ModelKind::Davidson,
        other => bail(format!("Unknown model \"{other}\". Use \"elo\" or \"davidson\".")),
    }
}

fn parse_selection(value: &str) -> SelectionPolicy {
    match value {
        "fast" => SelectionPolicy::Fast,
        "exhaustive" => SelectionPolicy::Exhaustive,
        other => bail(format!("Unknown selection \"{other}\". Use \"fast\" or \"exhaustive\".")),
    }
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose { "duelrank=debug,duelrank_core=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Vote(args) => run_vote(args),
        Commands::Rank(args) => run_rank(args),
        Commands::Init => {
            let path = config::config_path();
            config::create_default_config(&path).unwrap_or_else(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    bail(format!("Config file already exists at {}", path.display()))
                }
                _ => bail(format!("Failed to write config to {}: {e}", path.display())),
            });
            println!("Created config at {}", path.display());
            println!("Edit it to set your default model, selection, etc.");
        }
    }
}

/// Load config file and settings shared by every command (CLI wins).
fn load_common(common: &CommonArgs) -> (DuelrankConfig, ModelKind, EloOptions) {
    let config_path = common.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let model = common.model.as_deref().map(parse_model).or(cfg.model).unwrap_or_default();
    let export_elo = EloOptions {
        iterations: common.export_iterations.or(cfg.export_iterations).unwrap_or(EXPORT_ITERATIONS),
        ..EloOptions::default()
    };
    (cfg, model, export_elo)
}

fn load_items(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        bail(format!("{} is not a directory", dir.display()));
    }
    let items = items::collect_items(dir)
        .unwrap_or_else(|e| bail(format!("Failed to read directory {}: {e}", dir.display())));
    if items.len() < 2 {
        bail(format!(
            "Need at least 2 images or videos to compare, found {} in {}",
            items.len(),
            dir.display()
        ));
    }
    items
}

fn run_vote(args: VoteArgs) {
    let (cfg, model, export_elo) = load_common(&args.common);
    let selection =
        args.selection.as_deref().map(parse_selection).or(cfg.selection).unwrap_or_default();
    let write_interval =
        args.write_interval.or(cfg.write_interval_secs).unwrap_or(DEFAULT_WRITE_INTERVAL_SECS);
    let buckets = args.buckets.or(cfg.buckets).unwrap_or(DEFAULT_BUCKET_COUNT);
    if buckets < 1 {
        bail("--buckets must be at least 1");
    }

    let dir = &args.common.dir;
    let items = load_items(dir);
    let stored = store::load_snapshot(dir);

    let sink = JsonFileSink::new(dir, ExportOptions { elo: export_elo, buckets });
    let persistence = ThrottledSink::new(sink, Duration::from_secs(write_interval));
    let session_config = SessionConfig {
        model,
        selection,
        ..SessionConfig::default()
    };
    info!(?model, ?selection, write_interval, "starting vote session");

    let mut session = VotingSession::open(items, stored, persistence, session_config, rand::rng());
    let stdin = io::stdin();
    interactive::run(&mut session, stdin.lock(), io::stdout().lock())
        .unwrap_or_else(|e| bail(format!("Voting history may not be saved: {e}")));

    println!("{} votes saved to {}", session.votes().len(), store::snapshot_path(dir).display());
}

fn run_rank(args: RankArgs) {
    let (_cfg, model, export_elo) = load_common(&args.common);
    let dir = &args.common.dir;
    let items = load_items(dir);

    let snapshot = match store::read_snapshot(dir) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            bail(format!("No voting history in {}. Run `duelrank vote` first.", dir.display()))
        }
        Err(e) => bail(format!("Failed to load {}: {e}", store::snapshot_path(dir).display())),
    };
    let (snapshot, renames) = reconcile(&snapshot, &items);
    if !renames.is_empty() {
        info!(count = renames.len(), "ranking with renamed items");
    }

    let fitted = fit_for_display(&snapshot, model, &export_elo);
    let starred = snapshot.starred_set();
    let rankings = output::rank_items(&items, &fitted, &snapshot.votes, &starred);

    if args.json {
        output::print_json(&rankings, model, snapshot.votes.len());
    } else {
        output::print_table(&rankings, model, snapshot.votes.len());
    }
}

/// The slow fit used for display: Elo with starred items boosted, or Davidson
/// with every direct win made visible.
fn fit_for_display(snapshot: &Snapshot, model: ModelKind, export_elo: &EloOptions) -> FittedModel {
    let votes = snapshot.votes.votes();
    match model {
        ModelKind::Elo => {
            let fitted = train_elo_model(votes, export_elo, &mut rand::rng());
            let starred = snapshot.starred_set();
            FittedModel::Elo(boost_ratings(&starred, &fitted, export_elo))
        }
        ModelKind::Davidson => FittedModel::Davidson(
            train_davidson_model(votes, &DavidsonOptions::default())
                .with_direct_wins(votes, DIRECT_WIN_MARGIN),
        ),
    }
}
