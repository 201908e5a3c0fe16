use clap::{Args, Parser, Subcommand};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::debug;

use comparo::model::{ComparablePatch, MetricKind, MetricPatch, Rating};
use comparo::persistence::{load_snapshot, save_snapshot, DiskStore, Session};
use comparo::store::{Direction, StoreError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_PERSISTENCE: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INVALID_ARGUMENT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show comparables ranked by weighted score (default if no subcommand)
    Results {
        /// Show each metric's contribution under every item
        #[arg(short, long)]
        breakdown: bool,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show the rating grid (metrics x items)
    Table,
    /// List metric definitions
    Metrics,
    /// Add, edit, reorder or delete metrics
    #[command(subcommand)]
    Metric(MetricCommand),
    /// Add, edit, reorder or delete items being compared
    #[command(subcommand)]
    Item(ItemCommand),
    /// Set one rating: rate <ITEM> <METRIC> <VALUE>
    Rate {
        /// Item index (1-based, as shown in `table`)
        item: usize,
        /// Metric index (1-based, as shown in `metrics`)
        metric: usize,
        /// yes/no, 0-5, bad/neutral/good or a number, depending on the metric
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Open a ranked item's link in the browser
    Open {
        /// Rank of the item to open (1-based, as shown in `results`)
        rank: usize,
    },
    /// Write the whole comparison to a JSON file
    Export { path: PathBuf },
    /// Replace the comparison with one read from a JSON file
    Import { path: PathBuf },
    /// Discard all data and start over
    Reset {
        /// Start with nothing instead of the configured seed
        #[arg(long)]
        empty: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MetricCommand {
    /// Append a metric (numeric unless --kind is given)
    Add {
        /// boolean, five-star, bad-neutral-good or numeric
        #[arg(short, long)]
        kind: Option<MetricKind>,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Change a metric's name, importance or direction
    Set {
        index: usize,
        #[arg(short, long)]
        name: Option<String>,
        /// Relative importance (non-negative)
        #[arg(short, long)]
        importance: Option<f64>,
        /// Boolean metrics only
        #[arg(long)]
        true_is_better: Option<bool>,
        /// Numeric metrics only
        #[arg(long)]
        higher_is_better: Option<bool>,
    },
    /// Change a metric's kind; resets its ratings to the kind's default
    Retype { index: usize, kind: MetricKind },
    /// Move a metric one step: up/-1 or down/+1
    Move {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        direction: Direction,
    },
    /// Delete a metric and its ratings
    Delete { index: usize },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    /// Append an item with default ratings
    Add(ItemFields),
    /// Change an item's name or links (an empty link clears it)
    Set {
        index: usize,
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Move an item one step: left/-1 or right/+1
    Move {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        direction: Direction,
    },
    /// Delete an item and its ratings
    Delete { index: usize },
}

#[derive(Args, Debug)]
struct ItemFields {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    url: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

impl ItemFields {
    fn into_patch(self) -> ComparablePatch {
        let link = |value: Option<String>| {
            value.map(|v| {
                let v = v.trim().to_string();
                (!v.is_empty()).then_some(v)
            })
        };
        ComparablePatch {
            name: self.name,
            url: link(self.url),
            image_url: link(self.image_url),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "comparo")]
#[command(about = "Weighted side-by-side comparison of options", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file (defaults to ~/.config/comparo/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Print an error and exit with the given code.
fn fail(code: i32, what: &str, err: impl Display) -> ! {
    eprintln!("{}: {}", what, err);
    std::process::exit(code);
}

/// Convert a 1-based command-line index to a 0-based one.
fn zero_based(index: usize, what: &str) -> usize {
    if index == 0 {
        fail(
            EXIT_INVALID_ARGUMENT,
            "Invalid argument",
            format!("{} numbers start at 1", what),
        );
    }
    index - 1
}

/// Unwrap a store operation result, exiting on a rejected argument.
fn checked<T>(result: Result<T, StoreError>) -> T {
    result.unwrap_or_else(|e| fail(EXIT_INVALID_ARGUMENT, "Invalid argument", e))
}

fn main() {
    let cli = Cli::parse();
    comparo::logging::init(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Results {
        breakdown: false,
        tsv: false,
    });

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match comparo::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, "Config error", format!("{:#}", e)),
    };

    if let Err(errors) = comparo::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_dir = config.data_dir();

    // Reset never reads the stored comparison, so it works even when that is unusable
    if let Commands::Reset { empty } = command {
        let seed = if empty {
            comparo::store::Comparison::empty()
        } else {
            config.seed_comparison()
        };
        debug!(data_dir = %data_dir.display(), "resetting store");
        if let Err(e) = Session::create(DiskStore::new(&data_dir), seed) {
            fail(EXIT_PERSISTENCE, "Reset failed", format!("{:#}", e));
        }
        println!("Comparison reset");
        std::process::exit(EXIT_SUCCESS);
    }

    debug!(data_dir = %data_dir.display(), "opening store");
    let mut session = match Session::open(DiskStore::new(&data_dir), config.seed_comparison()) {
        Ok(s) => s,
        Err(e) => fail(EXIT_PERSISTENCE, "Storage error", format!("{:#}", e)),
    };

    let use_colors = comparo::output::should_use_colors();
    let scale = config.results.score_scale;

    match command {
        Commands::Results { breakdown, tsv } => {
            let ranked = match session.results() {
                Ok(r) => r,
                Err(e) => fail(EXIT_PERSISTENCE, "Stored data error", e),
            };
            if tsv {
                println!("{}", comparo::output::format_tsv(&ranked, scale));
            } else if breakdown || config.results.show_breakdown {
                println!(
                    "{}",
                    comparo::output::format_results_with_breakdown(&ranked, scale, use_colors)
                );
            } else {
                println!(
                    "{}",
                    comparo::output::format_results(&ranked, scale, use_colors)
                );
            }
        }
        Commands::Table => {
            println!(
                "{}",
                comparo::output::format_grid(session.state(), use_colors)
            );
        }
        Commands::Metrics => {
            println!(
                "{}",
                comparo::output::format_metrics(session.state().metrics(), use_colors)
            );
        }
        Commands::Metric(cmd) => run_metric(&mut session, cmd),
        Commands::Item(cmd) => run_item(&mut session, cmd),
        Commands::Rate {
            item,
            metric,
            value,
        } => {
            let item = zero_based(item, "Item");
            let metric = zero_based(metric, "Metric");
            let Some(target) = session.state().metrics().get(metric) else {
                fail(
                    EXIT_INVALID_ARGUMENT,
                    "Invalid argument",
                    format!(
                        "metric {} does not exist (have {})",
                        metric + 1,
                        session.state().metrics().len()
                    ),
                );
            };
            let rating = match Rating::parse(target.kind(), &value) {
                Ok(r) => r,
                Err(e) => fail(EXIT_INVALID_ARGUMENT, "Invalid rating", e),
            };
            checked(session.apply(|c| c.update_rating(item, metric, rating)));
            println!("Rated item {} on metric {}: {}", item + 1, metric + 1, rating);
        }
        Commands::Open { rank } => {
            let ranked = match session.results() {
                Ok(r) => r,
                Err(e) => fail(EXIT_PERSISTENCE, "Stored data error", e),
            };

            // Validate rank bounds (1-based)
            if rank < 1 || rank > ranked.len() {
                fail(
                    EXIT_INVALID_ARGUMENT,
                    "Invalid argument",
                    format!("rank {} must be between 1 and {}", rank, ranked.len()),
                );
            }

            let entry = &ranked[rank - 1];
            match comparo::browser::open_comparable(&entry.comparable) {
                Ok(url) => println!("Opening {} in browser: {}", entry.comparable.name, url),
                Err(e) => fail(EXIT_INVALID_ARGUMENT, "Failed to open browser", format!("{:#}", e)),
            }
        }
        Commands::Export { path } => {
            if let Err(e) = save_snapshot(&path, session.state()) {
                fail(EXIT_PERSISTENCE, "Export failed", format!("{:#}", e));
            }
            println!("Exported to {}", path.display());
        }
        Commands::Import { path } => {
            let state = match load_snapshot(&path) {
                Ok(s) => s,
                Err(e) => fail(EXIT_PERSISTENCE, "Import failed", format!("{:#}", e)),
            };
            println!(
                "Imported {} items and {} metrics from {}",
                state.comparables().len(),
                state.metrics().len(),
                path.display()
            );
            session.replace(state);
        }
        // Handled before the store is opened
        Commands::Reset { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

fn run_metric(session: &mut Session<DiskStore>, cmd: MetricCommand) {
    match cmd {
        MetricCommand::Add { kind, name } => {
            if matches!(&name, Some(n) if n.trim().is_empty()) {
                fail(EXIT_INVALID_ARGUMENT, "Invalid argument", "metric name must not be empty");
            }
            let kind = kind.unwrap_or(MetricKind::Numeric);
            let index = checked(session.apply(|c| {
                let index = c.add_metric_of(kind);
                if name.is_some() {
                    c.patch_metric(
                        index,
                        MetricPatch {
                            name,
                            ..Default::default()
                        },
                    )?;
                }
                Ok(index)
            }));
            let metric = &session.state().metrics()[index];
            println!("Added metric {}: {} ({})", index + 1, metric.name, kind.label());
        }
        MetricCommand::Set {
            index,
            name,
            importance,
            true_is_better,
            higher_is_better,
        } => {
            let index = zero_based(index, "Metric");
            let patch = MetricPatch {
                name,
                relative_importance: importance,
                true_is_better,
                higher_is_better,
            };
            if patch.is_empty() {
                fail(EXIT_INVALID_ARGUMENT, "Invalid argument", "nothing to change");
            }
            checked(session.apply(|c| c.patch_metric(index, patch)));
            println!("Updated metric {}", index + 1);
        }
        MetricCommand::Retype { index, kind } => {
            let index = zero_based(index, "Metric");
            checked(session.apply(|c| c.change_metric_type(index, kind)));
            println!(
                "Metric {} is now {}; its ratings were reset",
                index + 1,
                kind.label()
            );
        }
        MetricCommand::Move { index, direction } => {
            let index = zero_based(index, "Metric");
            checked(session.apply(|c| c.move_metric(index, direction)));
            println!("Moved metric {} by {}", index + 1, direction);
        }
        MetricCommand::Delete { index } => {
            let index = zero_based(index, "Metric");
            let removed = checked(session.apply(|c| c.delete_metric(index)));
            println!("Deleted metric {}: {}", index + 1, removed.name);
        }
    }
}

fn run_item(session: &mut Session<DiskStore>, cmd: ItemCommand) {
    match cmd {
        ItemCommand::Add(fields) => {
            let patch = fields.into_patch();
            if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
                fail(EXIT_INVALID_ARGUMENT, "Invalid argument", "item name must not be empty");
            }
            let index = checked(session.apply(|c| {
                let index = c.add_comparable();
                if !patch.is_empty() {
                    c.patch_comparable(index, patch)?;
                }
                Ok(index)
            }));
            let item = &session.state().comparables()[index];
            println!("Added item {}: {}", index + 1, item.name);
        }
        ItemCommand::Set { index, fields } => {
            let index = zero_based(index, "Item");
            let patch = fields.into_patch();
            if patch.is_empty() {
                fail(EXIT_INVALID_ARGUMENT, "Invalid argument", "nothing to change");
            }
            checked(session.apply(|c| c.patch_comparable(index, patch)));
            println!("Updated item {}", index + 1);
        }
        ItemCommand::Move { index, direction } => {
            let index = zero_based(index, "Item");
            checked(session.apply(|c| c.move_comparable(index, direction)));
            println!("Moved item {} by {}", index + 1, direction);
        }
        ItemCommand::Delete { index } => {
            let index = zero_based(index, "Item");
            let removed = checked(session.apply(|c| c.delete_comparable(index)));
            println!("Deleted item {}: {}", index + 1, removed.name);
        }
    }
}
