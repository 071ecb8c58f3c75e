// Command line front end: harvest the card catalog, then analyze, check and
// compare deck files against it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use deckwright::config::Config;
use deckwright::harvester::{build_catalog, save_raw, Harvester};
use deckwright::snapshot::{save_snapshot, CatalogSnapshot};
use deckwright::{check_legality, detailed_stats, score, Deck, DeckComparator};

#[derive(Parser, Debug)]
#[command(name = "deckwright", version, about = "Deck analysis for the card game")]
struct Cli {
    /// JSON configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the card catalog and save raw and compressed snapshots
    Harvest,
    /// Print composition statistics and the deck score
    Analyze { deck: PathBuf },
    /// Check a deck against the tournament rules
    Legality { deck: PathBuf },
    /// Run the simulated matchup comparison between two decks
    Compare { deck_a: PathBuf, deck_b: PathBuf },
}

fn load_deck(path: &Path) -> Result<Deck> {
    let file = File::open(path).with_context(|| format!("opening deck file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing deck file {}", path.display()))
}

/// ### HARVEST ###
fn run_harvest(config: &Config) -> Result<()> {
    println!("\n--- Step 1: Harvesting Cards from API ---");
    let harvester = Harvester::new(&config.harvest)?;
    let raw = harvester.harvest()?;
    save_raw(&config.output.raw_catalog, &raw)?;

    println!("\n--- Step 2: Building Catalog ---");
    let catalog = build_catalog(&raw);
    println!("   > {} unique cards", catalog.len());

    println!("\n--- Step 3: Saving Snapshots ---");
    let snapshot = CatalogSnapshot::from_catalog(&catalog, config.harvest.query_urls());
    let sizes = save_snapshot(&config.output.catalog_snapshot, &snapshot)?;
    println!("   > JSON: {} KB", sizes.json / 1024);
    println!("   > Gzip compressed: {} KB", sizes.gzip / 1024);
    println!("   > LZ4 compressed: {} KB", sizes.lz4 / 1024);
    Ok(())
}

fn run_analyze(path: &Path) -> Result<()> {
    let deck = load_deck(path)?;
    let stats = detailed_stats(&deck.entries);
    let report = score(&deck.entries);

    println!("📊 {} by {}", deck.name, deck.author);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("\nScore: {:.1}/10  Archetype: {} ({:?})", report.score, report.archetype, report.confidence);
    for (title, lines) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Suggestions", &report.suggestions),
    ] {
        if lines.is_empty() {
            continue;
        }
        println!("\n{}:", title);
        for line in lines {
            println!("   - {}", line);
        }
    }
    println!("\nMatchups:");
    for (opponent, odds) in &report.matchups {
        println!("   vs {}: {}%", opponent, odds);
    }
    Ok(())
}

fn run_legality(path: &Path) -> Result<bool> {
    let deck = load_deck(path)?;
    let checks = check_legality(&deck.entries);
    for check in &checks {
        let mark = if check.passed { "✅" } else { "❌" };
        println!("{} {}: {}", mark, check.rule, check.message);
    }
    Ok(checks.iter().all(|c| c.passed))
}

fn run_compare(config: &Config, path_a: &Path, path_b: &Path) -> Result<()> {
    let deck_a = load_deck(path_a)?;
    let deck_b = load_deck(path_b)?;
    let comparator = DeckComparator::new(config.analysis.comparison_latency());

    let runtime = tokio::runtime::Runtime::new()?;
    println!("🔍 Analyzing matchup...");
    let report = runtime.block_on(comparator.compare(&deck_a, &deck_b));

    println!(
        "\n{} vs {}: {}% win probability, ~{} wins out of 10 (simulated)",
        report.deck_a, report.deck_b, report.win_probability, report.predicted_wins
    );
    for (title, lines) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Recommendations", &report.recommendations),
    ] {
        println!("\n{}:", title);
        for line in lines {
            println!("   - {}", line);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = cli
        .config
        .as_deref()
        .map_or_else(|| Ok(Config::default()), |path| Config::load(path))
        .context("loading configuration")
        .and_then(|config| match &cli.command {
            Commands::Harvest => run_harvest(&config),
            Commands::Analyze { deck } => run_analyze(deck),
            Commands::Legality { deck } => run_legality(deck).and_then(|legal| {
                if legal {
                    Ok(())
                } else {
                    anyhow::bail!("deck is not tournament legal")
                }
            }),
            Commands::Compare { deck_a, deck_b } => run_compare(&config, deck_a, deck_b),
        });

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}
