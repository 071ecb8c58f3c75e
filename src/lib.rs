//! Deck building toolkit for the card game: catalog harvesting and search,
//! deck composition statistics, heuristic scoring, tournament legality, a
//! simulated matchup comparison, version deltas and a persisted state store.

pub mod card;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod deck;
pub mod delta;
pub mod error;
pub mod harvester;
pub mod legality;
pub mod scoring;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use card::{Card, CardProfile};
pub use catalog::{CardCatalog, CatalogFilter};
pub use compare::{AnalysisState, ComparisonReport, DeckComparator};
pub use config::Config;
pub use deck::{Deck, DeckEntry};
pub use error::{Error, Result};
pub use legality::{check_legality, is_legal, LegalityCheck};
pub use scoring::{score, Archetype, Confidence, ScoreReport};
pub use stats::{aggregate, detailed_stats, CompositionStats, DetailedStats};
