//! Property tests for the analysis pipeline over generated decks.

use std::time::Duration;

use deckwright::card::{parse_lenient, Card, CardProfile};
use deckwright::compare::{predicted_wins, MAX_WIN_PROBABILITY, MIN_WIN_PROBABILITY};
use deckwright::scoring::{infer_archetype, DeckProfile};
use deckwright::{aggregate, detailed_stats, score, Deck, DeckComparator, DeckEntry};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TYPES: [&str; 5] = ["Unit", "Pilot", "Command", "Base", "-"];
const COLORS: [&str; 6] = ["Red", "Blue", "Green", "White", "Purple", "-"];

// Raw stat values as they can arrive from the backend, extremes included.
fn stat_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..12i64).prop_map(|v| v.to_string()),
        any::<i64>().prop_map(|v| v.to_string()),
        any::<f64>().prop_map(|v| v.to_string()),
        "[0-9]{1,30}",
        "-?[0-9]{1,3}(\\.[0-9]{1,3})?e[0-9]{1,3}",
        prop::sample::select(vec!["-", "", "x", "1e30", "-1e30", "inf", "NaN", "9223372036854775807"])
            .prop_map(str::to_string),
    ]
}

#[derive(Debug, Clone)]
struct EntryFields {
    type_idx: usize,
    color_idx: usize,
    quantity: u8,
    rich: bool,
    cost: String,
    ap: String,
    bp: String,
    simple_cost: u32,
    simple_ap: i64,
}

fn build_entry(index: usize, fields: EntryFields) -> DeckEntry {
    let color = COLORS[fields.color_idx];
    let colors = if color == "-" { Vec::new() } else { vec![color.to_string()] };
    let profile = if fields.rich {
        CardProfile::Rich {
            tcg_id: format!("R{}", index),
            ap: fields.ap,
            bp: fields.bp,
            affinity: None,
            cost: Some(fields.cost),
            colors,
        }
    } else {
        CardProfile::Simple {
            cost: Some(fields.simple_cost),
            colors,
            ap: Some(fields.simple_ap),
            bp: parse_lenient(&fields.bp),
            hp: None,
            level: None,
        }
    };
    DeckEntry {
        card: Card {
            id: format!("C{}", index),
            name: format!("Card {}", index),
            card_type: Some(TYPES[fields.type_idx].to_string()).filter(|t| t != "-"),
            rarity: None,
            set: None,
            effects: Vec::new(),
            image: None,
            market_price: None,
            profile,
        },
        quantity: fields.quantity,
    }
}

fn fields_strategy() -> impl Strategy<Value = EntryFields> {
    (
        (0..5usize, 0..6usize, 1..=4u8, any::<bool>()),
        (stat_strategy(), stat_strategy(), stat_strategy()),
        (prop_oneof![0..9u32, any::<u32>()], any::<i64>()),
    )
        .prop_map(|((type_idx, color_idx, quantity, rich), (cost, ap, bp), (simple_cost, simple_ap))| EntryFields {
            type_idx,
            color_idx,
            quantity,
            rich,
            cost,
            ap,
            bp,
            simple_cost,
            simple_ap,
        })
}

fn entries_strategy() -> impl Strategy<Value = Vec<DeckEntry>> {
    prop::collection::vec(fields_strategy(), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, fields)| build_entry(i, fields))
            .collect()
    })
}

proptest! {
    #[test]
    fn total_cards_is_sum_of_quantities(entries in entries_strategy()) {
        let expected: u32 = entries.iter().map(|e| u32::from(e.quantity)).sum();
        prop_assert_eq!(aggregate(&entries).total_cards, expected);
    }

    #[test]
    fn aggregation_tolerates_any_stat_values(entries in entries_strategy()) {
        let detailed = detailed_stats(&entries);
        let summary = aggregate(&entries);
        prop_assert_eq!(&detailed.composition, &summary);
        prop_assert!(detailed.composition.completion.cards <= 50);
        prop_assert!(detailed.average_cost_value.is_finite());
        prop_assert!(detailed.composition.average_cost.parse::<f64>().is_ok());
        prop_assert!(detailed.composition.average_bp.parse::<f64>().is_ok());
        prop_assert!(detailed.average_ap.parse::<f64>().is_ok());
    }

    #[test]
    fn score_is_always_clamped(entries in entries_strategy()) {
        let report = score(&entries);
        prop_assert!(report.score >= 1.0 && report.score <= 10.0);
    }

    #[test]
    fn archetype_is_deterministic(entries in entries_strategy()) {
        let profile = DeckProfile::from_entries(&entries);
        prop_assert_eq!(infer_archetype(&profile), infer_archetype(&profile.clone()));
        let first = score(&entries);
        let second = score(&entries);
        prop_assert_eq!(first.archetype, second.archetype);
        prop_assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn comparison_stays_in_range(seed in any::<u64>()) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let comparator = DeckComparator::new(Duration::ZERO);
        let a = Deck::new("a", "A", "x");
        let b = Deck::new("b", "B", "y");
        let report = runtime.block_on(comparator.compare_with_rng(&a, &b, &mut StdRng::seed_from_u64(seed)));
        prop_assert!((MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY).contains(&report.win_probability));
        prop_assert_eq!(report.predicted_wins, predicted_wins(report.win_probability));
        prop_assert_eq!(
            report.predicted_wins,
            (f64::from(report.win_probability) / 10.0).round() as u32
        );
    }
}
