// Deck composition aggregation. Both the quick summary shown in the deck
// list and the per-card statistics panel are produced here; neither ever
// fails, malformed card fields just count as absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deck::DeckEntry;

pub const TARGET_DECK_SIZE: u32 = 50;
/// Units at or below this cost count toward the early curve.
pub const LOW_COST_THRESHOLD: f64 = 3.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub cards: u32,
    pub target: u32,
    pub percent: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositionStats {
    pub total_cards: u32,
    pub unique_cards: usize,
    pub by_type: BTreeMap<String, u32>,
    pub by_color: BTreeMap<String, u32>,
    pub by_rarity: BTreeMap<String, u32>,
    pub by_affinity: BTreeMap<String, u32>,
    pub average_cost: String,
    pub total_ap: i64,
    pub total_bp: i64,
    pub average_bp: String,
    pub completion: Completion,
}

impl CompositionStats {
    pub fn count_of_type(&self, card_type: &str) -> u32 {
        self.by_type.get(card_type).copied().unwrap_or(0)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    #[serde(flatten)]
    pub composition: CompositionStats,
    pub average_ap: String,
    /// Unrounded average cost.
    pub average_cost_value: f64,
    /// `average_cost` as a number; the scorer reasons about this value.
    pub reported_average_cost: f64,
    pub cost_curve: BTreeMap<u32, u32>,
    pub low_cost_units: u32,
}

// Running sums shared by both variants.
#[derive(Default)]
struct Accumulator {
    total_cards: u32,
    by_type: BTreeMap<String, u32>,
    by_color: BTreeMap<String, u32>,
    by_rarity: BTreeMap<String, u32>,
    by_affinity: BTreeMap<String, u32>,
    cost_sum: f64,
    cost_cards: u32,
    ap_sum: i64,
    ap_cards: u32,
    bp_sum: i64,
    bp_cards: u32,
    cost_curve: BTreeMap<u32, u32>,
    low_cost_units: u32,
}

impl Accumulator {
    fn collect(entries: &[DeckEntry]) -> Self {
        let mut acc = Accumulator::default();
        for entry in entries {
            let card = &entry.card;
            let quantity = u32::from(entry.quantity);
            acc.total_cards += quantity;

            if let Some(card_type) = &card.card_type {
                *acc.by_type.entry(card_type.clone()).or_insert(0) += quantity;
            }
            for color in card.colors() {
                *acc.by_color.entry(color.clone()).or_insert(0) += quantity;
            }
            if let Some(rarity) = &card.rarity {
                *acc.by_rarity.entry(rarity.clone()).or_insert(0) += quantity;
            }
            if let Some(affinity) = card.affinity() {
                *acc.by_affinity.entry(affinity.to_string()).or_insert(0) += quantity;
            }

            if let Some(cost) = card.cost() {
                acc.cost_sum += cost * f64::from(quantity);
                acc.cost_cards += quantity;
                let bucket = if cost < 0.0 { 0 } else { cost as u32 };
                *acc.cost_curve.entry(bucket).or_insert(0) += quantity;
                if card.is_type("Unit") && cost <= LOW_COST_THRESHOLD {
                    acc.low_cost_units += quantity;
                }
            }
            if let Some(ap) = card.ap() {
                acc.ap_sum = acc.ap_sum.saturating_add(ap.saturating_mul(i64::from(quantity)));
                acc.ap_cards += quantity;
            }
            if let Some(bp) = card.bp() {
                acc.bp_sum = acc.bp_sum.saturating_add(bp.saturating_mul(i64::from(quantity)));
                acc.bp_cards += quantity;
            }
        }
        acc
    }

    fn average_cost_value(&self) -> f64 {
        average(self.cost_sum, self.cost_cards)
    }

    fn reported_average_cost(&self) -> f64 {
        round_to_tenth(self.average_cost_value())
    }

    fn composition(&self, unique_cards: usize) -> CompositionStats {
        let completed = self.total_cards.min(TARGET_DECK_SIZE);
        CompositionStats {
            total_cards: self.total_cards,
            unique_cards,
            by_type: self.by_type.clone(),
            by_color: self.by_color.clone(),
            by_rarity: self.by_rarity.clone(),
            by_affinity: self.by_affinity.clone(),
            average_cost: format!("{:.1}", self.reported_average_cost()),
            total_ap: self.ap_sum,
            total_bp: self.bp_sum,
            average_bp: format!("{:.0}", average(self.bp_sum as f64, self.bp_cards)),
            completion: Completion {
                cards: completed,
                target: TARGET_DECK_SIZE,
                percent: f64::from(completed) * 100.0 / f64::from(TARGET_DECK_SIZE),
            },
        }
    }
}

/// Rounds half away from zero to one decimal, the precision averages are
/// reported at.
pub fn round_to_tenth(value: f64) -> f64 {
    // Adding zero folds -0.0 into 0.0.
    (value * 10.0).round() / 10.0 + 0.0
}

fn average(sum: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Summary aggregation: counts, average cost and BP, AP/BP totals.
pub fn aggregate(entries: &[DeckEntry]) -> CompositionStats {
    Accumulator::collect(entries).composition(entries.len())
}

/// Per-card statistics: the summary plus average AP and the cost curve.
pub fn detailed_stats(entries: &[DeckEntry]) -> DetailedStats {
    let acc = Accumulator::collect(entries);
    DetailedStats {
        composition: acc.composition(entries.len()),
        average_ap: format!("{:.1}", average(acc.ap_sum as f64, acc.ap_cards)),
        average_cost_value: acc.average_cost_value(),
        reported_average_cost: acc.reported_average_cost(),
        cost_curve: acc.cost_curve.clone(),
        low_cost_units: acc.low_cost_units,
    }
}
