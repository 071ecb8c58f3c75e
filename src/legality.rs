// Tournament legality. Each rule is evaluated on its own against the whole
// entry list and reported individually; a deck is legal only when every
// rule passes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deck::{deck_colors, DeckEntry, MAX_COPIES};

pub const DECK_SIZE: u32 = 50;
pub const MAX_COLORS: usize = 2;
pub const SOFT_MAX_COLORS: usize = 3;

/// Cards currently banned from sanctioned play.
pub const BANNED_CARDS: &[&str] = &[
    "Infinite Justice Overdrive",
    "Trans-Am Burst",
    "Zero System Override",
    "Satellite Cannon Barrage",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegalityCheck {
    pub rule: String,
    pub passed: bool,
    pub message: String,
}

impl LegalityCheck {
    fn new(rule: &str, passed: bool, message: String) -> Self {
        LegalityCheck {
            rule: rule.to_string(),
            passed,
            message,
        }
    }
}

fn check_deck_size(entries: &[DeckEntry]) -> LegalityCheck {
    let total: u32 = entries.iter().map(|e| u32::from(e.quantity)).sum();
    let message = if total == DECK_SIZE {
        format!("Deck has exactly {} cards", DECK_SIZE)
    } else if total < DECK_SIZE {
        format!("Deck has {} cards; add {} more to reach {}", total, DECK_SIZE - total, DECK_SIZE)
    } else {
        format!("Deck has {} cards; remove {} to get down to {}", total, total - DECK_SIZE, DECK_SIZE)
    };
    LegalityCheck::new("Deck Size", total == DECK_SIZE, message)
}

fn check_card_copies(entries: &[DeckEntry]) -> LegalityCheck {
    // The same card can sit in more than one entry, so sum per id.
    let mut copies: BTreeMap<&str, (&str, u32)> = BTreeMap::new();
    for entry in entries {
        let slot = copies
            .entry(entry.card.id.as_str())
            .or_insert((entry.card.name.as_str(), 0));
        slot.1 += u32::from(entry.quantity);
    }
    let over: Vec<String> = copies
        .values()
        .filter(|(_, count)| *count > u32::from(MAX_COPIES))
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect();

    if over.is_empty() {
        LegalityCheck::new("Card Copies", true, format!("No card exceeds {} copies", MAX_COPIES))
    } else {
        LegalityCheck::new(
            "Card Copies",
            false,
            format!("Reduce to at most {} copies: {}", MAX_COPIES, over.join(", ")),
        )
    }
}

fn check_color_limit(colors: &[String], rule: &str, limit: usize) -> LegalityCheck {
    if colors.len() <= limit {
        LegalityCheck::new(rule, true, format!("Deck uses {} color(s)", colors.len()))
    } else {
        LegalityCheck::new(
            rule,
            false,
            format!(
                "Deck uses {} colors ({}); cut down to {} or fewer",
                colors.len(),
                colors.join(", "),
                limit
            ),
        )
    }
}

fn check_banned(entries: &[DeckEntry]) -> LegalityCheck {
    let mut banned: Vec<&str> = entries
        .iter()
        .map(|e| e.card.name.as_str())
        .filter(|name| BANNED_CARDS.contains(name))
        .collect();
    banned.sort_unstable();
    banned.dedup();

    if banned.is_empty() {
        LegalityCheck::new("Banned Cards", true, "No banned cards".to_string())
    } else {
        LegalityCheck::new(
            "Banned Cards",
            false,
            format!("Remove banned cards: {}", banned.join(", ")),
        )
    }
}

pub fn check_legality(entries: &[DeckEntry]) -> Vec<LegalityCheck> {
    let colors = deck_colors(entries);
    vec![
        check_deck_size(entries),
        check_card_copies(entries),
        check_color_limit(&colors, "Color Limit", MAX_COLORS),
        check_banned(entries),
        check_color_limit(&colors, "Color Balance", SOFT_MAX_COLORS),
    ]
}

pub fn is_legal(entries: &[DeckEntry]) -> bool {
    check_legality(entries).iter().all(|check| check.passed)
}
