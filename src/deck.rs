// Deck model: entries plus the metadata the deck builder keeps alongside
// them (record, game log, saved versions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Tournament copy limit. The builder clamps to it; the aggregator does not
/// re-check it.
pub const MAX_COPIES: u8 = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeckEntry {
    pub card: Card,
    pub quantity: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeckVersion {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub note: Option<String>,
    pub entries: Vec<DeckEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameLogEntry {
    pub played_at: DateTime<Utc>,
    pub opponent: String,
    pub won: bool,
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub entries: Vec<DeckEntry>,
    #[serde(default)]
    pub versions: Vec<DeckVersion>,
    #[serde(default)]
    pub game_log: Vec<GameLogEntry>,
}

impl Deck {
    pub fn new(id: &str, name: &str, author: &str) -> Self {
        Deck::created_at(id, name, author, Utc::now())
    }

    pub fn created_at(id: &str, name: &str, author: &str, now: DateTime<Utc>) -> Self {
        Deck {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            tags: Vec::new(),
            is_public: false,
            author: author.to_string(),
            created_at: now,
            updated_at: now,
            wins: 0,
            losses: 0,
            entries: Vec::new(),
            versions: Vec::new(),
            game_log: Vec::new(),
        }
    }

    pub fn with_entries(mut self, entries: Vec<DeckEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.quantity)).sum()
    }

    pub fn unique_cards(&self) -> usize {
        self.entries.len()
    }

    /// De-duplicated union of entry colors, in order of first appearance.
    pub fn colors(&self) -> Vec<String> {
        deck_colors(&self.entries)
    }

    /// Sets the quantity of a card, adding the entry if needed. Zero removes
    /// the card; anything above the copy limit is clamped.
    pub fn set_quantity(&mut self, card: Card, quantity: u8) {
        self.set_quantity_at(card, quantity, Utc::now());
    }

    pub fn set_quantity_at(&mut self, card: Card, quantity: u8, now: DateTime<Utc>) {
        let quantity = quantity.min(MAX_COPIES);
        match self.entries.iter().position(|e| e.card.id == card.id) {
            Some(index) if quantity == 0 => {
                self.entries.remove(index);
            }
            Some(index) => self.entries[index].quantity = quantity,
            None if quantity == 0 => return,
            None => self.entries.push(DeckEntry { card, quantity }),
        }
        self.updated_at = now;
    }

    pub fn remove_card(&mut self, card_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.card.id != card_id);
        let removed = self.entries.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn record_game(&mut self, opponent: &str, won: bool, notes: Option<String>) {
        self.record_game_at(opponent, won, notes, Utc::now());
    }

    pub fn record_game_at(&mut self, opponent: &str, won: bool, notes: Option<String>, now: DateTime<Utc>) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.game_log.push(GameLogEntry {
            played_at: now,
            opponent: opponent.to_string(),
            won,
            notes,
        });
        self.updated_at = now;
    }

    /// Win rate as a fraction, or `None` before the first recorded game.
    pub fn win_rate(&self) -> Option<f64> {
        let played = self.wins + self.losses;
        if played == 0 {
            None
        } else {
            Some(f64::from(self.wins) / f64::from(played))
        }
    }

    /// Stores the current entries as the next numbered version.
    pub fn snapshot_version(&mut self, note: Option<String>) -> u32 {
        self.snapshot_version_at(note, Utc::now())
    }

    pub fn snapshot_version_at(&mut self, note: Option<String>, now: DateTime<Utc>) -> u32 {
        let version = self.versions.last().map_or(1, |v| v.version + 1);
        self.versions.push(DeckVersion {
            version,
            saved_at: now,
            note,
            entries: self.entries.clone(),
        });
        self.updated_at = now;
        version
    }

    pub fn version(&self, version: u32) -> Option<&DeckVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}

pub fn deck_colors(entries: &[DeckEntry]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for color in entries.iter().flat_map(|e| e.card.colors()) {
        if !colors.contains(color) {
            colors.push(color.clone());
        }
    }
    colors
}
