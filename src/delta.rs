// Delta system for deck version history. Instead of comparing whole entry
// lists, the history panel shows and replays the card-level changes between
// two saved versions.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::deck::{Deck, DeckEntry};
use crate::error::{Error, Result};

// Delta operation types
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DeltaOperation {
    Add(DeckEntry),
    Modify { card_id: String, from: u8, to: u8 },
    Remove(String), // Card id
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeltaStatistics {
    pub total_operations: usize,
    pub cards_added: usize,
    pub cards_modified: usize,
    pub cards_removed: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeckDelta {
    pub base_version: u32,
    pub target_version: u32,
    pub generated_at: DateTime<Utc>,
    pub operations: Vec<DeltaOperation>,
    pub statistics: DeltaStatistics,
}

impl DeckDelta {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// Entries keyed by card id, quantities summed when a card appears twice.
fn index_entries(entries: &[DeckEntry]) -> BTreeMap<&str, DeckEntry> {
    let mut index: BTreeMap<&str, DeckEntry> = BTreeMap::new();
    for entry in entries {
        index
            .entry(entry.card.id.as_str())
            .and_modify(|e| e.quantity = e.quantity.saturating_add(entry.quantity))
            .or_insert_with(|| entry.clone());
    }
    index
}

/// Card-level changes taking `old` to `new`, ordered by card id.
pub fn create_delta(old: &[DeckEntry], new: &[DeckEntry], base_version: u32, target_version: u32) -> DeckDelta {
    let old_index = index_entries(old);
    let new_index = index_entries(new);
    let mut operations = Vec::new();
    let mut stats = DeltaStatistics::default();

    for (card_id, new_entry) in &new_index {
        match old_index.get(card_id) {
            None => {
                operations.push(DeltaOperation::Add(new_entry.clone()));
                stats.cards_added += 1;
            }
            Some(old_entry) if old_entry.quantity != new_entry.quantity => {
                operations.push(DeltaOperation::Modify {
                    card_id: card_id.to_string(),
                    from: old_entry.quantity,
                    to: new_entry.quantity,
                });
                stats.cards_modified += 1;
            }
            Some(_) => {}
        }
    }
    for card_id in old_index.keys().filter(|id| !new_index.contains_key(*id)) {
        operations.push(DeltaOperation::Remove(card_id.to_string()));
        stats.cards_removed += 1;
    }
    stats.total_operations = operations.len();

    DeckDelta {
        base_version,
        target_version,
        generated_at: Utc::now(),
        operations,
        statistics: stats,
    }
}

/// Replays a delta onto an entry list. Modifications for cards that are no
/// longer present are ignored.
pub fn apply_delta(entries: &mut Vec<DeckEntry>, delta: &DeckDelta) {
    for operation in &delta.operations {
        match operation {
            DeltaOperation::Add(entry) => match entries.iter_mut().find(|e| e.card.id == entry.card.id) {
                Some(existing) => existing.quantity = entry.quantity,
                None => entries.push(entry.clone()),
            },
            DeltaOperation::Modify { card_id, to, .. } => {
                if let Some(existing) = entries.iter_mut().find(|e| &e.card.id == card_id) {
                    existing.quantity = *to;
                }
            }
            DeltaOperation::Remove(card_id) => entries.retain(|e| &e.card.id != card_id),
        }
    }
}

/// Delta between two saved versions of a deck.
pub fn delta_between_versions(deck: &Deck, from: u32, to: u32) -> Result<DeckDelta> {
    let version = |number: u32| {
        deck.version(number)
            .ok_or_else(|| Error::NotFound(format!("version {} of deck '{}'", number, deck.id)))
    };
    let base = version(from)?;
    let target = version(to)?;
    Ok(create_delta(&base.entries, &target.entries, from, to))
}

/// Saves the delta as JSON and as a gzip copy next to it.
pub fn save_delta(path: impl AsRef<Path>, delta: &DeckDelta) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), delta)?;

    let mut compressed_name = path.as_os_str().to_owned();
    compressed_name.push(".gz");
    let mut encoder = GzEncoder::new(File::create(compressed_name)?, Compression::best());
    serde_json::to_writer(&mut encoder, delta)?;
    encoder.finish()?;
    Ok(())
}

pub fn load_delta(path: impl AsRef<Path>) -> Result<DeckDelta> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::{entry, simple};

    fn v1() -> Vec<DeckEntry> {
        vec![
            entry(simple("a", "Unit", 2, "Red"), 4),
            entry(simple("b", "Unit", 3, "Red"), 2),
            entry(simple("c", "Pilot", 1, "Red"), 3),
        ]
    }

    fn v2() -> Vec<DeckEntry> {
        vec![
            entry(simple("a", "Unit", 2, "Red"), 4),
            entry(simple("b", "Unit", 3, "Red"), 4),
            entry(simple("d", "Base", 2, "Red"), 1),
        ]
    }

    #[test]
    fn delta_lists_adds_modifies_and_removes() {
        let delta = create_delta(&v1(), &v2(), 1, 2);
        assert_eq!(delta.statistics.cards_added, 1);
        assert_eq!(delta.statistics.cards_modified, 1);
        assert_eq!(delta.statistics.cards_removed, 1);
        assert_eq!(delta.statistics.total_operations, 3);
        assert_eq!(
            delta.operations[0],
            DeltaOperation::Modify { card_id: "b".to_string(), from: 2, to: 4 }
        );
        assert_eq!(delta.operations[2], DeltaOperation::Remove("c".to_string()));
    }

    #[test]
    fn applying_a_delta_reaches_the_target() {
        let mut entries = v1();
        apply_delta(&mut entries, &create_delta(&v1(), &v2(), 1, 2));
        entries.sort_by(|x, y| x.card.id.cmp(&y.card.id));
        assert_eq!(entries, v2());
    }

    #[test]
    fn identical_lists_produce_an_empty_delta() {
        assert!(create_delta(&v1(), &v1(), 1, 1).is_empty());
    }

    #[test]
    fn versions_of_a_deck_can_be_diffed() {
        let mut deck = Deck::new("d", "History", "ray").with_entries(v1());
        deck.snapshot_version(None);
        deck.entries = v2();
        deck.snapshot_version(None);

        let delta = delta_between_versions(&deck, 1, 2).unwrap();
        assert_eq!(delta.statistics.total_operations, 3);
        match delta_between_versions(&deck, 1, 5) {
            Err(Error::NotFound(what)) => assert_eq!(what, "version 5 of deck 'd'"),
            other => panic!("expected a missing version, got {:?}", other),
        }
    }

    #[test]
    fn saved_delta_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delta_1_2.json");
        let delta = create_delta(&v1(), &v2(), 1, 2);
        save_delta(&path, &delta).unwrap();
        assert!(dir.path().join("delta_1_2.json.gz").exists());
        assert_eq!(load_delta(&path).unwrap(), delta);
    }
}
