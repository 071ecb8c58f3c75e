// Application state container. All deck builder state lives in one
// snapshot type, changes go through a pure reducer, and persistence is a
// port the store calls after each change.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::catalog::CatalogFilter;
use crate::deck::{deck_colors, Deck, DeckEntry};
use crate::error::Result;
use crate::legality::MAX_COLORS;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StoreState {
    pub decks: BTreeMap<String, Deck>,
    /// Owned copies per card id.
    pub collection: BTreeMap<String, u32>,
    pub wishlist: BTreeSet<String>,
    pub liked_decks: BTreeSet<String>,
    pub filter: CatalogFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateDeck { id: String, name: String, author: String },
    DeleteDeck { id: String },
    RenameDeck { id: String, name: String },
    UpdateDetails { id: String, description: String, tags: Vec<String>, is_public: bool },
    SetCardQuantity { deck_id: String, card: Card, quantity: u8 },
    RecordGame { deck_id: String, opponent: String, won: bool, notes: Option<String> },
    SaveVersion { deck_id: String, note: Option<String> },
    SetCollectionCount { card_id: String, count: u32 },
    ToggleWishlist { card_id: String },
    ToggleLike { deck_id: String },
    SetFilter(CatalogFilter),
}

// Would adding this card push the deck past the builder's color cap?
fn exceeds_color_cap(entries: &[DeckEntry], card: &Card) -> bool {
    let mut colors = deck_colors(entries);
    for color in card.colors() {
        if !colors.contains(color) {
            colors.push(color.clone());
        }
    }
    colors.len() > MAX_COLORS
}

fn with_deck(mut state: StoreState, id: &str, update: impl FnOnce(&mut Deck)) -> StoreState {
    match state.decks.get_mut(id) {
        Some(deck) => update(deck),
        None => log::warn!("Ignoring action for unknown deck '{}'", id),
    }
    state
}

/// Pure transition: the result depends only on the arguments, with `now`
/// stamped on anything the action creates or changes. Rejected actions
/// return the state unchanged.
pub fn reduce(state: StoreState, action: &Action, now: DateTime<Utc>) -> StoreState {
    let mut state = state;
    match action {
        Action::CreateDeck { id, name, author } => {
            if state.decks.contains_key(id) {
                log::warn!("Deck '{}' already exists", id);
            } else {
                state.decks.insert(id.clone(), Deck::created_at(id, name, author, now));
            }
            state
        }
        Action::DeleteDeck { id } => {
            state.decks.remove(id);
            state.liked_decks.remove(id);
            state
        }
        Action::RenameDeck { id, name } => with_deck(state, id, |deck| {
            deck.name = name.clone();
            deck.updated_at = now;
        }),
        Action::UpdateDetails { id, description, tags, is_public } => with_deck(state, id, |deck| {
            deck.description = description.clone();
            deck.tags = tags.clone();
            deck.is_public = *is_public;
            deck.updated_at = now;
        }),
        Action::SetCardQuantity { deck_id, card, quantity } => with_deck(state, deck_id, |deck| {
            let adding = *quantity > 0 && !deck.entries.iter().any(|e| e.card.id == card.id);
            if adding && exceeds_color_cap(&deck.entries, card) {
                log::warn!(
                    "Refusing to add '{}' to '{}': deck would exceed {} colors",
                    card.name,
                    deck.name,
                    MAX_COLORS
                );
                return;
            }
            deck.set_quantity_at(card.clone(), *quantity, now);
        }),
        Action::RecordGame { deck_id, opponent, won, notes } => {
            with_deck(state, deck_id, |deck| deck.record_game_at(opponent, *won, notes.clone(), now))
        }
        Action::SaveVersion { deck_id, note } => with_deck(state, deck_id, |deck| {
            deck.snapshot_version_at(note.clone(), now);
        }),
        Action::SetCollectionCount { card_id, count } => {
            if *count == 0 {
                state.collection.remove(card_id);
            } else {
                state.collection.insert(card_id.clone(), *count);
            }
            state
        }
        Action::ToggleWishlist { card_id } => {
            if !state.wishlist.remove(card_id) {
                state.wishlist.insert(card_id.clone());
            }
            state
        }
        Action::ToggleLike { deck_id } => {
            if !state.liked_decks.remove(deck_id) {
                state.liked_decks.insert(deck_id.clone());
            }
            state
        }
        Action::SetFilter(filter) => {
            state.filter = filter.clone();
            state
        }
    }
}

/// Where store snapshots go between sessions.
pub trait Persistence {
    fn load(&self) -> Result<Option<StoreState>>;
    fn save(&mut self, state: &StoreState) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    pub saved: Option<StoreState>,
    pub save_count: usize,
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Option<StoreState>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        self.saved = Some(state.clone());
        self.save_count += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFilePersistence { path: path.into() }
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<StoreState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        // Write to a sibling file first so a crash never leaves half a state.
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        {
            let file = File::create(&tmp_path)?;
            serde_json::to_writer_pretty(BufWriter::new(file), state)?;
        }
        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Store state saved to '{}'", self.path.display());
        Ok(())
    }
}

pub struct Store<P: Persistence> {
    state: StoreState,
    persistence: P,
}

impl<P: Persistence> Store<P> {
    /// Opens the store, starting empty when nothing was persisted yet.
    pub fn open(persistence: P) -> Result<Self> {
        let state = persistence.load()?.unwrap_or_default();
        log::info!("Store opened with {} deck(s)", state.decks.len());
        Ok(Store { state, persistence })
    }

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let next = reduce(self.state.clone(), &action, Utc::now());
        if next != self.state {
            self.persistence.save(&next)?;
            self.state = next;
        }
        Ok(())
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn deck(&self, id: &str) -> Option<&Deck> {
        self.state.decks.get(id)
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}
