// Card catalog: every known card keyed by id, with lookup tables for the
// facet pickers and a filtered view for the library browser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Distinct facet values seen in the catalog, with card counts.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LookupTables {
    pub card_types: BTreeMap<String, u32>,
    pub rarities: BTreeMap<String, u32>,
    pub sets: BTreeMap<String, u32>,
    pub colors: BTreeMap<String, u32>,
}

impl LookupTables {
    fn record(&mut self, card: &Card) {
        if let Some(card_type) = &card.card_type {
            *self.card_types.entry(card_type.clone()).or_insert(0) += 1;
        }
        if let Some(rarity) = &card.rarity {
            *self.rarities.entry(rarity.clone()).or_insert(0) += 1;
        }
        if let Some(set) = &card.set {
            *self.sets.entry(set.clone()).or_insert(0) += 1;
        }
        for color in card.colors() {
            *self.colors.entry(color.clone()).or_insert(0) += 1;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub color: Option<String>,
    pub card_type: Option<String>,
    pub rarity: Option<String>,
    pub cost: Option<u32>,
    pub set: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, card: &Card) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = card.name.to_lowercase().contains(&needle)
                || card.id.to_lowercase().contains(&needle)
                || card.effects.iter().any(|e| e.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(color) = &self.color {
            if !card.has_color(color) {
                return false;
            }
        }
        if let Some(card_type) = &self.card_type {
            if !card.is_type(card_type) {
                return false;
            }
        }
        if let Some(rarity) = &self.rarity {
            if card.rarity.as_ref() != Some(rarity) {
                return false;
            }
        }
        if let Some(cost) = self.cost {
            if card.cost() != Some(f64::from(cost)) {
                return false;
            }
        }
        if let Some(set) = &self.set {
            if card.set.as_ref() != Some(set) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: BTreeMap<String, Card>,
}

impl CardCatalog {
    pub fn new() -> Self {
        CardCatalog::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut catalog = CardCatalog::new();
        for card in cards {
            catalog.insert(card);
        }
        catalog
    }

    /// Inserts a card. A later card with the same id replaces the earlier one.
    pub fn insert(&mut self, card: Card) -> Option<Card> {
        self.cards.insert(card.id.clone(), card)
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&Card> {
        self.cards.values().filter(|card| filter.matches(card)).collect()
    }

    pub fn lookup_tables(&self) -> LookupTables {
        let mut tables = LookupTables::default();
        for card in self.cards.values() {
            tables.record(card);
        }
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::simple;

    fn catalog() -> CardCatalog {
        let mut strike = simple("ST01-001", "Unit", 3, "Blue");
        strike.name = "Strike Gundam".to_string();
        strike.effects = vec!["Repair 1".to_string()];
        let mut zaku = simple("ST03-004", "Unit", 2, "Red");
        zaku.name = "Zaku II".to_string();
        zaku.set = Some("ST03".to_string());
        zaku.rarity = Some("R".to_string());
        let mut kira = simple("ST01-010", "Pilot", 1, "Blue");
        kira.name = "Kira Yamato".to_string();
        CardCatalog::from_cards(vec![strike, zaku, kira])
    }

    fn ids(cards: Vec<&Card>) -> Vec<&str> {
        cards.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_id_order() {
        let catalog = catalog();
        assert_eq!(
            ids(catalog.filter(&CatalogFilter::default())),
            vec!["ST01-001", "ST01-010", "ST03-004"]
        );
    }

    #[test]
    fn search_is_case_insensitive_over_name_id_and_effects() {
        let catalog = catalog();
        let by_name = CatalogFilter { search: Some("zaku".to_string()), ..Default::default() };
        assert_eq!(ids(catalog.filter(&by_name)), vec!["ST03-004"]);

        let by_effect = CatalogFilter { search: Some("REPAIR".to_string()), ..Default::default() };
        assert_eq!(ids(catalog.filter(&by_effect)), vec!["ST01-001"]);

        let by_id = CatalogFilter { search: Some("st01".to_string()), ..Default::default() };
        assert_eq!(catalog.filter(&by_id).len(), 2);
    }

    #[test]
    fn facets_combine() {
        let catalog = catalog();
        let filter = CatalogFilter {
            color: Some("Blue".to_string()),
            card_type: Some("Unit".to_string()),
            cost: Some(3),
            ..Default::default()
        };
        assert_eq!(ids(catalog.filter(&filter)), vec!["ST01-001"]);

        let filter = CatalogFilter {
            rarity: Some("R".to_string()),
            set: Some("ST03".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(catalog.filter(&filter)), vec!["ST03-004"]);
    }

    #[test]
    fn insert_replaces_same_id_and_tables_count() {
        let mut catalog = catalog();
        let replaced = catalog.insert(simple("ST01-010", "Pilot", 1, "White"));
        assert!(replaced.is_some());
        assert_eq!(catalog.len(), 3);

        let tables = catalog.lookup_tables();
        assert_eq!(tables.card_types["Unit"], 2);
        assert_eq!(tables.colors["White"], 1);
        assert_eq!(tables.colors["Blue"], 1);
        assert_eq!(tables.sets["ST01"], 2);
    }
}
