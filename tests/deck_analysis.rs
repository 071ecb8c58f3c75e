//! End-to-end checks: ingest backend card objects, build decks, and run the
//! scorer, legality checker and store over them.

use deckwright::harvester::build_catalog;
use deckwright::store::{Action, MemoryPersistence, Store};
use deckwright::{aggregate, check_legality, is_legal, score, Archetype, CardCatalog, Confidence, DeckEntry};
use serde_json::{json, Value};

// Emits `count` copies of one card type in groups of four, all Red.
fn raw_cards(prefix: &str, card_type: &str, count: u32, cost: u32) -> Vec<(Value, u8)> {
    let mut out = Vec::new();
    let mut remaining = count;
    let mut index = 0;
    while remaining > 0 {
        let quantity = remaining.min(4);
        out.push((
            json!({
                "id": format!("{}-{}", prefix, index),
                "name": format!("{} {}", card_type, index),
                "type": card_type,
                "cost": cost,
                "colors": ["Red"],
                "rarity": "C"
            }),
            quantity as u8,
        ));
        remaining -= quantity;
        index += 1;
    }
    out
}

fn build(groups: Vec<Vec<(Value, u8)>>) -> (CardCatalog, Vec<DeckEntry>) {
    let flat: Vec<(Value, u8)> = groups.into_iter().flatten().collect();
    let raw: Vec<Value> = flat.iter().map(|(v, _)| v.clone()).collect();
    let catalog = build_catalog(&raw);
    let entries = flat
        .iter()
        .map(|(v, quantity)| DeckEntry {
            card: catalog.get(v["id"].as_str().unwrap()).unwrap().clone(),
            quantity: *quantity,
        })
        .collect();
    (catalog, entries)
}

#[test]
fn mono_red_aggro_scenario() {
    let (_, entries) = build(vec![
        raw_cards("cheap", "Unit", 18, 1),
        raw_cards("mid", "Unit", 6, 4),
        raw_cards("big", "Unit", 2, 5),
        raw_cards("pilot", "Pilot", 7, 2),
        raw_cards("cmd", "Command", 9, 2),
        raw_cards("base", "Base", 5, 2),
    ]);

    let stats = aggregate(&entries);
    assert_eq!(stats.total_cards, 47);
    assert_eq!(stats.count_of_type("Unit"), 26);
    assert_eq!(stats.average_cost, "2.0");

    let report = score(&entries);
    assert!((report.score - 8.7).abs() < 1e-9);
    assert_eq!(report.archetype, Archetype::Aggro);
    assert_eq!(report.confidence, Confidence::High);
}

#[test]
fn empty_deck_scenario() {
    let stats = aggregate(&[]);
    assert_eq!(stats.total_cards, 0);
    assert_eq!(stats.average_cost, "0.0");

    let checks = check_legality(&[]);
    assert!(!checks[0].passed);
    assert!(checks.iter().skip(1).all(|c| c.passed));

    assert_eq!(score(&[]).score, 3.5);
}

#[test]
fn fifty_card_deck_is_legal_and_size_changes_only_fail_size() {
    let (catalog, mut entries) = build(vec![
        raw_cards("u", "Unit", 26, 2),
        raw_cards("p", "Pilot", 7, 1),
        raw_cards("c", "Command", 12, 2),
        raw_cards("b", "Base", 5, 3),
    ]);
    assert!(is_legal(&entries));

    entries[0].quantity = 3;
    let failing: Vec<String> = check_legality(&entries)
        .into_iter()
        .filter(|c| !c.passed)
        .map(|c| c.rule)
        .collect();
    assert_eq!(failing, vec!["Deck Size".to_string()]);

    entries[0].quantity = 4;
    entries.push(DeckEntry {
        card: catalog.get("b-1").unwrap().clone(),
        quantity: 2,
    });
    let failing: Vec<String> = check_legality(&entries)
        .into_iter()
        .filter(|c| !c.passed)
        .map(|c| c.rule)
        .collect();
    assert_eq!(failing, vec!["Deck Size".to_string()]);
}

#[test]
fn store_built_deck_matches_direct_analysis() {
    let (catalog, entries) = build(vec![raw_cards("u", "Unit", 8, 2), raw_cards("p", "Pilot", 4, 1)]);

    let mut store = Store::open(MemoryPersistence::default()).unwrap();
    store
        .dispatch(Action::CreateDeck {
            id: "d1".to_string(),
            name: "Store Deck".to_string(),
            author: "lockon".to_string(),
        })
        .unwrap();
    for entry in &entries {
        store
            .dispatch(Action::SetCardQuantity {
                deck_id: "d1".to_string(),
                card: catalog.get(&entry.card.id).unwrap().clone(),
                quantity: entry.quantity,
            })
            .unwrap();
    }

    let deck = store.deck("d1").unwrap();
    assert_eq!(deck.total_cards(), 12);
    assert_eq!(score(&deck.entries), score(&entries));
}
