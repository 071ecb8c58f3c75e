// Deck comparison simulator. The deck builder presents this as an AI
// matchup analysis, but the result is a bounded random draw wrapped in
// templated commentary; nothing here looks at the cards. It runs
// asynchronously behind a simulated latency so callers treat it like a
// remote call, and observers can watch the analyzing state.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::deck::Deck;

pub const MIN_WIN_PROBABILITY: u32 = 40;
pub const MAX_WIN_PROBABILITY: u32 = 70;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Analyzing,
    Complete,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub deck_a: String,
    pub deck_b: String,
    pub win_probability: u32,
    pub predicted_wins: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    /// Always true: the numbers are drawn, not inferred.
    pub simulated: bool,
}

pub struct DeckComparator {
    simulated_latency: Duration,
    state: watch::Sender<AnalysisState>,
}

impl DeckComparator {
    pub fn new(simulated_latency: Duration) -> Self {
        let (state, _) = watch::channel(AnalysisState::Idle);
        DeckComparator {
            simulated_latency,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AnalysisState {
        *self.state.borrow()
    }

    pub async fn compare(&self, deck_a: &Deck, deck_b: &Deck) -> ComparisonReport {
        // ThreadRng is not Send, so draw before yielding.
        let win_probability = rand::thread_rng().gen_range(MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY);
        self.run(deck_a, deck_b, win_probability).await
    }

    pub async fn compare_with_rng<R: Rng>(&self, deck_a: &Deck, deck_b: &Deck, rng: &mut R) -> ComparisonReport {
        let win_probability = rng.gen_range(MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY);
        self.run(deck_a, deck_b, win_probability).await
    }

    async fn run(&self, deck_a: &Deck, deck_b: &Deck, win_probability: u32) -> ComparisonReport {
        self.state.send_replace(AnalysisState::Analyzing);
        log::info!(
            "Comparing '{}' against '{}' (simulated latency {:?})",
            deck_a.name,
            deck_b.name,
            self.simulated_latency
        );
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
        let report = build_report(&deck_a.name, &deck_b.name, win_probability);
        self.state.send_replace(AnalysisState::Complete);
        report
    }
}

pub fn predicted_wins(win_probability: u32) -> u32 {
    (f64::from(win_probability) / 10.0).round() as u32
}

fn build_report(name_a: &str, name_b: &str, win_probability: u32) -> ComparisonReport {
    ComparisonReport {
        deck_a: name_a.to_string(),
        deck_b: name_b.to_string(),
        win_probability,
        predicted_wins: predicted_wins(win_probability),
        strengths: vec![
            format!("{} applies early pressure that {} struggles to answer", name_a, name_b),
            format!("{} has the more consistent resource curve", name_a),
            format!("{} converts board advantage into damage efficiently", name_a),
        ],
        weaknesses: vec![
            format!("{} can stall out against {}'s late game", name_a, name_b),
            format!("{} is vulnerable to {}'s removal commands", name_a, name_b),
        ],
        recommendations: vec![
            format!("Mulligan aggressively for early units against {}", name_b),
            format!("Hold a command for {}'s key pilot pairing", name_b),
            "Track shield counts and commit to lethal turns early".to_string(),
        ],
        simulated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn predicted_wins_rounds_half_up() {
        assert_eq!(predicted_wins(40), 4);
        assert_eq!(predicted_wins(44), 4);
        assert_eq!(predicted_wins(45), 5);
        assert_eq!(predicted_wins(70), 7);
    }

    #[tokio::test]
    async fn comparison_is_bounded_and_consistent() {
        let comparator = DeckComparator::new(Duration::ZERO);
        let a = Deck::new("a", "Wing Zero", "heero");
        let b = Deck::new("b", "Epyon", "zechs");
        for _ in 0..50 {
            let report = comparator.compare(&a, &b).await;
            assert!((MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY).contains(&report.win_probability));
            assert_eq!(report.predicted_wins, predicted_wins(report.win_probability));
            assert!(report.simulated);
        }
        assert_eq!(comparator.state(), AnalysisState::Complete);
    }

    #[tokio::test]
    async fn seeded_rng_is_reproducible() {
        let comparator = DeckComparator::new(Duration::ZERO);
        let a = Deck::new("a", "Alpha", "x");
        let b = Deck::new("b", "Beta", "y");
        let first = comparator.compare_with_rng(&a, &b, &mut StdRng::seed_from_u64(7)).await;
        let second = comparator.compare_with_rng(&a, &b, &mut StdRng::seed_from_u64(7)).await;
        assert_eq!(first, second);
        assert!(first.strengths.iter().any(|s| s.contains("Alpha")));
        assert!(first.recommendations.iter().any(|s| s.contains("Beta")));
    }

    #[tokio::test(start_paused = true)]
    async fn observers_see_analyzing_until_resolved() {
        let comparator = DeckComparator::new(Duration::from_millis(1500));
        let mut state = comparator.subscribe();
        assert_eq!(*state.borrow(), AnalysisState::Idle);

        let a = Deck::new("a", "Alpha", "x");
        let b = Deck::new("b", "Beta", "y");
        let analysis = comparator.compare(&a, &b);
        tokio::pin!(analysis);

        tokio::select! {
            _ = &mut analysis => panic!("resolved before the simulated latency"),
            changed = state.changed() => changed.unwrap(),
        }
        assert_eq!(*state.borrow_and_update(), AnalysisState::Analyzing);

        let report = analysis.await;
        assert_eq!(*state.borrow_and_update(), AnalysisState::Complete);
        assert_eq!(report.deck_b, "Beta");
    }
}
