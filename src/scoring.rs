// Heuristic deck scorer. Every threshold below is a fixed business rule
// from the deck builder's analysis panel; none of them are tunable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deck::{deck_colors, DeckEntry};
use crate::stats::detailed_stats;

const BASE_SCORE: f64 = 5.0;
const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    #[serde(rename = "Aggro")]
    Aggro,
    #[serde(rename = "Control")]
    Control,
    #[serde(rename = "Combo/Midrange")]
    ComboMidrange,
    #[serde(rename = "Iron-Blooded Aggro")]
    IronBloodedAggro,
    #[serde(rename = "Midrange")]
    Midrange,
}

impl Archetype {
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Aggro => "Aggro",
            Archetype::Control => "Control",
            Archetype::ComboMidrange => "Combo/Midrange",
            Archetype::IronBloodedAggro => "Iron-Blooded Aggro",
            Archetype::Midrange => "Midrange",
        }
    }

    /// Static win odds against the three reference archetypes.
    pub fn matchups(&self) -> [(&'static str, u8); 3] {
        match self {
            Archetype::Aggro => [("Control", 60), ("Midrange", 50), ("Aggro", 45)],
            Archetype::Control => [("Control", 50), ("Midrange", 55), ("Aggro", 60)],
            Archetype::ComboMidrange => [("Control", 55), ("Midrange", 50), ("Aggro", 45)],
            Archetype::IronBloodedAggro => [("Control", 60), ("Midrange", 55), ("Aggro", 50)],
            Archetype::Midrange => [("Control", 45), ("Midrange", 50), ("Aggro", 55)],
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
}

/// The numbers the scorer reasons about, pulled out of the composition.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckProfile {
    pub total_cards: u32,
    pub units: u32,
    pub pilots: u32,
    pub commands: u32,
    pub bases: u32,
    pub low_cost_units: u32,
    pub average_cost: f64,
    pub colors: Vec<String>,
}

impl DeckProfile {
    pub fn from_entries(entries: &[DeckEntry]) -> Self {
        let detailed = detailed_stats(entries);
        let stats = &detailed.composition;
        DeckProfile {
            total_cards: stats.total_cards,
            units: stats.count_of_type("Unit"),
            pilots: stats.count_of_type("Pilot"),
            commands: stats.count_of_type("Command"),
            bases: stats.count_of_type("Base"),
            low_cost_units: detailed.low_cost_units,
            average_cost: detailed.reported_average_cost,
            colors: deck_colors(entries),
        }
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub score: f64,
    pub archetype: Archetype,
    pub confidence: Confidence,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub matchups: BTreeMap<String, u8>,
}

/// Composition score before archetype inference, clamped to [1, 10].
pub fn composition_score(profile: &DeckProfile) -> f64 {
    let mut score = BASE_SCORE;

    score += match profile.units {
        25..=28 => 1.0,
        22..=31 => 0.5,
        _ => -0.5,
    };
    score += match profile.pilots {
        6..=8 => 0.5,
        4..=10 => 0.2,
        _ => 0.0,
    };
    score += match profile.commands {
        8..=10 => 0.5,
        6..=12 => 0.2,
        _ => 0.0,
    };
    score += match profile.bases {
        4..=6 => 0.5,
        2..=8 => 0.2,
        _ => 0.0,
    };
    score += match profile.low_cost_units {
        16..=20 => 1.0,
        12..=24 => 0.5,
        0..=9 => -1.0,
        _ => 0.0,
    };
    score += match profile.colors.len() {
        2 => 0.5,
        1 => 0.2,
        0 => 0.0,
        _ => -1.0,
    };

    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// First matching rule wins.
pub fn infer_archetype(profile: &DeckProfile) -> (Archetype, Confidence) {
    let red = profile.has_color("Red");
    let green = profile.has_color("Green");
    let blue = profile.has_color("Blue");
    let white = profile.has_color("White");
    let purple = profile.has_color("Purple");

    if profile.average_cost <= 2.5 && (red || green) {
        (Archetype::Aggro, Confidence::High)
    } else if (blue && white) || (profile.bases >= 4 && profile.average_cost >= 3.5) {
        (Archetype::Control, Confidence::High)
    } else if (blue && green) || (profile.colors.len() == 2 && profile.average_cost >= 3.0) {
        (Archetype::ComboMidrange, Confidence::Medium)
    } else if (purple && red) || (purple && green) {
        (Archetype::IronBloodedAggro, Confidence::High)
    } else {
        (Archetype::Midrange, Confidence::Medium)
    }
}

#[derive(Clone, Copy)]
enum Section {
    Strength,
    Weakness,
    Suggestion,
}

struct Rule {
    section: Section,
    applies: fn(&DeckProfile, Archetype) -> bool,
    text: &'static str,
}

// Evaluated in table order; every rule is independent.
const RULES: &[Rule] = &[
    Rule {
        section: Section::Strength,
        applies: |p, _| (25..=28).contains(&p.units),
        text: "Unit count is in the ideal range for steady board presence",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| p.low_cost_units >= 16,
        text: "Plenty of low-cost units for a strong early game",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| p.colors.len() == 2,
        text: "Focused two-color build with consistent resources",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| (6..=8).contains(&p.pilots),
        text: "Good pilot density for pairing with units",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| (8..=10).contains(&p.commands),
        text: "Healthy number of commands for interaction",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| (4..=6).contains(&p.bases),
        text: "Solid base count to protect your shields",
    },
    Rule {
        section: Section::Strength,
        applies: |p, _| p.total_cards == 50,
        text: "Deck is exactly tournament size",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.units < 22,
        text: "Too few units to hold the board",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.units > 31,
        text: "Unit-heavy list leaves little room for answers",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.pilots < 6,
        text: "Pilot count below 6 limits pairing options",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.commands < 6,
        text: "Few commands means little interaction with the opponent",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.bases < 2,
        text: "Lack of bases leaves your shields exposed",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.colors.len() > 2,
        text: "Too many colors for consistent resource usage",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.average_cost > 3.5,
        text: "High average cost makes slow starts likely",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, _| p.low_cost_units < 10,
        text: "Weak early curve with few units costing 3 or less",
    },
    Rule {
        section: Section::Weakness,
        applies: |p, a| a == Archetype::Aggro && p.average_cost > 2.2,
        text: "Average cost is too high for an Aggro archetype",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.total_cards < 50,
        text: "Add more cards to reach the 50-card deck size",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.total_cards > 50,
        text: "Cut cards down to the 50-card deck size",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.pilots < 6,
        text: "Add pilots to strengthen your unit pairings",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.low_cost_units < 12,
        text: "Include more units costing 3 or less",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.colors.len() > 2,
        text: "Trim the deck down to one or two colors",
    },
    Rule {
        section: Section::Suggestion,
        applies: |p, _| p.bases < 4,
        text: "Consider more bases for defensive value",
    },
];

pub fn score(entries: &[DeckEntry]) -> ScoreReport {
    score_profile(&DeckProfile::from_entries(entries))
}

pub fn score_profile(profile: &DeckProfile) -> ScoreReport {
    let score = composition_score(profile);
    let (archetype, confidence) = infer_archetype(profile);

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut suggestions = Vec::new();
    for rule in RULES {
        if !(rule.applies)(profile, archetype) {
            continue;
        }
        log::debug!("analysis rule fired: {}", rule.text);
        let list = match rule.section {
            Section::Strength => &mut strengths,
            Section::Weakness => &mut weaknesses,
            Section::Suggestion => &mut suggestions,
        };
        list.push(rule.text.to_string());
    }

    ScoreReport {
        score: (score * 10.0).round() / 10.0,
        archetype,
        confidence,
        strengths,
        weaknesses,
        suggestions,
        matchups: archetype
            .matchups()
            .iter()
            .map(|(label, odds)| (label.to_string(), *odds))
            .collect(),
    }
}
