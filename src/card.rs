// Card model. Two overlapping card schemas reach us from the backend: a
// simple one with a numeric cost and a color list, and a richer TCG one with
// string AP/BP values and an affinity. The schema is decided once, at
// ingestion, and carried as a closed tag on the card.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder the backend uses for "not applicable" on stat fields.
pub const SENTINEL: &str = "-";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CardProfile {
    Simple {
        cost: Option<u32>,
        colors: Vec<String>,
        ap: Option<i64>,
        bp: Option<i64>,
        hp: Option<i64>,
        level: Option<i64>,
    },
    Rich {
        tcg_id: String,
        ap: String,
        bp: String,
        affinity: Option<String>,
        cost: Option<String>,
        colors: Vec<String>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub card_type: Option<String>,
    pub rarity: Option<String>,
    pub set: Option<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    pub image: Option<String>,
    pub market_price: Option<f64>,
    pub profile: CardProfile,
}

/// Parses a stat string the way the deck builder always has: sentinels,
/// blanks and garbage are absent, decimals are truncated.
pub fn parse_lenient(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == SENTINEL {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate_float))
}

// Values outside the i64 range are garbage, not a saturated stat.
fn truncate_float(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() || s == SENTINEL {
        None
    } else {
        Some(s)
    }
}

impl Card {
    /// Ingests one backend card object. Returns `None` when the object has
    /// no usable identifier.
    pub fn from_json(value: &Value) -> Option<Card> {
        let get_str = |obj: &Value, key: &str| -> String {
            match obj.get(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        };
        let get_i64 = |obj: &Value, key: &str| -> Option<i64> {
            match obj.get(key) {
                Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_float)),
                Some(Value::String(s)) => parse_lenient(s),
                _ => None,
            }
        };
        let get_list = |obj: &Value, list_key: &str, single_key: &str| -> Vec<String> {
            match obj.get(list_key) {
                Some(Value::Array(items)) => {
                    let mut list: Vec<String> = Vec::new();
                    for item in items.iter().filter_map(|v| v.as_str()).map(str::trim) {
                        if !item.is_empty() && item != SENTINEL && !list.iter().any(|s| s == item) {
                            list.push(item.to_string());
                        }
                    }
                    list
                }
                _ => non_empty(get_str(obj, single_key)).into_iter().collect(),
            }
        };
        let first_of = |obj: &Value, keys: &[&str]| -> Option<String> {
            keys.iter().find_map(|key| non_empty(get_str(obj, *key)))
        };

        let tcg_id = non_empty(get_str(value, "tcgId"));
        let id = first_of(value, &["id", "code", "tcgId"])?;

        let effects = match value.get("effects").or_else(|| value.get("effect")).or_else(|| value.get("ability")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        };

        let colors = get_list(value, "colors", "color");
        let is_rich = tcg_id.is_some()
            || value.get("affinity").is_some_and(|v| !v.is_null())
            || matches!(value.get("ap"), Some(Value::String(_)))
            || matches!(value.get("bp"), Some(Value::String(_)));

        let profile = if is_rich {
            CardProfile::Rich {
                tcg_id: tcg_id.unwrap_or_else(|| id.clone()),
                ap: get_str(value, "ap"),
                bp: get_str(value, "bp"),
                affinity: non_empty(get_str(value, "affinity")),
                cost: non_empty(get_str(value, "cost")),
                colors,
            }
        } else {
            CardProfile::Simple {
                cost: get_i64(value, "cost").and_then(|c| u32::try_from(c).ok()),
                colors,
                ap: get_i64(value, "ap"),
                bp: get_i64(value, "bp").or_else(|| get_i64(value, "power")),
                hp: get_i64(value, "hp"),
                level: get_i64(value, "level"),
            }
        };

        Some(Card {
            name: first_of(value, &["name"]).unwrap_or_else(|| id.clone()),
            card_type: first_of(value, &["type", "cardType", "category"]),
            rarity: first_of(value, &["rarity"]),
            set: first_of(value, &["set", "cardSet"]),
            effects,
            image: first_of(value, &["image", "imageUrl", "imagePath"]),
            market_price: value
                .get("marketPrice")
                .or_else(|| value.get("price"))
                .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))),
            id,
            profile,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self.profile {
            CardProfile::Simple { .. } => "simple",
            CardProfile::Rich { .. } => "rich",
        }
    }

    pub fn cost(&self) -> Option<f64> {
        match &self.profile {
            CardProfile::Simple { cost, .. } => cost.map(f64::from),
            CardProfile::Rich { cost, .. } => cost.as_deref().and_then(parse_lenient).map(|c| c as f64),
        }
    }

    pub fn colors(&self) -> &[String] {
        match &self.profile {
            CardProfile::Simple { colors, .. } | CardProfile::Rich { colors, .. } => colors,
        }
    }

    pub fn ap(&self) -> Option<i64> {
        match &self.profile {
            CardProfile::Simple { ap, .. } => *ap,
            CardProfile::Rich { ap, .. } => parse_lenient(ap),
        }
    }

    pub fn bp(&self) -> Option<i64> {
        match &self.profile {
            CardProfile::Simple { bp, .. } => *bp,
            CardProfile::Rich { bp, .. } => parse_lenient(bp),
        }
    }

    pub fn affinity(&self) -> Option<&str> {
        match &self.profile {
            CardProfile::Rich { affinity, .. } => affinity.as_deref(),
            CardProfile::Simple { .. } => None,
        }
    }

    pub fn is_type(&self, card_type: &str) -> bool {
        self.card_type.as_deref() == Some(card_type)
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors().iter().any(|c| c == color)
    }
}
