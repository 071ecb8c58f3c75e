// Runtime configuration. Defaults are enough to run the whole pipeline;
// a JSON file can override any section.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    pub base_url: String,
    pub queries: Vec<String>,
    pub user_agent: String,
    pub request_delay_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            base_url: "https://api.deckwright.gg/cards?itemsPerPage=36".to_string(),
            queries: vec![
                "&type[]=Unit".to_string(),
                "&type[]=Pilot".to_string(),
                "&type[]=Command".to_string(),
                "&type[]=Base".to_string(),
            ],
            user_agent: "DeckwrightCatalog/0.1-Rust (for personal project)".to_string(),
            request_delay_ms: 1000,
        }
    }
}

impl HarvestConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn query_urls(&self) -> Vec<String> {
        self.queries
            .iter()
            .map(|q| format!("{}{}", self.base_url, q))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub raw_catalog: String,
    pub catalog_snapshot: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            raw_catalog: "deckwright_raw_cards.json".to_string(),
            catalog_snapshot: "deckwright_catalog.json".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub comparison_latency_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            comparison_latency_ms: 1500,
        }
    }
}

impl AnalysisConfig {
    pub fn comparison_latency(&self) -> Duration {
        Duration::from_millis(self.comparison_latency_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let file = File::open(path.as_ref())?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "analysis": {{ "comparison_latency_ms": 0 }} }}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analysis.comparison_latency(), Duration::ZERO);
        assert_eq!(config.harvest, HarvestConfig::default());
        assert_eq!(config.output.raw_catalog, "deckwright_raw_cards.json");
    }

    #[test]
    fn query_urls_append_fragments() {
        let harvest = HarvestConfig {
            base_url: "https://example.test/cards?page=1".to_string(),
            queries: vec!["&set=ST01".to_string()],
            ..HarvestConfig::default()
        };
        assert_eq!(harvest.query_urls(), vec!["https://example.test/cards?page=1&set=ST01"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
