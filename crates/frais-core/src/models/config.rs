//! Configuration structures for the expense pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FraisError, Result};
use crate::expense::rules::patterns::DEFAULT_AMOUNT_LABELS;
use crate::models::record::Category;

/// Main configuration for the frais pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraisConfig {
    /// Amount extraction configuration.
    pub extraction: ExtractionConfig,

    /// Category classification configuration.
    pub classification: ClassificationConfig,

    /// Report rendering configuration.
    pub report: ReportConfig,
}

/// Amount extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Labels preceding a monetary amount, in alternation order.
    pub labels: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            labels: DEFAULT_AMOUNT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Category classification configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Keywords appended to the built-in rule of each category.
    ///
    /// Keys accept the snake_case name or the display label ("Public Transport").
    #[serde(deserialize_with = "deserialize_category_keys")]
    pub extra_keywords: BTreeMap<Category, Vec<String>>,
}

fn deserialize_category_keys<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<Category, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, Vec<String>>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, keywords)| {
            key.parse::<Category>()
                .map(|category| (category, keywords))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

/// Report rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Symbol prefixed to display amounts.
    pub currency_symbol: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
        }
    }
}

impl FraisConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| FraisError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.labels.iter().all(|l| l.trim().is_empty()) {
            return Err(FraisError::Config(
                "extraction.labels must contain at least one label".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "report": { "currency_symbol": "CHF " } }"#;
        let config: FraisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.report.currency_symbol, "CHF ");
        assert_eq!(config.extraction, ExtractionConfig::default());
        assert!(config.classification.extra_keywords.is_empty());
    }

    #[test]
    fn test_extra_keywords_keyed_by_category() {
        let json = r#"{ "classification": { "extra_keywords": { "public_transport": ["rer"] } } }"#;
        let config: FraisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.classification.extra_keywords.get(&Category::PublicTransport),
            Some(&vec!["rer".to_string()])
        );
    }

    #[test]
    fn test_extra_keywords_accept_display_labels() {
        let json = r#"{ "classification": { "extra_keywords": {
            "Public Transport": ["rer"],
            "HOTEL": ["ibis"]
        } } }"#;
        let config: FraisConfig = serde_json::from_str(json).unwrap();

        let keys: Vec<Category> = config.classification.extra_keywords.keys().copied().collect();
        assert_eq!(keys, vec![Category::PublicTransport, Category::Hotel]);

        let bad = r#"{ "classification": { "extra_keywords": { "spaceship": ["x"] } } }"#;
        let err = serde_json::from_str::<FraisConfig>(bad).unwrap_err();
        assert!(err.to_string().contains("unknown category: spaceship"));
    }

    #[test]
    fn test_saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FraisConfig::default();
        config
            .classification
            .extra_keywords
            .insert(Category::PublicTransport, vec!["rer".to_string()]);
        config.save(&path).unwrap();

        assert_eq!(FraisConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_empty_labels_rejected() {
        let mut config = FraisConfig::default();
        config.extraction.labels.clear();
        assert!(config.validate().is_err());
    }
}
