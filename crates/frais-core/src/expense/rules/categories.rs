//! Keyword-based expense category classification.

use std::collections::BTreeMap;

use super::FieldExtractor;
use crate::models::record::Category;

/// Keywords that identify one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    /// Lower-case substrings; any one of them selects the category.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Whether any keyword occurs in already lower-cased text.
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Built-in rule table, highest priority first.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(Category::Taxi, &["g7", "uber", "bolt", "cabify"]),
        CategoryRule::new(
            Category::Train,
            &["train", "voyage", "billet", "sncf", "tgv", "intercités"],
        ),
        CategoryRule::new(
            Category::Plane,
            &["flight", "boarding pass", "vol", "carte d'embarquement", "avion"],
        ),
        CategoryRule::new(
            Category::PublicTransport,
            &[
                "metro",
                "métro",
                "bus",
                "ticket de transport",
                "tram",
                "tramway",
                "navigo",
                "trajets",
            ],
        ),
        CategoryRule::new(Category::Boat, &["boat", "ferry", "ferries", "bateau", "navette"]),
        CategoryRule::new(
            Category::Parking,
            &["paybyphone", "indigo", "parc", "stationnement", "parking", "apark"],
        ),
        CategoryRule::new(
            Category::Toll,
            &["ulys", "vinci", "peage", "toll", "péage", "autoroute"],
        ),
        CategoryRule::new(
            Category::Fuel,
            &["total", "e.leclerc", "carrefour", "auchan", "essence", "fuel"],
        ),
        CategoryRule::new(Category::Hotel, &["hotel"]),
    ]
}

/// Maps page text to the first category whose keywords occur in it.
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    rules: Vec<CategoryRule>,
}

impl DocumentClassifier {
    /// Classifier over the built-in rule table.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Classifier over an explicit rule list, evaluated in order.
    pub fn with_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Append keywords to existing rules without changing their priority.
    ///
    /// Keywords for a category without a rule get a new rule at the end;
    /// keywords for `Unknown` are ignored since it is the fallback.
    pub fn with_extra_keywords(mut self, extra: &BTreeMap<Category, Vec<String>>) -> Self {
        for (category, keywords) in extra {
            if *category == Category::Unknown {
                continue;
            }
            let keywords = keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty());

            match self.rules.iter().position(|r| r.category == *category) {
                Some(index) => self.rules[index].keywords.extend(keywords),
                None => self.rules.push(CategoryRule {
                    category: *category,
                    keywords: keywords.collect(),
                }),
            }
        }
        self
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Classify page text; `Unknown` when no rule matches.
    pub fn classify(&self, text: &str) -> Category {
        self.extract(text).unwrap_or(Category::Unknown)
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DocumentClassifier {
    type Output = Category;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category)
    }

    /// Every matching category, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.matches(&lowered))
            .map(|rule| rule.category)
            .collect()
    }
}
