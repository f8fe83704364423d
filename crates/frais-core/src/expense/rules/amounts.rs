//! Labeled amount extraction for expense pages.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use regex::{Captures, Regex};

use super::patterns::{build_amount_pattern, LABELED_AMOUNT};
use super::FieldExtractor;
use crate::error::{FraisError, Result};

/// An amount found next to a known label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountMatch {
    /// Parsed amount.
    pub amount: Decimal,
    /// Label that preceded the amount.
    pub label: String,
    /// Matched source text (label and number).
    pub source: String,
    /// Byte range of the match in the page text.
    pub position: (usize, usize),
}

/// Finds the first labeled amount on a page.
#[derive(Debug, Clone)]
pub struct AmountMatcher {
    pattern: Regex,
}

impl AmountMatcher {
    /// Matcher over the built-in label list.
    pub fn new() -> Self {
        Self {
            pattern: LABELED_AMOUNT.clone(),
        }
    }

    /// Matcher over a custom label list, in alternation order.
    pub fn with_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        if labels.iter().all(|l| l.as_ref().trim().is_empty()) {
            return Err(FraisError::Config("amount label list is empty".to_string()));
        }
        let pattern = build_amount_pattern(labels)
            .map_err(|e| FraisError::Config(format!("invalid amount labels: {}", e)))?;
        Ok(Self { pattern })
    }

    fn to_match(text: &str, caps: &Captures<'_>) -> Option<AmountMatch> {
        let label = caps.get(1)?;
        let token = caps.get(2)?;
        // A token the grammar accepts but Decimal rejects is treated as no match.
        let amount = parse_amount(token.as_str())?;
        Some(AmountMatch {
            amount,
            label: label.as_str().to_string(),
            source: text[label.start()..token.end()].to_string(),
            position: (label.start(), token.end()),
        })
    }
}

impl Default for AmountMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountMatcher {
    type Output = AmountMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.pattern.captures(text)?;
        Self::to_match(text, &caps)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| Self::to_match(text, &caps))
            .collect()
    }
}

/// Parse an amount token such as "1 234,56", "1,234.56" or "10.00".
///
/// The last comma or dot is the decimal separator when 1-2 digits follow it;
/// every other separator is a thousands separator.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let digits = |part: &str| -> String { part.chars().filter(char::is_ascii_digit).collect() };

    let normalized = match cleaned.rfind([',', '.']) {
        Some(pos) if (1..=2).contains(&(cleaned.len() - pos - 1)) => {
            format!("{}.{}", digits(&cleaned[..pos]), &cleaned[pos + 1..])
        }
        _ => digits(&cleaned),
    };

    if normalized.is_empty() || normalized.starts_with('.') {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

/// Format an amount for display: currency symbol, comma thousands
/// separators and two decimals (e.g. "€1,234.56").
pub fn format_amount(amount: Decimal, currency_symbol: &str) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let (integer_part, decimal_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}{}.{}", sign, currency_symbol, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12.345,6"), Some(dec("12345.6")));
        assert_eq!(parse_amount("1.234"), Some(dec("1234")));
        assert_eq!(parse_amount("42"), Some(dec("42")));
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_amount_overflow_is_no_match() {
        assert_eq!(parse_amount("99999999999999999999999999999999999"), None);
    }

    #[test]
    fn test_comma_decimal_after_total() {
        let matcher = AmountMatcher::new();
        let found = matcher.extract("Total: 1234,56").unwrap();
        assert_eq!(found.amount, dec("1234.56"));
        assert_eq!(found.label, "Total");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let matcher = AmountMatcher::new();
        let text = "Prix 12,00\nMontant TTC 14,40\nTotal 14,40";
        let found = matcher.extract(text).unwrap();
        assert_eq!(found.label, "Prix");
        assert_eq!(found.amount, dec("12.00"));
    }

    #[test]
    fn test_longer_label_preferred_at_same_position() {
        let matcher = AmountMatcher::new();
        let found = matcher.extract("Prix TTC : 8,90 EUR").unwrap();
        assert_eq!(found.label, "Prix TTC");
        assert_eq!(found.amount, dec("8.90"));

        let found = matcher.extract("Total voyageur 45.00").unwrap();
        assert_eq!(found.label, "Total voyageur");
    }

    #[test]
    fn test_label_without_number_is_skipped() {
        let matcher = AmountMatcher::new();
        let text = "Total HT\nNET A PAYER TTC 120.00";
        let found = matcher.extract(text).unwrap();
        assert_eq!(found.label, "NET A PAYER TTC");
        assert_eq!(found.amount, dec("120.00"));
    }

    #[test]
    fn test_thousands_separators() {
        let matcher = AmountMatcher::new();
        assert_eq!(
            matcher.extract("Montant TTC 1 250,75").unwrap().amount,
            dec("1250.75")
        );
        assert_eq!(
            matcher.extract("Total 2,480.10").unwrap().amount,
            dec("2480.10")
        );
    }

    #[test]
    fn test_grouped_amount_followed_by_currency() {
        let matcher = AmountMatcher::new();
        assert_eq!(matcher.extract("Total 1 234EUR").unwrap().amount, dec("1234"));
        assert_eq!(matcher.extract("Total 1.234EUR").unwrap().amount, dec("1234"));
        assert_eq!(matcher.extract("Total 1234EUR").unwrap().amount, dec("1234"));
        assert_eq!(matcher.extract("Total 1 234,50€").unwrap().amount, dec("1234.50"));

        let found = matcher.extract("Prix 2 480€ TTC").unwrap();
        assert_eq!(found.amount, dec("2480"));
        assert_eq!(found.source, "Prix 2 480");
        assert_eq!(found.position, (0, 10));
    }

    #[test]
    fn test_year_is_not_grouped() {
        let matcher = AmountMatcher::new();
        assert_eq!(matcher.extract("Total 10 2024").unwrap().amount, dec("10"));
    }

    #[test]
    fn test_no_match() {
        let matcher = AmountMatcher::new();
        assert!(matcher.extract("").is_none());
        assert!(matcher.extract("Merci de votre visite").is_none());
        assert!(matcher.extract("total 12,00").is_none());
    }

    #[test]
    fn test_custom_labels() {
        let matcher = AmountMatcher::with_labels(&["Betrag"]).unwrap();
        assert_eq!(matcher.extract("Betrag: 7,20").unwrap().amount, dec("7.20"));
        assert!(matcher.extract("Total 7,20").is_none());

        assert!(AmountMatcher::with_labels::<&str>(&[]).is_err());
        assert!(AmountMatcher::with_labels(&["  "]).is_err());
    }

    #[test]
    fn test_extract_all() {
        let matcher = AmountMatcher::new();
        let all = matcher.extract_all("Prix 3,00 puis Total 5,00");
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].amount, dec("5.00"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56"), "€"), "€1,234.56");
        assert_eq!(format_amount(dec("10"), "€"), "€10.00");
        assert_eq!(format_amount(dec("1234567.891"), "$"), "$1,234,567.89");
        assert_eq!(format_amount(dec("0.5"), "€"), "€0.50");
        assert_eq!(format_amount(dec("-42.1"), "€"), "-€42.10");
    }
}
