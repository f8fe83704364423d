//! Regex patterns for expense amount extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Labels that precede the payable amount on receipts and tickets.
///
/// Order matters: at a given position the first label that leads to a
/// number wins, so longer labels come before their prefixes.
pub const DEFAULT_AMOUNT_LABELS: &[&str] = &[
    "Montant total (TTC)",
    "Montant de la transaction (TTC)",
    "NET A PAYER TTC",
    "Montant TTC",
    "Prix TTC",
    "Total voyageur",
    "Montant du voyage",
    "Prix",
    "Total",
];

/// Numeric token following a label: grouped thousands or a plain digit run,
/// then an optional 1-2 digit decimal part with comma or dot. The trailing
/// group requires a non-digit (or end of text) after the token, so a grouped
/// number glued to a currency code is not cut short.
pub const AMOUNT_TOKEN: &str =
    r"((?:[0-9]{1,3}(?:[ \u{00a0},.][0-9]{3})+|[0-9]+)(?:[.,][0-9]{1,2})?)(?:[^0-9]|$)";

/// Build the label alternation pattern. Labels are matched literally.
pub fn build_amount_pattern<S: AsRef<str>>(labels: &[S]) -> Result<Regex, regex::Error> {
    let alternation = labels
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"({})[\s:]*{}", alternation, AMOUNT_TOKEN))
}

lazy_static! {
    pub static ref LABELED_AMOUNT: Regex = build_amount_pattern(DEFAULT_AMOUNT_LABELS).unwrap();
}
