use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Monetary matches at or above this value are treated as reference numbers,
/// not amounts.
const AMOUNT_CEILING: u32 = 1_000_000;

fn re_amount() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    // Digits, a decimal point, one to four decimal digits, not adjacent to
    // another word character on either side.
    R.get_or_init(|| Regex::new(r"\b\d+\.\d{1,4}\b").expect("invalid regex"))
}

/// Strip the common field delimiters (`|`, `^`, `,`) from a raw line and
/// collapse whitespace runs to single spaces.
///
/// Empty input yields an empty string. Idempotent.
pub fn clean_line(line: &str) -> String {
    let replaced: String = line
        .chars()
        .map(|c| match c {
            '|' | '^' | ',' => ' ',
            other => other,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Mine a raw line for monetary amounts.
///
/// This is a best-effort heuristic over delimited transaction text, not a
/// parser: values that fail to parse, are non-positive, or reach the noise
/// ceiling are dropped silently. Survivors are rounded to two decimal places.
pub fn extract_amounts(line: &str) -> Vec<Decimal> {
    let ceiling = Decimal::from(AMOUNT_CEILING);
    re_amount()
        .find_iter(line)
        .filter_map(|m| Decimal::from_str(m.as_str()).ok())
        .filter(|amount| *amount > Decimal::ZERO && *amount < ceiling)
        .map(|amount| amount.round_dp(2))
        .collect()
}

/// Sum the mined amounts over a whole line collection, rounded to two
/// decimal places.
///
/// The result is a display-side cross-check; the service summary stays
/// authoritative.
pub fn aggregate_amounts(lines: &[String]) -> Decimal {
    lines
        .iter()
        .flat_map(|line| extract_amounts(line))
        .sum::<Decimal>()
        .round_dp(2)
}
