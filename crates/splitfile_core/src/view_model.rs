use rust_decimal::Decimal;

use crate::state::{Area, PaymentMode, SessionPhase};

/// Snapshot handed to the host UI. Everything here is derived from
/// `AppState`; nothing is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub payment_mode: Option<PaymentMode>,
    pub area: Option<Area>,
    pub file_name: Option<String>,
    pub error: Option<String>,
    /// Raw (undebounced) search box content.
    pub query: String,
    /// True between a keystroke and the debounced query catching up.
    pub is_searching: bool,
    pub rows: Vec<LineRowView>,
    pub match_count: usize,
    pub total_transactions: u64,
    /// Service-reported total, peso-formatted. The source of truth.
    pub total_amount: Option<String>,
    /// Client-side re-aggregation, shown next to the authoritative total
    /// as a cross-check.
    pub crosscheck_total: Option<String>,
    pub can_generate_report: bool,
    pub generating_report: bool,
    pub report_progress: u8,
    pub dirty: bool,
}

/// One table row: the raw line next to its delimiter-stripped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRowView {
    pub original: String,
    pub cleaned: String,
}

/// Format a monetary value the way the review screen shows it:
/// `₱` prefix, thousands grouping, exactly two decimal places.
pub fn format_peso(value: Decimal) -> String {
    let text = format!("{:.2}", value.round_dp(2));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (offset, c) in int_part.chars().enumerate() {
        if offset > 0 && (int_part.len() - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("₱{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::format_peso;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn formats_two_decimal_places() {
        assert_eq!(format_peso(dec("10")), "₱10.00");
        assert_eq!(format_peso(dec("0.5")), "₱0.50");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_peso(dec("1234567.5")), "₱1,234,567.50");
        assert_eq!(format_peso(dec("999")), "₱999.00");
        assert_eq!(format_peso(dec("1000")), "₱1,000.00");
    }

    #[test]
    fn keeps_sign_inside_currency_mark() {
        assert_eq!(format_peso(dec("-42.135")), "₱-42.14");
    }
}
