//! Monetary and hours values as they appear in payroll exports.
//!
//! Exports write amounts like `$1,234.50`; the currency sign and thousands
//! separators are dropped before numeric parsing.

/// Strip currency symbols, thousands separators and surrounding whitespace.
pub fn normalize_amount(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| *ch != '$' && *ch != ',')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse an amount, returning `None` for blank or non-numeric input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized = normalize_amount(raw);
    if normalized.is_empty() {
        return None;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_formatting() {
        assert_eq!(normalize_amount(" $1,234.56 "), "1234.56");
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
    }

    #[test]
    fn blank_and_garbage_do_not_parse() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("  $ "), None);
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn negative_amounts_parse() {
        assert_eq!(parse_amount("-4.5"), Some(-4.5));
    }
}
