//! Ticker symbol normalisation.
//!
//! A symbol is 1 to 15 characters of `A-Z`, `0-9` and `. ^ = -`, which covers
//! share classes (`BRK.B`), indices (`^GSPC`), FX (`EURUSD=X`) and crypto
//! pairs (`BTC-USD`). Symbols end up in file names and request URLs, so
//! anything else is rejected.

use crate::domain::error::TrendError;

pub const MAX_TICKER_LEN: usize = 15;

pub fn is_ticker_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= MAX_TICKER_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-'))
}

/// Trimmed, upper-cased symbol. Empty input and characters outside the
/// symbol set are `InvalidInput`.
pub fn normalize_ticker(raw: &str) -> Result<String, TrendError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(TrendError::InvalidInput {
            reason: "no ticker entered".to_string(),
        });
    }
    if !is_ticker_symbol(&ticker) {
        return Err(TrendError::InvalidInput {
            reason: format!(
                "invalid ticker '{}': use A-Z, 0-9 and . ^ = - (at most {MAX_TICKER_LEN} characters)",
                raw.trim()
            ),
        });
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_symbol_shapes_are_accepted() {
        for raw in ["aapl", " brk.b ", "^gspc", "eurusd=x", "BTC-USD", "7203.T"] {
            assert!(normalize_ticker(raw).is_ok(), "{raw}");
        }
        assert_eq!(normalize_ticker("  msft ").unwrap(), "MSFT");
    }

    #[test]
    fn path_and_query_characters_are_rejected() {
        for raw in ["../secret", "a/b", "AAPL?range=1d", "A&B", "X#Y", "A B", "a\\b"] {
            assert!(
                matches!(normalize_ticker(raw), Err(TrendError::InvalidInput { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn blank_and_overlong_are_rejected() {
        assert!(matches!(
            normalize_ticker("   "),
            Err(TrendError::InvalidInput { .. })
        ));
        assert!(normalize_ticker(&"A".repeat(MAX_TICKER_LEN)).is_ok());
        assert!(normalize_ticker(&"A".repeat(MAX_TICKER_LEN + 1)).is_err());
    }

    #[test]
    fn raw_symbol_check_is_case_sensitive() {
        assert!(is_ticker_symbol("AAPL"));
        assert!(!is_ticker_symbol("aapl"));
        assert!(!is_ticker_symbol(""));
    }
}
