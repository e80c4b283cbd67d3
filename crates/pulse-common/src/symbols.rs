/// Trim & uppercase a ticker symbol; blank input gives nothing.
pub fn normalize(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    (!symbol.is_empty()).then(|| symbol.to_uppercase())
}

/// Parse a comma-separated symbol list, e.g., `"aapl, aapl ,MSFT,,"` -> `["AAPL", "MSFT"]`.
///
/// Order of first appearance is kept.
pub fn parse_list(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').filter_map(normalize) {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes() {
        assert_eq!(normalize("  nvda "), Some("NVDA".to_string()));
        assert_eq!(normalize("BRK.B"), Some("BRK.B".to_string()));
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn parses_and_dedupes() {
        assert_eq!(parse_list("aapl, aapl ,MSFT"), vec!["AAPL", "MSFT"]);
        assert_eq!(parse_list("tsla,,Tsla, amzn"), vec!["TSLA", "AMZN"]);
        assert!(parse_list(" , ,").is_empty());
        assert!(parse_list("").is_empty());
    }
}
