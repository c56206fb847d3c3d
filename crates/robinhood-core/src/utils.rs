//! Small helpers shared by endpoint functions.

use std::collections::HashSet;

/// Normalize ticker input: upper-case, trimmed, no blanks, no duplicates.
/// The first occurrence of each symbol keeps its position.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for symbol in symbols {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if seen.insert(symbol.clone()) {
            out.push(symbol);
        }
    }
    out
}

/// Round a price to the precision the order endpoints accept.
pub fn round_price(price: f64) -> f64 {
    let places = if price <= 1e-2 {
        6
    } else if price < 1.0 {
        4
    } else {
        2
    };
    let factor = 10f64.powi(places);
    (price * factor).round() / factor
}
