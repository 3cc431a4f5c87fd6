//! Free-text normalization and numeric parsing.

/// Canonicalize a free-text answer for comparison.
///
/// Trims, collapses every whitespace run to one space, and lowercases.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse a number from free text, accepting fractions and decimal commas.
///
/// `"29/5"` is `5.8`, `"3,5"` is `3.5`. Returns `None` when the text is not a
/// finite number, including fractions with a zero denominator.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = normalize(text);

    if text.contains('/') {
        // A fraction with anything but two parts cannot be a plain number either.
        let mut parts = text.split('/');
        let (Some(numerator), Some(denominator), None) = (parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        let numerator = parse_float(numerator)?;
        let denominator = parse_float(denominator)?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator).filter(|v| v.is_finite());
    }

    parse_float(&text.replace(',', "."))
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
