/// Trim whitespace and strip a pair of outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Best-effort text → number. Blank or unparseable cells become `None`.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let c = clean_str(raw);
    if c.is_empty() {
        return None;
    }
    c.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// A cell that carries no information.
pub fn is_blank(cell: &Option<String>) -> bool {
    cell.as_deref().map_or(true, |s| s.trim().is_empty())
}
