//! Answer comparison.

/// Trim `input`, and unless `strict`, drop whitespace and hyphens and lower-case it.
pub fn normalize(input: &str, strict: bool) -> String {
    let trimmed = input.trim();
    if strict {
        return trimmed.to_string();
    }

    trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_lowercase()
}

pub fn answers_match(typed: &str, target: &str, strict: bool) -> bool {
    normalize(typed, strict) == normalize(target, strict)
}
