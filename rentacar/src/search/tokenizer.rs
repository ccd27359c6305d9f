/// Split `text` into lowercase alphanumeric tokens.
///
/// Every character that is not alphanumeric separates tokens; empty tokens
/// are dropped. No stop words, no stemming.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
