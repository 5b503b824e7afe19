//! Tag normalization.

/// Normalize tags for indexing.
///
/// Trims, lowercases, and joins inner whitespace runs with `-`. Empty tags are
/// dropped and duplicates removed, keeping the first occurrence. Applying this
/// twice yields the same result as applying it once.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let normalized = tag
            .as_ref()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        if normalized.is_empty() || out.contains(&normalized) {
            continue;
        }
        out.push(normalized);
    }
    out
}
