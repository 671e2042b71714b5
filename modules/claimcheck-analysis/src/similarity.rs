//! Normalized edit-distance similarity between two texts.

/// `1 - levenshtein(lower(a), lower(b)) / max_len`, in [0, 1].
///
/// Lengths are counted in chars of the lowercased strings, the same unit the
/// edit distance counts in, so the result never leaves [0, 1]. Two empty
/// strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    1.0 - distance as f64 / max_len as f64
}
