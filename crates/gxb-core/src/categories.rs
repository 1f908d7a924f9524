//! Category list normalization.

/// Catch-all category appended to every stored category set.
pub const OTHER: &str = "Other";

/// Split a comma-separated reply into category names.
///
/// Names are trimmed, empties dropped, and duplicates removed keeping the
/// first occurrence. An empty result means the reply held no usable names.
pub fn split_categories(text: &str) -> Vec<String> {
    dedupe(text.split(',').map(str::to_string))
}

/// Normalize `names` into the stored form: trimmed, deduped, insertion
/// ordered, with a single trailing [`OTHER`].
///
/// User-supplied "other" entries (any case) are folded into the trailing one.
pub fn finalize_categories<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = dedupe(names.into_iter().map(Into::into))
        .into_iter()
        .filter(|n| !n.eq_ignore_ascii_case(OTHER))
        .collect();
    out.push(OTHER.to_string());
    out
}

fn dedupe(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}
