//! Tag list normalization.

/// Normalizes a tag list: trims, lowercases, replaces inner whitespace with
/// `-`, drops blanks and duplicates. First-seen order is kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();

    for tag in tags {
        let tag = tag
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();

        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }

    normalized
}

/// Splits a comma separated query value (`?tags=foo,bar`) into normalized tags.
pub fn parse_tags_query(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}
