//! "Did you mean" hints for unknown check ids.

/// The registered id closest to `unknown`, if any is close enough to be a
/// plausible typo (edit distance at most half the longer id).
///
/// Ties keep the first candidate, so pass ids in a stable order.
pub(crate) fn fuzzy_match<'a>(unknown: &str, ids: &[&'a str]) -> Option<&'a str> {
    let needle: Vec<char> = unknown.to_lowercase().chars().collect();

    ids.iter()
        .map(|&id| {
            let candidate: Vec<char> = id.to_lowercase().chars().collect();
            (id, edit_distance(&needle, &candidate))
        })
        .fold(None, |best: Option<(&'a str, usize)>, (id, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((id, dist)),
        })
        .filter(|(id, dist)| *dist <= unknown.chars().count().max(id.chars().count()) / 2)
        .map(|(id, _)| id)
}

/// Levenshtein distance over chars, single-row.
pub(crate) fn edit_distance(a: &[char], b: &[char]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[b.len()]
}
