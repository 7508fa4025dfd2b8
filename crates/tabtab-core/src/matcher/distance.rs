/// Bounded Levenshtein distance.
///
/// Single-row DP over chars. Returns `None` as soon as the distance is
/// guaranteed to exceed `max`, which keeps the per-keystroke fuzzy scan
/// cheap: the row minimum is monotonically non-decreasing, so once it
/// passes `max` no suffix can recover.
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Length gap alone already exceeds the bound.
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() {
        return Some(b.len());
    }
    if b.is_empty() {
        return Some(a.len());
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let val = (prev_diag + cost).min(row[j] + 1).min(row[j + 1] + 1);
            prev_diag = row[j + 1];
            row[j + 1] = val;
            row_min = row_min.min(val);
        }

        if row_min > max {
            return None;
        }
    }

    let dist = row[b.len()];
    (dist <= max).then_some(dist)
}
