//! Bounded Levenshtein distance for fuzzy term matching.

use std::cmp::min;

/// Edit distance between `a` and `b` if it is at most `max_edits`.
///
/// Works on chars, keeps two rows, and stops as soon as a whole row exceeds
/// the bound, so long vocabulary scans stay cheap for distant terms.
#[must_use]
pub fn distance_within(a: &str, b: &str, max_edits: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max_edits {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= max_edits).then_some(d);
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        let mut row_min = curr_row[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(
                min(prev_row[j + 1] + 1, curr_row[j] + 1),
                prev_row[j] + cost,
            );
            row_min = min(row_min, curr_row[j + 1]);
        }

        if row_min > max_edits {
            return None;
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let d = prev_row[b.len()];
    (d <= max_edits).then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_terms() {
        assert_eq!(distance_within("twain", "twain", 1), Some(0));
    }

    #[test]
    fn single_edits() {
        assert_eq!(distance_within("twain", "twins", 2), Some(2));
        assert_eq!(distance_within("austen", "austin", 1), Some(1));
        assert_eq!(distance_within("fiction", "fictio", 1), Some(1));
        assert_eq!(distance_within("fiction", "fictions", 1), Some(1));
    }

    #[test]
    fn exceeding_the_bound() {
        assert_eq!(distance_within("kitten", "sitting", 2), None);
        assert_eq!(distance_within("kitten", "sitting", 3), Some(3));
        assert_eq!(distance_within("pride", "prejudice", 2), None);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(distance_within("", "", 0), Some(0));
        assert_eq!(distance_within("ab", "", 2), Some(2));
        assert_eq!(distance_within("", "abc", 2), None);
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(distance_within("café", "cafe", 1), Some(1));
    }
}
