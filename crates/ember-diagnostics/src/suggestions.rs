// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean suggestions for misspelled names.

/// Levenshtein distance between two strings, by characters.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Find the closest match for `name` among `candidates`.
///
/// Returns `Some("did you mean `closest`?")` when one is near enough. Ties
/// go to the earliest candidate.
pub fn did_you_mean<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.chars().count() {
        0..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };

    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        if candidate == name || name.len().abs_diff(candidate.len()) > max_distance {
            continue;
        }
        let dist = edit_distance(name, candidate);
        let closer = match best {
            Some((_, best_dist)) => dist < best_dist,
            None => true,
        };
        if dist <= max_distance && closer {
            best = Some((candidate, dist));
        }
    }

    best.map(|(closest, _)| format!("did you mean `{}`?", closest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_you_mean() {
        let candidates = ["println", "printf", "main"];

        assert_eq!(
            did_you_mean("pritnln", candidates.iter().copied()),
            Some("did you mean `println`?".to_string())
        );
        assert_eq!(
            did_you_mean("mian", candidates.iter().copied()),
            Some("did you mean `main`?".to_string())
        );
        assert_eq!(did_you_mean("xyz", candidates.iter().copied()), None);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "hello"), 5);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", "abd"), 1);
    }
}
