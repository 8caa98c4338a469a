//! Approximate name matching for customer folders.

/// Normalized Indel similarity in `[0, 100]`:
/// `100 * (1 - indel_distance / (len_a + len_b))`, over chars.
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    // indel distance = total - 2 * lcs
    let lcs = lcs_len(&a, &b);
    100.0 * (2 * lcs) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        let mut diag = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

/// Case and surrounding whitespace do not count against a match.
pub fn similarity(a: &str, b: &str) -> f64 {
    ratio(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

/// Group similar names. Names are visited in sorted order and each joins the
/// first group whose representative (its first member) scores at least
/// `threshold`; otherwise it starts a new group. Similarity is never chained:
/// a name close to a non-representative member does not join that group.
pub fn group<S: AsRef<str>>(names: &[S], threshold: f64) -> Vec<Vec<String>> {
    let mut sorted: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    sorted.sort();
    sorted.dedup();

    let mut groups: Vec<Vec<String>> = Vec::new();
    for name in sorted {
        match groups
            .iter_mut()
            .find(|g| similarity(&name, &g[0]) >= threshold)
        {
            Some(g) => g.push(name),
            None => groups.push(vec![name]),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_known_values() {
        assert!(approx(ratio("", ""), 100.0));
        assert!(approx(ratio("abc", ""), 0.0));
        assert!(approx(ratio("Acme Corp", "Acme Corp"), 100.0));
        // lcs 9 of 9 + 10 chars
        assert!(approx(ratio("Acme Corp", "Acme Corp."), 1800.0 / 19.0));
        // "this is a test" vs "this is a test!" -> 96.55...
        assert!(approx(ratio("this is a test", "this is a test!"), 2800.0 / 29.0));
        assert!(approx(ratio("kitten", "sitting"), 100.0 * 8.0 / 13.0));
    }

    #[test]
    fn test_similarity_ignores_case() {
        assert!(approx(similarity("ACME CORP", "acme corp "), 100.0));
    }

    #[test]
    fn test_group_near_duplicates() {
        let names = ["Globex", "Acme Corp.", "Acme Corp", "Initech", "acme corp"];
        let groups = group(&names, 80.0);
        assert_eq!(
            groups,
            vec![
                vec!["Acme Corp".to_string(), "Acme Corp.".to_string(), "acme corp".to_string()],
                vec!["Globex".to_string()],
                vec!["Initech".to_string()],
            ]
        );
    }

    #[test]
    fn test_group_does_not_chain() {
        // "abcd" ~ "abcdef" (80), "abcdef" ~ "abcdefgh" (85.7), "abcd" !~ "abcdefgh" (66.7)
        let groups = group(&["abcdefgh", "abcd", "abcdef"], 80.0);
        assert_eq!(
            groups,
            vec![
                vec!["abcd".to_string(), "abcdef".to_string()],
                vec!["abcdefgh".to_string()],
            ]
        );
    }
}
