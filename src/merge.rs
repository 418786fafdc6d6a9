use std::collections::HashSet;

/// Texts from `fresh` that are not in `known`, in `fresh` order.
///
/// Matching is exact on cleaned text. A text repeated within `fresh` is only
/// returned once, so a (day, text) pair is never recorded twice by one run.
pub fn new_items<'a>(known: &HashSet<String>, fresh: &'a [String]) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    fresh
        .iter()
        .map(String::as_str)
        .filter(|text| !known.contains(*text) && seen.insert(*text))
        .collect()
}

/// Texts from `fresh` that `new_items` leaves out: already known, or a repeat
/// of an earlier text in `fresh`.
pub fn skipped_items<'a>(known: &HashSet<String>, fresh: &'a [String]) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    fresh
        .iter()
        .map(String::as_str)
        .filter(|text| known.contains(*text) || !seen.insert(*text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_only_unknown_in_document_order() {
        let known = set(&["Senate convened."]);
        let fresh = list(&["Senate convened.", "Senate agreed to H.Res. 123.", "Senate adjourned."]);
        assert_eq!(
            new_items(&known, &fresh),
            vec!["Senate agreed to H.Res. 123.", "Senate adjourned."]
        );
    }

    #[test]
    fn exact_match_only() {
        let known = set(&["Senate convened."]);
        let fresh = list(&["Senate convened", "senate convened."]);
        assert_eq!(new_items(&known, &fresh).len(), 2);
    }

    #[test]
    fn repeated_text_emitted_once() {
        let fresh = list(&["Quorum call.", "Senate convened.", "Quorum call."]);
        assert_eq!(
            new_items(&HashSet::new(), &fresh),
            vec!["Quorum call.", "Senate convened."]
        );
    }

    #[test]
    fn skipped_covers_known_and_repeats() {
        let known = set(&["Senate convened."]);
        let fresh = list(&["Senate convened.", "Quorum call.", "Quorum call.", "Senate adjourned."]);
        assert_eq!(
            skipped_items(&known, &fresh),
            vec!["Senate convened.", "Quorum call."]
        );
        assert_eq!(
            skipped_items(&known, &fresh).len() + new_items(&known, &fresh).len(),
            fresh.len()
        );
    }

    #[test]
    fn pure_and_repeatable() {
        let known = set(&["a", "c"]);
        let fresh = list(&["a", "b", "c", "d"]);
        let (known_before, fresh_before) = (known.clone(), fresh.clone());

        let first: Vec<String> = new_items(&known, &fresh).into_iter().map(String::from).collect();
        let second: Vec<String> = new_items(&known, &fresh).into_iter().map(String::from).collect();

        assert_eq!(first, vec!["b", "d"]);
        assert_eq!(first, second);
        assert_eq!(known, known_before);
        assert_eq!(fresh, fresh_before);
    }

    #[test]
    fn everything_known_yields_nothing() {
        let known = set(&["a", "b"]);
        assert!(new_items(&known, &list(&["b", "a"])).is_empty());
    }
}
