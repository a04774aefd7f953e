use std::collections::HashSet;

use crate::config::Markers;

/// Compares status values against the configured markers, honoring the
/// run's case rule on both sides. Values are trimmed first. Under the
/// case-insensitive rule, dedupe keys are lowercased identifiers too.
#[derive(Debug, Clone, Copy)]
pub struct MarkerMatcher<'a> {
    markers: &'a Markers,
    case_insensitive: bool,
}

impl<'a> MarkerMatcher<'a> {
    pub fn new(markers: &'a Markers, case_insensitive: bool) -> Self {
        Self {
            markers,
            case_insensitive,
        }
    }

    fn same(&self, value: &str, marker: &str) -> bool {
        let (value, marker) = (value.trim(), marker.trim());
        if self.case_insensitive {
            value.to_lowercase() == marker.to_lowercase()
        } else {
            value == marker
        }
    }

    pub fn is_done(&self, value: &str) -> bool {
        self.same(value, &self.markers.done)
    }

    pub fn is_not_done(&self, value: &str) -> bool {
        self.same(value, &self.markers.not_done)
    }

    /// Not-done test for the done/to-do split: trimmed and case-folded on
    /// both sides whatever the run's case rule.
    pub fn is_not_done_folded(&self, value: &str) -> bool {
        value.trim().to_lowercase() == self.markers.not_done.trim().to_lowercase()
    }

    pub fn is_no_lube_point(&self, value: &str) -> bool {
        self.same(value, &self.markers.no_lube_point)
    }

    /// Sort priority of a status value: done first, blanks and not-done last.
    pub fn priority(&self, value: &str) -> u8 {
        if self.is_done(value) {
            1
        } else if value.trim().is_empty() {
            4
        } else if self.is_not_done(value) {
            5
        } else if self.is_no_lube_point(value) {
            3
        } else {
            2
        }
    }

    /// Dedupe key for an identifier; `None` for blank identifiers.
    /// Lowercased when the run is case-insensitive, so `A1` and `a1` collide.
    pub fn identity_key(&self, identifier: &str) -> Option<String> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            None
        } else if self.case_insensitive {
            Some(trimmed.to_lowercase())
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Stable sort by status priority. Ties keep their input order.
pub fn sort_by_status<T>(items: &mut [T], matcher: &MarkerMatcher<'_>, status_of: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| matcher.priority(status_of(item)));
}

/// First occurrence of each identifier wins. Blank identifiers are always
/// kept and never recorded as seen. Returns the survivors and the number
/// of records dropped.
pub fn dedupe_by_identifier<T>(
    items: Vec<T>,
    matcher: &MarkerMatcher<'_>,
    identifier_of: impl Fn(&T) -> &str,
) -> (Vec<T>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| match matcher.identity_key(identifier_of(item)) {
            None => true,
            Some(key) => seen.insert(key),
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Partition into (done, to-do). To-do is the not-done marker compared
/// case-folded regardless of the run's case rule; everything else, blanks
/// included, counts as done.
pub fn split_done_todo<T: Clone>(
    items: &[T],
    matcher: &MarkerMatcher<'_>,
    status_of: impl Fn(&T) -> &str,
) -> (Vec<T>, Vec<T>) {
    items
        .iter()
        .cloned()
        .partition(|item| !matcher.is_not_done_folded(status_of(item)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        status: &'static str,
    }

    fn row(id: &'static str, status: &'static str) -> Row {
        Row { id, status }
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn priority_table() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        assert_eq!(m.priority("Yes"), 1);
        assert_eq!(m.priority("Not accessible"), 2);
        assert_eq!(m.priority("NLP"), 3);
        assert_eq!(m.priority("   "), 4);
        assert_eq!(m.priority("No"), 5);
        // Case rule applies: "yes" is not the done marker when sensitive.
        assert_eq!(m.priority("yes"), 2);
        let ci = MarkerMatcher::new(&markers, true);
        assert_eq!(ci.priority("yes"), 1);
        assert_eq!(ci.priority(" NO "), 5);
    }

    #[test]
    fn sort_is_stable_within_priority() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        let mut rows = vec![
            row("a", "No"),
            row("b", "Yes"),
            row("c", ""),
            row("d", "Question"),
            row("e", "Yes"),
            row("f", "NLP"),
        ];
        sort_by_status(&mut rows, &m, |r| r.status);
        assert_eq!(ids(&rows), vec!["b", "e", "d", "f", "c", "a"]);
    }

    #[test]
    fn dedupe_keeps_first_and_all_blanks() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        let rows = vec![
            row("A1", "No"),
            row("", "No"),
            row(" A1 ", "Yes"),
            row("  ", "Yes"),
            row("B2", "Yes"),
            row("a1", "Yes"),
        ];
        let (kept, removed) = dedupe_by_identifier(rows, &m, |r| r.id);
        assert_eq!(ids(&kept), vec!["A1", "", "  ", "B2", "a1"]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn dedupe_case_insensitive_folds_identifiers() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, true);
        let rows = vec![row("A1", "Yes"), row("a1", "No")];
        let (kept, removed) = dedupe_by_identifier(rows, &m, |r| r.id);
        assert_eq!(ids(&kept), vec!["A1"]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn sort_then_dedupe_prefers_done() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        let mut rows = vec![row("A1", "No"), row("A1", "Yes")];
        sort_by_status(&mut rows, &m, |r| r.status);
        let (kept, _) = dedupe_by_identifier(rows, &m, |r| r.id);
        assert_eq!(kept, vec![row("A1", "Yes")]);
    }

    #[test]
    fn split_partitions_everything() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        let rows = vec![row("a", "Yes"), row("b", "No"), row("c", ""), row("d", " No ")];
        let (done, todo) = split_done_todo(&rows, &m, |r| r.status);
        assert_eq!(ids(&done), vec!["a", "c"]);
        assert_eq!(ids(&todo), vec!["b", "d"]);
    }

    #[test]
    fn split_folds_case_even_for_case_sensitive_runs() {
        let markers = Markers::default();
        let m = MarkerMatcher::new(&markers, false);
        let rows = vec![row("a", "no"), row("b", " NO "), row("c", "nO"), row("d", "Yes"), row("e", "None")];
        let (done, todo) = split_done_todo(&rows, &m, |r| r.status);
        assert_eq!(ids(&todo), vec!["a", "b", "c"]);
        assert_eq!(ids(&done), vec!["d", "e"]);
        // Sorting still honors the case rule.
        assert_eq!(m.priority("no"), 2);
    }
}
