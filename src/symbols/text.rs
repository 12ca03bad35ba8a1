//! Low-level text scanning for the heuristic symbol engine.
//!
//! Everything here is a pure function over a single line (or raw document
//! text), with no protocol or I/O dependency. Positions are character
//! offsets, matching the positions the client sends.

/// Identifier characters: letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split document text into lines, tolerating CRLF endings.
///
/// Unlike [`str::lines`], a trailing newline yields a final empty line so
/// that line indices and line counts match what the client sees.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// The character span of the word under `character`, or `None` when the
/// offset lands on a non-word character with no adjacent word characters.
///
/// The offset is clamped into `[0, line length]` first, so positions past
/// the end of the line resolve to the trailing word if there is one.
pub fn word_range_at(line: &str, character: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let safe = character.min(chars.len());
    let mut start = safe;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }

    let mut end = safe;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    (end > start).then_some((start, end))
}

/// The word under `character`, or `None` if there is none.
pub fn word_at(line: &str, character: usize) -> Option<String> {
    word_range_at(line, character)
        .map(|(start, end)| line.chars().skip(start).take(end - start).collect())
}

/// All whole-word, case-insensitive occurrences of `symbol` in `line`, as
/// `(start, end)` character spans.
///
/// A candidate match is accepted only when both neighbors (or the line
/// edges) are non-word characters, so `Foo` never matches inside `FooBar`.
/// Scanning resumes just past each candidate, which keeps adjacent
/// occurrences visible.
pub fn symbol_occurrences(line: &str, symbol: &str) -> Vec<(usize, usize)> {
    let mut occurrences = Vec::new();
    if line.trim().is_empty() || symbol.trim().is_empty() {
        return occurrences;
    }

    let chars: Vec<char> = line.chars().collect();
    let needle: Vec<char> = symbol.chars().collect();
    let mut from = 0;

    while let Some(start) = find_ci(&chars, &needle, from) {
        let end = start + needle.len();
        let left_boundary = start == 0 || !is_word_char(chars[start - 1]);
        let right_boundary = end >= chars.len() || !is_word_char(chars[end]);
        if left_boundary && right_boundary {
            occurrences.push((start, end));
        }
        from = end;
    }

    occurrences
}

/// True when the occurrence starting at `start` is a member access, i.e.
/// the first non-whitespace character to its left is a dot. Distinguishes
/// `obj.Name` from a bare reference to `Name`.
pub fn is_member_access(line: &str, start: usize) -> bool {
    let chars: Vec<char> = line.chars().collect();
    for index in (0..start.min(chars.len())).rev() {
        let c = chars[index];
        if c.is_whitespace() {
            continue;
        }
        return c == '.';
    }
    false
}

fn find_ci(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&at| {
        haystack[at..at + needle.len()]
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn word_at_expands_both_directions() {
        assert_eq!(word_at("Dim counter As Integer", 6).as_deref(), Some("counter"));
        assert_eq!(word_at("Dim counter As Integer", 4).as_deref(), Some("counter"));
        assert_eq!(word_at("Dim counter As Integer", 11).as_deref(), Some("counter"));
    }

    #[test]
    fn word_at_clamps_out_of_range_offsets() {
        assert_eq!(word_at("total", 999).as_deref(), Some("total"));
        assert_eq!(word_at("", 3), None);
    }

    #[test]
    fn word_at_is_none_between_words() {
        // Offset 3 sits on the space, with word chars on the left only.
        assert_eq!(word_at("a + b", 2), None);
        assert_eq!(word_at("(, )", 1), None);
    }

    #[test]
    fn occurrences_require_word_boundaries() {
        let occ = symbol_occurrences("Foo FooBar barFoo Foo", "Foo");
        assert_eq!(occ, vec![(0, 3), (18, 21)]);
    }

    #[test]
    fn occurrences_are_case_insensitive() {
        let occ = symbol_occurrences("foo FOO fOo", "Foo");
        assert_eq!(occ, vec![(0, 3), (4, 7), (8, 11)]);
    }

    #[test]
    fn adjacent_occurrences_are_all_found() {
        let occ = symbol_occurrences("x,x x", "x");
        assert_eq!(occ, vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn member_access_skips_whitespace_before_the_dot() {
        let line = "value . Name";
        let occ = symbol_occurrences(line, "Name");
        assert_eq!(occ.len(), 1);
        assert!(is_member_access(line, occ[0].0));
        assert!(!is_member_access("Dim Name", 4));
    }

    #[test]
    fn occurrence_spans_match_the_symbol() {
        let line = "Sub Total() : Total = total + 1";
        for (start, end) in symbol_occurrences(line, "Total") {
            let slice: String = line.chars().skip(start).take(end - start).collect();
            assert!(slice.eq_ignore_ascii_case("Total"));
        }
    }
}
