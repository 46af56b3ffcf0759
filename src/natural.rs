//! Alphanumeric ("natural") ordering for identifiers such as `C4` and `C12`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Split into alternating text and digit runs, always starting with a
/// (possibly empty) text run so that runs at the same position share a kind.
fn runs(id: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut rest = id;
    loop {
        let text_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        out.push(Run::Text(&rest[..text_len]));
        rest = &rest[text_len..];
        if rest.is_empty() {
            return out;
        }
        let digit_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        out.push(Run::Digits(&rest[..digit_len]));
        rest = &rest[digit_len..];
    }
}

/// Compare two digit runs by integer value without overflowing.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural order; ids that are numerically equal (`A01`, `A1`) fall back to byte order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = runs(a);
    let right = runs(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Run::Digits(x), Run::Digits(y)) => cmp_digits(x, y),
            (Run::Text(x), Run::Text(y)) => x.cmp(y),
            // unreachable given the alternating layout
            (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
            (Run::Digits(_), Run::Text(_)) => Ordering::Less,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

pub fn sort_natural<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut ids: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        sort_natural(&mut ids);
        ids
    }

    #[test]
    fn sorts_numeric_suffixes_as_integers() {
        assert_eq!(sorted(&["A12", "A21", "A3"]), vec!["A3", "A12", "A21"]);
        assert_eq!(sorted(&["C1", "C8", "C4"]), vec!["C1", "C4", "C8"]);
    }

    #[test]
    fn compares_multiple_runs() {
        assert_eq!(
            sorted(&["x10y2", "x2y10", "x2y2", "x10y1"]),
            vec!["x2y2", "x2y10", "x10y1", "x10y2"]
        );
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        assert_eq!(natural_cmp("C", "C1"), Ordering::Less);
        assert_eq!(natural_cmp("C1", "C1a"), Ordering::Less);
    }

    #[test]
    fn leading_digits_sort_before_letters() {
        assert_eq!(sorted(&["B1", "12", "2", "A"]), vec!["2", "12", "A", "B1"]);
    }

    #[test]
    fn very_long_digit_runs_do_not_overflow() {
        assert_eq!(
            natural_cmp("C99999999999999999999999999999", "C100000000000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn zero_padded_ids_stay_distinct() {
        assert_eq!(natural_cmp("A01", "A1"), Ordering::Less);
        assert_eq!(natural_cmp("A1", "A1"), Ordering::Equal);
    }

    #[test]
    fn runs_alternate_starting_with_text() {
        assert_eq!(
            runs("12A"),
            vec![Run::Text(""), Run::Digits("12"), Run::Text("A")]
        );
    }
}
