use std::cmp::Ordering;

/// Natural, case-insensitive string ordering: embedded digit runs compare by
/// numeric value, so "Week 2" sorts before "Week 10". Used everywhere a list
/// of paths or file names is shown to the user.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    // Applied only when the strings are equal ignoring case, to keep the
    // ordering total.
    let mut case_tiebreak = Ordering::Equal;

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return case_tiebreak,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ordering = compare_digit_runs(&mut left, &mut right);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                } else {
                    let ordering = lc.to_lowercase().cmp(rc.to_lowercase());
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                    if case_tiebreak == Ordering::Equal {
                        case_tiebreak = lc.cmp(&rc);
                    }
                    left.next();
                    right.next();
                }
            }
        }
    }
}

/// Consumes one digit run from each side and compares them as numbers.
/// Lengths are compared after stripping leading zeros, so arbitrarily long
/// runs never overflow an integer type.
fn compare_digit_runs(
    left: &mut std::iter::Peekable<std::str::Chars<'_>>,
    right: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Ordering {
    let left_run = take_digit_run(left);
    let right_run = take_digit_run(right);

    let left_digits = left_run.trim_start_matches('0');
    let right_digits = right_run.trim_start_matches('0');

    left_digits
        .len()
        .cmp(&right_digits.len())
        .then_with(|| left_digits.cmp(right_digits))
        // "01" and "1" are numerically equal; keep the ordering total.
        .then_with(|| left_run.len().cmp(&right_run.len()))
}

fn take_digit_run(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            run.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    run
}
