//! Diff rendering for fixture comparison.

/// Render a text diff between expected and actual output.
///
/// Lines are compared pairwise; a length mismatch shows the surplus lines of
/// the longer side. Single-line outputs that differ only in invisible ways
/// (trailing whitespace, letter case) still produce a hunk because the
/// rendered lines are quoted.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");

    let exp: Vec<&str> = expected.split('\n').collect();
    let act: Vec<&str> = actual.split('\n').collect();
    for i in 0..exp.len().max(act.len()) {
        let (e, a) = (exp.get(i), act.get(i));
        if e == a {
            continue;
        }
        out.push_str(&format!("@@ line {} @@\n", i + 1));
        if let Some(e) = e {
            out.push_str(&format!("-{e:?}\n"));
        }
        if let Some(a) = a {
            out.push_str(&format!("+{a:?}\n"));
        }
    }
    out
}
