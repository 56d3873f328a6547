//! Escape-aware character scanning shared by the literal parser and the
//! interpolation engine.

/// Find the byte index of the first occurrence of `target` at or after
/// `from` that is not preceded by an escaping backslash.
///
/// A backslash escapes exactly the one character that follows it; escape
/// state does not chain past the escaped character, so `\\"` ends a
/// double-quoted value.
pub(crate) fn find_unescaped(text: &str, target: char, from: usize) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text[from..].char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == target {
            return Some(from + idx);
        }
    }
    None
}

/// Append the translation of the escape sequence `\` + `ch` to `out`.
///
/// `\b`, `\v` and `\f` are deleted outright; an unrecognized escape keeps
/// the character and drops the backslash.
pub(crate) fn push_escaped(out: &mut String, ch: char) {
    match ch {
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        't' => out.push('\t'),
        'b' | 'v' | 'f' => {}
        other => out.push(other),
    }
}

/// Resolve every escape sequence in `text`, left to right, into a fresh
/// string. A trailing lone backslash is kept as-is.
pub(crate) fn unescape_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next) => push_escaped(&mut out, next),
            None => out.push('\\'),
        }
    }
    out
}
