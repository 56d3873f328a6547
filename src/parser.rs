//! Line-by-line parsing of dotenv content into the entry map.
//!
//! Malformed lines never abort the pass: a line with no `=`, a bad key or an
//! unterminated quote is skipped (or kept best-effort) and parsing
//! continues, so one broken line cannot take the rest of the file with it.

use std::collections::HashMap;

use tracing::debug;

use crate::env::EnvSource;
use crate::interp::{self, Lookup};
use crate::model::{ParseFlags, QuoteKind};
use crate::scan;

/// Whitespace trimmed around keys and values.
fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\u{B}' | '\u{C}' | '\r')
}

/// Characters skipped over when classifying the head of a line. The
/// semicolon participates here only, not in key/value trimming.
fn is_lead_skip(ch: char) -> bool {
    is_space(ch) || ch == ';'
}

/// Keys must match `[A-Za-z][A-Za-z0-9_]*`.
fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Parse `input` into the final entry map. Entries become visible to the
/// interpolation lookups of every later line as soon as they are inserted.
pub(crate) fn parse_source(
    input: &str,
    flags: ParseFlags,
    env: &EnvSource,
) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut lines = input.lines().enumerate();

    while let Some((index, raw_line)) = lines.next() {
        // A byte-order mark is tolerated on the very first line only.
        let line = if index == 0 {
            raw_line.strip_prefix('\u{feff}').unwrap_or(raw_line)
        } else {
            raw_line
        };

        let Some(head) = line.find(|ch: char| !is_lead_skip(ch)) else {
            continue;
        };
        let line = &line[head..];
        if line.starts_with('#') {
            continue;
        }

        let Some(eq) = line.find('=') else {
            debug!(line = index + 1, "skipping line without an assignment");
            continue;
        };

        let key = line[..eq].trim_end_matches(is_space);
        if !is_valid_key(key) {
            debug!(line = index + 1, "skipping line with a malformed key");
            continue;
        }

        let raw_value = line[eq + 1..].trim_start_matches(is_space);
        if raw_value.is_empty() {
            entries.insert(key.to_owned(), String::new());
            continue;
        }

        let (literal, quote) = read_literal(raw_value, index + 1, &mut lines);
        let value = finish_value(literal, quote, flags, env, &entries);
        entries.insert(key.to_owned(), value);
    }

    entries
}

/// Resolve the quoting style of `raw` and produce the literal: the content
/// between quotes (pulling continuation lines for unterminated quoted
/// values) or the comment-stripped unquoted text.
fn read_literal<'a>(
    raw: &str,
    line_num: usize,
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> (String, QuoteKind) {
    let Some(first) = raw.chars().next() else {
        return (String::new(), QuoteKind::None);
    };
    let quote = QuoteKind::of(first);
    let Some(q) = quote.quote() else {
        return (unquoted_literal(raw), QuoteKind::None);
    };

    if let Some(close) = scan::find_unescaped(raw, q, 1) {
        // Anything after the closing quote is dropped.
        return (raw[1..close].to_owned(), quote);
    }

    // No closing quote on this line: accumulate continuation lines until one
    // carries an unescaped closing quote, which contributes only the prefix
    // before it.
    let mut value = raw[1..].to_owned();
    let mut closed = false;
    for (_, cont) in lines.by_ref() {
        value.push('\n');
        match scan::find_unescaped(cont, q, 0) {
            Some(close) => {
                value.push_str(&cont[..close]);
                closed = true;
                break;
            }
            None => value.push_str(cont),
        }
    }
    if !closed {
        debug!(
            line = line_num,
            "unterminated quoted value, keeping partial content"
        );
    }
    (value, quote)
}

fn unquoted_literal(raw: &str) -> String {
    let mut value = raw;
    if let Some(hash) = raw.find('#') {
        // The comment takes the character immediately preceding the `#`
        // (its presumed separating whitespace) with it.
        let cut = raw[..hash]
            .char_indices()
            .next_back()
            .map_or(0, |(idx, _)| idx);
        value = &raw[..cut];
    }
    value.trim_end_matches(is_space).to_owned()
}

fn finish_value(
    literal: String,
    quote: QuoteKind,
    flags: ParseFlags,
    env: &EnvSource,
    entries: &HashMap<String, String>,
) -> String {
    let interpolate = !flags.contains(ParseFlags::NO_INTERPOLATE);
    match quote {
        // Single-quoted values are stored verbatim.
        QuoteKind::Single => literal,
        QuoteKind::Double | QuoteKind::Backtick => {
            if interpolate {
                interp::expand(&literal, true, &Lookup::new(env, entries))
            } else {
                scan::unescape_all(&literal)
            }
        }
        QuoteKind::None => {
            if interpolate {
                interp::expand(&literal, false, &Lookup::new(env, entries))
            } else {
                literal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> HashMap<String, String> {
        parse_source(input, ParseFlags::default(), &EnvSource::memory())
    }

    fn parse_with_flags(input: &str, flags: ParseFlags) -> HashMap<String, String> {
        parse_source(input, flags, &EnvSource::memory())
    }

    #[test]
    fn parses_basic_values_and_comments() {
        let parsed = parse("A=1\nB = 2\n# skip\nC=hello # comment\nD=\n");

        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed["A"], "1");
        assert_eq!(parsed["B"], "2");
        assert_eq!(parsed["C"], "hello");
        assert_eq!(parsed["D"], "");
    }

    #[test]
    fn strips_bom_on_first_line_only() {
        let parsed = parse("\u{feff}A=1\nB=2\n");
        assert_eq!(parsed["A"], "1");

        // A BOM later in the file corrupts that line's key instead.
        let parsed = parse("A=1\n\u{feff}B=2\n");
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.contains_key("B"));
    }

    #[test]
    fn semicolons_are_skipped_at_line_start() {
        let parsed = parse(";A=1\n ;; B=2\n");
        assert_eq!(parsed["A"], "1");
        assert_eq!(parsed["B"], "2");
    }

    #[test]
    fn line_without_assignment_is_skipped() {
        let parsed = parse("A=1\nno assignment here\nB=2\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["A"], "1");
        assert_eq!(parsed["B"], "2");
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let parsed = parse("1BAD=x\n_BAD=x\nBAD KEY=x\nBAD-KEY=x\nGOOD_1=ok\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["GOOD_1"], "ok");
    }

    #[test]
    fn empty_value_is_recorded_without_further_processing() {
        let parsed = parse("A=\nB=   \n");
        assert_eq!(parsed["A"], "");
        assert_eq!(parsed["B"], "");
    }

    #[test]
    fn last_assignment_wins() {
        let parsed = parse("A=1\nA=2\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["A"], "2");
    }

    #[test]
    fn unquoted_comment_takes_its_separating_character() {
        assert_eq!(parse("K=a # comment\n")["K"], "a");
        // No separating whitespace: the character before `#` goes too.
        assert_eq!(parse("K=a#b\n")["K"], "");
        assert_eq!(parse("K=#leading\n")["K"], "");
    }

    #[test]
    fn hash_inside_quotes_is_not_a_comment() {
        assert_eq!(parse("K=\"a#b\"\n")["K"], "a#b");
        assert_eq!(parse("K='a#b'\n")["K"], "a#b");
    }

    #[test]
    fn quoted_value_drops_trailing_content() {
        assert_eq!(parse("K=\"value\" trailing\n")["K"], "value");
        assert_eq!(parse("K='value' # note\n")["K"], "value");
    }

    #[test]
    fn single_quoted_values_are_verbatim() {
        let parsed = parse("A=1\nB='${A} and \\n stay'\n");
        assert_eq!(parsed["B"], "${A} and \\n stay");
    }

    #[test]
    fn double_quoted_values_resolve_escapes() {
        assert_eq!(parse("K=\"line\\nnext\"\n")["K"], "line\nnext");
        assert_eq!(parse("K=\"say \\\"hi\\\"\"\n")["K"], "say \"hi\"");
    }

    #[test]
    fn multiline_quoted_value_joins_with_newlines() {
        let parsed = parse("K=\"first\nsecond\"\nAFTER=after\n");
        assert_eq!(parsed["K"], "first\nsecond");
        assert_eq!(parsed["AFTER"], "after");
    }

    #[test]
    fn multiline_closing_line_contributes_only_its_prefix() {
        let parsed = parse("K=`one\ntwo` # trailing\nB=2\n");
        assert_eq!(parsed["K"], "one\ntwo");
        assert_eq!(parsed["B"], "2");
    }

    #[test]
    fn multiline_value_may_span_blank_lines() {
        let parsed = parse("K=\"one\n\nthree\"\n");
        assert_eq!(parsed["K"], "one\n\nthree");
    }

    #[test]
    fn unterminated_multiline_value_keeps_partial_content() {
        let parsed = parse("K=\"first\nsecond\n");
        assert_eq!(parsed["K"], "first\nsecond");
    }

    #[test]
    fn escaped_quotes_do_not_terminate_the_literal() {
        let parsed = parse("K=\"one \\\" two\"\n");
        assert_eq!(parsed["K"], "one \" two");
    }

    #[test]
    fn interpolates_against_earlier_entries() {
        let parsed = parse("A=1\nB=${A}-x\n");
        assert_eq!(parsed["B"], "1-x");
    }

    #[test]
    fn forward_references_resolve_as_unset() {
        let parsed = parse("B=${A}-x\nA=1\n");
        assert_eq!(parsed["B"], "-x");
        assert_eq!(parsed["A"], "1");
    }

    #[test]
    fn backtick_values_interpolate_like_double_quotes() {
        let parsed = parse("A=1\nB=`${A} and\\ttab`\n");
        assert_eq!(parsed["B"], "1 and\ttab");
    }

    #[test]
    fn no_interpolate_flag_suppresses_expansion() {
        let parsed = parse_with_flags("A=1\nB=${A}\nC=\"${A}\\n\"\n", ParseFlags::NO_INTERPOLATE);
        assert_eq!(parsed["B"], "${A}");
        // Double-quoted values still resolve their escapes.
        assert_eq!(parsed["C"], "${A}\n");
    }

    #[test]
    fn parses_unicode_values() {
        let parsed = parse("GREETING=こんにちは\n");
        assert_eq!(parsed["GREETING"], "こんにちは");
    }

    #[test]
    fn reparsing_expanded_output_is_a_fixed_point() {
        let parsed = parse("A=1\nB=${A}-x\n");
        let replay: String = {
            let mut pairs: Vec<_> = parsed.iter().collect();
            pairs.sort();
            pairs
                .into_iter()
                .map(|(key, value)| format!("{key}={value}\n"))
                .collect()
        };
        let reparsed = parse(&replay);
        assert_eq!(parsed, reparsed);
    }
}
