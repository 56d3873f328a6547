//! Variable expansion for parsed values.
//!
//! One forward pass over the literal: plain text is copied through, escape
//! sequences are resolved for quoted values, and each `$NAME` / `${NAME}` /
//! `${NAME[:-]default}` token is replaced by its resolved value. The input is
//! never mutated and replacement text is not re-scanned, so a fully expanded
//! value passes through a second run unchanged.

use std::collections::HashMap;

use crate::env::EnvSource;
use crate::scan;

/// Which default-substitution rule governs a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpansionKind {
    /// No default present.
    None,
    /// `${NAME-default}`: substitute only when `NAME` is unset.
    SubstituteUnset,
    /// `${NAME:-default}`: substitute whenever the value is empty.
    SubstituteEmpty,
}

/// One `$...` occurrence found during a scan pass, spanning
/// `[start, end)` bytes of the scanned value. Tokens drive exactly one
/// replacement and are never persisted.
#[derive(Debug, PartialEq, Eq)]
struct Token {
    name: String,
    default_text: String,
    kind: ExpansionKind,
    start: usize,
    end: usize,
}

enum ScanOutcome {
    /// No token starts at this `$`; it stays literal and the scan moves on.
    NotAToken,
    /// A token span was consumed but its filtered name was empty; the raw
    /// span stays literal and the scan continues after it.
    Discarded { end: usize },
    Found(Token),
}

/// Two-tier name resolution: process environment first, then entries parsed
/// earlier in the same file.
pub(crate) struct Lookup<'a> {
    env: &'a EnvSource,
    entries: &'a HashMap<String, String>,
}

impl<'a> Lookup<'a> {
    pub(crate) fn new(env: &'a EnvSource, entries: &'a HashMap<String, String>) -> Self {
        Self { env, entries }
    }

    /// Whether `name` is set in either tier, and its value (empty if unset).
    fn resolve(&self, name: &str) -> (bool, String) {
        if let Some(value) = self.env.get(name) {
            return (true, value);
        }
        if let Some(value) = self.entries.get(name) {
            return (true, value.clone());
        }
        (false, String::new())
    }
}

/// Expand every token in `input`. For quoted values, escape sequences in the
/// untokenized stretches are resolved in the same pass; unquoted values keep
/// their backslashes, though an escaped `$` still never starts a token.
pub(crate) fn expand(input: &str, quoted: bool, lookup: &Lookup<'_>) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => match input[idx + 1..].chars().next() {
                Some(next) => {
                    if quoted {
                        scan::push_escaped(&mut out, next);
                    } else {
                        out.push('\\');
                        out.push(next);
                    }
                    idx += 1 + next.len_utf8();
                }
                None => {
                    out.push('\\');
                    idx += 1;
                }
            },
            b'$' => match scan_token(input, idx) {
                ScanOutcome::Found(token) => {
                    debug_assert_eq!(token.start, idx);
                    out.push_str(&resolve_token(&token, lookup));
                    idx = token.end;
                }
                ScanOutcome::Discarded { end } => {
                    out.push_str(&input[idx..end]);
                    idx = end;
                }
                ScanOutcome::NotAToken => {
                    out.push('$');
                    idx += 1;
                }
            },
            _ => {
                let start = idx;
                while idx < bytes.len() && bytes[idx] != b'\\' && bytes[idx] != b'$' {
                    idx += 1;
                }
                out.push_str(&input[start..idx]);
            }
        }
    }

    out
}

fn scan_token(input: &str, start: usize) -> ScanOutcome {
    let bytes = input.as_bytes();
    let after = start + 1;
    if after >= bytes.len() {
        return ScanOutcome::NotAToken;
    }

    if bytes[after] == b'{' {
        let body_start = after + 1;
        // Need room for a non-empty body plus the closing brace.
        if bytes.len() - body_start < 2 {
            return ScanOutcome::NotAToken;
        }
        let Some(close) = scan::find_unescaped(input, '}', body_start) else {
            return ScanOutcome::NotAToken;
        };
        return token_outcome(&input[body_start..close], start, close + 1);
    }

    // Bare token: the raw name runs to the next whitespace character or end
    // of input; the terminator is not consumed.
    let mut end = bytes.len();
    for (offset, ch) in input[after..].char_indices() {
        if ch.is_whitespace() {
            end = after + offset;
            break;
        }
    }
    if end == after {
        return ScanOutcome::NotAToken;
    }
    token_outcome(&input[after..end], start, end)
}

/// Normalize raw token text into a name, optional default and expansion
/// kind. The first literal `-` splits off the default; a `:` immediately
/// before it selects [`ExpansionKind::SubstituteEmpty`]. The name keeps only
/// ASCII alphanumerics and `_`; a name that filters to nothing discards the
/// token.
fn token_outcome(raw: &str, start: usize, end: usize) -> ScanOutcome {
    let (name_text, default_text, kind) = match raw.find('-') {
        Some(delim) => {
            let default_text = &raw[delim + 1..];
            if delim > 0 && raw.as_bytes()[delim - 1] == b':' {
                (&raw[..delim - 1], default_text, ExpansionKind::SubstituteEmpty)
            } else {
                (&raw[..delim], default_text, ExpansionKind::SubstituteUnset)
            }
        }
        None => (raw, "", ExpansionKind::None),
    };

    let name: String = name_text
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();
    if name.is_empty() {
        return ScanOutcome::Discarded { end };
    }

    ScanOutcome::Found(Token {
        name,
        default_text: default_text.to_owned(),
        kind,
        start,
        end,
    })
}

fn resolve_token(token: &Token, lookup: &Lookup<'_>) -> String {
    let (is_set, mut value) = lookup.resolve(&token.name);

    // POSIX default semantics: `-` fires only for unset names, `:-` fires
    // for unset and set-but-empty alike.
    if value.is_empty() && !token.default_text.is_empty() {
        let substitute = match token.kind {
            ExpansionKind::SubstituteUnset => !is_set,
            ExpansionKind::SubstituteEmpty => true,
            ExpansionKind::None => false,
        };
        if substitute {
            value.clone_from(&token.default_text);
        }
    }

    value
}
