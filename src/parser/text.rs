use std::sync::LazyLock;

use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Typographic characters the floor log uses, mapped to their plain forms.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2019}', "'"),
    ('\u{00a0}', " "),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
];

/// Canonical form of a block's text: plain quotes, single spaces, trimmed.
///
/// Stored event texts are compared against this form, so it must stay
/// idempotent.
pub fn clean_text(raw: &str) -> String {
    let mut text = raw.to_string();
    for (from, to) in REPLACEMENTS {
        if text.contains(*from) {
            text = text.replace(*from, to);
        }
    }
    WS_RE.replace_all(&text, " ").trim().to_string()
}
