use std::sync::LazyLock;

use regex::Regex;

/// Chamber letter, optional type token, any number of "Res.", then the number.
static BILL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[SH]\.(?:\s?J\.|\s?R\.|\s?Con\.| ?)(?:\s?Res\.)*\s?\d+").unwrap()
});

/// Bill ids cited in `text`, e.g. "H. Con. Res. 12" → `hconres12-118`.
/// First-occurrence order, no repeats.
pub fn extract(text: &str, session: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for m in BILL_RE.find_iter(text) {
        let id = format!("{}-{}", bill_code(m.as_str()), session);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// "S. Con. Res. 5" → "sconres5".
fn bill_code(citation: &str) -> String {
    citation
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}
