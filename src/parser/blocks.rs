use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::text::clean_text;

static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Either label marks the title paragraph; its parent scopes the log.
pub const TITLE_LABELS: &[&str] = &["SENATE FLOOR PROCEEDINGS", "TODAY'S SENATE FLOOR LOG"];

/// Layout role of a paragraph, taken from its `align` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `align="center"`: a legislative day header.
    Centered,
    /// `align="left"`: a floor update body.
    Left,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub text: String,
    pub role: Role,
}

impl Block {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

#[derive(Debug, Error)]
#[error("title paragraph not found (expected one of: {})", TITLE_LABELS.join(", "))]
pub struct TitleNotFound;

/// Parse the floor log HTML into the ordered paragraphs sharing the title's scope.
///
/// The title paragraph itself is included; the segmenter drops it along with the
/// other page decorations.
pub fn parse_document(html: &str) -> Result<Vec<Block>, TitleNotFound> {
    let doc = Html::parse_document(html);
    let title = find_title(&doc).ok_or(TitleNotFound)?;
    let scope = title
        .parent()
        .and_then(ElementRef::wrap)
        .ok_or(TitleNotFound)?;

    Ok(scope.select(&P_SEL).map(to_block).collect())
}

fn find_title(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&P_SEL).find(|p| {
        let text = clean_text(&element_text(p)).to_uppercase();
        TITLE_LABELS.contains(&text.as_str())
    })
}

fn to_block(p: ElementRef<'_>) -> Block {
    let role = match p.value().attr("align") {
        Some(a) if a.trim().eq_ignore_ascii_case("center") => Role::Centered,
        Some(a) if a.trim().eq_ignore_ascii_case("left") => Role::Left,
        _ => Role::Other,
    };
    Block::new(role, element_text(&p))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn scopes_to_title_parent() {
        let blocks = parse_document(&fixture("floor_log")).unwrap();
        assert!(blocks.iter().all(|b| !b.text.contains("Outside the log")));
        assert_eq!(blocks.first().map(|b| b.text.trim()), Some("Senate Floor Proceedings"));
    }

    #[test]
    fn classifies_roles_by_alignment() {
        let blocks = parse_document(&fixture("floor_log")).unwrap();
        let headers: Vec<_> = blocks
            .iter()
            .filter(|b| b.role == Role::Centered)
            .map(|b| clean_text(&b.text))
            .collect();
        assert_eq!(headers, vec!["Monday, March 4, 2024", "Tuesday, March 5, 2024"]);
        assert!(blocks.iter().any(|b| b.role == Role::Other));
        assert_eq!(blocks.iter().filter(|b| b.role == Role::Left).count(), 5);
    }

    #[test]
    fn alternate_title_label_is_case_insensitive() {
        let html = r#"<html><body><div>
            <p>Today&rsquo;s Senate Floor Log</p>
            <p align="CENTER">March 3, 2024</p>
            <p align="left">Senate convened.</p>
        </div></body></html>"#;
        let blocks = parse_document(html).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].role, Role::Centered);
        assert_eq!(blocks[2], Block::new(Role::Left, "Senate convened."));
    }

    #[test]
    fn missing_title_is_an_error() {
        let html = r#"<html><body><p align="center">March 3, 2024</p></body></html>"#;
        assert!(parse_document(html).is_err());
    }
}
