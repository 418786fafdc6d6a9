pub mod blocks;
pub mod extract;
pub mod segment;
pub mod text;

use blocks::TitleNotFound;
use segment::Segmented;

/// Two-pass pipeline: HTML → role-tagged blocks → updates grouped by legislative day.
pub fn process_document(html: &str) -> Result<Segmented, TitleNotFound> {
    let blocks = blocks::parse_document(html)?;
    Ok(segment::group_by_day(&blocks))
}
