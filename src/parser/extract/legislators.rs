/// Bioguide ids of legislators named in `text`. Always empty for now: the log
/// names senators in free form and there is no roster to resolve them against.
pub fn extract(_text: &str) -> Vec<String> {
    Vec::new()
}
