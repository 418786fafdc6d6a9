/// Roll call vote ids cited in `text`.
///
/// The floor log does not cite roll call numbers in a stable form yet, so this
/// always comes back empty.
pub fn extract(_text: &str, _session: &str) -> Vec<String> {
    Vec::new()
}
