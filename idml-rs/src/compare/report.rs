//! Human-readable rendering of difference lists.

use super::difference::Difference;

/// Renders differences as a numbered report.
///
/// An empty list renders as `No differences found`. Otherwise a
/// `Found N difference(s):` header is followed by one block per
/// difference, blocks separated by a blank line.
pub fn format_differences(differences: &[Difference]) -> String {
    if differences.is_empty() {
        return "No differences found".to_string();
    }

    let entries: Vec<String> = differences
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {}", i + 1, d))
        .collect();

    format!(
        "Found {} difference(s):\n{}",
        differences.len(),
        entries.join("\n\n")
    )
}
