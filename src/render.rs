//! Presentation helpers: the tag table and the download link.

use crate::model::Tag;

/// Join a locator onto the backend base URL with exactly one `/`.
///
/// The backend hands back locators with a leading slash (`/download`), and
/// base URLs are often configured with a trailing one.
///
/// Extension beyond the plain `{base}/{locator}` rule: a locator that is
/// already an absolute `http://` or `https://` URL is returned unchanged
/// instead of being appended to the base.
pub fn download_url(base: &str, locator: &str) -> String {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        return locator.to_string();
    }
    let base = base.trim_end_matches('/');
    let locator = locator.trim_start_matches('/');
    format!("{base}/{locator}")
}

/// Render tags as a two-column text table, one row per tag in the order
/// given.
///
/// Returns an empty string for an empty slice: with nothing extracted there
/// is no table to show.
///
/// ```rust
/// use pdfocr_client::{render::tag_table, Tag};
///
/// let table = tag_table(&[Tag::new("invoice", 3)]);
/// assert_eq!(table, "Tag     | Count\n--------+------\ninvoice | 3\n");
/// ```
pub fn tag_table(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return String::new();
    }

    const TAG_HEADER: &str = "Tag";
    const COUNT_HEADER: &str = "Count";

    let label_width = tags
        .iter()
        .map(|t| t.label.chars().count())
        .chain(std::iter::once(TAG_HEADER.len()))
        .max()
        .unwrap_or(TAG_HEADER.len());

    let mut out = String::new();
    out.push_str(&format!("{TAG_HEADER:<label_width$} | {COUNT_HEADER}\n"));
    out.push_str(&format!(
        "{}-+-{}\n",
        "-".repeat(label_width),
        "-".repeat(COUNT_HEADER.len())
    ));
    for tag in tags {
        out.push_str(&format!("{:<label_width$} | {}\n", tag.label, tag.count));
    }
    out
}

/// Rows as `label | count` without padding or header.
pub fn tag_rows(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .map(|t| format!("{} | {}", t.label, t.count))
        .collect()
}
