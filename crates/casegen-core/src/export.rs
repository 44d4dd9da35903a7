//! Download and sharing helpers for generated output.

use crate::error::Result;
use crate::paths;
use crate::record::ProjectRecord;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

pub const SHARE_SUBJECT: &str = "Test Cases Generated";
const PREVIEW_INTRO: &str = "See the test output below:\n\n";
const PREVIEW_CHARS: usize = 1500;

/// Lines that look like numbered test cases: non-blank and starting with a
/// digit.
pub fn numbered_rows(output: &str) -> Vec<&str> {
    output
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .collect()
}

/// One-column CSV of the numbered rows, or `None` when there are none.
pub fn to_csv(output: &str) -> Result<Option<String>> {
    let rows = numbered_rows(output);
    if rows.is_empty() {
        return Ok(None);
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Test Case"])?;
    for row in rows {
        writer.write_record([row])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Body text used for share links and the email preview.
pub fn email_preview(output: &str) -> String {
    let head: String = output.chars().take(PREVIEW_CHARS).collect();
    format!("{PREVIEW_INTRO}{head}")
}

/// `mailto:` link that opens a draft containing the output preview.
pub fn mailto_link(output: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        utf8_percent_encode(SHARE_SUBJECT, NON_ALPHANUMERIC),
        utf8_percent_encode(&email_preview(output), NON_ALPHANUMERIC)
    )
}

/// Suggested file name for downloading `record` as `ext`.
pub fn download_name(record: &ProjectRecord, ext: &str) -> String {
    format!(
        "{}_{}.{ext}",
        paths::sanitize_title(&record.title),
        record.timestamp
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\nTest cases:\n1. Open the login page\n\n2. Enter \"valid\" credentials, submit\n  3. indented is not a row\n```js\ncy.visit('/')\n```\n10. Tenth case\n";

    #[test]
    fn numbered_rows_keep_digit_prefixed_lines() {
        assert_eq!(
            numbered_rows(OUTPUT),
            vec![
                "1. Open the login page",
                "2. Enter \"valid\" credentials, submit",
                "10. Tenth case",
            ]
        );
    }

    #[test]
    fn csv_quotes_fields_that_need_it() {
        let csv = to_csv(OUTPUT).unwrap().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Test Case"));
        assert_eq!(lines.next(), Some("1. Open the login page"));
        assert_eq!(
            lines.next(),
            Some("\"2. Enter \"\"valid\"\" credentials, submit\"")
        );
        assert_eq!(lines.next(), Some("10. Tenth case"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_is_none_without_numbered_rows() {
        assert_eq!(to_csv("Scenario: nothing numbered").unwrap(), None);
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short", 400), "short");
    }

    #[test]
    fn email_preview_is_capped() {
        let long = "x".repeat(2000);
        let body = email_preview(&long);
        assert!(body.starts_with("See the test output below:\n\n"));
        assert_eq!(body.len(), PREVIEW_INTRO.len() + PREVIEW_CHARS);
    }

    #[test]
    fn mailto_link_is_percent_encoded() {
        let link = mailto_link("1. a&b");
        assert!(link.starts_with("mailto:?subject=Test%20Cases%20Generated&body="));
        assert!(link.contains("See%20the%20test%20output%20below%3A%0A%0A1%2E%20a%26b"));
        assert!(!link.contains(' '));
    }
}
