//! Best-effort scraper for the legacy HTML model overview page

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::ComprehensiveModel;

/// Lines scanned past a row opener that holds fewer than two cells
const LOOKAHEAD_LINES: usize = 8;

lazy_static! {
    static ref CELL: Regex =
        Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("Failed to compile cell regex");
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").expect("Failed to compile tag regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Failed to compile whitespace regex");
    static ref HEADER_CELL: Regex =
        Regex::new(r"(?i)<th\b").expect("Failed to compile header cell regex");
}

/// Parse every model row found in the page; unparseable rows are skipped
pub fn parse_models(html: &str) -> Vec<ComprehensiveModel> {
    let lines: Vec<&str> = html.lines().collect();
    let mut models = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let lower = line.to_ascii_lowercase();
        if !lower.contains("<tr") {
            i += 1;
            continue;
        }

        let mut row = line.to_string();
        let mut cells = extract_cells(&row);
        i += 1;

        if cells.len() < 2 && !lower.contains("</tr") {
            let end = (i + LOOKAHEAD_LINES).min(lines.len());
            while i < end {
                row.push('\n');
                row.push_str(lines[i]);
                i += 1;
                if lines[i - 1].to_ascii_lowercase().contains("</tr") {
                    break;
                }
            }
            cells = extract_cells(&row);
        }

        if HEADER_CELL.is_match(&row) {
            continue;
        }

        if let Some(model) = to_model(cells) {
            models.push(model);
        }
    }

    models
}

fn extract_cells(row: &str) -> Vec<String> {
    CELL.captures_iter(row)
        .map(|caps| clean_cell(caps.get(1).map_or("", |m| m.as_str())))
        .collect()
}

fn clean_cell(raw: &str) -> String {
    let text = TAG.replace_all(raw, " ");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn to_model(cells: Vec<String>) -> Option<ComprehensiveModel> {
    if cells.len() < 2 || cells[0].is_empty() {
        return None;
    }

    let mut cells = cells.into_iter();
    let model_id = cells.next().unwrap_or_default();
    let status = cells.next().unwrap_or_default();
    let mut next = || cells.next().filter(|c| !c.is_empty());
    Some(ComprehensiveModel {
        model_id,
        status,
        version: next(),
        instance: next(),
        server: next(),
        last_update: next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_rows() {
        let html = r#"
<table>
<tr><th>Model</th><th>Status</th><th>Version</th></tr>
<tr><td>EA2_800</td><td><b>Up</b></td><td>8.0</td><td>inst-1</td><td>srv01</td><td>2024-05-01 10:00</td></tr>
<tr><td>EA3_900</td><td>Down</td></tr>
</table>"#;

        let models = parse_models(html);
        assert_eq!(models.len(), 2);
        assert_eq!(
            models[0],
            ComprehensiveModel {
                model_id: "EA2_800".into(),
                status: "Up".into(),
                version: Some("8.0".into()),
                instance: Some("inst-1".into()),
                server: Some("srv01".into()),
                last_update: Some("2024-05-01 10:00".into()),
            }
        );
        assert_eq!(models[1].status, "Down");
        assert_eq!(models[1].version, None);
    }

    #[test]
    fn test_multi_line_row_and_split_cell() {
        let html = "<tr>\n  <td>EA2_800</td>\n  <td>\n    Up &amp; running\n  </td>\n  <td>8.0</td>\n</tr>\n";

        let models = parse_models(html);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_id, "EA2_800");
        assert_eq!(models[0].status, "Up & running");
        assert_eq!(models[0].version.as_deref(), Some("8.0"));
    }

    #[test]
    fn test_multi_line_header_is_skipped() {
        let html = "<tr>\n<th>Model</th>\n<th>Status</th>\n</tr>\n<tr><td>M1</td><td>Up</td></tr>";
        let models = parse_models(html);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_id, "M1");
    }

    #[test]
    fn test_row_sharing_line_with_thead_is_kept() {
        let html = "<table><thead><tr><td>M1</td><td>Up</td></tr>\n<tr><th>Model</th><th>Status</th></tr>";
        let models = parse_models(html);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_id, "M1");
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let mut html = String::from("<tr>\n<td>M1</td>\n");
        for _ in 0..10 {
            html.push_str("<!-- padding -->\n");
        }
        html.push_str("<td>Up</td>\n</tr>\n");

        assert!(parse_models(&html).is_empty());
    }

    #[test]
    fn test_rows_with_empty_first_cell_are_dropped() {
        let html = "<tr><td>&nbsp;</td><td>Up</td></tr>\n<tr><td>only one</td></tr>";
        assert!(parse_models(html).is_empty());
    }

    #[test]
    fn test_garbage_input() {
        assert!(parse_models("").is_empty());
        assert!(parse_models("not html at all\n<tr").is_empty());
    }
}
