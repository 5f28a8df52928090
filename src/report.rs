//! Rendering the characters that need review.

use std::collections::BTreeMap;

use clap::ValueEnum;

use crate::models::Roster;

/// Names shorter than this are padded out to it in the MUSH report.
const NAME_COLUMN: usize = 10;

const MUSH_HEADER: &str =
    "+request Wiki cleanup=The following characters need to be reviewed for activity:%r%r";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// A `+request` command ready to paste into the MUSH
    #[default]
    Mush,
    /// One `name<TAB>url` line per character
    Plain,
    /// A JSON object of name to url
    Json,
}

/// Render `roster` in `format`, entries sorted by name.
pub fn render(roster: &Roster, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Mush => Ok(render_mush(roster)),
        ReportFormat::Plain => Ok(render_plain(roster)),
        ReportFormat::Json => {
            let sorted: BTreeMap<&str, &str> = roster.iter().collect();
            serde_json::to_string_pretty(&sorted)
        }
    }
}

/// MUSH softcode: `%t` is a tab, `%r` a newline, `[space(n)]` n spaces.
fn render_mush(roster: &Roster) -> String {
    let mut output = String::from(MUSH_HEADER);
    for (name, url) in roster.sorted() {
        output.push_str("%t");
        output.push_str(name);
        output.push_str(&name_padding(name));
        output.push_str(url);
        output.push_str(" %r");
    }
    output
}

fn name_padding(name: &str) -> String {
    if name.len() < NAME_COLUMN {
        format!("[space({})]", NAME_COLUMN - name.len())
    } else {
        " ".to_string()
    }
}

fn render_plain(roster: &Roster) -> String {
    roster
        .sorted()
        .into_iter()
        .map(|(name, url)| format!("{name}\t{url}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        [("Bob", "urlB"), ("Bartholomew", "urlBart")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_mush_report() {
        let output = render(&roster(), ReportFormat::Mush).unwrap();
        assert_eq!(
            output,
            format!("{MUSH_HEADER}%tBartholomew urlBart %r%tBob[space(7)]urlB %r")
        );
    }

    #[test]
    fn test_mush_report_for_empty_roster_is_just_the_header() {
        let output = render(&Roster::new(), ReportFormat::Mush).unwrap();
        assert_eq!(output, MUSH_HEADER);
    }

    #[test]
    fn test_padding_boundary() {
        assert_eq!(name_padding("Ninechars"), "[space(1)]");
        assert_eq!(name_padding("Tenchars!!"), " ");
    }

    #[test]
    fn test_plain_report() {
        let output = render(&roster(), ReportFormat::Plain).unwrap();
        assert_eq!(output, "Bartholomew\turlBart\nBob\turlB\n");
    }

    #[test]
    fn test_json_report() {
        let output = render(&roster(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "Bob": "urlB", "Bartholomew": "urlBart" })
        );
    }
}
