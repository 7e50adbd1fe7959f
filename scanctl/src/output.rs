//! Terminal rendering of scan results.

use scan_intake::{Finding, ScanReport};

/// Shown to signed-out users at protected commands.
pub const SIGN_IN_PROMPT: &str = "Please sign in to scan your plugins.";

pub fn greeting(name: &str) -> String {
    format!("Welcome back, {}!", name)
}

/// Findings as an aligned table. Secrets are redacted.
pub fn render_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No secrets found.".to_string();
    }

    let rows: Vec<[String; 4]> = findings
        .iter()
        .map(|f| {
            [
                f.rule_id.clone(),
                f.location(),
                f.redacted_secret(),
                f.description.clone(),
            ]
        })
        .collect();

    let headers = ["RULE", "LOCATION", "SECRET", "DESCRIPTION"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = vec![format_row(headers, widths)];
    for row in &rows {
        out.push(format_row(
            [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ],
            widths,
        ));
    }
    out.join("\n")
}

fn format_row(cells: [&str; 4], widths: [usize; 4]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

pub fn print_report(report: &ScanReport) {
    println!("{}", report.message);
    println!("{}", render_findings(&report.findings));
}
