use serde::Serialize;
use std::io::Write;

/// Pretty-printed JSON on stdout, newline terminated.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Horizontal rule used around console reports and banners.
pub fn rule() -> String {
    "=".repeat(60)
}

/// Left-aligned columns separated by two spaces, with a dashed underline
/// beneath the headers. Widths count chars so emoji and accents line up.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    for line in render_table(headers, rows) {
        println!("{line}");
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let dashes: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_line(headers.iter().copied(), &widths));
    lines.push(pad_line(dashes.iter().map(String::as_str), &widths));
    for row in rows {
        lines.push(pad_line(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_pad_to_widest_cell() {
        let rows = vec![
            vec!["ok".to_string(), "Slash commands".to_string(), ".claude/commands/".to_string()],
            vec!["MISSING".to_string(), "Hooks".to_string(), ".claude/hooks/".to_string()],
        ];
        let lines = render_table(&["STATUS", "COMPONENT", "PATH"], &rows);
        assert_eq!(lines[0], "STATUS   COMPONENT       PATH");
        assert_eq!(lines[1], "-------  --------------  -----------------");
        assert_eq!(lines[2], "ok       Slash commands  .claude/commands/");
        assert_eq!(lines[3], "MISSING  Hooks           .claude/hooks/");
    }
}
