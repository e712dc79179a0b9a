//! Pipe-table tidying
//!
//! Re-aligns the columns of Markdown pipe tables so every row pads its
//! cells to a uniform width, and applies the configured header emphasis.
//! Beyond that emphasis, cell content is never changed, only the
//! whitespace and dash padding around it.

use crate::config::TablesConfig;

/// Column alignment, read from the delimiter row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// Tidy every pipe table outside fenced code, returning the rewritten
/// Markdown and the number of tables touched.
///
/// `pipe` is the only table format with a writer; any other
/// `tables.format` value leaves the document unchanged.
pub fn tidy_pipe_tables(markdown: &str, options: &TablesConfig) -> (String, usize) {
    if options.format != "pipe" {
        tracing::warn!(
            "table format `{}` has no writer, leaving tables as-is",
            options.format
        );
        return (markdown.to_string(), 0);
    }
    let bold_headers = options.header_style == "bold";

    let mut out: Vec<String> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut tables = 0;
    let mut in_fence = false;

    let flush = |block: &mut Vec<&str>, out: &mut Vec<String>, tables: &mut usize| {
        if is_table_block(block) {
            out.extend(reformat_table(block, bold_headers));
            *tables += 1;
        } else {
            out.extend(block.iter().map(|l| l.to_string()));
        }
        block.clear();
    };

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            flush(&mut block, &mut out, &mut tables);
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }
        if !in_fence && trimmed.starts_with('|') {
            block.push(line);
            continue;
        }
        flush(&mut block, &mut out, &mut tables);
        out.push(line.to_string());
    }
    flush(&mut block, &mut out, &mut tables);

    let mut text = out.join("\n");
    if markdown.ends_with('\n') {
        text.push('\n');
    }
    (text, tables)
}

/// A block is a table when its second line is a delimiter row
fn is_table_block(block: &[&str]) -> bool {
    block.len() >= 2 && is_delimiter_row(block[1])
}

fn is_delimiter_row(line: &str) -> bool {
    let trimmed = line.trim();
    let mut saw_dash = false;
    for c in trimmed.chars() {
        match c {
            '-' => saw_dash = true,
            '|' | ':' | ' ' | '\t' => {}
            _ => return false,
        }
    }
    saw_dash
}

/// Split a row into trimmed cells, honoring `\|` escapes
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('|')
        .unwrap_or(trimmed)
        .strip_suffix('|')
        .unwrap_or_else(|| trimmed.strip_prefix('|').unwrap_or(trimmed));

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn parse_alignment(cell: &str) -> Alignment {
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    }
}

/// Wrap a header cell in `**`, unless it is empty or already emphasized
fn embolden(cell: &str) -> String {
    if cell.is_empty() || (cell.len() >= 4 && cell.starts_with("**") && cell.ends_with("**")) {
        cell.to_string()
    } else {
        format!("**{cell}**")
    }
}

fn reformat_table(block: &[&str], bold_headers: bool) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = block.iter().map(|l| split_cells(l)).collect();
    if bold_headers {
        let header: Vec<String> = rows[0].iter().map(|c| embolden(c)).collect();
        rows[0] = header;
    }
    let alignments: Vec<Alignment> = rows[1].iter().map(|c| parse_alignment(c)).collect();
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

    // Width of each column: widest content cell, with room for the
    // shortest legal delimiter
    let mut widths = vec![3usize; columns];
    for (i, row) in rows.iter().enumerate() {
        if i == 1 {
            continue;
        }
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    block
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let mut line = String::from("|");
            for col in 0..columns {
                if i == 1 {
                    let align = alignments.get(col).copied().unwrap_or(Alignment::None);
                    line.push(' ');
                    line.push_str(&delimiter_cell(align, widths[col]));
                    line.push_str(" |");
                } else {
                    let empty = String::new();
                    let cell = rows[i].get(col).unwrap_or(&empty);
                    let pad = widths[col] - cell.chars().count();
                    line.push(' ');
                    line.push_str(cell);
                    line.push_str(&" ".repeat(pad));
                    line.push_str(" |");
                }
            }
            line
        })
        .collect()
}

fn delimiter_cell(align: Alignment, width: usize) -> String {
    match align {
        Alignment::None => "-".repeat(width),
        Alignment::Left => format!(":{}", "-".repeat(width.saturating_sub(1))),
        Alignment::Right => format!("{}:", "-".repeat(width.saturating_sub(1))),
        Alignment::Center => format!(":{}:", "-".repeat(width.saturating_sub(2))),
    }
}

// ============================================================
// Tests
// ============================================================
