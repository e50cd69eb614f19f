use colored::Colorize;

/// Lay out rows under headers as aligned, `|`-separated columns.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.len(), usize::max)
        })
        .collect();

    let render_line = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = col_widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header_line = render_line(headers.to_vec());
    let mut lines = vec![header_line.clone(), "-".repeat(header_line.len())];
    lines.extend(
        rows.iter()
            .map(|row| render_line(row.iter().map(String::as_str).collect())),
    );
    lines
}

/// Format a table with columns and rows
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) {
    let lines = render_table(headers, rows);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// Format a header
pub fn print_header(text: &str) {
    println!();
    println!("{}", text.bold().bright_cyan());
    println!("{}", "=".repeat(text.len()));
    println!();
}

/// Format a section
pub fn print_section(text: &str) {
    println!();
    println!("{}", text.bold().bright_white());
    println!("{}", "-".repeat(text.len()));
}

/// Format BigDecimal with 2 decimal places
pub fn format_decimal(value: &bigdecimal::BigDecimal) -> String {
    let scale = 2;
    let rounded = value.with_scale_round(scale, bigdecimal::RoundingMode::HalfUp);
    rounded.to_string()
}

/// Format a key-value pair for display
pub fn format_kv(key: &str, value: &str) -> String {
    format!("{}: {}", key.bright_cyan(), value)
}
