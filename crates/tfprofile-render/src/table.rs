use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Spaces between columns
const COLUMN_GAP: usize = 2;

/// Left-aligned text table
///
/// Widths are measured on the plain cell text, so styling never shifts
/// the alignment.
#[derive(Clone, Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Spacer row between groups
    pub fn add_blank_row(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn render(&self, theme: &Theme) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut out = String::new();
        out.push_str(&render_line(&self.headers, &widths, |_, text| theme.header(text)));
        for row in &self.rows {
            out.push_str(&render_line(row, &widths, |i, text| {
                if i == 0 {
                    theme.first_column(text)
                } else {
                    text.to_string()
                }
            }));
        }
        out
    }
}

fn render_line<F>(cells: &[String], widths: &[usize], style: F) -> String
where
    F: Fn(usize, &str) -> String,
{
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let text = cells.get(i).map_or("", String::as_str);
        if !text.is_empty() {
            line.push_str(&style(i, text));
        }
        if i + 1 < widths.len() {
            let pad = width - text.width() + COLUMN_GAP;
            line.push_str(&" ".repeat(pad));
        }
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_align_on_widest_cell() {
        let mut table = Table::new(["Key", "Value"]);
        table.add_row(["Number of resources", "4"]);
        table.add_blank_row();
        table.add_row(["Deepest module", "module.a"]);

        let rendered = table.render(&Theme::plain());
        let expected = "\
Key                  Value
Number of resources  4

Deepest module       module.a
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_wide_characters_are_measured_by_display_width() {
        let mut table = Table::new(["a", "b"]);
        table.add_row(["日本", "x"]);
        let rendered = table.render(&Theme::plain());
        assert_eq!(rendered, "a     b\n日本  x\n");
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        let table = Table::new(["resource", "n"]);
        assert_eq!(table.render(&Theme::plain()), "resource  n\n");
    }
}
