//! Table output formatting

use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format rows as a table, or "No results found." when there are none
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    format_table_or(data, "No results found.")
}

/// Format rows as a table, or `empty` when there are none
pub fn format_table_or<T: Tabled>(data: &[T], empty: &str) -> String {
    if data.is_empty() {
        return empty.to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Two-column table of labels and values, without a header row
pub fn format_key_values(rows: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value.clone()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
