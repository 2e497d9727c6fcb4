//! Table view: one page of records as display rows

use serde::Serialize;

use gb_core::{GrantId, GrantRecord, PageState};

use crate::format::{format_money, truncate_chars};

const HEADERS: [&str; 5] = ["Название", "Регион", "Организация", "Статус", "Сумма гранта"];

/// Status label for a record
pub fn status_label(winner: bool) -> &'static str {
    if winner {
        "Победитель"
    } else {
        "Участник"
    }
}

/// A record formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// 1-based position within the filtered set
    pub number: usize,
    pub id: GrantId,
    pub name: String,
    pub region: String,
    pub organization: String,
    pub status: &'static str,
    pub amount: String,
}

impl TableRow {
    pub fn from_record(number: usize, record: &GrantRecord) -> Self {
        Self {
            number,
            id: record.id.clone(),
            name: record.name().unwrap_or_default().to_string(),
            region: record.region_or_empty().to_string(),
            organization: record.organization().unwrap_or_default().to_string(),
            status: status_label(record.winner),
            amount: format_money(record.requested_grant_amount),
        }
    }

    fn cells(&self) -> [&str; 5] {
        [&self.name, &self.region, &self.organization, self.status, &self.amount]
    }
}

/// Rows for the records of `page`, numbered from the page start
pub fn table_rows(page_records: &[GrantRecord], page: PageState) -> Vec<TableRow> {
    let first = (page.number() - 1) * page.size() + 1;
    page_records
        .iter()
        .enumerate()
        .map(|(offset, record)| TableRow::from_record(first + offset, record))
        .collect()
}

/// Configuration for table views
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub show_row_numbers: bool,
    /// Longer cells are cut with an ellipsis; 0 disables truncation
    pub max_cell_chars: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            max_cell_chars: 40,
        }
    }
}

/// Renders rows as a column-aligned text table
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub config: TableConfig,
}

impl TableView {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, rows: &[TableRow]) -> String {
        let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);

        let mut header: Vec<String> = Vec::new();
        if self.config.show_row_numbers {
            header.push("#".to_string());
        }
        header.extend(HEADERS.iter().map(|h| h.to_string()));
        lines.push(header);

        for row in rows {
            let mut line = Vec::new();
            if self.config.show_row_numbers {
                line.push(row.number.to_string());
            }
            line.extend(row.cells().iter().map(|cell| self.cell(cell)));
            lines.push(line);
        }

        let columns = lines[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|col| lines.iter().map(|line| line[col].chars().count()).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        for line in &lines {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| {
                    let pad = width - cell.chars().count();
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            out.push_str(padded.join(" | ").trim_end());
            out.push('\n');
        }
        out
    }

    fn cell(&self, text: &str) -> String {
        if self.config.max_cell_chars == 0 {
            text.to_string()
        } else {
            truncate_chars(text, self.config.max_cell_chars)
        }
    }
}
