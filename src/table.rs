use std::fmt::Write;

use serde::Serialize;

use crate::models::{Counselor, Event, Institution, Student, User};

pub const PLACEHOLDER: &str = "-";

/// A record with a unique identity used as its row key.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),+) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

identified!(Institution, Student, Counselor, User, Event);

type Accessor<'a, T> = Box<dyn Fn(&T) -> Option<String> + 'a>;

pub struct Column<'a, T> {
    pub key: &'static str,
    pub header: &'static str,
    accessor: Accessor<'a, T>,
}

impl<'a, T> Column<'a, T> {
    /// A column whose cell may be absent; absent or empty cells render the
    /// placeholder.
    pub fn new(
        key: &'static str,
        header: &'static str,
        accessor: impl Fn(&T) -> Option<String> + 'a,
    ) -> Self {
        Column {
            key,
            header,
            accessor: Box::new(accessor),
        }
    }

    pub fn text(
        key: &'static str,
        header: &'static str,
        render: impl Fn(&T) -> String + 'a,
    ) -> Self {
        Column::new(key, header, move |record| Some(render(record)))
    }

    fn cell(&self, record: &T) -> String {
        match (self.accessor)(record) {
            Some(value) if !value.is_empty() => value,
            _ => PLACEHOLDER.to_string(),
        }
    }
}

pub struct Table<'a, T> {
    columns: Vec<Column<'a, T>>,
    on_row_click: Option<Box<dyn FnMut(&T) + 'a>>,
}

impl<'a, T: Identified> Table<'a, T> {
    /// Column keys must be unique within a table.
    pub fn new(columns: Vec<Column<'a, T>>) -> Self {
        debug_assert!(
            columns
                .iter()
                .enumerate()
                .all(|(i, column)| columns[..i].iter().all(|other| other.key != column.key)),
            "duplicate column key"
        );
        Table {
            columns,
            on_row_click: None,
        }
    }

    pub fn on_row_click(mut self, callback: impl FnMut(&T) + 'a) -> Self {
        self.on_row_click = Some(Box::new(callback));
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.key.to_string())
            .collect()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.header.to_string())
            .collect()
    }

    /// Renders `records` in the given order under the configured columns.
    pub fn project<'r, I>(&self, records: I) -> RenderedTable
    where
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        let rows = records
            .into_iter()
            .map(|record| RenderedRow {
                key: record.id().to_string(),
                cells: self.columns.iter().map(|column| column.cell(record)).collect(),
            })
            .collect();

        RenderedTable {
            keys: self.keys(),
            headers: self.headers(),
            rows,
        }
    }

    /// Dispatches a click on the row keyed `row_key`. Returns false when no
    /// row carries that key or no callback is registered.
    pub fn click<'r, I>(&mut self, records: I, row_key: &str) -> bool
    where
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        let Some(callback) = self.on_row_click.as_mut() else {
            return false;
        };
        match records.into_iter().find(|record| record.id() == row_key) {
            Some(record) => {
                callback(record);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub key: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTable {
    /// Column keys, parallel to `headers`.
    pub keys: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    pub fn to_text(&self) -> String {
        let widths = self.widths();
        let mut output = String::new();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let _ = writeln!(output, "{}", line(self.headers.as_slice()));
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        let _ = writeln!(output, "{}", rule.join("  "));
        for row in &self.rows {
            let _ = writeln!(output, "{}", line(row.cells.as_slice()));
        }
        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let escape = |cell: &String| cell.replace('|', "\\|");

        let headers: Vec<String> = self.headers.iter().map(escape).collect();
        let _ = writeln!(output, "| {} |", headers.join(" | "));
        let _ = writeln!(output, "|{}", "---|".repeat(self.headers.len()));
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(escape).collect();
            let _ = writeln!(output, "| {} |", cells.join(" | "));
        }
        output
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(&row.cells)?;
        }
        let bytes = writer.into_inner()?;
        Ok(String::from_utf8(bytes)?)
    }
}
