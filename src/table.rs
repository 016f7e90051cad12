//! Tables with a validated rectangular shape.
//!
//! Row 0 of a [`Table`] is its header.  The shape is checked once, when the table is constructed,
//! and the fields are private afterwards, so every table reachable from a document has rows of
//! equal length.

use std::fmt;

use thiserror::Error;

use crate::style::Style;

/// Shape errors raised when a table is constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedTableError {
    /// The table has no rows at all, not even a header.
    #[error("table has no header row")]
    Empty,
    /// The header row has no cells.
    #[error("table header has no columns")]
    NoColumns,
    /// A row does not have as many cells as the header.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Index of the offending row (the header is row 0).
        row: usize,
        /// Column count of the header.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },
}

/// The smallest addressable unit of a [`Table`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    text: String,
    style: Style,
}

impl Cell {
    /// Creates a cell without style overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::new(),
        }
    }

    /// Returns the text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the cell's own overrides.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Replaces the overrides and returns the updated cell.
    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A structured part of a table that [`Table::apply_style`] can address in one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// Every cell.
    All,
    /// The header row.
    Header,
    /// Every row but the header.
    Body,
    /// A single row (0 is the header).
    Row(usize),
    /// A single column.
    Column(usize),
    /// A single cell at `(row, column)`.
    Cell(usize, usize),
}

impl Region {
    fn contains(self, row: usize, column: usize) -> bool {
        match self {
            Region::All => true,
            Region::Header => row == 0,
            Region::Body => row > 0,
            Region::Row(r) => row == r,
            Region::Column(c) => column == c,
            Region::Cell(r, c) => row == r && column == c,
        }
    }
}

/// A rectangular table whose first row is the header.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
    header_style: Style,
    body_style: Style,
    bordered: bool,
}

impl Table {
    /// Validates `rows` and builds a table from them.
    ///
    /// Fails when there is no header row, when the header is empty, or when any row's length
    /// differs from the header's.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, MalformedTableError>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let expected = rows.first().ok_or(MalformedTableError::Empty)?.len();
        if expected == 0 {
            return Err(MalformedTableError::NoColumns);
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(MalformedTableError::RowLength {
                row,
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            rows,
            header_style: Style::new().bold(),
            body_style: Style::new(),
            bordered: true,
        })
    }

    /// Returns the number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Returns all rows, header first.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the header row.
    pub fn header(&self) -> &[Cell] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the rows after the header.
    pub fn body(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Returns the cell at `(row, column)`, if it exists.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Returns the style applied to every header cell.
    pub fn header_style(&self) -> &Style {
        &self.header_style
    }

    /// Returns the style applied to every body cell.
    pub fn body_style(&self) -> &Style {
        &self.body_style
    }

    /// Returns whether grid borders are drawn.
    pub fn is_bordered(&self) -> bool {
        self.bordered
    }

    /// Returns the style of the row-level layer for `row` (header or body).
    pub fn row_style(&self, row: usize) -> &Style {
        if row == 0 {
            &self.header_style
        } else {
            &self.body_style
        }
    }

    /// Returns the overrides for the cell at `(row, column)` layered over its row style.
    pub fn cell_style(&self, row: usize, column: usize) -> Style {
        match self.cell(row, column) {
            Some(cell) => cell.style.merged_over(self.row_style(row)),
            None => self.row_style(row).clone(),
        }
    }

    /// Replaces the header style and returns the updated table.
    pub fn with_header_style(mut self, style: Style) -> Self {
        self.header_style = style;
        self
    }

    /// Replaces the body style and returns the updated table.
    pub fn with_body_style(mut self, style: Style) -> Self {
        self.body_style = style;
        self
    }

    /// Enables or disables grid borders and returns the updated table.
    pub fn with_borders(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    /// Merges `style` into every cell of `region` and returns the number of cells touched.
    pub fn apply_style(&mut self, region: Region, style: &Style) -> usize {
        let mut touched = 0;
        for (row, cells) in self.rows.iter_mut().enumerate() {
            for (column, cell) in cells.iter_mut().enumerate() {
                if region.contains(row, column) {
                    cell.style.apply(style);
                    touched += 1;
                }
            }
        }
        touched
    }

    /// Plain text of the table, one tab-separated line per row.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(Cell::text)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
