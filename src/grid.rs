//! Rectangular value grid with a header row.
//!
//! [`ValueGrid::from_rows`] is the single entry boundary for cell data: it
//! takes row 0 as the header, pads short data rows with empty cells and
//! truncates long ones, so everything downstream can index columns freely.

use log::{debug, warn};
use thiserror::Error;

use crate::data::CellValue;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no header row")]
    MissingHeader,
    #[error("header row does not contain any columns")]
    EmptyHeader,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueGrid {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ValueGrid {
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Result<Self, GridError> {
        if rows.is_empty() {
            return Err(GridError::MissingHeader);
        }
        let header_row = rows.remove(0);
        if header_row.is_empty() {
            return Err(GridError::EmptyHeader);
        }
        let headers = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name = cell.display();
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    format!("Column {}", idx + 1)
                } else {
                    trimmed.to_string()
                }
            })
            .collect::<Vec<_>>();
        let width = headers.len();

        let mut padded = 0usize;
        let mut truncated = 0usize;
        for row in &mut rows {
            if row.len() < width {
                padded += 1;
                row.resize(width, CellValue::Empty);
            } else if row.len() > width {
                truncated += 1;
                row.truncate(width);
            }
        }
        if padded > 0 || truncated > 0 {
            warn!(
                "Normalized ragged grid: padded {padded} row(s), truncated {truncated} row(s) to {width} column(s)"
            );
        }
        debug!("Grid ready with {} data row(s) and {width} column(s)", rows.len());
        Ok(Self { headers, rows })
    }

    /// Builds a grid from raw text rows, classifying each cell.
    pub fn from_text_rows<I, R, S>(rows: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row.into_iter()
                    .map(|cell| {
                        if row_idx == 0 {
                            CellValue::Text(cell.as_ref().to_string())
                        } else {
                            CellValue::from_raw(cell.as_ref())
                        }
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .or_else(|| {
                self.headers
                    .iter()
                    .position(|header| header.eq_ignore_ascii_case(name))
            })
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    pub fn column_values(&self, idx: usize) -> Vec<CellValue> {
        self.column(idx).cloned().collect()
    }

    /// Column cells with empties removed, the form the stats functions expect.
    pub fn non_empty_values(&self, idx: usize) -> Vec<CellValue> {
        self.column(idx).filter(|cell| !cell.is_empty()).cloned().collect()
    }
}
