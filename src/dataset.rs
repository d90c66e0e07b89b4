// Dataset module: loads the comma-delimited table with every cell kept as
// text, attaches a label column and writes the table back in place.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::info;

use crate::error::{LabelError, Result};

/// In-memory copy of the table. Rows keep their original order and every
/// row has exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Read the whole file. A ragged row or unreadable file is a load error.
    pub fn load(path: &Path) -> Result<Self> {
        let load_err = |source| LabelError::Load {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(load_err)?;
        let headers = reader
            .headers()
            .map_err(load_err)?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record: StringRecord = record.map_err(load_err)?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        info!(
            "loaded {} rows x {} columns from {}",
            rows.len(),
            headers.len(),
            path.display()
        );
        Ok(Dataset {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Every value of column `name`, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| LabelError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Name of the column the next session writes into: the prefix followed by
    /// the column count minus the two metadata columns. The subtraction is
    /// signed, so a single-column table yields `<prefix>-1`.
    pub fn next_label_column(&self, prefix: &str) -> String {
        let slot = self.headers.len() as i64 - 2;
        format!("{prefix}{slot}")
    }

    /// Attach `cells` as column `name`, replacing the values of an existing
    /// column with that name. Missing cells are padded with empty strings and
    /// surplus cells are dropped so the table stays rectangular.
    pub fn set_column(&mut self, name: &str, cells: Vec<String>) {
        let mut cells = cells.into_iter();
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = cells.next().unwrap_or_default();
                }
            }
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(cells.next().unwrap_or_default());
                }
            }
        }
    }

    /// Overwrite `path` with the headers and rows. No index column is emitted
    /// and lines end in `\n`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let save_err = |source| LabelError::Save {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_path(path)
            .map_err(save_err)?;
        writer.write_record(&self.headers).map_err(save_err)?;
        for row in &self.rows {
            writer.write_record(row).map_err(save_err)?;
        }
        writer
            .flush()
            .map_err(|e| save_err(csv::Error::from(e)))?;
        Ok(())
    }
}
