//! In-memory string table.
//!
//! Cells are kept as the exact text read from the file so that every input
//! column can be written back unmodified next to the predictions.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that every row has one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(AppError::data(format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate one column top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Copy of this table without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !names.contains(&self.headers[i].as_str()))
            .collect();

        Table {
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Rewrite every cell of an existing column in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), AppError>
    where
        F: FnMut(&str) -> Result<String, AppError>,
    {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AppError::data(format!("Missing required column: `{name}`")))?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }

    /// Append a column. `values` must have one entry per row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<(), AppError> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(AppError::data(format!(
                "column `{name}` has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        self.headers.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

/// Read a comma-delimited file with a header row.
pub fn read_csv(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::data(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::data(format!("'{}' has no header row", path.display())));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::data(format!("CSV parse error at line {line}: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Table::new(headers, rows)
}

/// Write `table` to `path`, replacing any existing file.
///
/// The table is first written to a sibling temporary file and then renamed
/// over `path`, so a failed write never leaves a truncated output behind.
pub fn write_csv_atomic(path: &Path, table: &Table) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }

    let tmp = temp_sibling(path);
    let written = write_csv(&tmp, table).and_then(|()| fs::rename(&tmp, path).map_err(|e| AppError::io(path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    let csv_err = |e: csv::Error| match e.into_kind() {
        csv::ErrorKind::Io(source) => AppError::io(path, source),
        other => AppError::io(path, std::io::Error::other(format!("{other:?}"))),
    };

    writer.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| AppError::io(path, e))?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".partial");
    path.with_file_name(name)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec!["1".into(), "x".into(), "p".into()],
                vec!["2".into(), "y".into(), "q".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(vec!["a".into(), "b".into()], vec![vec!["1".into()]]).unwrap_err();
        assert!(matches!(err, AppError::DataFormat(_)));
    }

    #[test]
    fn without_columns_keeps_order() {
        let t = sample().without_columns(&["b", "missing"]);
        assert_eq!(t.headers(), ["a", "c"]);
        assert_eq!(t.rows()[1], ["2", "q"]);
    }

    #[test]
    fn push_column_checks_length() {
        let mut t = sample();
        assert!(t.push_column("d", vec!["only-one".into()]).is_err());
        t.push_column("d", vec!["u".into(), "v".into()]).unwrap();
        assert_eq!(t.n_cols(), 4);
        assert_eq!(t.column("d").unwrap().collect::<Vec<_>>(), ["u", "v"]);
    }

    #[test]
    fn csv_round_trip_preserves_cell_text() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        fs::write(&src, "\u{feff}name,zip\n\"Smith, J\",00501\n  padded ,1234\n").unwrap();

        let table = read_csv(&src).unwrap();
        assert_eq!(table.headers(), ["name", "zip"]);
        assert_eq!(table.rows()[0], ["Smith, J", "00501"]);
        assert_eq!(table.rows()[1], ["  padded ", "1234"]);

        let out = dir.path().join("nested/out.csv");
        write_csv_atomic(&out, &table).unwrap();
        assert_eq!(read_csv(&out).unwrap(), table);
        assert!(!dir.path().join("nested/out.csv.partial").exists());
    }

    #[test]
    fn missing_file_is_data_error() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AppError::DataFormat(_)));
    }
}
