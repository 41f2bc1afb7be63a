//! Roster reading: CSV rows → [`EmployeeRecord`]s in file order.
//!
//! The header row maps column names to positions; `name`, `title` and
//! `photo_path` must be present (any order, extra columns ignored). Every
//! data row becomes one record, even when fields are blank or the row is
//! short. Deciding whether a record is usable is the renderer's job, so the
//! run summary can say *why* a row produced no card.

use crate::error::IdCardError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info};

/// Columns every roster must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "title", "photo_path"];

/// One roster row, fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    /// 1-indexed data row (the header is row 0).
    pub row: usize,
    /// Line in the file where the row starts.
    pub line: u64,
    pub name: String,
    pub title: String,
    /// Photo location relative to the configured photo directory.
    pub photo_path: String,
}

impl EmployeeRecord {
    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("name", &self.name),
            ("title", &self.title),
            ("photo_path", &self.photo_path),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field.to_string())
        .collect()
    }

    /// A record is valid when every required field is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.title.is_empty() && !self.photo_path.is_empty()
    }
}

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    name: usize,
    title: usize,
    photo_path: usize,
}

impl ColumnMap {
    fn from_headers(path: &Path, headers: &StringRecord) -> Result<Self, IdCardError> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        match (find("name"), find("title"), find("photo_path")) {
            (Some(name), Some(title), Some(photo_path)) => Ok(Self {
                name,
                title,
                photo_path,
            }),
            _ => Err(IdCardError::MissingColumns {
                path: path.to_path_buf(),
                missing: REQUIRED_COLUMNS
                    .iter()
                    .copied()
                    .filter(|c| find(*c).is_none())
                    .map(|c| c.to_string())
                    .collect(),
                found: headers.iter().map(str::to_string).collect(),
            }),
        }
    }

    fn extract(&self, row: usize, line: u64, record: &StringRecord) -> EmployeeRecord {
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        EmployeeRecord {
            row,
            line,
            name: field(self.name),
            title: field(self.title),
            photo_path: field(self.photo_path),
        }
    }
}

/// Read every data row of the roster at `path`.
///
/// # Errors
/// - [`IdCardError::RecordsNotFound`] when `path` is not a file
/// - [`IdCardError::MissingColumns`] when the header lacks a required column
/// - [`IdCardError::RecordsRead`] on I/O, UTF-8 or CSV syntax errors
pub fn read_records(path: &Path) -> Result<Vec<EmployeeRecord>, IdCardError> {
    if !path.is_file() {
        return Err(IdCardError::RecordsNotFound {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source: csv::Error| IdCardError::RecordsRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    debug!("Roster headers: {:?}", headers.iter().collect::<Vec<_>>());
    let columns = ColumnMap::from_headers(path, &headers)?;

    let mut records = Vec::new();
    let mut raw = StringRecord::new();
    while reader.read_record(&mut raw).map_err(read_err)? {
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let record = columns.extract(records.len() + 1, line, &raw);
        debug!("Row {} (line {}): {:?}", record.row, line, record);
        records.push(record);
    }

    info!("Read {} roster rows from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("staff.csv");
        fs::write(&path, contents).expect("write csv");
        (dir, path)
    }

    #[test]
    fn reads_rows_in_order_with_trimming() {
        let (_dir, path) = write_csv(
            "name,title,photo_path\n  Ada Lovelace , Analyst ,ada.png\nGrace Hopper,Admiral,grace.jpg\n",
        );
        let records = read_records(&path).expect("read");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Ada Lovelace");
        assert_eq!(records[0].title, "Analyst");
        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].photo_path, "grace.jpg");
        assert_eq!(records[1].row, 2);
    }

    #[test]
    fn reader_trims_headers_and_fields() {
        let (_dir, path) =
            write_csv(" name ,\ttitle\t, photo_path\n\tAda\t,  Analyst,ada.png  \n");
        let records = read_records(&path).expect("read");
        assert_eq!(records[0].name, "Ada");
        assert_eq!(records[0].title, "Analyst");
        assert_eq!(records[0].photo_path, "ada.png");
    }

    #[test]
    fn column_order_and_extras_do_not_matter() {
        let (_dir, path) =
            write_csv("employee_id,photo_path,title,name\n7,ada.png,Analyst,Ada\n");
        let records = read_records(&path).expect("read");
        assert_eq!(records[0].name, "Ada");
        assert_eq!(records[0].title, "Analyst");
        assert_eq!(records[0].photo_path, "ada.png");
    }

    #[test]
    fn missing_column_is_schema_error() {
        let (_dir, path) = write_csv("name,title\nAda,Analyst\n");
        match read_records(&path).unwrap_err() {
            IdCardError::MissingColumns { missing, found, .. } => {
                assert_eq!(missing, vec!["photo_path".to_string()]);
                assert_eq!(found, vec!["name".to_string(), "title".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_short_rows_pass_through() {
        let (_dir, path) = write_csv("name,title,photo_path\n   ,Analyst,a.png\nBob\n");
        let records = read_records(&path).expect("read");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].missing_fields(), vec!["name".to_string()]);
        assert_eq!(
            records[1].missing_fields(),
            vec!["title".to_string(), "photo_path".to_string()]
        );
        assert!(!records[1].is_valid());
    }

    #[test]
    fn header_only_roster_is_empty() {
        let (_dir, path) = write_csv("name,title,photo_path\n");
        assert!(read_records(&path).expect("read").is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_records(Path::new("/no/such/roster.csv")).unwrap_err();
        assert!(matches!(err, IdCardError::RecordsNotFound { .. }));
    }

    #[test]
    fn invalid_utf8_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("staff.csv");
        fs::write(&path, b"name,title,photo_path\nAda,\xff\xfe,a.png\n").expect("write");
        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, IdCardError::RecordsRead { .. }), "got: {err}");
    }
}
