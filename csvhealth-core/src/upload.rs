//! Upload file selection: CSV filter, size limit, and file summary.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::fs::FileSystem;

/// Largest file accepted for upload (50 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
/// MIME type sent with the uploaded file.
pub const CSV_MIME: &str = "text/csv";

/// Reason a candidate file was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRejected {
    /// The file is not a CSV by extension or MIME type.
    NotCsv {
        /// File name as given.
        name: String,
    },
    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Accepted maximum in bytes.
        limit: u64,
    },
    /// The file could not be read.
    Unreadable(String),
    /// A submission is in flight.
    Busy,
    /// A result is on screen; start a new analysis first.
    ResultShown,
}

impl fmt::Display for SelectionRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCsv { name } => write!(f, "{name} is not a .csv file"),
            Self::TooLarge { size, limit } => write!(
                f,
                "file is {} but the limit is {}",
                format_size(*size),
                format_size(*limit)
            ),
            Self::Unreadable(reason) => write!(f, "file could not be read: {reason}"),
            Self::Busy => write!(f, "an analysis is already in progress"),
            Self::ResultShown => write!(f, "results are shown; start a new analysis first"),
        }
    }
}

impl Error for SelectionRejected {}

/// A CSV file accepted for upload, with its contents loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
    size_bytes: u64,
    contents: Arc<[u8]>,
    row_count: usize,
}

impl SelectedFile {
    /// Accept in-memory contents under `name`, applying the same filter as
    /// [`select_csv`].
    pub fn from_bytes(
        name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Result<Self, SelectionRejected> {
        let name = name.into();
        if !is_csv_candidate(&name, None) {
            return Err(SelectionRejected::NotCsv { name });
        }
        let contents: Vec<u8> = contents.into();
        let size = contents.len() as u64;
        check_size(size)?;
        Ok(Self::build(PathBuf::from(&name), name, contents))
    }

    fn build(path: PathBuf, name: String, contents: Vec<u8>) -> Self {
        let row_count = count_rows(&contents);
        Self {
            path,
            name,
            size_bytes: contents.len() as u64,
            contents: contents.into(),
            row_count,
        }
    }

    /// Path the file was selected from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name sent with the upload.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Raw file contents.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Number of data rows, header excluded.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Summary shown beside the results.
    pub fn summary(&self, analyzed_at: impl Into<String>) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: format_size(self.size_bytes),
            rows: self.row_count,
            analyzed_at: analyzed_at.into(),
        }
    }
}

/// File details rendered on the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// File name.
    pub name: String,
    /// Human readable size.
    pub size: String,
    /// Data row count.
    pub rows: usize,
    /// When the analysis completed.
    pub analyzed_at: String,
}

/// Whether a file name (and optional MIME type) passes the CSV filter.
pub fn is_csv_candidate(name: &str, mime: Option<&str>) -> bool {
    let by_extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let by_mime = mime
        .map(|mime| {
            mime.split(';')
                .next()
                .map(|essence| essence.trim().eq_ignore_ascii_case(CSV_MIME))
                .unwrap_or(false)
        })
        .unwrap_or(false);
    by_extension || by_mime
}

/// Select a CSV file from disk.
///
/// The name and size are checked before the contents are read, so oversized
/// files are never loaded.
pub fn select_csv<F: FileSystem>(fs: &F, path: &Path) -> Result<SelectedFile, SelectionRejected> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());
    if !is_csv_candidate(&name, None) {
        return Err(SelectionRejected::NotCsv { name });
    }

    let size = fs
        .file_size(path)
        .map_err(|err| SelectionRejected::Unreadable(err.to_string()))?;
    check_size(size)?;

    let contents = fs
        .read_bytes(path)
        .map_err(|err| SelectionRejected::Unreadable(err.to_string()))?;
    check_size(contents.len() as u64)?;
    Ok(SelectedFile::build(path.to_path_buf(), name, contents))
}

fn check_size(size: u64) -> Result<(), SelectionRejected> {
    if size > MAX_UPLOAD_BYTES {
        return Err(SelectionRejected::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Count newline-delimited data rows, skipping the header and blank lines.
pub fn count_rows(contents: &[u8]) -> usize {
    contents
        .split(|byte| *byte == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count()
        .saturating_sub(1)
}

/// Format a byte count with binary units, e.g. `2.4 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvHealthError;
    use crate::fs::MockFileSystem;

    fn missing_file() -> CsvHealthError {
        CsvHealthError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
    }

    #[test]
    fn csv_filter_accepts_extension_or_mime() {
        assert!(is_csv_candidate("sales.csv", None));
        assert!(is_csv_candidate("SALES.CSV", None));
        assert!(is_csv_candidate("export", Some("text/csv; charset=utf-8")));
        assert!(!is_csv_candidate("sales.xlsx", None));
        assert!(!is_csv_candidate("sales.csv.gz", Some("application/gzip")));
        assert!(!is_csv_candidate("csv", None));
    }

    #[test]
    fn counts_rows_without_header_and_blank_lines() {
        assert_eq!(count_rows(b""), 0);
        assert_eq!(count_rows(b"id,name\n"), 0);
        assert_eq!(count_rows(b"id,name\n1,a\n2,b\n"), 2);
        assert_eq!(count_rows(b"id,name\r\n1,a\r\n\r\n2,b"), 2);
    }

    #[test]
    fn formats_sizes_with_binary_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2_516_582), "2.4 MB");
        assert_eq!(format_size(MAX_UPLOAD_BYTES), "50.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn select_csv_reads_accepted_file() {
        let path = Path::new("/data/sales.csv");
        let mut fs = MockFileSystem::new();
        fs.expect_file_size()
            .withf(|p: &Path| p == Path::new("/data/sales.csv"))
            .times(1)
            .returning(|_| Ok(16));
        fs.expect_read_bytes()
            .withf(|p: &Path| p == Path::new("/data/sales.csv"))
            .times(1)
            .returning(|_| Ok(b"id,total\n1,10\n2,5".to_vec()));

        let file = select_csv(&fs, path).expect("selected");
        assert_eq!(file.name(), "sales.csv");
        assert_eq!(file.path(), path);
        assert_eq!(file.size_bytes(), 17);
        assert_eq!(file.row_count(), 2);
        assert_eq!(file.contents(), b"id,total\n1,10\n2,5");
    }

    #[test]
    fn select_csv_rejects_non_csv_without_touching_disk() {
        let fs = MockFileSystem::new();
        let err = select_csv(&fs, Path::new("/data/report.pdf")).unwrap_err();
        assert_eq!(
            err,
            SelectionRejected::NotCsv {
                name: "report.pdf".to_string(),
            }
        );
    }

    #[test]
    fn select_csv_rejects_oversized_file_before_reading() {
        let oversized = MAX_UPLOAD_BYTES + 1;
        let mut fs = MockFileSystem::new();
        fs.expect_file_size().returning(move |_| Ok(oversized));
        fs.expect_read_bytes().never();

        let err = select_csv(&fs, Path::new("big.csv")).unwrap_err();
        assert_eq!(
            err,
            SelectionRejected::TooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                limit: MAX_UPLOAD_BYTES,
            }
        );
        assert!(err.to_string().contains("50.0 MB"));
    }

    #[test]
    fn select_csv_accepts_file_at_limit() {
        let mut fs = MockFileSystem::new();
        fs.expect_file_size().returning(|_| Ok(MAX_UPLOAD_BYTES));
        fs.expect_read_bytes().returning(|_| Ok(b"a\n1\n".to_vec()));

        assert!(select_csv(&fs, Path::new("edge.csv")).is_ok());
    }

    #[test]
    fn select_csv_maps_io_errors() {
        let mut fs = MockFileSystem::new();
        fs.expect_file_size().returning(|_| Err(missing_file()));

        let err = select_csv(&fs, Path::new("missing.csv")).unwrap_err();
        let SelectionRejected::Unreadable(reason) = err else {
            panic!("expected unreadable file, got {err:?}");
        };
        assert!(reason.contains("gone"));
    }

    #[test]
    fn from_bytes_applies_filter_and_builds_summary() {
        assert!(matches!(
            SelectedFile::from_bytes("notes.txt", "x"),
            Err(SelectionRejected::NotCsv { .. })
        ));

        let contents = "sku,qty\nA1,4\nB2,0\n";
        let file = SelectedFile::from_bytes("inventory.csv", contents).expect("file");
        let summary = file.summary("15 Jan 2024");
        assert_eq!(
            summary,
            FileSummary {
                name: "inventory.csv".to_string(),
                size: "18 B".to_string(),
                rows: 2,
                analyzed_at: "15 Jan 2024".to_string(),
            }
        );
    }
}
