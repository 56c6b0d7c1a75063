use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::error::{TableError, TableResult};

// ---------------------------------------------------------------------------
// Tabular file formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub const ALL: [FileFormat; 2] = [FileFormat::Csv, FileFormat::Xlsx];

    /// Resolve a format from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> TableResult<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "" => Err(TableError::UnsupportedFormat("(no extension)".into())),
            other => Err(TableError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Xlsx => write!(f, "Excel"),
        }
    }
}

// ---------------------------------------------------------------------------
// UploadedFile
// ---------------------------------------------------------------------------

/// A user-submitted file: immutable name and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> TableResult<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(UploadedFile::new(name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size as shown in the file header, e.g. `1.25 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size() as f64 / 1024.0)
    }

    pub fn format(&self) -> TableResult<FileFormat> {
        FileFormat::from_file_name(&self.name)
    }

    /// File name without its extension, used to name exports.
    pub fn base_name(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_resolved_case_insensitively() {
        assert_eq!(FileFormat::from_file_name("a.CSV").ok(), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_file_name("report.final.xlsx").ok(),
            Some(FileFormat::Xlsx)
        );
    }

    #[test]
    fn txt_is_unsupported() {
        let err = FileFormat::from_file_name("notes.txt").unwrap_err();
        assert!(matches!(err, TableError::UnsupportedFormat(ref e) if e == ".txt"));
        assert_eq!(err.to_string(), "Unsupported file format: .txt");
    }

    #[test]
    fn size_label_and_base_name() {
        let f = UploadedFile::new("sales.q1.csv", vec![0u8; 1536]);
        assert_eq!(f.size_label(), "1.50 KB");
        assert_eq!(f.base_name(), "sales.q1");
    }

    #[test]
    fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let f = UploadedFile::from_path(&path).unwrap();
        assert_eq!(f.name, "data.csv");
        assert_eq!(&*f.bytes, b"a\n1\n");
    }
}
