use std::fs;
use std::path::PathBuf;

/// Binary payload read from the local document directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read document {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reads upload payloads from the configured local directory.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    directory: PathBuf,
}

impl DocumentLibrary {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Read the named file fully into memory for upload.
    pub fn load(&self, file_name: &str) -> Result<DocumentFile, DocumentError> {
        let path = self.directory.join(file_name);
        if !path.is_file() {
            return Err(DocumentError::NotFound { path });
        }

        let bytes = fs::read(&path).map_err(|source| DocumentError::Unreadable {
            path: path.clone(),
            source,
        })?;

        Ok(DocumentFile {
            file_name: file_name.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn loads_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("registry.pdf");
        let mut file = std::fs::File::create(&path).expect("create fixture");
        file.write_all(b"%PDF-1.4 fixture").expect("write fixture");

        let library = DocumentLibrary::new(dir.path());
        let document = library.load("registry.pdf").expect("document loads");
        assert_eq!(document.file_name, "registry.pdf");
        assert_eq!(document.bytes, b"%PDF-1.4 fixture");
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let library = DocumentLibrary::new(dir.path());

        let err = library.load("absent.pdf").expect_err("load must fail");
        assert!(matches!(err, DocumentError::NotFound { .. }));
        assert!(err.to_string().contains("absent.pdf"));
    }
}
