use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A document a source can read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// File name including extension, used for filename parsing and the id
    pub name: String,
    pub path: PathBuf,
}

/// Where transcript documents come from
pub trait DocumentSource {
    /// Every readable document, in processing order
    ///
    /// Failing to list is fatal for a run.
    fn list_documents(&self) -> Result<Vec<DocumentRef>>;

    /// Plain text of one document
    ///
    /// A failure here only skips the document.
    fn read_text(&self, document: &DocumentRef) -> Result<String>;
}

/// Documents in a single directory, filtered by extension, sorted by name
#[derive(Debug, Clone)]
pub struct DirectoryDocumentSource {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryDocumentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }

    /// Replace the accepted extensions (compared case-insensitively)
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }
}

impl DocumentSource for DirectoryDocumentSource {
    fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list documents in {:?}", self.dir))?;

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list documents in {:?}", self.dir))?;
            let path = entry.path();
            if !path.is_file() || !self.accepts(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            documents.push(DocumentRef { name, path });
        }

        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }

    fn read_text(&self, document: &DocumentRef) -> Result<String> {
        std::fs::read_to_string(&document.path)
            .with_context(|| format!("Failed to read file: {:?}", document.path))
    }
}
