use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::extraction::ExtractionError;

/// Declared kind of an uploaded document, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Text,
    Pdf,
    Word,
}

impl DocumentKind {
    /// Derive the kind from a filename's extension (case insensitive)
    ///
    /// `doc` maps to `Word` as well; legacy binary documents then fail at
    /// extraction time rather than being rejected up front.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("txt") => Ok(Self::Text),
            Some("pdf") => Ok(Self::Pdf),
            Some("doc") | Some("docx") => Ok(Self::Word),
            _ => Err(ExtractionError::Unsupported(
                ext.unwrap_or_else(|| "none".to_string()),
            )),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Text => write!(f, "text"),
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Word => write!(f, "word"),
        }
    }
}

/// An uploaded document waiting to be analyzed
///
/// Lives only as long as the request that received it. The file at `path`
/// is owned by the caller and removed once the request completes.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, ExtractionError> {
        let filename = filename.into();
        let kind = DocumentKind::from_filename(&filename)?;
        Ok(Self {
            filename,
            path: path.into(),
            kind,
        })
    }
}

/// Text pulled out of a document
///
/// Never empty or all-whitespace: a document that yields nothing is
/// reported as [`ExtractionError::Empty`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: String) -> Result<Self, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters (not bytes)
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("a.txt").unwrap(), DocumentKind::Text);
        assert_eq!(DocumentKind::from_filename("A.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("nda.docx").unwrap(), DocumentKind::Word);
        assert_eq!(DocumentKind::from_filename("old.doc").unwrap(), DocumentKind::Word);
    }

    #[test]
    fn test_unsupported_kind() {
        assert!(matches!(
            DocumentKind::from_filename("sheet.xlsx"),
            Err(ExtractionError::Unsupported(ext)) if ext == "xlsx"
        ));
        assert!(matches!(
            DocumentKind::from_filename("README"),
            Err(ExtractionError::Unsupported(ext)) if ext == "none"
        ));
    }

    #[test]
    fn test_extracted_text_rejects_blank() {
        assert!(matches!(ExtractedText::new(String::new()), Err(ExtractionError::Empty)));
        assert!(matches!(
            ExtractedText::new(" \n\t ".to_string()),
            Err(ExtractionError::Empty)
        ));
        assert_eq!(ExtractedText::new("x".to_string()).unwrap().as_str(), "x");
    }
}
