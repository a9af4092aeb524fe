//! PDF text extraction via pdf-extract
//!
//! The document is loaded with lopdf first so encryption is read from the
//! trailer rather than guessed from the file contents.

use std::path::Path;

use lopdf::Document as PdfDocument;

use super::ExtractionError;

const TRAILER_KEYWORD: &[u8] = b"trailer";
const STARTXREF_KEYWORD: &[u8] = b"startxref";
const ENCRYPT_KEY: &[u8] = b"/Encrypt";

/// Concatenate the text of every page, in page order
///
/// Pages without text contribute nothing; a document with no pages, or
/// only blank ones, is reported as empty.
pub(super) fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractionError::ReadError(format!("Failed to read PDF file: {}", e)))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "Read PDF file");

    match PdfDocument::load_mem(&bytes) {
        Ok(doc) => {
            if doc.is_encrypted()
                || doc.trailer.get(b"Encrypt").is_ok()
                || trailer_declares_encryption(&bytes)
            {
                return Err(ExtractionError::Encrypted);
            }
        }
        Err(e) => {
            // lopdf may refuse to load a file it cannot decrypt
            if trailer_declares_encryption(&bytes) {
                return Err(ExtractionError::Encrypted);
            }
            return Err(ExtractionError::ReadError(format!(
                "Failed to parse PDF: {}",
                e
            )));
        }
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| ExtractionError::ReadError(format!("PDF extraction failed: {}", e)))?;

    if pages.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let text = pages.concat();

    tracing::debug!(
        path = %path.display(),
        pages = pages.len(),
        chars = text.len(),
        "PDF pages extracted"
    );

    Ok(text)
}

/// Whether a classic `trailer` dictionary carries an `/Encrypt` entry
///
/// Only the bytes between each `trailer` keyword and the following
/// `startxref` are inspected; page content is never consulted.
fn trailer_declares_encryption(bytes: &[u8]) -> bool {
    let mut rest = bytes;
    while let Some(start) = find(rest, TRAILER_KEYWORD) {
        let section = &rest[start + TRAILER_KEYWORD.len()..];
        let end = find(section, STARTXREF_KEYWORD).unwrap_or(section.len());
        if find(&section[..end], ENCRYPT_KEY).is_some() {
            return true;
        }
        rest = &section[end..];
    }
    false
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
