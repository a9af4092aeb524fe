//! Document text extraction
//!
//! Pulls plain text out of uploaded contracts. Each supported kind has its
//! own reader:
//! - Text: whole-file UTF-8 read
//! - PDF: per-page text via pdf-extract
//! - Word: paragraph text via docx-rs
//!
//! Extraction is blocking and CPU-bound; async callers should run it on the
//! blocking pool.

mod error;
mod pdf;
mod text;
mod word;

use std::path::Path;
use std::time::Instant;

use crate::model::{DocumentKind, ExtractedText};

pub use error::ExtractionError;

/// Extract the text of the file at `path`, read as `kind`
pub fn extract(path: &Path, kind: DocumentKind) -> Result<ExtractedText, ExtractionError> {
    let start_time = Instant::now();

    tracing::debug!(path = %path.display(), kind = %kind, "Starting text extraction");

    let raw = match kind {
        DocumentKind::Text => text::read_text(path),
        DocumentKind::Pdf => guard_panics("PDF", || pdf::extract_pdf(path)),
        DocumentKind::Word => guard_panics("DOCX", || word::extract_docx(path)),
    };

    let extracted = raw.and_then(ExtractedText::new);
    let elapsed = start_time.elapsed();

    match &extracted {
        Ok(text) => tracing::info!(
            path = %path.display(),
            kind = %kind,
            chars = text.char_count(),
            elapsed_ms = elapsed.as_millis(),
            "Text extraction completed"
        ),
        Err(e) => tracing::warn!(
            path = %path.display(),
            kind = %kind,
            elapsed_ms = elapsed.as_millis(),
            error = %e,
            "Text extraction failed"
        ),
    }

    extracted
}

/// Run a parser, converting a panic inside a third-party crate into a read error
///
/// Malformed fonts and archives are known to make the PDF and DOCX parsers panic.
fn guard_panics<F>(label: &str, parse: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(_panic) => {
            tracing::error!(format = label, "Document parser panicked - likely malformed file");
            Err(ExtractionError::ReadError(format!(
                "{} parser failed on a malformed file",
                label
            )))
        }
    }
}
