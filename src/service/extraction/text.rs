use std::path::Path;

use super::ExtractionError;

/// Read a plain text file as UTF-8
pub(super) fn read_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractionError::ReadError(format!("Failed to read text file: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| {
        ExtractionError::ReadError(format!("Text file is not valid UTF-8: {}", e.utf8_error()))
    })
}
