//! DOCX text extraction via docx-rs

use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};

use super::ExtractionError;

/// Concatenate top-level paragraph text in document order, one line per paragraph
pub(super) fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractionError::ReadError(format!("Failed to read DOCX file: {}", e)))?;

    let doc = docx_rs::read_docx(&bytes)
        .map_err(|e| ExtractionError::ReadError(format!("Failed to parse DOCX: {}", e)))?;

    let mut text = String::new();
    let mut paragraphs = 0usize;

    for child in &doc.document.children {
        if let DocumentChild::Paragraph(para) = child {
            push_paragraph(para, &mut text);
            text.push('\n');
            paragraphs += 1;
        }
    }

    tracing::debug!(
        path = %path.display(),
        paragraphs = paragraphs,
        chars = text.len(),
        "DOCX paragraphs extracted"
    );

    Ok(text)
}

fn push_paragraph(para: &Paragraph, output: &mut String) {
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => push_run(run, output),
            ParagraphChild::Hyperlink(link) => {
                for link_child in &link.children {
                    if let ParagraphChild::Run(run) = link_child {
                        push_run(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, output: &mut String) {
    for run_child in &run.children {
        if let RunChild::Text(text) = run_child {
            output.push_str(&text.text);
        }
    }
}
