//! Prompts for contract risk analysis

use crate::model::{AnalysisRequest, ExtractedText};

/// System prompt for contract risk analysis
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an experienced contract lawyer reviewing a document for a client.

Your role is to assess the legal and commercial risk the contract creates for
the client and to point out opportunities the client could use.

You must:
- Assess the overall risk of the contract as Low, Medium or High
- Break down individual risky clauses, ranked from High to Low risk
- Examine exit and termination clauses, notice periods and renewal terms
- Examine payment terms, fees, penalties and late-payment consequences
- Examine liability, indemnities, warranties and limitation-of-liability caps
- Examine intellectual property ownership and licensing
- Examine confidentiality and data protection obligations
- Identify opportunities: favorable terms, negotiation leverage, missing protections worth requesting

Do not:
- Invent clauses that are not in the document
- Give generic advice unrelated to the document's actual wording

Respond with a single JSON object and nothing else, using exactly this schema:
{
  "original_filename": "<the filename you were given>",
  "overall_risk": "Low" | "Medium" | "High",
  "opportunities_found": <number of opportunities, or a one-sentence summary of them>,
  "risk_breakdown": [
    {
      "risk_level": "Low" | "Medium" | "High",
      "title": "<short clause name>",
      "description": "<what the clause says and why it is risky>"
    }
  ]
}"#;

/// Appended to the user message when the document text had to be cut
const TRUNCATION_NOTICE: &str =
    "[Document truncated: only the beginning of the document is included above.]";

/// Build the analysis request for a document
///
/// The text is embedded verbatim unless it exceeds `max_document_chars`
/// characters, in which case it is cut at that character boundary and a
/// truncation notice is appended.
pub fn build_analysis_request(
    filename: &str,
    text: &ExtractedText,
    max_document_chars: usize,
) -> AnalysisRequest {
    let full_text = text.as_str();

    let (document_text, truncated) = match full_text.char_indices().nth(max_document_chars) {
        Some((cut, _)) => (&full_text[..cut], true),
        None => (full_text, false),
    };

    let mut user = format!(
        r#"Analyze the following contract document.

Filename: {filename}

--- BEGIN DOCUMENT ---
{document_text}
--- END DOCUMENT ---"#,
        filename = filename,
        document_text = document_text,
    );

    if truncated {
        user.push('\n');
        user.push_str(TRUNCATION_NOTICE);
    }

    AnalysisRequest {
        system: ANALYSIS_SYSTEM_PROMPT,
        user,
        truncated,
    }
}
