//! Document decoding and raw-payload encoding

use crate::error::ExtractorError;
use crate::types::ContentType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Base64 prefix of a PDF file header (`%PDF-`)
const PDF_BASE64_MARKER: &str = "JVBERi0";

/// Decode document bytes into text according to the declared type
pub fn extract_text(raw: &[u8], content_type: ContentType) -> Result<String, ExtractorError> {
    match content_type {
        ContentType::Pdf => extract_pdf(raw),
        ContentType::Docx => extract_docx(raw),
        ContentType::PlainText | ContentType::Unknown => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}

fn extract_pdf(raw: &[u8]) -> Result<String, ExtractorError> {
    pdf_extract::extract_text_from_mem(raw).map_err(|e| ExtractorError::DocumentRead(format!("PDF: {}", e)))
}

fn extract_docx(raw: &[u8]) -> Result<String, ExtractorError> {
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    let docx = read_docx(raw).map_err(|e| ExtractorError::DocumentRead(format!("DOCX: {}", e)))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in docx.document.children.iter() {
        if let DocumentChild::Paragraph(para) = child {
            let text: String = para
                .children
                .iter()
                .filter_map(|pc| match pc {
                    ParagraphChild::Run(run) => Some(
                        run.children
                            .iter()
                            .filter_map(|rc| match rc {
                                RunChild::Text(t) => Some(t.text.as_str()),
                                _ => None,
                            })
                            .collect::<String>(),
                    ),
                    _ => None,
                })
                .collect();

            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Whether decoded text is worth chunking.
///
/// Text is usable only when its trimmed length exceeds `min_chars` and it
/// is not itself an undecoded PDF payload.
pub fn is_usable_text(text: &str, min_chars: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() <= min_chars {
        return false;
    }
    !(trimmed.starts_with("%PDF-") || trimmed.contains(PDF_BASE64_MARKER))
}

/// Base64-encode `raw`, capped at `max_chars`.
///
/// Returns the payload and whether it was truncated.
pub fn raw_payload(raw: &[u8], max_chars: usize) -> (String, bool) {
    let mut encoded = STANDARD.encode(raw);
    let truncated = encoded.len() > max_chars;
    // base64 output is ASCII, so byte truncation is char-safe
    encoded.truncate(max_chars);
    (encoded, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_lossy_utf8() {
        let text = extract_text(b"The system shall \xFFwork", ContentType::PlainText).unwrap();
        assert!(text.starts_with("The system shall "));
        assert!(text.ends_with("work"));
    }

    #[test]
    fn test_unknown_decodes_as_plain_text() {
        let text = extract_text(b"hello", ContentType::Unknown).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_garbage_pdf_is_read_error() {
        let result = extract_text(b"definitely not a pdf", ContentType::Pdf);
        assert!(matches!(result, Err(ExtractorError::DocumentRead(_))));
    }

    #[test]
    fn test_garbage_docx_is_read_error() {
        let result = extract_text(b"definitely not a zip", ContentType::Docx);
        assert!(matches!(result, Err(ExtractorError::DocumentRead(_))));
    }

    #[test]
    fn test_usable_text_threshold() {
        assert!(!is_usable_text("   short   ", 100));
        assert!(is_usable_text(&"word ".repeat(30), 100));
        assert!(is_usable_text("x", 0));
        assert!(!is_usable_text("", 0));
    }

    #[test]
    fn test_threshold_length_itself_is_not_usable() {
        assert!(!is_usable_text(&"a".repeat(100), 100));
        assert!(is_usable_text(&"a".repeat(101), 100));
        assert!(!is_usable_text(&format!("  {}\n", "a".repeat(100)), 100));
    }

    #[test]
    fn test_pdf_payload_is_not_usable() {
        let payload = format!("JVBERi0xLjQK{}", "A".repeat(200));
        assert!(!is_usable_text(&payload, 100));

        let header = format!("%PDF-1.4\n{}", "x".repeat(200));
        assert!(!is_usable_text(&header, 100));
    }

    #[test]
    fn test_raw_payload_truncates() {
        let (payload, truncated) = raw_payload(b"%PDF-1.4", 7);
        assert_eq!(payload, "JVBERi0");
        assert!(truncated);

        let (payload, truncated) = raw_payload(b"Hello", 100);
        assert_eq!(payload, "SGVsbG8=");
        assert!(!truncated);
    }
}
