//! PDF to text conversion

use lopdf::Document;

use super::OddpubError;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Page texts extracted from a PDF, in page order
#[derive(Debug, Clone, Default)]
pub struct ConvertedPdf {
    pub pages: Vec<String>,
}

impl ConvertedPdf {
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

/// Check that the bytes open with the PDF header, after an optional UTF-8 BOM
/// and leading whitespace
pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    body[start..].starts_with(PDF_SIGNATURE)
}

/// Extract the text of every page
pub fn convert(bytes: &[u8]) -> Result<ConvertedPdf, OddpubError> {
    if !has_pdf_signature(bytes) {
        return Err(OddpubError::NotPdf);
    }

    let document =
        Document::load_mem(bytes).map_err(|e| OddpubError::Conversion(e.to_string()))?;

    if document.is_encrypted() {
        return Err(OddpubError::Encrypted);
    }

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    let mut pages = Vec::with_capacity(page_numbers.len());
    let mut failures = 0usize;

    for number in &page_numbers {
        match document.extract_text(&[*number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                failures += 1;
                tracing::warn!(page = number, error = %e, "Failed to extract page text, skipping");
            }
        }
    }

    if !page_numbers.is_empty() && failures == page_numbers.len() {
        return Err(OddpubError::Conversion(format!(
            "no text could be extracted from any of {} pages",
            page_numbers.len()
        )));
    }

    tracing::debug!(
        pages = page_numbers.len(),
        failed_pages = failures,
        "Converted PDF to text"
    );

    Ok(ConvertedPdf { pages })
}
