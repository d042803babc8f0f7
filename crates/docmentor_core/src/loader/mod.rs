//! Plain-text extraction for uploaded documents, dispatched on file extension.
//!
//! `.txt` is read as UTF-8. `.pdf` and `.docx` extraction failures do not propagate: they
//! come back as text starting with [`LOAD_ERROR_PREFIX`], and ingestion skips such
//! documents. Unknown extensions fail with `UNSUPPORTED_FORMAT`.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::domain::Document;
use crate::error::AppError;

pub const LOAD_ERROR_PREFIX: &str = "Error loading";

/// Maximum decompressed bytes read from `word/document.xml` (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Txt,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(AppError::new("UNSUPPORTED_FORMAT", "Unsupported file type")
                .with_details(format!("path={}; ext=.{}", path.display(), ext))),
        }
    }
}

/// True when loader output is an error payload (or nothing) rather than document text.
pub fn is_unusable_text(text: &str) -> bool {
    text.trim().is_empty() || text.starts_with(LOAD_ERROR_PREFIX)
}

pub fn load_document(path: &Path) -> Result<String, AppError> {
    let format = DocumentFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading document");

    match format {
        DocumentFormat::Txt => fs::read_to_string(path).map_err(|e| {
            AppError::new("LOAD_FAILED", "Failed to read text file")
                .with_details(format!("path={}; err={}", path.display(), e))
        }),
        DocumentFormat::Pdf => Ok(soft_fail("PDF", read_bytes(path).and_then(|b| extract_pdf(&b)))),
        DocumentFormat::Docx => Ok(soft_fail("DOCX", read_bytes(path).and_then(|b| extract_docx(&b)))),
    }
}

/// Load a file into a [`Document`] named after its file name.
pub fn load(path: &Path) -> Result<Document, AppError> {
    let text = load_document(path)?;
    Ok(Document::new(source_name(path), text))
}

pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn soft_fail(kind: &str, res: Result<String, String>) -> String {
    match res {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(kind, err = %e, "document extraction failed");
            format!("{LOAD_ERROR_PREFIX} {kind}: {e}")
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| e.to_string())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| format!("word/document.xml: {e}"))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| e.to_string())?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err("word/document.xml exceeds size limit".to_string());
    }
    docx_paragraphs(&xml).map(|paras| paras.join("\n"))
}

/// Text of each non-blank `<w:p>` paragraph, in document order.
fn docx_paragraphs(xml: &[u8]) -> Result<Vec<String>, String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs)
}
