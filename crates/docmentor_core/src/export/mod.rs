//! Answer export as a plain-text file or a minimal single-font PDF.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use time::OffsetDateTime;

use crate::error::AppError;

pub const EXPORT_FOOTER: &str = "Exported by DocMentor - Powered by offline synthesis";

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 50;
const FONT_SIZE: u32 = 10;
const LEADING: u32 = 14;
const WRAP_COLUMNS: usize = 95;
const LINES_PER_PAGE: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub question: String,
    pub answer: String,
    pub context: String,
    pub sources: Option<String>,
    pub model_name: String,
    pub include_citations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

pub fn export(
    dir: &Path,
    req: &ExportRequest,
    format: ExportFormat,
    now: OffsetDateTime,
) -> Result<PathBuf, AppError> {
    match format {
        ExportFormat::Txt => export_txt(dir, req, now),
        ExportFormat::Pdf => export_pdf(dir, req, now),
    }
}

pub fn export_txt(dir: &Path, req: &ExportRequest, now: OffsetDateTime) -> Result<PathBuf, AppError> {
    let mut body = render_export_body(req, &format_ts(now, TS_HUMAN)?);
    if let Some(footer) = citation_footer(req) {
        body.push_str("\n\n");
        body.push_str(&footer);
    }
    body.push('\n');
    write_export(dir, ExportFormat::Txt, now, body.as_bytes())
}

pub fn export_pdf(dir: &Path, req: &ExportRequest, now: OffsetDateTime) -> Result<PathBuf, AppError> {
    let body = strip_unsupported(&render_export_body(req, &format_ts(now, TS_HUMAN)?));
    let mut lines = wrap_lines(&body, WRAP_COLUMNS);
    if let Some(footer) = citation_footer(req) {
        lines.push(String::new());
        lines.extend(wrap_lines(&strip_unsupported(&footer), WRAP_COLUMNS));
    }
    let pdf = build_pdf(&lines, "DocMentor Answer Export")?;
    write_export(dir, ExportFormat::Pdf, now, &pdf)
}

/// The shared export layout: header fields followed by question, answer and context.
pub fn render_export_body(req: &ExportRequest, timestamp: &str) -> String {
    format!(
        "Generated on: {timestamp}\nModel: {}\nSources: {}\n\nQuestion:\n{}\n\nAnswer:\n{}\n\nContext:\n{}",
        req.model_name,
        req.sources.as_deref().unwrap_or("None"),
        req.question,
        req.answer,
        req.context,
    )
}

fn citation_footer(req: &ExportRequest) -> Option<String> {
    match (&req.sources, req.include_citations) {
        (Some(s), true) if !s.trim().is_empty() => Some(format!("Sources: {s}")),
        _ => None,
    }
}

/// Drop everything outside printable ASCII (newlines and tabs are kept).
pub fn strip_unsupported(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && (!c.is_ascii_control() || *c == '\n' || *c == '\t'))
        .collect()
}

const TS_HUMAN: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";
const TS_FILE: &str = "[year][month][day]_[hour][minute][second]";

fn format_ts(now: OffsetDateTime, pattern: &str) -> Result<String, AppError> {
    let fmt = time::format_description::parse(pattern).map_err(|e| {
        AppError::new("EXPORT_FAILED", "Invalid timestamp format").with_details(e.to_string())
    })?;
    now.format(&fmt).map_err(|e| {
        AppError::new("EXPORT_FAILED", "Failed to format timestamp").with_details(e.to_string())
    })
}

pub fn export_file_name(format: ExportFormat, now: OffsetDateTime) -> Result<String, AppError> {
    Ok(format!("answer_{}.{}", format_ts(now, TS_FILE)?, format.extension()))
}

fn write_export(
    dir: &Path,
    format: ExportFormat,
    now: OffsetDateTime,
    bytes: &[u8],
) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::new("EXPORT_FAILED", "Failed to create export directory")
            .with_details(format!("path={}; err={}", dir.display(), e))
    })?;
    let path = dir.join(export_file_name(format, now)?);
    fs::write(&path, bytes).map_err(|e| {
        AppError::new("EXPORT_FAILED", "Failed to write export file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), format = format.extension(), "answer exported");
    Ok(path)
}

/// Greedy word wrap on `width` characters; long words are hard-split.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.replace('\t', "    ");
        let mut line = String::new();
        for word in raw.split(' ') {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                out.push(head);
            }
            let needed = if line.is_empty() { 0 } else { 1 } + word.chars().count();
            if line.chars().count() + needed > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        out.push(line);
    }
    out
}

fn pdf_error(e: lopdf::Error) -> AppError {
    AppError::new("EXPORT_FAILED", "Failed to render PDF").with_details(e.to_string())
}

fn page_content(lines: &[String]) -> Content {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        ops.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        ops.push(Operation::new("T*", vec![]));
    }
    ops.push(Operation::new("ET", vec![]));

    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 8.into()]),
        Operation::new("Td", vec![(PAGE_WIDTH / 2 - 110).into(), 30.into()]),
        Operation::new("Tj", vec![Object::string_literal(EXPORT_FOOTER)]),
        Operation::new("ET", vec![]),
    ]);
    Content { operations: ops }
}

/// Uncompressed PDF 1.4 with one Helvetica resource shared by every page. Each page
/// carries the export footer.
fn build_pdf(lines: &[String], title: &str) -> Result<Vec<u8>, AppError> {
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![lines]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let stream = page_content(page_lines).encode().map_err(pdf_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];
    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal("DocMentor"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| pdf_error(e.into()))?;
    Ok(out)
}
