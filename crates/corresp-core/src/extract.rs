//! Document Extractor: raw file bytes -> plain text.
//!
//! The format is resolved once from the file name ([`DocumentFormat::from_file_name`]);
//! names with other extensions are rejected before any download happens.
//! Extraction itself never fails: a page or paragraph that cannot be read
//! contributes an empty string.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::{errors::Error, ports::TextExtractor, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Case-insensitive extension sniffing (`.pdf` / `.docx`).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    /// Like [`DocumentFormat::from_file_name`], failing with `UnsupportedFormat`.
    pub fn require(name: &str) -> Result<Self> {
        Self::from_file_name(name).ok_or_else(|| Error::UnsupportedFormat {
            file_name: name.to_string(),
        })
    }

    pub fn extract_text(self, bytes: &[u8]) -> String {
        match self {
            DocumentFormat::Pdf => extract_pdf(bytes),
            DocumentFormat::Docx => extract_docx(bytes),
        }
    }
}

/// Extractor backed by `pdf-extract` and `docx-rs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinExtractor;

impl TextExtractor for BuiltinExtractor {
    fn extract_text(&self, format: DocumentFormat, bytes: &[u8]) -> String {
        format.extract_text(bytes)
    }
}

pub fn is_supported(name: &str) -> bool {
    DocumentFormat::from_file_name(name).is_some()
}

/// Pages in order, joined by newlines; image-only pages contribute "".
fn extract_pdf(bytes: &[u8]) -> String {
    pdf_pages(bytes).join("\n")
}

/// One entry per page. Only a document that cannot be opened at all yields
/// no pages.
fn pdf_pages(bytes: &[u8]) -> Vec<String> {
    let mut doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("pdf parsing failed, using empty text: {e}");
            return Vec::new();
        }
    };
    if doc.is_encrypted() {
        if let Err(e) = doc.decrypt("") {
            tracing::warn!("pdf is encrypted, using empty text: {e}");
            return Vec::new();
        }
    }

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page_num| pdf_page_text(&doc, page_num))
        .collect();
    tracing::debug!("pdf extracted: {} pages", pages.len());
    pages
}

fn pdf_page_text(doc: &lopdf::Document, page_num: u32) -> String {
    // pdf-extract panics on pages without a MediaBox and on malformed fonts.
    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        let outcome = {
            let mut output = pdf_extract::PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(doc, &mut output, page_num)
        };
        outcome.map(|()| text)
    }));
    match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!("pdf page {page_num} unreadable, using empty text: {e}");
            String::new()
        }
        Err(_panic) => {
            tracing::warn!("pdf page {page_num} panicked, using empty text");
            String::new()
        }
    }
}

/// Top-level paragraphs in document order, one per line.
fn extract_docx(bytes: &[u8]) -> String {
    let doc = match docx_rs::read_docx(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("docx parsing failed, using empty text: {e}");
            return String::new();
        }
    };

    let paragraphs: Vec<String> = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    paragraphs.join("\n")
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut out),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            out.push_str(&text.text);
        }
    }
}

/// First `max_chars` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::{dictionary, Document, Object, Stream};

    /// A Helvetica PDF with one page per `(text, has_media_box)` entry. An
    /// empty `text` gives a page with an empty content stream. `MediaBox` is
    /// set per page only, so a page without it cannot inherit one.
    pub(crate) fn build_pdf(pages: &[(&str, bool)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for &(text, has_media_box) in pages {
            let content = if text.is_empty() {
                Vec::new()
            } else {
                format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET").into_bytes()
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let mut page = dictionary! {
                "Type" => "Page",
                "Contents" => content_id,
                "Resources" => resources_id,
            };
            if has_media_box {
                let media_box: Vec<Object> =
                    [0, 0, 612, 792].into_iter().map(Object::Integer).collect();
                page.set("MediaBox", media_box);
            }
            page_ids.push(doc.add_object(page));
        }

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|&id| Object::from(id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        });
        for &id in &page_ids {
            doc.get_object_mut(id)
                .and_then(Object::as_dict_mut)
                .unwrap()
                .set("Parent", pages_id);
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::build_pdf;
    use super::*;
    use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

    fn build_docx(docx: Docx) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn sniffs_format_case_insensitively() {
        assert_eq!(
            DocumentFormat::from_file_name("Письмо.PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_file_name("letter.Docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_file_name("letter.doc"), None);
        assert_eq!(DocumentFormat::from_file_name("notes.txt"), None);
        assert_eq!(DocumentFormat::from_file_name("pdf"), None);
        assert!(is_supported("a.pdf"));
        assert!(!is_supported("a.pdf.zip"));
    }

    #[test]
    fn require_rejects_unsupported() {
        let err = DocumentFormat::require("scan.txt").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { file_name } if file_name == "scan.txt"));
    }

    #[test]
    fn docx_paragraphs_one_per_line() {
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("Исх."))
                        .add_run(Run::new().add_text("№15")),
                )
                .add_paragraph(Paragraph::new())
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("О графике работ"))),
        );

        let text = DocumentFormat::Docx.extract_text(&bytes);
        assert_eq!(text, "Исх.№15\n\nО графике работ");
    }

    #[test]
    fn docx_skips_tables() {
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("before")))
                .add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("cell")))])]))
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("after"))),
        );

        assert_eq!(DocumentFormat::Docx.extract_text(&bytes), "before\nafter");
    }

    #[test]
    fn unreadable_bytes_degrade_to_empty_text() {
        assert_eq!(DocumentFormat::Docx.extract_text(b"not a zip"), "");
        assert_eq!(DocumentFormat::Pdf.extract_text(b"%PDF-1.4 garbage"), "");
        assert_eq!(DocumentFormat::Pdf.extract_text(&[]), "");
    }

    #[test]
    fn pdf_pages_come_out_in_order() {
        let bytes = build_pdf(&[("alpha", true), ("bravo", true), ("charlie", true)]);

        let pages = pdf_pages(&bytes);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].trim(), "alpha");
        assert_eq!(pages[1].trim(), "bravo");
        assert_eq!(pages[2].trim(), "charlie");

        let text = DocumentFormat::Pdf.extract_text(&bytes);
        let a = text.find("alpha").unwrap();
        let b = text.find("bravo").unwrap();
        let c = text.find("charlie").unwrap();
        assert!(a < b && b < c, "{text:?}");
    }

    #[test]
    fn pdf_page_without_text_contributes_empty_string() {
        let bytes = build_pdf(&[("cover", true), ("", true), ("annex", true)]);

        let pages = pdf_pages(&bytes);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].trim(), "");
        assert_eq!(pages[2].trim(), "annex");
    }

    #[test]
    fn unreadable_pdf_page_does_not_drop_the_rest() {
        // First page has no MediaBox, which pdf-extract cannot lay out.
        let bytes = build_pdf(&[("firstpage", false), ("secondpage", true)]);

        let pages = pdf_pages(&bytes);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], "");
        assert_eq!(pages[1].trim(), "secondpage");
        assert!(DocumentFormat::Pdf
            .extract_text(&bytes)
            .contains("secondpage"));
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate_chars("абвгд", 3), "абв");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
