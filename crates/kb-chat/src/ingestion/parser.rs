//! Multi-format text extraction

use calamine::Reader;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::FileType;

const PDF_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns a file into plain text.
///
/// Implementations report failures as [`Error::Ingestion`]; the corpus loader
/// treats any error as empty text and moves on to the next file.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path, file_type: FileType) -> Result<String>;
}

/// Extractor for PDF, Word, Excel and plain-text files
#[derive(Debug, Default, Clone, Copy)]
pub struct FileParser;

impl TextExtractor for FileParser {
    fn extract(&self, path: &Path, file_type: FileType) -> Result<String> {
        let name = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| Error::ingestion(&name, e.to_string()))?;
        Self::parse(&name, file_type, &data)
    }
}

impl FileParser {
    /// Parse in-memory file content of the given type
    pub fn parse(name: &str, file_type: FileType, data: &[u8]) -> Result<String> {
        match file_type {
            FileType::Pdf => Self::parse_pdf(name, data),
            FileType::Docx => Self::parse_docx(name, data),
            t if t.is_spreadsheet() => Self::parse_spreadsheet(name, data),
            FileType::Txt | FileType::Markdown => Self::parse_text(name, data),
            _ => Err(Error::ingestion(name, "unsupported file type")),
        }
    }

    /// Page texts in page order, extracted on a worker thread.
    ///
    /// The PDF crates panic on some malformed content streams and can stall
    /// on unusual fonts; a crash or timeout becomes an ingestion error.
    fn parse_pdf(name: &str, data: &[u8]) -> Result<String> {
        let (tx, rx) = mpsc::channel();
        let owned_name = name.to_string();
        let owned_data = data.to_vec();

        let handle = thread::spawn(move || {
            let _ = tx.send(Self::extract_pdf_text(&owned_name, &owned_data));
        });

        match rx.recv_timeout(PDF_EXTRACTION_TIMEOUT) {
            Ok(result) => {
                let _ = handle.join();
                result
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::ingestion(
                name,
                format!("PDF extraction timed out after {}s", PDF_EXTRACTION_TIMEOUT.as_secs()),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Err(Error::ingestion(name, "PDF extraction crashed on malformed content"))
            }
        }
    }

    /// Falls back to whole-document extraction when lopdf cannot walk the
    /// page tree
    fn extract_pdf_text(name: &str, data: &[u8]) -> Result<String> {
        if let Ok(doc) = lopdf::Document::load_mem(data) {
            let mut content = String::new();
            let mut complete = true;

            for page_number in doc.get_pages().keys() {
                match doc.extract_text(&[*page_number]) {
                    Ok(text) => content.push_str(&text),
                    Err(e) => {
                        tracing::debug!("{}: page {} unreadable ({}), retrying whole document", name, page_number, e);
                        complete = false;
                        break;
                    }
                }
            }

            if complete {
                return Ok(content);
            }
        }

        pdf_extract::extract_text_from_mem(data).map_err(|e| Error::ingestion(name, e.to_string()))
    }

    /// Paragraph texts, one line each, in document order
    fn parse_docx(name: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::ingestion(name, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in &p.children {
                    push_paragraph_text(child, &mut content);
                }
                content.push('\n');
            }
        }

        Ok(content)
    }

    /// Every sheet in workbook order as `Sheet: <name>` plus an aligned table
    fn parse_spreadsheet(name: &str, data: &[u8]) -> Result<String> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::ingestion(name, e.to_string()))?;

        let mut content = String::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| Error::ingestion(name, format!("sheet '{}': {}", sheet_name, e)))?;

            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            content.push_str(&format!("Sheet: {}\n", sheet_name));
            content.push_str(&render_table(&rows));
            content.push_str("\n\n");
        }

        Ok(content)
    }

    fn parse_text(name: &str, data: &[u8]) -> Result<String> {
        String::from_utf8(data.to_vec()).map_err(|e| Error::ingestion(name, e.to_string()))
    }
}

/// Run text, including runs nested in hyperlinks
fn push_paragraph_text(child: &docx_rs::ParagraphChild, content: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => {
            for child in &run.children {
                if let docx_rs::RunChild::Text(t) = child {
                    content.push_str(&t.text);
                }
            }
        }
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for child in &link.children {
                push_paragraph_text(child, content);
            }
        }
        _ => {}
    }
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Bool(b) => b.to_string(),
        calamine::Data::DateTime(dt) => dt.to_string(),
        calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

/// Left-aligned columns separated by one space; trailing padding trimmed
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                line.push_str(cell);
                let pad = widths[i] - cell.chars().count();
                line.extend(std::iter::repeat(' ').take(pad));
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Minimal PDF with one page per raw content stream, Courier as `/F1`
#[cfg(test)]
pub(crate) fn build_pdf(pages: &[&[u8]]) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_text_is_unmodified() {
        let text = "  Line one\n\tLine two  \n";
        let parsed = FileParser::parse("notes.txt", FileType::Txt, text.as_bytes()).unwrap();
        assert_eq!(parsed, text);
    }

    #[test]
    fn test_invalid_utf8_is_an_ingestion_error() {
        let err = FileParser::parse("notes.md", FileType::Markdown, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = FileParser::parse("data.bin", FileType::Unknown, b"x").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_invalid_pdf() {
        let err = FileParser::parse("report.pdf", FileType::Pdf, b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_invalid_docx() {
        let err = FileParser::parse("memo.docx", FileType::Docx, b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_invalid_spreadsheet() {
        let err = FileParser::parse("budget.xlsx", FileType::Xlsx, b"not a workbook").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_docx_paragraphs_one_per_line() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("First paragraph")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Second paragraph")))
            .build()
            .pack(&mut buf)
            .unwrap();

        let text = FileParser::parse("memo.docx", FileType::Docx, buf.get_ref()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["First paragraph", "Second paragraph"]);
    }

    #[test]
    fn test_docx_hyperlink_text_kept() {
        use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("See "))
                    .add_hyperlink(
                        Hyperlink::new("refunds", HyperlinkType::Anchor)
                            .add_run(Run::new().add_text("the refund policy")),
                    )
                    .add_run(Run::new().add_text(" for details")),
            )
            .build()
            .pack(&mut buf)
            .unwrap();

        let text = FileParser::parse("memo.docx", FileType::Docx, buf.get_ref()).unwrap();
        assert_eq!(text, "See the refund policy for details\n");
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let data = build_pdf(&[
            b"BT /F1 12 Tf 72 720 Td (PageOne) Tj ET",
            b"BT /F1 12 Tf 72 720 Td (PageTwo) Tj ET",
        ]);

        let text = FileParser::parse("report.pdf", FileType::Pdf, &data).unwrap();
        let first = text.find("PageOne").unwrap();
        let second = text.find("PageTwo").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_malformed_pdf_content_is_an_ingestion_error() {
        // Tf without operands
        let data = build_pdf(&[b"BT Tf (Hello) Tj ET"]);

        let err = FileParser::parse("bad.pdf", FileType::Pdf, &data).unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_spreadsheet_sheets_in_workbook_order() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let invoices = workbook.add_worksheet();
        invoices.set_name("Invoices").unwrap();
        invoices.write_string(0, 0, "Item").unwrap();
        invoices.write_string(0, 1, "Qty").unwrap();
        invoices.write_string(1, 0, "Widget").unwrap();
        invoices.write_number(1, 1, 5.0).unwrap();
        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "hello").unwrap();
        let data = workbook.save_to_buffer().unwrap();

        let text = FileParser::parse("budget.xlsx", FileType::Xlsx, &data).unwrap();
        assert_eq!(
            text,
            "Sheet: Invoices\nItem   Qty\nWidget 5\n\nSheet: Notes\nhello\n\n"
        );
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![strings(&["Item", "Qty"]), strings(&["Widget", "5"])];
        assert_eq!(render_table(&rows), "Item   Qty\nWidget 5");
    }

    #[test]
    fn test_render_table_ragged_rows() {
        let rows = vec![strings(&["a", "bb", "c"]), strings(&["dddd"])];
        assert_eq!(render_table(&rows), "a    bb c\ndddd");
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&[]), "");
    }
}
