// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Plain-text extraction from uploaded PDF, DOCX and TXT files.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Cursor, Read};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type")]
    Unsupported,
    #[error("failed to read PDF: {0}")]
    Pdf(String),
    #[error("failed to read DOCX: {0}")]
    Docx(String),
    #[error("no text found in file")]
    Empty,
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Document formats text can be pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Pick the format from the declared content type, falling back to the
    /// file extension when the type is missing or generic.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        match essence.as_deref() {
            Some("application/pdf") => Some(DocumentKind::Pdf),
            Some("text/plain") => Some(DocumentKind::Txt),
            Some(DOCX_CONTENT_TYPE) => Some(DocumentKind::Docx),
            Some(_) => None,
            None => Self::from_extension(file_name),
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".txt") {
            Some(DocumentKind::Txt)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

/// Extract and normalize text on the blocking pool.
pub async fn extract(kind: DocumentKind, data: Vec<u8>) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(kind, &data))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?
}

/// Extract text from raw file bytes. The result is whitespace-normalized and never empty.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    let raw = match kind {
        DocumentKind::Txt => String::from_utf8_lossy(data).into_owned(),
        DocumentKind::Pdf => pdf_text(data)?,
        DocumentKind::Docx => docx_text(data)?,
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Collapse line breaks and whitespace runs into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The PDF parser panics on some malformed input; that is reported as a read error.
fn pdf_text(data: &[u8]) -> Result<String, ExtractError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(result) => result.map_err(|e| ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("malformed document".to_string())),
    }
}

/// Concatenate the `w:t` runs of the main document part.
fn docx_text(data: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut body = Vec::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_end(&mut body)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut reader = Reader::from_reader(BufReader::new(body.as_slice()));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run = false,
                b"p" => text.push(' '),
                _ => {}
            },
            Ok(Event::Empty(e)) if matches!(e.local_name().as_ref(), b"tab" | b"br" | b"cr") => {
                text.push(' ');
            }
            Ok(Event::Text(t)) if in_run => {
                let unescaped = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(
            DocumentKind::detect(Some("application/pdf"), "x.bin"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect(Some("text/plain; charset=utf-8"), "x"),
            Some(DocumentKind::Txt)
        );
        assert_eq!(
            DocumentKind::detect(Some(DOCX_CONTENT_TYPE), "x"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::detect(Some("image/png"), "speech.txt"), None);
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        assert_eq!(
            DocumentKind::detect(None, "Speech.PDF"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), "talk.docx"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::detect(None, "notes.md"), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Hello\r\nworld\n\n\tagain  "),
            "Hello world again"
        );
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_extract_txt() {
        let text = extract_text(DocumentKind::Txt, b"Line one\nLine two\n").unwrap();
        assert_eq!(text, "Line one Line two");
    }

    #[test]
    fn test_extract_blank_txt_is_empty_error() {
        assert!(matches!(
            extract_text(DocumentKind::Txt, b"\n\n  "),
            Err(ExtractError::Empty)
        ));
    }

    #[test]
    fn test_extract_docx() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Good evening</w:t></w:r><w:r><w:t xml:space="preserve">, everyone.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Fish &amp; chips</w:t><w:tab/><w:t>tonight</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let text = extract_text(DocumentKind::Docx, &build_docx(xml)).unwrap();
        assert_eq!(text, "Good evening, everyone. Fish & chips tonight");
    }

    #[test]
    fn test_extract_docx_rejects_non_zip() {
        assert!(matches!(
            extract_text(DocumentKind::Docx, b"plain text"),
            Err(ExtractError::Docx(_))
        ));
    }

    /// A one-page PDF with two lines of Helvetica text and a correct xref table.
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut stream = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                stream.push_str("0 -16 Td\n");
            }
            stream.push_str(&format!("({line}) Tj\n"));
        }
        stream.push_str("ET");

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = pdf.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            table.push_str(&format!("{offset:010} 00000 n \n"));
        }
        table.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(table.as_bytes());
        pdf
    }

    #[test]
    fn test_extract_pdf() {
        let pdf = build_pdf(&["Welcome to the show", "Tonight we read slowly"]);
        let text = extract_text(DocumentKind::Pdf, &pdf).unwrap();
        assert_eq!(text, "Welcome to the show Tonight we read slowly");
    }

    #[tokio::test]
    async fn test_extract_pdf_on_blocking_pool() {
        let pdf = build_pdf(&["Good   evening"]);
        assert_eq!(
            extract(DocumentKind::Pdf, pdf).await.unwrap(),
            "Good evening"
        );
    }

    #[test]
    fn test_extract_pdf_rejects_garbage() {
        assert!(matches!(
            extract_text(DocumentKind::Pdf, b"not a pdf"),
            Err(ExtractError::Pdf(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_async() {
        let text = extract(DocumentKind::Txt, b"async  text".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "async text");
    }
}
