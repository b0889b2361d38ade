use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::InputError;

static DOCX_TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("text run pattern is valid"));

static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Decide the format from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, InputError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" => Ok(DocumentKind::Txt),
            _ => Err(InputError::UnsupportedFileType(extension)),
        }
    }
}

/// Turns an uploaded file into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, filename: &str, bytes: &[u8]) -> Result<String, InputError>;
}

/// PDF, DOCX and UTF-8 text files.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentReader;

impl TextExtractor for DocumentReader {
    fn extract_text(&self, filename: &str, bytes: &[u8]) -> Result<String, InputError> {
        let kind = DocumentKind::from_filename(filename)?;

        if bytes.is_empty() {
            return Err(InputError::EmptyUpload);
        }

        let text = match kind {
            DocumentKind::Pdf => read_pdf(bytes)?,
            DocumentKind::Docx => read_docx(bytes)?,
            DocumentKind::Txt => String::from_utf8(bytes.to_vec())
                .map_err(|_| InputError::Unreadable("text file is not valid UTF-8".to_string()))?,
        };

        if text.trim().is_empty() {
            return Err(InputError::EmptyText);
        }

        Ok(text)
    }
}

fn read_pdf(bytes: &[u8]) -> Result<String, InputError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| InputError::Unreadable(e.to_string()))
}

fn read_docx(bytes: &[u8]) -> Result<String, InputError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| InputError::Unreadable(format!("not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| InputError::Unreadable("DOCX has no word/document.xml".to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| InputError::Unreadable(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

/// One output line per `<w:p>` paragraph.
fn docx_xml_to_text(xml: &str) -> String {
    xml.split("</w:p>")
        .map(|paragraph| {
            DOCX_TEXT_RUN
                .captures_iter(paragraph)
                .filter_map(|caps| caps.get(1))
                .map(|m| decode_entities(m.as_str()))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Decode the XML/HTML entities that show up in DOCX runs and caption
/// tracks. `&amp;` is decoded last so escaped entities stay escaped once.
pub(crate) fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
