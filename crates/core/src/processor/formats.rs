//! Canonical document format resolution.

use serde::{Deserialize, Serialize};

use crate::submission::Blob;

/// Canonical document format tags.
///
/// Resolution never fails: anything outside the mapping table is `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Odt,
    Rtf,
    Markdown,
    Html,
    PlainText,
    Csv,
    Epub,
    Unknown,
}

/// Explicit content-type/extension mapping table.
const FORMAT_TABLE: &[(DocumentFormat, &str, &[&str])] = &[
    (DocumentFormat::Pdf, "application/pdf", &["pdf"]),
    (
        DocumentFormat::Docx,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    (
        DocumentFormat::Odt,
        "application/vnd.oasis.opendocument.text",
        &["odt"],
    ),
    (DocumentFormat::Rtf, "application/rtf", &["rtf"]),
    (DocumentFormat::Markdown, "text/markdown", &["md", "markdown"]),
    (DocumentFormat::Html, "text/html", &["html", "htm"]),
    (DocumentFormat::PlainText, "text/plain", &["txt", "text"]),
    (DocumentFormat::Csv, "text/csv", &["csv"]),
    (DocumentFormat::Epub, "application/epub+zip", &["epub"]),
];

impl DocumentFormat {
    /// Canonical tag, e.g. "PDF", "Markdown", "Unknown".
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Odt => "ODT",
            DocumentFormat::Rtf => "RTF",
            DocumentFormat::Markdown => "Markdown",
            DocumentFormat::Html => "HTML",
            DocumentFormat::PlainText => "PlainText",
            DocumentFormat::Csv => "CSV",
            DocumentFormat::Epub => "EPUB",
            DocumentFormat::Unknown => "Unknown",
        }
    }

    /// Canonical MIME type handed to the document parser.
    pub fn mime_type(&self) -> &'static str {
        FORMAT_TABLE
            .iter()
            .find(|(format, _, _)| format == self)
            .map(|(_, mime, _)| *mime)
            .unwrap_or("application/octet-stream")
    }

    /// Look up a format by declared content type. Parameters after ';' are
    /// ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        FORMAT_TABLE
            .iter()
            .find(|(_, mime, _)| *mime == essence)
            .map(|(format, _, _)| *format)
    }

    /// Look up a format by filename extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        FORMAT_TABLE
            .iter()
            .find(|(_, _, extensions)| extensions.contains(&extension.as_str()))
            .map(|(format, _, _)| *format)
    }
}

/// Resolve the canonical format of a document blob.
///
/// Declared content type wins, then the filename extension, then a
/// magic-byte sniff. Anything unmapped resolves to `Unknown`.
pub fn resolve_format(blob: &Blob) -> DocumentFormat {
    if let Some(format) = blob
        .content_type
        .as_deref()
        .and_then(DocumentFormat::from_content_type)
    {
        return format;
    }

    if let Some(format) = blob
        .filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .and_then(DocumentFormat::from_extension)
    {
        return format;
    }

    if let Some(kind) = infer::get(&blob.data) {
        if let Some(format) = DocumentFormat::from_content_type(kind.mime_type()) {
            return format;
        }
    }

    DocumentFormat::Unknown
}
