use crate::error::Error;
use lopdf::Document;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

lazy_static::lazy_static! {
    static ref DOCX_TOKEN: Regex =
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab/>|<w:br/>").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

pub fn extract_text(path: &Path) -> Result<String, Error> {
    match DocumentKind::from_path(path) {
        Some(DocumentKind::Pdf) => extract_pdf_text(path),
        Some(DocumentKind::Docx) => extract_docx_text(path),
        None => Err(Error::Other(format!("Unsupported document: {}", path.display()))),
    }
}

/// Text of every page that can be decoded; unreadable pages are skipped.
pub fn extract_pdf_text(path: &Path) -> Result<String, Error> {
    let document = Document::load(path)?;
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!("Page {} of {}: {}", page_number, path.display(), e),
        }
    }
    debug!("{} chars of text from {}", text.len(), path.display());
    Ok(text)
}

/// Paragraph text from `word/document.xml`, one line per paragraph.
pub fn extract_docx_text(path: &Path) -> Result<String, Error> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;
    Ok(docx_xml_to_text(&xml))
}

pub fn docx_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    for cap in DOCX_TOKEN.captures_iter(xml) {
        match cap.get(1) {
            Some(run) => text.push_str(&unescape_xml(run.as_str())),
            None => match &cap[0] {
                "</w:p>" => text.push('\n'),
                "<w:tab/>" => text.push('\t'),
                _ => text.push('\n'),
            },
        }
    }
    text
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_xml_to_text() {
        let xml = concat!(
            r#"<w:document><w:body><w:tbl/>"#,
            r#"<w:p><w:r><w:t>Master Services</w:t></w:r><w:r><w:t xml:space="preserve"> Agreement</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Effective Date:</w:t><w:tab/><w:t>01/02/2023</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Smith &amp; Sons</w:t><w:t/></w:r></w:p>"#,
            r#"</w:body></w:document>"#
        );
        assert_eq!(
            docx_xml_to_text(xml),
            "Master Services Agreement\nEffective Date:\t01/02/2023\nSmith & Sons\n"
        );
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_path(Path::new("a.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("a.docx")), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_path(Path::new("a.doc")), None);
    }
}
