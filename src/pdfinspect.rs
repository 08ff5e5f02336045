//! Re-parses produced reports with an independent PDF reader.

use crate::types::{Pt, Size};
use lopdf::{Document as LoDocument, Object as LoObject};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfInspectError {
    #[error("could not read pdf: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse pdf: {0}")]
    Parse(String),
    #[error("report is encrypted")]
    Encrypted,
    #[error("report has no pages")]
    NoPages,
}

impl PdfInspectError {
    /// Stable machine-readable code for CLI and host output.
    pub fn code(&self) -> &'static str {
        match self {
            PdfInspectError::Io(_) => "PDF_IO_ERROR",
            PdfInspectError::Parse(_) => "PDF_PARSE_FAILED",
            PdfInspectError::Encrypted => "PDF_ENCRYPTED_UNSUPPORTED",
            PdfInspectError::NoPages => "PDF_EMPTY_OR_NO_PAGES",
        }
    }
}

/// What an independent parser sees in a produced report.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub file_size_bytes: usize,
    pub title: Option<String>,
    /// Width and height in points from the first page's MediaBox.
    pub first_page_size: Option<(f32, f32)>,
}

impl PdfInspectReport {
    /// True when the first page is `size` within half a point.
    pub fn has_page_size(&self, size: Size) -> bool {
        let Some((width, height)) = self.first_page_size else {
            return false;
        };
        let close = |found: f32, want: Pt| (found - want.to_f32()).abs() <= 0.5;
        close(width, size.width) && close(height, size.height)
    }
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<PdfInspectReport, PdfInspectError> {
    let pdf = LoDocument::load_mem(bytes).map_err(|err| PdfInspectError::Parse(err.to_string()))?;
    Ok(PdfInspectReport {
        pdf_version: pdf.version.clone(),
        page_count: pdf.get_pages().len(),
        encrypted: pdf.is_encrypted(),
        file_size_bytes: bytes.len(),
        title: info_title(&pdf),
        first_page_size: first_page_size(&pdf),
    })
}

pub fn inspect_pdf_path(path: &Path) -> Result<PdfInspectReport, PdfInspectError> {
    let bytes = std::fs::read(path)?;
    inspect_pdf_bytes(&bytes)
}

fn info_title(pdf: &LoDocument) -> Option<String> {
    let info_id = pdf.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = pdf.get_dictionary(info_id).ok()?;
    match info.get(b"Title").ok()? {
        LoObject::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn number(obj: &LoObject) -> Option<f32> {
    match obj {
        LoObject::Integer(value) => Some(*value as f32),
        LoObject::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn first_page_size(pdf: &LoDocument) -> Option<(f32, f32)> {
    let (_, page_id) = pdf.get_pages().into_iter().next()?;
    let page = pdf.get_dictionary(page_id).ok()?;
    let LoObject::Array(media_box) = page.get(b"MediaBox").ok()? else {
        return None;
    };
    let [x0, y0, x1, y1] = media_box.as_slice() else {
        return None;
    };
    Some((number(x1)? - number(x0)?, number(y1)? - number(y0)?))
}

/// A report is deliverable when it is unencrypted and has pages.
pub fn require_deliverable(report: &PdfInspectReport) -> Result<(), PdfInspectError> {
    if report.encrypted {
        return Err(PdfInspectError::Encrypted);
    }
    if report.page_count == 0 {
        return Err(PdfInspectError::NoPages);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DocumentCanvas, PdfCanvas, TextAlign};
    use crate::pdf::DocumentInfo;

    fn letter_report_bytes() -> Vec<u8> {
        let mut canvas = PdfCanvas::new(Size::letter());
        canvas
            .text("HELLO", Pt::from_i32(72), Pt::from_i32(72), TextAlign::Left)
            .unwrap();
        canvas.add_page().unwrap();
        canvas
            .save(&DocumentInfo {
                title: "Credibility Report (Example)".to_string(),
                subject: None,
                producer: "truthlens".to_string(),
                created_ms: 0,
            })
            .unwrap()
    }

    #[test]
    fn reads_version_pages_title_and_size() {
        let bytes = letter_report_bytes();
        let report = inspect_pdf_bytes(&bytes).unwrap();
        assert_eq!(report.page_count, 2);
        assert_eq!(report.pdf_version, "1.7");
        assert_eq!(report.file_size_bytes, bytes.len());
        assert_eq!(report.title.as_deref(), Some("Credibility Report (Example)"));
        assert!(report.has_page_size(Size::letter()));
        assert!(!report.has_page_size(Size::a4()));
        require_deliverable(&report).unwrap();
    }

    #[test]
    fn malformed_bytes_fail_to_parse() {
        let err = inspect_pdf_bytes(b"not a pdf").unwrap_err();
        assert_eq!(err.code(), "PDF_PARSE_FAILED");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = inspect_pdf_path(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, PdfInspectError::Io(_)));
    }

    #[test]
    fn zero_pages_or_encryption_is_not_deliverable() {
        let mut report = PdfInspectReport {
            pdf_version: "1.7".to_string(),
            page_count: 0,
            encrypted: false,
            file_size_bytes: 0,
            title: None,
            first_page_size: None,
        };
        assert_eq!(
            require_deliverable(&report).unwrap_err().code(),
            "PDF_EMPTY_OR_NO_PAGES"
        );
        report.page_count = 1;
        report.encrypted = true;
        assert!(matches!(
            require_deliverable(&report),
            Err(PdfInspectError::Encrypted)
        ));
    }

    #[test]
    fn path_and_bytes_agree() {
        let bytes = letter_report_bytes();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, &bytes).unwrap();
        assert_eq!(
            inspect_pdf_path(&path).unwrap(),
            inspect_pdf_bytes(&bytes).unwrap()
        );
    }
}
