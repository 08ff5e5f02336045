use crate::canvas::{Command, Document, Page, RectMode};
use crate::font::FontStyle;
use crate::types::{Color, Pt};
use chrono::{DateTime, Utc};
use fixed::types::I32F32;
use std::io::{self, Write};

/// Document-level metadata written into the trailer's `/Info` dictionary.
/// `created_ms` is the only time-dependent input to the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: Option<String>,
    pub producer: String,
    pub created_ms: i64,
}

const PDF_HEADER: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";
const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_FIRST_FONT_ID: usize = 3;

pub fn document_to_pdf(document: &Document, info: &DocumentInfo) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_document(document, info, &mut out)?;
    Ok(out)
}

pub fn write_document<W: Write>(
    document: &Document,
    info: &DocumentInfo,
    writer: &mut W,
) -> io::Result<usize> {
    if document.pages.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "document has no pages",
        ));
    }

    let font_count = FontStyle::ALL.len();
    let info_id = PDF_FIRST_FONT_ID + font_count;
    let first_page_id = info_id + 1;
    // Each page takes two ids: the page dictionary and its content stream.
    let page_ids: Vec<usize> = (0..document.pages.len())
        .map(|idx| first_page_id + idx * 2)
        .collect();

    let mut objects: Vec<String> = Vec::with_capacity(info_id + page_ids.len() * 2);
    objects.push(format!(
        "<< /Type /Catalog /Pages {} 0 R >>",
        PDF_PAGES_ID
    ));
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        page_ids.len()
    ));
    for style in FontStyle::ALL {
        objects.push(font_object(style));
    }
    objects.push(info_object(info));

    let font_resources = FontStyle::ALL
        .iter()
        .enumerate()
        .map(|(idx, style)| {
            format!("/{} {} 0 R", style.resource_name(), PDF_FIRST_FONT_ID + idx)
        })
        .collect::<Vec<_>>()
        .join(" ");
    let page_height = document.page_size.height;
    for (page, page_id) in document.pages.iter().zip(page_ids.iter()) {
        objects.push(format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {} >> >> /Contents {} 0 R >>",
            PDF_PAGES_ID,
            fmt_pt(document.page_size.width),
            fmt_pt(page_height),
            font_resources,
            page_id + 1
        ));
        objects.push(stream_object(&render_page(page, page_height)));
    }

    write_pdf(writer, &objects, PDF_CATALOG_ID, info_id)
}

fn font_object(style: FontStyle) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        style.base_font_name()
    )
}

fn info_object(info: &DocumentInfo) -> String {
    let mut entries = vec![
        format!("/Title {}", pdf_text_string(&info.title)),
        format!("/Producer {}", pdf_text_string(&info.producer)),
    ];
    if let Some(subject) = info.subject.as_deref() {
        entries.push(format!("/Subject {}", pdf_text_string(subject)));
    }
    entries.push(format!("/CreationDate ({})", pdf_date(info.created_ms)));
    format!("<< {} >>", entries.join(" "))
}

fn pdf_date(created_ms: i64) -> String {
    let stamp = DateTime::<Utc>::from_timestamp_millis(created_ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    stamp.format("D:%Y%m%d%H%M%SZ").to_string()
}

fn pdf_text_string(input: &str) -> String {
    format!("({})", encode_winansi_pdf_string(input))
}

fn stream_object(content: &str) -> String {
    let length = content.len();
    format!("<< /Length {} >>\nstream\n{}\nendstream", length, content)
}

fn write_pdf<W: Write>(
    writer: &mut W,
    objects: &[String],
    catalog_id: usize,
    info_id: usize,
) -> io::Result<usize> {
    let mut offset = 0usize;
    write_bytes(writer, PDF_HEADER, &mut offset)?;

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(offset);
        write_str(writer, &format!("{} 0 obj\n", index + 1), &mut offset)?;
        write_str(writer, body, &mut offset)?;
        write_bytes(writer, b"\nendobj\n", &mut offset)?;
    }

    let xref_start = offset;
    write_str(
        writer,
        &format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1),
        &mut offset,
    )?;
    for entry in offsets {
        write_str(writer, &format!("{:010} 00000 n \n", entry), &mut offset)?;
    }
    write_str(
        writer,
        &format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            catalog_id,
            info_id,
            xref_start
        ),
        &mut offset,
    )?;
    Ok(offset)
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

fn render_page(page: &Page, page_height: Pt) -> String {
    let mut out = String::new();
    let mut font_style = FontStyle::Normal;
    let mut font_size = Pt::from_i32(12);

    for cmd in &page.commands {
        match cmd {
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFont { style, size } => {
                font_style = *style;
                font_size = *size;
            }
            Command::DrawString { x, y, text } => {
                // Our y is the top of the line box; PDF wants the baseline, bottom-left origin.
                let baseline = page_height - *y - font_size;
                out.push_str("BT\n");
                out.push_str(&format!(
                    "/{} {} Tf\n",
                    font_style.resource_name(),
                    fmt_pt(font_size)
                ));
                out.push_str(&format!("{} {} Td\n", fmt_pt(*x), fmt_pt(baseline)));
                out.push_str(&format!("({}) Tj\n", encode_winansi_pdf_string(text)));
                out.push_str("ET\n");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
                mode,
            } => {
                let op = match mode {
                    RectMode::Fill => "f",
                    RectMode::Stroke => "S",
                    RectMode::FillStroke => "B",
                };
                out.push_str(&format!(
                    "{} {} {} {} re\n{}\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height),
                    op
                ));
            }
            Command::DrawLine { x1, y1, x2, y2 } => {
                out.push_str(&format!(
                    "{} {} m\n{} {} l\nS\n",
                    fmt_pt(*x1),
                    fmt_pt(page_height - *y1),
                    fmt_pt(*x2),
                    fmt_pt(page_height - *y2)
                ));
            }
        }
    }

    out
}

fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        '\u{0000}'..='\u{007F}' => Some(ch as u8),
        '\u{00A0}'..='\u{00FF}' => Some(ch as u8),
        '\u{20AC}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2122}' => Some(0x99),
        _ => None,
    }
}

fn ascii_fallback(ch: char) -> Option<&'static str> {
    match ch {
        '\u{2265}' => Some(">="),
        '\u{2264}' => Some("<="),
        _ => None,
    }
}

/// Characters in `text` the base-14 fonts cannot show; each is written as `?`.
pub(crate) fn unencodable_chars(text: &str) -> usize {
    text.chars()
        .filter(|ch| ascii_fallback(*ch).is_none() && winansi_byte(*ch).is_none())
        .count()
}

fn encode_winansi_pdf_string(input: &str) -> String {
    let mut out = String::new();
    let mut replaced = 0usize;
    for ch in input.chars() {
        if let Some(fallback) = ascii_fallback(ch) {
            out.push_str(fallback);
            continue;
        }
        let byte = winansi_byte(ch).unwrap_or_else(|| {
            replaced += 1;
            b'?'
        });
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    if replaced > 0 {
        log::debug!(
            "{} character(s) outside WinAnsi written as '?' in {:?}",
            replaced,
            input
        );
    }
    out
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    fn info(created_ms: i64) -> DocumentInfo {
        DocumentInfo {
            title: "Report (draft)".to_string(),
            subject: None,
            producer: "TruthLens".to_string(),
            created_ms,
        }
    }

    fn one_page_document(commands: Vec<Command>) -> Document {
        Document {
            page_size: Size::a4(),
            pages: vec![Page::from_commands(commands)],
        }
    }

    fn count_token(bytes: &[u8], token: &[u8]) -> usize {
        if token.is_empty() || bytes.len() < token.len() {
            return 0;
        }
        bytes.windows(token.len()).filter(|w| *w == token).count()
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = Document {
            page_size: Size::a4(),
            pages: Vec::new(),
        };
        let err = document_to_pdf(&doc, &info(0)).expect_err("no pages");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn writes_header_xref_and_trailer() {
        let doc = one_page_document(vec![Command::DrawString {
            x: Pt::from_i32(10),
            y: Pt::from_i32(10),
            text: "hello".to_string(),
        }]);
        let bytes = document_to_pdf(&doc, &info(0)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert_eq!(count_token(&bytes, b"xref\n"), 1);
        assert_eq!(count_token(&bytes, b"(hello) Tj"), 1);
        assert_eq!(count_token(&bytes, b"/BaseFont /Helvetica-Bold"), 1);
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let doc = one_page_document(Vec::new());
        let bytes = document_to_pdf(&doc, &info(0)).unwrap();
        let xref_at = bytes
            .windows(5)
            .position(|w| w == b"xref\n")
            .unwrap();
        let tail = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        let entries: Vec<usize> = tail
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        for (idx, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", idx + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn creation_date_is_the_only_time_dependent_part() {
        let doc = one_page_document(Vec::new());
        let a = document_to_pdf(&doc, &info(0)).unwrap();
        let b = document_to_pdf(&doc, &info(0)).unwrap();
        let c = document_to_pdf(&doc, &info(1_700_000_000_000)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(count_token(&c, b"/CreationDate (D:20231114221320Z)"), 1);
    }

    #[test]
    fn winansi_escapes_delimiters_and_maps_bullets() {
        assert_eq!(encode_winansi_pdf_string("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(encode_winansi_pdf_string("\u{2022}"), "\\225");
        assert_eq!(encode_winansi_pdf_string("\u{4E2D}"), "?");
    }

    #[test]
    fn unencodable_characters_are_counted() {
        assert_eq!(unencodable_chars("Le Monde"), 0);
        assert_eq!(unencodable_chars("caf\u{e9} \u{2265} \u{201C}x\u{201D}"), 0);
        assert_eq!(unencodable_chars("\u{4E2D}\u{6587} News"), 2);
        assert_eq!(encode_winansi_pdf_string("\u{4E2D}\u{6587} News"), "?? News");
    }

    #[test]
    fn milli_formatting_trims_trailing_zeros() {
        assert_eq!(format_milli(12_500), "12.5");
        assert_eq!(format_milli(-3_000), "-3");
        assert_eq!(format_milli(1), "0.001");
        assert_eq!(fmt(f32::NAN), "0");
    }
}
