//! Cursor-driven layout primitives.
//!
//! Every unit of content (line, table row chunk, title block, score row) is
//! checked against the bottom margin before it is drawn, so nothing is ever
//! written partially and then discovered to overflow.

use crate::ReportConfig;
use crate::canvas::{DocumentCanvas, RectMode, TextAlign};
use crate::cursor::ReportCursor;
use crate::debug::DebugLogger;
use crate::doc_context::PageContext;
use crate::error::ReportError;
use crate::font::FontStyle;
use crate::metrics::{ReportMetrics, SectionMetrics};
use crate::rating::ScoreTone;
use crate::types::{Color, Pt};
use serde_json::json;

pub const BULLET: &str = "\u{2022}";

pub mod palette {
    use crate::types::Color;

    pub const TEXT: Color = Color::from_rgb8(31, 41, 55);
    pub const MUTED: Color = Color::from_rgb8(107, 114, 128);
    pub const ACCENT: Color = Color::from_rgb8(37, 99, 235);
    pub const RULE: Color = Color::from_rgb8(209, 213, 219);
    pub const TABLE_HEADER: Color = Color::from_rgb8(243, 244, 246);
    pub const BAR_TRACK: Color = Color::from_rgb8(229, 231, 235);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLevel {
    Section,
    Subsection,
}

impl TitleLevel {
    fn font_size(self, base: Pt) -> Pt {
        match self {
            TitleLevel::Section => base.mul_ratio(8, 5),
            TitleLevel::Subsection => base.mul_ratio(6, 5),
        }
    }

    fn space_before(self, base: Pt) -> Pt {
        match self {
            TitleLevel::Section => base,
            TitleLevel::Subsection => base / 2,
        }
    }

    fn space_after(self, base: Pt) -> Pt {
        match self {
            TitleLevel::Section => base.mul_ratio(3, 5),
            TitleLevel::Subsection => base / 4,
        }
    }
}

pub fn line_height(font_size: Pt) -> Pt {
    font_size.mul_ratio(6, 5)
}

/// Font size of the running header and the footer.
fn chrome_font_size(base: Pt) -> Pt {
    base.mul_ratio(4, 5)
}

/// Smallest top margin that holds the running header: text from `top * 3/10`,
/// rule at `top * 3/4`, so the text line must fit in `top * 9/20`.
pub(crate) fn min_top_margin(base: Pt) -> Pt {
    line_height(chrome_font_size(base)).mul_ratio(20, 9)
}

/// Smallest bottom margin that holds the footer: text from
/// `bottom * 2/5` below the limit must end on the page.
pub(crate) fn min_bottom_margin(base: Pt) -> Pt {
    line_height(chrome_font_size(base)).mul_ratio(5, 3)
}

/// Number of filled bar segments: `round(score / max_score * bar_length)`,
/// with the ratio clamped to `0..=1`. Zero when `max_score <= 0`.
pub fn bar_fill_count(score: f64, max_score: f64, bar_length: usize) -> usize {
    if !(max_score > 0.0) || !score.is_finite() {
        return 0;
    }
    let ratio = (score / max_score).clamp(0.0, 1.0);
    (ratio * bar_length as f64).round() as usize
}

/// Integral values without decimals, everything else with one. Never "NaN".
pub fn format_score(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let value = value + 0.0;
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn pt_from_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

struct TableGeometry {
    column_width: Pt,
    cell_width: Pt,
    pad_x: Pt,
    pad_y: Pt,
    line_height: Pt,
}

impl TableGeometry {
    fn row_height(&self, lines: usize) -> Pt {
        self.line_height * pt_from_count(lines.max(1)) + self.pad_y * 2
    }

    fn lines_within(&self, available: Pt) -> usize {
        let usable = available - self.pad_y * 2;
        if usable < self.line_height {
            return 0;
        }
        let per_line = self.line_height.to_milli_i64().max(1);
        (usable.to_milli_i64() / per_line) as usize
    }
}

/// Layout state for one generation: the canvas, the cursor and the counters.
pub struct ReportLayout<C: DocumentCanvas> {
    canvas: C,
    cursor: ReportCursor,
    base_font_size: Pt,
    bar_length: usize,
    header_label: String,
    running_source: Option<String>,
    metrics: ReportMetrics,
    current_section: Option<usize>,
    debug: Option<DebugLogger>,
}

impl<C: DocumentCanvas> ReportLayout<C> {
    pub fn new(canvas: C, config: &ReportConfig) -> Self {
        let cursor = ReportCursor::new(canvas.page_size(), config.margins);
        Self {
            canvas,
            cursor,
            base_font_size: config.base_font_size,
            bar_length: config.bar_length,
            header_label: config.product_name.clone(),
            running_source: None,
            metrics: ReportMetrics::default(),
            current_section: None,
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Option<DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn cursor(&self) -> &ReportCursor {
        &self.cursor
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn metrics(&self) -> &ReportMetrics {
        &self.metrics
    }

    pub fn base_font_size(&self) -> Pt {
        self.base_font_size
    }

    pub fn body_line_height(&self) -> Pt {
        line_height(self.base_font_size)
    }

    pub fn into_parts(self) -> (C, ReportMetrics) {
        (self.canvas, self.metrics)
    }

    /// Text shown on the right of the running header of pages 2..N.
    pub fn set_running_source(&mut self, source: impl Into<String>) {
        self.running_source = Some(source.into());
    }

    pub fn begin_section(&mut self, name: &'static str) {
        self.end_section();
        log::debug!("composing section {} from page {}", name, self.cursor.page());
        if let Some(debug) = &self.debug {
            debug.event(
                "report.section",
                json!({
                    "section": name,
                    "page": self.cursor.page(),
                    "y": self.cursor.y().to_f32(),
                }),
            );
            debug.increment("report.section", 1);
        }
        self.metrics.sections.push(SectionMetrics {
            name,
            start_page: self.cursor.page(),
            end_page: self.cursor.page(),
            page_breaks: 0,
            lines: 0,
        });
        self.current_section = Some(self.metrics.sections.len() - 1);
    }

    pub fn end_section(&mut self) {
        if let Some(idx) = self.current_section.take() {
            self.metrics.sections[idx].end_page = self.cursor.page();
        }
    }

    fn section_name(&self) -> Option<&'static str> {
        self.current_section
            .map(|idx| self.metrics.sections[idx].name)
    }

    pub(crate) fn use_font(&mut self, style: FontStyle, size: Pt, color: Color) {
        self.canvas.set_font(size, style);
        self.canvas.set_text_color(color);
    }

    fn count_lines(&mut self, lines: usize) {
        self.metrics.lines += lines;
        if let Some(idx) = self.current_section {
            self.metrics.sections[idx].lines += lines;
        }
    }

    /// Starts a new page when `needed` does not fit above the bottom margin.
    /// Returns whether a break occurred.
    pub fn check_page_break(&mut self, needed: Pt) -> Result<bool, ReportError> {
        if self.cursor.fits(needed) {
            return Ok(false);
        }
        self.break_page(needed)?;
        Ok(true)
    }

    fn break_page(&mut self, needed: Pt) -> Result<(), ReportError> {
        let from_page = self.cursor.page();
        self.canvas.add_page()?;
        self.cursor.next_page();
        self.draw_running_header()?;

        self.metrics.page_breaks += 1;
        if let Some(idx) = self.current_section {
            self.metrics.sections[idx].page_breaks += 1;
            self.metrics.sections[idx].end_page = self.cursor.page();
        }
        let section = self.section_name().unwrap_or("none");
        log::debug!(
            "page break in {} from page {} to {} (needed {}pt)",
            section,
            from_page,
            self.cursor.page(),
            needed.to_f32()
        );
        if let Some(debug) = &self.debug {
            debug.event(
                "report.page_break",
                json!({
                    "code": "PAGE_BREAK_TRIGGER",
                    "section": section,
                    "from_page": from_page,
                    "to_page": self.cursor.page(),
                    "needed": needed.to_f32(),
                }),
            );
            debug.increment("report.page_break", 1);
        }
        Ok(())
    }

    fn draw_running_header(&mut self) -> Result<(), ReportError> {
        let top = self.cursor.margins().top;
        let size = chrome_font_size(self.base_font_size);
        let text_y = top.mul_ratio(3, 10);
        let rule_y = top.mul_ratio(3, 4);
        let (left, right) = (self.cursor.left(), self.cursor.right());

        self.canvas.mark_region("header");
        self.use_font(FontStyle::Bold, size, palette::MUTED);
        let label = self.header_label.clone();
        self.canvas.text(&label, left, text_y, TextAlign::Left)?;
        if let Some(source) = self.running_source.clone() {
            self.use_font(FontStyle::Normal, size, palette::MUTED);
            self.canvas.text(&source, right, text_y, TextAlign::Right)?;
        }
        self.canvas.set_draw_color(palette::RULE);
        self.canvas.set_line_width(Pt::from_f32(0.5));
        self.canvas.line(left, rule_y, right, rule_y)?;
        self.canvas.mark_region("body");
        Ok(())
    }

    fn write_lines(
        &mut self,
        lines: &[String],
        x: Pt,
        style: FontStyle,
        size: Pt,
        color: Color,
    ) -> Result<(), ReportError> {
        let height = line_height(size);
        for line in lines {
            self.check_page_break(height)?;
            self.use_font(style, size, color);
            self.canvas.text(line, x, self.cursor.y(), TextAlign::Left)?;
            self.cursor.advance(height);
            self.count_lines(1);
        }
        Ok(())
    }

    fn wrap(&mut self, text: &str, style: FontStyle, size: Pt, width: Pt) -> Vec<String> {
        self.canvas.set_font(size, style);
        self.canvas.split_text_to_size(text, width)
    }

    /// Heading. The block is pre-checked together with one body line so a
    /// heading never ends a page on its own.
    pub fn add_title(&mut self, text: &str, level: TitleLevel) -> Result<(), ReportError> {
        let base = self.base_font_size;
        let size = level.font_size(base);
        let lines = self.wrap(text, FontStyle::Bold, size, self.cursor.content_width());
        if lines.is_empty() {
            return Ok(());
        }
        let before = if self.cursor.is_at_top() {
            Pt::ZERO
        } else {
            level.space_before(base)
        };
        let block = before
            + line_height(size) * pt_from_count(lines.len())
            + level.space_after(base)
            + self.body_line_height();
        if !self.check_page_break(block)? {
            self.cursor.advance(before);
        }
        let color = match level {
            TitleLevel::Section => palette::ACCENT,
            TitleLevel::Subsection => palette::TEXT,
        };
        let left = self.cursor.left();
        self.write_lines(&lines, left, FontStyle::Bold, size, color)?;
        if level == TitleLevel::Section && self.cursor.fits(level.space_after(base)) {
            let y = self.cursor.y() + Pt::from_i32(1);
            self.canvas.set_draw_color(palette::ACCENT);
            self.canvas.set_line_width(Pt::from_f32(1.0));
            let right = self.cursor.right();
            self.canvas.line(left, y, right, y)?;
        }
        self.cursor.advance(level.space_after(base));
        Ok(())
    }

    /// Wrapped body paragraph. `wrap_width` is capped at the content width.
    pub fn add_text(&mut self, text: &str, wrap_width: Option<Pt>) -> Result<(), ReportError> {
        self.add_styled_text(text, wrap_width, FontStyle::Normal, palette::TEXT)
    }

    pub fn add_styled_text(
        &mut self,
        text: &str,
        wrap_width: Option<Pt>,
        style: FontStyle,
        color: Color,
    ) -> Result<(), ReportError> {
        let content = self.cursor.content_width();
        let width = wrap_width.map_or(content, |w| w.min(content));
        let size = self.base_font_size;
        let lines = self.wrap(text, style, size, width);
        let left = self.cursor.left();
        self.write_lines(&lines, left, style, size, color)?;
        self.cursor.advance(size.mul_ratio(2, 5));
        Ok(())
    }

    pub fn add_bullet(&mut self, text: &str) -> Result<(), ReportError> {
        let size = self.base_font_size;
        let height = line_height(size);
        let indent = size.mul_ratio(3, 2);
        let left = self.cursor.left();
        let width = self.cursor.content_width() - indent;
        let lines = self.wrap(text, FontStyle::Normal, size, width);
        for (idx, line) in lines.iter().enumerate() {
            self.check_page_break(height)?;
            self.use_font(FontStyle::Normal, size, palette::TEXT);
            let y = self.cursor.y();
            if idx == 0 {
                self.canvas.text(BULLET, left + size / 2, y, TextAlign::Left)?;
            }
            self.canvas.text(line, left + indent, y, TextAlign::Left)?;
            self.cursor.advance(height);
            self.count_lines(1);
        }
        self.cursor.advance(size / 5);
        Ok(())
    }

    /// Label, segmented bar and `score/max` on one row.
    pub fn add_score_row(
        &mut self,
        label: &str,
        score: f64,
        max_score: f64,
    ) -> Result<(), ReportError> {
        let size = self.base_font_size;
        let height = line_height(size);
        let content = self.cursor.content_width();
        let left = self.cursor.left();
        let right = self.cursor.right();
        let label_lines = self.wrap(label, FontStyle::Normal, size, content.mul_ratio(2, 5));
        let row_lines = label_lines.len().max(1);
        let row_height = height * pt_from_count(row_lines) + size / 2;

        self.check_page_break(row_height)?;
        let y = self.cursor.y();
        self.use_font(FontStyle::Normal, size, palette::TEXT);
        for (idx, line) in label_lines.iter().enumerate() {
            self.canvas
                .text(line, left, y + height * pt_from_count(idx), TextAlign::Left)?;
        }

        let segments = self.bar_length.max(1);
        let filled = bar_fill_count(score, max_score, segments);
        let tone = ScoreTone::for_ratio(if score.is_finite() { score } else { 0.0 }, max_score);
        let bar_x = left + content.mul_ratio(9, 20);
        let bar_width = content.mul_ratio(2, 5);
        let segment_width = bar_width / pt_from_count(segments);
        let gap = Pt::from_i32(1).min(segment_width / 4);
        let bar_height = size.mul_ratio(3, 5);
        let bar_y = y + (height - bar_height) / 2;
        for idx in 0..segments {
            let color = if idx < filled {
                tone.color()
            } else {
                palette::BAR_TRACK
            };
            self.canvas.set_fill_color(color);
            self.canvas.rect(
                bar_x + segment_width * pt_from_count(idx),
                bar_y,
                segment_width - gap,
                bar_height,
                RectMode::Fill,
            )?;
        }

        let max_shown = if max_score.is_finite() { max_score.max(0.0) } else { 0.0 };
        let shown = if score.is_finite() {
            score.clamp(0.0, max_shown)
        } else {
            0.0
        };
        let value = format!("{}/{}", format_score(shown), format_score(max_shown));
        self.use_font(FontStyle::Bold, size, tone.color());
        self.canvas.text(&value, right, y, TextAlign::Right)?;

        self.cursor.advance(row_height);
        self.count_lines(row_lines);
        Ok(())
    }

    /// Equal-width columns. Rows are kept whole when they fit on a fresh page
    /// and the header row is repeated after every break.
    pub fn add_table<S: AsRef<str>>(
        &mut self,
        headers: &[S],
        rows: &[Vec<String>],
    ) -> Result<(), ReportError> {
        if headers.is_empty() {
            return Ok(());
        }
        let size = self.base_font_size;
        let columns = pt_from_count(headers.len());
        let column_width = self.cursor.content_width() / columns;
        let pad_x = size.mul_ratio(2, 5);
        let geom = TableGeometry {
            column_width,
            cell_width: column_width - pad_x * 2,
            pad_x,
            pad_y: size.mul_ratio(3, 10),
            line_height: line_height(size),
        };

        let header_cells: Vec<Vec<String>> = headers
            .iter()
            .map(|h| self.wrap(h.as_ref(), FontStyle::Bold, size, geom.cell_width))
            .collect();
        let header_height = geom.row_height(max_lines(&header_cells));
        self.check_page_break(header_height + geom.row_height(1))?;
        self.draw_row_chunk(&geom, &header_cells, 0, max_lines(&header_cells), true)?;

        for row in rows {
            let cells: Vec<Vec<String>> = (0..headers.len())
                .map(|idx| {
                    let text = row.get(idx).map(String::as_str).unwrap_or("");
                    self.wrap(text, FontStyle::Normal, size, geom.cell_width)
                })
                .collect();
            self.draw_table_row(&geom, &cells, &header_cells, header_height)?;
        }
        self.cursor.advance(size / 2);
        Ok(())
    }

    fn draw_table_row(
        &mut self,
        geom: &TableGeometry,
        cells: &[Vec<String>],
        header_cells: &[Vec<String>],
        header_height: Pt,
    ) -> Result<(), ReportError> {
        let total = max_lines(cells);
        let mut offset = 0;
        let mut just_broke = false;
        while offset < total {
            let remaining = total - offset;
            let take = if self.cursor.fits(geom.row_height(remaining)) {
                remaining
            } else {
                let fresh = geom.lines_within(self.cursor.printable_height() - header_height);
                let here = geom.lines_within(self.cursor.remaining_height());
                if here == 0 && just_broke {
                    return Err(ReportError::Canvas(
                        "table row is taller than the printable area".to_string(),
                    ));
                }
                if here == 0 || (remaining <= fresh && !just_broke) {
                    self.break_page(geom.row_height(remaining))?;
                    self.draw_row_chunk(geom, header_cells, 0, max_lines(header_cells), true)?;
                    just_broke = true;
                    continue;
                }
                here.min(remaining)
            };
            self.draw_row_chunk(geom, cells, offset, take, false)?;
            offset += take;
            just_broke = false;
        }
        Ok(())
    }

    fn draw_row_chunk(
        &mut self,
        geom: &TableGeometry,
        cells: &[Vec<String>],
        offset: usize,
        count: usize,
        header: bool,
    ) -> Result<(), ReportError> {
        let y = self.cursor.y();
        let height = geom.row_height(count);
        let left = self.cursor.left();
        let right = self.cursor.right();
        if header {
            self.canvas.set_fill_color(palette::TABLE_HEADER);
            self.canvas
                .rect(left, y, right - left, height, RectMode::Fill)?;
        }
        let style = if header {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        self.use_font(style, self.base_font_size, palette::TEXT);
        for (col, lines) in cells.iter().enumerate() {
            let x = left + geom.column_width * pt_from_count(col) + geom.pad_x;
            for (row, line) in lines.iter().skip(offset).take(count).enumerate() {
                let line_y = y + geom.pad_y + geom.line_height * pt_from_count(row);
                self.canvas.text(line, x, line_y, TextAlign::Left)?;
            }
        }
        self.canvas.set_draw_color(palette::RULE);
        self.canvas.set_line_width(Pt::from_f32(0.5));
        self.canvas.line(left, y + height, right, y + height)?;
        self.cursor.advance(height);
        self.count_lines(count);
        Ok(())
    }

    /// Vertical gap. A gap that would cross the bottom margin ends the page
    /// instead, so the next unit starts on a fresh one.
    pub fn add_spacer(&mut self, height: Pt) {
        if self.cursor.fits(height) {
            self.cursor.advance(height);
        } else {
            self.cursor.move_to(self.cursor.bottom_limit());
        }
    }

    pub fn add_divider(&mut self) -> Result<(), ReportError> {
        let height = self.base_font_size;
        if !self.cursor.fits(height) {
            self.cursor.move_to(self.cursor.bottom_limit());
            return Ok(());
        }
        let y = self.cursor.y() + height / 2;
        self.canvas.set_draw_color(palette::RULE);
        self.canvas.set_line_width(Pt::from_f32(0.5));
        let (left, right) = (self.cursor.left(), self.cursor.right());
        self.canvas.line(left, y, right, y)?;
        self.cursor.advance(height);
        Ok(())
    }

    /// Bold label in a fixed column, wrapped value beside it.
    pub fn add_key_value(&mut self, label: &str, value: &str) -> Result<(), ReportError> {
        let size = self.base_font_size;
        let height = line_height(size);
        let content = self.cursor.content_width();
        let left = self.cursor.left();
        let value_x = left + content.mul_ratio(3, 10);
        let mut lines = self.wrap(value, FontStyle::Normal, size, content.mul_ratio(7, 10));
        if lines.is_empty() {
            lines.push("-".to_string());
        }
        for (idx, line) in lines.iter().enumerate() {
            self.check_page_break(height)?;
            let y = self.cursor.y();
            if idx == 0 {
                self.use_font(FontStyle::Bold, size, palette::MUTED);
                self.canvas.text(label, left, y, TextAlign::Left)?;
            }
            self.use_font(FontStyle::Normal, size, palette::TEXT);
            self.canvas.text(line, value_x, y, TextAlign::Left)?;
            self.cursor.advance(height);
            self.count_lines(1);
        }
        self.cursor.advance(size / 5);
        Ok(())
    }

    /// Pre-checks and claims a fixed-height block for free-form drawing,
    /// returning its top.
    pub fn reserve_block(&mut self, height: Pt) -> Result<Pt, ReportError> {
        self.check_page_break(height)?;
        let top = self.cursor.y();
        self.cursor.advance(height);
        Ok(top)
    }

    /// Final pass: footer rule, `footer_label` and "Page X of N" on every page,
    /// inside the bottom margin.
    pub fn apply_page_footers(&mut self, footer_label: &str) -> Result<(), ReportError> {
        self.end_section();
        let total = self.canvas.page_count();
        let bottom = self.cursor.margins().bottom;
        let rule_y = self.cursor.bottom_limit() + bottom / 4;
        let text_y = self.cursor.bottom_limit() + bottom.mul_ratio(2, 5);
        let size = chrome_font_size(self.base_font_size);
        let (left, right) = (self.cursor.left(), self.cursor.right());
        for page in 1..=total {
            let ctx = PageContext::new(page, total);
            self.canvas.set_page(page)?;
            self.canvas.mark_region("footer");
            self.canvas.set_draw_color(palette::RULE);
            self.canvas.set_line_width(Pt::from_f32(0.5));
            self.canvas.line(left, rule_y, right, rule_y)?;
            self.use_font(FontStyle::Normal, size, palette::MUTED);
            self.canvas.text(footer_label, left, text_y, TextAlign::Left)?;
            self.canvas
                .text(&ctx.footer_label(), right, text_y, TextAlign::Right)?;
        }
        self.metrics.page_count = total;
        if let Some(debug) = &self.debug {
            debug.increment("report.footer", total as u64);
        }
        Ok(())
    }
}

fn max_lines(cells: &[Vec<String>]) -> usize {
    cells.iter().map(Vec::len).max().unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Command, Document, PdfCanvas};
    use crate::types::{Margins, Size};

    fn small_config() -> ReportConfig {
        ReportConfig::builder()
            .page_size(Size {
                width: Pt::from_i32(300),
                height: Pt::from_i32(200),
            })
            .margin_all(30.0)
            .timestamp_ms(0)
            .build()
            .unwrap()
    }

    fn layout(config: &ReportConfig) -> ReportLayout<PdfCanvas> {
        ReportLayout::new(PdfCanvas::new(config.page_size), config)
    }

    /// (text, y, font size) of every string drawn in the body region.
    fn body_strings(doc: &Document) -> Vec<Vec<(String, Pt, Pt)>> {
        doc.pages
            .iter()
            .map(|page| {
                let mut region = "body".to_string();
                let mut size = Pt::ZERO;
                let mut out = Vec::new();
                for cmd in &page.commands {
                    match cmd {
                        Command::Meta { value, .. } => region = value.clone(),
                        Command::SetFont { size: s, .. } => size = *s,
                        Command::DrawString { text, y, .. } if region == "body" => {
                            out.push((text.clone(), *y, size))
                        }
                        _ => {}
                    }
                }
                out
            })
            .collect()
    }

    #[test]
    fn bar_fill_rounds_and_guards_zero_max() {
        assert_eq!(bar_fill_count(85.0, 100.0, 20), 17);
        assert_eq!(bar_fill_count(7.5, 10.0, 10), 8);
        assert_eq!(bar_fill_count(0.0, 100.0, 20), 0);
        assert_eq!(bar_fill_count(100.0, 100.0, 20), 20);
        assert_eq!(bar_fill_count(150.0, 100.0, 20), 20);
        assert_eq!(bar_fill_count(50.0, 0.0, 20), 0);
        assert_eq!(bar_fill_count(f64::NAN, 100.0, 20), 0);
    }

    #[test]
    fn scores_format_without_nan() {
        assert_eq!(format_score(85.0), "85");
        assert_eq!(format_score(7.26), "7.3");
        assert_eq!(format_score(f64::NAN), "0");
        assert_eq!(format_score(-0.0), "0");
    }

    #[test]
    fn long_text_never_crosses_bottom_margin() {
        let config = small_config();
        let mut layout = layout(&config);
        let paragraph = "Credibility signals are weighed across several services. ".repeat(40);
        layout.add_text(&paragraph, None).unwrap();
        let bottom = layout.cursor().bottom_limit();
        assert!(layout.metrics().page_breaks > 0);
        let doc = layout.canvas().document();
        assert_eq!(doc.pages.len(), layout.metrics().page_breaks + 1);
        let mut drawn = 0;
        for page in body_strings(&doc) {
            for (_, y, size) in page {
                assert!(y + line_height(size) <= bottom);
                drawn += 1;
            }
        }
        assert_eq!(drawn, layout.metrics().lines);
    }

    #[test]
    fn page_break_resets_cursor_and_draws_running_header() {
        let config = small_config();
        let mut layout = layout(&config);
        layout.set_running_source("Example Times");
        assert!(!layout.check_page_break(Pt::from_i32(10)).unwrap());
        assert!(layout.check_page_break(Pt::from_i32(500)).unwrap());
        assert_eq!(layout.cursor().page(), 2);
        assert_eq!(layout.cursor().y(), config.margins.top);
        let doc = layout.canvas().document();
        assert!(!doc.pages[0].contains_text("Example Times"));
        assert!(doc.pages[1].contains_text("Example Times"));
        assert!(doc.pages[1].contains_text("TruthLens"));
    }

    #[test]
    fn title_is_not_orphaned_at_page_bottom() {
        let config = small_config();
        let mut layout = layout(&config);
        let bottom = layout.cursor().bottom_limit();
        let title_height = line_height(config.base_font_size.mul_ratio(8, 5));
        layout.cursor.move_to(bottom - title_height - Pt::from_i32(2));
        layout.add_title("Findings", TitleLevel::Section).unwrap();
        assert_eq!(layout.cursor().page(), 2);
        let doc = layout.canvas().document();
        assert!(doc.pages[1].contains_text("Findings"));
    }

    #[test]
    fn table_header_repeats_after_break() {
        let config = small_config();
        let mut layout = layout(&config);
        let rows: Vec<Vec<String>> = (0..30)
            .map(|idx| vec![format!("Row {idx}"), format!("{idx}/100")])
            .collect();
        layout.add_table(&["Metric", "Score"], &rows).unwrap();
        let doc = layout.canvas().document();
        assert!(doc.pages.len() > 1);
        for page in &doc.pages {
            assert!(page.contains_text("Metric"));
        }
        let bottom = layout.cursor().bottom_limit();
        for page in body_strings(&doc) {
            for (_, y, size) in page {
                assert!(y + line_height(size) <= bottom);
            }
        }
        for idx in 0..30 {
            assert!(doc.contains_text(&format!("Row {idx}")));
        }
    }

    #[test]
    fn oversized_table_row_is_split_across_pages() {
        let config = small_config();
        let mut layout = layout(&config);
        let long_cell = "word ".repeat(200);
        layout
            .add_table(&["Only"], &[vec![long_cell.clone()]])
            .unwrap();
        let doc = layout.canvas().document();
        assert!(doc.pages.len() > 1);
        let words: usize = body_strings(&doc)
            .iter()
            .flatten()
            .filter(|(text, _, _)| text != "Only")
            .map(|(text, _, _)| text.split_whitespace().count())
            .sum();
        assert_eq!(words, 200);
    }

    #[test]
    fn score_row_draws_filled_segments_in_tone() {
        let config = small_config();
        let mut layout = layout(&config);
        layout.add_score_row("Bias Detection", 85.0, 100.0).unwrap();
        let doc = layout.canvas().document();
        assert!(doc.contains_text("85/100"));
        let rects = doc.pages[0]
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::DrawRect { .. }))
            .count();
        assert_eq!(rects, config.bar_length);
        let good = ScoreTone::Good.color();
        let fills: Vec<Color> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::SetFillColor(color) => Some(*color),
                _ => None,
            })
            .collect();
        assert!(fills.contains(&good));
    }

    #[test]
    fn spacer_at_page_end_does_not_create_empty_page() {
        let config = small_config();
        let mut layout = layout(&config);
        layout.add_spacer(Pt::from_i32(1000));
        assert_eq!(layout.canvas().page_count(), 1);
        layout.add_text("after", None).unwrap();
        assert_eq!(layout.canvas().page_count(), 2);
    }

    #[test]
    fn footers_land_on_every_page_below_body() {
        let config = small_config();
        let mut layout = layout(&config);
        layout.add_text(&"text ".repeat(400), None).unwrap();
        layout.apply_page_footers("TruthLens Credibility Report").unwrap();
        let doc = layout.canvas().document();
        let total = doc.pages.len();
        assert!(total > 1);
        let bottom = layout.cursor().bottom_limit();
        for (idx, page) in doc.pages.iter().enumerate() {
            assert!(page.contains_text(&format!("Page {} of {}", idx + 1, total)));
            let footer_y = page
                .commands
                .iter()
                .find_map(|cmd| match cmd {
                    Command::DrawString { text, y, .. } if text.starts_with("Page ") => Some(*y),
                    _ => None,
                })
                .unwrap();
            assert!(footer_y > bottom);
            assert!(footer_y < config.page_size.height);
        }
        assert_eq!(layout.metrics().page_count, total);
    }

    #[test]
    fn key_value_without_value_shows_dash() {
        let config = ReportConfig::builder()
            .margins(Margins::all(40.0))
            .build()
            .unwrap();
        let mut layout = layout(&config);
        layout.add_key_value("Author", "").unwrap();
        let doc = layout.canvas().document();
        assert!(doc.contains_text("Author"));
        assert!(doc.contains_text("-"));
    }
}
