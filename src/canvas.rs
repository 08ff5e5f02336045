use crate::error::ReportError;
use crate::font::{self, FontStyle};
use crate::pdf::{self, DocumentInfo};
use crate::types::{Color, Pt, Size};

/// Key of the `Meta` command that opens a named page region ("header",
/// "footer", "body"). Ignored by the PDF writer.
pub const META_REGION_KEY: &str = "__tl_region";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectMode {
    Fill,
    Stroke,
    FillStroke,
}

/// The drawing surface the layout engine writes to. Coordinates are in
/// points with a top-left origin; `text` takes the top of the line box.
pub trait DocumentCanvas {
    /// Fails when the primitive cannot be used at all (e.g. its backing
    /// library did not load). Called once before any composition.
    fn ensure_ready(&self) -> Result<(), ReportError> {
        Ok(())
    }

    fn page_size(&self) -> Size;
    fn set_font(&mut self, size: Pt, style: FontStyle);
    fn font_size(&self) -> Pt;
    fn set_text_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_draw_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: Pt);
    fn text(&mut self, text: &str, x: Pt, y: Pt, align: TextAlign) -> Result<(), ReportError>;
    /// Width of `text` in the current font.
    fn text_width(&self, text: &str) -> Pt;
    /// Word-wraps `text` to `width` in the current font.
    fn split_text_to_size(&self, text: &str, width: Pt) -> Vec<String>;
    fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) -> Result<(), ReportError>;
    fn rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt, mode: RectMode)
    -> Result<(), ReportError>;
    fn add_page(&mut self) -> Result<(), ReportError>;
    fn page_count(&self) -> usize;
    /// Makes the 1-based `page` current so later drawing lands on it.
    fn set_page(&mut self, page: usize) -> Result<(), ReportError>;
    fn mark_region(&mut self, name: &str);
    /// Serializes every page. The canvas is spent afterwards.
    fn save(&mut self, info: &DocumentInfo) -> Result<Vec<u8>, ReportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Non-rendered metadata used for inspection. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont {
        style: FontStyle,
        size: Pt,
    },
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        mode: RectMode,
    },
    DrawLine {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct GraphicsState {
    emitted_fill: Option<Color>,
    emitted_stroke: Option<Color>,
    emitted_line_width: Option<Pt>,
    emitted_font: Option<(FontStyle, Pt)>,
}

impl GraphicsState {
    fn fresh() -> Self {
        Self {
            emitted_fill: None,
            emitted_stroke: None,
            emitted_line_width: None,
            emitted_font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
    state: GraphicsState,
}

impl Page {
    fn new() -> Self {
        Self::from_commands(Vec::new())
    }

    pub(crate) fn from_commands(commands: Vec<Command>) -> Self {
        Self {
            commands,
            state: GraphicsState::fresh(),
        }
    }

    /// Every drawn string on the page, in drawing order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.strings().any(|text| text.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|page| page.contains_text(needle))
    }

    /// All drawn strings joined with newlines, page after page.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            for text in page.strings() {
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }
}

/// Records drawing commands per page and writes them out as PDF on `save`.
pub struct PdfCanvas {
    page_size: Size,
    pages: Vec<Page>,
    current: usize,
    font_style: FontStyle,
    font_size: Pt,
    text_color: Color,
    fill_color: Color,
    draw_color: Color,
    line_width: Pt,
}

impl PdfCanvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: vec![Page::new()],
            current: 0,
            font_style: FontStyle::Normal,
            font_size: Pt::from_i32(12),
            text_color: Color::BLACK,
            fill_color: Color::BLACK,
            draw_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
        }
    }

    pub fn document(&self) -> Document {
        Document {
            page_size: self.page_size,
            pages: self.pages.clone(),
        }
    }

    fn page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current]
    }

    fn emit_fill(&mut self, color: Color) {
        let page = self.page_mut();
        if page.state.emitted_fill == Some(color) {
            return;
        }
        page.state.emitted_fill = Some(color);
        page.commands.push(Command::SetFillColor(color));
    }

    fn emit_stroke(&mut self) {
        let color = self.draw_color;
        let width = self.line_width;
        let page = self.page_mut();
        if page.state.emitted_stroke != Some(color) {
            page.state.emitted_stroke = Some(color);
            page.commands.push(Command::SetStrokeColor(color));
        }
        if page.state.emitted_line_width != Some(width) {
            page.state.emitted_line_width = Some(width);
            page.commands.push(Command::SetLineWidth(width));
        }
    }

    fn emit_font(&mut self) {
        let font = (self.font_style, self.font_size);
        let page = self.page_mut();
        if page.state.emitted_font == Some(font) {
            return;
        }
        page.state.emitted_font = Some(font);
        page.commands.push(Command::SetFont {
            style: font.0,
            size: font.1,
        });
    }
}

impl DocumentCanvas for PdfCanvas {
    fn page_size(&self) -> Size {
        self.page_size
    }

    fn set_font(&mut self, size: Pt, style: FontStyle) {
        self.font_size = if size <= Pt::ZERO { Pt::from_i32(1) } else { size };
        self.font_style = style;
    }

    fn font_size(&self) -> Pt {
        self.font_size
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    fn set_line_width(&mut self, width: Pt) {
        self.line_width = if width < Pt::ZERO { Pt::ZERO } else { width };
    }

    fn text(&mut self, text: &str, x: Pt, y: Pt, align: TextAlign) -> Result<(), ReportError> {
        if text.is_empty() {
            return Ok(());
        }
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.text_width(text) / 2,
            TextAlign::Right => x - self.text_width(text),
        };
        self.emit_font();
        self.emit_fill(self.text_color);
        self.page_mut().commands.push(Command::DrawString {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn text_width(&self, text: &str) -> Pt {
        font::measure_text_width(self.font_style, self.font_size, text)
    }

    fn split_text_to_size(&self, text: &str, width: Pt) -> Vec<String> {
        font::wrap_text(self.font_style, self.font_size, text, width)
    }

    fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) -> Result<(), ReportError> {
        self.emit_stroke();
        self.page_mut()
            .commands
            .push(Command::DrawLine { x1, y1, x2, y2 });
        Ok(())
    }

    fn rect(
        &mut self,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        mode: RectMode,
    ) -> Result<(), ReportError> {
        if width <= Pt::ZERO || height <= Pt::ZERO {
            return Ok(());
        }
        if matches!(mode, RectMode::Fill | RectMode::FillStroke) {
            self.emit_fill(self.fill_color);
        }
        if matches!(mode, RectMode::Stroke | RectMode::FillStroke) {
            self.emit_stroke();
        }
        self.page_mut().commands.push(Command::DrawRect {
            x,
            y,
            width,
            height,
            mode,
        });
        Ok(())
    }

    fn add_page(&mut self) -> Result<(), ReportError> {
        self.pages.push(Page::new());
        self.current = self.pages.len() - 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, page: usize) -> Result<(), ReportError> {
        if page == 0 || page > self.pages.len() {
            return Err(ReportError::Canvas(format!(
                "page {} out of range 1..={}",
                page,
                self.pages.len()
            )));
        }
        self.current = page - 1;
        Ok(())
    }

    fn mark_region(&mut self, name: &str) {
        self.page_mut().commands.push(Command::Meta {
            key: META_REGION_KEY.to_string(),
            value: name.to_string(),
        });
    }

    fn save(&mut self, info: &DocumentInfo) -> Result<Vec<u8>, ReportError> {
        let document = self.document();
        pdf::document_to_pdf(&document, info).map_err(ReportError::from)
    }
}
