mod analysis;
mod canvas;
mod cursor;
mod debug;
mod doc_context;
mod error;
mod extract;
mod filename;
mod font;
mod layout;
mod metrics;
mod pdf;
mod pdfinspect;
mod rating;
mod sanitize;
mod sections;
mod sink;
mod types;

pub use analysis::{AnalysisResult, Finding, ServiceKey, ServiceScoreView};
pub use canvas::{
    Command, Document, DocumentCanvas, META_REGION_KEY, Page, PdfCanvas, RectMode, TextAlign,
};
pub use cursor::ReportCursor;
use debug::DebugLogger;
pub use doc_context::PageContext;
pub use error::ReportError;
pub use extract::{SCORE_KEYS, extract_score};
pub use filename::{UNKNOWN_SOURCE_SLUG, report_filename, slugify};
pub use font::{FontStyle, measure_text_width, wrap_text};
pub use layout::{ReportLayout, TitleLevel, bar_fill_count, format_score, line_height};
pub use metrics::{ReportMetrics, SectionMetrics};
pub use pdf::{DocumentInfo, document_to_pdf};
pub use pdfinspect::{
    PdfInspectError, PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path,
    require_deliverable,
};
pub use rating::{ScoreGrade, ScoreTone, TrustRating};
pub use sanitize::{PLACEHOLDER_PHRASES, clean_text, is_placeholder};
pub use sections::{ReportContext, SECTION_NAMES};
pub use sink::{DataUriSink, FileSink, MemorySink, ReportSink, SavedFile, pdf_data_uri};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
pub use types::{Color, Margins, Pt, Size};

/// Settings for one report generation. Build with [`ReportConfig::builder`].
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub page_size: Size,
    pub margins: Margins,
    /// Segments per score bar.
    pub bar_length: usize,
    pub base_font_size: Pt,
    /// Fixed generation time in Unix milliseconds. `None` uses the clock.
    pub timestamp_ms: Option<i64>,
    pub debug_log: Option<PathBuf>,
    pub product_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins {
                top: Pt::from_i32(60),
                right: Pt::from_i32(50),
                bottom: Pt::from_i32(50),
                left: Pt::from_i32(50),
            },
            bar_length: 20,
            base_font_size: Pt::from_i32(10),
            timestamp_ms: None,
            debug_log: None,
            product_name: "TruthLens".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::new()
    }

    pub fn footer_label(&self) -> String {
        format!("{} Credibility Report", self.product_name)
    }

    fn resolve_timestamp_ms(&self) -> i64 {
        self.timestamp_ms
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }

    fn validate(&self) -> Result<(), ReportError> {
        let invalid = |message: &str| Err(ReportError::InvalidConfiguration(message.to_string()));
        let base = self.base_font_size;
        if base <= Pt::ZERO || base > Pt::from_i32(72) {
            return invalid("base_font_size must be in (0, 72]");
        }
        if self.bar_length == 0 || self.bar_length > 100 {
            return invalid("bar_length must be in 1..=100");
        }
        if self.product_name.trim().is_empty() {
            return invalid("product_name must not be blank");
        }
        let m = self.margins;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|side| *side < Pt::ZERO)
        {
            return invalid("margins must not be negative");
        }
        if m.top < layout::min_top_margin(base) {
            return invalid("top margin is too small for the running header");
        }
        if m.bottom < layout::min_bottom_margin(base) {
            return invalid("bottom margin is too small for the page footer");
        }
        let cursor = ReportCursor::new(self.page_size, self.margins);
        // Tallest unit the layout keeps whole is the cover score box.
        if cursor.printable_height() < base * 6 {
            return invalid("printable height is too small for the report layout");
        }
        if cursor.content_width() < base * 10 {
            return invalid("content width is too small for the report layout");
        }
        Ok(())
    }
}

pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ReportConfig::default(),
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.margins = margins;
        self
    }

    pub fn margin_all(mut self, value: f32) -> Self {
        self.config.margins = Margins::all(value);
        self
    }

    pub fn bar_length(mut self, segments: usize) -> Self {
        self.config.bar_length = segments;
        self
    }

    pub fn base_font_size(mut self, size: f32) -> Self {
        self.config.base_font_size = Pt::from_f32(size);
        self
    }

    /// Pins the generation time so identical input yields identical bytes.
    pub fn timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.config.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.debug_log = Some(path.into());
        self
    }

    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.config.product_name = name.into();
        self
    }

    pub fn build(self) -> Result<ReportConfig, ReportError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ReportConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Composing(&'static str),
    Finalizing,
    Saved,
    Failed,
}

struct StateTracker {
    state: GenerationState,
    observer: Option<Box<dyn FnMut(&GenerationState)>>,
}

impl StateTracker {
    fn set(&mut self, state: GenerationState) {
        self.state = state;
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }
    }
}

/// Outcome of a successful generation. The bytes themselves went to the sink.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub filename: String,
    pub byte_len: usize,
    pub sha256: String,
    pub page_count: usize,
    pub metrics: ReportMetrics,
}

/// Turns one [`AnalysisResult`] into one saved PDF. Consumed by
/// [`ReportEngine::generate`]; build a new engine for every report.
pub struct ReportEngine<C: DocumentCanvas> {
    config: ReportConfig,
    canvas: C,
    tracker: StateTracker,
}

impl<C: DocumentCanvas> ReportEngine<C> {
    pub fn new(config: ReportConfig, canvas: C) -> Self {
        Self {
            config,
            canvas,
            tracker: StateTracker {
                state: GenerationState::Idle,
                observer: None,
            },
        }
    }

    /// Called on every state transition, including the terminal one.
    pub fn on_state_change(mut self, observer: impl FnMut(&GenerationState) + 'static) -> Self {
        self.tracker.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &GenerationState {
        &self.tracker.state
    }

    /// Composes every section, writes footers, serializes and hands the bytes
    /// to `sink`. On error nothing has been saved; show
    /// [`ReportError::user_message`] to the user.
    pub fn generate(
        self,
        analysis: &AnalysisResult,
        sink: &mut dyn ReportSink,
    ) -> Result<SavedReport, ReportError> {
        let ReportEngine {
            config,
            canvas,
            mut tracker,
        } = self;
        let result = run(&config, canvas, analysis, sink, &mut tracker);
        match &result {
            Ok(saved) => {
                tracker.set(GenerationState::Saved);
                log::info!(
                    "generated {} ({} pages, {} bytes)",
                    saved.filename,
                    saved.page_count,
                    saved.byte_len
                );
            }
            Err(err) => {
                tracker.set(GenerationState::Failed);
                match err.section() {
                    Some(section) => log::error!("report generation failed in {}: {}", section, err),
                    None => log::error!("report generation failed: {}", err),
                }
            }
        }
        result
    }
}

fn run<C: DocumentCanvas>(
    config: &ReportConfig,
    canvas: C,
    analysis: &AnalysisResult,
    sink: &mut dyn ReportSink,
    tracker: &mut StateTracker,
) -> Result<SavedReport, ReportError> {
    canvas.ensure_ready()?;
    let generated_ms = config.resolve_timestamp_ms();
    let debug = match &config.debug_log {
        Some(path) => Some(DebugLogger::new(path)?),
        None => None,
    };

    let mut layout = ReportLayout::new(canvas, config).with_debug(debug.clone());
    let ctx = ReportContext::new(analysis, &config.product_name, generated_ms);
    sections::compose(&mut layout, &ctx, &mut |name| {
        tracker.set(GenerationState::Composing(name))
    })?;

    tracker.set(GenerationState::Finalizing);
    layout
        .apply_page_footers(&config.footer_label())
        .map_err(|err| err.in_section("footer"))?;
    let (mut canvas, mut metrics) = layout.into_parts();
    let info = DocumentInfo {
        title: format!("{}: {}", config.footer_label(), ctx.title),
        subject: Some(format!("Source: {}", ctx.source)),
        producer: config.product_name.clone(),
        created_ms: generated_ms,
    };
    let bytes = canvas
        .save(&info)
        .map_err(|err| err.in_section("finalize"))?;
    metrics.total_bytes = bytes.len();

    let filename = report_filename(&config.product_name, &ctx.source, generated_ms);
    sink.save(&filename, &bytes)?;

    if let Some(debug) = &debug {
        debug.emit_summary("generate");
        debug.flush();
    }
    Ok(SavedReport {
        filename,
        byte_len: bytes.len(),
        sha256: sha256_hex(&bytes),
        page_count: metrics.page_count,
        metrics,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Generates with the bundled [`PdfCanvas`].
pub fn generate_report(
    config: ReportConfig,
    analysis: &AnalysisResult,
    sink: &mut dyn ReportSink,
) -> Result<SavedReport, ReportError> {
    let canvas = PdfCanvas::new(config.page_size);
    ReportEngine::new(config, canvas).generate(analysis, sink)
}

/// Lays out the full report, footers included, without serializing it.
/// Useful for inspecting page content.
pub fn render_document(
    config: &ReportConfig,
    analysis: &AnalysisResult,
) -> Result<(Document, ReportMetrics), ReportError> {
    let mut layout = ReportLayout::new(PdfCanvas::new(config.page_size), config);
    let ctx = ReportContext::new(analysis, &config.product_name, config.resolve_timestamp_ms());
    sections::compose(&mut layout, &ctx, &mut |_| {})?;
    layout
        .apply_page_footers(&config.footer_label())
        .map_err(|err| err.in_section("footer"))?;
    let (canvas, metrics) = layout.into_parts();
    Ok((canvas.document(), metrics))
}
