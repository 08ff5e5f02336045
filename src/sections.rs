//! The fixed report sections, in order. Builders propagate every error with
//! `?`; [`compose`] tags failures with the section being built.

use crate::analysis::{AnalysisResult, ServiceKey, ServiceScoreView};
use crate::canvas::{DocumentCanvas, RectMode, TextAlign};
use crate::error::ReportError;
use crate::extract::{AUTHOR_BIO_KEYS, AUTHOR_ORG_KEYS, AUTHOR_ROLE_KEYS, SOURCE_RATING_KEYS};
use crate::font::FontStyle;
use crate::layout::{ReportLayout, TitleLevel, line_height, palette};
use crate::rating::{ScoreGrade, ScoreTone, TrustRating};
use crate::types::Pt;
use chrono::{DateTime, Utc};

/// Everything the builders need, derived once from the payload.
pub struct ReportContext<'a> {
    pub analysis: &'a AnalysisResult,
    pub product_name: &'a str,
    pub generated_ms: i64,
    pub title: String,
    pub source: String,
    pub author: String,
    pub trust_score: u8,
    pub rating: TrustRating,
    pub views: Vec<ServiceScoreView>,
}

impl<'a> ReportContext<'a> {
    pub fn new(analysis: &'a AnalysisResult, product_name: &'a str, generated_ms: i64) -> Self {
        let trust_score = analysis.trust_score();
        Self {
            analysis,
            product_name,
            generated_ms,
            title: analysis.title(),
            source: analysis.source_or_default(),
            author: analysis.author_or_default(),
            trust_score,
            rating: TrustRating::for_score(trust_score),
            views: analysis.service_views(),
        }
    }

    fn has_service_data(&self) -> bool {
        ServiceKey::ALL
            .iter()
            .any(|key| self.analysis.service(*key).is_some())
    }

    fn generated_label(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.generated_ms)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
    }
}

type SectionBuilder<C> = fn(&mut ReportLayout<C>, &ReportContext<'_>) -> Result<(), ReportError>;

pub const SECTION_NAMES: [&str; 7] = [
    "cover",
    "summary",
    "quick_reference",
    "score_breakdown",
    "findings",
    "source_author",
    "methodology",
];

fn builders<C: DocumentCanvas>() -> [SectionBuilder<C>; 7] {
    [
        cover,
        executive_summary,
        quick_reference,
        score_breakdown,
        detailed_findings,
        source_and_author,
        methodology,
    ]
}

/// Builds every section in order. `on_section` is told which one starts.
pub fn compose<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
    on_section: &mut dyn FnMut(&'static str),
) -> Result<(), ReportError> {
    layout.set_running_source(ctx.source.clone());
    for (name, build) in SECTION_NAMES.into_iter().zip(builders::<C>()) {
        on_section(name);
        layout.begin_section(name);
        build(layout, ctx).map_err(|err| err.in_section(name))?;
    }
    layout.end_section();
    Ok(())
}

fn cover<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    let base = layout.base_font_size();
    let brand_size = base.mul_ratio(12, 5);
    let subtitle_size = base.mul_ratio(6, 5);
    let band = line_height(brand_size) + line_height(subtitle_size);
    let top = layout.reserve_block(band)?;
    let left = layout.cursor().left();
    layout.use_font(FontStyle::Bold, brand_size, palette::ACCENT);
    layout
        .canvas_mut()
        .text(ctx.product_name, left, top, TextAlign::Left)?;
    layout.use_font(FontStyle::Normal, subtitle_size, palette::MUTED);
    layout.canvas_mut().text(
        "Credibility Analysis Report",
        left,
        top + line_height(brand_size),
        TextAlign::Left,
    )?;
    layout.add_divider()?;

    layout.add_title(&ctx.title, TitleLevel::Subsection)?;
    layout.add_key_value("Source", &ctx.source)?;
    layout.add_key_value("Author", &ctx.author)?;
    if let Some(words) = ctx.analysis.word_count() {
        layout.add_key_value("Word count", &words.to_string())?;
    }
    if let Some(url) = ctx.analysis.url() {
        layout.add_key_value("URL", &url)?;
    }
    if let Some(analyzed_at) = ctx.analysis.analyzed_at() {
        layout.add_key_value("Analyzed", &analyzed_at)?;
    }
    layout.add_key_value("Report generated", &ctx.generated_label())?;
    layout.add_spacer(base);

    trust_score_box(layout, ctx)?;
    layout.add_text(ctx.rating.verdict(), None)
}

fn trust_score_box<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    let base = layout.base_font_size();
    let score_size = base.mul_ratio(14, 5);
    let label_size = base.mul_ratio(7, 5);
    let pad = base;
    let height = line_height(score_size) + pad * 2;
    let top = layout.reserve_block(height + base / 2)?;
    let left = layout.cursor().left();
    let width = layout.cursor().content_width();
    let tone = ScoreTone::for_ratio(ctx.trust_score as f64, 100.0);

    let canvas = layout.canvas_mut();
    canvas.set_draw_color(tone.color());
    canvas.set_line_width(Pt::from_f32(1.5));
    canvas.rect(left, top, width, height, RectMode::Stroke)?;

    layout.use_font(FontStyle::Bold, score_size, tone.color());
    let score = ctx.trust_score.to_string();
    let score_x = left + pad;
    layout
        .canvas_mut()
        .text(&score, score_x, top + pad, TextAlign::Left)?;
    let score_width = layout.canvas().text_width(&score);
    layout.use_font(FontStyle::Normal, label_size, palette::MUTED);
    layout.canvas_mut().text(
        "/100",
        score_x + score_width + Pt::from_i32(2),
        top + pad + score_size - label_size,
        TextAlign::Left,
    )?;

    let label_x = left + width.mul_ratio(7, 20);
    layout.use_font(FontStyle::Bold, label_size, palette::TEXT);
    layout
        .canvas_mut()
        .text(ctx.rating.label(), label_x, top + pad, TextAlign::Left)?;
    layout.use_font(FontStyle::Normal, base, palette::MUTED);
    layout.canvas_mut().text(
        "Overall Trust Score",
        label_x,
        top + pad + line_height(label_size),
        TextAlign::Left,
    )
}

fn fallback_summary(ctx: &ReportContext<'_>) -> String {
    format!(
        "\"{}\" from {} received an overall trust score of {}/100 and is rated {}.",
        ctx.title,
        ctx.source,
        ctx.trust_score,
        ctx.rating.label()
    )
}

fn describe_view(view: &ServiceScoreView) -> String {
    format!(
        "{} ({}/100, {})",
        view.display_name,
        view.score,
        view.grade().label()
    )
}

fn executive_summary<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    layout.add_title("Executive Summary", TitleLevel::Section)?;
    let summary = ctx
        .analysis
        .summary()
        .unwrap_or_else(|| fallback_summary(ctx));
    layout.add_text(&summary, None)?;

    if !ctx.has_service_data() {
        return layout.add_bullet(
            "No per-service analysis was returned for this article, so every service score defaults to 0.",
        );
    }
    // Earliest service wins ties so the output is stable.
    let strongest = ctx
        .views
        .iter()
        .rev()
        .max_by_key(|view| view.score);
    let weakest = ctx.views.iter().min_by_key(|view| view.score);
    if let Some(view) = strongest {
        layout.add_bullet(&format!("Strongest area: {}", describe_view(view)))?;
    }
    if let Some(view) = weakest {
        layout.add_bullet(&format!("Needs attention: {}", describe_view(view)))?;
    }
    let concerns = ctx
        .views
        .iter()
        .filter(|view| view.grade() == ScoreGrade::Poor)
        .count();
    if concerns > 0 {
        layout.add_bullet(&format!(
            "{} of {} services rated Poor.",
            concerns,
            ctx.views.len()
        ))?;
    }
    Ok(())
}

fn quick_reference<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    layout.add_title("Quick Reference", TitleLevel::Section)?;
    let mut rows: Vec<Vec<String>> = ctx
        .views
        .iter()
        .map(|view| {
            vec![
                view.display_name.to_string(),
                format!("{}/100", view.score),
                view.grade().label().to_string(),
                format!("{}%", view.weight),
            ]
        })
        .collect();
    rows.push(vec![
        "Overall Trust Score".to_string(),
        format!("{}/100", ctx.trust_score),
        ctx.rating.label().to_string(),
        "-".to_string(),
    ]);
    layout.add_table(&["Metric", "Score", "Rating", "Weight"], &rows)
}

fn score_breakdown<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    layout.add_title("Score Breakdown", TitleLevel::Section)?;
    layout.add_score_row("Overall Trust Score", ctx.trust_score as f64, 100.0)?;
    layout.add_divider()?;
    for view in &ctx.views {
        let label = format!("{} ({}%)", view.display_name, view.weight);
        layout.add_score_row(&label, view.score as f64, 100.0)?;
    }
    Ok(())
}

fn detailed_findings<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    layout.add_title("Detailed Findings", TitleLevel::Section)?;
    for view in &ctx.views {
        layout.add_title(&describe_view(view), TitleLevel::Subsection)?;
        layout.add_text(&ctx.analysis.service_narrative(view.key), None)?;
        if let Some(meaning) = ctx.analysis.service_interpretation(view.key) {
            layout.add_styled_text(&meaning, None, FontStyle::Oblique, palette::MUTED)?;
        }
        for finding in ctx.analysis.findings(view.key) {
            layout.add_bullet(&finding.display())?;
        }
    }
    Ok(())
}

const NOT_AVAILABLE: &str = "Not available";

fn source_and_author<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    let analysis = ctx.analysis;
    layout.add_title("Source & Author", TitleLevel::Section)?;

    layout.add_title("Publication", TitleLevel::Subsection)?;
    let source_score = analysis.service_score(ServiceKey::SourceCredibility);
    let credibility = analysis
        .service_text(ServiceKey::SourceCredibility, SOURCE_RATING_KEYS)
        .unwrap_or_else(|| ScoreGrade::for_score(source_score).label().to_string());
    layout.add_key_value("Name", &ctx.source)?;
    layout.add_key_value("Credibility", &credibility)?;
    layout.add_key_value("Score", &format!("{}/100", source_score))?;

    layout.add_title("Author", TitleLevel::Subsection)?;
    let author_score = analysis.service_score(ServiceKey::AuthorAnalyzer);
    layout.add_key_value("Name", &ctx.author)?;
    let role = analysis
        .service_text(ServiceKey::AuthorAnalyzer, AUTHOR_ROLE_KEYS)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let organization = analysis
        .service_text(ServiceKey::AuthorAnalyzer, AUTHOR_ORG_KEYS)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    layout.add_key_value("Position", &role)?;
    layout.add_key_value("Organization", &organization)?;
    layout.add_key_value("Score", &format!("{}/100", author_score))?;
    if let Some(bio) = analysis.service_text(ServiceKey::AuthorAnalyzer, AUTHOR_BIO_KEYS) {
        layout.add_text(&bio, None)?;
    }
    Ok(())
}

fn methodology<C: DocumentCanvas>(
    layout: &mut ReportLayout<C>,
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    layout.add_title("Methodology", TitleLevel::Section)?;
    layout.add_text(
        &format!(
            "{} combines seven independent analyses into one trust score. The weights below show \
             how much each analysis contributes; every score is reported on a 0 to 100 scale.",
            ctx.product_name
        ),
        None,
    )?;
    for key in ServiceKey::ALL {
        layout.add_bullet(&format!(
            "{} ({}%): {}.",
            key.display_name(),
            key.weight(),
            key.description()
        ))?;
    }
    let bands = [80u8, 60, 40, 0]
        .into_iter()
        .map(|floor| {
            format!(
                "{} and above: {}",
                floor,
                TrustRating::for_score(floor).label()
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    layout.add_text(&format!("Rating bands: {}.", bands), None)?;

    layout.add_title("Disclaimer", TitleLevel::Subsection)?;
    layout.add_styled_text(
        "This report is generated automatically from the analysis results available at the time \
         of generation. It is an aid to judgement, not a verdict. Verify important claims with \
         primary sources.",
        None,
        FontStyle::Oblique,
        palette::MUTED,
    )
}
