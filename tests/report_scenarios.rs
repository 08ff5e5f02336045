use serde_json::{Value, json};
use truthlens_report::{
    AnalysisResult, Command, Document, FileSink, META_REGION_KEY, MemorySink, Pt, ReportConfig,
    ReportCursor, ServiceKey, Size, generate_report, inspect_pdf_bytes, inspect_pdf_path, line_height,
    render_document,
};

const FIXED_MS: i64 = 1_700_000_000_000;

fn config() -> ReportConfig {
    ReportConfig::builder()
        .timestamp_ms(FIXED_MS)
        .build()
        .unwrap()
}

fn render(payload: Value) -> Document {
    let (doc, _) = render_document(&config(), &AnalysisResult::from_value(payload)).unwrap();
    doc
}

fn all_services(score: u8) -> Value {
    let mut services = serde_json::Map::new();
    for key in ServiceKey::ALL {
        services.insert(key.key().to_string(), json!({ "score": score }));
    }
    Value::Object(services)
}

fn assert_no_leaked_values(doc: &Document) {
    let text = doc.plain_text();
    for leaked in ["undefined", "null", "[object Object]", "NaN"] {
        assert!(!text.contains(leaked), "found {leaked:?} in report text");
    }
}

/// Body strings with their top y and font size, per page.
fn body_strings(doc: &Document) -> Vec<Vec<(String, Pt, Pt)>> {
    doc.pages
        .iter()
        .map(|page| {
            let mut region = "body".to_string();
            let mut size = Pt::ZERO;
            let mut out = Vec::new();
            for cmd in &page.commands {
                match cmd {
                    Command::Meta { key, value } if key == META_REGION_KEY => {
                        region = value.clone()
                    }
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

fn long_payload() -> Value {
    let findings: Vec<Value> = (1..=40)
        .map(|n| {
            json!({
                "text": format!(
                    "Claim {n} in the article cites an unnamed official and could not be matched \
                     against any public record or previously published statement."
                ),
                "severity": if n % 3 == 0 { "high" } else { "low" },
            })
        })
        .collect();
    json!({
        "trust_score": 58,
        "article_title": "Regional water authority announces emergency restrictions",
        "source": "Valley Courier",
        "author": "Sam Okafor",
        "detailed_analysis": {
            "source_credibility": {"score": 64, "summary": "An established regional outlet."},
            "fact_checker": {"score": 41, "findings": findings},
            "manipulation_detector": {"score": 55, "red_flags": ["Urgent framing in the headline"]},
        }
    })
}

#[test]
fn highly_trustworthy_article_is_rated_consistently() {
    let doc = render(json!({
        "trust_score": 85,
        "article_title": "Central bank holds rates steady",
        "source": "Reuters",
        "author": "Jane Doe",
        "detailed_analysis": all_services(88),
    }));
    let cover = &doc.pages[0];
    assert!(cover.contains_text("Highly Trustworthy"));
    assert!(cover.contains_text("85"));
    assert!(cover.contains_text("strong indicators of credibility"));
    assert!(doc.contains_text("Overall Trust Score"));
    for key in ServiceKey::ALL {
        let heading = format!("{} (88/100, Excellent)", key.display_name());
        assert!(doc.contains_text(&heading), "missing {heading}");
    }
    assert!(!doc.contains_text("Poor"));
    assert_no_leaked_values(&doc);
}

#[test]
fn missing_service_data_scores_zero_without_failing() {
    let analysis = AnalysisResult::from_value(json!({
        "trust_score": 35,
        "article_title": "Celebrity spotted downtown",
        "source": "Gossip Daily",
    }));
    let mut sink = MemorySink::new();
    let saved = generate_report(config(), &analysis, &mut sink).unwrap();
    assert!(saved.page_count >= 1);

    let (doc, _) = render_document(&config(), &analysis).unwrap();
    for key in ServiceKey::ALL {
        let heading = format!("{} (0/100, Poor)", key.display_name());
        assert!(doc.contains_text(&heading), "missing {heading}");
    }
    assert!(doc.contains_text("Low Credibility"));
    assert!(doc.contains_text("No per-service analysis was returned"));
    assert!(doc.contains_text("Not available"));
    assert_no_leaked_values(&doc);
}

#[test]
fn non_numeric_scores_become_zero() {
    let doc = render(json!({
        "trust_score": "N/A",
        "source": "Example Wire",
        "detailed_analysis": {
            "bias_detector": {"score": "N/A"},
            "fact_checker": {"score": "72%"},
            "content_analyzer": {"score": null},
        }
    }));
    assert!(doc.contains_text("Bias Detection (0/100, Poor)"));
    assert!(doc.contains_text("Fact Checking (72/100, Good)"));
    assert!(doc.contains_text("Content Quality (0/100, Poor)"));
    assert!(doc.contains_text("Low Credibility"));
    assert_no_leaked_values(&doc);
}

#[test]
fn source_punctuation_is_slugged_in_filename() {
    let analysis = AnalysisResult::from_value(json!({
        "trust_score": 70,
        "source": "BBC News!!",
    }));
    let mut sink = MemorySink::new();
    let saved = generate_report(config(), &analysis, &mut sink).unwrap();
    assert_eq!(saved.filename, "truthlens-bbc-news-1700000000000.pdf");
    assert_eq!(sink.last().unwrap().filename, saved.filename);
}

#[test]
fn blank_source_uses_unknown_slug() {
    let analysis = AnalysisResult::from_value(json!({"source": "???"}));
    let mut sink = MemorySink::new();
    let saved = generate_report(config(), &analysis, &mut sink).unwrap();
    assert_eq!(saved.filename, "truthlens-unknown-source-1700000000000.pdf");
}

#[test]
fn placeholder_narratives_are_replaced() {
    let doc = render(json!({
        "trust_score": 66,
        "article_title": "Budget vote",
        "source": "Wire",
        "summary": "Summary coming soon",
        "detailed_analysis": {
            "fact_checker": {"score": 72, "summary": "Fact check coming soon"},
            "bias_detector": {"score": 61, "what_it_means": "Placeholder text"},
        }
    }));
    let text = doc.plain_text().to_lowercase();
    assert!(!text.contains("coming soon"));
    assert!(!text.contains("placeholder"));
    assert!(doc.contains_text("Fact Checking scored 72/100"));
    assert!(doc.contains_text("received an overall trust score of 66/100"));
}

#[test]
fn long_reports_never_draw_body_text_past_the_bottom_margin() {
    let config = config();
    let analysis = AnalysisResult::from_value(long_payload());
    let (doc, metrics) = render_document(&config, &analysis).unwrap();
    assert!(doc.pages.len() > 2);
    assert!(metrics.page_breaks > 0);
    assert_eq!(metrics.page_count, doc.pages.len());

    let bottom = ReportCursor::new(config.page_size, config.margins).bottom_limit();
    for (index, strings) in body_strings(&doc).iter().enumerate() {
        for (text, y, size) in strings {
            assert!(
                *y + line_height(*size) <= bottom,
                "page {}: {:?} ends below the bottom margin",
                index + 1,
                text
            );
        }
    }

    let total = doc.pages.len();
    for (index, page) in doc.pages.iter().enumerate() {
        let label = format!("Page {} of {}", index + 1, total);
        assert!(page.contains_text(&label), "missing {label}");
        assert!(page.contains_text("TruthLens Credibility Report"));
    }
    assert!(doc.contains_text("[High] Claim 3 in the article"));
    assert_no_leaked_values(&doc);
}

#[test]
fn identical_input_yields_identical_bytes() {
    let analysis = AnalysisResult::from_value(long_payload());
    let mut first = MemorySink::new();
    let mut second = MemorySink::new();
    let a = generate_report(config(), &analysis, &mut first).unwrap();
    let b = generate_report(config(), &analysis, &mut second).unwrap();
    assert_eq!(a.sha256, b.sha256);
    assert_eq!(a.filename, b.filename);
    assert_eq!(first.last().unwrap().bytes, second.last().unwrap().bytes);
}

#[test]
fn file_sink_writes_a_readable_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = AnalysisResult::from_value(long_payload());
    let mut sink = FileSink::new(dir.path());
    let saved = generate_report(config(), &analysis, &mut sink).unwrap();

    let path = dir.path().join(&saved.filename);
    assert_eq!(sink.saved(), &[path.clone()]);
    let report = inspect_pdf_path(&path).unwrap();
    assert_eq!(report.page_count, saved.page_count);
    assert!(!report.encrypted);
    assert_eq!(report.file_size_bytes, saved.byte_len);

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(inspect_pdf_bytes(&bytes).unwrap().page_count, saved.page_count);

    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".part")
        })
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn letter_page_size_reaches_the_pdf() {
    let config = ReportConfig::builder()
        .page_size(Size::letter())
        .timestamp_ms(FIXED_MS)
        .build()
        .unwrap();
    let analysis = AnalysisResult::from_value(json!({"trust_score": 64, "source": "Wire"}));
    let mut sink = MemorySink::new();
    generate_report(config, &analysis, &mut sink).unwrap();
    let report = inspect_pdf_bytes(&sink.last().unwrap().bytes).unwrap();
    assert!(report.has_page_size(Size::letter()));
    assert_eq!(
        report.title.as_deref(),
        Some("TruthLens Credibility Report: Untitled Article")
    );
}

#[test]
fn wrongly_typed_containers_degrade_to_defaults() {
    let payloads = [
        json!({"trust_score": 62, "source": "Wire", "detailed_analysis": "oops"}),
        json!({"trust_score": 62, "source": "Wire", "detailed_analysis": [1, 2, 3]}),
        json!({
            "trust_score": 62,
            "source": "Wire",
            "detailed_analysis": {
                "source_credibility": [80, 90],
                "bias_detector": "balanced",
                "fact_checker": {"score": 55, "findings": {"text": "not a list"}},
                "author_analyzer": {"score": {"value": "high"}, "position": ["editor"]},
            }
        }),
    ];
    for payload in payloads {
        let analysis = AnalysisResult::from_value(payload);
        let saved = generate_report(config(), &analysis, &mut MemorySink::new()).unwrap();
        assert!(saved.page_count >= 1);

        let (doc, _) = render_document(&config(), &analysis).unwrap();
        assert!(doc.contains_text("Generally Reliable"));
        assert!(doc.contains_text("Source Credibility (0/100, Poor)"));
        assert!(doc.contains_text("Bias Detection (0/100, Poor)"));
        assert_no_leaked_values(&doc);
    }
}

#[test]
fn text_the_fonts_cannot_draw_falls_back() {
    let analysis = AnalysisResult::from_value(json!({
        "trust_score": 70,
        "source": "\u{4E2D}\u{6587}",
        "author": "\u{674E}\u{660E}",
        "detailed_analysis": {
            "fact_checker": {"score": 72, "summary": "\u{5DF2}\u{6838}\u{5B9E}"}
        }
    }));
    let (doc, _) = render_document(&config(), &analysis).unwrap();
    assert!(doc.contains_text("Unknown Source"));
    assert!(doc.contains_text("Fact Checking scored 72/100"));
    assert!(!doc.plain_text().contains('\u{4E2D}'));

    let mut sink = MemorySink::new();
    let saved = generate_report(config(), &analysis, &mut sink).unwrap();
    assert_eq!(saved.filename, "truthlens-unknown-source-1700000000000.pdf");
    let report = inspect_pdf_bytes(&sink.last().unwrap().bytes).unwrap();
    assert_eq!(
        report.title.as_deref(),
        Some("TruthLens Credibility Report: Untitled Article")
    );
}
