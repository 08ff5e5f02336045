//! truthlens-report - render an analysis payload into a PDF credibility report.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::io::Read;
use std::path::PathBuf;
use truthlens_report::{
    AnalysisResult, DataUriSink, FileSink, PdfInspectError, PdfInspectReport, ReportConfig,
    ReportError, ReportSink, SavedReport, Size, generate_report, inspect_pdf_path,
    require_deliverable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    fn size(self) -> Size {
        match self {
            PageSize::A4 => Size::a4(),
            PageSize::Letter => Size::letter(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "truthlens-report")]
#[command(version, about = "Render a TruthLens analysis payload as a PDF report", long_about = None)]
struct Args {
    /// Analysis payload JSON file. Reads stdin when omitted or "-".
    input: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = PageSize::A4)]
    page_size: PageSize,

    /// Fixed generation time in Unix milliseconds, for reproducible output
    #[arg(long)]
    timestamp_ms: Option<i64>,

    /// Segments per score bar
    #[arg(long)]
    bar_length: Option<usize>,

    /// Write layout events as JSON lines to this file
    #[arg(long)]
    debug_log: Option<PathBuf>,

    /// Print a base64 data URI to stdout instead of writing a file
    #[arg(long)]
    data_uri: bool,

    /// Re-parse the produced PDF and print a JSON summary
    #[arg(long)]
    inspect: bool,
}

fn read_payload(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read payload from stdin")?;
            Ok(text)
        }
    }
}

fn build_config(args: &Args) -> Result<ReportConfig> {
    let mut builder = ReportConfig::builder().page_size(args.page_size.size());
    if let Some(ms) = args.timestamp_ms {
        builder = builder.timestamp_ms(ms);
    }
    if let Some(segments) = args.bar_length {
        builder = builder.bar_length(segments);
    }
    if let Some(path) = &args.debug_log {
        builder = builder.debug_log(path);
    }
    builder.build().context("invalid report configuration")
}

fn print_inspection(inspected: Result<PdfInspectReport, PdfInspectError>) -> Result<()> {
    let report = inspected
        .and_then(|report| require_deliverable(&report).map(|()| report))
        .map_err(|err| {
            eprintln!("{}", err.code());
            anyhow::Error::new(err).context("produced PDF failed inspection")
        })?;
    let summary = serde_json::json!({
        "pdf_version": report.pdf_version,
        "page_count": report.page_count,
        "encrypted": report.encrypted,
        "file_size_bytes": report.file_size_bytes,
        "title": report.title,
        "first_page_size": report.first_page_size,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn generate(
    config: ReportConfig,
    analysis: &AnalysisResult,
    sink: &mut dyn ReportSink,
) -> Result<SavedReport> {
    generate_report(config, analysis, sink).map_err(|err: ReportError| {
        eprintln!("{}", err.user_message());
        anyhow::Error::new(err).context("report generation failed")
    })
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(
            env_logger::Env::default().filter_or("TRUTHLENS_LOG", "warn,truthlens_report=info"),
        )
        .init();

    let args = Args::parse();
    let payload = read_payload(args.input.as_ref())?;
    let analysis = AnalysisResult::from_json_str(&payload).context("payload is not valid JSON")?;
    let config = build_config(&args)?;

    if args.data_uri {
        let mut sink = DataUriSink::new();
        generate(config, &analysis, &mut sink)?;
        let Some((_, uri)) = sink.downloads.last() else {
            bail!("no report was produced");
        };
        println!("{}", uri);
        return Ok(());
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let mut sink = FileSink::new(&args.out_dir);
    let saved = generate(config, &analysis, &mut sink)?;
    let path = args.out_dir.join(&saved.filename);
    log::info!(
        "{} pages, {} page breaks, sha256 {}",
        saved.page_count,
        saved.metrics.page_breaks,
        saved.sha256
    );
    if args.inspect {
        print_inspection(inspect_pdf_path(&path))?;
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
