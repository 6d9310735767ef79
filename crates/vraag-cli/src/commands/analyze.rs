//! Analyze command - run the question pipeline over extracted text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use vraag_core::{Document, DocumentContext, DocumentLoader, Pipeline, ResultRecord};

use super::load_config;

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input files or glob pattern (e.g. "text/27848/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory for per-document results (default: stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Directory with `<contract_id>/<doc_id>.json` page spans
    #[arg(short, long)]
    spans_dir: Option<PathBuf>,

    /// Questions to answer (comma separated, default: all)
    #[arg(short, long, value_delimiter = ',')]
    questions: Vec<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Continue when a document cannot be loaded or processed
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per question
    Csv,
}

/// Outcome for a single input file.
struct DocumentOutcome {
    path: PathBuf,
    context: Option<DocumentContext>,
    error: Option<String>,
}

/// Serialized result of one document.
#[derive(Serialize)]
struct DocumentReport<'a> {
    generated_at: &'a str,
    #[serde(flatten)]
    context: &'a DocumentContext,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration, command line wins
    let mut config = load_config(config_path)?;
    if args.spans_dir.is_some() {
        config.documents.spans_dir = args.spans_dir.clone();
    }
    if !args.questions.is_empty() {
        config.pipeline.questions = args.questions.clone();
    }

    let registry = config.registry()?;
    let pipeline = registry.pipeline(&config.pipeline.questions)?;
    let loader = DocumentLoader::new(&config.documents)?;

    // Expand glob pattern
    let extension = config.documents.extension.to_lowercase();
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.to_lowercase() == extension)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files, answering {} questions",
        style("ℹ").blue(),
        files.len(),
        pipeline.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Load documents
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut outcomes = Vec::with_capacity(files.len());
    let mut docs: Vec<(usize, Document)> = Vec::with_capacity(files.len());

    for path in files {
        match loader.load(&path) {
            Ok(doc) => {
                docs.push((outcomes.len(), doc));
                outcomes.push(DocumentOutcome {
                    path,
                    context: None,
                    error: None,
                });
            }
            Err(e) => {
                let message = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to load {}: {}", path.display(), message);
                    anyhow::bail!("Loading failed: {}", message);
                }
                warn!("Failed to load {}: {}", path.display(), message);
                outcomes.push(DocumentOutcome {
                    path,
                    context: None,
                    error: Some(message),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Run the pipeline
    let (indices, documents): (Vec<usize>, Vec<Document>) = docs.into_iter().unzip();
    let results = run_pipeline(&pipeline, &documents, config.pipeline.parallel, args.jobs)?;

    for (index, result) in indices.into_iter().zip(results) {
        match result {
            Ok(ctx) => outcomes[index].context = Some(ctx),
            Err(e) => {
                let message = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", outcomes[index].path.display(), message);
                    anyhow::bail!("Processing failed: {}", message);
                }
                warn!("Failed to process {}: {}", outcomes[index].path.display(), message);
                outcomes[index].error = Some(message);
            }
        }
    }

    // Write outputs
    write_outputs(&outcomes, &args)?;

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        let questions: Vec<&str> = pipeline.components().iter().map(|c| c.question()).collect();
        write_summary(&summary_path, &outcomes, &questions)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!("{}", style("Failed files:").red());
        for outcome in &failed {
            eprintln!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn run_pipeline(
    pipeline: &Pipeline,
    documents: &[Document],
    parallel: bool,
    jobs: usize,
) -> anyhow::Result<Vec<vraag_core::Result<DocumentContext>>> {
    if !parallel || jobs == 1 {
        return Ok(pipeline.run_all(documents));
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    Ok(pool.install(|| pipeline.run_batch(documents)))
}

fn write_outputs(outcomes: &[DocumentOutcome], args: &AnalyzeArgs) -> anyhow::Result<()> {
    let generated_at = chrono::Local::now().to_rfc3339();
    let mut stdout_reports = Vec::new();

    for outcome in outcomes {
        let Some(ctx) = &outcome.context else {
            continue;
        };

        let report = DocumentReport {
            generated_at: &generated_at,
            context: ctx,
        };

        match &args.output_dir {
            Some(output_dir) => {
                let (extension, content) = match args.format {
                    OutputFormat::Json => ("json", serde_json::to_string_pretty(&report)?),
                    OutputFormat::Csv => ("csv", format_results_csv(ctx)?),
                };
                let output_path = report_path(output_dir, ctx, extension);
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => match args.format {
                OutputFormat::Json => stdout_reports.push(serde_json::to_value(&report)?),
                OutputFormat::Csv => print!("{}", format_results_csv(ctx)?),
            },
        }
    }

    if !stdout_reports.is_empty() {
        println!("{}", serde_json::to_string_pretty(&stdout_reports)?);
    }
    Ok(())
}

/// `<output_dir>/<contract_id>/<doc_id>.<ext>`; document ids are only
/// unique within a contract.
fn report_path(output_dir: &Path, ctx: &DocumentContext, extension: &str) -> PathBuf {
    let dir = match &ctx.contract_id {
        Some(contract_id) => output_dir.join(contract_id),
        None => output_dir.to_path_buf(),
    };
    dir.join(format!("{}.{}", ctx.doc_id, extension))
}

fn page_list(record: &ResultRecord) -> String {
    record
        .page_numbers()
        .iter()
        .map(|p| p.map_or_else(|| "-".to_string(), |n| n.to_string()))
        .collect::<Vec<_>>()
        .join(";")
}

fn format_results_csv(ctx: &DocumentContext) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["doc_id", "question", "matched", "match_count", "pages"])?;
    for (question, record) in &ctx.results {
        wtr.write_record([
            ctx.doc_id.as_str(),
            question.as_str(),
            &record.matched().to_string(),
            &record.len().to_string(),
            &page_list(record),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

/// One row per document and selected question. A question without a result
/// was skipped after a match error and is reported as `skipped`.
fn write_summary(path: &Path, outcomes: &[DocumentOutcome], questions: &[&str]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "contract_id",
        "doc_id",
        "question",
        "matched",
        "match_count",
        "pages",
        "status",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &outcome.context {
            Some(ctx) => {
                let contract_id = ctx.contract_id.as_deref().unwrap_or("");
                for &question in questions {
                    match ctx.result(question) {
                        Some(record) => wtr.write_record([
                            filename,
                            contract_id,
                            ctx.doc_id.as_str(),
                            question,
                            &record.matched().to_string(),
                            &record.len().to_string(),
                            &page_list(record),
                            "success",
                            "",
                        ])?,
                        None => wtr.write_record([
                            filename,
                            contract_id,
                            ctx.doc_id.as_str(),
                            question,
                            "",
                            "",
                            "",
                            "skipped",
                            "match error, see log",
                        ])?,
                    }
                }
            }
            None => {
                wtr.write_record([
                    filename,
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "error",
                    outcome.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
