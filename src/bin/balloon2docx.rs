//! CLI binary for balloon2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReportConfig` and writes or prints the results.

use anyhow::{Context, Result};
use balloon2docx::{
    generate_to_dir, load_drawing, to_tsv, DrawingData, ProgressCallback, ReportConfig, ReportProgressCallback,
    ReportTemplate, SAMPLE_COUNT,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the sample reports plus a log
/// line per report. Reports may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len} reports  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(SAMPLE_COUNT as u64);
        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_reports: usize) {
        self.bar.set_length(total_reports as u64);
    }

    fn on_report_start(&self, sample: usize, _total: usize) {
        self.bar.set_message(format!("sample {sample}"));
    }

    fn on_report_complete(&self, sample: usize, total: usize, bytes: usize, pages: usize) {
        self.bar.println(format!(
            "  {} Report {}/{}  {}  {}",
            green("✓"),
            sample,
            total,
            dim(&format!("{pages:>3} pages")),
            dim(&format!("{:.1} KiB", bytes as f64 / 1024.0)),
        ));
        self.bar.inc(1);
    }

    fn on_report_error(&self, sample: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!("  {} Report {}/{}  {}", red("✗"), sample, total, red(error)));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!("{} {} reports generated", green("✔"), bold(&success_count.to_string()));
        } else {
            eprintln!(
                "{} {}/{} reports generated  ({} failed)",
                if success_count == 0 { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Three DOCX reports in the current directory
  balloon2docx drawing.json

  # Into a directory, 20 rows per page
  balloon2docx drawing.json -o reports/ --page-capacity 20

  # Payload piped from the extraction step
  extract-drawing scan.jpg | balloon2docx - -o reports/

  # Rows of sample 2 for pasting into an existing table
  balloon2docx --tsv --sample 2 drawing.json

  # Check how each callout was classified
  balloon2docx --inspect-only drawing.json

  # Classified drawing as JSON
  balloon2docx --json drawing.json > classified.json

INPUT FORMAT:
  { "drawingNumber": "D-100", "partName": "Bracket", "reportDate": "1.02.2025",
    "dimensions": [ { "balloonId": "1", "characteristic": "flatness 0.05 A",
                      "results": ["0.04", "0.06", "0.05"] } ] }

OUTPUT:
  <drawingNumber>_REPORT_SAMPLE_<n>.docx for n = 1, 2, 3

ENVIRONMENT VARIABLES:
  Every flag has a BALLOON2DOCX_* variable, e.g. BALLOON2DOCX_PAGE_CAPACITY.
  RUST_LOG overrides the log filter.
"#;

/// Normalise drawing callouts and write paginated DOCX inspection reports.
#[derive(Parser, Debug)]
#[command(
    name = "balloon2docx",
    version,
    about = "Normalise drawing callouts and write paginated DOCX inspection reports",
    long_about = "Read the balloon callouts extracted from a technical drawing, rewrite each \
characteristic in GD&T / weld / diameter notation, and write one paginated DOCX inspection \
report per measured sample.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Drawing payload (JSON file), or `-` for stdin.
    input: String,

    /// Directory for the DOCX reports.
    #[arg(short, long, env = "BALLOON2DOCX_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Print tab-separated rows to stdout instead of writing reports.
    #[arg(long, env = "BALLOON2DOCX_TSV")]
    tsv: bool,

    /// Sample whose results `--tsv` prints.
    #[arg(long, env = "BALLOON2DOCX_SAMPLE", default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(1..=3))]
    sample: u8,

    /// Print the classified drawing as JSON instead of writing reports.
    #[arg(long, env = "BALLOON2DOCX_JSON")]
    json: bool,

    /// Print how each characteristic was classified, no reports.
    #[arg(long)]
    inspect_only: bool,

    /// Inspection rows per report page.
    #[arg(long, env = "BALLOON2DOCX_PAGE_CAPACITY", default_value_t = 23,
          value_parser = clap::value_parser!(u16).range(1..))]
    page_capacity: u16,

    /// Reports rendered in parallel.
    #[arg(short, long, env = "BALLOON2DOCX_CONCURRENCY", default_value_t = 3)]
    concurrency: usize,

    /// Date printed on every page (default: payload `reportDate`, then today).
    #[arg(long, env = "BALLOON2DOCX_REPORT_DATE")]
    report_date: Option<String>,

    /// Result printed for every sample of a weld row.
    #[arg(long, env = "BALLOON2DOCX_ACCEPTANCE_TOKEN", default_value = "OK")]
    acceptance_token: String,

    /// Result printed for GD&T rows without a supplied result.
    #[arg(long, env = "BALLOON2DOCX_GDT_BLANK_RESULT")]
    gdt_blank_result: Option<String>,

    /// JSON file overriding the printed form texts.
    #[arg(long, env = "BALLOON2DOCX_TEMPLATE")]
    template: Option<PathBuf>,

    /// Add a blank reviewer column with this heading.
    #[arg(long, env = "BALLOON2DOCX_REVIEWER_COLUMN")]
    reviewer_column: Option<String>,

    /// Omit the attestation, decision matrix and signature line.
    #[arg(long, env = "BALLOON2DOCX_NO_FOOTER")]
    no_footer: bool,

    /// Disable progress bar.
    #[arg(long, env = "BALLOON2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BALLOON2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BALLOON2DOCX_QUIET")]
    quiet: bool,
}

impl Cli {
    /// Modes that print to stdout instead of writing reports.
    fn prints_only(&self) -> bool {
        self.tsv || self.json || self.inspect_only
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters, so library INFO
    // logs are hidden while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.prints_only();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let drawing = load_drawing(&cli.input, &config)
        .await
        .with_context(|| format!("Failed to load drawing data from '{}'", cli.input))?;

    // ── Print-only modes ─────────────────────────────────────────────────
    if cli.inspect_only {
        if cli.json {
            let rows: Vec<_> = drawing
                .dimensions
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "balloonId": d.balloon_id,
                        "kind": d.kind,
                        "raw": d.raw_characteristic,
                        "normalized": d.normalized_characteristic,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows).context("Failed to serialize classification")?);
        } else {
            print_inspection(&drawing);
        }
        return Ok(());
    }

    if cli.tsv {
        let tsv = to_tsv(&drawing.dimensions, usize::from(cli.sample) - 1);
        let mut handle = io::stdout().lock();
        writeln!(handle, "{tsv}").context("Failed to write to stdout")?;
        return Ok(());
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&drawing).context("Failed to serialize drawing data")?
        );
        return Ok(());
    }

    // ── Write reports ────────────────────────────────────────────────────
    let output = generate_to_dir(&drawing, &cli.output, &config)
        .await
        .context("Report generation failed")?;

    if !cli.quiet {
        for report in &output.reports {
            eprintln!(
                "   {}  {}",
                bold(&cli.output.join(&report.file_name).display().to_string()),
                dim(&format!("{} pages", report.page_count)),
            );
        }
        eprintln!(
            "{}  {}/{} reports  {} dimensions  {} pages each  {}ms",
            if output.failures.is_empty() { green("✔") } else { cyan("⚠") },
            output.stats.generated_reports,
            output.stats.total_reports,
            output.stats.dimensions,
            output.stats.pages_per_report,
            output.stats.total_duration_ms,
        );
    }

    if !output.failures.is_empty() {
        if !show_progress {
            for failure in &output.failures {
                eprintln!("  {} {}", red("✗"), failure);
            }
        }
        output.into_result().context("Some reports were not written")?;
    }

    Ok(())
}

/// Map CLI args to `ReportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let template = match cli.template {
        Some(ref path) => ReportTemplate::from_json_file(path)
            .with_context(|| format!("Failed to load report template from {:?}", path))?,
        None => ReportTemplate::default(),
    };

    let mut builder = ReportConfig::builder()
        .page_capacity(usize::from(cli.page_capacity))
        .concurrency(cli.concurrency)
        .acceptance_token(cli.acceptance_token.as_str())
        .template(template);

    if let Some(ref token) = cli.gdt_blank_result {
        builder = builder.gdt_blank_result(token.as_str());
    }
    if let Some(ref date) = cli.report_date {
        builder = builder.report_date(date.as_str());
    }
    if let Some(ref header) = cli.reviewer_column {
        builder = builder.reviewer_column(header.as_str());
    }
    if cli.no_footer {
        builder = builder.show_footer(false);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Classification table for `--inspect-only`.
fn print_inspection(drawing: &DrawingData) {
    println!("Drawing:      {}", drawing.drawing_number);
    println!("Part:         {}", drawing.part_name);
    println!("Date:         {}", drawing.report_date);
    println!("Dimensions:   {}", drawing.dimensions.len());
    println!();
    for d in &drawing.dimensions {
        println!(
            "{:>4}  {:<15}  {}  →  {}",
            d.balloon_id,
            d.kind.label(),
            dim(&d.raw_characteristic),
            bold(&d.normalized_characteristic),
        );
    }
}
