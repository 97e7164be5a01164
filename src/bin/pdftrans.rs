//! CLI binary for pdf-translator.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `translate` works on a local file, `check` and `probe-proxy` help with
//! setting up API access.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_translator::pipeline::transport::probe_tcp;
use pdf_translator::server;
use pdf_translator::{
    translate_document_with_progress, PageSelection, PdfiumExtractor, ProgressCallback,
    ServerConfig, TranslationConfig, TranslationProgressCallback, Translator, DEFAULT_CHUNK_SIZE,
};
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Local ports commonly used by desktop proxy clients.
const COMMON_PROXY_PORTS: &[u16] = &[7890, 1080, 8080, 8118, 10808, 10809];

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders a progress bar plus one log line per translated page.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<u32, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Translating");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_secs(&self, page: u32) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&page))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_translation_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page: u32, _total: usize, chunks: usize) {
        if let Ok(mut t) = self.start_times.lock() {
            t.insert(page, Instant::now());
        }
        if chunks > 1 {
            self.bar.set_message(format!("page {page} ({chunks} chunks)"));
        } else {
            self.bar.set_message(format!("page {page}"));
        }
    }

    fn on_page_complete(&self, page: u32, total: usize, translated_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page,
            total,
            dim(&format!("{translated_len:>5} chars")),
            dim(&format!("{:.1}s", self.elapsed_secs(page))),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page: u32, total: usize, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page,
            total,
            red(first_line),
            dim(&format!("{:.1}s", self.elapsed_secs(page))),
        ));
        self.bar.abandon();
    }

    fn on_translation_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages translated",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

// ── Command line ─────────────────────────────────────────────────────────────

/// Translate PDF documents with an OpenAI-compatible chat model.
#[derive(Parser, Debug)]
#[command(
    name = "pdftrans",
    version,
    about = "Translate PDF documents with an OpenAI-compatible chat model",
    long_about = "Extract the text of each PDF page and translate it with a chat-completion \
API (DeepSeek by default, any OpenAI-compatible endpoint works). Configuration is read from \
the environment and from a .env file in the working directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFTRANS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFTRANS_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Translate a local PDF and print the result.
    Translate(TranslateArgs),
    /// Show the resolved configuration and send a test translation.
    Check,
    /// Look for a local proxy on common ports.
    ProbeProxy(ProbeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "PDFTRANS_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PDFTRANS_PORT", default_value_t = 5000)]
    port: u16,

    /// Directory uploaded PDFs are stored in.
    #[arg(long, env = "PDFTRANS_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory with a built frontend to serve at `/`.
    #[arg(long, env = "PDFTRANS_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Local PDF file.
    input: PathBuf,

    /// Pages to translate: `all` or a comma-separated list such as `1,3,5`.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Pages longer than this many characters are translated in chunks.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Source language label used in the prompt.
    #[arg(long)]
    source_lang: Option<String>,

    /// Target language label used in the prompt.
    #[arg(long)]
    target_lang: Option<String>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output JSON (`[{page, original, translated}]`) instead of plain text.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDFTRANS_NO_PROGRESS")]
    no_progress: bool,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Host to probe.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on port 5000
  pdftrans serve

  # Translate pages 1 and 3 of a paper to stdout
  pdftrans translate paper.pdf --pages 1,3

  # Translate into French, save as JSON
  pdftrans translate paper.pdf --target-lang French --json -o paper.json

  # Verify API key, model and proxy settings
  pdftrans check

ENVIRONMENT VARIABLES:
  API_PROVIDER      deepseek (default) or openai
  API_KEY           API key (fallback: OPENAI_API_KEY)
  MODEL             Model ID (default: deepseek-chat / gpt-3.5-turbo)
  BASE_URL          API base URL (fallback: OPENAI_BASE_URL)
  PROXY             HTTP proxy, e.g. http://127.0.0.1:7890 (fallback: OPENAI_PROXY)
  TIMEOUT           Per-request timeout in seconds (default: 60)
  SOURCE_LANGUAGE   Default source language (default: English)
  TARGET_LANGUAGE   Default target language (default: Chinese)
  PDFIUM_LIB_PATH   Path to libpdfium
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet
        && matches!(&cli.command, Command::Translate(a) if !a.no_progress && !a.json);
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Translate(args) => run_translate(args, show_progress).await,
        Command::Check => run_check().await,
        Command::ProbeProxy(args) => run_probe_proxy(args).await,
    }
}

fn load_config() -> Result<TranslationConfig> {
    TranslationConfig::from_env().context("Failed to read configuration from the environment")
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let translation = load_config()?;
    let server_config = ServerConfig {
        bind: SocketAddr::new(args.host, args.port),
        upload_dir: args.upload_dir,
        static_dir: args.static_dir,
        pdfium_library_path: args.pdfium_lib,
        ..ServerConfig::default()
    };
    server::serve(server_config, translation)
        .await
        .context("HTTP service failed")
}

async fn run_translate(args: TranslateArgs, show_progress: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(lang) = args.source_lang {
        config.source_language = lang;
    }
    if let Some(lang) = args.target_lang {
        config.target_language = lang;
    }
    if args.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let selection = parse_pages(&args.pages)?;
    let translator = Translator::new(&config)
        .await
        .context("Failed to initialise the translator")?;

    let progress: ProgressCallback = if show_progress {
        CliProgressCallback::new()
    } else {
        Arc::new(pdf_translator::NoopProgressCallback)
    };

    let pages = translate_document_with_progress(
        Arc::new(PdfiumExtractor::new(args.pdfium_lib)),
        &translator,
        &args.input,
        &selection,
        args.chunk_size,
        &progress,
    )
    .await
    .with_context(|| format!("Failed to translate {}", args.input.display()))?;

    let rendered = if args.json {
        serde_json::to_string_pretty(&pages).context("Failed to serialise output")?
    } else {
        pages
            .iter()
            .map(|p| format!("--- Page {} ---\n{}\n", p.page, p.translated))
            .collect::<Vec<_>>()
            .join("\n")
    };

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Written to {}", green("✔"), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn parse_pages(raw: &str) -> Result<PageSelection> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(PageSelection::All);
    }
    let numbers = raw
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid page number '{}' in --pages", s.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PageSelection::from_numbers(Some(numbers)))
}

async fn run_check() -> Result<()> {
    let config = load_config()?;

    println!("{}", bold("Configuration"));
    println!("  Provider:        {}", config.provider);
    println!("  API key:         {}", config.masked_api_key());
    println!("  Model:           {}", config.model);
    println!("  Endpoint:        {}", config.chat_completions_url());
    println!("  Source language: {}", config.source_language);
    println!("  Target language: {}", config.target_language);
    println!("  Timeout:         {}s", config.timeout_secs);
    println!(
        "  Proxy:           {}",
        config.proxy.as_deref().unwrap_or("<unset>")
    );

    if config.api_key.is_empty() {
        println!();
        println!("{} API_KEY is not set. Add it to .env:", red("✘"));
        println!("    API_KEY=sk-...");
        bail!("API_KEY is not set (API_PROVIDER={})", config.provider);
    }

    println!();
    println!("{}", bold("Connection test"));
    let translator = Translator::new(&config)
        .await
        .context("Failed to initialise the translator")?;
    let started = Instant::now();
    match translator.translate("Hello", None, None).await {
        Ok(text) => {
            println!(
                "  {} \"Hello\" → \"{}\"  {}",
                green("✓"),
                text,
                dim(&format!("{:.1}s", started.elapsed().as_secs_f64()))
            );
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", red("✗"), e);
            println!();
            println!("Try `pdftrans probe-proxy` if the API is only reachable through a proxy.");
            Err(e).context("Connection test failed")
        }
    }
}

async fn run_probe_proxy(args: ProbeArgs) -> Result<()> {
    println!("{}", bold(&format!("Probing common proxy ports on {}", args.host)));

    let mut found = Vec::new();
    for &port in COMMON_PROXY_PORTS {
        match probe_tcp(&args.host, port).await {
            Ok(()) => {
                println!("  {} port {} is open", green("✓"), port);
                found.push(format!("http://{}:{}", args.host, port));
            }
            Err(e) => println!("  {} port {}  {}", red("✗"), port, dim(&e.to_string())),
        }
    }

    println!();
    match found.first() {
        Some(url) => {
            println!("Found a proxy. Add this to .env:");
            println!("    PROXY={url}");
        }
        None => {
            println!("No local proxy found. Either:");
            println!("  1. start your proxy client, or");
            println!("  2. remove PROXY from .env if the API is directly reachable, or");
            println!("  3. set PROXY to another proxy address.");
        }
    }
    Ok(())
}
