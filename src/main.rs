//! srcmark — highlight witness lines and link function calls in rendered
//! source-code pages.
//!
//! Two modes:
//!
//! - **stdin mode**: `srcmark -a page.json < page.html > out.html`
//! - **file mode**: `srcmark -o annotated/ pages/*.html` (annotations from
//!   `-a`, or from a `<stem>.annotations.json` sidecar next to each page)

use anyhow::{Context, Result};
use clap::Parser;
use srcmark::{HighlightConfig, PageAnnotations, Viewer, ViewerConfig, DEFAULT_EXTENSION};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "srcmark",
    about = "Highlight witness lines and link called functions in rendered source pages"
)]
struct Cli {
    /// Input HTML pages (glob patterns and directories supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Annotations JSON applied to every page
    #[arg(short = 'a', long)]
    annotations: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long, conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Rewrite input pages in place
    #[arg(long)]
    in_place: bool,

    /// Also highlight every text occurrence of this term
    #[arg(long)]
    term: Option<String>,

    /// Match --term case-insensitively
    #[arg(short = 'i', long, requires = "term")]
    ignore_case: bool,

    /// Class marking highlighted lines
    #[arg(long, default_value = "highlight")]
    highlight_class: String,

    /// Class marking inserted reason annotations
    #[arg(long, default_value = "witness-reason")]
    reason_class: String,

    /// Class marking --term matches
    #[arg(long, default_value = "search-highlight")]
    term_class: String,

    /// Extension appended to function link targets
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            highlight: HighlightConfig {
                highlight_class: self.highlight_class.clone(),
                reason_class: self.reason_class.clone(),
            },
            term_class: self.term_class.clone(),
            extension: self.extension.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let viewer = Viewer::initialize(cli.viewer_config());

    if cli.files.is_empty() {
        return stdin_mode(&cli, &viewer);
    }

    file_mode(&cli, &viewer)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// stdin mode: read one page from stdin, write the annotated page to stdout.
fn stdin_mode(cli: &Cli, viewer: &Viewer) -> Result<()> {
    let path = cli
        .annotations
        .as_deref()
        .context("--annotations is required when reading from stdin")?;
    let annotations = load_annotations(path)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    print!("{}", annotate(cli, viewer, &input, &annotations));
    Ok(())
}

/// file mode: annotate every page, writing to the output directory or in place.
fn file_mode(cli: &Cli, viewer: &Viewer) -> Result<()> {
    let output_dir = match (&cli.output, cli.in_place) {
        (Some(dir), _) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
            Some(dir.as_path())
        }
        (None, true) => None,
        (None, false) => anyhow::bail!("--output or --in-place is required when files are given"),
    };

    let shared = match cli.annotations.as_deref() {
        Some(path) => Some(load_annotations(path)?),
        None => None,
    };

    let pages = expand_globs(&cli.files)?;
    for page in &pages {
        let content = match fs::read_to_string(page) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping {}: {}", page.display(), e);
                continue;
            }
        };

        let annotations = match &shared {
            Some(annotations) => annotations.clone(),
            None => match sidecar_annotations(page) {
                Ok(Some(annotations)) => annotations,
                Ok(None) => {
                    tracing::warn!("no annotations for {}, copied unchanged", page.display());
                    PageAnnotations::default()
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", page.display(), e);
                    continue;
                }
            },
        };

        let out_path = match output_dir {
            Some(dir) => dir.join(page.file_name().context("page path has no file name")?),
            None => page.clone(),
        };
        let output = annotate(cli, viewer, &content, &annotations);
        fs::write(&out_path, output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        tracing::info!("annotated {} -> {}", page.display(), out_path.display());
    }

    Ok(())
}

fn annotate(cli: &Cli, viewer: &Viewer, page: &str, annotations: &PageAnnotations) -> String {
    let annotated = viewer.annotate_page(page, annotations);
    match cli.term.as_deref() {
        Some(term) => viewer.highlight_term(&annotated, term, cli.ignore_case),
        None => annotated,
    }
}

fn load_annotations(path: &Path) -> Result<PageAnnotations> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    PageAnnotations::from_json(&json)
        .with_context(|| format!("invalid annotations in {}", path.display()))
}

/// Annotations stored next to a page: `foo.html` → `foo.annotations.json`.
fn sidecar_path(page: &Path) -> PathBuf {
    let stem = page
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    page.with_file_name(format!("{}.annotations.json", stem))
}

fn sidecar_annotations(page: &Path) -> Result<Option<PageAnnotations>> {
    let path = sidecar_path(page);
    if !path.is_file() {
        return Ok(None);
    }
    load_annotations(&path).map(Some)
}

/// File extensions recognized as rendered pages.
const SUPPORTED_EXTENSIONS: &[&str] = &["html", "htm"];

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned (non-recursively) for pages.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
