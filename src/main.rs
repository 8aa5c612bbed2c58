//! refdoc — render API reference pages from a parsed docblock catalog.
//!
//! Two subcommands:
//!
//! - **render**: `refdoc render -o site catalog.json` writes one page per
//!   published entry to `site/<kind plural>/<name>.<ext>`
//! - **format**: `refdoc format summary < text` runs a single formatter on
//!   stdin, for checking how a docblock will come out

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use refdoc::escape::sanitize_key;
use refdoc::render;
use refdoc::{Config, MemoryRepository, Page, Resolver, SourceReader};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "refdoc",
    about = "Render API reference pages from parsed docblocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render reference pages for every published entry
    Render(RenderArgs),
    /// Format text from stdin and write the result to stdout
    Format(FormatArgs),
}

/// Site settings shared by every subcommand.
#[derive(Args)]
struct SiteArgs {
    /// TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Override the site root URL
    #[arg(long)]
    home_url: Option<String>,

    /// Do not put URLs under `reference/`
    #[arg(long)]
    no_prefix: bool,

    /// Link functions and hooks without checking the catalog
    #[arg(long)]
    lenient_links: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Catalog files, directories of *.json files, or glob patterns
    #[arg(required = true)]
    catalogs: Vec<String>,

    /// Output directory
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Output format: html (default), json
    #[arg(short = 'f', long, default_value = "html")]
    format: String,

    /// Only render entries with this name. Can be specified multiple times.
    #[arg(long)]
    only: Vec<String>,

    #[command(flatten)]
    site: SiteArgs,
}

#[derive(Args)]
struct FormatArgs {
    /// Which formatter to run
    #[arg(value_enum)]
    kind: FormatKind,

    /// Catalogs used to resolve references
    #[arg(long)]
    catalog: Vec<String>,

    #[command(flatten)]
    site: SiteArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatKind {
    /// Excerpt formatting
    Summary,
    /// Parameter description, including references and hash notation
    Param,
    /// Only `{@link}` / `{@see}` references
    Links,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => render_mode(&args),
        Command::Format(args) => format_mode(&args),
    }
}

/// Log to stderr; `REFDOC_LOG` takes an EnvFilter directive, default `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("REFDOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(site: &SiteArgs) -> Result<Config> {
    let mut config = match site.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(ref url) = site.home_url {
        config.home_url = url.trim_end_matches('/').to_string();
    }
    if site.no_prefix {
        config.use_prefix = false;
    }
    if site.lenient_links {
        config.strict_links = false;
    }
    Ok(config)
}

/// Load every catalog into one repository. Unreadable or invalid catalogs
/// are skipped with a warning.
fn load_catalogs(patterns: &[String]) -> Result<MemoryRepository> {
    let mut repo = MemoryRepository::new();
    for path in expand_globs(patterns)? {
        if let Err(e) = repo.load_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping catalog");
        }
    }
    if let Err(e) = repo.validate() {
        tracing::warn!(error = %e, "catalog is inconsistent");
    }
    Ok(repo)
}

/// render mode: one page per published entry, written under the output directory.
fn render_mode(args: &RenderArgs) -> Result<()> {
    let config = load_config(&args.site)?;
    let repo = load_catalogs(&args.catalogs)?;
    if repo.is_empty() {
        bail!("no entries loaded from {}", args.catalogs.join(", "));
    }

    let renderer = render::create_renderer(&args.format)?;
    let ext = renderer.file_extension();
    let sources = SourceReader::new(config.source.root_dir.clone());
    let ctx = refdoc::Context::new(&repo, &config, &sources);

    let mut written = 0;
    let mut taken = HashSet::new();
    for entry in repo.entries() {
        if !entry.is_published() {
            continue;
        }
        if !args.only.is_empty() && !args.only.iter().any(|n| *n == entry.name || *n == entry.title) {
            continue;
        }

        let page = Page::build(entry, &ctx);
        let output = renderer
            .render(&page)
            .with_context(|| format!("failed to render {}", entry.name))?;

        let dir = args.output.join(entry.kind.archive_slug());
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
        let file_name = unique_output_name(&mut taken, entry.kind.archive_slug(), &entry.name, entry.id.0);
        let out_path = dir.join(format!("{}.{}", file_name, ext));
        fs::write(&out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        written += 1;
    }

    if written == 0 && !args.only.is_empty() {
        bail!("no published entry named {}", args.only.join(", "));
    }
    tracing::info!(pages = written, output = %args.output.display(), "rendered");
    Ok(())
}

/// format mode: read stdin, run one formatter, write stdout.
fn format_mode(args: &FormatArgs) -> Result<()> {
    let config = load_config(&args.site)?;
    let repo = load_catalogs(&args.catalog)?;
    let resolver = Resolver::new(&repo, &config);

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let input = input.trim_end_matches(['\n', '\r']);

    let output = match args.kind {
        FormatKind::Summary => refdoc::format_summary(input),
        FormatKind::Param => refdoc::format_param_description(input, &resolver),
        FormatKind::Links => refdoc::make_doclinks_clickable(input, &resolver),
    };
    println!("{}", output);
    Ok(())
}

/// File extension of catalog files found in directories.
const CATALOG_EXTENSION: &str = "json";

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for catalog files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned for catalogs (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(CATALOG_EXTENSION) {
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
            tracing::warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

/// File name (without extension) for an entry's page.
/// "WP_Query-get_posts" → "wp_query-get_posts"; falls back to the id.
fn output_name(name: &str, id: u64) -> String {
    let key = sanitize_key(name);
    if key.is_empty() {
        id.to_string()
    } else {
        key
    }
}

/// [`output_name`], unless another entry of the same archive already took
/// it in this run; then the entry id.
fn unique_output_name(taken: &mut HashSet<(String, String)>, archive: &str, name: &str, id: u64) -> String {
    let preferred = output_name(name, id);
    if taken.insert((archive.to_string(), preferred.clone())) {
        return preferred;
    }
    tracing::warn!(name, id, file = %preferred, "output name already used, writing by id");
    let fallback = id.to_string();
    taken.insert((archive.to_string(), fallback.clone()));
    fallback
}
