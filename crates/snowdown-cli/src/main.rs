use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snowdown::{Category, DocumentSource, Event, LocatorConfig, TextStore};
use snowdown_local::extract::{PdfSource, StaticText};
use snowdown_local::likes::LikedEvents;
use snowdown_local::resolve::DescriptionResolver;
use snowdown_local::schedule_text::{self, ScheduleText};
use snowdown_local::{catalog, overrides, FsStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "snowdown")]
#[command(about = "Snowdown festival schedule: events, long descriptions, liked events", long_about = None)]
struct Cli {
    /// Schedule program PDF used for long descriptions.
    #[arg(long, global = true, env = "SNOWDOWN_PDF")]
    pdf: Option<PathBuf>,
    /// Pre-flattened schedule text; takes precedence over --pdf.
    #[arg(long, global = true, env = "SNOWDOWN_TEXT_FILE")]
    text_file: Option<PathBuf>,
    /// Directory for the durable text/likes store (default: user cache dir).
    #[arg(long, global = true, env = "SNOWDOWN_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
    /// Cache key version; bump to force a fresh extraction.
    #[arg(long, global = true, env = "SNOWDOWN_CACHE_VERSION", default_value = schedule_text::DEFAULT_VERSION)]
    cache_version: String,
    /// Keep everything in memory for this run.
    #[arg(long, global = true)]
    no_cache: bool,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", global = true, default_value = "json")]
    output: String,
    /// More logging on stderr (repeatable). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List events, optionally filtered.
    Events(EventsCmd),
    /// Show the long description for an event (id or title).
    Describe(DescribeCmd),
    /// Toggle the liked state of an event (id or title).
    Like(LikeCmd),
    /// List liked events grouped by date.
    Liked,
    /// Print the flattened schedule text.
    DumpText,
    /// Diagnose configuration (json; no document contents).
    Doctor,
    /// Print version info.
    Version,
}

#[derive(clap::Args, Debug)]
struct EventsCmd {
    /// Only events on this date (YYYY-MM-DD or all-week).
    #[arg(long)]
    date: Option<String>,
    /// Only events in this category (competition|activity|entertainment).
    #[arg(long)]
    category: Option<Category>,
    /// Case-insensitive search over title, location and description.
    #[arg(long)]
    search: Option<String>,
}

#[derive(clap::Args, Debug)]
struct DescribeCmd {
    event: String,
}

#[derive(clap::Args, Debug)]
struct LikeCmd {
    event: String,
}

/// Stand-in source when no schedule document was configured.
struct NoDocument;

#[async_trait::async_trait]
impl DocumentSource for NoDocument {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn flattened_text(&self) -> snowdown::Result<String> {
        Err(snowdown::Error::Document(
            "no schedule document configured (set --pdf or --text-file)".to_string(),
        ))
    }
}

impl Cli {
    fn text_output(&self) -> bool {
        self.output.eq_ignore_ascii_case("text")
    }

    fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|d| d.join("snowdown"))
                .unwrap_or_else(FsStore::default_dir)
        })
    }

    fn store(&self) -> Arc<dyn TextStore> {
        if self.no_cache {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FsStore::new(self.cache_dir()))
        }
    }

    fn source(&self) -> Result<Arc<dyn DocumentSource>> {
        if let Some(p) = &self.text_file {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading schedule text {}", p.display()))?;
            return Ok(Arc::new(StaticText::new(text)));
        }
        if let Some(p) = &self.pdf {
            return Ok(Arc::new(PdfSource::from_path(p)));
        }
        Ok(Arc::new(NoDocument))
    }

    fn schedule_text(&self) -> Result<ScheduleText> {
        Ok(ScheduleText::new(
            self.source()?,
            self.store(),
            &self.cache_version,
        ))
    }
}

fn find_event(q: &str) -> Result<&'static Event> {
    catalog::find(q).ok_or_else(|| anyhow::anyhow!("unknown event: {q}"))
}

fn print_event_line(e: &Event) {
    println!(
        "{:>3}  {}  {:<8}  {}  @ {}",
        e.id,
        catalog::short_date_label(&e.date),
        e.time,
        e.title,
        e.location
    );
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "snowdown=warn,snowdown_local=warn",
        1 => "snowdown=info,snowdown_local=info",
        _ => "snowdown=debug,snowdown_local=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Events(args) => {
            let mut list: Vec<&Event> = match &args.search {
                Some(q) => catalog::search(q),
                None => catalog::events().iter().collect(),
            };
            if let Some(d) = &args.date {
                list.retain(|e| &e.date == d);
            }
            if let Some(c) = args.category {
                list.retain(|e| e.category == c);
            }
            if cli.text_output() {
                for e in &list {
                    print_event_line(e);
                }
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "events",
                    "ok": true,
                    "count": list.len(),
                    "dates": catalog::unique_dates(),
                    "events": list,
                });
                println!("{v}");
            }
        }
        Commands::Describe(args) => {
            let event = find_event(&args.event)?;
            let resolver = DescriptionResolver::new(cli.schedule_text()?, LocatorConfig::from_env());
            let resolved = resolver.resolve_event(event).await;
            let source = match &resolved {
                Some(_) if overrides::lookup(&event.title).is_some() => "override",
                Some(_) => "document",
                None => "fallback",
            };
            tracing::info!(event = %event.id, source, "description resolved");
            let description = resolved.unwrap_or_else(|| event.description.clone());
            if cli.text_output() {
                println!("{}\n\n{}", event.title, description);
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "describe",
                    "ok": true,
                    "event": event,
                    "description": description,
                    "description_source": source,
                });
                println!("{v}");
            }
        }
        Commands::Like(args) => {
            let event = find_event(&args.event)?;
            let mut likes = LikedEvents::load(cli.store());
            let liked = likes.toggle(&event.id);
            if cli.text_output() {
                let verb = if liked { "liked" } else { "unliked" };
                println!("{verb} {} ({} liked)", event.title, likes.count());
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "like",
                    "ok": true,
                    "event_id": event.id,
                    "liked": liked,
                    "count": likes.count(),
                });
                println!("{v}");
            }
        }
        Commands::Liked => {
            let likes = LikedEvents::load(cli.store());
            let groups = likes.grouped_by_date();
            if cli.text_output() {
                if groups.is_empty() {
                    println!("no liked events");
                }
                for g in &groups {
                    println!("{}", g.label);
                    for e in &g.events {
                        print_event_line(e);
                    }
                }
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "liked",
                    "ok": true,
                    "count": likes.count(),
                    "groups": groups,
                });
                println!("{v}");
            }
        }
        Commands::DumpText => {
            let st = cli.schedule_text()?;
            let text = st.load_text().await.context("loading schedule text")?;
            if cli.text_output() {
                println!("{text}");
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "kind": "schedule_text",
                    "ok": true,
                    "key": st.key(),
                    "extracted": st.extractions() > 0,
                    "chars": text.chars().count(),
                    "text": &*text,
                });
                println!("{v}");
            }
        }
        Commands::Doctor => {
            let key = schedule_text::storage_key(schedule_text::DEFAULT_KEY_PREFIX, &cli.cache_version);
            let store = cli.store();
            let cached = matches!(store.get(&key), Ok(Some(ref s)) if !s.is_empty());
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "doctor",
                "ok": true,
                "pdf": cli.pdf,
                "pdf_exists": cli.pdf.as_ref().is_some_and(|p| p.exists()),
                "text_file": cli.text_file,
                "cache_dir": if cli.no_cache { None } else { Some(cli.cache_dir()) },
                "cache_key": key,
                "cached_text": cached,
                "locator": LocatorConfig::from_env(),
                "events": catalog::events().len(),
            });
            if cli.text_output() {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                println!("{v}");
            }
        }
        Commands::Version => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "snowdown",
                "version": env!("CARGO_PKG_VERSION"),
            });
            if cli.text_output() {
                println!("snowdown {}", env!("CARGO_PKG_VERSION"));
            } else {
                println!("{v}");
            }
        }
    }
    Ok(())
}
