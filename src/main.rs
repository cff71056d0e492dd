//! MimiMoe CLI - browse the mimimoe.moe catalog from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimimoe::config::Config;
use mimimoe::console::Console;
use mimimoe::sources::{MangasPage, Source, SourceRegistry};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Browse mimimoe.moe through its JSON API.
#[derive(Parser, Debug)]
#[command(name = "mimimoe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use this config file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Source used for listings and bare ids.
    #[arg(long, global = true, default_value = "mimimoe")]
    source: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the most viewed manga.
    Popular {
        /// Page number (1-based).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// List recently updated manga.
    Latest {
        /// Page number (1-based).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show a manga's details and chapters.
    Details {
        /// Manga web URL, identifier path, or numeric id.
        manga: String,
    },

    /// List a manga's chapters, newest first.
    Chapters {
        /// Manga web URL, identifier path, or numeric id.
        manga: String,
    },

    /// List the image URLs of a chapter.
    Pages {
        /// Chapter web URL, identifier path, or numeric id.
        chapter: String,
    },
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "mimimoe=debug" } else { "mimimoe=info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let console = Console::new();

    if let Err(e) = run(args, &console).await {
        console.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Loads and validates the config, applying command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    config.source.debug |= args.debug;
    Ok(config)
}

async fn run(args: Args, console: &Console) -> Result<()> {
    let config = load_config(&args)?;
    init_tracing(config.source.debug);
    tracing::debug!(api_url = %config.source.api_url, "configuration loaded");

    let registry = SourceRegistry::new(&config.source).context("Failed to create sources")?;
    let default_source = || {
        registry
            .find_by_id(&args.source)
            .ok_or_else(|| anyhow::anyhow!("Unknown source: {}", args.source))
    };
    let source_for = |input: &str| {
        registry
            .find_for_input(input, &args.source)
            .ok_or_else(|| anyhow::anyhow!("No source found for: {}", input))
    };

    match &args.command {
        Command::Popular { page } => {
            let page = *page;
            let source = default_source()?;
            console.step(&format!("Fetching popular manga, page {}...", page));
            let listing = source
                .popular_manga(page)
                .await
                .context("Failed to fetch popular manga")?;
            print_listing(console, &listing);
        }
        Command::Latest { page } => {
            let page = *page;
            let source = default_source()?;
            if !source.supports_latest() {
                anyhow::bail!("{} does not support latest updates", source.name());
            }
            console.step(&format!("Fetching latest updates, page {}...", page));
            let listing = source
                .latest_updates(page)
                .await
                .context("Failed to fetch latest updates")?;
            print_listing(console, &listing);
        }
        Command::Details { manga } => {
            let source = source_for(manga.as_str())?;
            let manga = source.manga_from_input(manga)?;
            console.step(&format!("Fetching {}...", source.manga_url(&manga)));

            let (details, chapters) =
                futures::try_join!(source.manga_details(&manga), source.chapter_list(&manga))
                    .context("Failed to fetch manga")?;

            console.section(&details.title);
            println!("{}", console.field("Author", details.author.as_deref()));
            println!("{}", console.field("Genre", details.genre.as_deref()));
            println!("{}", console.field("Status", Some(details.status.to_string().as_str())));
            println!("{}", console.field("Cover", details.thumbnail_url.as_deref()));
            println!(
                "{}",
                console.field("Description", details.description.as_deref())
            );

            console.section(&format!("{} chapters", console.count(chapters.len())));
            for chapter in &chapters {
                println!("{}", console.chapter_line(chapter));
            }
        }
        Command::Chapters { manga } => {
            let source = source_for(manga.as_str())?;
            let manga = source.manga_from_input(manga)?;
            console.step("Fetching chapter list...");
            let chapters = source
                .chapter_list(&manga)
                .await
                .context("Failed to fetch chapter list")?;

            console.success(&format!("Found {} chapters", console.count(chapters.len())));
            for chapter in &chapters {
                println!("{}", console.chapter_line(chapter));
            }
        }
        Command::Pages { chapter } => {
            let source = source_for(chapter.as_str())?;
            let chapter = source.chapter_from_input(chapter)?;
            console.step(&format!("Fetching pages of {}...", source.chapter_url(&chapter)));
            let pages = source
                .page_list(&chapter)
                .await
                .context("Failed to fetch page list")?;

            console.success(&format!("Found {} pages", console.count(pages.len())));
            for page in &pages {
                println!("{}", console.page_line(page));
            }
        }
    }

    Ok(())
}

fn print_listing(console: &Console, listing: &MangasPage) {
    if listing.mangas.is_empty() {
        console.warning("No manga on this page");
        return;
    }

    console.success(&format!("Found {} manga", console.count(listing.mangas.len())));
    for manga in &listing.mangas {
        println!("{}", console.manga_line(manga));
    }

    if listing.has_next_page {
        console.info(&console.muted("More results may be available on the next page"));
    }
}
