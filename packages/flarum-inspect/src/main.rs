//! Inspect a saved Flarum API response.
//!
//! Reads a response document (and optionally a reaction catalog document)
//! from disk, resolves it, and prints a summary or the resolved graph as JSON.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use flarum_response::{
    EntityKind, EntityView, InMemoryReactionCatalog, ResolverConfig, ResponseResolver,
    ResponseSnapshot, SubjectView,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "flarum-inspect")]
#[command(about = "Resolve a saved Flarum API response and summarize it")]
pub struct Cli {
    /// Response document to resolve
    response: PathBuf,

    /// Reaction catalog document (`/api/reactions` response). Defaults to
    /// FLARUM_REACTIONS
    #[arg(long)]
    reactions: Option<PathBuf>,

    /// Print the resolved snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Panic on content or subject types outside the whitelist
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,flarum_response=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_cli(Cli::parse())?;

    let catalog = match &config.reactions {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            InMemoryReactionCatalog::load_document(&bytes)
                .with_context(|| format!("Failed to load reactions from {}", path.display()))?
        }
        None => {
            tracing::info!("No reaction catalog; post reactions will be dropped");
            InMemoryReactionCatalog::new()
        }
    };

    let bytes = fs::read(&config.response)
        .with_context(|| format!("Failed to read {}", config.response.display()))?;
    let resolver = ResponseResolver::new(catalog).with_config(
        ResolverConfig::new().with_panic_on_unknown_content(config.strict),
    );
    let snapshot = resolver
        .parse(&bytes)
        .with_context(|| format!("Failed to parse {}", config.response.display()))?;

    if config.json {
        let dumped =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{dumped}");
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

fn print_summary(snapshot: &ResponseSnapshot) {
    println!("{}", "Response".bold());
    if let Some(links) = snapshot.links() {
        for (name, link) in [("first", &links.first), ("prev", &links.prev), ("next", &links.next)] {
            if let Some(link) = link {
                println!("  {:<6} {}", name.dimmed(), link);
            }
        }
    }

    println!();
    println!("{}", "Data".bold());
    for entity in snapshot.data().all() {
        println!("  {}", describe(&entity));
    }

    println!();
    println!(
        "{:<18} {:>6} {:>9} {:>6}",
        "Kind".bold(),
        "data".bold(),
        "included".bold(),
        "graph".bold()
    );
    let data = snapshot.data();
    let included = snapshot.included();
    for kind in EntityKind::ALL {
        let total = snapshot.graph().count(kind);
        if total == 0 {
            continue;
        }
        println!(
            "{:<18} {:>6} {:>9} {:>6}",
            kind.to_string(),
            data.contents().count(kind),
            included.contents().count(kind),
            total
        );
    }

    let diagnostics = snapshot.diagnostics();
    println!();
    if diagnostics.is_clean() {
        println!("{}", "✓ No records dropped".green());
        return;
    }
    for dropped in &diagnostics.dropped {
        println!(
            "{} {} {}#{}: {}",
            "✗".red(),
            dropped.section,
            dropped.kind.as_deref().unwrap_or("?"),
            dropped.id.as_deref().unwrap_or("?"),
            dropped.reason
        );
    }
    for discriminator in &diagnostics.unknown_discriminators {
        println!("{} unknown type {}", "!".yellow(), discriminator.yellow());
    }
}

fn describe(entity: &EntityView<'_>) -> String {
    let label = format!("{}#{}", entity.kind(), entity.id()).cyan();
    let detail = match entity {
        EntityView::Discussion(d) => {
            let tags: Vec<_> = d.tags().map(|t| t.entity().attributes.name.as_str()).collect();
            format!("{:?} [{}]", d.attributes.title, tags.join(", "))
        }
        EntityView::Post(p) => {
            let author = p.user().map(|u| u.attributes.display_name.clone());
            format!(
                "#{} by {} ({} reactions)",
                p.attributes.number,
                author.as_deref().unwrap_or("?"),
                p.reactions().count()
            )
        }
        EntityView::User(u) => u.attributes.display_name.clone(),
        EntityView::Tag(t) => t.attributes.name.clone(),
        EntityView::PostReaction(r) => r.reaction.identifier.clone(),
        EntityView::Notification(n) => {
            let subject = match n.subject() {
                Some(SubjectView::Post(p)) => format!("post {}", p.id),
                Some(SubjectView::Discussion(d)) => format!("discussion {}", d.id),
                Some(SubjectView::UserBadge { id }) => format!("user badge {id}"),
                None => "no subject".to_string(),
            };
            format!(
                "{} ({})",
                n.attributes.content_type.as_deref().unwrap_or("?"),
                subject
            )
        }
        EntityView::Badge(b) => b.attributes.name.clone(),
        EntityView::BadgeCategory(c) => c.attributes.name.clone(),
        EntityView::UserBadge(b) => b
            .badge()
            .map(|badge| badge.attributes.name.clone())
            .unwrap_or_default(),
        EntityView::ProfileAnswer(a) => a.attributes.content.clone().unwrap_or_default(),
    };
    format!("{label} {detail}")
}
