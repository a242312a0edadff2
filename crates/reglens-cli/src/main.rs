//! Reglens CLI - change and relationship detection for regulatory documents.

use clap::Parser;
use reglens_analysis::{fingerprint, RelationshipClassifier};
use reglens_cli::commands;
use reglens_cli::{Cli, Command, Config, Formatter};
use reglens_store::SqliteStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> reglens_cli::Result<()> {
    // Fatal: every fingerprint depends on it
    fingerprint::self_test()?;

    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // Similarity needs no database
    let command = match cli.command {
        Command::Similarity(args) => return commands::execute_similarity(args, &config, &formatter),
        other => other,
    };

    let db_path = config.database_path(cli.db)?;
    tracing::debug!("Opening database at {}", db_path.display());
    let store = Arc::new(SqliteStore::new(&db_path)?);
    let classifier = RelationshipClassifier::new(config.detection.clone())?;

    match command {
        Command::Import(args) => commands::execute_import(args, &store, &formatter)?,
        Command::DetectChange(args) => commands::execute_detect_change(args, &store, &formatter)?,
        Command::Classify(args) => commands::execute_classify(args, &store, &classifier, &formatter)?,
        Command::Detect(args) => commands::execute_detect(args, &store, &classifier, &formatter)?,
        Command::Bulk(args) => {
            commands::execute_bulk(args, store, classifier, config.sweep.clone(), &formatter).await?
        }
        Command::Duplicates(args) => commands::execute_duplicates(args, &store, &config, &formatter)?,
        Command::Summary(args) => commands::execute_summary(args, &store, &formatter)?,
        Command::Report(args) => commands::execute_report(args, &store, &formatter)?,
        Command::History(args) => commands::execute_history(args, &store, &formatter)?,
        Command::Conflicts(args) => commands::execute_conflicts(args, &store, &formatter)?,
        Command::Watch(args) => {
            commands::execute_watch(args, store, classifier, config.sweep.clone(), &formatter).await?
        }
        Command::Similarity(_) => {}
    }

    Ok(())
}
