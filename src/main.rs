use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use norma::cli::{Cli, Commands};
use norma::engine::Engine;
use norma::extract;
use norma::scheduler::IngestJob;
use norma::stores::{InMemoryDocumentStore, InMemoryHistoryStore, InMemoryTestStore};
use norma::types::DocumentStatus;
use norma::utils::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose { "norma=debug,info" } else { "norma=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let engine = Engine::connect(config).context("Failed to connect engine")?;
    engine
        .ensure_ready()
        .await
        .context("Vector store is not ready")?;

    match cli.command {
        Commands::Ingest {
            file,
            document_id,
            reindex,
        } => {
            let document_id = document_id.unwrap_or_else(|| {
                file.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document")
                    .to_string()
            });

            let text = extract::extract_text(&file)
                .await
                .with_context(|| format!("Failed to extract text from {}", file.display()))?;

            let documents = Arc::new(InMemoryDocumentStore::new());
            documents.insert(&document_id, &text);

            let scheduler = engine.scheduler(documents.clone());
            let job = if reindex {
                IngestJob::Reindex {
                    document_id: document_id.clone(),
                }
            } else {
                IngestJob::Process {
                    document_id: document_id.clone(),
                }
            };
            scheduler.submit(job)?;
            scheduler.shutdown().await;

            match documents.status(&document_id) {
                Some(DocumentStatus::Processed) => {
                    let meta = documents.meta(&document_id);
                    println!("Indexed '{}'", document_id);
                    if let Some(meta) = meta {
                        println!("  title: {}", meta.title);
                        if let Some(year) = meta.year {
                            println!("  year:  {}", year);
                        }
                    }
                }
                _ => anyhow::bail!(
                    "Processing failed: {}",
                    documents
                        .error(&document_id)
                        .unwrap_or_else(|| "unknown error".to_string())
                ),
            }
        }

        Commands::Ask { question, limit } => {
            let history = Arc::new(InMemoryHistoryStore::new());
            let consultation = engine.consultation(history);

            let result = consultation.ask(&question, limit).await?;
            println!("{}\n", result.response);
            if !result.sources.is_empty() {
                println!("Sources:");
                for source in &result.sources {
                    match source.year {
                        Some(year) => println!(
                            "  [{}] {} ({}) score={:.3}",
                            source.index, source.title, year, source.score
                        ),
                        None => println!(
                            "  [{}] {} score={:.3}",
                            source.index, source.title, source.score
                        ),
                    }
                }
            }
        }

        Commands::Quiz { count } => {
            let tests = Arc::new(InMemoryTestStore::new());
            let quiz = engine.quiz(tests);

            let test = quiz.generate(count).await?;
            println!("{}", serde_json::to_string_pretty(&test)?);
        }

        Commands::Remove { document_id } => {
            engine.processor().remove(&document_id).await?;
            println!("Removed '{}'", document_id);
        }
    }

    Ok(())
}
