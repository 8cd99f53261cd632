// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formfact - a personal knowledge-resolution engine for form filling.
//!
//! This is the binary entry point for the Formfact CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use formfact_config::FormfactConfig;
use formfact_core::entry::EntryKind;
use formfact_core::{EmbeddingAdapter, FactStore, PluginAdapter};
use formfact_embedder::HttpEmbedder;
use formfact_knowledge::{ConfirmationWriter, EmbeddingWorker, KnowledgeStore, StalenessPolicy};
use formfact_resolver::{FieldKind, Resolution, Resolver};
use formfact_storage::Database;

/// Formfact - a personal knowledge-resolution engine for form filling.
#[derive(Parser, Debug)]
#[command(name = "formfact", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a form field against the fact store.
    Resolve {
        /// Owner whose facts to search.
        #[arg(long)]
        owner: String,
        /// The field label, verbatim from the form.
        label: String,
        /// The form control type.
        #[arg(long, value_enum, default_value_t = KindArg::Text)]
        kind: KindArg,
    },
    /// Record a user-accepted value as the canonical verified answer.
    Confirm {
        /// Owner the fact belongs to.
        #[arg(long)]
        owner: String,
        /// Canonical field key (e.g. "email").
        field_key: String,
        /// The field label as shown on the form.
        label: String,
        /// The accepted value.
        value: String,
    },
    /// Record an extracted fact as an unverified candidate.
    Ingest {
        /// Owner the fact belongs to.
        #[arg(long)]
        owner: String,
        /// The field label the fact answers.
        label: String,
        /// The fact content (use "Value: <x>" for field answers).
        payload: String,
        /// Group bucket for the fact.
        #[arg(long)]
        group: String,
        /// Entry kind.
        #[arg(long, value_enum, default_value_t = EntryKindArg::DerivedFieldValue)]
        kind: EntryKindArg,
        /// Originating artifact reference.
        #[arg(long, default_value = "manual")]
        provenance: String,
        /// Extraction confidence.
        #[arg(long, default_value_t = 0.7)]
        confidence: f64,
    },
    /// Delete all entries of one kind for an owner.
    Purge {
        /// Owner whose entries to purge.
        #[arg(long)]
        owner: String,
        /// Entry kind to remove.
        #[arg(value_enum)]
        kind: EntryKindArg,
    },
    /// Drain the embedding work queue against the embedding service.
    SyncEmbeddings,
    /// Show store counts and queue depth.
    Status {
        /// Owner to report on.
        #[arg(long)]
        owner: String,
    },
}

/// CLI mirror of the resolver's field kinds.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Text,
    Email,
    Phone,
    Number,
    Date,
    Select,
    Textarea,
}

impl From<KindArg> for FieldKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => FieldKind::Text,
            KindArg::Email => FieldKind::Email,
            KindArg::Phone => FieldKind::Phone,
            KindArg::Number => FieldKind::Number,
            KindArg::Date => FieldKind::Date,
            KindArg::Select => FieldKind::Select,
            KindArg::Textarea => FieldKind::Textarea,
        }
    }
}

/// CLI mirror of the stored entry kinds.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntryKindArg {
    DerivedFieldValue,
    Experience,
    Achievement,
    Value,
    Goal,
    Freeform,
}

impl From<EntryKindArg> for EntryKind {
    fn from(kind: EntryKindArg) -> Self {
        match kind {
            EntryKindArg::DerivedFieldValue => EntryKind::DerivedFieldValue,
            EntryKindArg::Experience => EntryKind::Experience,
            EntryKindArg::Achievement => EntryKind::Achievement,
            EntryKindArg::Value => EntryKind::Value,
            EntryKindArg::Goal => EntryKind::Goal,
            EntryKindArg::Freeform => EntryKind::Freeform,
        }
    }
}

/// The assembled engine behind every subcommand.
struct Engine {
    store: Arc<KnowledgeStore>,
    writer: ConfirmationWriter,
    worker: Option<EmbeddingWorker>,
    resolver: Resolver,
}

impl Engine {
    /// Drain the embed queue if the embedding client was built.
    async fn drain_embeds(&self) -> Result<usize, formfact_core::FormfactError> {
        match &self.worker {
            Some(worker) => worker.drain().await,
            None => {
                warn!("embedding client unavailable, queue left untouched");
                Ok(0)
            }
        }
    }
}

async fn build_engine(config: &FormfactConfig) -> Result<Engine, formfact_core::FormfactError> {
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    let store = Arc::new(KnowledgeStore::new(
        db,
        StalenessPolicy::new(config.resolver.staleness_window_days),
    ));

    // A misconfigured embedder only costs the semantic stages.
    let embedder: Option<Arc<dyn EmbeddingAdapter>> = match HttpEmbedder::new(&config.embedding) {
        Ok(embedder) => Some(Arc::new(embedder)),
        Err(e) => {
            warn!(error = %e, "embedding client unavailable, semantic stages disabled");
            None
        }
    };

    let writer = ConfirmationWriter::new(store.clone());
    let worker = embedder
        .clone()
        .map(|embedder| EmbeddingWorker::new(store.clone(), embedder));
    let resolver = Resolver::new(
        store.clone() as Arc<dyn FactStore>,
        embedder,
        config.resolver.clone(),
    );

    Ok(Engine {
        store,
        writer,
        worker,
        resolver,
    })
}

#[tokio::main]
async fn main() {
    let config = match formfact_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            formfact_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, &config).await {
        eprintln!("formfact: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &FormfactConfig) -> Result<(), formfact_core::FormfactError> {
    let engine = build_engine(config).await?;

    match cli.command {
        Commands::Resolve { owner, label, kind } => {
            let resolution = engine
                .resolver
                .resolve_field(&owner, &label, kind.into())
                .await?;
            match resolution {
                Resolution::Value { value, entry_id } => {
                    println!("value\t{value}");
                    engine.resolver.mark_consumed(&owner, &entry_id).await;
                }
                Resolution::Deferred => println!("deferred"),
                Resolution::NoMatch => println!("no_match"),
            }
        }
        Commands::Confirm {
            owner,
            field_key,
            label,
            value,
        } => {
            let entry_id = engine
                .writer
                .confirm_field(&owner, &field_key, &label, &value)
                .await?;
            println!("confirmed\t{entry_id}");
            // Best-effort immediate drain; leftovers wait for sync-embeddings.
            if let Err(e) = engine.drain_embeds().await {
                warn!(error = %e, "embed queue drain failed after confirmation");
            }
        }
        Commands::Ingest {
            owner,
            label,
            payload,
            group,
            kind,
            provenance,
            confidence,
        } => {
            let outcome = engine
                .store
                .ingest_extracted(
                    &owner,
                    &label,
                    &group,
                    kind.into(),
                    &payload,
                    &provenance,
                    confidence,
                )
                .await?;
            match outcome {
                formfact_knowledge::IngestOutcome::Stored { entry_id } => {
                    println!("stored\t{entry_id}");
                }
                formfact_knowledge::IngestOutcome::SkippedFresh => {
                    println!("skipped\trecently verified value stands");
                }
            }
        }
        Commands::Purge { owner, kind } => {
            let removed = engine.store.purge_kind(&owner, kind.into()).await?;
            println!("purged\t{removed}");
        }
        Commands::SyncEmbeddings => {
            let embedded = engine.drain_embeds().await?;
            println!("embedded\t{embedded}");
        }
        Commands::Status { owner } => {
            for (kind, count) in engine.store.kind_counts(&owner).await? {
                println!("{kind}\t{count}");
            }
            println!("pending_embeds\t{}", engine.store.pending_embeds().await?);
        }
    }

    if let Err(e) = engine.store.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    Ok(())
}
