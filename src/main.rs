use inbox_rules::backend::{Backend, NoopBackend, RecordingBackend};
use inbox_rules::config::Config;
use inbox_rules::fixture::Fixture;
use inbox_rules::rules::BatchProcessor;
use inbox_rules::store::StoreEvent;
use tokio::sync::broadcast::error::TryRecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .init();

    eprintln!("📥 Inbox Rules v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Fixture: {}", config.fixture_path.display());
    eprintln!("   Label rules: {}", config.label_rules);
    eprintln!("   Dry run: {}\n", config.dry_run);

    let fixture = Fixture::load(&config.fixture_path).await?;
    let store = fixture.to_store().await;
    let mut events = store.subscribe();

    let rules = fixture.build_rules(&store, config.label_rules).await?;
    tracing::info!(rules = rules.len(), "Rules ready");

    // ── Batch ────────────────────────────────────────────────────────
    let mut batch = BatchProcessor::new(&fixture.org, &rules);
    let counts = batch.include(&fixture.messages);

    let recorder = RecordingBackend::new();
    let backend: &dyn Backend = if config.dry_run {
        &recorder
    } else {
        &NoopBackend
    };
    let applied = batch.apply(&store, backend).await?;

    eprintln!(
        "Matched {} rule(s), deferred {} action(s), applied {} distinct action(s)",
        counts.rules_matched, counts.actions_deferred, applied
    );

    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Lagged(skipped)) => {
                eprintln!("   ... {skipped} earlier change(s) not shown");
                continue;
            }
            Err(_) => break,
        };
        match event {
            StoreEvent::MessageLabelled {
                message,
                label,
                day,
            } => eprintln!("   message {message}: labelled {label} ({day})"),
            StoreEvent::MessageFlagged { message } => eprintln!("   message {message}: flagged"),
            StoreEvent::MessageArchived { message } => eprintln!("   message {message}: archived"),
        }
    }

    if config.dry_run {
        for call in recorder.calls() {
            println!("{}", serde_json::to_string(&call)?);
        }
    }

    Ok(())
}
