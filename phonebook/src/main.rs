// Phonebook - single-user contact book
// Entry point and application setup

use anyhow::Context;
use phonebook::app::{self, AppState};
use phonebook::commands::Console;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stderr keeps it out of the console output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phonebook=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Phonebook");

    let state = AppState::from_env();
    let mut book = app::setup(&state)
        .await
        .with_context(|| format!("Failed to open data directory {:?}", state.app_data_dir))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());
    console.run(&mut book).await?;

    tracing::info!("Phonebook closed");
    Ok(())
}
