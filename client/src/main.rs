//! Stockroom - in-transit ledger snapshot
//!
//! Loads configuration and the persisted session, then prints the transfers
//! currently in transit.

use stockroom_client::workflows::TransferLedger;
use stockroom_client::{ApiClient, Config, InvalidationBus, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=debug,stockroom_client=debug,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Stockroom");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API: {}", config.api.base_url);

    let store = SessionStore::new(config.session.path.clone());
    match store.load()? {
        Some(session) => tracing::info!(
            user = %session.user.name,
            role = %session.role.name,
            "Session restored"
        ),
        None => tracing::info!("No saved session"),
    }

    let api = ApiClient::new(&config.api)?;
    let mut ledger = TransferLedger::new(api, InvalidationBus::default());
    ledger.refresh().await?;

    let transfers = ledger.transfers();
    println!("{} transfer(s) in transit", transfers.len());
    for transfer in transfers {
        println!(
            "#{:<6} {}  {} -> {}  {} item(s), {} unit(s)",
            transfer.id,
            transfer.transferred_date.format("%Y-%m-%d %H:%M"),
            transfer.from_location_name,
            transfer.to_location_name,
            transfer.items.len(),
            transfer.total_quantity()
        );
    }

    Ok(())
}
