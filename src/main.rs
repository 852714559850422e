use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eshop_orders::{
    config::AppConfig,
    db::open_store,
    menu::{self, Console},
    state::AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,eshop_orders=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    let store = open_store(&config).await?;
    let state = AppState::new(store);

    tracing::info!(
        collection = %config.collection_name,
        store = ?config.store,
        "order menu ready"
    );

    let mut console = Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    menu::run(&state, &mut console).await?;

    Ok(())
}
