use feed_ranker::{
    ingest::{self, CatalogSource, JsonSnapshot},
    Config, Engine,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let top_n = config.default_top_n;
    let snapshot = JsonSnapshot::load(&config.snapshot_path).await?;

    let engine = Engine::new(config)?;
    let recorded = ingest::sync_interactions(&engine, &snapshot).await?;
    tracing::info!(recorded, "Engine ready");

    for user in snapshot.users().await? {
        match ingest::recommend_for(&engine, &snapshot, &user.id, top_n).await {
            Ok(recommendations) => {
                let line = json!({
                    "user_id": user.id,
                    "recommendations": recommendations,
                });
                println!("{}", serde_json::to_string(&line)?);
            }
            Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Skipping user"),
        }
    }

    Ok(())
}
