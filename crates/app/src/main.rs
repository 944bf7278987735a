use migration::{Migrator, MigratorTrait};
use server::TokenSigner;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "swapstop={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.server.database_url()).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let secret = if settings.auth.secret.is_empty() {
        tracing::warn!("no auth.secret configured, issued tokens will not survive a restart");
        uuid::Uuid::new_v4().to_string()
    } else {
        settings.auth.secret
    };
    let tokens = TokenSigner::new(secret, settings.auth.token_ttl_minutes);

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(engine, tokens, listener).await?;

    Ok(())
}

async fn connect_database(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready at {url}");
    Ok(database)
}
