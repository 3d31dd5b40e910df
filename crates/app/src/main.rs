use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "moneybag={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let config = settings.server;
    let db = parse_database(&config.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;
    let tokens = server::TokenKeys::new(
        config.jwt.secret.as_bytes(),
        chrono::Duration::hours(config.jwt.expiry_hours),
    );

    let bind = config.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
        err
    })?;

    server::run_with_listener(engine, tokens, listener).await?;
    Ok(())
}

async fn parse_database(
    database: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match database {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let connection = sea_orm::Database::connect(url).await?;
    Migrator::up(&connection, None).await?;
    tracing::info!("database ready, migrations applied");
    Ok(connection)
}
