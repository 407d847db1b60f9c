use async_lock::OnceCell;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

pub mod entity;
pub mod players;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Shared pool for the service. `DATABASE_URL` wins when set, otherwise the
/// MariaDB variables are required.
pub async fn create_db_pool() -> DatabaseConnection {
    DB_POOL
        .get_or_init(|| async move {
            let db_url = match std::env::var("DATABASE_URL") {
                Ok(url) => url,
                Err(_) => mariadb_url(),
            };
            connect(&db_url)
                .await
                .expect("Failed to connect to database")
        })
        .await
        .clone()
}

fn mariadb_url() -> String {
    let mariadb_database = std::env::var("MARIADB_DATABASE").expect("MARIADB_DATABASE must be set");
    let mariadb_user = std::env::var("MARIADB_USER").expect("MARIADB_USER must be set");
    let mariadb_password = std::env::var("MARIADB_PASSWORD").expect("MARIADB_PASSWORD must be set");
    let mariadb_host = std::env::var("MARIADB_HOST").expect("MARIADB_HOST must be set");
    let mariadb_port = std::env::var("MARIADB_PORT").expect("MARIADB_PORT must be set");
    format!(
        "mysql://{}:{}@{}:{}/{}",
        mariadb_user, mariadb_password, mariadb_host, mariadb_port, mariadb_database
    )
}

pub async fn connect(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url);
    // every connection to an in-memory sqlite database gets its own database
    if db_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(5);
    }
    opt.sqlx_logging(false);
    log::debug!("Connecting to {}", db_url.split('@').last().unwrap_or(db_url));
    Database::connect(opt).await
}

pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());
    let mut player_table = schema.create_table_from_entity(entity::player::Entity);
    player_table.if_not_exists();
    db.execute(&player_table).await?;
    Ok(())
}
