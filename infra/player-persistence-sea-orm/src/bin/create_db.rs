use player_persistence_sea_orm::{create_db_pool, create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let pool = create_db_pool().await;

    create_schema(&pool)
        .await
        .expect("Failed to create players table");

    println!("Created database tables successfully");
}
