pub mod base_info;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Pool settings for `database_url`. sqlx statement logging stays off; the
/// `tracing` spans on the query functions cover it.
pub fn pool_options(database_url: &str, max_connections: u32) -> ConnectOptions {
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    opts
}

/// Create a SeaORM database connection pool for `database_url`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    Database::connect(pool_options(database_url, max_connections)).await
}
