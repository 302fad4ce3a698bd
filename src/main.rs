use actix_cors::Cors;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web};
use coderr_backend::config::AppConfig;
use coderr_backend::create_pool;
use coderr_backend::handlers;
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url, config.database_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    tracing::info!("Connected to database");

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
        tracing::info!("Migrations applied");
    }

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
