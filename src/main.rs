use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;

use teamflow::auth::{AuthMiddleware, AuthService};
use teamflow::config::Config;
use teamflow::routes;
use teamflow::store::{PgTokenStore, PgUserDirectory};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let auth_service = web::Data::new(AuthService::new(
        config.auth.clone(),
        Arc::new(PgUserDirectory::new(pool.clone())),
        Arc::new(PgTokenStore::new(pool.clone())),
    ));
    let auth_config = config.auth.clone();

    log::info!("Starting TeamFlow server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(auth_config.clone()))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
