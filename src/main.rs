mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

use crate::services::whatsapp::WhatsAppProvider;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Observabilité : subscriber installé une fois au démarrage,
    // niveau contrôlé par RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection(&config)
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let whatsapp = WhatsAppProvider::from_config(&config);

    let bind_addr = (config.server_host.clone(), config.server_port);
    println!("🚀 Starting server on http://{}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(whatsapp.clone()))
            .configure(routes::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
