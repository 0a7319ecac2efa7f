#![deny(missing_docs)]
//! Hangar server executable.
//!
//! Hosts the HTTP API for creating, querying, updating, and deleting ships.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use dotenvy::dotenv;
use log::info;

use crate::config::{ServerConfig, StoreKind};
use crate::db::init_pool;
use crate::routes::{AppState, configure};
use crate::store::ShipBackend;

fn invalid_config(message: impl ToString) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message.to_string())
}

fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env().map_err(invalid_config)?;

    let backend = match config.store {
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| invalid_config("DATABASE_URL is not set"))?;
            ShipBackend::Postgres(init_pool(database_url).map_err(invalid_config)?)
        }
        StoreKind::Memory => {
            info!("using in-memory ship store; data is lost on restart");
            ShipBackend::memory()
        }
    };
    let state = web::Data::new(AppState { backend });

    let allowed_origins = config.ui_origins.clone();
    let listen_addr = config.host.clone();
    let listen_port = config.port;
    info!("listening on {listen_addr}:{listen_port}");

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((listen_addr, listen_port))?
        .run()
        .await
    })
}
