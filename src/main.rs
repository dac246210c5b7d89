// src/main.rs
// HTTP entry point: serves the browser front-end from ./static and the simulation API.
// Bind address comes from PENDULUM_HOST / PENDULUM_PORT, log level from RUST_LOG.

use actix_files::Files;
use actix_web::{middleware::Logger, App, HttpServer};
use coupled_pendulums::ui;
use env_logger::{Builder, Env};
use log::info;
use std::io;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

fn bind_address() -> io::Result<(String, u16)> {
    let host = std::env::var("PENDULUM_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var("PENDULUM_PORT") {
        Ok(raw) => raw
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("PENDULUM_PORT: {e}")))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok((host, port))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let (host, port) = bind_address()?;
    info!("serving coupled pendulums on http://{host}:{port}");

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(ui::configure)
            .service(Files::new("/", "./static").index_file("index.html"))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
