#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the pacify map.
//!
//! Loads the aggregate payload once at startup and serves the window list,
//! per-window `GeoJSON` exactly as the renderer writes it into the map
//! sources, and the `MapLibre` style document for the frontend. The built
//! frontend and the raw `aggregates.json` are served from the static
//! directory.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use pacify_aggregate::source::DEFAULT_AGGREGATES_PATH;
use pacify_aggregate::{AggregateSource, AggregateStore, LoadError};
use pacify_map::{HeadlessSurface, MapOptions, StyleDocument};
use pacify_render::{LayerMode, RenderBinder, RenderError};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The aggregate payload could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The style document could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The HTTP server failed to bind or crashed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where to listen and what to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Location of the aggregate payload.
    pub aggregates: AggregateSource,
    /// Directory with the built frontend.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            aggregates: AggregateSource::parse(DEFAULT_AGGREGATES_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `PACIFY_AGGREGATES` and
    /// `PACIFY_STATIC_DIR`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            aggregates: std::env::var("PACIFY_AGGREGATES")
                .map_or(defaults.aggregates, |s| AggregateSource::parse(&s)),
            static_dir: std::env::var("PACIFY_STATIC_DIR")
                .map_or(defaults.static_dir, PathBuf::from),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// The loaded dataset.
    pub store: Arc<AggregateStore>,
    /// Style document with the first window's data in both sources.
    pub style: StyleDocument,
}

impl AppState {
    /// Renders the initial style document for `store`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the layers cannot be installed or the
    /// first window cannot be written.
    pub fn new(store: Arc<AggregateStore>) -> Result<Self, RenderError> {
        let surface = HeadlessSurface::loaded(MapOptions::default());
        let mut binder = RenderBinder::new(surface, Arc::clone(&store), LayerMode::default());
        binder.bind()?;
        binder.refresh(0)?;
        let style = binder.surface().style_document();

        Ok(Self { store, style })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/meta", web::get().to(handlers::meta))
            .route("/windows", web::get().to(handlers::windows))
            .route(
                "/windows/{index}/features",
                web::get().to(handlers::window_features),
            )
            .route("/style", web::get().to(handlers::style)),
    );
}

/// Starts the pacify map API server.
///
/// Loads the aggregate payload, renders the style document, and starts
/// the Actix-Web HTTP server. The caller is responsible for initialising
/// logging and providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the payload cannot be loaded, the style
/// cannot be rendered, or the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Loading aggregates from {}...", config.aggregates);
    let store = Arc::new(AggregateStore::load(&config.aggregates).await?);

    let state = web::Data::new(AppState::new(store)?);
    let static_dir = config.static_dir.clone();

    log::info!(
        "Starting server on {}:{} (static files from {})",
        config.bind_addr,
        config.port,
        static_dir.display()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve the frontend and aggregates.json
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
