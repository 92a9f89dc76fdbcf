use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::{AppConfig, MediaBackend, MediaConfig};
use service::identity::jwt::JwtVerifier;
use service::media::{cloudinary::CloudinaryStore, local::LocalMediaStore, MediaStore};
use service::wallpaper::fallback::StaticCatalog;
use service::wallpaper::repo::seaorm::SeaOrmWallpaperRepository;
use service::wallpaper::upload::UploadPolicy;
use service::{runtime, WallpaperService};

use crate::errors::StartupError;
use crate::metrics;
use crate::routes::{self, MediaMount, RouterOptions};
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Local media is mounted only when its public URL is a path on this server.
fn media_mount(cfg: &MediaConfig) -> Option<MediaMount> {
    if cfg.backend != MediaBackend::Local {
        return None;
    }
    let path = cfg.local.public_base_url.trim_end_matches('/');
    if !path.starts_with('/') || path.is_empty() {
        return None;
    }
    Some(MediaMount { path: path.to_string(), dir: cfg.local.dir.clone() })
}

async fn build_media(cfg: &MediaConfig) -> Result<Arc<dyn MediaStore>, StartupError> {
    match cfg.backend {
        MediaBackend::Cloudinary => {
            let store = CloudinaryStore::new(&cfg.cloudinary).map_err(|e| StartupError::Runtime(e.to_string()))?;
            info!(service = "server", event = "media_backend", backend = "cloudinary", cloud = %cfg.cloudinary.cloud_name);
            Ok(Arc::new(store))
        }
        MediaBackend::Local => {
            runtime::ensure_media_dir(&cfg.local.dir).await?;
            info!(service = "server", event = "media_backend", backend = "local", dir = %cfg.local.dir);
            Ok(Arc::new(LocalMediaStore::from_config(&cfg.local)))
        }
    }
}

/// Assemble the application from configuration: database, media backend,
/// identity verifier, and the wallpaper service.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    metrics::init();

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await.map_err(|e| StartupError::Runtime(format!("migrate: {e}")))?;
        info!(service = "server", event = "migrated");
    }

    let repo = Arc::new(SeaOrmWallpaperRepository::new(db));
    let media = build_media(&cfg.media).await?;
    let verifier = JwtVerifier::from_config(&cfg.auth).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let mut wallpapers = WallpaperService::new(repo, media).with_policy(UploadPolicy::new(cfg.upload.max_file_bytes));
    if cfg.catalog.fallback_on_error {
        wallpapers = wallpapers.with_fallback(Arc::new(StaticCatalog::new()));
    }
    if cfg.catalog.seed_on_start {
        if let Err(e) = wallpapers.seed_if_empty().await {
            warn!(service = "server", event = "seed_failed", error = %e, "continuing without sample catalog");
        }
    }

    let state = ServerState::new(wallpapers, Arc::new(verifier));
    let opts = RouterOptions { max_file_bytes: cfg.upload.max_file_bytes, media: media_mount(&cfg.media) };
    Ok(routes::build_router(state, build_cors(), opts))
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(service = "server", event = "listening", %addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
