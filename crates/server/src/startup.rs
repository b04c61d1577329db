use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{routes, state::{self, AppState}, tls};
use service::{
    file::{playlist_store::FilePlaylistStore, upload_dir::UploadDir},
    registry::playlist_store::PlaylistStore,
    upload::UploadService,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Host written into upload links: configured value, else the guessed LAN IP.
pub fn public_host(cfg: &AppConfig) -> String {
    if cfg.server.public_host.is_empty() {
        common::net::guess_local_ip().to_string()
    } else {
        cfg.server.public_host.clone()
    }
}

async fn resolve_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("cannot resolve {host}:{port}"))
}

/// Load the registry and build the plain-HTTP state.
pub async fn build_state(cfg: &AppConfig, public_host: &str) -> anyhow::Result<AppState> {
    common::env::ensure_env(&cfg.storage.uploads_dir, &cfg.storage.data_file).await?;
    // 播放列表注册表（文件持久化，默认 data/data.json）
    let store: Arc<dyn PlaylistStore> = FilePlaylistStore::new(&cfg.storage.data_file).await?;
    let uploads = Arc::new(UploadService::new(store, UploadDir::new(&cfg.storage.uploads_dir)));
    Ok(AppState::new(uploads, state::base_url("http", public_host, cfg.server.port)))
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    routes::build_router(state, &cfg.storage.uploads_dir, cfg.server.max_upload_bytes, build_cors())
}

/// Public entry: build the app and serve HTTP (and HTTPS when enabled).
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let public_host = public_host(&cfg);
    let http_state = build_state(&cfg, &public_host).await?;

    let addr = resolve_addr(&cfg.server.host, cfg.server.port).await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, base_url = %http_state.base_url, "http listener ready");

    // HTTPS 监听共享同一注册表，仅上传链接的协议与端口不同
    let https_state = http_state.with_base_url(state::base_url("https", &public_host, cfg.tls.port));
    let http_app = build_app(&cfg, http_state);
    let http = async move {
        axum::serve(listener, http_app).await?;
        Ok::<(), anyhow::Error>(())
    };

    if !cfg.tls.enabled {
        return http.await;
    }

    // 证书缺失时自动生成自签名证书
    let rustls = tls::load_or_create(&cfg.tls, &public_host).await?;
    let tls_addr = resolve_addr(&cfg.server.host, cfg.tls.port).await?;
    info!(addr = %tls_addr, base_url = %https_state.base_url, "https listener ready");
    let https_app = build_app(&cfg, https_state);
    let https = async move {
        axum_server::bind_rustls(tls_addr, rustls)
            .serve(https_app.into_make_service())
            .await?;
        Ok::<(), anyhow::Error>(())
    };

    tokio::try_join!(http, https)?;
    Ok(())
}
