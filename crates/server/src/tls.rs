//! HTTPS support: load the configured certificate, bootstrapping a
//! self-signed one on first start.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;
use configs::TlsConfig;
use tracing::info;

/// Load cert/key from disk, generating a self-signed pair if either is missing.
pub async fn load_or_create(cfg: &TlsConfig, public_host: &str) -> anyhow::Result<RustlsConfig> {
    if !exists(&cfg.cert_path).await || !exists(&cfg.key_path).await {
        let (cert_pem, key_pem) = self_signed(public_host)?;
        write_pem(&cfg.cert_path, &cert_pem).await?;
        write_pem(&cfg.key_path, &key_pem).await?;
        info!(cert = %cfg.cert_path.display(), key = %cfg.key_path.display(), "generated self-signed certificate");
    }
    Ok(RustlsConfig::from_pem_file(&cfg.cert_path, &cfg.key_path).await?)
}

/// Self-signed certificate for `localhost`, `127.0.0.1` and `public_host`.
/// Returns `(cert_pem, key_pem)`.
pub fn self_signed(public_host: &str) -> anyhow::Result<(String, String)> {
    let mut names = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    if !public_host.is_empty() && !names.iter().any(|n| n == public_host) {
        names.push(public_host.to_string());
    }
    let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names)?;
    Ok((cert.pem(), key_pair.serialize_pem()))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

async fn write_pem(path: &Path, pem: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, pem).await?;
    Ok(())
}
