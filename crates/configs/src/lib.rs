use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Host written into upload links. Empty means "guess the LAN address".
    #[serde(default)]
    pub public_host: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            public_host: String::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { uploads_dir: default_uploads_dir(), data_file: default_data_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_tls_port")]
    pub port: u16,
    #[serde(default = "default_cert_path")]
    pub cert_path: PathBuf,
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_tls_port(),
            cert_path: default_cert_path(),
            key_path: default_key_path(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }
fn default_tls_port() -> u16 { 3443 }
fn default_max_upload_bytes() -> usize { 16 * 1024 * 1024 }
fn default_uploads_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_data_file() -> PathBuf { PathBuf::from("data/data.json") }
fn default_cert_path() -> PathBuf { PathBuf::from("certs/cert.pem") }
fn default_key_path() -> PathBuf { PathBuf::from("certs/key.pem") }

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); without a file, build from env vars.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_and_validate_from(&path)
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        // 仅当文件不存在时回退到环境变量；文件存在但解析失败则直接报错
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => parse(&content).map_err(|e| anyhow!("{path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::from_env(),
            Err(e) => return Err(anyhow!("cannot read {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SERVER_*`, `PUBLIC_HOST`, `UPLOADS_DIR`, `DATA_FILE` and `TLS_*` env vars.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(host) = var("SERVER_HOST") { cfg.server.host = host; }
        if let Some(port) = var("SERVER_PORT").and_then(|p| p.parse().ok()) { cfg.server.port = port; }
        if let Some(w) = var("TOKIO_WORKER_THREADS").and_then(|w| w.parse().ok()) { cfg.server.worker_threads = Some(w); }
        if let Some(host) = var("PUBLIC_HOST") { cfg.server.public_host = host; }
        if let Some(limit) = var("MAX_UPLOAD_BYTES").and_then(|l| l.parse().ok()) { cfg.server.max_upload_bytes = limit; }
        if let Some(dir) = var("UPLOADS_DIR") { cfg.storage.uploads_dir = dir.into(); }
        if let Some(file) = var("DATA_FILE") { cfg.storage.data_file = file.into(); }
        if let Some(enabled) = var("TLS_ENABLED") { cfg.tls.enabled = matches!(enabled.as_str(), "1" | "true" | "yes"); }
        if let Some(port) = var("TLS_PORT").and_then(|p| p.parse().ok()) { cfg.tls.port = port; }
        if let Some(path) = var("TLS_CERT_PATH") { cfg.tls.cert_path = path.into(); }
        if let Some(path) = var("TLS_KEY_PATH") { cfg.tls.key_path = path.into(); }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 存储路径不能为空
        self.storage.validate()?;
        if self.tls.enabled {
            if self.tls.port == 0 {
                return Err(anyhow!("tls.port must be in 1..=65535"));
            }
            if self.tls.port == self.server.port {
                return Err(anyhow!("tls.port must differ from server.port"));
            }
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        self.public_host = self.public_host.trim().to_string();
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if self.max_upload_bytes == 0 {
            self.max_upload_bytes = default_max_upload_bytes();
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.uploads_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.uploads_dir is empty"));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let mut cfg = parse("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.data_file, PathBuf::from("data/data.json"));
        assert!(!cfg.tls.enabled);
        Ok(())
    }

    #[test]
    fn partial_sections_are_filled() -> Result<()> {
        let mut cfg = parse(
            r#"
            [server]
            port = 8080
            public_host = " 192.168.1.10 "

            [tls]
            enabled = true
            port = 8443
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.public_host, "192.168.1.10");
        assert_eq!(cfg.tls.cert_path, PathBuf::from("certs/cert.pem"));
        Ok(())
    }

    #[test]
    fn rejects_port_clash_and_zero_port() {
        let mut clash = parse("[server]\nport = 3000\n[tls]\nenabled = true\nport = 3000\n").unwrap();
        assert!(clash.normalize_and_validate().is_err());

        let mut zero = parse("[server]\nport = 0\n").unwrap();
        assert!(zero.normalize_and_validate().is_err());
    }

    fn write_tmp(tag: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("configs_{tag}_{}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = write_tmp("malformed", "[server]\nport = \"not a number\"\n");
        let res = AppConfig::load_and_validate_from(path.to_str().unwrap());
        assert!(res.is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back_to_env_defaults() -> Result<()> {
        let missing = std::env::temp_dir().join(format!("configs_missing_{}.toml", std::process::id()));
        let cfg = AppConfig::load_and_validate_from(missing.to_str().unwrap())?;
        assert!(!cfg.storage.uploads_dir.as_os_str().is_empty());
        Ok(())
    }

    #[test]
    fn existing_file_is_loaded() -> Result<()> {
        let path = write_tmp("valid", "[server]\nport = 8088\n[storage]\ndata_file = \"state/registry.json\"\n");
        let cfg = AppConfig::load_and_validate_from(path.to_str().unwrap())?;
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.storage.data_file, PathBuf::from("state/registry.json"));
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn clash_is_ignored_when_tls_disabled() {
        let mut cfg = parse("[tls]\nport = 3000\n").unwrap();
        assert!(cfg.normalize_and_validate().is_ok());
    }
}
