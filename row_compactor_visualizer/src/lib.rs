use std::time::Duration;

#[cfg(feature = "web")]
pub mod error;
#[cfg(feature = "web")]
mod page;
#[cfg(feature = "web")]
pub mod preview;
#[cfg(feature = "web")]
mod routes;

#[cfg(feature = "web")]
pub use routes::app;

/// Initial slider value in the browser UI. The library default stays at 10.
pub const UI_DEFAULT_MAX_DIFFERENT_PIXELS: usize = 5;
/// Upper bound of the threshold control.
pub const UI_MAX_DIFFERENT_PIXELS: usize = 100;

const DEFAULT_BIND: &str = "127.0.0.1:3001";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub debounce: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            debounce: row_compactor::DEFAULT_DEBOUNCE,
        }
    }
}

impl ServerConfig {
    /// Reads `RC_BIND`, `RC_MAX_UPLOAD_BYTES` and `RC_DEBOUNCE_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(bind) = lookup("RC_BIND").filter(|bind| !bind.is_empty()) {
            cfg.bind_addr = bind;
        }
        match lookup("RC_MAX_UPLOAD_BYTES").map(|raw| raw.parse::<usize>()) {
            Some(Ok(bytes)) => cfg.max_upload_bytes = bytes,
            Some(Err(err)) => tracing::warn!(error = %err, "ignoring RC_MAX_UPLOAD_BYTES"),
            None => {}
        }
        match lookup("RC_DEBOUNCE_MS").map(|raw| raw.parse::<u64>()) {
            Some(Ok(ms)) => cfg.debounce = Duration::from_millis(ms),
            Some(Err(err)) => tracing::warn!(error = %err, "ignoring RC_DEBOUNCE_MS"),
            None => {}
        }
        cfg
    }
}

#[cfg(feature = "web")]
pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    use anyhow::Context;

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    let app = app(&cfg);
    tracing::info!(
        bind = %cfg.bind_addr,
        debounce_ms = cfg.debounce.as_millis() as u64,
        max_upload_bytes = cfg.max_upload_bytes,
        "visualizer server listening"
    );

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(error = %err, "server stopped");
        }
    });
    Ok(server)
}

#[cfg(not(feature = "web"))]
pub async fn start_server(_cfg: ServerConfig) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    Err(anyhow::anyhow!("web feature not enabled for row_compactor_visualizer"))
}
