#[derive(Debug, thiserror::Error)]
pub enum SkypaperError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("satellite fetch failed: {0}")]
    Fetch(String),

    #[error("no satellite configuration available")]
    NoConfig,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("ipc error: {0}")]
    Ipc(String),
}

pub type Result<T> = std::result::Result<T, SkypaperError>;
