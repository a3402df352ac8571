use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot reach Jellyfin server: {0}")]
    UpstreamTransport(#[source] reqwest::Error),

    #[error("Jellyfin returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("unexpected response from Jellyfin: {0}")]
    UpstreamDecode(#[source] reqwest::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("no movies available")]
    NoMovies,

    #[error("config file error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for every failure that originates from talking to Jellyfin.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTransport(_) | Self::UpstreamStatus(_) | Self::UpstreamDecode(_)
        )
    }
}
