use std::path::PathBuf;

use board::BoardError;
use thiserror::Error;

pub type SynthResult<T> = Result<T, SynthError>;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("{pool} pool is empty")]
    EmptyPool { pool: &'static str },

    #[error("failed to load {}: {reason}", path.display())]
    PoolLoad { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("render service error ({status}): {reason}")]
    RenderService { status: String, reason: String },

    #[error("background {width}x{height} is too small to host a board")]
    BackgroundTooSmall { width: u32, height: u32 },

    #[error("persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory {} is not empty", path.display())]
    OutputNotEmpty { path: PathBuf },

    #[error(transparent)]
    Board(#[from] BoardError),
}

impl SynthError {
    pub fn pool_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::PoolLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn render(status: impl ToString, reason: impl ToString) -> Self {
        Self::RenderService {
            status: status.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_part() {
        assert_eq!(
            SynthError::EmptyPool { pool: "background" }.to_string(),
            "background pool is empty"
        );
        assert_eq!(
            SynthError::render("500 Internal Server Error", "boom").to_string(),
            "render service error (500 Internal Server Error): boom"
        );
        let err = SynthError::persistence(
            "/nope/images",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/nope/images"));
    }
}
