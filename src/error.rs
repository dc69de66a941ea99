use crate::models::UserId;

/// Ranking engine errors
///
/// Weak collaborative signal and empty catalogs are normal conditions and
/// never surface here; they produce content-scored or empty results instead.
#[derive(thiserror::Error, Debug)]
pub enum RankError {
    #[error("Unknown user: {0} has no recorded interactions")]
    UnknownUser(UserId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source error: {0}")]
    Source(String),
}

impl From<serde_json::Error> for RankError {
    fn from(err: serde_json::Error) -> Self {
        RankError::Source(format!("Malformed snapshot: {}", err))
    }
}

impl From<std::io::Error> for RankError {
    fn from(err: std::io::Error) -> Self {
        RankError::Source(err.to_string())
    }
}

pub type RankResult<T> = Result<T, RankError>;
