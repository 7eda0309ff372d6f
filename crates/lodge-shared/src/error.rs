use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LodgeError {
    #[error("Unknown vote decision: {0}")]
    InvalidDecision(String),

    #[error("Unknown marker category: {0}")]
    InvalidCategory(String),

    #[error("Unknown rank: {0}")]
    InvalidRank(String),
}
