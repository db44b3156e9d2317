use thiserror::Error;

// 呼び出し側の契約違反 (和了していないことはエラーではなくNotWinningで返却)
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("wrong tile count: {free} free tiles + {melds} fixed melds make {slots} slots")]
    TileCount {
        free: usize,
        melds: usize,
        slots: usize,
    },

    #[error("too many fixed melds: {0}")]
    TooManyMelds(usize),

    #[error("invalid meld '{meld}': {reason}")]
    InvalidMeld { meld: String, reason: String },

    #[error("invalid tile: {0}")]
    InvalidTile(String),

    #[error("malformed contribution from '{label}': {reason}")]
    MalformedContribution { label: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Res<T = ()> = Result<T, ScoreError>;
