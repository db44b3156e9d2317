#![warn(rust_2018_idioms)]
// 構造的な意味合いや一貫性を保つために以下の警告は無効化
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

pub mod error;
pub mod hand;
pub mod model;
pub mod rules;
pub mod util;

pub use error::{Res, ScoreError};
pub use hand::{classify, compose, decompose, score_hand, winning_tiles};
pub use model::*;
pub use rules::{AchievementMults, FanTier, ScoringRules};
