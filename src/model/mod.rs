// 点数計算のデータモデル
mod decomposition;
mod define;
mod meld;
mod modifier;
mod score;
mod tile;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::error::{Res, ScoreError};

pub use decomposition::*;
pub use define::*;
pub use meld::*;
pub use modifier::*;
pub use score::*;
pub use tile::*;
