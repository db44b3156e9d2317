// 牌表記の変換や牌の集計などの補助処理
pub mod common;
pub mod string;
