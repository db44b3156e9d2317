// 和了形の分解, 役の判定, 点数計算を行うモジュール
mod compose;
mod evaluate;
mod fan;
mod parse;
mod win;

pub use self::{
    compose::compose,
    evaluate::{score_hand, winning_tiles},
    fan::{classify, degenerate_fan},
    parse::{decompose, detect_degenerate},
    win::{
        calc_tiles_to_win, is_consecutive_pairs, is_nine_gates, is_seven_pairs,
        is_standard_win, is_thirteen_orphans, is_win,
    },
};
