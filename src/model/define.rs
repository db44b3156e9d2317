// 型エイリアス
pub type Type = usize; // 牌の種別部分 (萬子,筒子,索子,風牌,三元牌)
pub type Tnum = usize; // 牌の数字部分 (数牌: 1~9, 風牌: 1~4, 三元牌: 1~3)
pub type Index = usize; // その他Index

// Number
pub const TYPE: usize = 5; // 牌の種別部分の数
pub const TNUM: usize = 10; // 牌の数字部分の数 (0は未使用)
pub const TILE: usize = 4; // 同種の牌の数
pub const HAND_SLOTS: usize = 14; // 和了形の枠数 (槓子も3枠として数える)
pub const MELD_SLOTS: usize = 3; // 面子1つ分の枠数
pub const MAX_MELDS: usize = 4; // 面子の最大数

// Type Index
pub const TM: usize = 0; // Type: Characters (萬子)
pub const TP: usize = 1; // Type: Dots       (筒子)
pub const TS: usize = 2; // Type: Bamboo     (索子)
pub const TW: usize = 3; // Type: Wind       (風牌)
pub const TD: usize = 4; // Type: Dragon     (三元牌)

// Tnum Index
pub const WE: usize = 1; // Wind:    East  (東)
pub const WS: usize = 2; // Wind:    South (南)
pub const WW: usize = 3; // Wind:    West  (西)
pub const WN: usize = 4; // Wind:    North (北)
pub const DW: usize = 1; // Doragon: White (白)
pub const DG: usize = 2; // Doragon: Green (發)
pub const DR: usize = 3; // Doragon: Red   (中)

// 牌種ごとの数字の最大値
#[inline]
pub const fn max_rank(ti: Type) -> Tnum {
    match ti {
        TW => WN,
        TD => DR,
        _ => 9,
    }
}

// 暗槓を宣言した時に記録される倍率 (それ以外の面子は1.0)
pub const CONCEALED_QUAD_WEIGHT: f64 = 2.0;
