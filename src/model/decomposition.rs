use super::*;

// 面子分解を経由しない特殊な和了形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateKind {
    SevenPairs,       // 七対子
    ThirteenOrphans,  // 国士無双
    NineGates,        // 九蓮宝燈
    ConsecutivePairs, // 同種の連続した七対子
}

// 和了形の分解結果
// 通常形は4面子1雀頭, 特殊形は14枚すべてを形そのものが消費する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Decomposition {
    Standard { melds: Vec<Meld>, pair: [Tile; 2] },
    Degenerate { kind: DegenerateKind, tiles: Vec<Tile> },
}

impl Decomposition {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Decomposition::Degenerate { .. })
    }

    // 特殊形の場合は空
    pub fn melds(&self) -> &[Meld] {
        match self {
            Decomposition::Standard { melds, .. } => melds,
            Decomposition::Degenerate { .. } => &[],
        }
    }

    pub fn pair(&self) -> Option<Tile> {
        match self {
            Decomposition::Standard { pair, .. } => Some(pair[0]),
            Decomposition::Degenerate { .. } => None,
        }
    }

    // 和了に関わるすべての牌 (面子順, 雀頭は最後)
    pub fn tiles(&self) -> Vec<Tile> {
        match self {
            Decomposition::Standard { melds, pair } => {
                let mut v: Vec<Tile> = melds.iter().flat_map(|m| m.tiles.iter().copied()).collect();
                v.extend_from_slice(pair);
                v
            }
            Decomposition::Degenerate { tiles, .. } => tiles.clone(),
        }
    }

    // 和了形の枠数 (槓子は3枠) 常に14となる
    pub fn slot_count(&self) -> usize {
        match self {
            Decomposition::Standard { melds, pair } => melds.len() * MELD_SLOTS + pair.len(),
            Decomposition::Degenerate { tiles, .. } => tiles.len(),
        }
    }

    pub fn meld_counts(&self) -> MeldCounts {
        let mut cnt = MeldCounts::default();
        for m in self.melds() {
            match m.kind {
                MeldKind::Run => cnt.run += 1,
                MeldKind::Triplet => cnt.triplet += 1,
                MeldKind::Quad => cnt.quad += 1,
            }
            if m.kind.is_set_of_same() && m.concealed {
                cnt.concealed_triplet += 1;
            }
            if !m.concealed {
                cnt.exposed += 1;
            }
        }
        cnt
    }
}

// 面子の種類ごとの数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MeldCounts {
    pub run: usize,
    pub triplet: usize,
    pub quad: usize,
    pub concealed_triplet: usize, // 暗刻 + 暗槓
    pub exposed: usize,           // 鳴いた面子
}

impl MeldCounts {
    // 刻子 + 槓子
    #[inline]
    pub fn triplet_total(&self) -> usize {
        self.triplet + self.quad
    }
}

// 役(Fan)の成立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanMatch {
    pub name: &'static str,
    pub points: usize,
}

pub type FanSet = Vec<FanMatch>;

// 和了形でない理由 (通常の結果でありエラーではない)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotWinning {
    PairMissing, // 面子が揃っているのに残りの2枚が対子でない
    NoPartition, // 面子と雀頭に分解できない
}

impl fmt::Display for NotWinning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotWinning::PairMissing => write!(f, "remaining tiles do not form a pair"),
            NotWinning::NoPartition => write!(f, "no legal meld partition exists"),
        }
    }
}
