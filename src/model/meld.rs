use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Run,     // 順子
    Triplet, // 刻子
    Quad,    // 槓子
}

impl MeldKind {
    #[inline]
    pub fn tile_count(self) -> usize {
        match self {
            MeldKind::Run | MeldKind::Triplet => 3,
            MeldKind::Quad => 4,
        }
    }

    // 刻子または槓子
    #[inline]
    pub fn is_set_of_same(self) -> bool {
        self != MeldKind::Run
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    pub concealed: bool,  // 他家の捨て牌を使わずに作った面子
    pub mult_weight: f64, // 面子宣言時に記録された倍率
}

impl Meld {
    // 宣言済みの面子を生成 (牌の組み合わせが正しくない場合はエラー)
    pub fn new(kind: MeldKind, tiles: Vec<Tile>, concealed: bool) -> Res<Self> {
        let mult_weight = if kind == MeldKind::Quad && concealed {
            CONCEALED_QUAD_WEIGHT
        } else {
            1.0
        };
        let m = Self::from_parts(kind, tiles, concealed).with_mult_weight(mult_weight);
        m.validate()?;
        Ok(m)
    }

    // 手牌から分解した面子用 (検証済みであることが前提)
    pub(crate) fn from_parts(kind: MeldKind, mut tiles: Vec<Tile>, concealed: bool) -> Self {
        tiles.sort();
        Self {
            kind,
            tiles,
            concealed,
            mult_weight: 1.0,
        }
    }

    pub fn with_mult_weight(mut self, mult_weight: f64) -> Self {
        self.mult_weight = mult_weight;
        self
    }

    pub fn validate(&self) -> Res<()> {
        let invalid = |reason: &str| {
            Err(ScoreError::InvalidMeld {
                meld: self.to_string(),
                reason: reason.to_string(),
            })
        };

        if self.tiles.len() != self.kind.tile_count() {
            return invalid("wrong tile count");
        }
        if let Some(t) = self.tiles.iter().find(|t| !t.is_valid()) {
            return Err(ScoreError::InvalidTile(format!("{:?} in {}", t, self)));
        }
        if !self.mult_weight.is_finite() || self.mult_weight < 0.0 {
            return invalid("mult weight must be a finite non-negative number");
        }

        let t0 = self.tiles[0];
        match self.kind {
            MeldKind::Triplet | MeldKind::Quad => {
                if !self.tiles.iter().all(|t| t.is_same_tile(&t0)) {
                    return invalid("tiles are not the same type");
                }
            }
            MeldKind::Run => {
                if self.tiles.iter().any(|t| t.is_hornor() || t.0 != t0.0) {
                    return invalid("run must be a single numbered suit");
                }
                let mut nis: Vec<Tnum> = self.tiles.iter().map(|t| t.1).collect();
                nis.sort_unstable();
                if nis[1] != nis[0] + 1 || nis[2] != nis[1] + 1 {
                    return invalid("ranks are not consecutive");
                }
            }
        }

        Ok(())
    }

    // 面子の先頭(最小)の牌 順子の場合は一番小さい数字
    #[inline]
    pub fn head(&self) -> Tile {
        self.tiles[0]
    }

    // 牌を昇順に並び替えた面子を返却 (外部から直接組み立てられた面子用)
    pub(crate) fn normalized(&self) -> Self {
        let mut m = self.clone();
        m.tiles.sort();
        m
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last_ti = usize::MAX;
        for t in &self.tiles {
            if t.0 != last_ti {
                last_ti = t.0;
                write!(f, "{}", crate::util::string::tile_type_to_char(t.0))?;
            }
            write!(f, "{}", t.1)?;
        }
        if !self.concealed {
            write!(f, "+")?;
        }
        Ok(())
    }
}

#[test]
fn test_meld_validate() {
    let run = Meld::new(
        MeldKind::Run,
        vec![Tile::new(TS, 4), Tile::new(TS, 2), Tile::new(TS, 3)],
        false,
    )
    .unwrap();
    assert_eq!(run.head(), Tile::new(TS, 2));
    assert_eq!(run.to_string(), "s234+");

    // 字牌の順子は不可
    assert!(Meld::new(
        MeldKind::Run,
        vec![Tile::new(TW, 1), Tile::new(TW, 2), Tile::new(TW, 3)],
        true,
    )
    .is_err());

    // 枚数違い
    assert!(Meld::new(MeldKind::Quad, vec![Tile::new(TD, 1); 3], true).is_err());

    // 存在しない牌
    for t in [Tile::new(TM, 10), Tile::new(TM, 0), Tile::new(TD, 4), Tile::new(7, 1)] {
        assert!(matches!(
            Meld::new(MeldKind::Triplet, vec![t; 3], true),
            Err(ScoreError::InvalidTile(_))
        ));
    }
    assert!(matches!(
        Meld::new(
            MeldKind::Run,
            vec![Tile::new(TP, 8), Tile::new(TP, 9), Tile::new(TP, 10)],
            false
        ),
        Err(ScoreError::InvalidTile(_))
    ));

    let quad = Meld::new(MeldKind::Quad, vec![Tile::new(TD, 1); 4], true).unwrap();
    assert_eq!(quad.mult_weight, CONCEALED_QUAD_WEIGHT);
    let quad = Meld::new(MeldKind::Quad, vec![Tile::new(TD, 1); 4], false).unwrap();
    assert_eq!(quad.mult_weight, 1.0);
}
