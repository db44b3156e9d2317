use serde::{de, ser};

use super::*;
use crate::util::string::{tile_number_from_char, tile_type_from_char, tile_type_to_char};

// 牌の強化(エンハンス)を表すタグ
// 中身の意味は外部の強化システムが管理しており, 点数計算側では区別のみ行う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Enhancement(pub u16);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(pub Type, pub Tnum, pub Option<Enhancement>); // (type index, number index, enhancement)

impl Tile {
    #[inline]
    pub const fn new(ti: Type, ni: Tnum) -> Self {
        Self(ti, ni, None)
    }

    pub fn with_enhancement(self, e: Enhancement) -> Self {
        Self(self.0, self.1, Some(e))
    }

    // "m5", "d2", "p3#7" (#以降は強化タグ)
    pub fn from_symbol(s: &str) -> Res<Self> {
        let (body, tag) = match s.split_once('#') {
            Some((b, t)) => (b, Some(t)),
            None => (s, None),
        };

        let chars: Vec<char> = body.chars().collect();
        if chars.len() != 2 {
            return Err(ScoreError::InvalidTile(s.to_string()));
        }
        let t = tile_type_from_char(chars[0])?;
        let n = tile_number_from_char(chars[1])?;
        if !Tile::new(t, n).is_valid() {
            return Err(ScoreError::InvalidTile(s.to_string()));
        }

        let e = match tag {
            Some(t) => Some(Enhancement(
                t.parse()
                    .map_err(|_| ScoreError::InvalidTile(s.to_string()))?,
            )),
            None => None,
        };

        Ok(Self(t, n, e))
    }

    // 種類と数字が存在する牌か
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 < TYPE && 1 <= self.1 && self.1 <= max_rank(self.0)
    }

    #[inline]
    pub fn is_same_tile(&self, other: &Tile) -> bool {
        self.0 == other.0 && self.1 == other.1
    }

    // 数牌
    #[inline]
    pub fn is_suit(&self) -> bool {
        self.0 < TW
    }

    // 字牌
    #[inline]
    pub fn is_hornor(&self) -> bool {
        self.0 >= TW
    }

    // 1,9牌
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.is_suit() && (self.1 == 1 || self.1 == 9)
    }

    // 么九牌
    #[inline]
    pub fn is_end(&self) -> bool {
        self.is_hornor() || self.1 == 1 || self.1 == 9
    }

    // 中張牌
    #[inline]
    pub fn is_simple(&self) -> bool {
        !self.is_end()
    }

    // 風牌
    #[inline]
    pub fn is_wind(&self) -> bool {
        self.0 == TW
    }

    // 三元牌
    #[inline]
    pub fn is_doragon(&self) -> bool {
        self.0 == TD
    }

    // 緑一色の構成牌
    #[inline]
    pub fn is_green(&self) -> bool {
        match self.0 {
            TS => matches!(self.1, 2 | 3 | 4 | 6 | 8),
            TD => self.1 == DG,
            _ => false,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", tile_type_to_char(self.0), self.1)?;
        if let Some(Enhancement(id)) = self.2 {
            write!(f, "#{}", id)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl ser::Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct TileVisitor;

impl<'de> de::Visitor<'de> for TileVisitor {
    type Value = Tile;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("tile symbol")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Tile::from_symbol(v).map_err(E::custom)
    }
}

impl<'de> de::Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(TileVisitor)
    }
}

// [TileTable]
// 牌の種類ごとの枚数 (強化タグは無視)
pub type TileRow = [usize; TNUM];
pub type TileTable = [TileRow; TYPE];

#[test]
fn test_tile_symbol() {
    let t = Tile::from_symbol("p3#7").unwrap();
    assert_eq!(t, Tile(TP, 3, Some(Enhancement(7))));
    assert_eq!(t.to_string(), "p3#7");
    assert!(t.is_same_tile(&Tile::new(TP, 3)));

    assert!(Tile::from_symbol("w5").is_err());
    assert!(Tile::from_symbol("d0").is_err());
    assert!(Tile::from_symbol("x1").is_err());
}

#[test]
fn test_tile_serde() {
    let tiles = vec![Tile::new(TM, 1), Tile::new(TD, 3).with_enhancement(Enhancement(2))];
    let s = serde_json::to_string(&tiles).unwrap();
    assert_eq!(s, r#"["m1","d3#2"]"#);
    let tiles2: Vec<Tile> = serde_json::from_str(&s).unwrap();
    assert_eq!(tiles, tiles2);
}

#[test]
fn test_tile_order() {
    let mut v = vec![Tile::new(TD, 1), Tile::new(TM, 9), Tile::new(TW, 2), Tile::new(TM, 1)];
    v.sort();
    assert_eq!(
        v,
        vec![Tile::new(TM, 1), Tile::new(TM, 9), Tile::new(TW, 2), Tile::new(TD, 1)]
    );
}
