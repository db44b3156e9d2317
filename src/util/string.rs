use crate::model::*;

pub fn tile_type_from_char(ch: char) -> Res<Type> {
    match ch {
        'm' => Ok(TM),
        'p' => Ok(TP),
        's' => Ok(TS),
        'w' => Ok(TW),
        'd' => Ok(TD),
        _ => Err(ScoreError::InvalidTile(format!("invalid tile type char: {ch}"))),
    }
}

pub fn tile_type_to_char(ti: Type) -> char {
    match ti {
        TM => 'm',
        TP => 'p',
        TS => 's',
        TW => 'w',
        TD => 'd',
        _ => '?',
    }
}

pub fn tile_number_from_char(ch: char) -> Res<Tnum> {
    if let Some(i) = ch.to_digit(10) {
        Ok(i as Tnum)
    } else {
        Err(ScoreError::InvalidTile(format!("invalid tile number char: {ch}")))
    }
}

// "m123p456w11d222" 形式の文字列を牌のリストに変換
// 牌の直後に"#id"を付けると強化タグ付きの牌になる (例: "m5#3")
pub fn tiles_from_string(exp: &str) -> Res<Vec<Tile>> {
    let mut tiles: Vec<Tile> = vec![];
    let mut ti = None;
    let mut chars = exp.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            'm' | 'p' | 's' | 'w' | 'd' => ti = Some(tile_type_from_char(ch)?),
            '1'..='9' => {
                let t = ti.ok_or_else(|| {
                    ScoreError::InvalidTile(format!("tile number before tile type: {exp}"))
                })?;
                let ni = tile_number_from_char(ch)?;
                if ni > max_rank(t) {
                    return Err(ScoreError::InvalidTile(format!(
                        "{}{}",
                        tile_type_to_char(t),
                        ni
                    )));
                }
                tiles.push(Tile::new(t, ni));
            }
            '#' => {
                let mut id = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    id.push(c);
                    chars.next();
                }
                let last = tiles.last_mut().ok_or_else(|| {
                    ScoreError::InvalidTile(format!("enhancement without tile: {exp}"))
                })?;
                let id = id
                    .parse()
                    .map_err(|_| ScoreError::InvalidTile(format!("invalid enhancement: {exp}")))?;
                *last = last.with_enhancement(Enhancement(id));
            }
            ' ' => {}
            _ => {
                return Err(ScoreError::InvalidTile(format!("invalid char: '{ch}'")));
            }
        }
    }
    Ok(tiles)
}

pub fn tiles_to_string(tiles: &[Tile]) -> String {
    let mut res = String::new();
    let mut last_ti = usize::MAX;
    for t in tiles {
        if t.0 != last_ti {
            last_ti = t.0;
            res.push(tile_type_to_char(t.0));
        }
        res.push_str(&t.1.to_string());
        if let Some(Enhancement(id)) = t.2 {
            res.push_str(&format!("#{id}"));
        }
    }
    res
}

// "m123", "p555+", "d1111" 形式の文字列を面子に変換
// '+'を含む場合は他家の捨て牌を使った(鳴いた)面子
pub fn meld_from_string(exp: &str) -> Res<Meld> {
    let concealed = !exp.contains('+');
    let tiles = tiles_from_string(&exp.replace('+', ""))?;
    if tiles.is_empty() {
        return Err(ScoreError::InvalidMeld {
            meld: exp.to_string(),
            reason: "empty meld".to_string(),
        });
    }

    let mut nis: Vec<Tnum> = tiles.iter().map(|t| t.1).collect();
    nis.sort_unstable();
    let diffs: Vec<usize> = nis.windows(2).map(|w| w[1] - w[0]).collect();

    let kind = if diffs.len() == 2 && diffs.iter().all(|&d| d == 1) {
        MeldKind::Run
    } else if diffs.len() == 2 && diffs.iter().all(|&d| d == 0) {
        MeldKind::Triplet
    } else if diffs.len() == 3 && diffs.iter().all(|&d| d == 0) {
        MeldKind::Quad
    } else {
        return Err(ScoreError::InvalidMeld {
            meld: exp.to_string(),
            reason: "not a run, triplet or quad".to_string(),
        });
    };

    Meld::new(kind, tiles, concealed)
}

// 空白区切りの面子のリスト
pub fn melds_from_string(exp: &str) -> Res<Vec<Meld>> {
    exp.split_whitespace().map(meld_from_string).collect()
}

#[test]
fn test_tiles_to_string() {
    let hand_str = "m123p456w11d222";
    let hand = tiles_from_string(hand_str).unwrap();
    assert_eq!(hand.len(), 11);
    assert_eq!(hand_str, tiles_to_string(&hand));

    let hand = tiles_from_string("m5#3m5").unwrap();
    assert_eq!(hand[0].2, Some(Enhancement(3)));
    assert_eq!(hand[1].2, None);
    assert_eq!(tiles_to_string(&hand), "m5#35");

    assert!(tiles_from_string("123").is_err());
    assert!(tiles_from_string("w5").is_err());
    assert!(tiles_from_string("d4").is_err());
    assert!(tiles_from_string("#1").is_err());
}

#[test]
fn test_meld_from_string() {
    let m = meld_from_string("p555+").unwrap();
    assert_eq!(m.kind, MeldKind::Triplet);
    assert!(!m.concealed);

    let m = meld_from_string("s978").unwrap();
    assert_eq!(m.kind, MeldKind::Run);
    assert_eq!(m.head(), Tile::new(TS, 7));

    let m = meld_from_string("d1111").unwrap();
    assert_eq!(m.kind, MeldKind::Quad);
    assert!(m.concealed);
    assert_eq!(m.mult_weight, CONCEALED_QUAD_WEIGHT);

    assert!(meld_from_string("w123").is_err());
    assert!(meld_from_string("m124").is_err());
    assert!(meld_from_string("m1p23").is_err());

    let ms = melds_from_string("p555+ m789").unwrap();
    assert_eq!(ms.len(), 2);
}
