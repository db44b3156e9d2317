use tracing::{debug, trace};

use super::win::*;
use crate::model::*;
use crate::util::common::tiles_to_tile_table;

// 手牌の枚数と副露の整合性チェック (槓子は3枠として数える)
pub fn check_slots(free: &[Tile], fixed: &[Meld], expected: usize) -> Res {
    if fixed.len() > MAX_MELDS {
        return Err(ScoreError::TooManyMelds(fixed.len()));
    }
    let slots = free.len() + fixed.len() * MELD_SLOTS;
    if slots != expected {
        return Err(ScoreError::TileCount {
            free: free.len(),
            melds: fixed.len(),
            slots,
        });
    }
    if let Some(t) = free.iter().find(|t| !t.is_valid()) {
        return Err(ScoreError::InvalidTile(format!("{:?}", t)));
    }
    for m in fixed {
        m.validate()?;
    }
    Ok(())
}

// 特殊形の判定 (副露がない場合のみ)
// 判定順: 国士無双, 九蓮宝燈, 連続七対子, 七対子 (最初に一致したものを採用)
pub fn detect_degenerate(hand: &TileTable) -> Option<DegenerateKind> {
    if is_thirteen_orphans(hand) {
        Some(DegenerateKind::ThirteenOrphans)
    } else if is_nine_gates(hand) {
        Some(DegenerateKind::NineGates)
    } else if is_consecutive_pairs(hand) {
        Some(DegenerateKind::ConsecutivePairs)
    } else if is_seven_pairs(hand) {
        Some(DegenerateKind::SevenPairs)
    } else {
        None
    }
}

// 和了形の分解をすべて列挙
// 外側のResultは呼び出し側の契約違反, 内側は和了形でない場合の理由
// 特殊形に一致した場合はその1通りのみを返却し, 通常形の探索は行わない
pub fn decompose(
    free: &[Tile],
    fixed: &[Meld],
) -> Res<Result<Vec<Decomposition>, NotWinning>> {
    check_slots(free, fixed, HAND_SLOTS)?;

    let mut free = free.to_vec();
    free.sort();
    let hand = tiles_to_tile_table(&free);

    if fixed.is_empty() {
        if let Some(kind) = detect_degenerate(&hand) {
            debug!("degenerate form: {:?}", kind);
            return Ok(Ok(vec![Decomposition::Degenerate { kind, tiles: free }]));
        }
    }

    if fixed.len() == MAX_MELDS && !free[0].is_same_tile(&free[1]) {
        debug!("not winning: {}", NotWinning::PairMissing);
        return Ok(Err(NotWinning::PairMissing));
    }

    let pairs = calc_possible_pairs(&hand);
    if pairs.is_empty() {
        debug!("not winning: {}", NotWinning::NoPartition);
        return Ok(Err(NotWinning::NoPartition));
    }

    let fixed: Vec<Meld> = fixed.iter().map(Meld::normalized).collect();
    let needed = MAX_MELDS - fixed.len();
    let mut pool = TilePool::new(&free);
    let mut res = vec![];
    for p in pairs {
        let taken = pool.take(p, 2);
        let pair = [taken[0], taken[1]];
        let mut melds = vec![];
        dfs_melds(&mut pool, &mut melds, pair, needed, &fixed, None, &mut res);
        pool.restore(&taken);
    }

    if res.is_empty() {
        debug!("not winning: {}", NotWinning::NoPartition);
        return Ok(Err(NotWinning::NoPartition));
    }

    debug!("{} standard decomposition(s)", res.len());
    Ok(Ok(res))
}

// 残りの牌のうち最小の牌から刻子, 順子の順に面子を作る
// no_triplet: 直前に順子を取った牌. 同じ面子の組を2度数えないよう, その牌の刻子は取らない
fn dfs_melds(
    pool: &mut TilePool,
    melds: &mut Vec<Meld>,
    pair: [Tile; 2],
    needed: usize,
    fixed: &[Meld],
    no_triplet: Option<Tile>,
    res: &mut Vec<Decomposition>,
) {
    if melds.len() == needed {
        if pool.is_empty() {
            let mut all = melds.clone();
            all.extend_from_slice(fixed);
            trace!("candidate: {:?} + {:?}", all, pair);
            res.push(Decomposition::Standard { melds: all, pair });
        }
        return;
    }

    let t = match pool.min_kind() {
        Some(t) => t,
        None => return,
    };

    // 刻子
    if pool.count(t) >= 3 && no_triplet != Some(t) {
        let taken = pool.take(t, 3);
        melds.push(Meld::from_parts(MeldKind::Triplet, taken.clone(), true));
        dfs_melds(pool, melds, pair, needed, fixed, None, res);
        melds.pop();
        pool.restore(&taken);
    }

    // 順子 (開始牌=t のみ. tが最小なのでこれで全探索になる)
    if t.is_suit() && t.1 <= 7 {
        let (t1, t2) = (Tile::new(t.0, t.1 + 1), Tile::new(t.0, t.1 + 2));
        if pool.count(t1) > 0 && pool.count(t2) > 0 {
            let mut taken = pool.take(t, 1);
            taken.extend(pool.take(t1, 1));
            taken.extend(pool.take(t2, 1));
            melds.push(Meld::from_parts(MeldKind::Run, taken.clone(), true));
            dfs_melds(pool, melds, pair, needed, fixed, Some(t), res);
            melds.pop();
            pool.restore(&taken);
        }
    }
}

// 強化タグ付きの牌を種類ごとに保持する
struct TilePool {
    buckets: [[Vec<Tile>; TNUM]; TYPE],
    len: usize,
}

impl TilePool {
    fn new(tiles: &[Tile]) -> Self {
        let mut buckets: [[Vec<Tile>; TNUM]; TYPE] = Default::default();
        // 昇順の牌を逆順に積んで, 小さい方から取り出せるようにする
        for &t in tiles.iter().rev() {
            buckets[t.0][t.1].push(t);
        }
        Self {
            buckets,
            len: tiles.len(),
        }
    }

    fn count(&self, t: Tile) -> usize {
        self.buckets[t.0][t.1].len()
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn min_kind(&self) -> Option<Tile> {
        for ti in 0..TYPE {
            for ni in 1..TNUM {
                if !self.buckets[ti][ni].is_empty() {
                    return Some(Tile::new(ti, ni));
                }
            }
        }
        None
    }

    // 事前にcountで枚数を確認しておくこと
    fn take(&mut self, t: Tile, n: usize) -> Vec<Tile> {
        let bucket = &mut self.buckets[t.0][t.1];
        let mut res = Vec::with_capacity(n);
        for _ in 0..n {
            if let Some(x) = bucket.pop() {
                res.push(x);
            }
        }
        self.len -= res.len();
        res
    }

    // takeで取り出した牌を元の順序で戻す
    fn restore(&mut self, tiles: &[Tile]) {
        for &t in tiles.iter().rev() {
            self.buckets[t.0][t.1].push(t);
        }
        self.len += tiles.len();
    }
}

#[cfg(test)]
fn parse(exp: &str, melds: &str) -> Res<Result<Vec<Decomposition>, NotWinning>> {
    use crate::util::string::{melds_from_string, tiles_from_string};
    decompose(
        &tiles_from_string(exp).unwrap(),
        &melds_from_string(melds).unwrap(),
    )
}

#[test]
fn test_decompose_standard() {
    let ds = parse("m123456789p234s55", "").unwrap().unwrap();
    assert_eq!(ds.len(), 1);
    let d = &ds[0];
    assert_eq!(d.melds().len(), 4);
    assert!(d.melds().iter().all(|m| m.kind == MeldKind::Run && m.concealed));
    assert_eq!(d.pair(), Some(Tile::new(TS, 5)));
    assert_eq!(d.slot_count(), HAND_SLOTS);
}

#[test]
fn test_decompose_multiple() {
    // 三連刻: 刻子3つ or 順子3つ
    let ds = parse("m111222333p456s99", "").unwrap().unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds[0].meld_counts().triplet, 3);
    assert_eq!(ds[1].meld_counts().run, 4);

    // 4枚使いの牌: 刻子+順子の組み合わせは1通り
    let ds = parse("m111123p456s789w11", "").unwrap().unwrap();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds[0].meld_counts().triplet, 1);

    // 3113形: 雀頭候補が2つ
    let ds = parse("m11123444p456s789", "").unwrap().unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds[0].pair(), Some(Tile::new(TM, 1)));
    assert_eq!(ds[1].pair(), Some(Tile::new(TM, 4)));
}

#[test]
fn test_decompose_with_fixed_melds() {
    let ds = parse("m234p99", "s789+ d1111 w222+").unwrap().unwrap();
    assert_eq!(ds.len(), 1);
    let melds = ds[0].melds();
    assert_eq!(melds.len(), 4);
    // 分解した面子の後ろに副露が並ぶ
    assert_eq!(melds[0].kind, MeldKind::Run);
    assert_eq!(melds[2].kind, MeldKind::Quad);
    assert_eq!(ds[0].tiles().len(), 15);
    assert_eq!(ds[0].slot_count(), HAND_SLOTS);

    let r = parse("m1155p22s33w445", "d111").unwrap();
    assert_eq!(r, Err(NotWinning::NoPartition));

    // 副露4つで残りが対子でない
    let r = parse("m12", "m345 p345 s345 d111").unwrap();
    assert_eq!(r, Err(NotWinning::PairMissing));
}

#[test]
fn test_decompose_degenerate() {
    let ds = parse("m1155p22s33w44d1133", "").unwrap().unwrap();
    assert_eq!(ds.len(), 1);
    assert!(matches!(
        ds[0],
        Decomposition::Degenerate {
            kind: DegenerateKind::SevenPairs,
            ..
        }
    ));

    // 通常形としても分解できるが特殊形を優先
    let ds = parse("m11123456789995", "").unwrap().unwrap();
    assert_eq!(ds.len(), 1);
    assert!(matches!(
        ds[0],
        Decomposition::Degenerate {
            kind: DegenerateKind::NineGates,
            ..
        }
    ));

    let ds = parse("s22334455667788", "").unwrap().unwrap();
    assert!(matches!(
        ds[0],
        Decomposition::Degenerate {
            kind: DegenerateKind::ConsecutivePairs,
            ..
        }
    ));

    let ds = parse("m19p19s19w1234d1233", "").unwrap().unwrap();
    assert!(matches!(
        ds[0],
        Decomposition::Degenerate {
            kind: DegenerateKind::ThirteenOrphans,
            ..
        }
    ));
}

#[test]
fn test_decompose_contract() {
    // 13枚
    assert!(matches!(
        parse("m123456789p234s5", ""),
        Err(ScoreError::TileCount { slots: 13, .. })
    ));
    assert!(matches!(
        parse("", "m123 m123 m123 m123 m123"),
        Err(ScoreError::TooManyMelds(5))
    ));
    // 和了形でないのはエラーではない
    assert_eq!(
        parse("m123456789p234s56", "").unwrap(),
        Err(NotWinning::NoPartition)
    );
}

#[test]
fn test_decompose_keeps_enhancements() {
    use crate::util::string::tiles_from_string;
    let free = tiles_from_string("m123456789p2#34s55#7").unwrap();
    let ds = decompose(&free, &[]).unwrap().unwrap();
    let mut tiles = ds[0].tiles();
    tiles.sort();
    let mut expected = free.clone();
    expected.sort();
    assert_eq!(tiles, expected);
}

#[test]
fn test_decompose_invalid_tiles() {
    let mut free = crate::util::string::tiles_from_string("m123456789p234s5").unwrap();
    for t in [Tile(7, 1, None), Tile(TM, 10, None), Tile(TW, 5, None), Tile(TD, 0, None)] {
        let mut hand = free.clone();
        hand.push(t);
        assert!(matches!(decompose(&hand, &[]), Err(ScoreError::InvalidTile(_))));
    }

    // 副露の牌の範囲外
    free.truncate(5);
    let bad = Meld::from_parts(MeldKind::Triplet, vec![Tile(TM, 10, None); 3], true);
    let ok = crate::util::string::melds_from_string("p123 p456").unwrap();
    let fixed = vec![bad, ok[0].clone(), ok[1].clone()];
    assert!(matches!(decompose(&free, &fixed), Err(ScoreError::InvalidTile(_))));
}
