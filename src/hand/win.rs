use crate::model::*;
use crate::util::common::*;

// [完成形判定 (面子, 雀頭)]

// それぞれの牌種について"枚数を3で割った余り"と"余り数の集計"を返却
pub fn calc_mods_cnts(hand: &TileTable) -> ([usize; TYPE], [usize; 3]) {
    let mut mods = [0; TYPE];
    for ti in 0..TYPE {
        mods[ti] = hand[ti][1..].iter().sum::<usize>() % 3;
    }

    let mut cnts = [0; 3];
    for ti in 0..TYPE {
        cnts[mods[ti]] += 1;
    }

    (mods, cnts)
}

// 面子のみで構成されているかの判定
pub fn is_sets(tr: &TileRow, ti: Type) -> bool {
    let is_honor = ti >= TW;
    let (mut n0, mut n1, mut n2);
    n0 = tr[1];
    n1 = tr[2];
    for i in 1..8 {
        n2 = tr[i + 2];
        let n = n0 % 3; // 順子として消費する数
        if (is_honor && n != 0) || (n1 < n || n2 < n) {
            return false;
        }
        n0 = n1 - n;
        n1 = n2 - n;
    }
    n0 % 3 == 0 && n1 % 3 == 0
}

// 牌種が完成面子+雀頭のみで構成されている場合,雀頭のリストを返す.
// 基本的に1つだが,3113,3111113のような形の場合2つ
pub fn calc_pair_candidate(tr: &TileRow, ti: Type) -> Vec<Tile> {
    let mut tr = *tr;
    let mut res = vec![];
    for ni in 1..TNUM {
        if tr[ni] < 2 {
            continue;
        }
        tr[ni] -= 2;
        if is_sets(&tr, ti) {
            res.push(Tile::new(ti, ni));
        }
        tr[ni] += 2;
    }

    res
}

// 14 - (副露数) * 3 枚の手牌において和了形である場合,雀頭候補のリストを返却
pub fn calc_possible_pairs(hand: &TileTable) -> Vec<Tile> {
    let (mods, cnts) = calc_mods_cnts(hand);
    if cnts[1] != 0 || cnts[2] != 1 {
        return vec![];
    }

    let mut res = vec![];
    for ti in 0..TYPE {
        if mods[ti] == 2 {
            let pairs = calc_pair_candidate(&hand[ti], ti);
            if pairs.is_empty() {
                return vec![];
            }
            res = pairs;
        } else if !is_sets(&hand[ti], ti) {
            return vec![];
        }
    }

    res
}

// [和了形判定]

// 通常形
pub fn is_standard_win(hand: &TileTable) -> bool {
    !calc_possible_pairs(hand).is_empty()
}

// 七対子 (同じ牌4枚は2対子とみなさない)
pub fn is_seven_pairs(hand: &TileTable) -> bool {
    let mut n_pair = 0;
    for ti in 0..TYPE {
        for ni in 1..TNUM {
            match hand[ti][ni] {
                0 => {}
                2 => n_pair += 1,
                _ => return false,
            }
        }
    }
    n_pair == 7
}

// 国士無双
pub fn is_thirteen_orphans(hand: &TileTable) -> bool {
    let orphans = orphan_kinds();
    if orphans.iter().any(|t| hand[t.0][t.1] == 0) {
        return false;
    }

    // 么九牌以外を含まない
    let count: usize = orphans.iter().map(|t| hand[t.0][t.1]).sum();
    count == HAND_SLOTS && count_tiles(hand) == HAND_SLOTS
}

// 九蓮宝燈 (1112345678999 + 同種の牌1枚)
pub fn is_nine_gates(hand: &TileTable) -> bool {
    let ti = match single_suit(hand) {
        Some(ti) => ti,
        None => return false,
    };

    let tr = &hand[ti];
    if tr[1] < 3 || tr[9] < 3 {
        return false;
    }
    for ni in 2..9 {
        if tr[ni] == 0 {
            return false;
        }
    }

    count_tiles(hand) == HAND_SLOTS
}

// 同種の数牌で数字が連続した七対子 (例: 22334455667788)
pub fn is_consecutive_pairs(hand: &TileTable) -> bool {
    if !is_seven_pairs(hand) {
        return false;
    }
    let ti = match single_suit(hand) {
        Some(ti) => ti,
        None => return false,
    };

    let tr = &hand[ti];
    let start = match (1..TNUM).find(|&ni| tr[ni] != 0) {
        Some(ni) => ni,
        None => return false,
    };
    start + 6 < TNUM && (start..start + 7).all(|ni| tr[ni] == 2)
}

// 数牌1種類のみで構成されている場合その牌種を返却
fn single_suit(hand: &TileTable) -> Option<Type> {
    let used: Vec<Type> = (0..TYPE)
        .filter(|&ti| hand[ti][1..].iter().any(|&n| n > 0))
        .collect();
    match used.as_slice() {
        [ti] if *ti < TW => Some(*ti),
        _ => None,
    }
}

// 特殊形を含む和了形判定 (副露がある場合は通常形のみ)
pub fn is_win(hand: &TileTable, has_fixed_melds: bool) -> bool {
    if is_standard_win(hand) {
        return true;
    }
    !has_fixed_melds && (is_seven_pairs(hand) || is_thirteen_orphans(hand))
}

// [和了牌判定]
// 和了牌のリストを返却 (聴牌していない場合は空)
// 手牌と副露で4枚使い切っている牌は除外
pub fn calc_tiles_to_win(hand: &TileTable, fixed_melds: &[Meld]) -> Vec<Tile> {
    let mut used = *hand;
    for m in fixed_melds {
        for &t in &m.tiles {
            inc_tile(&mut used, t);
        }
    }

    let has_fixed = !fixed_melds.is_empty();
    let mut hand = *hand;
    let mut res = vec![];
    for t in all_tile_kinds() {
        if used[t.0][t.1] >= TILE {
            continue;
        }
        inc_tile(&mut hand, t);
        if is_win(&hand, has_fixed) {
            res.push(t);
        }
        dec_tile(&mut hand, t);
    }

    res
}

#[cfg(test)]
fn table(exp: &str) -> TileTable {
    tiles_to_tile_table(&crate::util::string::tiles_from_string(exp).unwrap())
}

#[test]
fn test_standard_win() {
    assert!(is_standard_win(&table("m123456789p234s55")));
    assert!(is_standard_win(&table("m111222333p99w111")));
    assert!(!is_standard_win(&table("m123456789p234s56")));
    // 字牌は順子にならない
    assert!(!is_standard_win(&table("m123456789p55w123")));
    // 副露3つ分の手牌
    assert!(is_standard_win(&table("d11")));
    assert!(is_standard_win(&table("m12344")));
}

#[test]
fn test_pair_candidates() {
    // 3113形は雀頭候補が2つ
    let pairs = calc_possible_pairs(&table("m11123444"));
    assert_eq!(pairs, vec![Tile::new(TM, 1), Tile::new(TM, 4)]);
}

#[test]
fn test_degenerate_shapes() {
    assert!(is_seven_pairs(&table("m1155p22s33w44d1133")));
    assert!(!is_seven_pairs(&table("m1111p22s33w44d1133")));

    assert!(is_thirteen_orphans(&table("m19p19s19w1234d1233")));
    assert!(!is_thirteen_orphans(&table("m129p19s19w1234d12")));
    assert!(!is_thirteen_orphans(&table("m129p19s19w1234d123")));

    assert!(is_nine_gates(&table("m11123456789995")));
    assert!(is_nine_gates(&table("m11112345678999")));
    assert!(!is_nine_gates(&table("m11123456789p999")));

    assert!(is_consecutive_pairs(&table("s22334455667788")));
    assert!(!is_consecutive_pairs(&table("s22334455667799")));
    assert!(!is_consecutive_pairs(&table("s22334455667m788")));
}

#[test]
fn test_tiles_to_win() {
    // 九蓮宝燈の九面待ち
    let wins = calc_tiles_to_win(&table("m1112345678999"), &[]);
    assert_eq!(wins.len(), 9);

    // 国士無双の十三面待ち
    let wins = calc_tiles_to_win(&table("m19p19s19w1234d123"), &[]);
    assert_eq!(wins.len(), 13);

    // 七対子の単騎待ち
    let wins = calc_tiles_to_win(&table("m1155p22s33w44d113"), &[]);
    assert_eq!(wins, vec![Tile::new(TD, 3)]);

    // 副露ありの場合は七対子にならない
    let melds = crate::util::string::melds_from_string("p555+").unwrap();
    let wins = calc_tiles_to_win(&table("m1155s33w44d11"), &melds);
    assert!(wins.is_empty());
}
