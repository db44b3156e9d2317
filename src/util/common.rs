use crate::model::*;

// [TileTable]

#[inline]
pub fn inc_tile(tt: &mut TileTable, t: Tile) {
    tt[t.0][t.1] += 1;
}

#[inline]
pub fn dec_tile(tt: &mut TileTable, t: Tile) {
    tt[t.0][t.1] -= 1;
}

pub fn tiles_to_tile_table(tiles: &[Tile]) -> TileTable {
    let mut tt = TileTable::default();
    for &t in tiles {
        inc_tile(&mut tt, t);
    }
    tt
}

// 牌の総数
pub fn count_tiles(tt: &TileTable) -> usize {
    tt.iter().map(|tr| tr[1..].iter().sum::<usize>()).sum()
}

// 存在し得るすべての牌の種類 (昇順)
pub fn all_tile_kinds() -> Vec<Tile> {
    let mut v = vec![];
    for ti in 0..TYPE {
        for ni in 1..=max_rank(ti) {
            v.push(Tile::new(ti, ni));
        }
    }
    v
}

// 么九牌13種 (昇順)
pub fn orphan_kinds() -> Vec<Tile> {
    all_tile_kinds().into_iter().filter(|t| t.is_end()).collect()
}

#[test]
fn test_tiletable() {
    use super::string::tiles_from_string;
    let hand = tiles_from_string("m119p34777w11d3").unwrap();
    let tt = tiles_to_tile_table(&hand);
    assert_eq!(count_tiles(&tt), 11);
    assert_eq!(tt[TM][1], 2);
    assert_eq!(tt[TP][7], 3);

    let mut tt2 = tt;
    dec_tile(&mut tt2, Tile::new(TD, 3));
    assert_eq!(count_tiles(&tt2), 10);
    inc_tile(&mut tt2, Tile::new(TD, 3));
    assert_eq!(tt, tt2);
}

#[test]
fn test_tile_kinds() {
    assert_eq!(all_tile_kinds().len(), 34);
    assert_eq!(orphan_kinds().len(), 13);
    assert!(all_tile_kinds().iter().all(|t| t.is_valid()));
    assert!(!Tile::new(TW, 5).is_valid());
}
