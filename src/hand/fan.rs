use std::fmt;

use tracing::trace;

use crate::model::*;

#[derive(Debug)]
pub struct FanContext<'a> {
    melds: &'a [Meld],  // 副露を含むすべての面子
    pair: Tile,         // 雀頭の牌
    tiles: &'a [Tile],  // 和了に関わるすべての牌
    counts: MeldCounts, // 面子の種類ごとのカウント
    is_concealed: bool, // 鳴きの有無
    tis: [usize; TYPE], // 牌種ごとの枚数
    double_runs: usize, // 同じ順子の組の数 (一盃口, 二盃口用)
    honor_sets: TileTable, // 字牌の刻子, 槓子のカウント (雀頭は含まない)
}

impl<'a> FanContext<'a> {
    pub fn new(melds: &'a [Meld], pair: Tile, tiles: &'a [Tile]) -> Self {
        let mut counts = MeldCounts::default();
        let mut runs = TileTable::default();
        let mut honor_sets = TileTable::default();
        for m in melds {
            let h = m.head();
            match m.kind {
                MeldKind::Run => {
                    counts.run += 1;
                    runs[h.0][h.1] += 1;
                }
                MeldKind::Triplet => counts.triplet += 1,
                MeldKind::Quad => counts.quad += 1,
            }
            if m.kind.is_set_of_same() {
                if m.concealed {
                    counts.concealed_triplet += 1;
                }
                if h.is_hornor() {
                    honor_sets[h.0][h.1] += 1;
                }
            }
            if !m.concealed {
                counts.exposed += 1;
            }
        }

        let mut tis = [0; TYPE];
        for t in tiles {
            tis[t.0] += 1;
        }

        let double_runs = runs.iter().flat_map(|tr| tr.iter()).map(|n| n / 2).sum::<usize>();

        Self {
            melds,
            pair,
            tiles,
            counts,
            is_concealed: counts.exposed == 0,
            tis,
            double_runs,
            honor_sets,
        }
    }

    // 成立したすべての役を一覧の順に返却
    pub fn calc_fans(&self) -> FanSet {
        let mut res = vec![];
        for f in FAN_LIST {
            if (f.func)(self) {
                res.push(FanMatch {
                    name: f.name,
                    points: f.points,
                });
            }
        }
        res
    }

    // 使用している数牌の種類数
    fn suit_kinds(&self) -> usize {
        self.tis[..TW].iter().filter(|&&n| n > 0).count()
    }

    fn has_honor(&self) -> bool {
        self.tis[TW] + self.tis[TD] > 0
    }

    fn sets_of(&self, ti: Type) -> usize {
        self.honor_sets[ti].iter().sum()
    }
}

// 役の成立判定 (副露の場合も点数は同じ)
pub struct Fan {
    pub name: &'static str,
    pub func: fn(&FanContext) -> bool,
    pub points: usize,
}

impl fmt::Debug for Fan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.points)
    }
}

macro_rules! fan {
    ($n: expr, $f: expr, $p: expr) => {
        Fan {
            name: $n,
            func: $f,
            points: $p,
        }
    };
}

static FAN_LIST: &'static [Fan] = &[
    fan!("Winning Hand", is_winning_hand, 1),
    fan!("Fully Concealed", is_fully_concealed, 1),
    fan!("All Runs", is_all_runs, 1),
    fan!("All Simples", is_all_simples, 1),
    fan!("White Dragon", is_white_dragon, 1),
    fan!("Green Dragon", is_green_dragon, 1),
    fan!("Red Dragon", is_red_dragon, 1),
    fan!("Wind Triplet", is_wind_triplet, 1),
    fan!("Pure Double Run", is_pure_double_run, 1),
    fan!("Twice Pure Double Run", is_twice_pure_double_run, 3),
    fan!("Pure Straight", is_pure_straight, 2),
    fan!("Mixed Triple Run", is_mixed_triple_run, 2),
    fan!("Triple Triplets", is_triple_triplets, 2),
    fan!("Outside Hand", is_outside_hand, 2),
    fan!("Terminals in All Sets", is_terminals_in_all_sets, 3),
    fan!("All Terminals and Honors", is_all_terminals_and_honors, 2),
    fan!("All Triplets", is_all_triplets, 2),
    fan!("Three Concealed Triplets", is_three_concealed_triplets, 2),
    fan!("Three Quads", is_three_quads, 2),
    fan!("Half Flush", is_half_flush, 3),
    fan!("Full Flush", is_full_flush, 6),
    fan!("Little Three Dragons", is_little_three_dragons, 2),
    fan!("Big Three Dragons", is_big_three_dragons, 13),
    fan!("Little Four Winds", is_little_four_winds, 13),
    fan!("Big Four Winds", is_big_four_winds, 13),
    fan!("All Green", is_all_green, 13),
    fan!("All Honors", is_all_honors, 13),
    fan!("All Terminals", is_all_terminals, 13),
    fan!("Four Concealed Triplets", is_four_concealed_triplets, 13),
    fan!("Four Quads", is_four_quads, 13),
];

// 特殊形の役 (他の役とは複合しない)
pub fn degenerate_fan(kind: DegenerateKind) -> FanMatch {
    let (name, points) = match kind {
        DegenerateKind::SevenPairs => ("Seven Pairs", 2),
        DegenerateKind::ThirteenOrphans => ("Thirteen Orphans", 13),
        DegenerateKind::NineGates => ("Nine Gates", 13),
        DegenerateKind::ConsecutivePairs => ("Seven Consecutive Pairs", 13),
    };
    FanMatch { name, points }
}

// 和了形の役を判定
// 役の包含関係による削除は行わない (成立したものはすべて加算)
pub fn classify(decomposition: &Decomposition, all_tiles: &[Tile]) -> FanSet {
    let fans = match decomposition {
        Decomposition::Degenerate { kind, .. } => vec![degenerate_fan(*kind)],
        Decomposition::Standard { melds, pair } => {
            FanContext::new(melds, pair[0], all_tiles).calc_fans()
        }
    };
    trace!("fans: {:?}", fans);
    fans
}

// [役の判定]

// 和了 (通常形の場合は常に成立)
fn is_winning_hand(_ctx: &FanContext) -> bool {
    true
}

// 門前
fn is_fully_concealed(ctx: &FanContext) -> bool {
    ctx.is_concealed
}

fn is_all_runs(ctx: &FanContext) -> bool {
    ctx.counts.run == 4
}

// 断么九
fn is_all_simples(ctx: &FanContext) -> bool {
    ctx.tiles.iter().all(|t| t.is_simple())
}

// 白
fn is_white_dragon(ctx: &FanContext) -> bool {
    ctx.honor_sets[TD][DW] != 0
}

// 發
fn is_green_dragon(ctx: &FanContext) -> bool {
    ctx.honor_sets[TD][DG] != 0
}

// 中
fn is_red_dragon(ctx: &FanContext) -> bool {
    ctx.honor_sets[TD][DR] != 0
}

fn is_wind_triplet(ctx: &FanContext) -> bool {
    ctx.sets_of(TW) != 0
}

// 一盃口
fn is_pure_double_run(ctx: &FanContext) -> bool {
    ctx.is_concealed && ctx.double_runs == 1
}

// 二盃口
fn is_twice_pure_double_run(ctx: &FanContext) -> bool {
    ctx.is_concealed && ctx.double_runs == 2
}

// 一気通貫
fn is_pure_straight(ctx: &FanContext) -> bool {
    if ctx.counts.run < 3 {
        return false;
    }

    let mut f147 = [[false; 3]; 3];
    for m in ctx.melds {
        let h = m.head();
        if m.kind == MeldKind::Run && matches!(h.1, 1 | 4 | 7) {
            f147[h.0][h.1 / 3] = true;
        }
    }

    f147.iter().any(|f| f[0] && f[1] && f[2])
}

// 三色同順
fn is_mixed_triple_run(ctx: &FanContext) -> bool {
    if ctx.counts.run < 3 {
        return false;
    }
    same_rank_in_all_suits(ctx, |k| k == MeldKind::Run)
}

// 三色同刻
fn is_triple_triplets(ctx: &FanContext) -> bool {
    if ctx.counts.triplet_total() < 3 {
        return false;
    }
    same_rank_in_all_suits(ctx, MeldKind::is_set_of_same)
}

fn same_rank_in_all_suits(ctx: &FanContext, pred: fn(MeldKind) -> bool) -> bool {
    let mut mps = [[false; 3]; TNUM];
    for m in ctx.melds {
        let h = m.head();
        if pred(m.kind) && h.is_suit() {
            mps[h.1][h.0] = true;
        }
    }
    mps.iter().any(|f| f[0] && f[1] && f[2])
}

// すべての面子と雀頭に么九牌を含む
fn is_all_sets_outside(ctx: &FanContext) -> bool {
    if !ctx.pair.is_end() {
        return false;
    }
    ctx.melds.iter().all(|m| match m.kind {
        MeldKind::Run => m.head().1 == 1 || m.head().1 == 7,
        _ => m.head().is_end(),
    })
}

// チャンタ
fn is_outside_hand(ctx: &FanContext) -> bool {
    ctx.counts.run != 0 && ctx.has_honor() && is_all_sets_outside(ctx)
}

// 純チャン
fn is_terminals_in_all_sets(ctx: &FanContext) -> bool {
    ctx.counts.run != 0 && !ctx.has_honor() && is_all_sets_outside(ctx)
}

// 混老頭
fn is_all_terminals_and_honors(ctx: &FanContext) -> bool {
    ctx.counts.run == 0
        && ctx.tiles.iter().all(|t| t.is_end())
        && ctx.has_honor()
        && ctx.tiles.iter().any(|t| t.is_terminal())
}

// 対々和
fn is_all_triplets(ctx: &FanContext) -> bool {
    ctx.counts.triplet_total() == 4
}

// 三暗刻
fn is_three_concealed_triplets(ctx: &FanContext) -> bool {
    ctx.counts.concealed_triplet == 3
}

// 三槓子
fn is_three_quads(ctx: &FanContext) -> bool {
    ctx.counts.quad == 3
}

// 混一色
fn is_half_flush(ctx: &FanContext) -> bool {
    ctx.suit_kinds() == 1 && ctx.has_honor()
}

// 清一色
fn is_full_flush(ctx: &FanContext) -> bool {
    ctx.suit_kinds() == 1 && !ctx.has_honor()
}

// 小三元
fn is_little_three_dragons(ctx: &FanContext) -> bool {
    ctx.sets_of(TD) == 2 && ctx.pair.is_doragon()
}

// 大三元
fn is_big_three_dragons(ctx: &FanContext) -> bool {
    ctx.sets_of(TD) == 3
}

// 小四喜
fn is_little_four_winds(ctx: &FanContext) -> bool {
    ctx.sets_of(TW) == 3 && ctx.pair.is_wind()
}

// 大四喜
fn is_big_four_winds(ctx: &FanContext) -> bool {
    ctx.sets_of(TW) == 4
}

// 緑一色
fn is_all_green(ctx: &FanContext) -> bool {
    ctx.tiles.iter().all(|t| t.is_green())
}

// 字一色
fn is_all_honors(ctx: &FanContext) -> bool {
    ctx.tiles.iter().all(|t| t.is_hornor())
}

// 清老頭
fn is_all_terminals(ctx: &FanContext) -> bool {
    ctx.tiles.iter().all(|t| t.is_terminal())
}

// 四暗刻
fn is_four_concealed_triplets(ctx: &FanContext) -> bool {
    ctx.counts.concealed_triplet == 4
}

// 四槓子
fn is_four_quads(ctx: &FanContext) -> bool {
    ctx.counts.quad == 4
}

#[cfg(test)]
fn fan_names(exp: &str, melds: &str) -> Vec<&'static str> {
    use super::parse::decompose;
    use crate::util::string::{melds_from_string, tiles_from_string};
    let free = tiles_from_string(exp).unwrap();
    let fixed = melds_from_string(melds).unwrap();
    let ds = decompose(&free, &fixed).unwrap().unwrap();
    let d = &ds[0];
    classify(d, &d.tiles()).iter().map(|f| f.name).collect()
}

#[test]
fn test_canonical_fans() {
    assert_eq!(
        fan_names("m123456789p234s55", ""),
        vec!["Winning Hand", "Fully Concealed", "All Runs", "Pure Straight"]
    );
}

#[test]
fn test_baseline_fan() {
    // 他の役がなくても和了の役は成立する
    assert_eq!(fan_names("m234p55s789", "m678+ w111+"), vec!["Winning Hand", "Wind Triplet"]);
    assert_eq!(fan_names("m234p555s789w22", "m678+"), vec!["Winning Hand"]);
}

#[test]
fn test_additive_fans() {
    // 二盃口と一盃口は組の数で区別
    let names = fan_names("p123s55", "p123 m456 m456");
    assert!(names.contains(&"Twice Pure Double Run"));
    assert!(!names.contains(&"Pure Double Run"));

    // 断么九 + 清一色 (包含関係があっても削除しない)

    let names = fan_names("p22334455666888", "");
    assert!(names.contains(&"All Simples"));
    assert!(names.contains(&"Full Flush"));
    assert!(names.contains(&"Fully Concealed"));

    // 副露ありの一盃口は不成立
    let names = fan_names("p223344s55", "m789+ m789+");
    assert!(!names.contains(&"Pure Double Run"));
}

#[test]
fn test_honor_fans() {
    let names = fan_names("m11d222333", "d111+ m234+");
    assert!(names.contains(&"White Dragon"));
    assert!(names.contains(&"Green Dragon"));
    assert!(names.contains(&"Red Dragon"));
    assert!(names.contains(&"Big Three Dragons"));
    assert!(!names.contains(&"Little Three Dragons"));

    let names = fan_names("w111222333d333m11", "");
    assert!(names.contains(&"All Triplets"));
    assert!(names.contains(&"Four Concealed Triplets"));
    assert!(!names.contains(&"Three Concealed Triplets"));
    assert!(names.contains(&"All Terminals and Honors"));

    let names = fan_names("w11222333d333", "w4444");
    assert!(names.contains(&"Little Four Winds"));
    assert!(names.contains(&"All Honors"));
}

#[test]
fn test_structure_fans() {
    let names = fan_names("m123p123s123w11d111", "");
    assert!(names.contains(&"Mixed Triple Run"));
    assert!(names.contains(&"Outside Hand"));
    assert!(!names.contains(&"Terminals in All Sets"));

    let names = fan_names("m123999p123789s99", "");
    assert!(names.contains(&"Terminals in All Sets"));

    let names = fan_names("s22334466688d222", "");
    assert!(names.contains(&"All Green"));
    assert!(names.contains(&"Half Flush"));

    let names = fan_names("m555p99", "m2222 p2222 s2222+");
    assert!(names.contains(&"Three Quads"));
    assert!(names.contains(&"Triple Triplets"));
    assert!(names.contains(&"Three Concealed Triplets"));
}

#[test]
fn test_degenerate_fans() {
    assert_eq!(fan_names("m1155p22s33w44d1133", ""), vec!["Seven Pairs"]);
    assert_eq!(fan_names("m19p19s19w1234d1233", ""), vec!["Thirteen Orphans"]);
}
