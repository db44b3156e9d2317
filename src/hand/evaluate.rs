use rand::{rngs::StdRng, RngCore, SeedableRng};
use tracing::debug;

use super::compose::compose;
use super::fan::classify;
use super::parse::{check_slots, decompose};
use super::win::calc_tiles_to_win;
use crate::model::*;
use crate::rules::ScoringRules;
use crate::util::common::tiles_to_tile_table;

// 和了形である場合, 最も高得点となる分解の点数の内訳を返却
// 和了形でない場合は NotWinning (エラーではない)
// 乱数は最初に1度だけシードを引き, 分解ごとに同じシードで生成し直す
pub fn score_hand(
    free: &[Tile],                    // 手牌 (副露以外)
    fixed: &[Meld],                   // 副露 (暗槓を含む)
    providers: &ModifierProviders<'_>, // 牌の強化, ランの強化, 消耗品
    achievements: &AchievementFlags,  // 和了時の状況
    rules: &ScoringRules,
    rng: &mut dyn RngCore,
) -> Res<Evaluation> {
    rules.validate()?;
    let candidates = match decompose(free, fixed)? {
        Ok(ds) => ds,
        Err(reason) => return Ok(Evaluation::NotWinning { reason }),
    };

    let seed = rng.next_u64();
    let mut best: Option<ScoreBreakdown> = None;
    for (i, d) in candidates.iter().enumerate() {
        let tiles = d.tiles();
        let fans = classify(d, &tiles);
        let ctx = ModifierContext {
            decomposition: d,
            tiles: &tiles,
            fans: &fans,
            meld_counts: d.meld_counts(),
        };
        let mut cand_rng = StdRng::seed_from_u64(seed);
        let contributions = Contributions::collect(providers, &ctx, &mut cand_rng);
        let b = compose(rules, &fans, d, &contributions, achievements)?;
        debug!("candidate {}: score {}", i, b.final_score);

        // 同点の場合は先に見つかった分解を優先
        if best.as_ref().map_or(true, |x| b.final_score > x.final_score) {
            best = Some(b);
        }
    }

    match best {
        Some(b) => {
            debug!("best score: {}", b.final_score);
            Ok(Evaluation::Win(b))
        }
        None => Ok(Evaluation::NotWinning {
            reason: NotWinning::NoPartition,
        }),
    }
}

// あと1枚で和了となる牌の種類のリスト (手牌+副露で13枠)
pub fn winning_tiles(free: &[Tile], fixed: &[Meld]) -> Res<Vec<Tile>> {
    check_slots(free, fixed, HAND_SLOTS - 1)?;
    Ok(calc_tiles_to_win(&tiles_to_tile_table(free), fixed))
}

#[cfg(test)]
fn score(exp: &str, melds: &str, providers: &ModifierProviders<'_>) -> Res<Evaluation> {
    use crate::util::string::{melds_from_string, tiles_from_string};
    let mut rng = StdRng::seed_from_u64(0);
    score_hand(
        &tiles_from_string(exp).unwrap(),
        &melds_from_string(melds).unwrap(),
        providers,
        &AchievementFlags::default(),
        &ScoringRules::default(),
        &mut rng,
    )
}

#[test]
fn test_score_hand_best_candidate() {
    // 三連刻: 刻子3つ (三暗刻) の方が順子3つより高得点
    let ev = score("m111222333p456s99", "", &ModifierProviders::none()).unwrap();
    let b = ev.breakdown().unwrap();
    assert_eq!(b.decomposition.meld_counts().triplet, 3);
    assert!(b.fans.iter().any(|f| f.name == "Three Concealed Triplets"));
}

#[test]
fn test_score_hand_not_winning() {
    let ev = score("m123456789p234s56", "", &ModifierProviders::none()).unwrap();
    assert_eq!(
        ev,
        Evaluation::NotWinning {
            reason: NotWinning::NoPartition
        }
    );
    assert!(score("m123456789p234s5", "", &ModifierProviders::none()).is_err());
}

#[test]
fn test_score_hand_invalid_rules() {
    use crate::rules::FanTier;
    use crate::util::string::tiles_from_string;
    let tier = |min_points, chips, mult| FanTier {
        min_points,
        chips,
        mult,
    };
    let rules = ScoringRules {
        fan_tiers: vec![tier(5, 50.0, 1.5), tier(1, 10.0, 1.0)],
        ..ScoringRules::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let res = score_hand(
        &tiles_from_string("m123456789p234s55").unwrap(),
        &[],
        &ModifierProviders::none(),
        &AchievementFlags::default(),
        &rules,
        &mut rng,
    );
    assert!(matches!(res, Err(ScoreError::Config(_))));
}

#[test]
fn test_score_hand_invalid_tiles() {
    use crate::util::string::{melds_from_string, tiles_from_string};
    let none = ModifierProviders::none();
    let flags = AchievementFlags::default();
    let rules = ScoringRules::default();
    let mut rng = StdRng::seed_from_u64(0);

    // 範囲外の牌の刻子を副露
    let free = tiles_from_string("s12355").unwrap();
    let mut fixed = melds_from_string("p123 p456").unwrap();
    fixed.push(Meld::from_parts(
        MeldKind::Triplet,
        vec![Tile::new(TM, 10); 3],
        false,
    ));
    let res = score_hand(&free, &fixed, &none, &flags, &rules, &mut rng);
    assert!(matches!(res, Err(ScoreError::InvalidTile(_))));

    // 範囲外の手牌
    for t in [Tile::new(TM, 10), Tile::new(7, 1)] {
        let mut free = tiles_from_string("m123456789p234s5").unwrap();
        free.push(t);
        let res = score_hand(&free, &[], &none, &flags, &rules, &mut rng);
        assert!(matches!(res, Err(ScoreError::InvalidTile(_))));
    }
}

#[test]
fn test_winning_tiles() {
    use crate::util::string::{melds_from_string, tiles_from_string};
    let free = tiles_from_string("m23p456s678w22").unwrap();
    let fixed = melds_from_string("d111+").unwrap();
    let wins = winning_tiles(&free, &fixed).unwrap();
    assert_eq!(wins, vec![Tile::new(TM, 1), Tile::new(TM, 4)]);

    // 14枚ある場合は契約違反
    let free = tiles_from_string("m123456789p234s55").unwrap();
    assert!(winning_tiles(&free, &[]).is_err());
}
