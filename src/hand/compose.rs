use tracing::debug;

use crate::model::*;
use crate::rules::ScoringRules;

// 各効果の集計値
#[derive(Debug)]
struct Accum {
    flat_chips: f64,
    flat_mult: f64,
    mult_factor: f64,
    gold: f64,
}

impl Accum {
    fn apply(
        &mut self,
        stage: Stage,
        contributions: &[ModifierContribution],
        entries: &mut Vec<BreakdownEntry>,
    ) -> Res {
        for c in contributions {
            c.validate()?;
            let (chips, mult, gold) = match c.kind {
                ModifierKind::FlatChips => {
                    self.flat_chips += c.amount;
                    (c.amount, 1.0, 0.0)
                }
                ModifierKind::FlatMult => {
                    self.flat_mult += c.amount;
                    (0.0, c.amount, 0.0)
                }
                ModifierKind::MultFactor => {
                    self.mult_factor *= c.amount;
                    (0.0, c.amount, 0.0)
                }
                ModifierKind::FlatGold => {
                    self.gold += c.amount;
                    (0.0, 1.0, c.amount)
                }
            };
            entries.push(BreakdownEntry {
                stage,
                label: c.source.clone(),
                description: c.description.clone(),
                kind: Some(c.kind),
                chips,
                mult,
                gold,
            });
        }
        Ok(())
    }
}

fn entry(stage: Stage, label: &str, chips: f64, mult: f64) -> BreakdownEntry {
    BreakdownEntry {
        stage,
        label: label.to_string(),
        description: String::new(),
        kind: None,
        chips,
        mult,
        gold: 0.0,
    }
}

// 役と効果から最終的な点数を計算
// 適用順: 基本値, 面子の倍率, 役, 牌の強化, ランの強化, 消耗品, 実績
// 同じ区分の中の効果の順序は結果に影響しない
pub fn compose(
    rules: &ScoringRules,
    fans: &[FanMatch],
    decomposition: &Decomposition,
    contributions: &Contributions,
    achievements: &AchievementFlags,
) -> Res<ScoreBreakdown> {
    let mut entries = vec![];

    // 基本値
    let base_chips = rules.base_chips;
    entries.push(entry(Stage::Base, "base", base_chips, 1.0));

    // 面子の倍率 (特殊形は1.0)
    let mut base_mult = 1.0;
    for m in decomposition.melds() {
        base_mult *= m.mult_weight;
        if m.mult_weight != 1.0 {
            entries.push(entry(Stage::MeldWeight, &m.to_string(), 0.0, m.mult_weight));
        }
    }

    // 役
    let mut fan_chips = 0.0;
    let mut fan_mult = 1.0;
    for f in fans {
        let (chips, mult) = rules.fan_value(f.points);
        fan_chips += chips;
        fan_mult *= mult;
        entries.push(entry(Stage::Fan, f.name, chips, mult));
    }

    // 外部の効果
    let mut acc = Accum {
        flat_chips: 0.0,
        flat_mult: 0.0,
        mult_factor: 1.0,
        gold: 0.0,
    };
    acc.apply(Stage::Enhancement, &contributions.enhancement, &mut entries)?;
    acc.apply(Stage::Upgrade, &contributions.upgrade, &mut entries)?;
    acc.apply(Stage::Consumable, &contributions.consumable, &mut entries)?;

    // 実績
    let mut achievement_mult = 1.0;
    for (name, mult) in rules.achievements.active(achievements) {
        achievement_mult *= mult;
        entries.push(entry(Stage::Achievement, name, 0.0, mult));
    }

    // 負の効果でチップと倍率の項が0を下回る場合は0とする (点数は負にならない)
    let total_chips = (base_chips + fan_chips + acc.flat_chips).max(0.0);
    let mult_term = (base_mult * fan_mult + acc.flat_mult).max(0.0);
    let total_mult = mult_term * acc.mult_factor * achievement_mult;
    let final_score = (total_chips * total_mult).floor() as i64;
    debug!(
        "score: {} chips x {} mult = {}",
        total_chips, total_mult, final_score
    );

    Ok(ScoreBreakdown {
        decomposition: decomposition.clone(),
        fans: fans.to_vec(),
        base_chips,
        base_mult,
        fan_chips,
        fan_mult,
        flat_chips: acc.flat_chips,
        flat_mult: acc.flat_mult,
        mult_factor: acc.mult_factor,
        achievement_mult,
        total_chips,
        total_mult,
        gold: acc.gold,
        final_score,
        entries,
    })
}

#[cfg(test)]
fn canonical() -> (Decomposition, FanSet) {
    use super::{fan::classify, parse::decompose};
    use crate::util::string::tiles_from_string;
    let free = tiles_from_string("m123456789p234s55").unwrap();
    let d = decompose(&free, &[]).unwrap().unwrap().remove(0);
    let fans = classify(&d, &d.tiles());
    (d, fans)
}

#[test]
fn test_compose_canonical() {
    let (d, fans) = canonical();
    let b = compose(
        &ScoringRules::default(),
        &fans,
        &d,
        &Contributions::default(),
        &AchievementFlags::default(),
    )
    .unwrap();
    assert_eq!(b.total_chips, 70.0);
    assert_eq!(b.total_mult, 1.5);
    assert_eq!(b.final_score, 105);
    assert_eq!(b.fan_points(), 5);
    // 基本値 + 役4つ
    assert_eq!(b.entries.len(), 5);
}

#[test]
fn test_compose_order() {
    let (d, fans) = canonical();
    let contributions = Contributions {
        enhancement: vec![
            ModifierContribution::flat_chips("bonus", 30.0),
            ModifierContribution::flat_gold("gold", 3.0),
        ],
        upgrade: vec![ModifierContribution::flat_mult("upgrade", 0.5)],
        consumable: vec![
            ModifierContribution::mult_factor("x2", 2.0),
            ModifierContribution::mult_factor("x1.5", 1.5),
        ],
    };
    let achievements = AchievementFlags {
        final_action: true,
        ..Default::default()
    };
    let b = compose(&ScoringRules::default(), &fans, &d, &contributions, &achievements).unwrap();
    // (20 + 50 + 30) * ((1.0 * 1.5 + 0.5) * 3.0 * 2.0)
    assert_eq!(b.total_chips, 100.0);
    assert_eq!(b.total_mult, 12.0);
    assert_eq!(b.final_score, 1200);
    assert_eq!(b.gold, 3.0);

    let stages: Vec<Stage> = b.entries.iter().map(|e| e.stage).collect();
    let mut sorted = stages.clone();
    sorted.sort_by_key(|s| *s as usize);
    assert_eq!(stages, sorted);

    // 同じ区分の中の順序を入れ替えても結果は同じ
    let mut swapped = contributions.clone();
    swapped.consumable.reverse();
    swapped.enhancement.reverse();
    let b2 = compose(&ScoringRules::default(), &fans, &d, &swapped, &achievements).unwrap();
    assert_eq!(b.final_score, b2.final_score);

    // 加算の倍率と乗算の倍率の順序を入れ替えても同じ
    let mult_first = Contributions {
        consumable: vec![
            ModifierContribution::flat_mult("+2", 2.0),
            ModifierContribution::mult_factor("x2", 2.0),
        ],
        ..Default::default()
    };
    let mut factor_first = mult_first.clone();
    factor_first.consumable.reverse();
    let none = AchievementFlags::default();
    let b1 = compose(&ScoringRules::default(), &fans, &d, &mult_first, &none).unwrap();
    let b2 = compose(&ScoringRules::default(), &fans, &d, &factor_first, &none).unwrap();
    // 70 * ((1.5 + 2) * 2)
    assert_eq!(b1.final_score, 490);
    assert_eq!(b1.final_score, b2.final_score);
    assert_eq!(b1.total_mult, b2.total_mult);
}

#[test]
fn test_compose_negative_effects() {
    let (d, fans) = canonical();
    let none = AchievementFlags::default();
    let penalty = Contributions {
        consumable: vec![ModifierContribution::flat_mult("curse", -5.0)],
        ..Default::default()
    };
    let b = compose(&ScoringRules::default(), &fans, &d, &penalty, &none).unwrap();
    assert_eq!(b.flat_mult, -5.0);
    assert_eq!(b.total_mult, 0.0);
    assert_eq!(b.final_score, 0);

    // 正のチップを足しても点数は下がらない
    let mut boosted = penalty.clone();
    boosted
        .consumable
        .push(ModifierContribution::flat_chips("bonus", 10.0));
    let b2 = compose(&ScoringRules::default(), &fans, &d, &boosted, &none).unwrap();
    assert!(b2.final_score >= b.final_score);

    // チップが負になる場合
    let drain = Contributions {
        upgrade: vec![ModifierContribution::flat_chips("drain", -100.0)],
        consumable: vec![ModifierContribution::flat_mult("+3", 3.0)],
        ..Default::default()
    };
    let b3 = compose(&ScoringRules::default(), &fans, &d, &drain, &none).unwrap();
    assert_eq!(b3.total_chips, 0.0);
    assert_eq!(b3.final_score, 0);
}

#[test]
fn test_compose_entry_description() {
    let (d, fans) = canonical();
    let contributions = Contributions {
        consumable: vec![ModifierContribution::flat_gold("coin", 5.0).describe("+5 gold")],
        ..Default::default()
    };
    let b = compose(
        &ScoringRules::default(),
        &fans,
        &d,
        &contributions,
        &AchievementFlags::default(),
    )
    .unwrap();
    let e = b.entries.last().unwrap();
    assert_eq!(e.label, "coin");
    assert_eq!(e.description, "+5 gold");
    assert!(b.entries[0].description.is_empty());
}

#[test]
fn test_compose_meld_weight() {
    use super::{fan::classify, parse::decompose};
    use crate::util::string::{melds_from_string, tiles_from_string};
    let free = tiles_from_string("m234p456s678w22").unwrap();
    let fixed = melds_from_string("d1111").unwrap();
    let d = decompose(&free, &fixed).unwrap().unwrap().remove(0);
    let fans = classify(&d, &d.tiles());
    let b = compose(
        &ScoringRules::default(),
        &fans,
        &d,
        &Contributions::default(),
        &AchievementFlags::default(),
    )
    .unwrap();
    assert_eq!(b.base_mult, CONCEALED_QUAD_WEIGHT);
    assert!(b.entries.iter().any(|e| e.stage == Stage::MeldWeight));
}

#[test]
fn test_compose_malformed() {
    let (d, fans) = canonical();
    let contributions = Contributions {
        consumable: vec![ModifierContribution::mult_factor("broken", -2.0)],
        ..Default::default()
    };
    assert!(matches!(
        compose(
            &ScoringRules::default(),
            &fans,
            &d,
            &contributions,
            &AchievementFlags::default()
        ),
        Err(ScoreError::MalformedContribution { .. })
    ));
}
