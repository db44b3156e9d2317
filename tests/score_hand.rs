use mahjong_score::util::common::all_tile_kinds;
use mahjong_score::util::string::{melds_from_string, tiles_from_string};
use mahjong_score::*;
use proptest::prelude::*;
use rand::{rngs::StdRng, RngCore, SeedableRng};

// 強化タグ1の牌ごとに確率で倍率+20
struct LuckyTiles {
    chance: f64,
}

impl ModifierProvider for LuckyTiles {
    fn compute_contributions(
        &self,
        ctx: &ModifierContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution> {
        let mut res = vec![];
        for t in ctx.tiles {
            if t.2 == Some(Enhancement(1)) && roll_proc(rng, self.chance) {
                res.push(ModifierContribution::flat_mult(&format!("lucky {}", t), 20.0));
            }
        }
        res
    }
}

// 刻子1つにつきチップ+15
struct TripletBonus;

impl ModifierProvider for TripletBonus {
    fn compute_contributions(
        &self,
        ctx: &ModifierContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution> {
        let n = ctx.meld_counts.triplet_total();
        if n == 0 {
            return vec![];
        }
        vec![ModifierContribution::flat_chips("triplet bonus", 15.0 * n as f64)]
    }
}

fn score(
    exp: &str,
    melds: &str,
    providers: &ModifierProviders<'_>,
    achievements: &AchievementFlags,
    seed: u64,
) -> Res<Evaluation> {
    let mut rng = StdRng::seed_from_u64(seed);
    score_hand(
        &tiles_from_string(exp).unwrap(),
        &melds_from_string(melds).unwrap(),
        providers,
        achievements,
        &ScoringRules::default(),
        &mut rng,
    )
}

fn final_score(ev: &Evaluation) -> i64 {
    ev.breakdown().unwrap().final_score
}

#[test]
fn test_canonical_fixture() {
    let ev = score(
        "m123456789p234s55",
        "",
        &ModifierProviders::none(),
        &AchievementFlags::default(),
        0,
    )
    .unwrap();
    let b = ev.breakdown().unwrap();
    let names: Vec<&str> = b.fans.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        vec!["Winning Hand", "Fully Concealed", "All Runs", "Pure Straight"]
    );
    assert_eq!(b.total_chips, 70.0);
    assert_eq!(b.total_mult, 1.5);
    assert_eq!(b.final_score, 105);

    let json = b.to_json().unwrap();
    assert!(json.contains(r#""final_score":105"#));
    assert!(json.contains(r#""form":"standard""#));
}

#[test]
fn test_contract_errors() {
    let none = ModifierProviders::none();
    let flags = AchievementFlags::default();
    assert!(matches!(
        score("m123456789p234s5", "", &none, &flags, 0),
        Err(ScoreError::TileCount { .. })
    ));

    let consumables = vec![ModifierContribution::flat_mult("broken", f64::NAN)];
    let providers = ModifierProviders {
        consumable: &consumables,
        ..ModifierProviders::none()
    };
    assert!(matches!(
        score("m123456789p234s55", "", &providers, &flags, 0),
        Err(ScoreError::MalformedContribution { .. })
    ));
}

#[test]
fn test_not_winning() {
    let none = ModifierProviders::none();
    let flags = AchievementFlags::default();
    let ev = score("m19", "m123 p456 s789 d222", &none, &flags, 0).unwrap();
    assert_eq!(
        ev,
        Evaluation::NotWinning {
            reason: NotWinning::PairMissing
        }
    );
    assert!(!ev.is_win());
}

#[test]
fn test_seven_pairs() {
    let ev = score(
        "m1155p22s33w44d1133",
        "",
        &ModifierProviders::none(),
        &AchievementFlags::default(),
        0,
    )
    .unwrap();
    let b = ev.breakdown().unwrap();
    assert!(b.decomposition.is_degenerate());
    assert_eq!(
        b.fans,
        vec![FanMatch {
            name: "Seven Pairs",
            points: 2
        }]
    );
    // (20 + 20) * 1.5
    assert_eq!(b.final_score, 60);
}

#[test]
fn test_modifier_stages() {
    let upgrade = TripletBonus;
    let consumables = vec![
        ModifierContribution::mult_factor("double", 2.0),
        ModifierContribution::flat_gold("coin", 5.0).describe("+5 gold"),
    ];
    let providers = ModifierProviders {
        upgrade: &upgrade,
        consumable: &consumables,
        ..ModifierProviders::none()
    };
    let flags = AchievementFlags {
        first_draw: true,
        ..Default::default()
    };
    // m111 p789 s55 w222 d333: 刻子3つ
    let ev = score("m111p789s55w222d333", "", &providers, &flags, 0).unwrap();
    let b = ev.breakdown().unwrap();
    assert_eq!(b.flat_chips, 45.0);
    assert_eq!(b.mult_factor, 2.0);
    assert_eq!(b.achievement_mult, 3.0);
    assert_eq!(b.gold, 5.0);

    let labels: Vec<&str> = b
        .entries
        .iter()
        .filter(|e| e.kind.is_some())
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(labels, vec!["triplet bonus", "double", "coin"]);
    assert_eq!(b.entries.last().unwrap().label, "first_draw");
}

#[test]
fn test_random_proc() {
    let flags = AchievementFlags::default();
    let hand = "m1#12#13#1456789p234s55";

    let always = LuckyTiles { chance: 1.0 };
    let providers = ModifierProviders {
        enhancement: &always,
        ..ModifierProviders::none()
    };
    let b = score(hand, "", &providers, &flags, 0).unwrap();
    assert_eq!(b.breakdown().unwrap().flat_mult, 60.0);

    let never = LuckyTiles { chance: 0.0 };
    let providers = ModifierProviders {
        enhancement: &never,
        ..ModifierProviders::none()
    };
    assert_eq!(final_score(&score(hand, "", &providers, &flags, 0).unwrap()), 105);

    // 同じシードなら同じ結果
    let half = LuckyTiles { chance: 0.5 };
    let providers = ModifierProviders {
        enhancement: &half,
        ..ModifierProviders::none()
    };
    for seed in 0..8 {
        let a = score(hand, "", &providers, &flags, seed).unwrap();
        let b = score(hand, "", &providers, &flags, seed).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_custom_rules() {
    let rules = ScoringRules::from_json(r#"{"base_chips": 40}"#).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let ev = score_hand(
        &tiles_from_string("m123456789p234s55").unwrap(),
        &[],
        &ModifierProviders::none(),
        &AchievementFlags::default(),
        &rules,
        &mut rng,
    )
    .unwrap();
    // (40 + 50) * 1.5
    assert_eq!(final_score(&ev), 135);
}

// [Property]

// 4面子1雀頭から組み立てた和了形 (同じ牌は4枚まで)
prop_compose! {
    fn arb_winning_hand()(
        melds in proptest::collection::vec((any::<bool>(), 0usize..3, 1usize..8, 0usize..34), 4),
        pair in 0usize..34
    ) -> Vec<Tile> {
        let kinds = all_tile_kinds();
        let mut tiles = vec![];
        for (is_run, ti, ni, k) in melds {
            if is_run {
                for d in 0..3 {
                    tiles.push(Tile::new(ti, ni + d));
                }
            } else {
                tiles.extend([kinds[k]; 3]);
            }
        }
        tiles.extend([kinds[pair]; 2]);
        tiles
    }
}

// 異なる7種類の牌の対子
prop_compose! {
    fn arb_seven_pairs()(
        kinds in proptest::sample::subsequence(all_tile_kinds(), 7)
    ) -> Vec<Tile> {
        kinds.iter().flat_map(|&k| [k, k]).collect()
    }
}

// 同じ数牌の連続する7種類の対子
prop_compose! {
    fn arb_consecutive_pairs()(ti in 0usize..3, start in 1usize..4) -> Vec<Tile> {
        (start..start + 7).flat_map(|ni| [Tile::new(ti, ni); 2]).collect()
    }
}

// 加算, 乗算の効果 (負の値を含む)
fn arb_contribution() -> impl Strategy<Value = ModifierContribution> {
    prop_oneof![
        (-100.0..100.0f64).prop_map(|a| ModifierContribution::flat_chips("chips", a)),
        (-10.0..10.0f64).prop_map(|a| ModifierContribution::flat_mult("mult", a)),
        (0.0..4.0f64).prop_map(|a| ModifierContribution::mult_factor("factor", a)),
    ]
}

fn is_consecutive(kinds: &[Tile]) -> bool {
    kinds.iter().all(|k| k.is_suit() && k.0 == kinds[0].0)
        && kinds.windows(2).all(|w| w[1].1 == w[0].1 + 1)
}

fn is_legal(tiles: &[Tile]) -> bool {
    all_tile_kinds()
        .iter()
        .all(|k| tiles.iter().filter(|t| t.is_same_tile(k)).count() <= 4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_decomposition_covers_tiles(tiles in arb_winning_hand()) {
        prop_assume!(is_legal(&tiles));
        let ds = decompose(&tiles, &[]).unwrap().unwrap();
        prop_assert!(!ds.is_empty());
        let mut expected = tiles.clone();
        expected.sort();
        for d in &ds {
            let mut got = d.tiles();
            got.sort();
            prop_assert_eq!(&got, &expected);
            prop_assert_eq!(d.slot_count(), 14);
        }
    }

    #[test]
    fn prop_score_is_idempotent(tiles in arb_winning_hand(), seed in any::<u64>()) {
        prop_assume!(is_legal(&tiles));
        let lucky = LuckyTiles { chance: 0.5 };
        let providers = ModifierProviders {
            enhancement: &lucky,
            ..ModifierProviders::none()
        };
        let tiles: Vec<Tile> = tiles
            .into_iter()
            .enumerate()
            .map(|(i, t)| if i % 3 == 0 { t.with_enhancement(Enhancement(1)) } else { t })
            .collect();
        let flags = AchievementFlags::default();
        let rules = ScoringRules::default();
        let a = score_hand(&tiles, &[], &providers, &flags, &rules, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = score_hand(&tiles, &[], &providers, &flags, &rules, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_positive_bonus_is_monotonic(
        tiles in arb_winning_hand(),
        others in proptest::collection::vec(arb_contribution(), 0..4),
        chips in 0.0..500.0f64,
        mult in 0.0..50.0f64
    ) {
        prop_assume!(is_legal(&tiles));
        let flags = AchievementFlags::default();
        let rules = ScoringRules::default();
        let providers = ModifierProviders {
            consumable: &others,
            ..ModifierProviders::none()
        };
        let base = score_hand(&tiles, &[], &providers, &flags, &rules, &mut StdRng::seed_from_u64(0)).unwrap();
        prop_assert!(final_score(&base) >= 0);

        let mut bonus = others.clone();
        bonus.push(ModifierContribution::flat_chips("bonus chips", chips));
        bonus.push(ModifierContribution::flat_mult("bonus mult", mult));
        let providers = ModifierProviders {
            consumable: &bonus,
            ..ModifierProviders::none()
        };
        let boosted = score_hand(&tiles, &[], &providers, &flags, &rules, &mut StdRng::seed_from_u64(0)).unwrap();
        prop_assert!(final_score(&boosted) >= final_score(&base));
    }

    #[test]
    fn prop_seven_distinct_pairs(
        tiles in prop_oneof![arb_seven_pairs(), arb_consecutive_pairs()]
    ) {
        let ds = decompose(&tiles, &[]).unwrap().unwrap();
        prop_assert_eq!(ds.len(), 1);
        prop_assert!(ds[0].is_degenerate());

        let mut kinds = tiles.clone();
        kinds.sort();
        kinds.dedup();
        let expected = if is_consecutive(&kinds) {
            "Seven Consecutive Pairs"
        } else {
            "Seven Pairs"
        };
        let fans = classify(&ds[0], &ds[0].tiles());
        let names: Vec<&str> = fans.iter().map(|f| f.name).collect();
        prop_assert_eq!(names, vec![expected]);
    }
}
