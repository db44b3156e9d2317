use rand::{Rng, RngCore};

use super::*;

// 外部から供給される効果の合成方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    FlatChips,  // チップに加算
    FlatMult,   // 倍率に加算 (乗算系より先に適用)
    MultFactor, // 倍率に乗算
    FlatGold,   // 所持金に加算 (得点には影響しない)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierContribution {
    pub source: String,
    pub kind: ModifierKind,
    pub amount: f64,
    pub description: String,
}

impl ModifierContribution {
    pub fn new(source: &str, kind: ModifierKind, amount: f64, description: &str) -> Self {
        Self {
            source: source.to_string(),
            kind,
            amount,
            description: description.to_string(),
        }
    }

    pub fn flat_chips(source: &str, amount: f64) -> Self {
        Self::new(source, ModifierKind::FlatChips, amount, "")
    }

    pub fn flat_mult(source: &str, amount: f64) -> Self {
        Self::new(source, ModifierKind::FlatMult, amount, "")
    }

    pub fn mult_factor(source: &str, amount: f64) -> Self {
        Self::new(source, ModifierKind::MultFactor, amount, "")
    }

    pub fn flat_gold(source: &str, amount: f64) -> Self {
        Self::new(source, ModifierKind::FlatGold, amount, "")
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn validate(&self) -> Res<()> {
        let malformed = |reason: &str| {
            Err(ScoreError::MalformedContribution {
                label: self.source.clone(),
                reason: reason.to_string(),
            })
        };

        if !self.amount.is_finite() {
            return malformed("amount is not a finite number");
        }
        if self.kind == ModifierKind::MultFactor && self.amount < 0.0 {
            return malformed("mult factor must not be negative");
        }
        Ok(())
    }
}

// 効果の計算時に参照可能な和了の情報
#[derive(Debug, Clone, Copy)]
pub struct ModifierContext<'a> {
    pub decomposition: &'a Decomposition,
    pub tiles: &'a [Tile], // 和了に関わるすべての牌
    pub fans: &'a [FanMatch],
    pub meld_counts: MeldCounts,
}

impl<'a> ModifierContext<'a> {
    pub fn has_fan(&self, name: &str) -> bool {
        self.fans.iter().any(|f| f.name == name)
    }

    pub fn count_enhancement(&self, e: Enhancement) -> usize {
        self.tiles.iter().filter(|t| t.2 == Some(e)).count()
    }
}

// 牌の強化, ランの強化, 消耗品などの外部システムが実装するインターフェース
// 入力(和了情報と乱数)のみから結果を決定すること
// 牌の強化の劣化など状態の更新は点数計算の完了後に各システム側で行う
pub trait ModifierProvider {
    fn compute_contributions(
        &self,
        ctx: &ModifierContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution>;
}

// 効果なし
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModifiers;

impl ModifierProvider for NoModifiers {
    fn compute_contributions(
        &self,
        _ctx: &ModifierContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution> {
        vec![]
    }
}

// 固定の効果リスト (消耗品の適用順はリストの順)
impl ModifierProvider for [ModifierContribution] {
    fn compute_contributions(
        &self,
        _ctx: &ModifierContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution> {
        self.to_vec()
    }
}

impl ModifierProvider for Vec<ModifierContribution> {
    fn compute_contributions(
        &self,
        ctx: &ModifierContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<ModifierContribution> {
        self.as_slice().compute_contributions(ctx, rng)
    }
}

// score_handに渡す効果の供給元一式
#[derive(Clone, Copy)]
pub struct ModifierProviders<'a> {
    pub enhancement: &'a dyn ModifierProvider,
    pub upgrade: &'a dyn ModifierProvider,
    pub consumable: &'a dyn ModifierProvider,
}

impl<'a> ModifierProviders<'a> {
    pub fn none() -> Self {
        Self {
            enhancement: &NoModifiers,
            upgrade: &NoModifiers,
            consumable: &NoModifiers,
        }
    }
}

impl Default for ModifierProviders<'_> {
    fn default() -> Self {
        Self::none()
    }
}

// 供給元ごとに集めた効果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contributions {
    pub enhancement: Vec<ModifierContribution>,
    pub upgrade: Vec<ModifierContribution>,
    pub consumable: Vec<ModifierContribution>,
}

impl Contributions {
    pub fn collect(
        providers: &ModifierProviders<'_>,
        ctx: &ModifierContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Self {
        Self {
            enhancement: providers.enhancement.compute_contributions(ctx, rng),
            upgrade: providers.upgrade.compute_contributions(ctx, rng),
            consumable: providers.consumable.compute_contributions(ctx, rng),
        }
    }
}

// 確率で発動する効果の判定 chanceは[0, 1]に丸める
pub fn roll_proc(rng: &mut dyn RngCore, chance: f64) -> bool {
    let p = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
    rng.gen_bool(p)
}

#[test]
fn test_contribution_validate() {
    assert!(ModifierContribution::flat_chips("glass", 30.0).validate().is_ok());
    assert!(ModifierContribution::flat_chips("glass", -5.0).validate().is_ok());
    assert!(ModifierContribution::flat_mult("glass", f64::NAN).validate().is_err());
    assert!(ModifierContribution::mult_factor("glass", -1.0).validate().is_err());
    assert!(ModifierContribution::mult_factor("glass", f64::INFINITY).validate().is_err());
}

#[test]
fn test_roll_proc() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    assert!(!roll_proc(&mut rng, 0.0));
    assert!(roll_proc(&mut rng, 1.0));
    assert!(!roll_proc(&mut rng, f64::NAN));
    assert!(roll_proc(&mut rng, 3.0));
}
