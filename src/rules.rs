use serde::{Deserialize, Serialize};

use crate::error::{Res, ScoreError};
use crate::model::AchievementFlags;

// 役の点数 -> (チップ, 倍率) の変換表の1段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanTier {
    pub min_points: usize,
    pub chips: f64,
    pub mult: f64,
}

// 実績ごとの倍率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementMults {
    pub first_draw: f64,
    pub after_quad: f64,
    pub final_action: f64,
    pub last_tile: f64,
}

impl Default for AchievementMults {
    fn default() -> Self {
        Self {
            first_draw: 3.0,
            after_quad: 1.5,
            final_action: 2.0,
            last_tile: 1.5,
        }
    }
}

impl AchievementMults {
    // 成立した実績の(名前, 倍率)のリスト
    pub fn active(&self, flags: &AchievementFlags) -> Vec<(&'static str, f64)> {
        let mut res = vec![];
        if flags.first_draw {
            res.push(("first_draw", self.first_draw));
        }
        if flags.after_quad {
            res.push(("after_quad", self.after_quad));
        }
        if flags.final_action {
            res.push(("final_action", self.final_action));
        }
        if flags.last_tile {
            res.push(("last_tile", self.last_tile));
        }
        res
    }
}

// 点数計算の設定値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub base_chips: f64,
    pub fan_tiers: Vec<FanTier>, // min_pointsの昇順
    pub achievements: AchievementMults,
}

impl Default for ScoringRules {
    fn default() -> Self {
        let tier = |min_points, chips, mult| FanTier {
            min_points,
            chips,
            mult,
        };
        Self {
            base_chips: 20.0,
            fan_tiers: vec![
                tier(1, 10.0, 1.0),
                tier(2, 20.0, 1.5),
                tier(3, 40.0, 2.0),
                tier(6, 80.0, 3.0),
                tier(13, 200.0, 5.0),
            ],
            achievements: AchievementMults::default(),
        }
    }
}

impl ScoringRules {
    // JSONから読み込み (省略した項目はデフォルト値)
    pub fn from_json(s: &str) -> Res<Self> {
        let rules: Self = serde_json::from_str(s)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Res {
        let err = |msg: String| Err(ScoreError::Config(msg));

        if !self.base_chips.is_finite() {
            return err("base_chips must be finite".to_string());
        }
        if self.fan_tiers.is_empty() {
            return err("fan_tiers must not be empty".to_string());
        }
        for (i, t) in self.fan_tiers.iter().enumerate() {
            if !t.chips.is_finite() || !t.mult.is_finite() || t.mult < 0.0 {
                return err(format!("fan_tiers[{i}] has an invalid value"));
            }
            if i > 0 && t.min_points <= self.fan_tiers[i - 1].min_points {
                return err(format!("fan_tiers[{i}] is not sorted by min_points"));
            }
        }
        let a = &self.achievements;
        for (name, m) in [
            ("first_draw", a.first_draw),
            ("after_quad", a.after_quad),
            ("final_action", a.final_action),
            ("last_tile", a.last_tile),
        ] {
            if !m.is_finite() || m < 0.0 {
                return err(format!("achievement multiplier '{name}' is invalid"));
            }
        }
        Ok(())
    }

    // 点数以下で最大の段の(チップ, 倍率) どの段にも届かない場合は(0, 1)
    pub fn fan_value(&self, points: usize) -> (f64, f64) {
        self.fan_tiers
            .iter()
            .rev()
            .find(|t| t.min_points <= points)
            .map_or((0.0, 1.0), |t| (t.chips, t.mult))
    }
}

#[test]
fn test_fan_value() {
    let rules = ScoringRules::default();
    assert_eq!(rules.fan_value(0), (0.0, 1.0));
    assert_eq!(rules.fan_value(1), (10.0, 1.0));
    assert_eq!(rules.fan_value(2), (20.0, 1.5));
    assert_eq!(rules.fan_value(5), (40.0, 2.0));
    assert_eq!(rules.fan_value(6), (80.0, 3.0));
    assert_eq!(rules.fan_value(13), (200.0, 5.0));
    assert_eq!(rules.fan_value(26), (200.0, 5.0));
}

#[test]
fn test_rules_from_json() {
    let rules = ScoringRules::from_json(r#"{"base_chips": 30}"#).unwrap();
    assert_eq!(rules.base_chips, 30.0);
    assert_eq!(rules.fan_tiers, ScoringRules::default().fan_tiers);

    let rules = ScoringRules::from_json(
        r#"{"fan_tiers": [{"min_points": 1, "chips": 5, "mult": 1}], "achievements": {"first_draw": 4}}"#,
    )
    .unwrap();
    assert_eq!(rules.fan_value(13), (5.0, 1.0));
    assert_eq!(rules.achievements.first_draw, 4.0);
    assert_eq!(rules.achievements.after_quad, 1.5);

    assert!(matches!(
        ScoringRules::from_json(r#"{"fan_tiers": []}"#),
        Err(ScoreError::Config(_))
    ));
    assert!(matches!(
        ScoringRules::from_json(
            r#"{"fan_tiers": [{"min_points": 2, "chips": 5, "mult": 1}, {"min_points": 1, "chips": 5, "mult": 1}]}"#
        ),
        Err(ScoreError::Config(_))
    ));
    assert!(matches!(
        ScoringRules::from_json("{"),
        Err(ScoreError::Json(_))
    ));
}
