use super::*;

// 和了時の状況による実績 (複数同時に成立しうる)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementFlags {
    pub first_draw: bool,   // 捨て牌なしで最初のツモで和了
    pub after_quad: bool,   // 槓子を宣言した直後に和了
    pub final_action: bool, // 最後の行動で和了
    pub last_tile: bool,    // 山の最後の牌で和了
}

// 点数の内訳の区分 (適用順)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Base,
    MeldWeight,
    Fan,
    Enhancement,
    Upgrade,
    Consumable,
    Achievement,
}

// 内訳の1項目
// kindがNoneの場合は役や面子の倍率など内部で決まる値 (multは乗算)
// FlatMultの場合のみmultは加算値
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub stage: Stage,
    pub label: String,
    pub description: String,
    pub kind: Option<ModifierKind>,
    pub chips: f64,
    pub mult: f64,
    pub gold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub decomposition: Decomposition,
    pub fans: FanSet,
    pub base_chips: f64,
    pub base_mult: f64,
    pub fan_chips: f64,
    pub fan_mult: f64,
    pub flat_chips: f64,
    pub flat_mult: f64,
    pub mult_factor: f64,
    pub achievement_mult: f64,
    pub total_chips: f64,
    pub total_mult: f64,
    pub gold: f64,
    pub final_score: i64,
    pub entries: Vec<BreakdownEntry>, // 適用順
}

impl ScoreBreakdown {
    pub fn to_json(&self) -> Res<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn fan_points(&self) -> usize {
        self.fans.iter().map(|f| f.points).sum()
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            write!(
                f,
                "{:<12} {:<28} chips:{:>8.2} mult:{:>8.2}",
                format!("{:?}", e.stage),
                e.label,
                e.chips,
                e.mult
            )?;
            if !e.description.is_empty() {
                write!(f, "  ({})", e.description)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} chips x {} mult = {} (gold: {})",
            self.total_chips, self.total_mult, self.final_score, self.gold
        )
    }
}

// score_handの結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Evaluation {
    Win(ScoreBreakdown),
    NotWinning { reason: NotWinning },
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        matches!(self, Evaluation::Win(_))
    }

    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match self {
            Evaluation::Win(b) => Some(b),
            Evaluation::NotWinning { .. } => None,
        }
    }
}
