use serde::{Deserialize, Serialize};

use super::domain::FeatureVector;

/// Spread above which the elemental balance gets a strongest/weakest callout.
const SPREAD_CALLOUT_THRESHOLD: f64 = 0.15;

/// Largest population standard deviation five 0..1 proportions can reach
/// (all mass on one element). Used to scale the balance score.
const MAX_SIGMA: f64 = 0.4;

/// Contribution used when a designated composite feature is missing.
const NEUTRAL_PROPORTION: f64 = 0.5;

/// The five elements of the room reading, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const fn ordered() -> [Element; 5] {
        [
            Element::Wood,
            Element::Fire,
            Element::Earth,
            Element::Metal,
            Element::Water,
        ]
    }

    /// Feature name the room extractor emits for this element's proportion.
    pub const fn feature_name(self) -> &'static str {
        match self {
            Element::Wood => "木元素比例",
            Element::Fire => "火元素比例",
            Element::Earth => "土元素比例",
            Element::Metal => "金元素比例",
            Element::Water => "水元素比例",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }
}

/// One element's observed proportion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementReading {
    pub element: Element,
    pub proportion: f64,
}

/// Strongest/weakest callout attached when element proportions diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCallout {
    pub strongest: Element,
    pub weakest: Element,
    pub spread: f64,
}

/// Five-element balance of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementalBalance {
    pub readings: Vec<ElementReading>,
    pub balance_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout: Option<BalanceCallout>,
}

/// Facing direction of the room, parsed from the extractor's 朝向 feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// Accepts the extractor's bare direction labels with or without the
    /// 朝 prefix ("南" / "朝南").
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_start_matches('朝') {
            "北" => Some(Direction::North),
            "东北" => Some(Direction::Northeast),
            "东" => Some(Direction::East),
            "东南" => Some(Direction::Southeast),
            "南" => Some(Direction::South),
            "西南" => Some(Direction::Southwest),
            "西" => Some(Direction::West),
            "西北" => Some(Direction::Northwest),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Direction::North => "北",
            Direction::Northeast => "东北",
            Direction::East => "东",
            Direction::Southeast => "东南",
            Direction::South => "南",
            Direction::Southwest => "西南",
            Direction::West => "西",
            Direction::Northwest => "西北",
        }
    }

    /// Bagua trigram governing this direction.
    pub const fn trigram(self) -> &'static str {
        match self {
            Direction::North => "坎",
            Direction::Northeast => "艮",
            Direction::East => "震",
            Direction::Southeast => "巽",
            Direction::South => "离",
            Direction::Southwest => "坤",
            Direction::West => "兑",
            Direction::Northwest => "乾",
        }
    }

    /// Element the direction's trigram belongs to. The center-earth of the
    /// classical scheme has no facing direction, so 艮/坤 carry earth here.
    pub const fn element(self) -> Element {
        match self {
            Direction::North => Element::Water,
            Direction::Northeast | Direction::Southwest => Element::Earth,
            Direction::East | Direction::Southeast => Element::Wood,
            Direction::South => Element::Fire,
            Direction::West | Direction::Northwest => Element::Metal,
        }
    }

    /// Life aspects the trigram is traditionally read for.
    pub const fn aspects(self) -> &'static str {
        match self {
            Direction::North => "智慧、事业",
            Direction::Northeast => "学业、转折",
            Direction::East => "行动、发展",
            Direction::Southeast => "财运、人际",
            Direction::South => "名声、光明",
            Direction::Southwest => "家庭、稳定",
            Direction::West => "口才、收获",
            Direction::Northwest => "权威、事业",
        }
    }
}

/// Directional-energy summary derived from the room's facing direction and
/// the proportion of the direction's governing element in the decor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalEnergy {
    pub direction: Direction,
    pub element: Element,
    pub energy_score: u8,
    pub summary: String,
}

/// The three auspicious positions scored for the room domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuspiciousPosition {
    Wealth,
    Romance,
    Study,
}

impl AuspiciousPosition {
    pub const fn ordered() -> [AuspiciousPosition; 3] {
        [
            AuspiciousPosition::Wealth,
            AuspiciousPosition::Romance,
            AuspiciousPosition::Study,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            AuspiciousPosition::Wealth => "财位",
            AuspiciousPosition::Romance => "桃花位",
            AuspiciousPosition::Study => "文昌位",
        }
    }

    /// Weighted feature mix for this position. Weights sum to 1.0.
    const fn components(self) -> &'static [(&'static str, f64)] {
        match self {
            AuspiciousPosition::Wealth => &[
                ("亮度", 0.40),
                ("整洁度", 0.30),
                ("植物覆盖率", 0.30),
            ],
            AuspiciousPosition::Romance => &[
                ("暖色比例", 0.50),
                ("色彩饱和度", 0.30),
                ("整洁度", 0.20),
            ],
            AuspiciousPosition::Study => &[
                ("自然光比例", 0.40),
                ("空间开阔度", 0.30),
                ("整洁度", 0.30),
            ],
        }
    }

    const fn verdict_for(self, score: u8) -> &'static str {
        match self {
            AuspiciousPosition::Wealth => {
                if score >= 75 {
                    "财位明亮整洁，聚财之象，宜摆放绿植助运。"
                } else if score >= 55 {
                    "财位格局尚可，保持整洁可稳步生财。"
                } else {
                    "财位昏暗杂乱，财气易散，宜增加照明并清理杂物。"
                }
            }
            AuspiciousPosition::Romance => {
                if score >= 75 {
                    "桃花位色彩温润，人缘运旺盛。"
                } else if score >= 55 {
                    "桃花位平顺，添置暖色摆件可增进情缘。"
                } else {
                    "桃花位冷清，宜以暖色软装点缀提升人气。"
                }
            }
            AuspiciousPosition::Study => {
                if score >= 75 {
                    "文昌位采光开阔，利学业与思虑。"
                } else if score >= 55 {
                    "文昌位尚稳，保持桌面整洁有助专注。"
                } else {
                    "文昌位光线不足，宜引入自然光并留出开阔空间。"
                }
            }
        }
    }
}

/// Score for one auspicious position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionScore {
    pub position: AuspiciousPosition,
    pub score: u8,
    pub verdict: String,
}

/// Composite indices computed for the room domain on top of the rule scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomComposites {
    pub elemental_balance: ElementalBalance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directional_energy: Option<DirectionalEnergy>,
    pub positions: Vec<PositionScore>,
}

/// Compute the room composites. Never fails: missing features fall back to
/// neutral contributions; the directional summary is simply absent when the
/// vector carries no parseable 朝向.
pub fn room_composites(features: &FeatureVector) -> RoomComposites {
    RoomComposites {
        elemental_balance: elemental_balance(features),
        directional_energy: directional_energy(features),
        positions: AuspiciousPosition::ordered()
            .into_iter()
            .map(|position| position_score(position, features))
            .collect(),
    }
}

fn proportion(features: &FeatureVector, name: &str) -> f64 {
    features
        .feature(name)
        .and_then(|value| value.as_number())
        .filter(|value| value.is_finite())
        .unwrap_or(NEUTRAL_PROPORTION)
}

fn elemental_balance(features: &FeatureVector) -> ElementalBalance {
    let readings: Vec<ElementReading> = Element::ordered()
        .into_iter()
        .map(|element| ElementReading {
            element,
            // Absent elements read as an even 1/5 share rather than the
            // generic neutral, so a partial extraction does not skew sigma.
            proportion: features
                .feature(element.feature_name())
                .and_then(|value| value.as_number())
                .filter(|value| value.is_finite())
                .unwrap_or(0.2),
        })
        .collect();

    let mean = readings.iter().map(|r| r.proportion).sum::<f64>() / readings.len() as f64;
    let variance = readings
        .iter()
        .map(|r| (r.proportion - mean).powi(2))
        .sum::<f64>()
        / readings.len() as f64;
    let sigma = variance.sqrt();
    let balance_score = ((1.0 - sigma / MAX_SIGMA) * 100.0).round().clamp(0.0, 100.0) as u8;

    let strongest = readings
        .iter()
        .max_by(|a, b| a.proportion.total_cmp(&b.proportion))
        .map(|r| (r.element, r.proportion));
    let weakest = readings
        .iter()
        .min_by(|a, b| a.proportion.total_cmp(&b.proportion))
        .map(|r| (r.element, r.proportion));

    let callout = match (strongest, weakest) {
        (Some((strong, high)), Some((weak, low))) if high - low > SPREAD_CALLOUT_THRESHOLD => {
            Some(BalanceCallout {
                strongest: strong,
                weakest: weak,
                spread: high - low,
            })
        }
        _ => None,
    };

    ElementalBalance {
        readings,
        balance_score,
        callout,
    }
}

fn directional_energy(features: &FeatureVector) -> Option<DirectionalEnergy> {
    let direction = features
        .feature("朝向")
        .and_then(|value| value.as_text())
        .and_then(Direction::parse)?;

    let element = direction.element();
    // An even 1/5 share of the governing element reads as 50.
    let proportion = features
        .feature(element.feature_name())
        .and_then(|value| value.as_number())
        .filter(|value| value.is_finite())
        .unwrap_or(0.2);
    let energy_score = (proportion * 250.0).round().clamp(0.0, 100.0) as u8;

    let strength = if energy_score >= 75 {
        "旺盛"
    } else if energy_score >= 50 {
        "平稳"
    } else {
        "偏弱"
    };
    let summary = format!(
        "居室朝{}，属{}卦{}气，此气{}，关乎{}。",
        direction.label(),
        direction.trigram(),
        element.label(),
        strength,
        direction.aspects(),
    );

    Some(DirectionalEnergy {
        direction,
        element,
        energy_score,
        summary,
    })
}

fn position_score(position: AuspiciousPosition, features: &FeatureVector) -> PositionScore {
    let combined: f64 = position
        .components()
        .iter()
        .map(|(name, weight)| proportion(features, name) * weight)
        .sum();
    let score = (combined * 100.0).round().clamp(0.0, 100.0) as u8;
    PositionScore {
        position,
        score,
        verdict: position.verdict_for(score).to_string(),
    }
}
